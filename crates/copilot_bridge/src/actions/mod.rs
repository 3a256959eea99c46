pub mod delete_todo;
pub mod update_todo_list;

pub use delete_todo::DeleteTodoAction;
pub use update_todo_list::UpdateTodoListAction;
