pub mod item;
pub mod store;

pub use item::TodoItem;
pub use store::TodoStore;
