pub mod copilot_controller;
pub mod health_controller;
pub mod todo_controller;
