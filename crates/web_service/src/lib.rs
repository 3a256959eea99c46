pub mod controllers;
pub mod error;
pub mod server;
pub mod services;
