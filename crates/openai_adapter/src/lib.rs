pub mod client;
pub mod client_trait;
pub mod config;
pub mod models;

pub use client::{OpenAIAdapter, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use client_trait::OpenAIAdapterTrait;
pub use config::{Config, ProxyAuth};
