//! Infrastructure layer: storage adapters and configuration.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;


pub use config::Settings;
pub use error::StoreError;
pub use memory::{InMemoryProjectStore, InMemoryUserStore};
pub use postgres::{PostgresProjectStore, PostgresUserStore};
