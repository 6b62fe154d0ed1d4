pub mod config;
pub mod error;
pub mod types;

pub use config::AttacheConfig;
pub use error::{AttacheError, Result};
pub use types::*;
