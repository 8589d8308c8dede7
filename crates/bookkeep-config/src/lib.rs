//! bookkeep-config
//!
//! Persistent user preferences for Bookkeep and the helpers that keep them
//! on disk.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, NegativeDisplay};
