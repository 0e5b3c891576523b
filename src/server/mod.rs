//! Server core functionality
//!
//! The accept loop and its configuration.

pub mod config;
pub mod core;

pub use self::config::{ConfigOverrides, ServerConfig};
pub use self::core::Server;
