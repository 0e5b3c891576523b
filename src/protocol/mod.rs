//! Wire protocol
//!
//! Handles command parsing, input validation and control-channel tokens.

pub mod commands;
pub mod responses;
pub mod validation;

pub use commands::{Command, parse_command};
pub use validation::{validate_filename, validate_port};
