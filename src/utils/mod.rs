//! Utility functions
//!
//! Provides logging setup and address resolution.

pub mod logging;
pub mod network;
