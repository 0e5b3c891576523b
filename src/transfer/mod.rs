//! Transfer module
//!
//! Data channel negotiation and file streaming.

pub mod data_channel;
pub mod file_ops;

pub use data_channel::{DataChannel, negotiate, parse_data_port};
pub use file_ops::handle_file_download;
