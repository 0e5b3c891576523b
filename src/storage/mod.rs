//! File system storage
//!
//! Directory enumeration and file lookup, always relative to an explicit
//! server root.

pub mod filesystem;
pub mod listing;
pub mod results;

pub use filesystem::find_file;
pub use listing::list_directory;
pub use results::DirectoryEntry;
