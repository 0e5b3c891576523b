pub mod client;
pub mod error;
pub mod ftclient;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use ftclient::FtClient;
pub use server::{Server, ServerConfig};
