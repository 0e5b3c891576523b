//! Control sessions
//!
//! Per-connection command dispatch, session state and line I/O.

pub mod handler;
pub mod session;
pub mod state;

pub use handler::handle_client;
pub use session::{ControlLine, ControlSession};
pub use state::SessionState;
