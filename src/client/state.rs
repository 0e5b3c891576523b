//! Module `state`
//!
//! States of the per-connection command dispatcher.

use std::fmt;

/// Where a control session is in its request loop.
///
/// `AwaitingCommand -> Negotiating -> Serving -> AwaitingCommand`, with
/// `Closed` reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    Negotiating,
    Serving,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::AwaitingCommand => "awaiting-command",
            SessionState::Negotiating => "negotiating",
            SessionState::Serving => "serving",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
