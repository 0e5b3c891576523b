//! Protocol tokens
//!
//! Literal tokens exchanged on the control channel.

/// Sent by the server when it is ready to receive the data port.
pub const HELLO: &str = "HELLO";
/// GET status: file found, payload follows on the data channel.
pub const OK: &str = "OK";
/// GET status: no such file, the data channel carries no payload.
pub const ERROR_FILE_NOT_FOUND: &str = "ERROR_FILE_NOT_FOUND";
/// Reply to any control line that is not a supported command.
pub const ERROR_INVALID_COMMAND: &str = "ERROR_INVALID_COMMAND";
/// Verb prefixing the client's data port during negotiation.
pub const DATA_PORT: &str = "DATA_PORT";

/// Format a control-channel token as a wire line
pub fn format_response(token: &str) -> String {
    format!("{}\n", token)
}

/// Format the client's data port announcement
pub fn format_data_port(port: u16) -> String {
    format!("{} {}\n", DATA_PORT, port)
}

/// Strips the line terminator (`\n` or `\r\n`) from a received line.
pub fn trim_line(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
