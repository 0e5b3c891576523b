//! Input validation
//!
//! Strict validators for the client-supplied data port and filenames.
//! Both return a typed outcome instead of truncating the input.

use crate::error::ValidationError;

/// Validates a textual port number.
///
/// Every byte must be an ASCII digit and the value must fall in 1..=65535.
pub fn validate_port(raw: &str) -> Result<u16, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyPort);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NonNumericPort(raw.to_string()));
    }

    match raw.parse::<u32>() {
        Ok(port @ 1..=65535) => Ok(port as u16),
        _ => Err(ValidationError::PortOutOfRange(raw.to_string())),
    }
}

/// Returns true for the bytes a served filename may contain.
pub fn is_filename_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '.'
}

/// Validates a filename requested by the client.
///
/// Only `[A-Za-z0-9.]` is accepted, so separators and traversal sequences
/// can never reach the filesystem. `.` and `..` are rejected outright.
pub fn validate_filename(raw: &str) -> Result<String, ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    if let Some(ch) = raw.chars().find(|c| !is_filename_char(*c)) {
        return Err(ValidationError::IllegalFilenameChar {
            name: raw.to_string(),
            ch,
        });
    }
    if raw == "." || raw == ".." {
        return Err(ValidationError::ReservedFilename(raw.to_string()));
    }
    Ok(raw.to_string())
}
