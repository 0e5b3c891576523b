//! Module `commands`
//!
//! Defines the control-channel command set and the parser that turns a raw
//! line into a [`Command`].

use crate::protocol::validation::validate_filename;

/// A parsed control-channel request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `-l` or `LIST`
    List,
    /// `-g <filename>` or `GET <filename>`, filename already validated
    Get(String),
    /// `EXIT`
    Exit,
    /// Anything else, kept verbatim for logging
    Invalid(String),
}

/// Parses one control line (terminator already stripped).
///
/// Verbs are matched as whole whitespace-separated tokens and are
/// case-sensitive. `LIST` takes no argument, `GET` exactly one valid filename.
pub fn parse_command(raw: &str) -> Command {
    let mut parts = raw.split_whitespace();
    let verb = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match (verb, args.as_slice()) {
        ("-l" | "LIST", []) => Command::List,
        ("-g" | "GET", [name]) => match validate_filename(name) {
            Ok(name) => Command::Get(name),
            Err(_) => Command::Invalid(raw.to_string()),
        },
        ("EXIT", []) => Command::Exit,
        _ => Command::Invalid(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_spellings() {
        assert_eq!(parse_command("-l"), Command::List);
        assert_eq!(parse_command("LIST"), Command::List);
        assert_eq!(parse_command("-g report.txt"), Command::Get("report.txt".into()));
        assert_eq!(parse_command("GET report.txt"), Command::Get("report.txt".into()));
        assert_eq!(parse_command("EXIT"), Command::Exit);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(parse_command("  GET   a.bin "), Command::Get("a.bin".into()));
        assert_eq!(parse_command("LIST "), Command::List);
    }

    #[test]
    fn misuse_is_invalid() {
        assert_eq!(parse_command(""), Command::Invalid("".into()));
        assert_eq!(parse_command("GET"), Command::Invalid("GET".into()));
        assert_eq!(parse_command("GET a b"), Command::Invalid("GET a b".into()));
        assert_eq!(parse_command("LIST x"), Command::Invalid("LIST x".into()));
        assert_eq!(parse_command("list"), Command::Invalid("list".into()));
        assert_eq!(parse_command("-lx"), Command::Invalid("-lx".into()));
        assert_eq!(parse_command("EXITNOW"), Command::Invalid("EXITNOW".into()));
    }

    #[test]
    fn bad_filenames_make_the_command_invalid() {
        assert_eq!(
            parse_command("-g ../secret"),
            Command::Invalid("-g ../secret".into())
        );
        assert_eq!(parse_command("GET .."), Command::Invalid("GET ..".into()));
    }
}
