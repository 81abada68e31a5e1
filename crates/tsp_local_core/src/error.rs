use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// `--help` was requested; carries the usage text.
    #[error("{0}")]
    Help(String),
    #[error("{0}")]
    Usage(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("line {line}: {message}")]
    InputFormat { line: usize, message: String },
    #[error(
        "cannot derive output path from {}: file name does not contain `input_` (pass --output)",
        .0.display()
    )]
    PathDerivation(PathBuf),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn input_format(line: usize, message: impl Into<String>) -> Self {
        Self::InputFormat {
            line,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Process exit code: 0 for a help request, 2 for command-line misuse,
    /// 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Help(_) => 0,
            Self::Usage(_) | Self::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Error;

    #[test]
    fn input_format_names_the_line() {
        let err = Error::input_format(7, "expected 2 numeric fields");
        assert_eq!(err.to_string(), "line 7: expected 2 numeric fields");
    }

    #[test]
    fn path_derivation_mentions_the_marker() {
        let err = Error::PathDerivation(PathBuf::from("data/points.csv"));
        let message = err.to_string();
        assert!(message.contains("data/points.csv"));
        assert!(message.contains("input_"));
    }

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(Error::usage("Usage: ...").exit_code(), 2);
        assert_eq!(Error::invalid_input("bad").exit_code(), 2);
        assert_eq!(Error::other("boom").exit_code(), 1);
        assert_eq!(Error::input_format(1, "x").exit_code(), 1);
    }

    #[test]
    fn help_request_exits_successfully() {
        let err = Error::Help("Usage: ...".to_string());
        assert_eq!(err.exit_code(), 0);
        assert_eq!(err.to_string(), "Usage: ...");
    }
}
