//! Error kinds raised while scanning a header.
//!
//! Every error is fatal to the scan: there is no partial model.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The input broke an assumption of the header dialect.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    /// The stream ended in the middle of a declaration.
    #[error("line {line}: unexpected end of input, expected `{expected}`")]
    Truncated { line: usize, expected: String },

    #[error("failed to read header: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    pub fn truncated(line: usize, expected: impl Into<String>) -> Self {
        Self::Truncated {
            line,
            expected: expected.into(),
        }
    }

    /// True for the dialect violations (as opposed to I/O or truncation).
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
