use thiserror::Error;

pub type Result<T> = std::result::Result<T, CountError>;

/// Errors raised while loading or counting tag and score data
#[derive(Debug, Error)]
pub enum CountError {
    /// A counting operation was given no source, or more than one, to read from.
    /// Raised before any I/O is attempted.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A data line does not match the expected layout; the operation stops
    /// immediately without a partial result
    #[error("{src}:{line}: {reason}")]
    Format {
        src: String,
        line: usize,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CountError {
    pub(crate) fn format<S: Into<String>>(src: &str, line: usize, reason: S) -> Self {
        Self::Format {
            src: src.to_owned(),
            line,
            reason: reason.into(),
        }
    }
}
