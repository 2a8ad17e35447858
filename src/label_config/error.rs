//! Error types for label config parsing.

use thiserror::Error;

/// Errors that can occur while parsing a labeling config.
///
/// Only markup that is not well-formed is fatal. Everything else (dangling
/// `toName` targets, labels without a value) is reported as a warning on the
/// [`ParseResult`](super::ParseResult) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelConfigError {
    /// The config is not well-formed tag markup
    #[error("Malformed label config at byte {position}: {message}")]
    Malformed {
        /// Underlying well-formedness diagnostic
        message: String,
        /// Byte offset into the config where the problem was detected
        position: usize,
    },
}

impl LabelConfigError {
    /// Create a malformed config error.
    pub fn malformed(message: impl Into<String>, position: usize) -> Self {
        Self::Malformed {
            message: message.into(),
            position,
        }
    }

    /// The underlying diagnostic, without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Malformed { message, .. } => message,
        }
    }
}
