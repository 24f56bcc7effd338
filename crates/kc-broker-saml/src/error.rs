//! Broker mapper error types.
//!
//! Errors here abort the current mapper invocation only; whether the broader
//! login flow fails or proceeds without the mapped value is the caller's
//! decision.

use thiserror::Error;

/// Result type for broker mapper operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors raised while mapping a brokered identity.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// A subject segment is not a `key=value` entry.
    #[error("malformed subject entry: {segment:?}")]
    MalformedSubjectEntry {
        /// The offending segment, trimmed.
        segment: String,
    },

    /// The assertion subject does not have the expected shape.
    #[error("unsupported subject: {0}")]
    UnsupportedSubject(String),
}

impl BrokerError {
    /// Creates a malformed subject entry error.
    #[must_use]
    pub fn malformed_entry(segment: impl Into<String>) -> Self {
        Self::MalformedSubjectEntry {
            segment: segment.into(),
        }
    }

    /// Creates an unsupported subject error.
    #[must_use]
    pub fn unsupported_subject(reason: impl Into<String>) -> Self {
        Self::UnsupportedSubject(reason.into())
    }

    /// Checks if this is a malformed subject entry error.
    #[must_use]
    pub const fn is_malformed_entry(&self) -> bool {
        matches!(self, Self::MalformedSubjectEntry { .. })
    }

    /// Checks if this is an unsupported subject error.
    #[must_use]
    pub const fn is_unsupported_subject(&self) -> bool {
        matches!(self, Self::UnsupportedSubject(_))
    }
}
