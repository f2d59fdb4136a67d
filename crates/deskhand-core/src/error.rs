// SPDX-FileCopyrightText: 2026 Deskhand Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by the state store, the ports, and the detectors.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by every store operation and port call.
///
/// `NotFound` is always handled locally by the caller. Everything else is
/// `Internal`: the detector logs it and abandons the current run.
#[derive(Debug, Error)]
pub enum DeskhandError {
    /// A requested row or remote object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other failure (database, network, decoding, remote API).
    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl DeskhandError {
    /// Builds an `Internal` error without an underlying cause.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an `Internal` error wrapping `source`.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn internal_error_keeps_source() {
        let err = DeskhandError::with_source("query failed", std::io::Error::other("disk"));
        assert_eq!(err.to_string(), "internal error: query failed");
        assert!(err.source().is_some());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err = DeskhandError::not_found("protected name `feature/x`");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: protected name `feature/x`");
    }
}
