//! Centralized error handling for lodestone
//!
//! This module provides a unified error type covering the fallible surfaces of
//! the crate: the reference markdown-tree builder and the internal restore
//! paths. Synchronization operations never propagate these errors to callers;
//! they degrade to a neutral cursor position via [`ResultExt`].

use log::warn;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    /// The reference parser could not build a block tree
    Parse(String),

    /// A cursor address does not resolve in the given tree
    InvalidCursor(String),

    /// A restore target no longer exists in the current tree
    StaleTarget { source_line: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for diagnostic messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "Failed to parse markdown: {}", msg),
            Error::InvalidCursor(msg) => write!(f, "Invalid cursor address: {}", msg),
            Error::StaleTarget { source_line } => {
                write!(f, "No block for source line {} in current tree", source_line)
            }
        }
    }
}

impl std::error::Error for Error {}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_target_display() {
        let err = Error::StaleTarget { source_line: 12 };
        assert_eq!(
            err.to_string(),
            "No block for source line 12 in current tree"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::Parse("unterminated front matter".to_string());
        assert!(err.to_string().contains("unterminated front matter"));
    }

    #[test]
    fn test_unwrap_or_warn_default() {
        let ok: Result<usize> = Ok(7);
        assert_eq!(ok.unwrap_or_warn_default(0, "test"), 7);

        let err: Result<usize> = Err(Error::InvalidCursor("empty path".to_string()));
        assert_eq!(err.unwrap_or_warn_default(42, "test"), 42);
    }
}
