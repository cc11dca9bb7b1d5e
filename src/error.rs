//! Error types for doublet finding.

use std::fmt;

use crate::finder::FinderState;

/// Errors that can occur while driving a finder.
///
/// These are contract violations of the host-facing state machine; the scan
/// itself cannot fail, and output-buffer exhaustion is a state
/// ([`FinderState::OutOfMemory`]), not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// A layer upload exceeded the fixed per-layer hit capacity.
    LayerTooLarge {
        /// Number of hits in the rejected layer.
        len: usize,
        /// Maximum number of hits per layer.
        max: usize,
    },

    /// A command was issued in a state where it is not accepted.
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the finder was in.
        state: FinderState,
    },
}

impl fmt::Display for FinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinderError::LayerTooLarge { len, max } => {
                write!(f, "layer too large: {} hits, at most {} allowed", len, max)
            }
            FinderError::InvalidState { operation, state } => {
                write!(f, "{} is not valid in state {}", operation, state)
            }
        }
    }
}

impl std::error::Error for FinderError {}
