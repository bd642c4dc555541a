//! # Domain Errors
//!
//! Error types for the lake streamer.
//!
//! Two levels exist:
//! - [`StoreError`] is what a [`LakeStore`](crate::ports::LakeStore) adapter
//!   reports for a single list or get call.
//! - [`LakeError`] is what terminates a stream. Anything reaching the caller
//!   as a `LakeError` is fatal: restart from the last delivered height + 1.

use thiserror::Error;

use super::value_objects::BlockHeight;

/// Errors reported by an object store adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The object does not exist (or is not visible yet).
    #[error("Object not found: {key}")]
    NotFound {
        /// Requested object key
        key: String,
    },

    /// The store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {key}")]
    Timeout {
        /// Requested object key (or listing marker)
        key: String,
    },

    /// Any other backend failure (permissions, malformed response, I/O).
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Connectivity failures and timeouts heal on their own.
    ///
    /// `NotFound` is deliberately excluded: whether a missing object is
    /// transient depends on what was requested (shards lag, blocks don't).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout { .. })
    }

    /// Whether this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that terminate a lake stream.
#[derive(Debug, Error)]
pub enum LakeError {
    /// Non-transient store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A listed height has no block object.
    #[error("Block object missing for listed height {height}")]
    BlockMissing {
        /// Height returned by discovery
        height: BlockHeight,
    },

    /// An object body could not be decoded.
    #[error("Failed to decode {key}: {source}")]
    Decode {
        /// Object key of the malformed body
        key: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The block stored under a height declares a different height.
    #[error("Height mismatch: requested {requested}, block declares {found}")]
    HeightMismatch {
        /// Height the key was derived from
        requested: BlockHeight,
        /// Height inside the block header
        found: BlockHeight,
    },

    /// Continuity kept failing at the same height; the store rolled back
    /// further than a single-height visibility lag.
    #[error("Chain diverged at height {height} after {attempts} discontinuities")]
    ChainDiverged {
        /// Height the sequencer could not continue from
        height: BlockHeight,
        /// Consecutive discontinuities observed
        attempts: u32,
    },

    /// A spawned fetch task panicked or was cancelled underneath the window.
    #[error("Fetch task for height {height} failed: {reason}")]
    FetchTask {
        /// Height the task was fetching
        height: BlockHeight,
        /// Join error description
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Connection("reset".into()).is_transient());
        assert!(StoreError::Timeout { key: "k".into() }.is_transient());
        assert!(!StoreError::NotFound { key: "k".into() }.is_transient());
        assert!(!StoreError::Backend("denied".into()).is_transient());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(StoreError::NotFound { key: "k".into() }.is_not_found());
        assert!(!StoreError::Connection("reset".into()).is_not_found());
    }

    #[test]
    fn test_block_missing_error() {
        let err = LakeError::BlockMissing { height: 100 };
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_height_mismatch_error() {
        let err = LakeError::HeightMismatch {
            requested: 7,
            found: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("requested 7"));
        assert!(msg.contains("declares 8"));
    }

    #[test]
    fn test_store_error_converts() {
        let err: LakeError = StoreError::Backend("denied".into()).into();
        assert!(matches!(err, LakeError::Store(StoreError::Backend(_))));
    }
}
