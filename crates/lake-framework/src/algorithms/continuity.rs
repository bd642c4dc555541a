//! # Continuity Check
//!
//! Decides whether a fetched record continues the chain from the last
//! delivered one. Link continuity only: no hashing, no consensus checks.

use crate::domain::{CryptoHash, StreamRecord};

/// Outcome of a continuity check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Continuity {
    /// The candidate may be delivered.
    Continuous,
    /// The candidate's `prev_hash` does not match the last delivered hash.
    Discontinuous {
        /// Hash of the last delivered block
        expected: CryptoHash,
        /// `prev_hash` declared by the candidate
        found: CryptoHash,
    },
}

impl Continuity {
    /// Whether the candidate may be delivered.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Continuity::Continuous)
    }
}

/// Check `candidate` against the last delivered hash.
///
/// Nothing delivered yet (`None`) always passes.
pub fn check_continuity(
    last_delivered_hash: Option<&CryptoHash>,
    candidate: &StreamRecord,
) -> Continuity {
    match last_delivered_hash {
        None => Continuity::Continuous,
        Some(expected) if *expected == candidate.block.prev_hash => Continuity::Continuous,
        Some(expected) => Continuity::Discontinuous {
            expected: expected.clone(),
            found: candidate.block.prev_hash.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FixtureBlock;
    use proptest::prelude::*;

    fn candidate(prev_hash: &str) -> StreamRecord {
        FixtureBlock::new(101, "H101", prev_hash, 1).stream_record()
    }

    #[test]
    fn test_first_record_always_continuous() {
        assert_eq!(
            check_continuity(None, &candidate("anything")),
            Continuity::Continuous
        );
    }

    #[test]
    fn test_matching_prev_hash_is_continuous() {
        let last = CryptoHash::new("H100");
        assert!(check_continuity(Some(&last), &candidate("H100")).is_continuous());
    }

    #[test]
    fn test_mismatch_reports_both_hashes() {
        let last = CryptoHash::new("H100");
        assert_eq!(
            check_continuity(Some(&last), &candidate("STALE")),
            Continuity::Discontinuous {
                expected: CryptoHash::new("H100"),
                found: CryptoHash::new("STALE"),
            }
        );
    }

    proptest! {
        #[test]
        fn prop_continuous_iff_hashes_equal(last in "[A-Za-z0-9]{1,12}", prev in "[A-Za-z0-9]{1,12}") {
            let last_hash = CryptoHash::new(last.clone());
            let outcome = check_continuity(Some(&last_hash), &candidate(&prev));
            prop_assert_eq!(outcome.is_continuous(), last == prev);
        }
    }
}
