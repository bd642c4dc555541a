//! # Domain Invariants
//!
//! Rules every delivered stream must satisfy, plus the tunable defaults.

use super::entities::StreamRecord;
use super::value_objects::BlockHeight;

/// Expected shard objects per height, used to size raw listing requests.
/// Under-estimating only costs an extra listing round trip.
pub const ESTIMATED_SHARDS_COUNT: usize = 4;

/// Default preload pool size (discovery batch and delivery channel capacity).
pub const DEFAULT_PRELOAD_POOL_SIZE: usize = 200;

/// Default poll interval when no new heights are visible.
pub const DEFAULT_NO_NEW_DATA_INTERVAL_MS: u64 = 2_000;

/// Default back-off after a continuity failure.
pub const DEFAULT_DISCONTINUITY_BACKOFF_MS: u64 = 200;

/// Default pause between shard fetch attempts.
pub const DEFAULT_SHARD_RETRY_INTERVAL_MS: u64 = 100;

/// Default timeout for a single store request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Invariant: delivered heights strictly increase.
pub fn invariant_height_advances(previous: BlockHeight, next: BlockHeight) -> bool {
    next > previous
}

/// Invariant: `next` builds on `previous`.
pub fn invariant_chain_linked(previous: &StreamRecord, next: &StreamRecord) -> bool {
    next.block.prev_hash == previous.block.hash
}

/// Invariant: a delivered record carries every shard its block references.
pub fn invariant_record_complete(record: &StreamRecord) -> bool {
    record.is_complete()
}

/// Check a whole delivered sequence against all three invariants.
///
/// Returns the index of the first offending record.
pub fn first_violation(records: &[StreamRecord]) -> Option<usize> {
    if let Some(first) = records.first() {
        if !invariant_record_complete(first) {
            return Some(0);
        }
    }

    records.windows(2).enumerate().find_map(|(i, pair)| {
        let (prev, next) = (&pair[0], &pair[1]);
        let ok = invariant_height_advances(prev.height(), next.height())
            && invariant_chain_linked(prev, next)
            && invariant_record_complete(next);
        (!ok).then_some(i + 1)
    })
}
