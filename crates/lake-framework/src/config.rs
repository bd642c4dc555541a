//! # Lake Configuration
//!
//! Everything the streamer needs at construction. There is no global
//! state; each streamer owns its config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{
    BlockHeight, LakeError, Network, DEFAULT_DISCONTINUITY_BACKOFF_MS,
    DEFAULT_NO_NEW_DATA_INTERVAL_MS,
    DEFAULT_PRELOAD_POOL_SIZE, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SHARD_RETRY_INTERVAL_MS,
};

/// Region every public lake bucket lives in.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Lake streamer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LakeConfig {
    /// Bucket holding the lake.
    ///
    /// Informational: the `LakeStore` handed to the streamer decides where
    /// objects are read from. Bucket and region only label the stream in
    /// logs.
    pub s3_bucket_name: String,

    /// Bucket region. Informational, like `s3_bucket_name`.
    pub s3_region_name: String,

    /// First height to stream (inclusive).
    pub start_block_height: BlockHeight,

    /// Heights requested per discovery round; also the delivery channel
    /// capacity.
    pub blocks_preload_pool_size: usize,

    /// Maximum fetches in flight.
    pub prefetch_window_size: usize,

    /// Poll interval while no new heights are visible, in milliseconds.
    pub no_new_data_interval_ms: u64,

    /// Back-off after a continuity failure, in milliseconds.
    pub discontinuity_backoff_ms: u64,

    /// Pause between fetch attempts of a lagging shard, in milliseconds.
    pub shard_retry_interval_ms: u64,

    /// Timeout for a single store request, in milliseconds.
    pub request_timeout_ms: u64,

    /// Consecutive discontinuities at one height before giving up.
    /// `None` (the default) retries forever: a lagging height and a
    /// rolled-back one look the same from here.
    pub max_consecutive_discontinuities: Option<u32>,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet, 0)
    }
}

impl LakeConfig {
    /// Config for a public network's lake, starting at `start_block_height`.
    pub fn for_network(network: Network, start_block_height: BlockHeight) -> Self {
        Self {
            s3_bucket_name: network.bucket_name(),
            s3_region_name: DEFAULT_REGION.to_string(),
            start_block_height,
            blocks_preload_pool_size: DEFAULT_PRELOAD_POOL_SIZE,
            prefetch_window_size: DEFAULT_PRELOAD_POOL_SIZE,
            no_new_data_interval_ms: DEFAULT_NO_NEW_DATA_INTERVAL_MS,
            discontinuity_backoff_ms: DEFAULT_DISCONTINUITY_BACKOFF_MS,
            shard_retry_interval_ms: DEFAULT_SHARD_RETRY_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_consecutive_discontinuities: None,
        }
    }

    /// Create a config for testing (small pools, same intervals).
    pub fn for_testing() -> Self {
        Self {
            s3_bucket_name: "lake-test".to_string(),
            blocks_preload_pool_size: 10,
            prefetch_window_size: 4,
            ..Self::default()
        }
    }

    /// Reject configurations the sequencer cannot run with.
    pub fn validate(&self) -> Result<(), LakeError> {
        if self.blocks_preload_pool_size == 0 {
            return Err(LakeError::Config(
                "blocks_preload_pool_size must be at least 1".to_string(),
            ));
        }
        if self.prefetch_window_size == 0 {
            return Err(LakeError::Config(
                "prefetch_window_size must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(LakeError::Config(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.max_consecutive_discontinuities == Some(0) {
            return Err(LakeError::Config(
                "max_consecutive_discontinuities must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Poll interval while no new heights are visible.
    pub fn no_new_data_interval(&self) -> Duration {
        Duration::from_millis(self.no_new_data_interval_ms)
    }

    /// Back-off after a continuity failure.
    pub fn discontinuity_backoff(&self) -> Duration {
        Duration::from_millis(self.discontinuity_backoff_ms)
    }

    /// Pause between shard fetch attempts.
    pub fn shard_retry_interval(&self) -> Duration {
        Duration::from_millis(self.shard_retry_interval_ms)
    }

    /// Timeout for a single store request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
