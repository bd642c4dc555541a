//! # Record Fetcher
//!
//! Assembles one `StreamRecord`: the block document first, then every
//! shard it references, concurrently.
//!
//! ## Failure policy
//!
//! | Failure | Block | Shard |
//! |---------|-------|-------|
//! | Not found | fatal (`BlockMissing`) | retried |
//! | Connection / timeout | retried | retried |
//! | Decode | fatal | fatal |
//! | Other backend error | fatal | fatal |
//!
//! The lake may expose a block key before all of its shard keys are
//! readable, so a missing shard is expected to appear. A missing block for
//! a height that was just listed is not.

use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::algorithms::{block_key, shard_key};
use crate::config::LakeConfig;
use crate::domain::{
    BlockHeight, BlockRecord, LakeError, ShardId, ShardRecord, StoreError, StreamRecord,
};
use crate::ports::LakeStore;

/// Fetches and decodes complete records.
#[derive(Clone)]
pub struct RecordFetcher {
    store: Arc<dyn LakeStore>,
    request_timeout: Duration,
    retry_interval: Duration,
}

impl RecordFetcher {
    /// Create a fetcher over `store` using the config's timeouts.
    pub fn new(store: Arc<dyn LakeStore>, config: &LakeConfig) -> Self {
        Self {
            store,
            request_timeout: config.request_timeout(),
            retry_interval: config.shard_retry_interval(),
        }
    }

    /// Fetch the block at `height` and all of its shards.
    ///
    /// Completes only once every shard decoded.
    pub async fn fetch(&self, height: BlockHeight) -> Result<StreamRecord, LakeError> {
        let key = block_key(height);
        let body = self.fetch_block_body(height, &key).await?;
        let block =
            BlockRecord::from_json(&body).map_err(|source| LakeError::Decode { key, source })?;

        if block.height != height {
            return Err(LakeError::HeightMismatch {
                requested: height,
                found: block.height,
            });
        }

        let shards = try_join_all(
            block
                .shard_refs
                .iter()
                .map(|&shard_id| self.fetch_shard_or_retry(height, shard_id)),
        )
        .await?;

        debug!(
            "[lake] Fetched block {} with {} shards",
            height,
            shards.len()
        );
        Ok(StreamRecord { block, shards })
    }

    /// Fetch one shard, retrying until it is visible and readable.
    pub async fn fetch_shard_or_retry(
        &self,
        height: BlockHeight,
        shard_id: ShardId,
    ) -> Result<ShardRecord, LakeError> {
        let key = shard_key(height, shard_id);
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            match self.get(&key).await {
                Ok(body) => {
                    return ShardRecord::from_json(&body)
                        .map_err(|source| LakeError::Decode { key, source });
                }
                Err(StoreError::NotFound { .. }) => {
                    debug!(
                        "[lake] Shard {} not visible yet (attempt {}), retrying",
                        key, attempt
                    );
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        "[lake] Failed to fetch {} (attempt {}): {}, retrying",
                        key, attempt, e
                    );
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    async fn fetch_block_body(&self, height: BlockHeight, key: &str) -> Result<Vec<u8>, LakeError> {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            match self.get(key).await {
                Ok(body) => return Ok(body),
                Err(StoreError::NotFound { .. }) => {
                    return Err(LakeError::BlockMissing { height });
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        "[lake] Failed to fetch {} (attempt {}): {}, retrying",
                        key, attempt, e
                    );
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Single get bounded by the request timeout.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        match tokio::time::timeout(self.request_timeout, self.store.get_object(key)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                key: key.to_string(),
            }),
        }
    }
}
