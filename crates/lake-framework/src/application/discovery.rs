//! # Key Discovery
//!
//! Turns "up to N heights starting at H" into listing calls against the
//! store.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::algorithms::{height_marker, parse_height_prefix, KEY_DELIMITER};
use crate::domain::{BlockHeight, StoreError, ESTIMATED_SHARDS_COUNT};
use crate::ports::{LakeStore, ListRequest};

/// Lists available heights from the store.
#[derive(Clone)]
pub struct KeyDiscovery {
    store: Arc<dyn LakeStore>,
    request_timeout: Duration,
}

impl KeyDiscovery {
    /// Create a discovery over `store`.
    pub fn new(store: Arc<dyn LakeStore>, request_timeout: Duration) -> Self {
        Self {
            store,
            request_timeout,
        }
    }

    /// Up to `limit` available heights, ascending, all `>= from`.
    ///
    /// An empty result means nothing new is visible yet.
    pub async fn list_heights(
        &self,
        from: BlockHeight,
        limit: usize,
    ) -> Result<Vec<BlockHeight>, StoreError> {
        let start_after = height_marker(from);
        let max_keys = limit.saturating_mul(1 + ESTIMATED_SHARDS_COUNT);

        let mut heights = Vec::with_capacity(limit);
        let mut continuation_token = None;

        while heights.len() < limit {
            let request = ListRequest {
                delimiter: KEY_DELIMITER.to_string(),
                max_keys,
                start_after: start_after.clone(),
                continuation_token: continuation_token.take(),
            };

            let page = match tokio::time::timeout(
                self.request_timeout,
                self.store.list_common_prefixes(request),
            )
            .await
            {
                Ok(result) => result?,
                Err(_) => return Err(StoreError::Timeout { key: start_after }),
            };

            for prefix in &page.common_prefixes {
                match parse_height_prefix(prefix) {
                    Some(height) if height >= from => heights.push(height),
                    Some(_) => {}
                    None => debug!("[lake] Skipping non-height prefix {:?}", prefix),
                }
            }

            match page.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        heights.truncate(limit);
        debug!(
            "[lake] Discovered {} heights from {} (limit {})",
            heights.len(),
            from,
            limit
        );
        Ok(heights)
    }
}
