//! # Sequencer
//!
//! Drives discovery, the prefetch window, the continuity check and the
//! delivery channel.
//!
//! ## State machine
//!
//! ```text
//!            empty listing (sleep 2s)
//!              ┌──────────┐
//!              ▼          │
//!        ┌─────────────┐──┘      heights       ┌─────────────────┐
//!   ───► │ Discovering │ ───────────────────► │ Draining window │
//!        └─────────────┘                      └─────────────────┘
//!              ▲      batch exhausted, or             │
//!              └──── discontinuity (sleep 200ms) ─────┘
//! ```
//!
//! On a discontinuity the whole window is abandoned and discovery restarts
//! from the same `next_height_to_request`: anything fetched speculatively
//! alongside the stale record may be stale too, and the lake gives no
//! ordering guarantee between keys.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::discovery::KeyDiscovery;
use super::fetcher::RecordFetcher;
use super::window::PrefetchWindow;
use crate::algorithms::{check_continuity, Continuity};
use crate::config::LakeConfig;
use crate::domain::{BlockHeight, LakeError, SequencerState, StreamRecord};
use crate::ports::LakeStore;

/// Join handle of a running streamer. Aborting it cancels every
/// outstanding fetch and closes the delivery channel.
pub type StreamerHandle = JoinHandle<Result<(), LakeError>>;

/// How a discovery batch ended.
#[derive(Debug, PartialEq, Eq)]
enum BatchOutcome {
    /// Every height of the batch was delivered.
    Exhausted,
    /// A record failed the continuity check; the window was dropped.
    Discontinuity,
    /// The consumer dropped its receiver.
    ConsumerGone,
}

/// The prefetching sequencer.
pub struct Sequencer {
    config: LakeConfig,
    location: String,
    discovery: KeyDiscovery,
    fetcher: RecordFetcher,
    state: SequencerState,
    sender: mpsc::Sender<StreamRecord>,
    consecutive_discontinuities: u32,
}

impl Sequencer {
    /// Create a sequencer delivering into `sender`.
    pub fn new(
        config: LakeConfig,
        store: Arc<dyn LakeStore>,
        sender: mpsc::Sender<StreamRecord>,
    ) -> Result<Self, LakeError> {
        config.validate()?;

        Ok(Self {
            location: store.location(),
            discovery: KeyDiscovery::new(Arc::clone(&store), config.request_timeout()),
            fetcher: RecordFetcher::new(store, &config),
            state: SequencerState::new(config.start_block_height),
            config,
            sender,
            consecutive_discontinuities: 0,
        })
    }

    /// Current sequencer state.
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Run until a fatal error, or until the consumer goes away.
    pub async fn run(mut self) -> Result<(), LakeError> {
        info!(
            "[lake] Streaming {} (bucket {}, region {}) from height {}",
            self.location,
            self.config.s3_bucket_name,
            self.config.s3_region_name,
            self.state.next_height_to_request
        );

        loop {
            let heights = match self
                .discovery
                .list_heights(
                    self.state.next_height_to_request,
                    self.config.blocks_preload_pool_size,
                )
                .await
            {
                Ok(heights) => heights,
                Err(e) if e.is_transient() => {
                    warn!(
                        "[lake] Listing failed: {}, retry in {:?}",
                        e,
                        self.config.no_new_data_interval()
                    );
                    tokio::time::sleep(self.config.no_new_data_interval()).await;
                    continue;
                }
                Err(e) => {
                    error!("[lake] Listing failed: {}", e);
                    return Err(e.into());
                }
            };

            if heights.is_empty() {
                info!(
                    "[lake] No new blocks on the lake, retry in {:?}",
                    self.config.no_new_data_interval()
                );
                tokio::time::sleep(self.config.no_new_data_interval()).await;
                continue;
            }

            info!("[lake] Received {} blocks from the lake", heights.len());

            match self.drain_batch(heights).await? {
                BatchOutcome::Exhausted => {}
                BatchOutcome::Discontinuity => {
                    tokio::time::sleep(self.config.discontinuity_backoff()).await;
                }
                BatchOutcome::ConsumerGone => {
                    info!(
                        "[lake] Consumer dropped the stream at height {}, stopping",
                        self.state.next_height_to_request
                    );
                    return Ok(());
                }
            }
        }
    }

    async fn drain_batch(&mut self, heights: Vec<BlockHeight>) -> Result<BatchOutcome, LakeError> {
        let mut pending = heights.into_iter();
        let mut window =
            PrefetchWindow::new(self.config.prefetch_window_size, self.fetcher.clone());
        window.fill(&mut pending);
        debug!(
            "[lake] Prefetching heights {:?}",
            window.heights().collect::<Vec<_>>()
        );

        while let Some(result) = window.take_next().await {
            let record = result.map_err(|e| {
                error!("[lake] Fatal fetch failure: {}", e);
                e
            })?;

            let continuity =
                check_continuity(self.state.last_delivered_hash.as_ref(), &record);
            if let Continuity::Discontinuous { expected, found } = continuity {
                self.consecutive_discontinuities += 1;
                warn!(
                    "[lake] `prev_hash` does not match at height {}, re-fetching from the lake in {:?}: {} != {}",
                    record.height(),
                    self.config.discontinuity_backoff(),
                    expected,
                    found
                );

                if let Some(max) = self.config.max_consecutive_discontinuities {
                    if self.consecutive_discontinuities >= max {
                        error!(
                            "[lake] Giving up after {} consecutive discontinuities at height {}",
                            self.consecutive_discontinuities, self.state.next_height_to_request
                        );
                        return Err(LakeError::ChainDiverged {
                            height: self.state.next_height_to_request,
                            attempts: self.consecutive_discontinuities,
                        });
                    }
                }
                // Dropping the window aborts the rest of the batch.
                return Ok(BatchOutcome::Discontinuity);
            }

            self.consecutive_discontinuities = 0;
            self.state.record_delivery(&record.block);
            window.advance(&mut pending);

            if self.sender.send(record).await.is_err() {
                return Ok(BatchOutcome::ConsumerGone);
            }
        }

        Ok(BatchOutcome::Exhausted)
    }
}

/// Start streaming: spawns the sequencer and returns its handle together
/// with the consumer end of the delivery channel.
///
/// The channel holds `blocks_preload_pool_size` records; once full, the
/// sequencer waits for the consumer.
pub fn streamer(
    config: LakeConfig,
    store: Arc<dyn LakeStore>,
) -> Result<(StreamerHandle, mpsc::Receiver<StreamRecord>), LakeError> {
    config.validate()?;
    let (sender, receiver) = mpsc::channel(config.blocks_preload_pool_size);
    let sequencer = Sequencer::new(config, store, sender)?;
    Ok((tokio::spawn(sequencer.run()), receiver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryLakeStore, InjectedResponse};
    use crate::algorithms::block_key;
    use crate::domain::StoreError;
    use crate::test_utils::{chain, store_with};
    use std::time::Duration;

    fn config(start: BlockHeight) -> LakeConfig {
        LakeConfig {
            start_block_height: start,
            ..LakeConfig::for_testing()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_rejects_invalid_config() {
        let (sender, _receiver) = mpsc::channel(1);
        let bad = LakeConfig {
            prefetch_window_size: 0,
            ..LakeConfig::for_testing()
        };
        let store: Arc<dyn LakeStore> = Arc::new(InMemoryLakeStore::new());
        assert!(matches!(
            Sequencer::new(bad, store, sender),
            Err(LakeError::Config(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_batch_delivers_and_advances_state() {
        let store = Arc::new(store_with(&chain(&[100, 101, 102], 1)));
        let (sender, mut receiver) = mpsc::channel(10);
        let mut sequencer = Sequencer::new(config(100), store, sender).unwrap();

        let outcome = sequencer.drain_batch(vec![100, 101, 102]).await.unwrap();
        assert_eq!(outcome, BatchOutcome::Exhausted);
        assert_eq!(sequencer.state().next_height_to_request, 103);
        assert_eq!(
            sequencer.state().last_delivered_hash.as_ref().map(|h| h.as_str()),
            Some("H102")
        );

        for expected in [100, 101, 102] {
            assert_eq!(receiver.recv().await.unwrap().height(), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_batch_stops_on_discontinuity_without_advancing() {
        let blocks = chain(&[100, 101], 1);
        let store = Arc::new(store_with(&blocks));
        store.inject(
            block_key(101),
            InjectedResponse::Body(blocks[1].with_prev_hash("STALE").block_json()),
        );
        let (sender, mut receiver) = mpsc::channel(10);
        let mut sequencer = Sequencer::new(config(100), store, sender).unwrap();

        let outcome = sequencer.drain_batch(vec![100, 101]).await.unwrap();
        assert_eq!(outcome, BatchOutcome::Discontinuity);
        assert_eq!(sequencer.state().next_height_to_request, 101);
        assert_eq!(receiver.recv().await.unwrap().height(), 100);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_batch_reports_consumer_gone() {
        let store = Arc::new(store_with(&chain(&[1, 2], 1)));
        let (sender, receiver) = mpsc::channel(10);
        drop(receiver);
        let mut sequencer = Sequencer::new(config(1), store, sender).unwrap();

        let outcome = sequencer.drain_batch(vec![1, 2]).await.unwrap();
        assert_eq!(outcome, BatchOutcome::ConsumerGone);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_listing_failure_is_retried() {
        let store = Arc::new(store_with(&chain(&[5], 1)));
        store.fail_next_list(StoreError::Connection("reset".to_string()));

        let (handle, mut receiver) = streamer(config(5), store.clone()).unwrap();
        let record = receiver.recv().await.unwrap();
        assert_eq!(record.height(), 5);
        assert!(store.list_calls() >= 2);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_listing_failure_stops_streamer() {
        let store = Arc::new(InMemoryLakeStore::new());
        store.fail_next_list(StoreError::Backend("access denied".to_string()));

        let (handle, mut receiver) = streamer(config(0), store).unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(LakeError::Store(StoreError::Backend(_)))));
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_streamer_stops_when_consumer_drops() {
        let store = Arc::new(store_with(&chain(&[1, 2, 3], 1)));
        let (handle, receiver) = streamer(config(1), store).unwrap();
        drop(receiver);

        let result = tokio::time::timeout(Duration::from_secs(30), handle)
            .await
            .expect("streamer should stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
