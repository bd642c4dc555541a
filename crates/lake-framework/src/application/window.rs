//! # Prefetch Window
//!
//! Bounded FIFO of spawned fetch tasks.
//!
//! Fetches run concurrently and finish in any order, but results are only
//! ever taken from the head, so records come out in the order heights were
//! queued. The window is an explicit queue of task handles rather than a
//! completion race for exactly that reason.
//!
//! Dropping the window aborts every task still in it, shard retries
//! included.

use std::collections::VecDeque;
use tokio::task::JoinHandle;
use tracing::trace;

use super::fetcher::RecordFetcher;
use crate::domain::{BlockHeight, LakeError, StreamRecord};

type FetchHandle = JoinHandle<Result<StreamRecord, LakeError>>;

/// Up to `capacity` in-flight fetches, drained head first.
pub struct PrefetchWindow {
    capacity: usize,
    fetcher: RecordFetcher,
    slots: VecDeque<(BlockHeight, FetchHandle)>,
}

impl PrefetchWindow {
    /// Create an empty window. A zero capacity is treated as one.
    pub fn new(capacity: usize, fetcher: RecordFetcher) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            fetcher,
            slots: VecDeque::with_capacity(capacity),
        }
    }

    /// Maximum number of in-flight fetches.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Whether no fetch is in flight.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Heights currently in flight, head first.
    pub fn heights(&self) -> impl Iterator<Item = BlockHeight> + '_ {
        self.slots.iter().map(|(height, _)| *height)
    }

    /// Launch fetches for pending heights until the window is full.
    ///
    /// Returns how many were launched.
    pub fn fill<I>(&mut self, pending: &mut I) -> usize
    where
        I: Iterator<Item = BlockHeight>,
    {
        let mut launched = 0;
        while self.advance(pending) {
            launched += 1;
        }
        launched
    }

    /// Launch the next pending height if a slot is free.
    ///
    /// Returns whether a fetch was launched.
    pub fn advance<I>(&mut self, pending: &mut I) -> bool
    where
        I: Iterator<Item = BlockHeight>,
    {
        if self.slots.len() >= self.capacity {
            return false;
        }
        match pending.next() {
            Some(height) => {
                self.launch(height);
                true
            }
            None => false,
        }
    }

    /// Await and remove the head of the window.
    ///
    /// Returns `None` when the window is empty.
    pub async fn take_next(&mut self) -> Option<Result<StreamRecord, LakeError>> {
        let (height, handle) = self.slots.pop_front()?;
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(LakeError::FetchTask {
                height,
                reason: join_error.to_string(),
            }),
        };
        Some(result)
    }

    /// Abort every in-flight fetch and empty the window.
    pub fn abort_all(&mut self) {
        for (height, handle) in self.slots.drain(..) {
            trace!("[lake] Aborting fetch for height {}", height);
            handle.abort();
        }
    }

    fn launch(&mut self, height: BlockHeight) {
        let fetcher = self.fetcher.clone();
        let handle = tokio::spawn(async move { fetcher.fetch(height).await });
        self.slots.push_back((height, handle));
    }
}

impl Drop for PrefetchWindow {
    fn drop(&mut self) {
        self.abort_all();
    }
}
