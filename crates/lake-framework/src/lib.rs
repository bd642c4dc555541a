//! # Lake Framework
//!
//! Streams finalized blocks, with every shard attached, out of a block lake:
//! an object store where each height has its own key prefix holding a block
//! document and one document per shard.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Guarantees
//!
//! | Guarantee | How |
//! |-----------|-----|
//! | Strict height order | FIFO prefetch window, drained head first |
//! | Complete records | A record is released only once every shard decoded |
//! | Chain continuity | `prev_hash` checked against the last delivered hash |
//! | Bounded memory | Bounded window and bounded delivery channel |
//!
//! The lake is eventually consistent: a height may be listed before its
//! shards are readable, and a stale block body may be served after a fresher
//! one. Shards are retried until visible; a broken `prev_hash` link discards
//! the in-flight window and rediscovers from the last delivered height.
//!
//! ## Module Structure
//!
//! ```text
//! lake-framework/
//! ├── domain/          # Records, errors, value objects, invariants
//! ├── algorithms/      # Key layout, continuity check
//! ├── ports/           # LakeStore (outbound)
//! ├── adapters/        # In-memory and filesystem stores
//! ├── application/     # Discovery, fetcher, prefetch window, sequencer
//! └── config.rs        # LakeConfig
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use lake_framework::{streamer, FsLakeStore, LakeConfig, Network};
//!
//! # async fn run() -> Result<(), lake_framework::LakeError> {
//! let config = LakeConfig::for_network(Network::Testnet, 42_376_888);
//! let store = Arc::new(FsLakeStore::new("/var/lib/lake/testnet"));
//! let (handle, mut records) = streamer(config, store)?;
//!
//! while let Some(record) = records.recv().await {
//!     println!("{} with {} shards", record.height(), record.shards.len());
//! }
//! handle.abort();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

/// Lake fixtures for tests.
///
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use adapters::{FsLakeStore, InMemoryLakeStore, InjectedResponse};
pub use algorithms::{block_key, check_continuity, height_marker, shard_key, Continuity};
pub use application::{streamer, PrefetchWindow, RecordFetcher, Sequencer, StreamerHandle};
pub use config::LakeConfig;
pub use domain::{
    BlockDocument, BlockHeader, BlockHeight, BlockRecord, CryptoHash, LakeError, Network,
    SequencerState, ShardId, ShardRecord, StoreError, StreamRecord, UnknownNetwork,
    first_violation, invariant_chain_linked, invariant_height_advances, invariant_record_complete,
};
pub use ports::{LakeStore, ListPage, ListRequest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
