//! # Application Module
//!
//! Discovery, fetching, the prefetch window and the sequencer that ties
//! them together.

pub mod discovery;
pub mod fetcher;
pub mod sequencer;
pub mod window;

pub use discovery::KeyDiscovery;
pub use fetcher::RecordFetcher;
pub use sequencer::{streamer, Sequencer, StreamerHandle};
pub use window::PrefetchWindow;
