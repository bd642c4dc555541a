//! # Outbound Ports
//!
//! The object store the lake lives in.
//!
//! Adapters only need prefix listing with pagination and whole-object
//! reads. Connections behind a `LakeStore` must tolerate concurrent use:
//! up to a full prefetch window of fetches share one handle.

use async_trait::async_trait;

use crate::domain::StoreError;

/// One page request for a delimited prefix listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    /// Delimiter that groups keys into common prefixes (`/` for the lake).
    pub delimiter: String,
    /// Maximum entries the page may hold.
    pub max_keys: usize,
    /// Only keys sorting strictly after this marker are listed.
    pub start_after: String,
    /// Token from the previous page, if continuing.
    pub continuation_token: Option<String>,
}

/// One page of a delimited listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Common prefixes in ascending key order, delimiter included.
    pub common_prefixes: Vec<String>,
    /// Present when more entries follow.
    pub next_continuation_token: Option<String>,
}

/// Object store client - outbound port.
#[async_trait]
pub trait LakeStore: Send + Sync {
    /// List common prefixes under a delimiter, one page at a time.
    async fn list_common_prefixes(&self, request: ListRequest) -> Result<ListPage, StoreError>;

    /// Read a whole object. Missing objects are `StoreError::NotFound`.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Human-readable location (bucket, directory) for logs.
    fn location(&self) -> String;
}
