//! # Domain Entities
//!
//! Records as they come out of the lake, and the sequencer's own state.
//!
//! Decoding is plain serde over the lake's JSON documents. Apart from the
//! chain-link fields (`height`, `hash`, `prev_hash`) and the chunk count,
//! the contents are carried through untouched for the consumer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value_objects::{u64_from_number_or_string, BlockHeight, CryptoHash, ShardId};

/// Block header as stored in the lake.
///
/// Every header field besides the chain links lands in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height of this block.
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub height: BlockHeight,
    /// Hash of this block.
    pub hash: CryptoHash,
    /// Hash of the block this one builds on.
    pub prev_hash: CryptoHash,
    /// Remaining header fields, uninterpreted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `block.json` document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    /// Block producer account.
    #[serde(default)]
    pub author: String,
    /// Block header.
    pub header: BlockHeader,
    /// Chunk headers, one per shard.
    pub chunks: Vec<Value>,
}

/// A decoded block. Immutable once constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRecord {
    /// Block height.
    pub height: BlockHeight,
    /// Block hash.
    pub hash: CryptoHash,
    /// Predecessor hash.
    pub prev_hash: CryptoHash,
    /// Shards this block references, in order.
    pub shard_refs: Vec<ShardId>,
    /// Full decoded document.
    pub document: BlockDocument,
}

impl BlockRecord {
    /// Decode a `block.json` body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let document: BlockDocument = serde_json::from_slice(body)?;
        Ok(Self::from(document))
    }
}

impl From<BlockDocument> for BlockRecord {
    fn from(document: BlockDocument) -> Self {
        Self {
            height: document.header.height,
            hash: document.header.hash.clone(),
            prev_hash: document.header.prev_hash.clone(),
            shard_refs: (0..document.chunks.len() as ShardId).collect(),
            document,
        }
    }
}

/// A decoded `shard_{id}.json` document. Opaque to the sequencer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShardRecord {
    /// Shard identifier.
    #[serde(deserialize_with = "u64_from_number_or_string")]
    pub shard_id: ShardId,
    /// Chunk contents, absent when the shard produced no chunk.
    #[serde(default)]
    pub chunk: Option<Value>,
    /// Receipt execution outcomes.
    #[serde(default)]
    pub receipt_execution_outcomes: Vec<Value>,
    /// State changes.
    #[serde(default)]
    pub state_changes: Vec<Value>,
}

impl ShardRecord {
    /// Decode a `shard_{id}.json` body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

/// The unit delivered to consumers: a block and all of its shards.
///
/// Moved into the delivery channel; never shared.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamRecord {
    /// The block.
    pub block: BlockRecord,
    /// Its shards, ordered by shard id.
    pub shards: Vec<ShardRecord>,
}

impl StreamRecord {
    /// Height of the contained block.
    pub fn height(&self) -> BlockHeight {
        self.block.height
    }

    /// True when there is exactly one shard per shard reference, in order.
    pub fn is_complete(&self) -> bool {
        self.shards.len() == self.block.shard_refs.len()
            && self
                .shards
                .iter()
                .zip(&self.block.shard_refs)
                .all(|(shard, id)| shard.shard_id == *id)
    }
}

/// Where the sequencer stands. Only the sequencer mutates it, and only
/// after a record passed the continuity check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencerState {
    /// First height the next discovery round asks for.
    pub next_height_to_request: BlockHeight,
    /// Hash of the last delivered block. `None` until the first delivery.
    pub last_delivered_hash: Option<CryptoHash>,
}

impl SequencerState {
    /// Fresh state starting at `start_height`.
    pub fn new(start_height: BlockHeight) -> Self {
        Self {
            next_height_to_request: start_height,
            last_delivered_hash: None,
        }
    }

    /// Advance past a block that is about to be delivered.
    pub fn record_delivery(&mut self, block: &BlockRecord) {
        self.last_delivered_hash = Some(block.hash.clone());
        self.next_height_to_request = block.height + 1;
    }
}
