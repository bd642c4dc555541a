//! Lake fixtures shared by unit and integration tests.

use serde_json::{json, Value};

use crate::adapters::InMemoryLakeStore;
use crate::algorithms::{block_key, shard_key};
use crate::domain::{
    BlockDocument, BlockHeader, BlockHeight, BlockRecord, CryptoHash, ShardId, ShardRecord,
    StreamRecord,
};

/// `prev_hash` of the first block of every fixture chain.
pub const GENESIS_PREV_HASH: &str = "GENESIS";

/// Fixture hash of `height`.
pub fn hash_for(height: BlockHeight) -> CryptoHash {
    CryptoHash::new(format!("H{}", height))
}

/// A block and its shards, renderable as lake documents.
#[derive(Clone, Debug)]
pub struct FixtureBlock {
    /// Block height
    pub height: BlockHeight,
    /// Block hash
    pub hash: CryptoHash,
    /// Predecessor hash
    pub prev_hash: CryptoHash,
    /// Number of shards (chunks)
    pub shard_count: u64,
}

impl FixtureBlock {
    /// Create a fixture block.
    pub fn new(
        height: BlockHeight,
        hash: impl Into<CryptoHash>,
        prev_hash: impl Into<CryptoHash>,
        shard_count: u64,
    ) -> Self {
        Self {
            height,
            hash: hash.into(),
            prev_hash: prev_hash.into(),
            shard_count,
        }
    }

    /// Same block, but pointing at a different predecessor.
    pub fn with_prev_hash(&self, prev_hash: impl Into<CryptoHash>) -> Self {
        Self {
            prev_hash: prev_hash.into(),
            ..self.clone()
        }
    }

    fn chunks(&self) -> Vec<Value> {
        (0..self.shard_count)
            .map(|id| json!({ "shard_id": id, "chunk_hash": format!("C{}-{}", self.height, id) }))
            .collect()
    }

    /// `block.json` body.
    pub fn block_json(&self) -> Vec<u8> {
        json!({
            "author": "test.near",
            "header": {
                // The lake writes u64 heights as strings.
                "height": self.height.to_string(),
                "hash": self.hash,
                "prev_hash": self.prev_hash,
                "timestamp": 1_700_000_000u64 + self.height,
            },
            "chunks": self.chunks(),
        })
        .to_string()
        .into_bytes()
    }

    /// `shard_{id}.json` body.
    pub fn shard_json(&self, shard_id: ShardId) -> Vec<u8> {
        json!({
            "shard_id": shard_id,
            "chunk": { "author": "test.near", "transactions": [] },
            "receipt_execution_outcomes": [],
            "state_changes": [],
        })
        .to_string()
        .into_bytes()
    }

    /// Decoded form of [`Self::shard_json`].
    pub fn shard_record(&self, shard_id: ShardId) -> ShardRecord {
        ShardRecord {
            shard_id,
            chunk: Some(json!({ "author": "test.near", "transactions": [] })),
            receipt_execution_outcomes: vec![],
            state_changes: vec![],
        }
    }

    /// Decoded form of [`Self::block_json`].
    pub fn block_record(&self) -> BlockRecord {
        let mut extra = serde_json::Map::new();
        extra.insert("timestamp".to_string(), json!(1_700_000_000u64 + self.height));
        BlockRecord::from(BlockDocument {
            author: "test.near".to_string(),
            header: BlockHeader {
                height: self.height,
                hash: self.hash.clone(),
                prev_hash: self.prev_hash.clone(),
                extra,
            },
            chunks: self.chunks(),
        })
    }

    /// The record the streamer should deliver for this block.
    pub fn stream_record(&self) -> StreamRecord {
        StreamRecord {
            block: self.block_record(),
            shards: (0..self.shard_count).map(|id| self.shard_record(id)).collect(),
        }
    }

    /// Write the block and all of its shards into `store`.
    pub fn put_into(&self, store: &InMemoryLakeStore) {
        store.put(block_key(self.height), self.block_json());
        for id in 0..self.shard_count {
            store.put(shard_key(self.height, id), self.shard_json(id));
        }
    }
}

/// A correctly linked chain over `heights` (gaps allowed), `H{height}`
/// hashes, every block with `shard_count` shards.
pub fn chain(heights: &[BlockHeight], shard_count: u64) -> Vec<FixtureBlock> {
    let mut prev = CryptoHash::new(GENESIS_PREV_HASH);
    heights
        .iter()
        .map(|&height| {
            let block = FixtureBlock::new(height, hash_for(height), prev.clone(), shard_count);
            prev = block.hash.clone();
            block
        })
        .collect()
}

/// Store populated with `blocks`.
pub fn store_with(blocks: &[FixtureBlock]) -> InMemoryLakeStore {
    let store = InMemoryLakeStore::new();
    for block in blocks {
        block.put_into(&store);
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_json_decodes_to_fixture_record() {
        let block = FixtureBlock::new(7, "H7", "H6", 3);
        let decoded = BlockRecord::from_json(&block.block_json()).unwrap();
        assert_eq!(decoded, block.block_record());

        let shard = ShardRecord::from_json(&block.shard_json(2)).unwrap();
        assert_eq!(shard, block.shard_record(2));
    }

    #[test]
    fn test_chain_links() {
        let blocks = chain(&[5, 6, 9], 1);
        assert_eq!(blocks[0].prev_hash.as_str(), GENESIS_PREV_HASH);
        assert_eq!(blocks[1].prev_hash, blocks[0].hash);
        assert_eq!(blocks[2].prev_hash, hash_for(6));
    }
}
