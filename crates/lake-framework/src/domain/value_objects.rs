//! # Domain Value Objects
//!
//! Immutable value types shared by every layer.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position in the append-only block sequence. Gaps are legal.
pub type BlockHeight = u64;

/// Shard identifier inside a block.
pub type ShardId = u64;

/// Opaque, printable block hash.
///
/// Only ever compared for equality; never parsed or recomputed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CryptoHash(String);

impl CryptoHash {
    /// Wrap a hash string.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Borrow the hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CryptoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CryptoHash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CryptoHash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lake network preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Public test network.
    Testnet,
}

impl Network {
    /// All known networks.
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// Lowercase network name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    /// Bucket holding this network's lake data.
    pub fn bucket_name(&self) -> String {
        format!("near-lake-data-{}", self.as_str())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown network name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown network: {given}. Valid values are: mainnet, testnet")]
pub struct UnknownNetwork {
    /// The rejected input
    pub given: String,
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Network::ALL
            .into_iter()
            .find(|n| n.as_str() == lower)
            .ok_or(UnknownNetwork { given: s.to_string() })
    }
}

/// Deserialize a u64 written either as a JSON number or a decimal
/// string. The lake serializes u64 values as strings.
pub(crate) fn u64_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
