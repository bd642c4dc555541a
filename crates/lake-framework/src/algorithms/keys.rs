//! # Object Keys
//!
//! Lake key layout: one directory-like prefix per height, zero-padded to
//! 12 digits so lexicographic order matches numeric order.
//!
//! ```text
//! 000000000100/block.json
//! 000000000100/shard_0.json
//! 000000000100/shard_1.json
//! 000000000101/block.json
//! ```

use crate::domain::{BlockHeight, ShardId};

/// Delimiter separating the height prefix from the object name.
pub const KEY_DELIMITER: &str = "/";

/// Width heights are zero-padded to.
pub const HEIGHT_DIGITS: usize = 12;

/// `"{height:012}"`, the listing marker for a height.
pub fn height_marker(height: BlockHeight) -> String {
    format!("{:0width$}", height, width = HEIGHT_DIGITS)
}

/// Key of the block document for `height`.
pub fn block_key(height: BlockHeight) -> String {
    format!("{}{}block.json", height_marker(height), KEY_DELIMITER)
}

/// Key of shard `shard_id`'s document for `height`.
pub fn shard_key(height: BlockHeight, shard_id: ShardId) -> String {
    format!(
        "{}{}shard_{}.json",
        height_marker(height),
        KEY_DELIMITER,
        shard_id
    )
}

/// Parse a common prefix such as `"000000000100/"` back into a height.
///
/// Anything else (wrong width, stray objects at the bucket root, missing
/// delimiter) yields `None`.
pub fn parse_height_prefix(prefix: &str) -> Option<BlockHeight> {
    let digits = prefix.strip_suffix(KEY_DELIMITER)?;
    if digits.len() != HEIGHT_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_block_key() {
        assert_eq!(block_key(68914412), "000068914412/block.json");
    }

    #[test]
    fn test_shard_key() {
        assert_eq!(shard_key(100, 3), "000000000100/shard_3.json");
    }

    #[test]
    fn test_parse_height_prefix() {
        assert_eq!(parse_height_prefix("000000000100/"), Some(100));
        assert_eq!(parse_height_prefix("000000000100"), None);
        assert_eq!(parse_height_prefix("100/"), None);
        assert_eq!(parse_height_prefix("index/"), None);
        assert_eq!(parse_height_prefix("00000000010a/"), None);
    }

    #[test]
    fn test_marker_sorts_before_own_prefix() {
        // StartAfter = marker(h) must still list h itself.
        let marker = height_marker(100);
        assert!(format!("{}/", marker) > marker);
        assert!(block_key(100) > marker);
        assert!(block_key(99) < marker);
    }

    proptest! {
        #[test]
        fn prop_marker_order_matches_height_order(a in 0u64..999_999_999_999, b in 0u64..999_999_999_999) {
            prop_assert_eq!(a.cmp(&b), height_marker(a).cmp(&height_marker(b)));
        }

        #[test]
        fn prop_prefix_parses_back(h in 0u64..999_999_999_999) {
            let prefix = format!("{}{}", height_marker(h), KEY_DELIMITER);
            prop_assert_eq!(parse_height_prefix(&prefix), Some(h));
        }
    }
}
