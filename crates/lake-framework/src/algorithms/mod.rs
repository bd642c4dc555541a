//! # Algorithms Module
//!
//! Pure functions: key layout and chain continuity.

pub mod continuity;
pub mod keys;

pub use continuity::{check_continuity, Continuity};
pub use keys::{
    block_key, height_marker, parse_height_prefix, shard_key, HEIGHT_DIGITS, KEY_DELIMITER,
};
