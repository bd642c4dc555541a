//! # Ports Module
//!
//! Hexagonal architecture ports. The streamer only has outbound ones; its
//! inbound surface is the delivery channel returned by
//! [`streamer`](crate::streamer).

pub mod outbound;

pub use outbound::*;
