//! # Lake Runtime
//!
//! Glue around `lake-framework` for the `lake-runtime` binary:
//!
//! - `cli/` - command-line arguments and config resolution
//! - `rpc/` - latest final height lookup over JSON-RPC

pub mod cli;
pub mod rpc;

pub use cli::Args;
pub use rpc::{fetch_latest_final_height, RpcError};
