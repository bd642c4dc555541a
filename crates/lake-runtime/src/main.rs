//! # Lake Runtime
//!
//! Streams blocks out of a local mirror of the block lake and prints one
//! line per block.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments, install logging (`RUST_LOG`, default `info`)
//! 2. Resolve the start height (explicit, or latest final block over RPC)
//! 3. Build and validate the `LakeConfig`
//! 4. Spawn the streamer over an `FsLakeStore`
//! 5. Print records until the stream ends or Ctrl-C

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lake_framework::{streamer, FsLakeStore, StreamRecord};
use lake_runtime::{fetch_latest_final_height, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let start_height = match args.start_height {
        Some(height) => height,
        None => {
            let height = fetch_latest_final_height(args.network)
                .await
                .context("Failed to fetch the latest final block height")?;
            info!("Latest final block on {} is #{}", args.network, height);
            height
        }
    };

    let config = args.lake_config(start_height)?;
    let store = Arc::new(FsLakeStore::new(args.data_dir.clone()));

    info!("===========================================");
    info!("  Lake Runtime v{}", lake_framework::VERSION);
    info!("  Network: {}", args.network);
    info!("  Lake: {}", store.root().display());
    info!("  Bucket: {} ({})", config.s3_bucket_name, config.s3_region_name);
    info!("  Start height: {}", config.start_block_height);
    info!("===========================================");

    let (handle, mut records) = streamer(config, store)?;

    loop {
        tokio::select! {
            record = records.recv() => match record {
                Some(record) => print_record(&record),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, stopping the streamer");
                handle.abort();
                return Ok(());
            }
        }
    }

    // The channel closed: the streamer finished, either cleanly or not.
    match handle.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("Streamer stopped: {}", e);
            Err(e.into())
        }
        Err(e) => Err(e).context("Streamer task failed"),
    }
}

fn print_record(record: &StreamRecord) {
    println!(
        "Received Block #{} {} ({} shards)",
        record.height(),
        record.block.hash,
        record.shards.len()
    );
}
