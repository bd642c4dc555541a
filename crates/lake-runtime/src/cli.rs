//! Command-line arguments and config resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use lake_framework::{BlockHeight, LakeConfig, Network};

/// Lake Runtime: stream finalized blocks from a local lake mirror
#[derive(Parser, Debug)]
#[command(name = "lake-runtime")]
#[command(about = "Stream finalized blocks, with their shards, from a local mirror of the block lake")]
#[command(group(ArgGroup::new("start").required(true).args(["start_height", "from_latest"])))]
pub struct Args {
    /// Directory holding the lake layout (one sub-directory per height)
    #[arg(short, long)]
    pub data_dir: PathBuf,

    /// Network the lake belongs to (mainnet, testnet)
    #[arg(short, long, default_value = "mainnet")]
    pub network: Network,

    /// First height to stream
    #[arg(long)]
    pub start_height: Option<BlockHeight>,

    /// Start at the network's latest final block
    #[arg(long)]
    pub from_latest: bool,

    /// JSON file holding a complete LakeConfig; the flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Heights requested per discovery round
    #[arg(long)]
    pub preload_pool_size: Option<usize>,

    /// Maximum fetches in flight
    #[arg(long)]
    pub window_size: Option<usize>,
}

impl Args {
    /// Build the streamer config, starting at `start_block_height`.
    pub fn lake_config(&self, start_block_height: BlockHeight) -> Result<LakeConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => LakeConfig::for_network(self.network, start_block_height),
        };

        config.start_block_height = start_block_height;
        if let Some(size) = self.preload_pool_size {
            config.blocks_preload_pool_size = size;
        }
        if let Some(size) = self.window_size {
            config.prefetch_window_size = size;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("lake-runtime").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_start_height() {
        let args = parse(&["--data-dir", "/lake", "--start-height", "100"]).unwrap();
        assert_eq!(args.start_height, Some(100));
        assert_eq!(args.network, Network::Mainnet);
        assert!(!args.from_latest);
    }

    #[test]
    fn test_parse_network_is_case_insensitive() {
        let args = parse(&["-d", "/lake", "-n", "TestNet", "--from-latest"]).unwrap();
        assert_eq!(args.network, Network::Testnet);
        assert!(args.from_latest);
    }

    #[test]
    fn test_unknown_network_rejected() {
        assert!(parse(&["-d", "/lake", "-n", "devnet", "--start-height", "1"]).is_err());
    }

    #[test]
    fn test_start_is_required() {
        assert!(parse(&["--data-dir", "/lake"]).is_err());
    }

    #[test]
    fn test_start_height_and_from_latest_conflict() {
        assert!(parse(&["-d", "/lake", "--start-height", "1", "--from-latest"]).is_err());
    }

    #[test]
    fn test_lake_config_from_network_preset() {
        let args = parse(&[
            "-d",
            "/lake",
            "-n",
            "testnet",
            "--start-height",
            "7",
            "--preload-pool-size",
            "50",
            "--window-size",
            "8",
        ])
        .unwrap();

        let config = args.lake_config(7).unwrap();
        assert_eq!(config.s3_bucket_name, "near-lake-data-testnet");
        assert_eq!(config.start_block_height, 7);
        assert_eq!(config.blocks_preload_pool_size, 50);
        assert_eq!(config.prefetch_window_size, 8);
    }

    #[test]
    fn test_zero_window_rejected() {
        let args = parse(&["-d", "/lake", "--start-height", "1", "--window-size", "0"]).unwrap();
        assert!(args.lake_config(1).is_err());
    }

    #[test]
    fn test_lake_config_from_file_with_overrides() {
        let mut stored = LakeConfig::for_testing();
        stored.no_new_data_interval_ms = 500;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&stored).unwrap().as_bytes())
            .unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = parse(&[
            "-d",
            "/lake",
            "--start-height",
            "300",
            "--config",
            &path,
            "--window-size",
            "2",
        ])
        .unwrap();

        let config = args.lake_config(300).unwrap();
        assert_eq!(config.s3_bucket_name, "lake-test");
        assert_eq!(config.no_new_data_interval_ms, 500);
        assert_eq!(config.start_block_height, 300);
        assert_eq!(config.prefetch_window_size, 2);
    }

    #[test]
    fn test_malformed_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = parse(&["-d", "/lake", "--start-height", "1", "--config", &path]).unwrap();
        assert!(args.lake_config(1).is_err());
    }
}
