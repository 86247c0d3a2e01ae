//! huffpack command-line entry point.
//!
//! - `huffpack compress <file> <key> <bucket>` - compress a local file into the store
//! - `huffpack decompress <key> <file> <bucket>` - fetch an object and restore it

use anyhow::Context;
use clap::{Parser, ValueEnum};
use huffpack::transfer::{compress_and_store, retrieve_and_decompress, TransferConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Compress a local file and store it under a key
    Compress,
    /// Retrieve a stored object and decompress it to a local file
    Decompress,
}

/// Huffman-compress files into a bucket store and restore them.
#[derive(Parser)]
#[command(name = "huffpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(value_enum)]
    mode: Mode,

    /// compress: local file to read. decompress: object key to fetch.
    source: String,

    /// compress: object key to write. decompress: local file to create.
    destination: String,

    /// Bucket holding the object.
    bucket: String,

    /// Root directory of the bucket store.
    #[arg(long, env = "HUFFPACK_STORE_ROOT", default_value = "buckets")]
    store_root: PathBuf,

    /// Directory for staging files. Defaults to the system temp directory.
    #[arg(long, env = "HUFFPACK_STAGING_DIR")]
    staging_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = TransferConfig {
        store_root: cli.store_root,
        staging_dir: cli.staging_dir,
    };
    let store = config.open_store();

    let report = match cli.mode {
        Mode::Compress => compress_and_store(
            &store,
            &config,
            Path::new(&cli.source),
            &cli.bucket,
            &cli.destination,
        )
        .with_context(|| {
            format!(
                "failed to compress {} into {}/{}",
                cli.source, cli.bucket, cli.destination
            )
        })?,
        Mode::Decompress => retrieve_and_decompress(
            &store,
            &config,
            &cli.bucket,
            &cli.source,
            Path::new(&cli.destination),
        )
        .with_context(|| {
            format!(
                "failed to decompress {}/{} into {}",
                cli.bucket, cli.source, cli.destination
            )
        })?,
    };

    log::info!(
        "{:?} finished: {} -> {} bytes (ratio {:.3})",
        cli.mode,
        report.input_bytes,
        report.output_bytes,
        report.ratio()
    );
    Ok(())
}
