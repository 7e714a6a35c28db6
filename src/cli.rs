// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Detects semver violations across the release history of packages
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File of `group:artifact:version` coordinates, one per line
    pub coords: PathBuf,

    /// Directory to write breaking_changes.txt and api_extensions.txt into
    pub output: PathBuf,

    /// JSON-lines snapshot of the method store
    #[arg(long, env = "SEMVER_LINEAGE_STORE", default_value = "store.jsonl")]
    pub store: PathBuf,

    /// Also report groups that were checked and found clean
    #[arg(long)]
    pub include_clean: bool,

    /// Keep the identifiers breaking changes were found with, only looking up
    /// those the store left unresolved, instead of rebinding every one to the
    /// input version
    #[arg(long)]
    pub keep_store_ids: bool,

    /// Write the expanded coordinate list to this file
    #[arg(long)]
    pub expanded: Option<PathBuf>,

    /// Worker threads for detection (defaults to one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}
