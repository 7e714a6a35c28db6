// src/main.rs

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use semver_lineage::backfill::BackfillMode;
use semver_lineage::cli::Args;
use semver_lineage::coords;
use semver_lineage::pipeline::{self, Options};
use semver_lineage::store::SnapshotStore;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let start_time = Instant::now();

    info!(started = %Utc::now().to_rfc2822(), coords = %args.coords.display(), "starting run");

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to size the worker pool")?;
    }

    let input = coords::read_coordinates(&args.coords)
        .with_context(|| format!("failed to read coordinates from {}", args.coords.display()))?;
    let store = SnapshotStore::open(&args.store).context("failed to open the method store")?;

    let options = Options {
        backfill: if args.keep_store_ids {
            BackfillMode::Unresolved
        } else {
            BackfillMode::Rebind
        },
        progress: !args.quiet,
    };
    let reports = pipeline::analyze(&input, &store, &options).context("analysis aborted")?;

    if let Some(path) = &args.expanded {
        coords::write_coordinates(path, &reports.expanded)
            .with_context(|| format!("failed to write expanded coordinates to {}", path.display()))?;
    }

    let (breaking, extensions) = reports
        .write(&args.output, args.include_clean)
        .with_context(|| format!("failed to write reports into {}", args.output.display()))?;

    info!(
        breaking = %breaking.display(),
        extensions = %extensions.display(),
        elapsed = ?start_time.elapsed(),
        "total time"
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
