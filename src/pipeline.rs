// src/pipeline.rs

use crate::backfill::{self, BackfillMode};
use crate::coords;
use crate::detector;
use crate::error::{LineageError, Result};
use crate::lineage;
use crate::model::{PackageCoordinate, ViolationMap};
use crate::report::{self, API_EXTENSIONS_FILE, BREAKING_CHANGES_FILE};
use crate::store::{self, MethodStore};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub backfill: BackfillMode,
    /// Show progress bars
    pub progress: bool,
}

/// Both violation maps of a run, plus the coordinates that were analysed
#[derive(Debug)]
pub struct Reports {
    pub breaking_changes: ViolationMap,
    pub api_extensions: ViolationMap,
    pub expanded: Vec<PackageCoordinate>,
}

/// Expands `input`, retrieves every method occurrence and runs both passes.
pub fn analyze(input: &[PackageCoordinate], store: &dyn MethodStore, options: &Options) -> Result<Reports> {
    let start = Instant::now();

    let expanded = coords::expand(input, store)?;
    info!(input = input.len(), expanded = expanded.len(), "expanded coordinates");

    let bar = progress_bar(expanded.len() as u64, "Retrieving methods", options.progress);
    let rows = store::retrieve_all(store, &expanded, &bar)?;
    bar.finish_and_clear();
    info!(rows = rows.len(), elapsed = ?start.elapsed(), "finished retrieval of required data");

    let lineage = lineage::aggregate(&rows)?;
    let groups = lineage.history.len() as u64;
    info!(groups, occurrences = lineage.occurrence_count(), "beginning violation detection");

    let api_extensions = detector::detect_extensions(&lineage, progress_bar(groups, "Checking lineages", options.progress));
    let breaking_changes = detector::detect_removals(&lineage, progress_bar(groups, "Checking lineages", options.progress));
    let breaking_changes = backfill::backfill(breaking_changes, input, store, options.backfill)?;

    info!(elapsed = ?start.elapsed(), "analysis complete");
    Ok(Reports {
        breaking_changes,
        api_extensions,
        expanded,
    })
}

impl Reports {
    /// Stages both reports in `dir` and renames them into place. If either
    /// cannot be written, neither report is left behind.
    pub fn write(&self, dir: &Path, include_clean: bool) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir).map_err(|source| LineageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let breaking = report::stage_report(
            dir,
            BREAKING_CHANGES_FILE,
            &report::render(&self.breaking_changes, include_clean),
        )?;
        let extensions = report::stage_report(
            dir,
            API_EXTENSIONS_FILE,
            &report::render(&self.api_extensions, include_clean),
        )?;

        let breaking = breaking.commit()?;
        match extensions.commit() {
            Ok(extensions) => Ok((breaking, extensions)),
            Err(err) => {
                if let Err(cleanup) = fs::remove_file(&breaking) {
                    warn!(path = %breaking.display(), error = %cleanup, "could not remove partial report");
                }
                Err(err)
            }
        }
    }
}

fn progress_bar(len: u64, message: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_message(message);
    bar
}
