// src/lineage.rs

use crate::error::Result;
use crate::model::*;
use crate::version::Version;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::info;

/// Everything the detector reads, built once per run
#[derive(Debug, Default)]
pub struct Lineage {
    pub history: LineageHistory,
    pub universe: VersionUniverse,
    pub method_counts: MethodCounts,
}

impl Lineage {
    /// Versions of `package_id` across all majors
    pub fn versions(&self, package_id: PackageId) -> Option<&BTreeSet<Version>> {
        self.universe.get(&package_id)
    }

    pub fn method_count(&self, package_id: PackageId) -> usize {
        self.method_counts.get(&package_id).copied().unwrap_or(0)
    }

    pub fn occurrence_count(&self) -> usize {
        self.history
            .values()
            .flat_map(|methods| methods.values())
            .map(Vec::len)
            .sum()
    }
}

/// Groups raw rows into per-(package, major) histories, sorted by version.
pub fn aggregate(rows: &BTreeSet<RawOccurrence>) -> Result<Lineage> {
    let mut history: LineageHistory = HashMap::new();
    let mut universe: VersionUniverse = HashMap::new();
    let mut signatures: HashMap<PackageId, HashSet<&str>> = HashMap::new();

    for row in rows {
        let occurrence = MethodOccurrence::from_raw(row)?;

        universe
            .entry(occurrence.package_id)
            .or_default()
            .insert(occurrence.version.clone());
        signatures
            .entry(occurrence.package_id)
            .or_default()
            .insert(row.signature.as_str());

        history
            .entry(occurrence.group_key())
            .or_default()
            .entry(occurrence.signature.clone())
            .or_default()
            .push(occurrence);
    }

    for methods in history.values_mut() {
        for occurrences in methods.values_mut() {
            occurrences.sort();
        }
    }

    let method_counts: MethodCounts = signatures
        .into_iter()
        .map(|(package_id, names)| (package_id, names.len()))
        .collect();

    info!(
        groups = history.len(),
        packages = universe.len(),
        rows = rows.len(),
        "built lineage history"
    );

    Ok(Lineage {
        history,
        universe,
        method_counts,
    })
}
