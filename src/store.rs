// src/store.rs

use crate::error::{LineageError, Result};
use crate::model::{PackageCoordinate, PackageId, RawOccurrence};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Marks compiler-generated lambda bodies in a signature
const LAMBDA_MARKER: &str = "$Lambda.";

/// Source of packages, versions and callables.
pub trait MethodStore {
    /// Every version stored for `group:artifact`, qualified or not
    fn versions_of(&self, group: &str, artifact: &str) -> Result<Vec<String>>;

    /// Public, internally defined, non-synthetic callables of one package version
    fn methods_of(&self, coordinate: &PackageCoordinate) -> Result<Vec<RawOccurrence>>;

    /// Stored identifier of `signature` in `package_name` at `version`
    fn occurrence_id(&self, package_name: &str, version: &str, signature: &str) -> Result<Option<i64>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

/// One callable as dumped from the metadata database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableRecord {
    pub package_id: PackageId,
    /// `group:artifact`
    pub package_name: String,
    pub version: String,
    pub signature: String,
    #[serde(default)]
    pub callable_id: Option<i64>,
    pub access: Access,
    #[serde(default = "default_true")]
    pub defined: bool,
    #[serde(default = "default_true")]
    pub internal: bool,
}

fn default_true() -> bool {
    true
}

impl CallableRecord {
    /// A visible callable, the common case in fixtures
    pub fn public(package_id: PackageId, package_name: &str, version: &str, signature: &str, callable_id: i64) -> Self {
        Self {
            package_id,
            package_name: package_name.to_string(),
            version: version.to_string(),
            signature: signature.to_string(),
            callable_id: Some(callable_id),
            access: Access::Public,
            defined: true,
            internal: true,
        }
    }

    fn is_api(&self) -> bool {
        self.access == Access::Public && self.defined && self.internal && !self.signature.contains(LAMBDA_MARKER)
    }

    fn to_raw(&self) -> RawOccurrence {
        RawOccurrence {
            signature: self.signature.clone(),
            package_id: self.package_id,
            version: self.version.clone(),
            package_name: self.package_name.clone(),
            occurrence_id: self.callable_id,
        }
    }
}

/// In-memory store loaded from a JSON-lines dump, one [`CallableRecord`] per line.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    by_package: HashMap<String, Vec<CallableRecord>>,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| LineageError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| LineageError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CallableRecord = serde_json::from_str(&line).map_err(|source| LineageError::StoreRecord {
                line_number: idx + 1,
                source,
            })?;
            records.push(record);
        }

        info!(path = %path.display(), records = records.len(), "loaded method store snapshot");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: impl IntoIterator<Item = CallableRecord>) -> Self {
        let mut by_package: HashMap<String, Vec<CallableRecord>> = HashMap::new();
        for record in records {
            by_package.entry(record.package_name.clone()).or_default().push(record);
        }
        Self { by_package }
    }

    fn package(&self, package_name: &str) -> &[CallableRecord] {
        self.by_package.get(package_name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl MethodStore for SnapshotStore {
    fn versions_of(&self, group: &str, artifact: &str) -> Result<Vec<String>> {
        let versions: BTreeSet<&str> = self
            .package(&format!("{}:{}", group, artifact))
            .iter()
            .map(|record| record.version.as_str())
            .collect();
        Ok(versions.into_iter().map(String::from).collect())
    }

    fn methods_of(&self, coordinate: &PackageCoordinate) -> Result<Vec<RawOccurrence>> {
        Ok(self
            .package(&coordinate.package_name())
            .iter()
            .filter(|record| record.version == coordinate.version && record.is_api())
            .map(CallableRecord::to_raw)
            .collect())
    }

    fn occurrence_id(&self, package_name: &str, version: &str, signature: &str) -> Result<Option<i64>> {
        Ok(self
            .package(package_name)
            .iter()
            .find(|record| record.version == version && record.signature == signature)
            .and_then(|record| record.callable_id))
    }
}

/// Queries every coordinate and unions the rows as a set, so overlapping
/// queries do not duplicate occurrences.
pub fn retrieve_all(
    store: &dyn MethodStore,
    coordinates: &[PackageCoordinate],
    bar: &ProgressBar,
) -> Result<BTreeSet<RawOccurrence>> {
    let mut occurrences = BTreeSet::new();
    for coordinate in coordinates {
        let rows = store.methods_of(coordinate)?;
        debug!(coordinate = %coordinate, rows = rows.len(), "retrieved methods");
        occurrences.extend(rows);
        bar.inc(1);
    }
    Ok(occurrences)
}
