// src/model.rs

use crate::error::Result;
use crate::version::Version;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a package in the method store
pub type PackageId = i64;

/// Rendered in reports for occurrences without a stored identifier
pub const UNRESOLVED_ID: i64 = -1;

/// `groupNamespace:artifactName:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl PackageCoordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// The store's package name, `group:artifact`
    pub fn package_name(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for PackageCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// One row returned by the method store, before any version parsing
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawOccurrence {
    pub signature: String,
    pub package_id: PackageId,
    pub version: String,
    pub package_name: String,
    pub occurrence_id: Option<i64>,
}

/// A method signature present in a package at a version
#[derive(Debug, Clone)]
pub struct MethodOccurrence {
    pub version: Version,
    pub signature: String,
    pub package_id: PackageId,
    pub package_name: String,
    /// `None` until resolved against the store
    pub occurrence_id: Option<i64>,
}

impl MethodOccurrence {
    pub fn from_raw(raw: &RawOccurrence) -> Result<Self> {
        Ok(Self {
            version: Version::parse(&raw.version)?,
            signature: raw.signature.clone(),
            package_id: raw.package_id,
            package_name: raw.package_name.clone(),
            occurrence_id: raw.occurrence_id,
        })
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            package_id: self.package_id,
            major: self.version.major(),
        }
    }
}

// Ordered by version; the remaining fields only break ties so that
// distinct occurrences never compare equal.
impl Ord for MethodOccurrence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.signature.cmp(&other.signature))
            .then_with(|| self.package_id.cmp(&other.package_id))
            .then_with(|| self.occurrence_id.cmp(&other.occurrence_id))
            .then_with(|| self.package_name.cmp(&other.package_name))
    }
}

impl PartialOrd for MethodOccurrence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MethodOccurrence {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MethodOccurrence {}

impl fmt::Display for MethodOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.occurrence_id.unwrap_or(UNRESOLVED_ID), self.version)
    }
}

/// A package's major-version lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub package_id: PackageId,
    pub major: u32,
}

/// The unit violations are reported against. Identity is the [`GroupKey`];
/// the name and method count ride along from whichever occurrence created it.
#[derive(Debug, Clone)]
pub struct MajorVersionGroup {
    key: GroupKey,
    package_name: String,
    total_method_count: usize,
}

impl MajorVersionGroup {
    pub fn new(key: GroupKey, package_name: impl Into<String>, total_method_count: usize) -> Self {
        Self {
            key,
            package_name: package_name.into(),
            total_method_count,
        }
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn total_method_count(&self) -> usize {
        self.total_method_count
    }
}

impl PartialEq for MajorVersionGroup {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for MajorVersionGroup {}

impl Hash for MajorVersionGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Borrow<GroupKey> for MajorVersionGroup {
    fn borrow(&self) -> &GroupKey {
        &self.key
    }
}

impl PartialOrd for MajorVersionGroup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MajorVersionGroup {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for MajorVersionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.package_name, self.key.major)
    }
}

/// Violations found in one [`MajorVersionGroup`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationRecord {
    count: usize,
    implicated: BTreeSet<MethodOccurrence>,
}

impl ViolationRecord {
    /// Adds `occurrence`; an occurrence already present is not counted twice.
    pub fn record(&mut self, occurrence: MethodOccurrence) {
        if self.implicated.insert(occurrence) {
            self.count += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn implicated(&self) -> &BTreeSet<MethodOccurrence> {
        &self.implicated
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Rebuilds the record with every implicated occurrence passed through `f`.
    pub fn map_occurrences<F>(self, mut f: F) -> Result<Self>
    where
        F: FnMut(MethodOccurrence) -> Result<MethodOccurrence>,
    {
        let mut mapped = ViolationRecord::default();
        for occurrence in self.implicated {
            mapped.record(f(occurrence)?);
        }
        Ok(mapped)
    }
}

impl fmt::Display for ViolationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, occurrence) in self.implicated.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", occurrence)?;
        }
        f.write_str("]")
    }
}

/// Occurrences of one signature, sorted ascending by version
pub type OccurrenceHistory = Vec<MethodOccurrence>;

/// (package, major) -> signature -> history
pub type LineageHistory = HashMap<GroupKey, BTreeMap<String, OccurrenceHistory>>;

/// Every version observed per package, across all majors
pub type VersionUniverse = HashMap<PackageId, BTreeSet<Version>>;

/// Distinct signatures observed per package
pub type MethodCounts = HashMap<PackageId, usize>;

pub type ViolationMap = HashMap<MajorVersionGroup, ViolationRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(version: &str, id: Option<i64>) -> MethodOccurrence {
        MethodOccurrence {
            version: Version::parse(version).unwrap(),
            signature: "/com.acme/Widget.spin()V".to_string(),
            package_id: 7,
            package_name: "com.acme:widget".to_string(),
            occurrence_id: id,
        }
    }

    #[test]
    fn groups_are_identified_by_key_only() {
        let key = GroupKey { package_id: 7, major: 1 };
        let first = MajorVersionGroup::new(key, "com.acme:widget", 10);
        let second = MajorVersionGroup::new(key, "com.acme:widget", 12);
        assert_eq!(first, second);

        let mut map = ViolationMap::new();
        map.insert(first, ViolationRecord::default());
        map.entry(second).or_default();
        assert_eq!(map.len(), 1);
        let (group, _) = map.get_key_value(&key).unwrap();
        assert_eq!(group.total_method_count(), 10);
        assert_eq!(group.to_string(), "com.acme:widget:1");
    }

    #[test]
    fn record_counts_distinct_occurrences() {
        let mut record = ViolationRecord::default();
        record.record(occurrence("1.0.0", Some(3)));
        record.record(occurrence("1.0.0", Some(3)));
        record.record(occurrence("1.1.0", None));
        assert_eq!(record.count(), 2);
        assert_eq!(record.to_string(), "[3/1.0.0, -1/1.1.0]");
    }

    #[test]
    fn occurrences_order_by_version() {
        assert!(occurrence("1.2", Some(99)) < occurrence("1.10", Some(1)));
    }

    #[test]
    fn coordinate_rendering() {
        let coordinate = PackageCoordinate::new("com.acme", "widget", "1.0.0");
        assert_eq!(coordinate.to_string(), "com.acme:widget:1.0.0");
        assert_eq!(coordinate.package_name(), "com.acme:widget");
    }
}
