// src/detector.rs

use crate::aggregate::{self, ViolationAggregator};
use crate::lineage::Lineage;
use crate::model::*;
use crate::version::Version;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};
use std::time::Instant;
use tracing::{debug, info};

/// The two semver contracts checked over every lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// A method appears without a minor or major bump
    IllegalExtension,
    /// A method disappears without a major bump
    BreakingRemoval,
}

impl Pass {
    pub fn label(self) -> &'static str {
        match self {
            Pass::IllegalExtension => "illegal API extensions",
            Pass::BreakingRemoval => "breaking changes",
        }
    }
}

pub fn detect_extensions(lineage: &Lineage, bar: ProgressBar) -> ViolationMap {
    detect(lineage, Pass::IllegalExtension, bar)
}

pub fn detect_removals(lineage: &Lineage, bar: ProgressBar) -> ViolationMap {
    detect(lineage, Pass::BreakingRemoval, bar)
}

/// Runs one pass over every (package, major) group. Groups are independent,
/// so they are checked in parallel and the per-group maps unioned.
pub fn detect(lineage: &Lineage, pass: Pass, bar: ProgressBar) -> ViolationMap {
    let start = Instant::now();
    bar.set_message(pass.label());

    let violations = lineage
        .history
        .par_iter()
        .progress_with(bar.clone())
        .map(|(_, methods)| detect_group(lineage, methods, pass))
        .reduce(ViolationMap::new, aggregate::merge);
    bar.finish_and_clear();

    info!(
        pass = pass.label(),
        groups = violations.len(),
        violating = violations.values().filter(|record| !record.is_empty()).count(),
        elapsed = ?start.elapsed(),
        "pass complete"
    );
    violations
}

fn detect_group(lineage: &Lineage, methods: &BTreeMap<String, OccurrenceHistory>, pass: Pass) -> ViolationMap {
    let mut aggregator = ViolationAggregator::new();

    for (signature, history) in methods {
        let versions = lineage.versions(history.first().map_or(0, |o| o.package_id));
        let mut found = 0;

        match pass {
            // newest to oldest: each occurrence is the earliest sighting so far
            Pass::IllegalExtension => {
                for (idx, current) in history.iter().enumerate().rev() {
                    let nearest_with = idx.checked_sub(1).map(|prev| &history[prev].version);
                    let nearest_without = previous_in_minor_line(versions, &current.version);
                    found += detect_gap(&mut aggregator, lineage, current, nearest_with, nearest_without) as usize;
                }
            }
            // oldest to newest: each occurrence is the latest sighting so far
            Pass::BreakingRemoval => {
                for (idx, current) in history.iter().enumerate() {
                    let nearest_with = history.get(idx + 1).map(|next| &next.version);
                    let nearest_without = next_in_major_line(versions, &current.version);
                    found += detect_gap(&mut aggregator, lineage, current, nearest_with, nearest_without) as usize;
                }
            }
        }

        if found > 0 {
            debug!(pass = pass.label(), signature = %signature, found, "violating method");
        }
    }

    aggregator.finish()
}

/// Closest strictly older version sharing `current`'s major and minor.
fn previous_in_minor_line<'a>(versions: Option<&'a BTreeSet<Version>>, current: &Version) -> Option<&'a Version> {
    versions?.range::<Version, _>(..current).rev().find(|v| v.same_minor_line(current))
}

/// Closest strictly newer version sharing `current`'s major.
fn next_in_major_line<'a>(versions: Option<&'a BTreeSet<Version>>, current: &Version) -> Option<&'a Version> {
    versions?
        .range::<Version, _>((Excluded(current), Unbounded))
        .find(|v| v.major() == current.major())
}

/// Checks `current` and records the outcome against its group, creating the
/// group on first sight. Returns whether a violation was recorded.
///
/// `nearest_with_method` is the next version in traversal order that still
/// carries the method; `nearest_without_method` the closest sibling version
/// in traversal order, which is presumed to lack it.
pub fn detect_gap(
    aggregator: &mut ViolationAggregator,
    lineage: &Lineage,
    current: &MethodOccurrence,
    nearest_with_method: Option<&Version>,
    nearest_without_method: Option<&Version>,
) -> bool {
    let group = MajorVersionGroup::new(
        current.group_key(),
        current.package_name.clone(),
        lineage.method_count(current.package_id),
    );
    let violation = is_gap(nearest_with_method, nearest_without_method);
    aggregator.observe(group, current, violation);
    violation
}

/// The comparison both passes share.
pub fn is_gap(nearest_with_method: Option<&Version>, nearest_without_method: Option<&Version>) -> bool {
    match (nearest_with_method, nearest_without_method) {
        // no sibling to compare against
        (_, None) => false,
        // extreme occurrence, and a sibling lacks the method
        (None, Some(_)) => true,
        (Some(with), Some(without)) => with != without,
    }
}
