// src/aggregate.rs

use crate::model::{MajorVersionGroup, MethodOccurrence, ViolationMap};

/// The outcome of checking one occurrence against its lineage
#[derive(Debug, Clone)]
pub struct ViolationEvent {
    pub group: MajorVersionGroup,
    pub occurrence: MethodOccurrence,
    pub is_violation: bool,
}

/// Folds detector outcomes into a [`ViolationMap`].
///
/// Every observed group gets an entry, violating or not; the first group
/// value inserted for a key is the one kept.
#[derive(Debug, Default)]
pub struct ViolationAggregator {
    violations: ViolationMap,
}

impl ViolationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, group: MajorVersionGroup, occurrence: &MethodOccurrence, is_violation: bool) {
        let record = self.violations.entry(group).or_default();
        if is_violation {
            record.record(occurrence.clone());
        }
    }

    pub fn finish(self) -> ViolationMap {
        self.violations
    }
}

pub fn aggregate(events: impl IntoIterator<Item = ViolationEvent>) -> ViolationMap {
    let mut aggregator = ViolationAggregator::new();
    for event in events {
        aggregator.observe(event.group, &event.occurrence, event.is_violation);
    }
    aggregator.finish()
}

/// Union of two maps. Records under the same key are combined.
pub fn merge(mut into: ViolationMap, from: ViolationMap) -> ViolationMap {
    for (group, record) in from {
        let target = into.entry(group).or_default();
        for occurrence in record.implicated().iter().cloned() {
            target.record(occurrence);
        }
    }
    into
}
