// src/report.rs

use crate::error::{LineageError, Result};
use crate::model::{MajorVersionGroup, ViolationMap, ViolationRecord};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub const BREAKING_CHANGES_FILE: &str = "breaking_changes.txt";
pub const API_EXTENSIONS_FILE: &str = "api_extensions.txt";

pub const HEADER: &str = "Skip the first line when parsing this file. The format of this file is as follows: \
groupId:artifactId:majorVersion:#violations/#totalMethods:[callable.IDs with BC]";

/// `group:artifact:major:count/total:[id/version, ...]`
pub fn render_line(group: &MajorVersionGroup, record: &ViolationRecord) -> String {
    format!(
        "{}:{}/{}:{}",
        group,
        record.count(),
        group.total_method_count(),
        record
    )
}

/// The full report, header first, groups sorted by key. Groups without a
/// violation are skipped unless `include_clean` is set.
pub fn render(violations: &ViolationMap, include_clean: bool) -> String {
    let mut groups: Vec<(&MajorVersionGroup, &ViolationRecord)> = violations
        .iter()
        .filter(|(_, record)| include_clean || !record.is_empty())
        .collect();
    groups.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::from(HEADER);
    out.push('\n');
    for (group, record) in groups {
        out.push_str(&render_line(group, record));
        out.push('\n');
    }
    out
}

/// A rendered report sitting in a temporary file next to its destination.
/// Dropping it without [`StagedReport::commit`] removes the temporary file.
#[derive(Debug)]
pub struct StagedReport {
    file: NamedTempFile,
    path: PathBuf,
    lines: usize,
}

pub fn stage_report(dir: &Path, file_name: &str, contents: &str) -> Result<StagedReport> {
    let path = dir.join(file_name);
    let mut file = match NamedTempFile::new_in(dir) {
        Ok(file) => file,
        Err(source) => return Err(LineageError::Io { path, source }),
    };
    if let Err(source) = file.write_all(contents.as_bytes()).and_then(|_| file.flush()) {
        return Err(LineageError::Io { path, source });
    }
    Ok(StagedReport {
        file,
        path,
        lines: contents.lines().count().saturating_sub(1),
    })
}

impl StagedReport {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renames the staged file over the destination.
    pub fn commit(self) -> Result<PathBuf> {
        let StagedReport { file, path, lines } = self;
        if let Err(err) = file.persist(&path) {
            return Err(LineageError::Io { path, source: err.error });
        }
        info!(path = %path.display(), lines, "wrote report");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupKey, MethodOccurrence};
    use crate::version::Version;

    fn record_with(versions: &[&str]) -> ViolationRecord {
        let mut record = ViolationRecord::default();
        for (i, version) in versions.iter().enumerate() {
            record.record(MethodOccurrence {
                version: Version::parse(version).unwrap(),
                signature: "m()".to_string(),
                package_id: 1,
                package_name: "com.acme:widget".to_string(),
                occurrence_id: Some(40 + i as i64),
            });
        }
        record
    }

    fn group(package_id: i64, major: u32, total: usize) -> MajorVersionGroup {
        MajorVersionGroup::new(GroupKey { package_id, major }, format!("com.acme:p{}", package_id), total)
    }

    #[test]
    fn line_carries_the_ratio() {
        let line = render_line(&group(1, 1, 10), &record_with(&["1.0.0", "1.1.0"]));
        assert_eq!(line, "com.acme:p1:1:2/10:[40/1.0.0, 41/1.1.0]");
    }

    #[test]
    fn clean_groups_are_skipped_by_default() {
        let violations = ViolationMap::from([
            (group(2, 1, 3), record_with(&["1.0.0"])),
            (group(1, 1, 3), ViolationRecord::default()),
        ]);

        let report = render(&violations, false);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines, vec![HEADER, "com.acme:p2:1:1/3:[40/1.0.0]"]);

        let report = render(&violations, true);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines, vec![HEADER, "com.acme:p1:1:0/3:[]", "com.acme:p2:1:1/3:[40/1.0.0]"]);
    }

    #[test]
    fn staged_report_appears_only_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stage_report(dir.path(), API_EXTENSIONS_FILE, "header\n").unwrap();
        assert!(!staged.path().exists());

        let path = staged.commit().unwrap();
        assert_eq!(path, dir.path().join(API_EXTENSIONS_FILE));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "header\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn dropped_stage_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        drop(stage_report(dir.path(), BREAKING_CHANGES_FILE, "header\n").unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
