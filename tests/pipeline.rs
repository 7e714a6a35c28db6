use semver_lineage::backfill::BackfillMode;
use semver_lineage::coords;
use semver_lineage::pipeline::{self, Options};
use semver_lineage::report::{API_EXTENSIONS_FILE, BREAKING_CHANGES_FILE, HEADER};
use semver_lineage::store::{Access, CallableRecord, SnapshotStore};
use semver_lineage::LineageError;
use std::fs;
use std::io::Write;
use std::path::Path;

const WIDGET: &str = "com.acme:widget";

fn rec(signature: &str, version: &str, id: i64) -> CallableRecord {
    CallableRecord::public(1, WIDGET, version, signature, id)
}

/// `a()` lives everywhere, `b()` is dropped in 1.1.0, `c()` sneaks into the
/// 1.0.1 patch, `d()` arrives with 2.0.0.
fn records() -> Vec<CallableRecord> {
    let mut records = Vec::new();
    for (i, version) in ["1.0.0", "1.0.1", "1.1.0", "1.2.0", "2.0.0"].iter().enumerate() {
        records.push(rec("a()", version, 10 + i as i64));
    }
    records.push(rec("b()", "1.0.0", 20));
    records.push(rec("b()", "1.0.1", 21));
    records.push(rec("c()", "1.0.1", 31));
    records.push(rec("c()", "1.1.0", 32));
    records.push(rec("c()", "1.2.0", 33));
    records.push(rec("d()", "2.0.0", 40));
    records.push(rec("s()", "1.2.1-SNAPSHOT", 50));
    records.push(CallableRecord {
        access: Access::Private,
        ..rec("p()", "1.1.0", 60)
    });
    records.push(CallableRecord::public(2, "org.example:other", "1.0.0", "z()", 70));
    records
}

fn write_store(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("store.jsonl");
    let mut file = fs::File::create(&path).unwrap();
    for record in records() {
        writeln!(file, "{}", serde_json::to_string(&record).unwrap()).unwrap();
    }
    path
}

fn write_coords(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("coords.txt");
    fs::write(&path, contents).unwrap();
    path
}

fn run(dir: &Path, coords_text: &str, options: &Options, include_clean: bool) -> (String, String) {
    let store = SnapshotStore::open(&write_store(dir)).unwrap();
    let input = coords::read_coordinates(&write_coords(dir, coords_text)).unwrap();
    let out = dir.join("out");

    let reports = pipeline::analyze(&input, &store, options).unwrap();
    let (breaking, extensions) = reports.write(&out, include_clean).unwrap();
    assert_eq!(breaking, out.join(BREAKING_CHANGES_FILE));
    assert_eq!(extensions, out.join(API_EXTENSIONS_FILE));

    (fs::read_to_string(breaking).unwrap(), fs::read_to_string(extensions).unwrap())
}

#[test]
fn reports_both_violation_classes() {
    let dir = tempfile::tempdir().unwrap();
    let (breaking, extensions) = run(dir.path(), "com.acme:widget:1.2.0\n", &Options::default(), false);

    let breaking: Vec<&str> = breaking.lines().collect();
    // b() is gone from 1.2.0, so its identifier there is unresolved
    assert_eq!(breaking, vec![HEADER, "com.acme:widget:1:1/4:[-1/1.0.1]"]);

    let extensions: Vec<&str> = extensions.lines().collect();
    assert_eq!(extensions, vec![HEADER, "com.acme:widget:1:1/4:[31/1.0.1]"]);
}

#[test]
fn clean_groups_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let (breaking, _) = run(dir.path(), "com.acme:widget:1.2.0\n", &Options::default(), true);

    let breaking: Vec<&str> = breaking.lines().collect();
    assert_eq!(
        breaking,
        vec![HEADER, "com.acme:widget:1:1/4:[-1/1.0.1]", "com.acme:widget:2:0/4:[]"]
    );
}

#[test]
fn rebinding_uses_the_input_version() {
    let dir = tempfile::tempdir().unwrap();
    let (breaking, extensions) = run(dir.path(), "com.acme:widget:1.0.0\n", &Options::default(), false);

    assert!(breaking.lines().any(|line| line == "com.acme:widget:1:1/4:[20/1.0.1]"));
    // extensions are never rebound
    assert!(extensions.lines().any(|line| line == "com.acme:widget:1:1/4:[31/1.0.1]"));
}

#[test]
fn store_identifiers_can_be_kept() {
    let dir = tempfile::tempdir().unwrap();
    let options = Options {
        backfill: BackfillMode::Unresolved,
        progress: false,
    };
    let (breaking, _) = run(dir.path(), "com.acme:widget:1.2.0\n", &options, false);

    let breaking: Vec<&str> = breaking.lines().collect();
    assert_eq!(breaking, vec![HEADER, "com.acme:widget:1:1/4:[21/1.0.1]"]);
}

#[test]
fn a_failed_write_leaves_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::from_records(records());
    let input = vec![semver_lineage::model::PackageCoordinate::new("com.acme", "widget", "1.2.0")];
    let reports = pipeline::analyze(&input, &store, &Options::default()).unwrap();

    let out = dir.path().join("out");
    // a directory in the way of the second report
    fs::create_dir_all(out.join(API_EXTENSIONS_FILE)).unwrap();

    assert!(reports.write(&out, false).is_err());
    assert!(!out.join(BREAKING_CHANGES_FILE).exists());
    assert!(out.join(API_EXTENSIONS_FILE).is_dir());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}

#[test]
fn repeated_runs_are_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let input = "com.acme:widget:1.2.0\ncom.acme:widget:1.0.0\n";
    assert_eq!(
        run(first.path(), input, &Options::default(), true),
        run(second.path(), input, &Options::default(), true)
    );
}

#[test]
fn qualified_versions_are_not_expanded() {
    let store = SnapshotStore::from_records(records());
    let input = vec![semver_lineage::model::PackageCoordinate::new("com.acme", "widget", "1.2.0")];

    let reports = pipeline::analyze(&input, &store, &Options::default()).unwrap();
    let versions: Vec<&str> = reports.expanded.iter().map(|c| c.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.0", "1.0.1", "1.1.0", "1.2.0", "2.0.0"]);
}

#[test]
fn malformed_coordinates_abort_before_any_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_coords(dir.path(), "com.acme:widget\n");

    let result = coords::read_coordinates(&path);
    assert!(matches!(result, Err(LineageError::InvalidCoordinateLine { line_number: 1, .. })));
    assert!(!dir.path().join("out").exists());
}
