//! Integration tests for the importer CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use import_test_utils::TestProject;
use predicates::prelude::*;

const SETTINGS: &str = r#"
[[rules]]
pattern = 'Assets/Sprites/(?P<name>\w+)\.png'
bucket = "Sprites"
address = "sprite/${name}"
labels = ["sprite"]

[[rules]]
pattern = "Assets/Art/*/"
match_type = "wildcard"
bucket = "Folders"
"#;

/// Get a Command for the importer binary
fn importer_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("importer"))
}

fn project() -> TestProject {
    let project = TestProject::new();
    project.write_settings("importer.toml", SETTINGS);
    project.asset("Assets/Sprites/hero.png", "guid-hero");
    project.asset("Assets/Other/misc.png", "guid-misc");
    project.folder("Assets/Art/Icons", "guid-icons");
    project
}

fn catalog_json(project: &TestProject) -> serde_json::Value {
    serde_json::from_str(&project.read("catalog.json")).unwrap()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    importer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Asset Importer"));
}

#[test]
fn test_no_command_shows_hint() {
    importer_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("importer --help"));
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_run_creates_entries_and_saves_catalog() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--created", "Assets/Sprites/hero.png", "--created", "Assets/Art/Icons"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 updated"))
        .stdout(predicate::str::contains("Catalog saved"));

    project.assert_file_exists("catalog.json");
    let catalog = catalog_json(&project);
    let hero = &catalog["entries"]["guid-hero"];
    assert_eq!(hero["bucket"], "Sprites");
    assert_eq!(hero["address"], "sprite/hero");
    assert_eq!(hero["labels"], serde_json::json!(["sprite"]));
    assert_eq!(catalog["entries"]["guid-icons"]["bucket"], "Folders");
}

#[test]
fn test_run_unmatched_path_leaves_no_catalog() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--created", "Assets/Other/misc.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog unchanged"));

    project.assert_file_missing("catalog.json");
}

#[test]
fn test_run_move_out_of_coverage_removes_entry() {
    let project = project();
    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--created", "Assets/Sprites/hero.png"])
        .assert()
        .success();

    project.rename("Assets/Sprites/hero.png", "Assets/Other/hero.png");

    importer_cmd()
        .current_dir(project.root())
        .args([
            "run",
            "--moved-from",
            "Assets/Sprites/hero.png",
            "--moved-to",
            "Assets/Other/hero.png",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 removed"));

    assert!(catalog_json(&project)["entries"].get("guid-hero").is_none());
}

#[test]
fn test_run_deleted_asset_and_meta_removes_entry() {
    let project = project();
    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--created", "Assets/Sprites/hero.png"])
        .assert()
        .success();

    project.remove("Assets/Sprites/hero.png");
    project.remove("Assets/Sprites/hero.png.meta");

    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--deleted", "Assets/Sprites/hero.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 removed"))
        .stdout(predicate::str::contains("Catalog saved"));

    assert!(catalog_json(&project)["entries"].get("guid-hero").is_none());
}

#[test]
fn test_run_json_report() {
    let project = project();

    let output = importer_cmd()
        .current_dir(project.root())
        .args(["run", "--json", "--created", "Assets/Sprites/hero.png", "--created", "Assets/Sprites/gone.png"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dirty"], true);
    assert_eq!(report["updated"], 1);
    assert_eq!(report["failures"][0]["path"], "Assets/Sprites/gone.png");
}

#[test]
fn test_run_dry_run_does_not_write() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--dry-run", "--created", "Assets/Sprites/hero.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"))
        .stdout(predicate::str::contains("sprite/hero"));

    project.assert_file_missing("catalog.json");
}

#[test]
fn test_run_requires_paths() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No paths given"));
}

#[test]
fn test_run_rejects_unpaired_moves() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--moved-from", "a.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--moved-from was given 1 times"));
}

#[test]
fn test_run_without_settings_fails() {
    let dir = tempfile::tempdir().unwrap();

    importer_cmd()
        .current_dir(dir.path())
        .args(["run", "--created", "Assets/a.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings file not found"));
}

#[test]
fn test_run_with_no_rules_fails() {
    let project = TestProject::new();
    project.write_settings("importer.toml", "allow_bucket_creation = true\n");

    importer_cmd()
        .current_dir(project.root())
        .args(["run", "--created", "Assets/a.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing configuration"));
}

// ============================================================================
// Rescan, Validate, Explain
// ============================================================================

#[test]
fn test_rescan_imports_folder_contents() {
    let project = project();
    project.asset("Assets/Sprites/villain.png", "guid-villain");

    importer_cmd()
        .current_dir(project.root())
        .args(["rescan", "Assets/Sprites"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 updated"));

    let catalog = catalog_json(&project);
    assert_eq!(catalog["entries"]["guid-villain"]["address"], "sprite/villain");
}

#[test]
fn test_validate_lists_rules() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 rules"))
        .stdout(predicate::str::contains("Folders"));
}

#[test]
fn test_validate_reports_bad_pattern() {
    let project = TestProject::new();
    project.write_settings("importer.toml", "[[rules]]\npattern = 'Assets/(oops'\n");

    importer_cmd()
        .current_dir(project.root())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pattern"));
}

#[test]
fn test_explain_matching_path() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .args(["explain", "Assets/Sprites/hero.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sprites"))
        .stdout(predicate::str::contains("sprite/hero"));
}

#[test]
fn test_explain_directory_json() {
    let project = project();

    let output = importer_cmd()
        .current_dir(project.root())
        .args(["explain", "--dir", "--json", "Assets/Art/Icons"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["action"], "create-or-update");
    assert_eq!(summary["bucket"], "Folders");
}

#[test]
fn test_explain_unmatched_path() {
    let project = project();

    importer_cmd()
        .current_dir(project.root())
        .args(["explain", "Assets/Other/misc.png"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rule matches"));
}
