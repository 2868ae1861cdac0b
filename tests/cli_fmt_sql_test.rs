use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn mdfence() -> Command {
    Command::cargo_bin("mdfence").unwrap()
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

#[test]
fn reformats_sql_fence_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    let content = "# Queries\n\n```sql\nselect a,b from t where a>1;\n```\n\nDone.\n";
    write_file(&file, content);

    mdfence().arg("fmt-sql").arg(&file).assert().success();

    let result = fs::read_to_string(&file).unwrap();
    assert_ne!(result, content);
    // Fence structure and surrounding prose survive.
    assert!(result.starts_with("# Queries\n\n```sql\n"));
    assert!(result.ends_with("\n```\n\nDone.\n"));
}

#[test]
fn formatting_twice_changes_nothing_more() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    write_file(&file, "```sql\nselect a,b from t;\n```\n");

    mdfence().arg("fmt-sql").arg(&file).assert().success();
    let after_first = fs::read_to_string(&file).unwrap();

    mdfence().arg("fmt-sql").arg(&file).assert().success();
    let after_second = fs::read_to_string(&file).unwrap();

    assert_eq!(after_first, after_second);
}

#[test]
fn non_sql_fences_are_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    let content = "```rust\nlet   x=1;\n```\n\n```js\nconst   y=2;\n```\n";
    write_file(&file, content);

    mdfence().arg("fmt-sql").arg(&file).assert().success();

    assert_eq!(fs::read_to_string(&file).unwrap(), content);
}

#[test]
fn check_mode_reports_unformatted_sql_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    let content = "```sql\nselect a,b from t where a>1;\n```\n";
    write_file(&file, content);

    mdfence()
        .arg("fmt-sql")
        .arg("--check")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SQL fences need formatting."));

    assert_eq!(fs::read_to_string(&file).unwrap(), content);
}

#[test]
fn check_mode_passes_after_formatting() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    write_file(&file, "```sql\nselect a,b from t where a>1;\n```\n");

    mdfence().arg("fmt-sql").arg(&file).assert().success();
    mdfence().arg("fmt-sql").arg("--check").arg(&file).assert().success();
}

#[test]
fn invalid_sql_does_not_crash_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    write_file(&file, "```sql\nthis is not ((( sql at all\n```\n");

    mdfence().arg("fmt-sql").arg(&file).assert().success();

    // The fence is still a fence; the run completed normally.
    let result = fs::read_to_string(&file).unwrap();
    assert!(result.starts_with("```sql\n"));
    assert!(result.trim_end().ends_with("```"));
}

#[test]
fn file_without_fences_is_left_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("doc.md");
    let content = "Plain prose.\r\nWith CRLF endings.\r\n";
    write_file(&file, content);

    mdfence().arg("fmt-sql").arg(&file).assert().success();

    assert_eq!(fs::read_to_string(&file).unwrap(), content);
}
