use assert_cmd::cargo;
use predicates::prelude::*;

#[test]
fn test_help() {
    cargo::cargo_bin_cmd!("mdn")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-hyperlink"))
        .stdout(predicate::str::contains("--legacy"));
}

#[test]
fn test_no_terms_fails() {
    cargo::cargo_bin_cmd!("mdn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_version() {
    cargo::cargo_bin_cmd!("mdn")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_colour_flags_conflict() {
    cargo::cargo_bin_cmd!("mdn")
        .args(["--color", "--no-color", "array"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_hyperlink_value_checked() {
    cargo::cargo_bin_cmd!("mdn")
        .args(["--hyperlink=never", "array"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_unreachable_service_reports_error() {
    cargo::cargo_bin_cmd!("mdn")
        .args(["--service", "http://127.0.0.1:9", "--timeout", "5", "array"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}
