//! Binary-level tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_sample(path: &std::path::Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("x", 2).unwrap();
    file.add_dimension("y", 3).unwrap();
    let mut level = file.add_variable::<f64>("level", &["x", "y"]).unwrap();
    level
        .put_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], ..)
        .unwrap();
}

#[test]
fn reports_missing_files() {
    Command::cargo_bin("stratus")
        .unwrap()
        .arg("/definitely/not/here.nc")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn help_mentions_the_purpose() {
    Command::cargo_bin("stratus")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("hierarchical"));
}

#[test]
fn dumps_the_tree_of_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.nc");
    write_sample(&path);

    Command::cargo_bin("stratus")
        .unwrap()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("level"))
        .stdout(predicate::str::contains("x=2"));
}

#[test]
fn prints_a_slice_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.nc");
    write_sample(&path);

    Command::cargo_bin("stratus")
        .unwrap()
        .arg(&path)
        .args(["--slice", "level", "--row", "0", "--col", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6.0000"));
}

#[test]
fn unknown_group_fails_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.nc");
    write_sample(&path);

    Command::cargo_bin("stratus")
        .unwrap()
        .arg(&path)
        .args(["--group", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
