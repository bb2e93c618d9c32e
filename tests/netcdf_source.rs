//! Round-trip tests through a real netCDF file.

use std::collections::HashMap;
use std::path::Path;

use stratus::data::{ingest, ElementKind, NetcdfSource};
use stratus::view::project;
use stratus::StratusError;
use tempfile::tempdir;

fn write_sample(path: &Path) {
    let mut file = netcdf::create(path).unwrap();

    file.add_dimension("time", 2).unwrap();
    file.add_dimension("alt", 3).unwrap();

    let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
    time.put_values(&[10.0, 20.0], ..).unwrap();

    let mut temp = file.add_variable::<f64>("temp", &["time", "alt"]).unwrap();
    temp.put_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], ..).unwrap();

    let mut group = file.add_group("obs").unwrap();
    group.add_dimension("n", 2).unwrap();
    let mut count = group.add_variable::<i32>("count", &["n"]).unwrap();
    count.put_values(&[7, 8], ..).unwrap();
}

#[test]
fn ingests_a_real_netcdf_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let source = NetcdfSource::open(&path).unwrap();
    let out = ingest(&source, None).unwrap();
    drop(source);

    assert!(out.report.is_clean());

    let temp = out.root.array("temp").unwrap();
    assert_eq!(temp.dim_names(), &["time", "alt"]);
    assert_eq!(temp.shape(), &[2, 3]);
    assert_eq!(temp.kind(), ElementKind::Float);
    assert_eq!(temp.buffer().value_at(&[1, 2]), Some(6.0));

    // A 1D variable is a coordinate candidate; the file declares its dim.
    let time = out.root.array("time").unwrap();
    assert!(time.is_coord());
    assert_eq!(time.dim_names(), &["time"]);
    assert_eq!(out.root.dims().get("time"), Some(&2));

    let obs = out.root.child("obs").unwrap();
    let count = obs.array("count").unwrap();
    assert_eq!(count.kind(), ElementKind::Int);
    assert_eq!(count.buffer().value_at(&[1]), Some(8.0));
}

#[test]
fn scope_selects_a_group_inside_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let source = NetcdfSource::open(&path).unwrap();
    let out = ingest(&source, Some("obs")).unwrap();
    assert_eq!(out.root.name(), "obs");
    assert!(out.root.array("count").is_some());
}

#[test]
fn missing_scope_is_group_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let source = NetcdfSource::open(&path).unwrap();
    match ingest(&source, Some("nope")) {
        Err(StratusError::GroupNotFound { path }) => assert_eq!(path, "nope"),
        other => panic!("expected GroupNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn projection_uses_file_coordinates_for_labels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.nc");
    write_sample(&path);

    let source = NetcdfSource::open(&path).unwrap();
    let out = ingest(&source, None).unwrap();
    drop(source);

    let temp = out.root.array("temp").unwrap();
    let view = project(temp, 0, 1, &HashMap::new(), &out.root).unwrap();
    assert_eq!(view.row_dim, "time");
    assert_eq!(view.row_labels, vec!["10.0000", "20.0000"]);
    assert_eq!(view.col_labels, vec!["0", "1", "2"]);
    assert_eq!(view.values[(1, 2)], 6.0);
    assert!(view.fixed.is_empty());
}

#[test]
fn opening_a_missing_file_is_fatal() {
    assert!(NetcdfSource::open(Path::new("/no/such/file.nc")).is_err());
}
