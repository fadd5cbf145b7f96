use plotgen_rust::case::Case;
use plotgen_rust::cases::BenchmarkRoots;
use plotgen_rust::io::{
    CompositeDataset, CoordinateKind, DatasetAccessor, ModelKind, NetCdfDataset,
};
use plotgen_rust::resolve::resolve;
use plotgen_rust::series::PanelKind;
use plotgen_rust::variables::VariableDescriptor;
use plotgen_rust::windowing::{TimeWindow, WindowBounds};
use std::path::Path;

const ALTITUDE: [f64; 4] = [0.0, 500.0, 1000.0, 1500.0];

/// Write a CLUBB-style `(time, altitude, latitude, longitude)` file
fn write_zt(path: &Path, records: usize) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", records).unwrap();
    file.add_dimension("altitude", ALTITUDE.len()).unwrap();
    file.add_dimension("latitude", 1).unwrap();
    file.add_dimension("longitude", 1).unwrap();

    let times: Vec<f64> = (1..=records).map(|r| r as f64).collect();
    let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
    time.put_attribute("units", "minutes since 1969-06-24 00:00:00").unwrap();
    time.put_values(&times, ..).unwrap();

    let mut altitude = file.add_variable::<f64>("altitude", &["altitude"]).unwrap();
    altitude.put_values(&ALTITUDE, ..).unwrap();

    let mut thlm_values = Vec::with_capacity(records * ALTITUDE.len());
    for _ in 0..records {
        for k in 0..ALTITUDE.len() {
            thlm_values.push(300.0 + k as f64);
        }
    }
    // Top level of the first record is a fill value
    thlm_values[ALTITUDE.len() - 1] = 1.0e36;

    let mut thlm = file
        .add_variable::<f64>("thlm", &["time", "altitude", "latitude", "longitude"])
        .unwrap();
    thlm.put_values(&thlm_values, ..).unwrap();
}

/// Write a surface file with one scalar per record
fn write_sfc(path: &Path, records: usize) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", records).unwrap();
    file.add_dimension("altitude", 1).unwrap();

    let times: Vec<f64> = (1..=records).map(|r| r as f64 * 300.0).collect();
    let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
    time.put_attribute("units", "seconds since 1969-06-24 00:00:00").unwrap();
    time.put_values(&times, ..).unwrap();

    let mut altitude = file.add_variable::<f64>("altitude", &["altitude"]).unwrap();
    altitude.put_values(&[0.0], ..).unwrap();

    let lwp: Vec<f64> = (0..records).map(|r| r as f64 * 0.01).collect();
    let mut var = file.add_variable::<f64>("lwp", &["time", "altitude"]).unwrap();
    var.put_values(&lwp, ..).unwrap();
}

#[test]
fn test_read_clubb_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bomex_zt.nc");
    write_zt(&path, 5);

    let ds = NetCdfDataset::open(ModelKind::Host, &path).unwrap();
    assert!(ds.has_variable("thlm"));
    assert!(!ds.has_variable("rcm"));
    assert_eq!(ds.path().as_deref(), Some(path.as_path()));

    let time = ds.coordinate(CoordinateKind::Time).unwrap();
    assert_eq!(time.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(ds.timestep_seconds().unwrap(), 60.0);
    assert_eq!(ds.coordinate(CoordinateKind::Height).unwrap().to_vec(), ALTITUDE.to_vec());

    let values = ds.read_variable("thlm", TimeWindow::new(0, 1)).unwrap();
    assert_eq!(values.dim(), (2, 4));
    assert!(values[[0, 3]].is_nan());
    assert_eq!(values[[1, 3]], 303.0);
}

#[test]
fn test_read_only_window_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bomex_sfc.nc");
    write_sfc(&path, 5);

    let ds = NetCdfDataset::open(ModelKind::Host, &path).unwrap();
    let values = ds.read_variable("lwp", TimeWindow::new(1, 2)).unwrap();
    assert_eq!(values.dim(), (2, 1));
    assert_eq!(values.column(0).to_vec(), vec![0.01, 0.02]);

    // The end is clamped to the last record; a start past it reads nothing
    let tail = ds.read_variable("lwp", TimeWindow::new(3, 40)).unwrap();
    assert_eq!(tail.column(0).to_vec(), vec![3.0 * 0.01, 4.0 * 0.01]);
    assert_eq!(ds.read_variable("lwp", TimeWindow::new(5, 9)).unwrap().dim(), (0, 1));

    // Variables without a time dimension come back whole
    let altitude = ds.read_variable("altitude", TimeWindow::new(3, 3)).unwrap();
    assert_eq!(altitude.dim(), (1, 1));
}

#[test]
fn test_fill_values_skipped_in_profile_average() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bomex_zt.nc");
    write_zt(&path, 3);

    let ds = NetCdfDataset::open(ModelKind::Host, &path).unwrap();
    let bounds = WindowBounds::new(1.0, 3.0, 0.0, 2000.0).unwrap();
    let line = resolve(&VariableDescriptor::new("thlm"), &ds, &bounds)
        .unwrap()
        .into_line()
        .unwrap();

    assert_eq!(line.data(), &[300.0, 301.0, 302.0, 303.0]);
}

#[test]
fn test_time_converted_from_seconds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bomex_sfc.nc");
    write_sfc(&path, 3);

    let ds = NetCdfDataset::open(ModelKind::Host, &path).unwrap();
    let time = ds.coordinate(CoordinateKind::Time).unwrap();
    for (minutes, expected) in time.iter().zip([5.0, 10.0, 15.0]) {
        assert!((minutes - expected).abs() < 1e-9);
    }
    assert!((ds.timestep_seconds().unwrap() - 300.0).abs() < 1e-6);
}

#[test]
fn test_composite_routes_to_part() {
    let dir = tempfile::tempdir().unwrap();
    let zt = dir.path().join("bomex_zt.nc");
    let sfc = dir.path().join("bomex_sfc.nc");
    write_zt(&zt, 20);
    write_sfc(&sfc, 4);

    let composite = CompositeDataset::new(ModelKind::Host, "host/bomex")
        .with_part("zt", Box::new(NetCdfDataset::open(ModelKind::Host, &zt).unwrap()))
        .with_part("sfc", Box::new(NetCdfDataset::open(ModelKind::Host, &sfc).unwrap()));
    assert!(composite.has_variable("lwp"));
    assert!(composite.has_variable("thlm"));

    // zt is written every minute, sfc every five minutes
    let bounds = WindowBounds::new(10.0, 15.0, 0.0, 2000.0).unwrap();
    let lwp = VariableDescriptor::new("lwp").time_series();
    assert_eq!(lwp.kind(), PanelKind::TimeSeries);

    let line = resolve(&lwp, &composite, &bounds).unwrap().into_line().unwrap();
    assert_eq!(line.len(), 3);
    for (minutes, expected) in line.coordinate().iter().zip([5.0, 10.0, 15.0]) {
        assert!((minutes - expected).abs() < 1e-9);
    }
    assert_eq!(line.data(), &[0.0, 0.01, 0.02]);

    let thlm = resolve(&VariableDescriptor::new("thlm"), &composite, &bounds)
        .unwrap()
        .into_line()
        .unwrap();
    assert_eq!(thlm.data(), &[300.0, 301.0, 302.0, 303.0]);
}

#[test]
fn test_open_catalog_case_from_host_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_zt(&dir.path().join("bomex_zt.nc"), 360);

    let roots = BenchmarkRoots::from_benchmark_root(dir.path().join("benchmarks"), dir.path());
    let case = Case::open_by_name("bomex", &roots, true).unwrap();
    assert_eq!(case.models(), vec![ModelKind::Host]);

    let report = case.run().unwrap();
    let thlm = report.panel("thlm").unwrap();
    assert_eq!(thlm.lines.len(), 1);
    assert_eq!(thlm.lines[0].len(), ALTITUDE.len());
}
