use plotgen_rust::io::{CompositeDataset, InMemoryDataset, ModelKind};
use plotgen_rust::resolve::{dataset_window, resolve, ResolveError};
use plotgen_rust::variables::VariableDescriptor;
use plotgen_rust::windowing::{crop_to_height, ConfigurationError, TimeWindow, WindowBounds};

#[test]
fn test_same_bounds_differ_per_sampling() {
    let bounds = WindowBounds::new(181.0, 360.0, 0.0, 2500.0).unwrap();
    let per_minute = InMemoryDataset::new(ModelKind::Host, "host")
        .with_time_minutes((1..=360).map(|m| m as f64).collect());
    let five_minute = InMemoryDataset::new(ModelKind::SamLes, "sam")
        .with_time_minutes((1..=72).map(|r| r as f64 * 5.0).collect());

    let host = dataset_window(&bounds, &per_minute).unwrap().unwrap();
    let sam = dataset_window(&bounds, &five_minute).unwrap().unwrap();

    assert_eq!(host.profile, TimeWindow::new(180, 359));
    assert_eq!(sam.profile, TimeWindow::new(35, 71));
    assert_eq!(sam.series, TimeWindow::new(0, 71));
}

#[test]
fn test_profile_averages_only_window_records() {
    let ds = InMemoryDataset::new(ModelKind::Host, "host")
        .with_height(vec![0.0, 100.0])
        .with_time_minutes(vec![1.0, 2.0, 3.0, 4.0])
        .with_field(
            "thlm",
            ndarray::array![[100.0, 100.0], [300.0, 302.0], [301.0, 304.0], [100.0, 100.0]],
        );
    let bounds = WindowBounds::new(2.0, 3.0, 0.0, 100.0).unwrap();

    let line = resolve(&VariableDescriptor::new("thlm"), &ds, &bounds)
        .unwrap()
        .into_line()
        .unwrap();
    assert_eq!(line.data(), &[300.5, 303.0]);
    assert_eq!(line.coordinate(), &[0.0, 100.0]);
}

#[test]
fn test_inverted_case_bounds_rejected() {
    assert!(WindowBounds::new(360.0, 181.0, 0.0, 2500.0).is_err());
    assert!(WindowBounds::new(181.0, 360.0, 2500.0, 0.0).is_err());
}

#[test]
fn test_nan_case_bounds_rejected() {
    assert!(matches!(
        WindowBounds::new(f64::NAN, 360.0, 0.0, 2500.0),
        Err(ConfigurationError::NonFiniteBound { name: "start_minutes", .. })
    ));
    assert!(matches!(
        plotgen_rust::windowing::resolve_time_window(f64::NAN, 10.0, 60.0, 100),
        Err(ConfigurationError::NonFiniteBound { .. })
    ));
}

#[test]
fn test_height_crop_is_idempotent() {
    let z = [0.0, 250.0, 500.0, 750.0, 1000.0, 1250.0];
    let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let (cz, cv) = crop_to_height(&z, &v, 200.0, 1000.0);
    let (cz2, cv2) = crop_to_height(&cz, &cv, 200.0, 1000.0);
    assert_eq!(cz, cz2);
    assert_eq!(cv, cv2);
    assert_eq!(cz, vec![250.0, 500.0, 750.0, 1000.0]);
}

#[test]
fn test_composite_parts_windowed_on_their_own_sampling() {
    let zt = InMemoryDataset::new(ModelKind::Host, "arm_zt.nc")
        .with_height(vec![0.0, 100.0])
        .with_time_minutes((1..=20).map(|m| m as f64).collect())
        .with_profile("thlm", vec![300.0, 301.0]);
    let sfc = InMemoryDataset::new(ModelKind::Host, "arm_sfc.nc")
        .with_height(vec![0.0])
        .with_time_minutes(vec![5.0, 10.0, 15.0, 20.0])
        .with_series("lwp", vec![0.5, 1.0, 1.5, 2.0]);
    let host = CompositeDataset::new(ModelKind::Host, "host/arm")
        .with_part("zt", Box::new(zt))
        .with_part("sfc", Box::new(sfc));
    let bounds = WindowBounds::new(10.0, 15.0, 0.0, 100.0).unwrap();

    let lwp = resolve(&VariableDescriptor::new("lwp").time_series(), &host, &bounds)
        .unwrap()
        .into_line()
        .unwrap();
    assert_eq!(lwp.coordinate(), &[5.0, 10.0, 15.0]);
    assert_eq!(lwp.data(), &[0.5, 1.0, 1.5]);

    let window = dataset_window(&bounds, &host).unwrap().unwrap();
    assert_eq!(window.profile, TimeWindow::new(9, 14));
    let sfc_window = window.for_variable(&host, "lwp").unwrap();
    assert_eq!(sfc_window.profile, TimeWindow::new(1, 2));
}

#[test]
fn test_part_too_short_for_window_is_configuration_error() {
    let zt = InMemoryDataset::new(ModelKind::Host, "arm_zt.nc")
        .with_height(vec![0.0])
        .with_time_minutes((1..=20).map(|m| m as f64).collect());
    let sfc = InMemoryDataset::new(ModelKind::Host, "arm_sfc.nc")
        .with_height(vec![0.0])
        .with_time_minutes(vec![1.0, 2.0])
        .with_series("lwp", vec![0.5, 1.0]);
    let host = CompositeDataset::new(ModelKind::Host, "host/arm")
        .with_part("zt", Box::new(zt))
        .with_part("sfc", Box::new(sfc));
    let bounds = WindowBounds::new(10.0, 15.0, 0.0, 100.0).unwrap();

    let result = resolve(&VariableDescriptor::new("lwp").time_series(), &host, &bounds);
    assert!(matches!(
        result,
        Err(ResolveError::Configuration(ConfigurationError::StartBeyondData { .. }))
    ));
}
