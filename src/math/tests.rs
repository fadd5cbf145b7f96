use super::physics::*;

#[test]
fn test_exner_at_reference_pressure() {
    let constants = Constants::default();
    assert!((exner(1000.0, &constants) - 1.0).abs() < 1e-12);
    assert!(exner(850.0, &constants) < 1.0);
}

#[test]
fn test_cloud_water_coefficient() {
    let constants = Constants::default();
    // At 1000 mb the Exner function is 1
    let expected = 2.5e6 / 1004.67 - 1.61 * 300.0;
    let result = cloud_water_coefficient(1000.0, 300.0, &constants);
    assert!((result - expected).abs() < 1e-9);
}

#[test]
fn test_skewness() {
    // 0.5 / (1.0 + 0.0)^1.5
    assert_eq!(skewness(0.5, 1.0, 0.0), 0.5);
    let skw = skewness(0.2, 0.4, SKW_EPSILON);
    assert!((skw - 0.2 / (0.4016f64).powf(1.5)).abs() < 1e-12);
}

#[test]
fn test_epsilon_literals() {
    assert_eq!(SKW_EPSILON, 1.6e-3);
    assert_eq!(SKRT_EPSILON, 4e-16);
    assert_eq!(SKTHL_EPSILON_UNRESOLVED, 4e-16);
}

#[test]
fn test_theta_l_with_ice() {
    let constants = Constants::default();
    let thlm = theta_l_with_ice(300.0, 310.0, 290.0, 0.0, &constants);
    assert_eq!(thlm, 300.0);
    let thlm = theta_l_with_ice(300.0, 290.0, 290.0, 1.0, &constants);
    assert!((thlm - 302.5004).abs() < 1e-9);
}

#[test]
fn test_flux_conversions() {
    assert_eq!(number_per_kg(2.0, 1.0), 2.0e6);
    assert!((kinematic_flux(1004.0, 1.0, 1004.0) - 1.0).abs() < 1e-12);
}
