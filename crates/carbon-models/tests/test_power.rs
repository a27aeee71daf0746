use approx::assert_relative_eq;
use rstest::rstest;

use carbon_models::cpu::linear::LinearPowerModel;
use carbon_models::cpu::piecewise::PiecewiseLinearPowerModel;
use carbon_models::cpu::spline::SplinePowerModel;
use carbon_models::power_model::{energy_kwh, power_model_for, Interpolation, PowerModel};
use carbon_models::registry::profile::CalibrationPoints;
use carbon_models::registry::InstanceMetricsRegistry;
use carbon_models::vendor::Vendor;

#[test]
fn test_linear_model() {
    let model = LinearPowerModel::new(10., 100.);
    assert_eq!(model.get_power(0.), 10.);
    assert_eq!(model.get_power(50.), 55.);
    assert_eq!(model.get_power(100.), 100.);
    assert_relative_eq!(energy_kwh(model.get_power(50.), 3600.), 0.055);
}

#[test]
fn test_piecewise_model() {
    let model = PiecewiseLinearPowerModel::new(vec![(0., 20.), (10., 40.), (50., 80.), (100., 120.)]);
    assert_eq!(model.get_power(75.), 100.);
    assert_relative_eq!(energy_kwh(model.get_power(75.), 1800.), 0.05);
}

#[rstest]
#[case(0.)]
#[case(10.)]
#[case(50.)]
#[case(100.)]
fn test_spline_reproduces_calibration(#[case] utilization: f64) {
    let registry = InstanceMetricsRegistry::bundled().unwrap();
    for profile in registry.profiles(Vendor::Aws) {
        let Some(calibration) = profile.consumption.calibration else {
            continue;
        };
        let model = power_model_for(profile, Interpolation::Spline).unwrap();
        let expected = calibration
            .knots()
            .iter()
            .find(|(x, _)| *x == utilization)
            .map(|(_, w)| *w)
            .unwrap();
        assert_eq!(model.get_power(utilization), expected, "{}", profile.name);
    }
}

#[test]
fn test_spline_differs_from_piecewise_between_knots() {
    let knots = [(0., 20.), (10., 40.), (50., 80.), (100., 120.)];
    let spline = SplinePowerModel::new(&knots);
    let piecewise = PiecewiseLinearPowerModel::new(knots.to_vec());
    assert!((spline.get_power(30.) - piecewise.get_power(30.)).abs() > 1e-3);
}

#[test]
fn test_linear_is_monotonic_for_monotonic_calibration() {
    let registry = InstanceMetricsRegistry::bundled().unwrap();
    for vendor in Vendor::ALL {
        for profile in registry.profiles(vendor) {
            let monotonic = profile
                .consumption
                .calibration
                .map(|c| c.knots().windows(2).all(|w| w[0].1 <= w[1].1))
                .unwrap_or(true);
            if !monotonic {
                continue;
            }
            let model = power_model_for(profile, Interpolation::Linear).unwrap();
            let mut prev = model.get_power(0.);
            for step in 1..=200 {
                let power = model.get_power(step as f64 * 0.5);
                assert!(power >= prev, "{} at {}%", profile.name, step as f64 * 0.5);
                prev = power;
            }
        }
    }
}

#[rstest]
#[case(Interpolation::Linear)]
#[case(Interpolation::Spline)]
fn test_energy_scales_with_duration(#[case] interpolation: Interpolation) {
    let registry = InstanceMetricsRegistry::bundled().unwrap();
    let profile = registry.profile(Vendor::Aws, "t3.medium").unwrap();
    let model = power_model_for(profile, interpolation).unwrap();
    let power = model.get_power(37.);
    assert_relative_eq!(energy_kwh(power, 2. * 900.), 2. * energy_kwh(power, 900.));
}

#[test]
fn test_spline_requires_calibration() {
    let registry = InstanceMetricsRegistry::bundled().unwrap();
    let profile = registry.profile(Vendor::Gcp, "n2-standard-2").unwrap();
    let err = power_model_for(profile, Interpolation::Spline).err().unwrap();
    assert!(err.is_unsupported_value());
    assert!(power_model_for(profile, Interpolation::Linear).is_ok());
}

#[test]
fn test_calibration_knots_order() {
    let calibration = CalibrationPoints {
        idle: 1.,
        ten_percent: 2.,
        fifty_percent: 3.,
        full: 4.,
    };
    assert_eq!(calibration.knots(), [(0., 1.), (10., 2.), (50., 3.), (100., 4.)]);
}
