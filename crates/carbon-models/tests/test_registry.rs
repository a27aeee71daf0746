use approx::assert_relative_eq;

use carbon_models::error::ModelError;
use carbon_models::registry::loader::load_dir;
use carbon_models::registry::profile::CalibrationPoints;
use carbon_models::registry::InstanceMetricsRegistry;
use carbon_models::vendor::Vendor;

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

#[test]
fn test_bundled_profiles_are_consistent() {
    let registry = InstanceMetricsRegistry::bundled().unwrap();
    for vendor in Vendor::ALL {
        assert!(registry.instance_types(vendor).count() > 0, "{}", vendor);
        for profile in registry.profiles(vendor) {
            assert!(profile.vcpus >= 1, "{}", profile.name);
            assert!(profile.vcpus <= profile.max_vcpus, "{}", profile.name);
            assert!(profile.consumption.min_watts >= 0., "{}", profile.name);
            assert!(profile.consumption.min_watts <= profile.consumption.max_watts, "{}", profile.name);
            if let Some(embodied) = profile.embodied_emission {
                assert!(embodied >= 0., "{}", profile.name);
            }
            if let Some(calibration) = profile.consumption.calibration {
                assert!(calibration.knots().iter().all(|(_, w)| *w >= 0.), "{}", profile.name);
            }
        }
    }
}

#[test]
fn test_bundled_tables_build_deterministically() {
    let first = InstanceMetricsRegistry::bundled().unwrap();
    let second = InstanceMetricsRegistry::bundled().unwrap();
    for vendor in Vendor::ALL {
        let a: Vec<_> = first.profiles(vendor).cloned().collect();
        let b: Vec<_> = second.profiles(vendor).cloned().collect();
        assert_eq!(a, b);
    }
}

#[test]
fn test_bundled_aws_profile() {
    let registry = InstanceMetricsRegistry::bundled().unwrap();
    let profile = registry.profile(Vendor::Aws, "m5.large").unwrap();
    assert_eq!(profile.vcpus, 2);
    assert_eq!(profile.max_vcpus, 96);
    // Sky Lake: 0.65 - 4.26 W per vCPU
    assert_relative_eq!(profile.consumption.min_watts, 1.3);
    assert_relative_eq!(profile.consumption.max_watts, 8.52);
    assert_eq!(
        profile.consumption.calibration,
        Some(CalibrationPoints {
            idle: 4.8,
            ten_percent: 8.1,
            fifty_percent: 16.4,
            full: 21.6,
        })
    );
    assert_eq!(profile.embodied_emission, Some(1862.2));

    // no embodied row in the sample tables
    assert_eq!(registry.profile(Vendor::Aws, "t2.micro").unwrap().embodied_emission, None);
    assert!(registry.profile(Vendor::Aws, "n2-standard-2").is_none());
}

#[test]
fn test_load_csv_and_json_tables() {
    let registry = InstanceMetricsRegistry::build(&load_dir(name_wrapper("tables")).unwrap()).unwrap();
    assert_eq!(registry.vendors().collect::<Vec<_>>(), vec![Vendor::Aws, Vendor::Gcp]);
    assert_eq!(
        registry.instance_types(Vendor::Aws).collect::<Vec<_>>(),
        vec!["c5.large", "m5.large", "m6g.large", "t2.nano"]
    );

    let m6g = registry.profile(Vendor::Aws, "m6g.large").unwrap();
    assert_relative_eq!(m6g.consumption.min_watts, 0.94);
    assert_eq!(m6g.consumption.calibration.unwrap().full, 5.5);
    assert_eq!(m6g.embodied_emission, Some(1197.6));

    let c5 = registry.profile(Vendor::Aws, "c5.large").unwrap();
    assert_relative_eq!(c5.consumption.min_watts, 1.29);
    assert_relative_eq!(c5.consumption.max_watts, 8.23);
    assert_eq!(c5.consumption.calibration, None);

    let t2 = registry.profile(Vendor::Aws, "t2.nano").unwrap();
    assert_eq!(t2.max_vcpus, 1);
    assert_relative_eq!(t2.consumption.min_watts, (0.64 + 0.65 + 0.47) / 3.);
    assert_eq!(t2.embodied_emission, None);

    let n2 = registry.profile(Vendor::Gcp, "n2-standard-4").unwrap();
    assert_eq!((n2.vcpus, n2.max_vcpus), (4, 80));
    assert_relative_eq!(n2.consumption.max_watts, 15.88);
}

#[test]
fn test_unresolvable_architecture_fails() {
    let tables = load_dir(name_wrapper("broken")).unwrap();
    let err = InstanceMetricsRegistry::build(&tables).unwrap_err();
    assert!(err.is_unsupported_value());
    assert!(err.to_string().contains("Pentium Pro"));
}

#[test]
fn test_missing_directory_is_an_error() {
    let err = load_dir(name_wrapper("no-such-dir")).unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }));
    assert!(err.to_string().contains("no-such-dir"));
}
