//! Apportionment of embodied (manufacturing) emissions to a reservation window.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::registry::profile::InstanceProfile;

/// Hours in a (non-leap) year.
pub const HOURS_PER_YEAR: f64 = 8760.;

/// What to do when the instance profile has no embodied emissions data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingEmbodied {
    /// Fail with an unsupported value error.
    #[default]
    Error,
    /// Count the instance as having no embodied emissions.
    Zero,
}

impl std::str::FromStr for MissingEmbodied {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "error" => Ok(MissingEmbodied::Error),
            "zero" => Ok(MissingEmbodied::Zero),
            _ => Err(ModelError::unsupported(
                "EmbodiedEmissionsCalculator",
                "missing-embodied",
                input,
                "expected 'error' or 'zero'",
            )),
        }
    }
}

/// Resources of the physical host taken by the reservation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceShare {
    pub reserved: f64,
    pub total: f64,
}

impl ResourceShare {
    /// Share of a profile: its vCPUs out of the platform vCPUs.
    pub fn of(profile: &InstanceProfile) -> Self {
        Self {
            reserved: profile.vcpus as f64,
            total: profile.max_vcpus as f64,
        }
    }

    pub fn ratio(&self) -> f64 {
        self.reserved / self.total
    }
}

/// Computes embodied carbon in grams for reservations of a fixed expected host lifespan.
#[derive(Debug, Clone)]
pub struct EmbodiedEmissionsCalculator {
    expected_lifespan_hours: f64,
    missing: MissingEmbodied,
}

impl EmbodiedEmissionsCalculator {
    /// * `expected_lifespan` - expected host lifespan in years.
    /// * `missing` - policy for profiles without embodied emissions data.
    pub fn new(expected_lifespan: f64, missing: MissingEmbodied) -> Self {
        Self {
            expected_lifespan_hours: expected_lifespan * HOURS_PER_YEAR,
            missing,
        }
    }

    /// Returns embodied carbon in g CO2e attributed to `share` of the host over `duration` seconds.
    ///
    /// Ratios above one are passed through and only logged.
    pub fn embodied_carbon(&self, profile: &InstanceProfile, share: ResourceShare, duration: f64) -> Result<f64> {
        let total_embodied = match (profile.embodied_emission, self.missing) {
            (Some(total), _) => total,
            (None, MissingEmbodied::Zero) => return Ok(0.),
            (None, MissingEmbodied::Error) => {
                return Err(ModelError::unsupported(
                    "EmbodiedEmissionsCalculator",
                    "instance-type",
                    &profile.name,
                    "no embodied emissions data",
                ))
            }
        };
        let time_share = duration / 3600. / self.expected_lifespan_hours;
        let resource_share = share.ratio();
        if time_share > 1. || resource_share > 1. {
            warn!(
                "{}: apportionment ratio above one (time {:.3}, resources {:.3})",
                profile.name, time_share, resource_share
            );
        }
        Ok(total_embodied * 1000. * time_share * resource_share)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::registry::profile::PowerConsumption;

    fn profile(embodied: Option<f64>) -> InstanceProfile {
        InstanceProfile {
            name: "test".to_string(),
            vcpus: 2,
            max_vcpus: 8,
            consumption: PowerConsumption {
                min_watts: 1.,
                max_watts: 2.,
                calibration: None,
            },
            embodied_emission: embodied,
        }
    }

    #[test]
    fn apportionment() {
        let calc = EmbodiedEmissionsCalculator::new(4., MissingEmbodied::Error);
        let p = profile(Some(1752.));
        // 1752 kg * 1000 * (1 h / 35040 h) * (2 / 8) = 12.5 g
        assert_relative_eq!(calc.embodied_carbon(&p, ResourceShare::of(&p), 3600.).unwrap(), 12.5);
        assert_eq!(calc.embodied_carbon(&p, ResourceShare::of(&p), 0.).unwrap(), 0.);
    }

    #[test]
    fn missing_embodied_policy() {
        let p = profile(None);
        let zero = EmbodiedEmissionsCalculator::new(4., MissingEmbodied::Zero);
        assert_eq!(zero.embodied_carbon(&p, ResourceShare::of(&p), 3600.).unwrap(), 0.);
        let error = EmbodiedEmissionsCalculator::new(4., MissingEmbodied::Error);
        assert!(error
            .embodied_carbon(&p, ResourceShare::of(&p), 3600.)
            .unwrap_err()
            .is_unsupported_value());
    }

    #[test]
    fn ratios_above_one_are_not_clamped() {
        let calc = EmbodiedEmissionsCalculator::new(1., MissingEmbodied::Error);
        let p = profile(Some(1.));
        let share = ResourceShare { reserved: 16., total: 8. };
        // two years on a one year lifespan, twice the host
        let duration = 2. * HOURS_PER_YEAR * 3600.;
        assert_relative_eq!(calc.embodied_carbon(&p, share, duration).unwrap(), 4000.);
    }
}
