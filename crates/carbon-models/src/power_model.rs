//! Power consumption models.

use dyn_clone::{clone_trait_object, DynClone};
use serde::{Deserialize, Serialize};

use crate::cpu::linear::LinearPowerModel;
use crate::cpu::piecewise::PiecewiseLinearPowerModel;
use crate::cpu::spline::SplinePowerModel;
use crate::error::{ModelError, Result};
use crate::registry::profile::InstanceProfile;

/// Model for computing power consumption of an instance from its CPU utilization.
pub trait PowerModel: DynClone {
    /// Returns the power consumption in W.
    ///
    /// * `utilization` - CPU utilization in percent (0-100).
    fn get_power(&self, utilization: f64) -> f64;
}

clone_trait_object!(PowerModel);

/// Interpolation strategy used to turn calibration data into a power curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Piecewise linear through the calibration points, or min/max bounds if there are none.
    #[default]
    Linear,
    /// Natural cubic spline through the four calibration points.
    Spline,
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Interpolation::Linear => write!(f, "linear"),
            Interpolation::Spline => write!(f, "spline"),
        }
    }
}

impl std::str::FromStr for Interpolation {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "linear" => Ok(Interpolation::Linear),
            "spline" => Ok(Interpolation::Spline),
            _ => Err(ModelError::unsupported(
                "PowerModel",
                "interpolation",
                input,
                "expected 'linear' or 'spline'",
            )),
        }
    }
}

/// Builds the power model of `profile` for the given interpolation strategy.
pub fn power_model_for(profile: &InstanceProfile, interpolation: Interpolation) -> Result<Box<dyn PowerModel>> {
    let consumption = &profile.consumption;
    match (interpolation, &consumption.calibration) {
        (Interpolation::Spline, Some(calibration)) => Ok(Box::new(SplinePowerModel::new(&calibration.knots()))),
        (Interpolation::Spline, None) => Err(ModelError::unsupported(
            "PowerModel",
            "interpolation",
            interpolation,
            format!("instance type '{}' has no four-point calibration data", profile.name),
        )),
        (Interpolation::Linear, Some(calibration)) => {
            Ok(Box::new(PiecewiseLinearPowerModel::new(calibration.knots().to_vec())))
        }
        (Interpolation::Linear, None) => Ok(Box::new(LinearPowerModel::new(
            consumption.min_watts,
            consumption.max_watts,
        ))),
    }
}

/// Converts average power (W) over `duration` seconds into energy in kWh.
pub fn energy_kwh(power: f64, duration: f64) -> f64 {
    power * duration / 3600. / 1000.
}
