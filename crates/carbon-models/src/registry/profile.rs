//! Standardized instance profiles.

use serde::Serialize;

/// Measured instance power at 0, 10, 50 and 100% CPU utilization, in W.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationPoints {
    pub idle: f64,
    pub ten_percent: f64,
    pub fifty_percent: f64,
    pub full: f64,
}

impl CalibrationPoints {
    /// Utilization levels of the calibration points, in percent.
    pub const UTILIZATIONS: [f64; 4] = [0., 10., 50., 100.];

    /// Returns (utilization %, power W) pairs sorted by utilization.
    pub fn knots(&self) -> [(f64, f64); 4] {
        [
            (Self::UTILIZATIONS[0], self.idle),
            (Self::UTILIZATIONS[1], self.ten_percent),
            (Self::UTILIZATIONS[2], self.fifty_percent),
            (Self::UTILIZATIONS[3], self.full),
        ]
    }
}

/// Instance power consumption description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerConsumption {
    /// Instance power at 0% utilization derived from microarchitecture tables, in W.
    pub min_watts: f64,
    /// Instance power at 100% utilization derived from microarchitecture tables, in W.
    pub max_watts: f64,
    /// Four-point measurements, only published by some vendors.
    pub calibration: Option<CalibrationPoints>,
}

/// Power and resource sharing description of a single instance type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceProfile {
    pub name: String,
    /// vCPUs allocated to the instance.
    pub vcpus: u32,
    /// vCPUs of the largest instance on the same physical platform.
    pub max_vcpus: u32,
    pub consumption: PowerConsumption,
    /// Total embodied emissions of the physical host, in kg CO2e.
    pub embodied_emission: Option<f64>,
}
