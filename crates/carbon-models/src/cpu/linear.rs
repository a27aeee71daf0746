use crate::power_model::PowerModel;

/// A power model based on linear interpolation between the minimum and maximum power consumption values.
#[derive(Clone)]
pub struct LinearPowerModel {
    min_power: f64,
    factor: f64,
}

impl LinearPowerModel {
    /// Creates linear power model with specified parameters.
    ///
    /// * `min_power` - The minimum power consumption (at 0% utilization).
    /// * `max_power` - The maximum power consumption (at 100% utilization).
    pub fn new(min_power: f64, max_power: f64) -> Self {
        Self {
            min_power,
            factor: max_power - min_power,
        }
    }
}

impl PowerModel for LinearPowerModel {
    fn get_power(&self, utilization: f64) -> f64 {
        self.min_power + self.factor * (utilization / 100.)
    }
}
