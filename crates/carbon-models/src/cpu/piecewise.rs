use crate::power_model::PowerModel;

/// A power model based on measurements of power consumption at a few utilization levels.
///
/// Power between two neighbouring measurements is computed by linear interpolation,
/// outside of the measured range the nearest segment is extended.
#[derive(Clone)]
pub struct PiecewiseLinearPowerModel {
    knots: Vec<(f64, f64)>,
}

impl PiecewiseLinearPowerModel {
    /// Creates piecewise linear power model.
    ///
    /// * `knots` - (utilization %, power W) pairs sorted by utilization, at least two of them.
    pub fn new(knots: Vec<(f64, f64)>) -> Self {
        assert!(knots.len() >= 2, "PiecewiseLinearPowerModel needs at least two knots");
        Self { knots }
    }
}

impl PowerModel for PiecewiseLinearPowerModel {
    fn get_power(&self, utilization: f64) -> f64 {
        if let Some(&(_, power)) = self.knots.iter().find(|(x, _)| *x == utilization) {
            return power;
        }
        let last = self.knots.len() - 2;
        let idx = self.knots[..=last]
            .iter()
            .rposition(|(x, _)| *x <= utilization)
            .unwrap_or(0);
        let (x0, y0) = self.knots[idx];
        let (x1, y1) = self.knots[idx + 1];
        y0 + (utilization - x0) * (y1 - y0) / (x1 - x0)
    }
}
