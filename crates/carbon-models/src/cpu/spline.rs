use crate::power_model::PowerModel;

/// A power model based on a natural cubic spline fitted through power measurements.
///
/// The spline passes through every measurement and has continuous first and second derivatives,
/// second derivative is zero at both ends. Outside of the measured range the boundary cubic is extended.
#[derive(Clone)]
pub struct SplinePowerModel {
    xs: Vec<f64>,
    ys: Vec<f64>,
    // second derivatives at knots
    ms: Vec<f64>,
}

impl SplinePowerModel {
    /// Creates spline power model.
    ///
    /// * `knots` - (utilization %, power W) pairs with strictly increasing utilization, at least two of them.
    pub fn new(knots: &[(f64, f64)]) -> Self {
        assert!(knots.len() >= 2, "SplinePowerModel needs at least two knots");
        let xs: Vec<f64> = knots.iter().map(|k| k.0).collect();
        let ys: Vec<f64> = knots.iter().map(|k| k.1).collect();
        let ms = natural_second_derivatives(&xs, &ys);
        Self { xs, ys, ms }
    }

    #[cfg(test)]
    fn derivative(&self, x: f64) -> f64 {
        let i = self.segment(x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = self.xs[i + 1] - x;
        let b = x - self.xs[i];
        -self.ms[i] * a * a / (2. * h) + self.ms[i + 1] * b * b / (2. * h) + (self.ys[i + 1] - self.ys[i]) / h
            - (self.ms[i + 1] - self.ms[i]) * h / 6.
    }

    fn segment(&self, x: f64) -> usize {
        let last = self.xs.len() - 2;
        self.xs[..=last].iter().rposition(|xi| *xi <= x).unwrap_or(0)
    }
}

impl PowerModel for SplinePowerModel {
    fn get_power(&self, utilization: f64) -> f64 {
        if let Some(i) = self.xs.iter().position(|x| *x == utilization) {
            return self.ys[i];
        }
        let i = self.segment(utilization);
        let h = self.xs[i + 1] - self.xs[i];
        let a = self.xs[i + 1] - utilization;
        let b = utilization - self.xs[i];
        self.ms[i] * a.powi(3) / (6. * h)
            + self.ms[i + 1] * b.powi(3) / (6. * h)
            + (self.ys[i] / h - self.ms[i] * h / 6.) * a
            + (self.ys[i + 1] / h - self.ms[i + 1] * h / 6.) * b
    }
}

/// Solves the tridiagonal system for second derivatives of a natural cubic spline (Thomas algorithm).
fn natural_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut ms = vec![0.; n];
    if n < 3 {
        return ms;
    }
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let inner = n - 2;
    let mut diag = vec![0.; inner];
    let mut upper = vec![0.; inner];
    let mut rhs = vec![0.; inner];
    for k in 0..inner {
        let i = k + 1;
        diag[k] = 2. * (h[i - 1] + h[i]);
        upper[k] = h[i];
        rhs[k] = 6. * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }
    // forward sweep, sub-diagonal element of row k is h[k]
    for k in 1..inner {
        let w = h[k] / diag[k - 1];
        diag[k] -= w * upper[k - 1];
        rhs[k] -= w * rhs[k - 1];
    }
    for k in (0..inner).rev() {
        let next = if k + 1 < inner { ms[k + 2] } else { 0. };
        ms[k + 1] = (rhs[k] - upper[k] * next) / diag[k];
    }
    ms
}
