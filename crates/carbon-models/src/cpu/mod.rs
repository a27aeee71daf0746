//! CPU utilization based power models.

pub mod linear;
pub mod piecewise;
pub mod spline;
