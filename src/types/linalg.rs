//! Linear algebra aliases for motion data
//!
//! Raw accelerometer triples are carried as fixed-size nalgebra vectors so the
//! magnitude math stays in one place.

use nalgebra::Vector3;

/// 3-axis acceleration in m/s²
pub type Accel3 = Vector3<f64>;

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.81;
