use super::SampleSource;
use crate::types::{Fix, MotionVector, STANDARD_GRAVITY};
use std::f64::consts::PI;

/// Extra longitudinal acceleration during a braking burst (m/s²)
const BURST_ACCEL: f64 = 12.0;

/// Deterministic synthetic drive for running without hardware
///
/// Gravity plus a small oscillation, a fix creeping away from the origin, and
/// a harsh braking burst of `burst_len` ticks at the end of every
/// `burst_period` ticks.
pub struct SimulatedSource {
    step: u64,
    dt: f64,
    origin: (f64, f64),
    burst_period: u64,
    burst_len: u64,
}

impl SimulatedSource {
    pub fn new(origin_lat: f64, origin_lon: f64, dt: f64) -> Self {
        Self {
            step: 0,
            dt,
            origin: (origin_lat, origin_lon),
            burst_period: 300,
            burst_len: 10,
        }
    }

    /// Change the burst schedule; a zero period disables bursts.
    pub fn with_bursts(mut self, period: u64, len: u64) -> Self {
        self.burst_period = period;
        self.burst_len = len.min(period);
        self
    }

    fn braking(&self, step: u64) -> bool {
        self.burst_period > 0 && step % self.burst_period >= self.burst_period - self.burst_len
    }
}

impl SampleSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn next_motion_vector(&mut self) -> Option<MotionVector> {
        let step = self.step;
        self.step += 1;
        let t = step as f64 * self.dt;

        let mut x = (t * 2.0 * PI).sin() * 0.5;
        if self.braking(step) {
            x -= BURST_ACCEL;
        }
        Some(MotionVector::new(
            x,
            (t * 2.0 * PI).cos() * 0.3,
            STANDARD_GRAVITY + (t * PI).sin() * 0.1,
        ))
    }

    fn last_known_position(&self) -> Option<Fix> {
        let seq = self.step as f64;
        let speed = if self.braking(self.step.saturating_sub(1)) {
            2.0
        } else {
            10.0 + (seq * 0.05).sin() * 5.0
        };

        Some(Fix {
            latitude: self.origin.0 + seq * 0.00001,
            longitude: self.origin.1 + seq * 0.00001,
            speed_mps: speed,
        })
    }
}
