use crate::types::{AlertEvent, AlertKind, MotionVector, STANDARD_GRAVITY};
use serde::{Deserialize, Serialize};

/// Rounding allowance for the sampling gate; epoch-scale timestamps lose a
/// few hundred nanoseconds in subtraction
const GATE_TOLERANCE_SECS: f64 = 1e-6;

/// Detector thresholds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum spacing between processed samples (0.1 s = 10 Hz)
    pub sample_interval_secs: f64,
    pub standard_gravity: f64,
    /// Derived force must exceed this (m/s²)
    pub dynamic_threshold: f64,
    /// Minimum spacing between two alerts
    pub cooldown_secs: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 0.1,
            standard_gravity: STANDARD_GRAVITY,
            dynamic_threshold: 4.0,
            cooldown_secs: 3.0,
        }
    }
}

/// Harsh braking / acceleration detector
///
/// Two gates run one after the other: a sampling gate that processes at most
/// one vector per `sample_interval_secs`, whatever the sensor's native rate, and
/// an alert gate that emits at most one alert per `cooldown_secs`. A sustained
/// harsh interval therefore produces one alert per cooldown window.
///
/// The derived force is `|‖a‖ − g|`, the non-gravity part of the reading.
pub struct BrakeEventDetector {
    config: DetectorConfig,
    last_sample_time: Option<f64>,
    last_alert_time: Option<f64>,
    last_derived_force: f64,
    processed: u64,
}

impl BrakeEventDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            last_sample_time: None,
            last_alert_time: None,
            last_derived_force: 0.0,
            processed: 0,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Derived force of the most recently processed vector
    pub fn derived_force(&self) -> f64 {
        self.last_derived_force
    }

    /// Number of vectors that passed the sampling gate
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn derive_force(&self, vector: &MotionVector) -> f64 {
        (vector.magnitude() - self.config.standard_gravity).abs()
    }

    /// Feed one vector observed at `now` (seconds). Returns an alert when the
    /// threshold is exceeded and the cooldown has elapsed.
    pub fn observe(&mut self, vector: MotionVector, now: f64) -> Option<AlertEvent> {
        if let Some(last) = self.last_sample_time {
            if now - last < self.config.sample_interval_secs - GATE_TOLERANCE_SECS {
                return None;
            }
        }
        self.last_sample_time = Some(now);
        self.processed += 1;

        let derived_force = self.derive_force(&vector);
        self.last_derived_force = derived_force;

        if derived_force.is_nan() || derived_force <= self.config.dynamic_threshold {
            return None;
        }

        let cooled_down = self
            .last_alert_time
            .map_or(true, |last| now - last > self.config.cooldown_secs);
        if !cooled_down {
            return None;
        }

        self.last_alert_time = Some(now);
        Some(AlertEvent {
            kind: AlertKind::HarshDynamics,
            derived_force,
            timestamp_secs: now,
        })
    }
}

impl Default for BrakeEventDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
