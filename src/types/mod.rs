pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-letter jurisdiction code (e.g. `MH`), always upper-case ASCII
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorityCode(String);

impl AuthorityCode {
    /// Accepts exactly two ASCII letters in either case.
    pub fn new(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(Self(code.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw accelerometer reading, consumed immediately by the detector
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_accel(&self) -> Accel3 {
        Accel3::new(self.x, self.y, self.z)
    }

    /// Euclidean norm of the raw vector (gravity included)
    pub fn magnitude(&self) -> f64 {
        self.as_accel().norm()
    }
}

/// Last known position from the platform location provider
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_mps: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "HARSH_DYNAMICS", alias = "HARSH_BRAKE")]
    HarshDynamics,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::HarshDynamics => "HARSH_DYNAMICS",
        }
    }

    /// Map a wire event name to a known kind. Older senders emit `HARSH_BRAKE`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "HARSH_DYNAMICS" | "HARSH_BRAKE" => Some(AlertKind::HarshDynamics),
            _ => None,
        }
    }
}

/// Debounced alert emitted by the brake event detector
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub derived_force: f64,
    pub timestamp_secs: f64,
}

/// Immutable telemetry snapshot. A newer sample replaces the old one whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub latitude: f64,
    pub longitude: f64,
    pub speed_mps: f64,
    pub derived_force: f64,
    pub timestamp_secs: f64,
    pub alert: Option<AlertEvent>,
}

impl TelemetrySample {
    pub fn alert_active(&self) -> bool {
        self.alert.is_some()
    }
}

impl Default for TelemetrySample {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            speed_mps: 0.0,
            derived_force: 0.0,
            timestamp_secs: 0.0,
            alert: None,
        }
    }
}
