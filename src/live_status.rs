use crate::types::AlertEvent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Sampler counters, periodically written as JSON for external monitoring
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SamplerStatus {
    pub timestamp: f64,
    pub updated_at: String,
    pub uptime_seconds: u64,
    pub source: String,
    pub vectors_seen: u64,
    pub vectors_processed: u64,
    pub alerts_raised: u64,
    pub datagrams_sent: u64,
    pub send_failures: u64,
    pub last_derived_force: f64,
    pub last_alert: Option<AlertEvent>,
    // Position data
    pub has_fix: bool,
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub gps_speed: f64,
}

impl SamplerStatus {
    pub fn new(source: &str) -> Self {
        Self {
            timestamp: current_timestamp(),
            updated_at: Utc::now().to_rfc3339(),
            uptime_seconds: 0,
            source: source.to_string(),
            vectors_seen: 0,
            vectors_processed: 0,
            alerts_raised: 0,
            datagrams_sent: 0,
            send_failures: 0,
            last_derived_force: 0.0,
            last_alert: None,
            has_fix: false,
            gps_lat: 0.0,
            gps_lon: 0.0,
            gps_speed: 0.0,
        }
    }

    /// Refresh the wall-clock fields before a write
    pub fn touch(&mut self) {
        self.timestamp = current_timestamp();
        self.updated_at = Utc::now().to_rfc3339();
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
