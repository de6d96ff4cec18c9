//! Runtime configuration
//!
//! An optional JSON file; every field has a default and command-line flags
//! override what the file says.

use crate::detector::DetectorConfig;
use crate::directory::ContactDirectory;
use crate::error::{SentinelError, SentinelResult};
use crate::geocode::{GeocodeResolver, OfflineGeocoder};
use crate::routing::RoutingEngine;
use crate::telemetry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub addr: SocketAddr,
    /// Sampling loop cadence
    pub sample_interval_secs: f64,
    /// Full telemetry datagram period
    pub publish_interval_secs: f64,
    /// Upper bound on a single receive wait
    pub idle_wait_secs: f64,
    pub stale_after_secs: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            addr: telemetry::default_addr(),
            sample_interval_secs: 0.1,
            publish_interval_secs: 1.0,
            idle_wait_secs: 0.5,
            stale_after_secs: 5.0,
        }
    }
}

impl TelemetryConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sample_interval_secs)
    }

    pub fn idle_wait(&self) -> Duration {
        Duration::from_secs_f64(self.idle_wait_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs_f64(self.stale_after_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Supplementary contacts merged over the built-in directory
    pub contacts_file: Option<PathBuf>,
    /// Places table replacing the built-in geocoder seed
    pub places_file: Option<PathBuf>,
    pub max_distance_km: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            contacts_file: None,
            places_file: None,
            max_distance_km: 250.0,
        }
    }
}

impl RoutingConfig {
    /// Directory plus geocoder, falling back to built-ins when a file cannot be used.
    pub fn build_engine(&self) -> RoutingEngine {
        let mut directory = ContactDirectory::builtin();
        if let Some(path) = &self.contacts_file {
            if let Err(e) = directory.merge_file(path) {
                warn!("{}; using built-in directory {}", e, directory.version());
            }
        }

        let geocoder: Arc<dyn GeocodeResolver> = match &self.places_file {
            Some(path) => match OfflineGeocoder::from_file(path, self.max_distance_km) {
                Ok(geocoder) => {
                    info!("Loaded {} places from {}", geocoder.len(), path.display());
                    Arc::new(geocoder)
                }
                Err(e) => {
                    warn!("{}; using built-in places", e);
                    Arc::new(OfflineGeocoder::builtin(self.max_distance_km))
                }
            },
            None => Arc::new(OfflineGeocoder::builtin(self.max_distance_km)),
        };

        RoutingEngine::new(Arc::new(directory), geocoder)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub detector: DetectorConfig,
    pub telemetry: TelemetryConfig,
    pub routing: RoutingConfig,
}

impl SentinelConfig {
    pub fn load(path: &Path) -> SentinelResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SentinelError::Config(format!("{}: {}", path.display(), e)))?;
        let config: SentinelConfig = serde_json::from_str(&contents)
            .map_err(|e| SentinelError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> SentinelResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> SentinelResult<()> {
        let positive = [
            ("telemetry.sample_interval_secs", self.telemetry.sample_interval_secs),
            ("telemetry.publish_interval_secs", self.telemetry.publish_interval_secs),
            ("telemetry.idle_wait_secs", self.telemetry.idle_wait_secs),
            ("telemetry.stale_after_secs", self.telemetry.stale_after_secs),
            ("routing.max_distance_km", self.routing.max_distance_km),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SentinelError::Config(format!("{} must be positive", name)));
            }
        }

        let non_negative = [
            ("detector.sample_interval_secs", self.detector.sample_interval_secs),
            ("detector.dynamic_threshold", self.detector.dynamic_threshold),
            ("detector.cooldown_secs", self.detector.cooldown_secs),
            ("detector.standard_gravity", self.detector.standard_gravity),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SentinelError::Config(format!("{} must not be negative", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sentinel.json");
        fs::write(
            &path,
            r#"{"detector": {"dynamic_threshold": 5.5}, "telemetry": {"addr": "127.0.0.1:6000"}}"#,
        )
        .unwrap();

        let config = SentinelConfig::load(&path).unwrap();
        assert_eq!(config.detector.dynamic_threshold, 5.5);
        assert_eq!(config.detector.cooldown_secs, 3.0);
        assert_eq!(config.telemetry.addr.port(), 6000);
        assert_eq!(config.telemetry.publish_interval_secs, 1.0);
        assert_eq!(config.routing.max_distance_km, 250.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sentinel.json");
        fs::write(&path, r#"{"telemetry": {"sample_interval_secs": 0}}"#).unwrap();
        assert!(matches!(SentinelConfig::load(&path), Err(SentinelError::Config(_))));

        fs::write(&path, r#"{"detector": {"cooldown_secs": -1}}"#).unwrap();
        assert!(SentinelConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_and_absent_paths() {
        assert!(SentinelConfig::load(Path::new("/nonexistent/sentinel.json")).is_err());
        let config = SentinelConfig::load_or_default(None).unwrap();
        assert_eq!(config.telemetry.addr, telemetry::default_addr());
    }

    #[test]
    fn test_build_engine_survives_bad_files() {
        let routing = RoutingConfig {
            contacts_file: Some(PathBuf::from("/nonexistent/contacts.json")),
            places_file: Some(PathBuf::from("/nonexistent/places.json")),
            ..RoutingConfig::default()
        };
        let engine = routing.build_engine();
        assert_eq!(engine.directory().version(), "2025");

        let result = engine.resolve(18.53, 73.85, "MH12AB1234");
        assert_eq!(result.recipients, vec!["sp.hsp.hq@mahapolice.gov.in"]);
    }
}
