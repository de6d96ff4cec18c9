#![allow(dead_code)]

use sentinel_rs::config::RoutingConfig;
use sentinel_rs::{RoutingEngine, TelemetrySample};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PUNE: (f64, f64) = (18.5204, 73.8567);
pub const ANDHERI: (f64, f64) = (19.1136, 72.8697);
pub const GURUGRAM: (f64, f64) = (28.4595, 77.0266);

pub const MH_HQ: &str = "sp.hsp.hq@mahapolice.gov.in";
pub const MUMBAI_TRAFFIC: &str = "cp.mumbai.jtcp.traf@mahapolice.gov.in";

/// Engine over the built-in directory and seed places
pub fn builtin_engine() -> RoutingEngine {
    RoutingConfig::default().build_engine()
}

pub fn sample_at(position: (f64, f64)) -> TelemetrySample {
    TelemetrySample {
        latitude: position.0,
        longitude: position.1,
        speed_mps: 11.0,
        derived_force: 0.2,
        timestamp_secs: 1_760_000_000.0,
        alert: None,
    }
}

pub fn write_contacts(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("contacts.json");
    fs::write(&path, body).expect("write contacts fixture");
    path
}

/// Poll `check` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(check: F) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
