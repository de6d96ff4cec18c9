//! Datagram format
//!
//! One UTF-8 JSON object per datagram. Every field is optional:
//!
//! ```json
//! {"lat": 19.07, "lon": 72.87, "speed_mps": 11.2, "g_dyn": 0.4, "ts": 1760000000.5}
//! {"event": "HARSH_DYNAMICS", "g_dyn": 5.1, "ts": 1760000001.2}
//! ```
//!
//! A receiver merges the fields present into its current state. Position,
//! speed, force and timestamp are sticky; `event` lives for one merge only.

use crate::error::{SentinelError, SentinelResult};
use crate::types::{AlertEvent, AlertKind, TelemetrySample};
use serde::{Deserialize, Serialize};

/// Largest datagram the receiver reads; anything longer arrives truncated.
pub const MAX_DATAGRAM_BYTES: usize = 8192;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g_dyn: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl TelemetryUpdate {
    /// Full periodic update. Non-finite values are left out.
    pub fn from_sample(sample: &TelemetrySample) -> Self {
        Self {
            lat: finite(sample.latitude),
            lon: finite(sample.longitude),
            speed_mps: finite(sample.speed_mps),
            g_dyn: finite(sample.derived_force),
            ts: finite(sample.timestamp_secs),
            event: sample.alert.map(|a| a.kind.as_str().to_string()),
        }
    }

    /// Partial update pushed the moment an alert fires
    pub fn from_alert(alert: &AlertEvent) -> Self {
        Self {
            g_dyn: finite(alert.derived_force),
            ts: finite(alert.timestamp_secs),
            event: Some(alert.kind.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn encode(&self) -> SentinelResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| SentinelError::Malformed(e.to_string()))
    }

    /// Parse and validate one datagram.
    ///
    /// The payload must be a JSON object. Unknown keys are ignored; a known
    /// key with the wrong type or an out-of-range value rejects the whole
    /// datagram.
    pub fn decode(bytes: &[u8]) -> SentinelResult<Self> {
        if bytes.len() > MAX_DATAGRAM_BYTES {
            return Err(SentinelError::Malformed(format!(
                "datagram of {} bytes exceeds {}",
                bytes.len(),
                MAX_DATAGRAM_BYTES
            )));
        }

        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| SentinelError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(SentinelError::Malformed("payload is not a JSON object".into()));
        }

        let update: Self =
            serde_json::from_value(value).map_err(|e| SentinelError::Malformed(e.to_string()))?;
        update.validate()?;
        Ok(update)
    }

    fn validate(&self) -> SentinelResult<()> {
        if let Some(lat) = self.lat {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(SentinelError::Malformed(format!("lat {} out of range", lat)));
            }
        }
        if let Some(lon) = self.lon {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(SentinelError::Malformed(format!("lon {} out of range", lon)));
            }
        }
        if let Some(speed) = self.speed_mps {
            if !speed.is_finite() || speed < 0.0 {
                return Err(SentinelError::Malformed(format!("speed_mps {} invalid", speed)));
            }
        }
        if let Some(g_dyn) = self.g_dyn {
            if !g_dyn.is_finite() || g_dyn < 0.0 {
                return Err(SentinelError::Malformed(format!("g_dyn {} invalid", g_dyn)));
            }
        }
        if let Some(ts) = self.ts {
            if !ts.is_finite() {
                return Err(SentinelError::Malformed("ts is not finite".into()));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `previous`, producing the next snapshot.
    ///
    /// Fields absent here keep their previous value, except the alert, which
    /// is present only when this update names a known event. Its force and
    /// timestamp come from the merged sample.
    pub fn apply_to(&self, previous: &TelemetrySample) -> TelemetrySample {
        let mut next = TelemetrySample {
            latitude: self.lat.unwrap_or(previous.latitude),
            longitude: self.lon.unwrap_or(previous.longitude),
            speed_mps: self.speed_mps.unwrap_or(previous.speed_mps),
            derived_force: self.g_dyn.unwrap_or(previous.derived_force),
            timestamp_secs: self.ts.unwrap_or(previous.timestamp_secs),
            alert: None,
        };

        next.alert = self
            .event
            .as_deref()
            .and_then(AlertKind::from_wire)
            .map(|kind| AlertEvent {
                kind,
                derived_force: next.derived_force,
                timestamp_secs: next.timestamp_secs,
            });
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            latitude: 18.52,
            longitude: 73.85,
            speed_mps: 12.0,
            derived_force: 0.3,
            timestamp_secs: 100.0,
            alert: None,
        }
    }

    #[test]
    fn test_partial_update_keeps_position() {
        let update = TelemetryUpdate::decode(br#"{"speed_mps": 5.0}"#).unwrap();
        let next = update.apply_to(&sample());
        assert_eq!(next.latitude, 18.52);
        assert_eq!(next.longitude, 73.85);
        assert_eq!(next.speed_mps, 5.0);
        assert!(!next.alert_active());
    }

    #[test]
    fn test_event_is_transient() {
        let alert = TelemetryUpdate::decode(br#"{"event": "HARSH_DYNAMICS", "g_dyn": 5.2, "ts": 101.0}"#)
            .unwrap()
            .apply_to(&sample());
        let event = alert.alert.expect("alert");
        assert_eq!(event.derived_force, 5.2);
        assert_eq!(event.timestamp_secs, 101.0);
        assert_eq!(alert.latitude, 18.52);

        let cleared = TelemetryUpdate::decode(br#"{"g_dyn": 0.2}"#)
            .unwrap()
            .apply_to(&alert);
        assert!(!cleared.alert_active());
        assert_eq!(cleared.timestamp_secs, 101.0);
    }

    #[test]
    fn test_legacy_event_name() {
        let next = TelemetryUpdate::decode(br#"{"event": "HARSH_BRAKE", "g_dyn": 4.5}"#)
            .unwrap()
            .apply_to(&sample());
        assert_eq!(next.alert.map(|a| a.kind), Some(AlertKind::HarshDynamics));
    }

    #[test]
    fn test_unknown_event_and_keys_are_ignored() {
        let update =
            TelemetryUpdate::decode(br#"{"event": "LANE_CHANGE", "battery": 80, "lat": 19.0}"#).unwrap();
        let next = update.apply_to(&sample());
        assert_eq!(next.latitude, 19.0);
        assert!(!next.alert_active());
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        let bad: [&[u8]; 7] = [
            b"not json",
            b"[18.5, 73.8]",
            b"42",
            br#"{"lat": "north"}"#,
            br#"{"speed_mps": -1.0}"#,
            br#"{"g_dyn": -0.5}"#,
            br#"{"lat": 91.0}"#,
        ];
        for payload in bad {
            assert!(
                matches!(TelemetryUpdate::decode(payload), Err(SentinelError::Malformed(_))),
                "accepted {:?}",
                String::from_utf8_lossy(payload)
            );
        }
        assert!(TelemetryUpdate::decode(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_oversized_datagram() {
        let mut payload = br#"{"lat": 1.0, "pad": ""#.to_vec();
        payload.extend(std::iter::repeat(b'x').take(MAX_DATAGRAM_BYTES));
        payload.extend(br#""}"#);
        assert!(TelemetryUpdate::decode(&payload).is_err());
    }

    #[test]
    fn test_empty_object_is_valid_noop() {
        let update = TelemetryUpdate::decode(b"{}").unwrap();
        assert!(update.is_empty());
        assert_eq!(update.apply_to(&sample()), sample());
    }

    #[test]
    fn test_alert_datagram_shape() {
        let alert = AlertEvent {
            kind: AlertKind::HarshDynamics,
            derived_force: 4.2,
            timestamp_secs: 12.5,
        };
        let bytes = TelemetryUpdate::from_alert(&alert).encode().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"event": "HARSH_DYNAMICS", "g_dyn": 4.2, "ts": 12.5})
        );
    }

    #[test]
    fn test_full_sample_skips_non_finite() {
        let mut s = sample();
        s.speed_mps = f64::NAN;
        let update = TelemetryUpdate::from_sample(&s);
        assert_eq!(update.speed_mps, None);
        assert_eq!(update.lat, Some(18.52));

        let decoded = TelemetryUpdate::decode(&update.encode().unwrap()).unwrap();
        assert_eq!(decoded, update);
    }
}
