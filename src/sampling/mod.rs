//! Sampling side: sensor source → detector → telemetry sender

pub mod replay;
pub mod simulated;

pub use replay::ReplaySource;
pub use simulated::SimulatedSource;

use crate::config::TelemetryConfig;
use crate::detector::BrakeEventDetector;
use crate::error::SentinelResult;
use crate::live_status::{current_timestamp, SamplerStatus};
use crate::routing::has_fix;
use crate::stop::StopFlag;
use crate::telemetry::TelemetrySender;
use crate::types::{AlertEvent, Fix, MotionVector, TelemetrySample};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

/// Interval between live status file writes
const STATUS_INTERVAL_SECS: u64 = 2;

/// Platform sensor access
pub trait SampleSource {
    fn name(&self) -> &'static str;

    /// Latest accelerometer reading, `None` when nothing new is available.
    fn next_motion_vector(&mut self) -> Option<MotionVector>;

    fn last_known_position(&self) -> Option<Fix>;

    /// A finite source (a recording) reports when it has nothing left.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Fixed-cadence loop that owns the detector and the sending end of the
/// telemetry channel.
///
/// Each tick pulls one vector and runs the detector. An alert is pushed
/// immediately as a partial datagram and also held for the next full sample.
/// Full samples go out every `publish_interval_secs`.
pub struct SamplingLoop<S: SampleSource> {
    source: S,
    detector: BrakeEventDetector,
    sender: TelemetrySender,
    sample_interval: Duration,
    publish_interval_secs: f64,
    pending_alert: Option<AlertEvent>,
    last_publish: Option<f64>,
    status: SamplerStatus,
    status_path: Option<PathBuf>,
    started: Instant,
    last_status_write: Option<Instant>,
}

impl<S: SampleSource> SamplingLoop<S> {
    pub fn new(
        source: S,
        detector: BrakeEventDetector,
        sender: TelemetrySender,
        config: &TelemetryConfig,
    ) -> Self {
        let status = SamplerStatus::new(source.name());
        Self {
            source,
            detector,
            sender,
            sample_interval: config.sample_interval(),
            publish_interval_secs: config.publish_interval_secs,
            pending_alert: None,
            last_publish: None,
            status,
            status_path: None,
            started: Instant::now(),
            last_status_write: None,
        }
    }

    /// Write counters to `path` every couple of seconds and on exit.
    pub fn with_status_file(mut self, path: PathBuf) -> Self {
        self.status_path = Some(path);
        self
    }

    pub fn status(&self) -> &SamplerStatus {
        &self.status
    }

    pub fn pending_alert(&self) -> Option<&AlertEvent> {
        self.pending_alert.as_ref()
    }

    /// Snapshot for the next full datagram. Takes the held alert, if any.
    ///
    /// Without a fix the position is the `(0, 0)` "no fix" sentinel.
    fn build_sample(&mut self, now: f64) -> TelemetrySample {
        let fix = self.source.last_known_position().unwrap_or(Fix {
            latitude: 0.0,
            longitude: 0.0,
            speed_mps: 0.0,
        });
        let alert = self.pending_alert.take();

        TelemetrySample {
            latitude: fix.latitude,
            longitude: fix.longitude,
            speed_mps: fix.speed_mps,
            derived_force: alert
                .map(|a| a.derived_force)
                .unwrap_or_else(|| self.detector.derived_force()),
            timestamp_secs: now,
            alert,
        }
    }

    fn record_send(&mut self, result: SentinelResult<usize>) {
        if let Err(e) = result {
            debug!("Telemetry send skipped: {}", e);
        }
        self.status.datagrams_sent = self.sender.sent();
        self.status.send_failures = self.sender.failed();
    }

    /// One loop iteration at time `now` (seconds). Returns the alert raised
    /// by this tick, if any.
    pub fn tick(&mut self, now: f64) -> Option<AlertEvent> {
        let mut raised = None;

        if let Some(vector) = self.source.next_motion_vector() {
            self.status.vectors_seen += 1;

            if let Some(alert) = self.detector.observe(vector, now) {
                warn!(
                    "{} detected: g_dyn={:.2} m/s² at {:.3}",
                    alert.kind.as_str(),
                    alert.derived_force,
                    alert.timestamp_secs
                );
                self.status.alerts_raised += 1;
                self.status.last_alert = Some(alert);
                self.pending_alert = Some(alert);
                raised = Some(alert);

                let result = self.sender.publish_alert(&alert);
                self.record_send(result);
            }

            self.status.vectors_processed = self.detector.processed();
            self.status.last_derived_force = self.detector.derived_force();
        }

        let publish_due = self
            .last_publish
            .map_or(true, |last| now - last >= self.publish_interval_secs);
        if publish_due {
            let sample = self.build_sample(now);
            self.last_publish = Some(now);
            self.status.has_fix = has_fix(sample.latitude, sample.longitude);
            self.status.gps_lat = sample.latitude;
            self.status.gps_lon = sample.longitude;
            self.status.gps_speed = sample.speed_mps;

            let result = self.sender.publish_sample(&sample);
            self.record_send(result);
        }

        raised
    }

    fn write_status(&mut self) {
        let Some(path) = &self.status_path else {
            return;
        };
        self.status.uptime_seconds = self.started.elapsed().as_secs();
        self.status.touch();
        if let Err(e) = self.status.save(path) {
            warn!("Failed to write status file {}: {}", path.display(), e);
        }
        self.last_status_write = Some(Instant::now());
    }

    /// Run until `stop` is raised, `duration` elapses, or the source runs dry.
    pub async fn run(mut self, stop: StopFlag, duration: Option<Duration>) -> SamplerStatus {
        info!(
            "Sampling from {} every {:.0} ms, telemetry to {}",
            self.source.name(),
            self.sample_interval.as_secs_f64() * 1000.0,
            self.sender.target()
        );

        let mut ticker = interval(self.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let clock_base = current_timestamp();
        let mut first_tick = None;

        loop {
            // Stamp with the scheduled tick, not the wake-up time, so wake-up
            // jitter never pushes two ticks under the detector's rate gate
            let scheduled = ticker.tick().await;
            let first = *first_tick.get_or_insert(scheduled);
            let now = clock_base + scheduled.duration_since(first).as_secs_f64();

            if stop.is_stopped() {
                info!("Stop requested");
                break;
            }
            if duration.map_or(false, |limit| self.started.elapsed() >= limit) {
                info!("Duration reached");
                break;
            }
            if self.source.is_exhausted() {
                info!("Source {} exhausted", self.source.name());
                break;
            }

            self.tick(now);

            let status_due = self
                .last_status_write
                .map_or(true, |t| t.elapsed() >= Duration::from_secs(STATUS_INTERVAL_SECS));
            if status_due {
                self.write_status();
            }
        }

        self.write_status();
        self.status.uptime_seconds = self.started.elapsed().as_secs();
        info!(
            "Sampler stopped: {} vectors, {} alerts, {} datagrams ({} failed)",
            self.status.vectors_seen,
            self.status.alerts_raised,
            self.status.datagrams_sent,
            self.status.send_failures
        );
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::TelemetryUpdate;
    use crate::types::AlertKind;
    use approx::assert_relative_eq;
    use tokio::net::UdpSocket;

    /// Scripted source: replays a fixed list of vectors
    struct ScriptedSource {
        vectors: Vec<MotionVector>,
        fix: Option<Fix>,
    }

    impl SampleSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn next_motion_vector(&mut self) -> Option<MotionVector> {
            if self.vectors.is_empty() {
                None
            } else {
                Some(self.vectors.remove(0))
            }
        }

        fn last_known_position(&self) -> Option<Fix> {
            self.fix
        }

        fn is_exhausted(&self) -> bool {
            self.vectors.is_empty()
        }
    }

    async fn listener() -> (UdpSocket, TelemetryConfig) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = TelemetryConfig {
            addr: socket.local_addr().unwrap(),
            ..TelemetryConfig::default()
        };
        (socket, config)
    }

    async fn recv_update(socket: &UdpSocket) -> TelemetryUpdate {
        let mut buf = [0u8; 8192];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
            .await
            .expect("datagram")
            .unwrap();
        TelemetryUpdate::decode(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_alert_pushed_then_folded_into_sample() {
        let (socket, config) = listener().await;
        let source = ScriptedSource {
            vectors: vec![
                MotionVector::new(0.0, 0.0, 9.81),
                MotionVector::new(8.0, 8.0, 8.0),
                MotionVector::new(0.0, 0.0, 9.81),
            ],
            fix: Some(Fix {
                latitude: 18.52,
                longitude: 73.85,
                speed_mps: 7.0,
            }),
        };
        let mut sampler = SamplingLoop::new(
            source,
            BrakeEventDetector::default(),
            TelemetrySender::new(config.addr),
            &config,
        );

        // first tick publishes a full sample straight away
        assert!(sampler.tick(100.0).is_none());
        let first = recv_update(&socket).await;
        assert_eq!(first.lat, Some(18.52));
        assert_eq!(first.event, None);

        // alert goes out alone, before the next full sample
        let alert = sampler.tick(100.2).expect("alert");
        assert_eq!(alert.kind, AlertKind::HarshDynamics);
        let partial = recv_update(&socket).await;
        assert_eq!(partial.event.as_deref(), Some("HARSH_DYNAMICS"));
        assert_eq!(partial.lat, None);
        assert!(sampler.pending_alert().is_some());

        // next full sample carries and clears the held alert
        sampler.tick(101.2);
        let full = recv_update(&socket).await;
        assert_eq!(full.event.as_deref(), Some("HARSH_DYNAMICS"));
        assert_relative_eq!(full.g_dyn.unwrap(), alert.derived_force, epsilon = 1e-9);
        assert!(sampler.pending_alert().is_none());

        let status = sampler.status();
        assert_eq!(status.vectors_seen, 3);
        assert_eq!(status.alerts_raised, 1);
        assert_eq!(status.datagrams_sent, 3);
        assert!(status.has_fix);
    }

    #[tokio::test]
    async fn test_no_fix_sends_zero_sentinel() {
        let (socket, config) = listener().await;
        let source = ScriptedSource {
            vectors: vec![MotionVector::new(0.0, 0.0, 9.81)],
            fix: None,
        };
        let mut sampler = SamplingLoop::new(
            source,
            BrakeEventDetector::default(),
            TelemetrySender::new(config.addr),
            &config,
        );

        sampler.tick(5.0);
        let update = recv_update(&socket).await;
        assert_eq!(update.lat, Some(0.0));
        assert_eq!(update.lon, Some(0.0));
        assert!(!sampler.status().has_fix);
    }

    #[tokio::test]
    async fn test_run_stops_when_source_exhausted() {
        let (_socket, mut config) = listener().await;
        config.sample_interval_secs = 0.01;
        let source = ScriptedSource {
            vectors: vec![MotionVector::new(0.0, 0.0, 9.81); 5],
            fix: None,
        };
        let tmp = tempfile::TempDir::new().unwrap();
        let status_path = tmp.path().join("status.json");

        let sampler = SamplingLoop::new(
            source,
            BrakeEventDetector::default(),
            TelemetrySender::new(config.addr),
            &config,
        )
        .with_status_file(status_path.clone());

        let status = tokio::time::timeout(
            Duration::from_secs(5),
            sampler.run(StopFlag::new(), None),
        )
        .await
        .expect("loop finished");
        assert_eq!(status.vectors_seen, 5);
        assert!(status_path.exists());
    }

    #[tokio::test]
    async fn test_run_processes_every_vector_at_default_cadence() {
        let (_socket, config) = listener().await;
        let sampler = SamplingLoop::new(
            SimulatedSource::new(18.52, 73.85, 0.1),
            BrakeEventDetector::default(),
            TelemetrySender::new(config.addr),
            &config,
        );

        let status = sampler
            .run(StopFlag::new(), Some(Duration::from_millis(1500)))
            .await;
        assert!(status.vectors_seen >= 10);
        assert_eq!(status.vectors_processed, status.vectors_seen);
    }

    #[tokio::test]
    async fn test_run_honours_stop_flag() {
        let (_socket, config) = listener().await;
        let stop = StopFlag::new();
        stop.stop();
        let sampler = SamplingLoop::new(
            SimulatedSource::new(18.52, 73.85, 0.1),
            BrakeEventDetector::default(),
            TelemetrySender::new(config.addr),
            &config,
        );
        let status = sampler.run(stop, None).await;
        assert_eq!(status.vectors_seen, 0);
    }
}
