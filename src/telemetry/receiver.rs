use super::backoff::Backoff;
use super::latest::LatestTelemetry;
use super::wire::{TelemetryUpdate, MAX_DATAGRAM_BYTES};
use crate::error::{SentinelError, SentinelResult};
use crate::stop::StopFlag;
use crate::types::TelemetrySample;
use log::{debug, error, info};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

/// Receiving end of the telemetry channel
///
/// Owns the merged state; every accepted datagram produces a new snapshot
/// that is published to a [`LatestTelemetry`] handle.
pub struct TelemetryReceiver {
    socket: UdpSocket,
    current: TelemetrySample,
    accepted: u64,
    rejected: u64,
}

impl TelemetryReceiver {
    pub async fn bind(addr: SocketAddr) -> SentinelResult<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| SentinelError::Transport(format!("bind {}: {}", addr, e)))?;
        info!("Telemetry receiver listening on {}", addr);

        Ok(Self {
            socket,
            current: TelemetrySample::default(),
            accepted: 0,
            rejected: 0,
        })
    }

    /// Bind, retrying with backoff until it works or `stop` is raised.
    ///
    /// Only the first failure is logged as an error.
    pub async fn bind_with_retry(addr: SocketAddr, stop: &StopFlag) -> Option<Self> {
        let mut backoff = Backoff::new("telemetry-receiver", Duration::from_secs(1));

        while !stop.is_stopped() {
            match Self::bind(addr).await {
                Ok(receiver) => return Some(receiver),
                Err(e) => {
                    let wait = backoff.record_failure();
                    if backoff.attempts() == 1 {
                        error!(
                            "Telemetry receiver unavailable: {} (retrying in {:.1}s)",
                            e,
                            wait.as_secs_f64()
                        );
                    } else {
                        debug!("Bind retry {} failed: {}", backoff.attempts(), e);
                    }
                    while !stop.is_stopped() && !backoff.can_retry() {
                        sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        }
        None
    }

    pub fn local_addr(&self) -> SentinelResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn current(&self) -> &TelemetrySample {
        &self.current
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Decode and merge one datagram. A rejected payload leaves the state as
    /// it was.
    pub fn apply(&mut self, bytes: &[u8]) -> SentinelResult<&TelemetrySample> {
        match TelemetryUpdate::decode(bytes) {
            Ok(update) => {
                self.current = update.apply_to(&self.current);
                self.accepted += 1;
                Ok(&self.current)
            }
            Err(e) => {
                self.rejected += 1;
                Err(e)
            }
        }
    }

    /// Receive until `stop` is raised.
    ///
    /// `idle_wait` bounds each receive so the stop flag is seen even when no
    /// sender is active. An alert outlives at most one idle wait: if nothing
    /// arrives in that time it is dropped from the published snapshot.
    pub async fn run(mut self, latest: LatestTelemetry, stop: StopFlag, idle_wait: Duration) {
        // one spare byte so an oversized datagram is seen as oversized, not truncated
        let mut buf = vec![0u8; MAX_DATAGRAM_BYTES + 1];

        while !stop.is_stopped() {
            let (len, peer) = match timeout(idle_wait, self.socket.recv_from(&mut buf)).await {
                Err(_) => {
                    if self.current.alert.take().is_some() && latest.clear_alert() {
                        debug!("Alert expired with no further telemetry");
                    }
                    continue;
                }
                Ok(Err(e)) => {
                    debug!("Telemetry receive error: {}", e);
                    continue;
                }
                Ok(Ok(received)) => received,
            };

            match self.apply(&buf[..len]) {
                Ok(sample) => {
                    if let Some(alert) = sample.alert {
                        info!(
                            "{} from {}: g_dyn={:.2}",
                            alert.kind.as_str(),
                            peer,
                            alert.derived_force
                        );
                    }
                    latest.replace(sample.clone());
                }
                Err(e) => debug!("Discarding datagram from {}: {}", peer, e),
            }
        }

        info!(
            "Telemetry receiver stopped ({} accepted, {} rejected)",
            self.accepted, self.rejected
        );
    }
}
