//! UDP telemetry sender
//! Connectionless and fire-and-forget: a send never waits on the receiver

use super::backoff::Backoff;
use super::wire::TelemetryUpdate;
use crate::error::{SentinelError, SentinelResult};
use crate::types::{AlertEvent, TelemetrySample};
use log::{info, warn};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

pub struct TelemetrySender {
    socket: Option<UdpSocket>,
    target: SocketAddr,
    backoff: Backoff,
    sent: u64,
    failed: u64,
}

impl TelemetrySender {
    pub fn new(target: SocketAddr) -> Self {
        info!("UDP telemetry sender created for: {}", target);

        Self {
            socket: None,
            target,
            backoff: Backoff::new("telemetry-sender", Duration::from_secs(1)),
            sent: 0,
            failed: 0,
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Bind the local socket if it is missing and the backoff allows a try.
    ///
    /// The socket is a plain non-blocking one, writable as soon as it exists.
    pub fn ensure_bound(&mut self) -> SentinelResult<()> {
        if self.socket.is_some() {
            return Ok(());
        }
        if !self.backoff.can_retry() {
            self.failed += 1;
            return Err(SentinelError::NotBound);
        }

        let local = if self.target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let bound = UdpSocket::bind(local).and_then(|socket| {
            socket.set_nonblocking(true)?;
            Ok(socket)
        });
        match bound {
            Ok(socket) => {
                info!("UDP telemetry socket ready for {}", self.target);
                self.backoff.record_success();
                self.socket = Some(socket);
                Ok(())
            }
            Err(e) => {
                self.failed += 1;
                let wait = self.backoff.record_failure();
                warn!(
                    "UDP telemetry bind failed ({}), retrying in {:.1}s",
                    e,
                    wait.as_secs_f64()
                );
                Err(SentinelError::Transport(e.to_string()))
            }
        }
    }

    /// Send one encoded update without blocking.
    ///
    /// A full socket buffer is reported as a transport error; the datagram is
    /// dropped, not queued.
    pub fn send(&mut self, update: &TelemetryUpdate) -> SentinelResult<usize> {
        let payload = update.encode()?;
        let Some(socket) = self.socket.as_ref() else {
            self.failed += 1;
            return Err(SentinelError::NotBound);
        };

        match socket.send_to(&payload, self.target) {
            Ok(n) => {
                self.sent += 1;
                Ok(n)
            }
            Err(e) => {
                self.failed += 1;
                if e.kind() != io::ErrorKind::WouldBlock
                    && e.kind() != io::ErrorKind::ConnectionRefused
                {
                    // force a rebind on the next cycle
                    self.socket = None;
                    self.backoff.record_failure();
                }
                Err(SentinelError::Transport(e.to_string()))
            }
        }
    }

    pub fn publish_sample(&mut self, sample: &TelemetrySample) -> SentinelResult<usize> {
        self.ensure_bound()?;
        self.send(&TelemetryUpdate::from_sample(sample))
    }

    pub fn publish_alert(&mut self, alert: &AlertEvent) -> SentinelResult<usize> {
        self.ensure_bound()?;
        self.send(&TelemetryUpdate::from_alert(alert))
    }
}
