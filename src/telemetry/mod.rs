//! Same-host telemetry channel
//!
//! The sampling process pushes JSON datagrams over UDP; the consuming process
//! merges them into a latest-snapshot handle. Neither side waits on the other.

pub mod backoff;
pub mod latest;
pub mod receiver;
pub mod sender;
pub mod wire;

pub use backoff::Backoff;
pub use latest::LatestTelemetry;
pub use receiver::TelemetryReceiver;
pub use sender::TelemetrySender;
pub use wire::{TelemetryUpdate, MAX_DATAGRAM_BYTES};

use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 5055;

pub fn default_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))
}
