//! Road-safety telemetry and report routing
//!
//! Two halves that only talk over a same-host UDP channel:
//!
//! - the sampling side reads motion vectors, flags harsh braking or
//!   acceleration and pushes telemetry datagrams
//! - the consuming side keeps the latest telemetry and decides which traffic
//!   authorities a report goes to, from the event position and the vehicle's
//!   registration plate

pub mod config;
pub mod dashboard;
pub mod detector;
pub mod directory;
pub mod error;
pub mod geocode;
pub mod law;
pub mod live_status;
pub mod plate;
pub mod routing;
pub mod sampling;
pub mod stop;
pub mod telemetry;
pub mod types;

pub use config::SentinelConfig;
pub use detector::{BrakeEventDetector, DetectorConfig};
pub use directory::ContactDirectory;
pub use error::{SentinelError, SentinelResult};
pub use geocode::{GeoRegion, GeocodeResolver, OfflineGeocoder};
pub use routing::{RouteResult, RoutingEngine};
pub use stop::StopFlag;
pub use telemetry::{LatestTelemetry, TelemetryReceiver, TelemetrySender};
pub use types::{AlertEvent, AlertKind, AuthorityCode, Fix, MotionVector, TelemetrySample};
