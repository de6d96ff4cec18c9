//! Point → administrative region lookup
//!
//! Routing only depends on the [`GeocodeResolver`] contract. The crate ships an
//! in-memory nearest-place implementation so the binaries run fully offline.

pub mod offline;

pub use offline::{OfflineGeocoder, Place};

use crate::error::SentinelResult;
use serde::{Deserialize, Serialize};

/// Region names for a coordinate, coarsest first
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRegion {
    /// State-level name (admin1), e.g. `Maharashtra`
    pub region_name: String,
    /// District-level name (admin2), e.g. `Mumbai Suburban`
    pub subregion_name: String,
    /// Nearest populated place, e.g. `Andheri`
    pub locality_name: String,
}

impl GeoRegion {
    /// Text searched for locality override keywords
    pub fn locality_text(&self) -> String {
        format!("{} {}", self.subregion_name, self.locality_name)
            .trim()
            .to_string()
    }
}

pub trait GeocodeResolver: Send + Sync {
    /// `Ok(None)` means "no result" for this point, which is different from a
    /// region whose names happen to be empty. `Err` means the resolver itself
    /// could not answer. Implementations must return in bounded time.
    fn search(&self, latitude: f64, longitude: f64) -> SentinelResult<Option<GeoRegion>>;
}
