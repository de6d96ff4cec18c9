//! Dual-authority recipient routing
//!
//! A report goes to the authority where the event happened (from the geocoded
//! position) and the authority where the vehicle is registered (from the plate
//! prefix). Both address sets are unioned, deduplicated and sorted so the same
//! inputs always give the same list.

use crate::directory::ContactDirectory;
use crate::geocode::{GeoRegion, GeocodeResolver};
use crate::plate;
use crate::types::{AuthorityCode, TelemetrySample};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Coordinates closer than this to zero on either axis count as "no fix yet".
pub const FIX_EPSILON_DEG: f64 = 1e-4;

pub const UNROUTABLE_WARNING: &str =
    "Recipients could not be resolved (missing GPS fix, unknown plate or unmapped region)";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RouteResult {
    pub location_code: Option<AuthorityCode>,
    pub registration_code: Option<AuthorityCode>,
    /// Geocoder answer the location code was derived from
    pub region: Option<GeoRegion>,
    /// Sorted ascending, unique
    pub recipients: Vec<String>,
}

impl RouteResult {
    /// Empty recipients is a valid outcome the caller shows as a warning.
    pub fn is_unroutable(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.is_unroutable().then_some(UNROUTABLE_WARNING)
    }
}

impl fmt::Display for RouteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code_or_unknown =
            |c: &Option<AuthorityCode>| c.as_ref().map(|c| c.to_string()).unwrap_or_else(|| "UNKNOWN".into());
        let region_name = self
            .region
            .as_ref()
            .map(|r| r.region_name.as_str())
            .unwrap_or("");

        writeln!(
            f,
            "- Registration-based (plate code): {}",
            code_or_unknown(&self.registration_code)
        )?;
        writeln!(
            f,
            "- Location-based (state code): {} (state_name={})",
            code_or_unknown(&self.location_code),
            region_name
        )?;
        if let Some(region) = &self.region {
            writeln!(
                f,
                "- Resolved: District={}, State={}, City={}",
                region.subregion_name, region.region_name, region.locality_name
            )?;
        }
        if self.recipients.is_empty() {
            write!(f, "- Recipients (deduped): NONE")
        } else {
            write!(f, "- Recipients (deduped): {}", self.recipients.join(", "))
        }
    }
}

pub fn has_fix(latitude: f64, longitude: f64) -> bool {
    latitude.abs() > FIX_EPSILON_DEG && longitude.abs() > FIX_EPSILON_DEG
}

#[derive(Clone)]
pub struct RoutingEngine {
    directory: Arc<ContactDirectory>,
    geocoder: Arc<dyn GeocodeResolver>,
}

impl RoutingEngine {
    pub fn new(directory: Arc<ContactDirectory>, geocoder: Arc<dyn GeocodeResolver>) -> Self {
        Self { directory, geocoder }
    }

    pub fn directory(&self) -> &ContactDirectory {
        &self.directory
    }

    /// Geocode a position; any failure collapses to `None`.
    fn locate(&self, latitude: f64, longitude: f64) -> Option<GeoRegion> {
        if !has_fix(latitude, longitude) {
            return None;
        }
        match self.geocoder.search(latitude, longitude) {
            Ok(region) => region,
            Err(e) => {
                warn!("Geocode lookup failed for ({:.5}, {:.5}): {}", latitude, longitude, e);
                None
            }
        }
    }

    /// Build the recipient list for a report at `(latitude, longitude)` about
    /// the vehicle with registration `registration`.
    pub fn resolve(&self, latitude: f64, longitude: f64, registration: &str) -> RouteResult {
        let region = self.locate(latitude, longitude);
        let location_code = region
            .as_ref()
            .and_then(|r| self.directory.region_code(&r.region_name))
            .cloned();
        let registration_code = plate::parse_authority_code(registration);

        let mut recipients: BTreeSet<String> = BTreeSet::new();

        if let Some(code) = &location_code {
            let locality = region.as_ref().map(GeoRegion::locality_text).unwrap_or_default();
            recipients.extend(
                self.directory
                    .location_addresses(code, &locality)
                    .into_iter()
                    .map(str::to_string),
            );
        }

        if let Some(code) = &registration_code {
            recipients.extend(self.directory.defaults(code).iter().cloned());
        }

        let result = RouteResult {
            location_code,
            registration_code,
            region,
            recipients: recipients.into_iter().collect(),
        };
        debug!(
            "Routed plate {:?}: location={:?} registration={:?} recipients={}",
            registration,
            result.location_code,
            result.registration_code,
            result.recipients.len()
        );
        result
    }

    /// Route against the position carried by a telemetry snapshot.
    pub fn resolve_sample(&self, sample: &TelemetrySample, registration: &str) -> RouteResult {
        self.resolve(sample.latitude, sample.longitude, registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SentinelError, SentinelResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGeocoder {
        answer: Option<GeoRegion>,
        calls: AtomicUsize,
    }

    impl FixedGeocoder {
        fn new(region: &str, subregion: &str, locality: &str) -> Self {
            Self {
                answer: Some(GeoRegion {
                    region_name: region.into(),
                    subregion_name: subregion.into(),
                    locality_name: locality.into(),
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl GeocodeResolver for FixedGeocoder {
        fn search(&self, _lat: f64, _lon: f64) -> SentinelResult<Option<GeoRegion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    struct BrokenGeocoder;

    impl GeocodeResolver for BrokenGeocoder {
        fn search(&self, _lat: f64, _lon: f64) -> SentinelResult<Option<GeoRegion>> {
            Err(SentinelError::GeocodeUnavailable("index not loaded".into()))
        }
    }

    fn engine_with(geocoder: Arc<dyn GeocodeResolver>) -> RoutingEngine {
        RoutingEngine::new(Arc::new(ContactDirectory::builtin()), geocoder)
    }

    fn code(s: &str) -> Option<AuthorityCode> {
        AuthorityCode::new(s)
    }

    #[test]
    fn test_maharashtra_outside_mumbai() {
        let engine = engine_with(Arc::new(FixedGeocoder::new("Maharashtra", "Pune", "Pune")));
        let result = engine.resolve(18.52, 73.85, "MH12AB1234");

        assert_eq!(result.location_code, code("MH"));
        assert_eq!(result.registration_code, code("MH"));
        assert_eq!(result.recipients, vec!["sp.hsp.hq@mahapolice.gov.in"]);
    }

    #[test]
    fn test_maharashtra_inside_mumbai() {
        let engine = engine_with(Arc::new(FixedGeocoder::new(
            "Maharashtra",
            "Mumbai Suburban",
            "Andheri",
        )));
        let result = engine.resolve(19.11, 72.87, "MH12AB1234");

        assert_eq!(result.location_code, code("MH"));
        assert_eq!(
            result.recipients,
            vec![
                "cp.mumbai.jtcp.traf@mahapolice.gov.in",
                "sp.hsp.hq@mahapolice.gov.in"
            ]
        );
    }

    #[test]
    fn test_dual_authority_union_is_sorted() {
        let engine = engine_with(Arc::new(FixedGeocoder::new("Karnataka", "Bangalore Urban", "")));
        let result = engine.resolve(12.97, 77.59, "dl-3c-ab-1234");

        assert_eq!(result.location_code, code("KA"));
        assert_eq!(result.registration_code, code("DL"));
        assert_eq!(
            result.recipients,
            vec!["addlcp.tfchq@delhipolice.gov.in", "bangloretrafficpolice@gmail.com"]
        );
    }

    #[test]
    fn test_zero_fix_skips_geocoder() {
        let geocoder = Arc::new(FixedGeocoder::new("Maharashtra", "Pune", "Pune"));
        let engine = engine_with(geocoder.clone());

        let result = engine.resolve(0.0, 0.0, "KA05MN4321");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.location_code, None);
        assert_eq!(result.region, None);
        assert_eq!(result.recipients, vec!["bangloretrafficpolice@gmail.com"]);

        engine.resolve(0.00001, 73.85, "KA05MN4321");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_geocoder_failure_is_unresolved_not_error() {
        let engine = engine_with(Arc::new(BrokenGeocoder));
        let result = engine.resolve(19.0, 72.8, "TN09BC1111");
        assert_eq!(result.location_code, None);
        assert_eq!(result.recipients, vec!["cctnstn@tn.gov.in"]);
    }

    #[test]
    fn test_unmapped_region_and_bad_plate_is_unroutable() {
        let engine = engine_with(Arc::new(FixedGeocoder::new("Maharashtra State", "", "")));
        let result = engine.resolve(19.0, 72.8, "12345");

        assert_eq!(result.location_code, None);
        assert_eq!(result.registration_code, None);
        assert!(result.is_unroutable());
        assert_eq!(result.warning(), Some(UNROUTABLE_WARNING));
        assert!(result.to_string().contains("Recipients (deduped): NONE"));
    }

    #[test]
    fn test_known_code_without_directory_entry() {
        let engine = engine_with(Arc::new(FixedGeocoder::new("Goa", "North Goa", "Panaji")));
        let result = engine.resolve(15.49, 73.82, "AP09XY0001");
        assert_eq!(result.registration_code, code("AP"));
        assert_eq!(result.recipients, vec!["sp_traffic@goapolice.gov.in"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let engine = engine_with(Arc::new(FixedGeocoder::new("Haryana", "Gurgaon", "Gurugram")));
        let first = engine.resolve(28.45, 77.02, "UP16AA0001");
        let second = engine.resolve(28.45, 77.02, "UP16AA0001");
        assert_eq!(first, second);
        assert_eq!(first.recipients.len(), 3);
    }

    #[test]
    fn test_display_audit_lines() {
        let engine = engine_with(Arc::new(FixedGeocoder::new("Maharashtra", "Pune", "Pune")));
        let text = engine.resolve(18.52, 73.85, "MH12AB1234").to_string();
        assert!(text.contains("Registration-based (plate code): MH"));
        assert!(text.contains("Location-based (state code): MH (state_name=Maharashtra)"));
        assert!(text.contains("sp.hsp.hq@mahapolice.gov.in"));
    }
}
