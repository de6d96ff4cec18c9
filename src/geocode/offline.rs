use super::{GeoRegion, GeocodeResolver};
use crate::error::{SentinelError, SentinelResult};
use flate2::read::GzDecoder;
use geo::{HaversineDistance, Point};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Populated place with its administrative parents
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub subregion: String,
    pub lat: f64,
    pub lon: f64,
}

/// Indexed point: `[lon, lat]` plus the index into `places`
type IndexedPlace = GeomWithData<[f64; 2], usize>;

/// Seed table: one or more major places per directory jurisdiction.
/// (name, region, subregion, lat, lon)
const SEED_PLACES: &[(&str, &str, &str, f64, f64)] = &[
    ("New Delhi", "Delhi", "New Delhi", 28.6139, 77.2090),
    ("Mumbai", "Maharashtra", "Mumbai City", 18.9388, 72.8354),
    ("Andheri", "Maharashtra", "Mumbai Suburban", 19.1136, 72.8697),
    ("Pune", "Maharashtra", "Pune", 18.5204, 73.8567),
    ("Nagpur", "Maharashtra", "Nagpur", 21.1458, 79.0882),
    ("Bengaluru", "Karnataka", "Bangalore Urban", 12.9716, 77.5946),
    ("Chennai", "Tamil Nadu", "Chennai", 13.0827, 80.2707),
    ("Lucknow", "Uttar Pradesh", "Lucknow", 26.8467, 80.9462),
    ("Gurugram", "Haryana", "Gurgaon", 28.4595, 77.0266),
    ("Panchkula", "Haryana", "Panchkula", 30.6942, 76.8606),
    ("Thiruvananthapuram", "Kerala", "Thiruvananthapuram", 8.5241, 76.9366),
    ("Ahmedabad", "Gujarat", "Ahmedabad", 23.0225, 72.5714),
    ("Kolkata", "West Bengal", "Kolkata", 22.5726, 88.3639),
    ("Hyderabad", "Telangana", "Hyderabad", 17.3850, 78.4867),
    ("Ludhiana", "Punjab", "Ludhiana", 30.9010, 75.8573),
    ("Jaipur", "Rajasthan", "Jaipur", 26.9124, 75.7873),
    ("Panaji", "Goa", "North Goa", 15.4909, 73.8278),
];

/// Nearest-place reverse geocoder backed by an R-tree
///
/// # Architecture
/// - Places are indexed by `[lon, lat]` and queried with a nearest-neighbour
///   search in degree space
/// - The candidate is accepted only when its great-circle distance is within
///   `max_distance_km`, so points far from any known place yield "no result"
///
/// # Usage
/// ```no_run
/// use sentinel_rs::geocode::{GeocodeResolver, OfflineGeocoder};
///
/// let geocoder = OfflineGeocoder::builtin(250.0);
/// if let Ok(Some(region)) = geocoder.search(19.07, 72.87) {
///     println!("{} / {}", region.region_name, region.subregion_name);
/// }
/// ```
pub struct OfflineGeocoder {
    places: Vec<Place>,
    tree: RTree<IndexedPlace>,
    max_distance_km: f64,
}

impl OfflineGeocoder {
    pub fn new(places: Vec<Place>, max_distance_km: f64) -> Self {
        let points: Vec<IndexedPlace> = places
            .iter()
            .enumerate()
            .filter(|(_, p)| p.lat.is_finite() && p.lon.is_finite())
            .map(|(idx, p)| GeomWithData::new([p.lon, p.lat], idx))
            .collect();

        OfflineGeocoder {
            places,
            tree: RTree::bulk_load(points),
            max_distance_km,
        }
    }

    /// Geocoder over the built-in seed places
    pub fn builtin(max_distance_km: f64) -> Self {
        let places = SEED_PLACES
            .iter()
            .map(|(name, region, subregion, lat, lon)| Place {
                name: name.to_string(),
                region: region.to_string(),
                subregion: subregion.to_string(),
                lat: *lat,
                lon: *lon,
            })
            .collect();
        Self::new(places, max_distance_km)
    }

    /// Load a JSON array of [`Place`] records from `.json` or `.json.gz`.
    pub fn from_file(path: &Path, max_distance_km: f64) -> SentinelResult<Self> {
        let file = File::open(path).map_err(|e| {
            SentinelError::GeocodeUnavailable(format!("{}: {}", path.display(), e))
        })?;

        let reader: Box<dyn Read> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let places: Vec<Place> = serde_json::from_reader(BufReader::new(reader)).map_err(|e| {
            SentinelError::GeocodeUnavailable(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self::new(places, max_distance_km))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl GeocodeResolver for OfflineGeocoder {
    fn search(&self, latitude: f64, longitude: f64) -> SentinelResult<Option<GeoRegion>> {
        if self.is_empty() {
            return Err(SentinelError::GeocodeUnavailable(
                "no places loaded".to_string(),
            ));
        }
        if !latitude.is_finite() || !longitude.is_finite() {
            return Ok(None);
        }

        let Some(nearest) = self.tree.nearest_neighbor(&[longitude, latitude]) else {
            return Ok(None);
        };
        let place = &self.places[nearest.data];

        let distance_km = Point::new(longitude, latitude)
            .haversine_distance(&Point::new(place.lon, place.lat))
            / 1000.0;
        if distance_km > self.max_distance_km {
            return Ok(None);
        }

        Ok(Some(GeoRegion {
            region_name: place.region.clone(),
            subregion_name: place.subregion.clone(),
            locality_name: place.name.clone(),
        }))
    }
}
