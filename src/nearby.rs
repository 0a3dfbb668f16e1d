//! Nearby pharmacy / doctor lookup contract.
//!
//! The place search itself belongs to an external backend behind
//! `PlaceLookup`. This module owns the geometry: coordinate validation,
//! great-circle distance, and radius filtering with distance ordering.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NearbyError {
    #[error("Latitude must be between -90 and 90 (got {0})")]
    InvalidLatitude(f64),

    #[error("Longitude must be between -180 and 180 (got {0})")]
    InvalidLongitude(f64),

    #[error("Radius must be between {min} and {max} km (got {0})", min = MIN_RADIUS_KM, max = MAX_RADIUS_KM)]
    InvalidRadius(f64),

    #[error("Place search failed: {0}")]
    Lookup(String),
}

// ═══════════════════════════════════════════
// Types
// ═══════════════════════════════════════════

/// WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, NearbyError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(NearbyError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(NearbyError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Pharmacy,
    Doctor,
    Hospital,
    Clinic,
}

/// What the user asked to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    #[default]
    Pharmacy,
    Doctor,
}

impl SearchCategory {
    /// Doctor searches also surface hospitals and clinics.
    pub fn matches(&self, kind: PlaceKind) -> bool {
        match self {
            Self::Pharmacy => kind == PlaceKind::Pharmacy,
            Self::Doctor => matches!(
                kind,
                PlaceKind::Doctor | PlaceKind::Hospital | PlaceKind::Clinic
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub kind: PlaceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// A place together with its distance from the query origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub distance_km: f64,
}

/// Validated search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    origin: Coordinates,
    category: SearchCategory,
    radius_km: f64,
}

impl NearbyQuery {
    pub fn new(
        origin: Coordinates,
        category: SearchCategory,
        radius_km: f64,
    ) -> Result<Self, NearbyError> {
        if !radius_km.is_finite() || !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius_km) {
            return Err(NearbyError::InvalidRadius(radius_km));
        }
        Ok(Self {
            origin,
            category,
            radius_km,
        })
    }

    /// Query at the default search radius.
    pub fn around(origin: Coordinates, category: SearchCategory) -> Self {
        Self {
            origin,
            category,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }

    pub fn origin(&self) -> Coordinates {
        self.origin
    }

    pub fn category(&self) -> SearchCategory {
        self.category
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }
}

// ═══════════════════════════════════════════
// Geometry
// ═══════════════════════════════════════════

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Keep places of the requested category inside the radius, nearest first.
///
/// Ties keep their input order.
pub fn rank_by_distance(query: &NearbyQuery, places: Vec<Place>) -> Vec<RankedPlace> {
    let mut ranked: Vec<RankedPlace> = places
        .into_iter()
        .filter(|p| query.category.matches(p.kind))
        .map(|place| {
            let distance_km = haversine_km(query.origin, place.coordinates());
            RankedPlace { place, distance_km }
        })
        .filter(|r| r.distance_km <= query.radius_km)
        .collect();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

// ═══════════════════════════════════════════
// Search backend
// ═══════════════════════════════════════════

/// Place-search backend (map API, local directory, ...).
pub trait PlaceLookup: Send + Sync {
    fn search<'a>(&'a self, query: &'a NearbyQuery)
        -> BoxFuture<'a, Result<Vec<Place>, NearbyError>>;
}

/// Run the lookup and rank whatever it returns.
pub async fn find_nearby(
    lookup: &dyn PlaceLookup,
    query: &NearbyQuery,
) -> Result<Vec<RankedPlace>, NearbyError> {
    let places = lookup.search(query).await?;
    let ranked = rank_by_distance(query, places);
    tracing::debug!(
        category = ?query.category(),
        radius_km = query.radius_km(),
        results = ranked.len(),
        "Nearby search complete"
    );
    Ok(ranked)
}
