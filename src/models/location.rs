use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row shape of `location_cache`: one resolved geocode per address string,
/// consulted before any new remote geocoding call.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LocationCache {
    pub id: Uuid,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Which step of the fallback chain produced the result. `Default` is still a
/// success for callers; it only marks that every lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Device,
    IpPrimary,
    IpFallback,
    Default,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectedLocation {
    #[serde(flatten)]
    pub location: ResolvedLocation,
    pub source: LocationSource,
}

pub fn default_location() -> ResolvedLocation {
    ResolvedLocation {
        city: "Mumbai".into(),
        state: "Maharashtra".into(),
        country: "India".into(),
        latitude: 19.0760,
        longitude: 72.8777,
    }
}
