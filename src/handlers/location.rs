use std::time::Duration;

use actix_web::web::{Data, Json, Query};
use actix_web::HttpRequest;
use chrono::Utc;
use log::warn;
use serde::Deserialize;
use sqlx::{query_as, query_scalar, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::core::location::LocationResolver;
use crate::error::Error;
use crate::impls::geo::bigdatacloud::BigDataCloud;
use crate::impls::geo::device::DeviceLookup;
use crate::impls::geo::ip_api::IpApiCom;
use crate::impls::geo::ipapi::IpApiCo;
use crate::impls::geo::mapbox::Mapbox;
use crate::models::location::{Coordinate, DetectedLocation, LocationCache};

#[derive(Debug, Default, Deserialize)]
pub struct DetectBody {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Runs the fallback chain: device coordinate (when the request carries one),
/// then the two IP providers against the caller's address, then the default.
/// Never fails; the profile is not touched, callers persist if they want to.
pub async fn detect(
    req: HttpRequest,
    body: Option<Json<DetectBody>>,
    http: Data<reqwest::Client>,
    config: Data<Config>,
) -> Result<Json<DetectedLocation>, Error> {
    let hint = body.and_then(|b| match (b.latitude, b.longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinate { latitude, longitude }),
        _ => None,
    });
    let ip = req.peer_addr().map(|a| a.ip());
    let client = http.get_ref().clone();
    let resolver = LocationResolver::new(Duration::from_secs(config.geo_step_timeout_secs))
        .with(Box::new(DeviceLookup::new(hint, BigDataCloud::new(client.clone()))))
        .with(Box::new(IpApiCo::new(client.clone(), ip)))
        .with(Box::new(IpApiCom::new(client, ip)));
    Ok(Json(resolver.detect().await))
}

#[derive(Debug, Deserialize)]
pub struct GeocodeBody {
    pub address: String,
}

/// Address geocoding with the remote cache in front: a cached row short-
/// circuits; a fresh result is cached best-effort (a failed insert is only a
/// warning). Addresses the geocoder cannot place resolve to null.
pub async fn geocode(
    Json(GeocodeBody { address }): Json<GeocodeBody>,
    db: Data<PgPool>,
    http: Data<reqwest::Client>,
    config: Data<Config>,
) -> Result<Json<Option<LocationCache>>, Error> {
    let mut conn = db.acquire().await?;
    if let Some(cached) = query_as::<_, LocationCache>("SELECT * FROM location_cache WHERE address = $1")
        .bind(&address)
        .fetch_optional(&mut conn)
        .await?
    {
        return Ok(Json(Some(cached)));
    }

    let token = config
        .mapbox_token
        .clone()
        .ok_or_else(|| Error::ServerError("mapbox access token not configured".into()))?;
    let geocoder = Mapbox::new(http.get_ref().clone(), token);
    let resolved = match geocoder.geocode(&address).await? {
        Some(resolved) => resolved,
        None => return Ok(Json(None)),
    };

    let inserted = query_as::<_, LocationCache>(
        "INSERT INTO location_cache (address, city, state, pincode, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *",
    )
    .bind(&address)
    .bind(&resolved.city)
    .bind(&resolved.state)
    .bind(&resolved.pincode)
    .bind(resolved.latitude)
    .bind(resolved.longitude)
    .fetch_one(&mut conn)
    .await;
    match inserted {
        Ok(row) => Ok(Json(Some(row))),
        Err(e) => {
            // a failed cache write must not cost the caller the result
            warn!("failed to cache geocoded location: {}", e);
            Ok(Json(Some(LocationCache {
                id: Uuid::nil(),
                address,
                city: resolved.city,
                state: resolved.state,
                pincode: resolved.pincode,
                latitude: resolved.latitude,
                longitude: resolved.longitude,
                created_at: Utc::now(),
            })))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DistanceParams {
    pub lat1: f64,
    pub lng1: f64,
    pub lat2: f64,
    pub lng2: f64,
}

/// Pass-through to the backend's distance procedure.
pub async fn distance(Query(params): Query<DistanceParams>, db: Data<PgPool>) -> Result<Json<f64>, Error> {
    let km: f64 = query_scalar("SELECT calculate_distance($1, $2, $3, $4)")
        .bind(params.lat1)
        .bind(params.lng1)
        .bind(params.lat2)
        .bind(params.lng2)
        .fetch_one(&mut db.acquire().await?)
        .await?;
    Ok(Json(km))
}
