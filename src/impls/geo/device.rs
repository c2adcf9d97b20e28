use async_trait::async_trait;

use crate::core::location::LocateStrategy;
use crate::error::Error;
use crate::impls::geo::bigdatacloud::BigDataCloud;
use crate::models::location::{Coordinate, LocationSource, ResolvedLocation};

/// First step of the chain: a coordinate supplied by the client device (the
/// browser's geolocation fix), reverse-geocoded into city/state/country.
/// A request without a coordinate behaves like a denied permission.
pub struct DeviceLookup {
    hint: Option<Coordinate>,
    geocoder: BigDataCloud,
}

impl DeviceLookup {
    pub fn new(hint: Option<Coordinate>, geocoder: BigDataCloud) -> Self {
        Self { hint, geocoder }
    }
}

#[async_trait]
impl LocateStrategy for DeviceLookup {
    fn name(&self) -> &'static str {
        "device geolocation"
    }

    fn source(&self) -> LocationSource {
        LocationSource::Device
    }

    async fn locate(&self) -> Result<ResolvedLocation, Error> {
        let coordinate = self
            .hint
            .ok_or_else(|| Error::LocationUnavailable("no device coordinate supplied".into()))?;
        let reverse = self.geocoder.reverse(coordinate.latitude, coordinate.longitude).await?;
        Ok(ResolvedLocation {
            city: reverse.city,
            state: reverse.state,
            country: reverse.country,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}
