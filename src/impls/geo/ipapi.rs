use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::location::LocateStrategy;
use crate::error::Error;
use crate::models::location::{LocationSource, ResolvedLocation};

/// Primary IP geolocation: ipapi.co. The endpoint answers HTTP 200 with an
/// `error` field on logical failures (quota, reserved ranges), so that flag
/// is checked on top of the status code.
pub struct IpApiCo {
    client: reqwest::Client,
    ip: Option<IpAddr>,
}

impl IpApiCo {
    pub fn new(client: reqwest::Client, ip: Option<IpAddr>) -> Self {
        Self { client, ip }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiCoResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl From<IpApiCoResponse> for ResolvedLocation {
    fn from(r: IpApiCoResponse) -> Self {
        ResolvedLocation {
            city: r.city.unwrap_or_default(),
            state: r.region.unwrap_or_default(),
            country: r.country_name.unwrap_or_default(),
            latitude: r.latitude.unwrap_or(0.0),
            longitude: r.longitude.unwrap_or(0.0),
        }
    }
}

#[async_trait]
impl LocateStrategy for IpApiCo {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    fn source(&self) -> LocationSource {
        LocationSource::IpPrimary
    }

    async fn locate(&self) -> Result<ResolvedLocation, Error> {
        let url = match self.ip {
            Some(ip) => format!("https://ipapi.co/{}/json/", ip),
            None => "https://ipapi.co/json/".to_string(),
        };
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        let data: IpApiCoResponse = response.json().await?;
        if data.error {
            return Err(Error::LocationUnavailable(
                data.reason.unwrap_or_else(|| "location detection failed".into()),
            ));
        }
        Ok(data.into())
    }
}
