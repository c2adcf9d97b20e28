use serde::Deserialize;

use crate::error::Error;

const REVERSE_GEOCODE_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

/// Keyless reverse geocoding for device coordinates.
#[derive(Clone)]
pub struct BigDataCloud {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    locality: Option<String>,
    #[serde(rename = "principalSubdivision", default)]
    principal_subdivision: Option<String>,
    #[serde(rename = "administrativeArea", default)]
    administrative_area: Option<String>,
    #[serde(rename = "countryName", default)]
    country_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseGeocode {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl From<ReverseGeocodeResponse> for ReverseGeocode {
    fn from(r: ReverseGeocodeResponse) -> Self {
        ReverseGeocode {
            city: r.city.filter(|c| !c.is_empty()).or(r.locality).unwrap_or_default(),
            state: r
                .principal_subdivision
                .filter(|s| !s.is_empty())
                .or(r.administrative_area)
                .unwrap_or_default(),
            country: r.country_name.unwrap_or_default(),
        }
    }
}

impl BigDataCloud {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<ReverseGeocode, Error> {
        let response = self
            .client
            .get(REVERSE_GEOCODE_URL)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        let data: ReverseGeocodeResponse = response.json().await?;
        Ok(data.into())
    }
}
