use std::net::IpAddr;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::location::LocateStrategy;
use crate::error::Error;
use crate::models::location::{LocationSource, ResolvedLocation};

/// Secondary IP geolocation: ip-api.com. Same concern as the primary
/// provider but a different response schema (`regionName`/`lat`/`lon`, and a
/// `status: "fail"` marker), so the field remapping is explicit here.
pub struct IpApiCom {
    client: reqwest::Client,
    ip: Option<IpAddr>,
}

impl IpApiCom {
    pub fn new(client: reqwest::Client, ip: Option<IpAddr>) -> Self {
        Self { client, ip }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiComResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(rename = "regionName", default)]
    region_name: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl From<IpApiComResponse> for ResolvedLocation {
    fn from(r: IpApiComResponse) -> Self {
        ResolvedLocation {
            city: r.city.unwrap_or_default(),
            state: r.region_name.unwrap_or_default(),
            country: r.country.unwrap_or_default(),
            latitude: r.lat.unwrap_or(0.0),
            longitude: r.lon.unwrap_or(0.0),
        }
    }
}

#[async_trait]
impl LocateStrategy for IpApiCom {
    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    fn source(&self) -> LocationSource {
        LocationSource::IpFallback
    }

    async fn locate(&self) -> Result<ResolvedLocation, Error> {
        let url = match self.ip {
            Some(ip) => format!("http://ip-api.com/json/{}", ip),
            None => "http://ip-api.com/json/".to_string(),
        };
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;
        let data: IpApiComResponse = response.json().await?;
        if data.status == "fail" {
            return Err(Error::LocationUnavailable(
                data.message.unwrap_or_else(|| "location detection failed".into()),
            ));
        }
        Ok(data.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_remapping() {
        let raw = r#"{
            "status": "success",
            "country": "India",
            "regionName": "Maharashtra",
            "city": "Mumbai",
            "lat": 19.0748,
            "lon": 72.8856,
            "query": "103.27.9.44"
        }"#;
        let data: IpApiComResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.status, "success");
        let location = ResolvedLocation::from(data);
        assert_eq!(location.state, "Maharashtra");
        assert_eq!(location.country, "India");
        assert!((location.longitude - 72.8856).abs() < 1e-9);
    }

    #[test]
    fn test_fail_status_is_flagged() {
        let raw = r#"{"status": "fail", "message": "private range", "query": "10.0.0.1"}"#;
        let data: IpApiComResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.status, "fail");
        assert_eq!(data.message.as_deref(), Some("private range"));
    }
}
