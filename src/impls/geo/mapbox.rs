use reqwest::Url;
use serde::Deserialize;

use crate::error::Error;

const MAPBOX_PLACES_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Forward geocoding through Mapbox, scoped to India like the original
/// address search.
pub struct Mapbox {
    client: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    center: [f64; 2],
    #[serde(default)]
    context: Vec<ContextEntry>,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    id: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

fn context_text(context: &[ContextEntry], prefix: &str) -> Option<String> {
    context.iter().find(|c| c.id.starts_with(prefix)).map(|c| c.text.clone())
}

impl Feature {
    fn into_address(self) -> GeocodedAddress {
        // Mapbox centers are [longitude, latitude]
        let [longitude, latitude] = self.center;
        GeocodedAddress {
            city: context_text(&self.context, "place"),
            state: context_text(&self.context, "region"),
            pincode: context_text(&self.context, "postcode"),
            latitude,
            longitude,
        }
    }
}

impl Mapbox {
    pub fn new(client: reqwest::Client, token: String) -> Self {
        Self { client, token }
    }

    /// Resolves an address to a coordinate plus city/state/pincode context.
    /// An address Mapbox cannot place yields Ok(None).
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, Error> {
        let mut url = Url::parse(MAPBOX_PLACES_URL).map_err(|e| Error::ServerError(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Error::ServerError("invalid geocoding base url".into()))?
            .push(&format!("{}.json", address));
        url.query_pairs_mut()
            .append_pair("access_token", &self.token)
            .append_pair("country", "IN");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let data: MapboxResponse = response.json().await?;
        Ok(data.features.into_iter().next().map(Feature::into_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_feature_with_context_extraction() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "id": "address.1",
                "center": [72.8295, 19.0596],
                "context": [
                    {"id": "postcode.1", "text": "400050"},
                    {"id": "place.2", "text": "Mumbai"},
                    {"id": "region.3", "text": "Maharashtra"},
                    {"id": "country.4", "text": "India"}
                ]
            }]
        }"#;
        let data: MapboxResponse = serde_json::from_str(raw).unwrap();
        let address = data.features.into_iter().next().unwrap().into_address();
        assert_eq!(address.city.as_deref(), Some("Mumbai"));
        assert_eq!(address.state.as_deref(), Some("Maharashtra"));
        assert_eq!(address.pincode.as_deref(), Some("400050"));
        // center comes in as [lng, lat]
        assert!((address.latitude - 19.0596).abs() < 1e-9);
        assert!((address.longitude - 72.8295).abs() < 1e-9);
    }

    #[test]
    fn test_no_features_means_unplaceable() {
        let data: MapboxResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();
        assert!(data.features.is_empty());
    }
}
