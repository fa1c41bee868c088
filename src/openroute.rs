//! openrouteservice HTTP adapter for geocoding and directions.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::RouteError;
use crate::traits::{DirectionsResponse, GeocodedPlace, Profile, RoutingService};

#[derive(Debug, Clone)]
pub struct OpenRouteConfig {
    pub base_url: String,
    /// Sent raw in the `Authorization` header and as the geocoder `api_key`.
    pub api_key: String,
    /// ISO country code restricting geocoding results.
    pub country: String,
    pub timeout_secs: u64,
}

impl Default for OpenRouteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            country: "KR".to_string(),
            timeout_secs: 10,
        }
    }
}

impl OpenRouteConfig {
    /// Defaults overridden by `ORS_BASE_URL`, `ORS_API_KEY`, `ORS_COUNTRY`
    /// and `ORS_TIMEOUT_SECS` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup("ORS_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = lookup("ORS_API_KEY") {
            config.api_key = api_key;
        }
        if let Some(country) = lookup("ORS_COUNTRY") {
            config.country = country;
        }
        if let Some(timeout) = lookup("ORS_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %timeout, "ignoring invalid ORS_TIMEOUT_SECS"),
            }
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouteClient {
    config: OpenRouteConfig,
    client: reqwest::blocking::Client,
}

impl OpenRouteClient {
    /// Build a client whose requests time out after `config.timeout_secs`.
    pub fn new(config: OpenRouteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OpenRouteConfig {
        &self.config
    }

    /// Read the body of a response, mapping non-success statuses to errors.
    fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, RouteError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "routing service request failed");
            return Err(RouteError::from_status(status.as_u16(), message));
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|err| RouteError::RoutingService {
            status: Some(status.as_u16()),
            message: format!("malformed response body: {}", err),
        })
    }
}

impl RoutingService for OpenRouteClient {
    fn geocode(&self, address: &str) -> Result<Option<GeocodedPlace>, RouteError> {
        let url = format!("{}/geocode/search", self.config.base_url);
        tracing::debug!(address, "geocoding address");

        let response = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("text", address),
                ("boundary.country", self.config.country.as_str()),
                ("size", "1"),
            ])
            .send()?;

        let body: GeocodeResponse = Self::read_json(response)?;
        Ok(body.into_place(address))
    }

    fn directions(
        &self,
        waypoints: &[Coordinate],
        profile: Profile,
    ) -> Result<DirectionsResponse, RouteError> {
        let url = format!("{}/v2/directions/{}", self.config.base_url, profile);
        tracing::debug!(waypoints = waypoints.len(), %profile, "requesting directions");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.config.api_key.as_str())
            .json(&DirectionsRequest::new(waypoints))
            .send()?;

        Self::read_json(response)
    }
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
    format: &'static str,
    instructions: bool,
    geometry_simplify: bool,
    elevation: bool,
}

impl DirectionsRequest {
    fn new(waypoints: &[Coordinate]) -> Self {
        Self {
            coordinates: waypoints.iter().map(Coordinate::to_lng_lat).collect(),
            format: "geojson",
            instructions: false,
            geometry_simplify: false,
            elevation: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: PointGeometry,
    #[serde(default)]
    properties: GeocodeProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct GeocodeProperties {
    label: Option<String>,
}

impl GeocodeResponse {
    /// First feature with a usable `[lng, lat]` position.
    fn into_place(self, address: &str) -> Option<GeocodedPlace> {
        let feature = self.features.into_iter().next()?;
        let [lng, lat, ..] = feature.geometry.coordinates[..] else {
            return None;
        };
        Some(GeocodedPlace {
            coordinate: Coordinate::new(lat, lng),
            label: feature
                .properties
                .label
                .unwrap_or_else(|| address.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ORS_BASE_URL", "http://localhost:8080/ors/"),
            ("ORS_API_KEY", "secret"),
            ("ORS_TIMEOUT_SECS", "30"),
        ]);
        let config = OpenRouteConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.base_url, "http://localhost:8080/ors");
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.country, "KR");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_ignores_bad_timeout() {
        let config = OpenRouteConfig::from_lookup(|key| {
            (key == "ORS_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.timeout_secs, OpenRouteConfig::default().timeout_secs);
    }

    #[test]
    fn test_directions_request_body() {
        let body = DirectionsRequest::new(&[Coordinate::new(35.1, 129.0), Coordinate::new(35.2, 129.1)]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coordinates": [[129.0, 35.1], [129.1, 35.2]],
                "format": "geojson",
                "instructions": false,
                "geometry_simplify": false,
                "elevation": true
            })
        );
    }

    #[test]
    fn test_geocode_response_to_place() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"features":[{"geometry":{"coordinates":[129.1604,35.1587]},"properties":{"label":"Haeundae Beach, Busan"}}]}"#,
        )
        .unwrap();
        let place = body.into_place("haeundae").unwrap();
        assert_eq!(place.coordinate, Coordinate::new(35.1587, 129.1604));
        assert_eq!(place.label, "Haeundae Beach, Busan");
    }

    #[test]
    fn test_geocode_response_without_match() {
        let body: GeocodeResponse = serde_json::from_str(r#"{"features":[]}"#).unwrap();
        assert!(body.into_place("nowhere").is_none());

        let short: GeocodeResponse =
            serde_json::from_str(r#"{"features":[{"geometry":{"coordinates":[129.1]}}]}"#).unwrap();
        assert!(short.into_place("broken").is_none());
    }

    #[test]
    fn test_label_falls_back_to_address() {
        let body: GeocodeResponse =
            serde_json::from_str(r#"{"features":[{"geometry":{"coordinates":[129.1,35.1]}}]}"#).unwrap();
        assert_eq!(body.into_place("Suyeong-gu").unwrap().label, "Suyeong-gu");
    }
}
