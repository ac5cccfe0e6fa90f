/*
 *  geocode.rs
 *
 *  weatherboard - e-paper weather dashboard
 *
 *  Reverse-geocoding lookup: coordinate -> city name.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::warn;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    types: Vec<String>,
}

/// Reverse-geocoding client. Without an API key every lookup is an
/// empty success, so the dashboard simply renders without a city line.
#[derive(Debug, Clone)]
pub struct LocationService {
    api_key: Option<String>,
    client: Client,
}

impl LocationService {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(LocationService { api_key, client })
    }

    /// Returns the first locality-level component across all results, or
    /// an empty string when the provider knows no locality there.
    pub async fn get_city(&self, lat: f64, lon: f64) -> Result<String> {
        let key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("No maps API key configured, skipping city lookup");
                return Ok(String::new());
            }
        };
        let url = format!("{GEOCODE_URL}?latlng={lat},{lon}&key={key}");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let parsed: GeocodeResponse = serde_json::from_str(&body)?;
        match parsed.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(first_locality(&parsed)),
            status => Err(Error::Fetch(format!("geocoding provider status {status}"))),
        }
    }
}

fn first_locality(response: &GeocodeResponse) -> String {
    for result in &response.results {
        for component in &result.address_components {
            if component.types.iter().any(|t| t == "locality") {
                return component.long_name.clone();
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GeocodeResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn picks_first_locality_across_results() {
        let response = parse(
            r#"{
                "status": "OK",
                "results": [
                    {"address_components": [
                        {"long_name": "Hovedstaden", "types": ["administrative_area_level_1"]}
                    ]},
                    {"address_components": [
                        {"long_name": "Denmark", "types": ["country", "political"]},
                        {"long_name": "Copenhagen", "types": ["locality", "political"]}
                    ]},
                    {"address_components": [
                        {"long_name": "Aarhus", "types": ["locality"]}
                    ]}
                ]
            }"#,
        );
        assert_eq!(first_locality(&response), "Copenhagen");
    }

    #[test]
    fn no_locality_is_empty_success() {
        let response = parse(
            r#"{
                "status": "OK",
                "results": [
                    {"address_components": [
                        {"long_name": "North Sea", "types": ["natural_feature"]}
                    ]}
                ]
            }"#,
        );
        assert_eq!(first_locality(&response), "");
    }

    #[test]
    fn zero_results_parses_without_results_field() {
        let response = parse(r#"{"status": "ZERO_RESULTS"}"#);
        assert!(response.results.is_empty());
        assert_eq!(first_locality(&response), "");
    }

    #[tokio::test]
    async fn missing_key_is_empty_success() {
        let service = LocationService::new(None).unwrap();
        assert_eq!(service.get_city(55.676, 12.568).await.unwrap(), "");
    }
}
