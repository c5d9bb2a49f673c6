use super::non_empty;
use crate::error::{KrishiError, Result};
use crate::logic::geo_resolver::ReverseGeocoder;
use crate::models::{AccuracyTier, Coordinates, GeocodedPlace};
use async_trait::async_trait;
use serde::Deserialize;

/// BigDataCloud's keyless client-side reverse geocoder. Primary tier.
pub struct BigDataCloudClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BdcResponse {
    city: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
    country_name: Option<String>,
    locality_info: Option<BdcLocalityInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BdcLocalityInfo {
    administrative: Vec<BdcAdministrative>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BdcAdministrative {
    name: Option<String>,
    description: Option<String>,
}

impl BigDataCloudClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, coords: Coordinates) -> Result<String> {
        let url = format!(
            "{}?latitude={}&longitude={}&localityLanguage=en",
            self.base_url, coords.latitude, coords.longitude
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| KrishiError::DataSourceUnavailable(format!("BigDataCloud: {}", e)))?;

        if !response.status().is_success() {
            return Err(KrishiError::DataSourceUnavailable(format!(
                "BigDataCloud returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| KrishiError::DataSourceUnavailable(format!("BigDataCloud: {}", e)))
    }
}

#[async_trait]
impl ReverseGeocoder for BigDataCloudClient {
    fn name(&self) -> &'static str {
        "BigDataCloud"
    }

    fn accuracy(&self) -> AccuracyTier {
        AccuracyTier::High
    }

    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace> {
        let body = self.fetch(coords).await?;
        parse_payload(&body)
    }
}

/// Normalizes a reverse-geocode body. Fails when the body is not JSON or
/// names no place at all.
fn parse_payload(body: &str) -> Result<GeocodedPlace> {
    let response: BdcResponse = serde_json::from_str(body).map_err(|e| {
        KrishiError::InvalidData(format!("Failed to parse BigDataCloud response: {}", e))
    })?;

    let city = non_empty(response.city).or_else(|| non_empty(response.locality));
    let state = non_empty(response.principal_subdivision);
    let country = non_empty(response.country_name);

    if city.is_none() && state.is_none() && country.is_none() {
        return Err(KrishiError::InvalidData(
            "BigDataCloud response names no place".into(),
        ));
    }

    let district = response.locality_info.and_then(|info| {
        info.administrative
            .into_iter()
            .find(|item| {
                item.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains("district"))
            })
            .and_then(|item| non_empty(item.name))
    });

    Ok(GeocodedPlace {
        city: city.unwrap_or_else(|| "Unknown City".into()),
        state: state.unwrap_or_else(|| "Unknown State".into()),
        country: country.unwrap_or_else(|| "Unknown Country".into()),
        district,
    })
}
