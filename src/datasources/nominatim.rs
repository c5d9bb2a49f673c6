use super::non_empty;
use crate::error::{KrishiError, Result};
use crate::logic::geo_resolver::{ForwardGeocoder, ReverseGeocoder};
use crate::models::{AccuracyTier, Coordinates, GeocodedPlace};
use async_trait::async_trait;
use serde::Deserialize;

/// OpenStreetMap Nominatim. Secondary reverse tier and the address search.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NominatimReverse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
    state_district: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimSearchHit {
    lat: String,
    lon: String,
}

impl NominatimClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }

    async fn get_text(&self, url: reqwest::Url) -> Result<String> {
        // Nominatim's usage policy rejects requests without an identifying agent
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| KrishiError::DataSourceUnavailable(format!("Nominatim: {}", e)))?;

        if !response.status().is_success() {
            return Err(KrishiError::DataSourceUnavailable(format!(
                "Nominatim returned {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| KrishiError::DataSourceUnavailable(format!("Nominatim: {}", e)))
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    fn name(&self) -> &'static str {
        "Nominatim"
    }

    fn accuracy(&self) -> AccuracyTier {
        AccuracyTier::Medium
    }

    async fn reverse(&self, coords: Coordinates) -> Result<GeocodedPlace> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/reverse", self.base_url),
            &[
                ("format", "json".to_string()),
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ],
        )
        .map_err(|e| KrishiError::InvalidData(format!("Nominatim URL: {}", e)))?;

        let body = self.get_text(url).await?;
        parse_reverse(&body)
    }
}

#[async_trait]
impl ForwardGeocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Option<Coordinates>> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[
                ("format", "json"),
                ("q", query),
                ("limit", "1"),
                ("countrycodes", "in"),
            ],
        )
        .map_err(|e| KrishiError::InvalidData(format!("Nominatim URL: {}", e)))?;

        let body = self.get_text(url).await?;
        parse_search(&body)
    }
}

fn parse_reverse(body: &str) -> Result<GeocodedPlace> {
    let response: NominatimReverse = serde_json::from_str(body).map_err(|e| {
        KrishiError::InvalidData(format!("Failed to parse Nominatim response: {}", e))
    })?;

    let address = response
        .address
        .ok_or_else(|| KrishiError::InvalidData("Nominatim response has no address".into()))?;

    let city = non_empty(address.city)
        .or_else(|| non_empty(address.town))
        .or_else(|| non_empty(address.village));
    let state = non_empty(address.state);
    let country = non_empty(address.country);

    if city.is_none() && state.is_none() && country.is_none() {
        return Err(KrishiError::InvalidData(
            "Nominatim address names no place".into(),
        ));
    }

    Ok(GeocodedPlace {
        city: city.unwrap_or_else(|| "Unknown City".into()),
        state: state.unwrap_or_else(|| "Unknown State".into()),
        country: country.unwrap_or_else(|| "Unknown Country".into()),
        district: non_empty(address.state_district),
    })
}

fn parse_search(body: &str) -> Result<Option<Coordinates>> {
    let hits: Vec<NominatimSearchHit> = serde_json::from_str(body).map_err(|e| {
        KrishiError::InvalidData(format!("Failed to parse Nominatim search: {}", e))
    })?;

    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };

    let latitude: f64 = hit
        .lat
        .parse()
        .map_err(|_| KrishiError::InvalidData(format!("Bad latitude '{}'", hit.lat)))?;
    let longitude: f64 = hit
        .lon
        .parse()
        .map_err(|_| KrishiError::InvalidData(format!("Bad longitude '{}'", hit.lon)))?;

    Ok(Some(Coordinates::new(latitude, longitude)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_prefers_city_then_town_then_village() {
        let body = serde_json::json!({
            "display_name": "Baramati, Pune, Maharashtra, India",
            "address": {
                "town": "Baramati",
                "village": "Malegaon",
                "state_district": "Pune",
                "state": "Maharashtra",
                "country": "India"
            }
        })
        .to_string();

        let place = parse_reverse(&body).unwrap();
        assert_eq!(place.city, "Baramati");
        assert_eq!(place.state, "Maharashtra");
        assert_eq!(place.district.as_deref(), Some("Pune"));
    }

    #[test]
    fn reverse_error_payload_is_rejected() {
        assert!(parse_reverse(r#"{"error": "Unable to geocode"}"#).is_err());
        assert!(parse_reverse("not json").is_err());
    }

    #[test]
    fn search_reads_first_hit() {
        let body = r#"[{"lat": "18.5204", "lon": "73.8567", "display_name": "Pune"}]"#;
        assert_eq!(
            parse_search(body).unwrap(),
            Some(Coordinates::new(18.5204, 73.8567))
        );
    }

    #[test]
    fn search_without_hits() {
        assert_eq!(parse_search("[]").unwrap(), None);
    }

    #[test]
    fn search_with_garbage_coordinates() {
        assert!(parse_search(r#"[{"lat": "north", "lon": "73.8"}]"#).is_err());
    }
}
