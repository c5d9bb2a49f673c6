use super::{Coordinates, CropRecommendation, ResolvedLocation, Season, WeatherSnapshot};
use serde::{Deserialize, Serialize};

/// Inbound request body. Only `location` and `season` carry meaning on their
/// own; everything else is optional and may arrive as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmRequest {
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub season: String,
    pub soil_type: String,
    #[serde(alias = "climateType")]
    pub climate: String,
    pub temperature: String,
    #[serde(alias = "additionalNotes")]
    pub additional_info: String,
}

/// Everything the advisory engine needs, after resolution and defaulting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmContext {
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub season: Season,
    pub soil_type: String,
    pub climate_type: String,
    pub temperature_text: String,
    pub additional_notes: String,
    pub weather: Option<WeatherSnapshot>,
    pub resolved_location: Option<ResolvedLocation>,
}

impl FarmContext {
    pub fn new(location: impl Into<String>, season: Season) -> Self {
        Self {
            location: location.into(),
            coordinates: None,
            season,
            soil_type: String::new(),
            climate_type: String::new(),
            temperature_text: String::new(),
            additional_notes: String::new(),
            weather: None,
            resolved_location: None,
        }
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_soil_type(mut self, soil_type: impl Into<String>) -> Self {
        self.soil_type = soil_type.into();
        self
    }

    pub fn with_climate_type(mut self, climate_type: impl Into<String>) -> Self {
        self.climate_type = climate_type.into();
        self
    }

    pub fn with_temperature(mut self, temperature_text: impl Into<String>) -> Self {
        self.temperature_text = temperature_text.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.additional_notes = notes.into();
        self
    }

    pub fn with_weather(mut self, weather: WeatherSnapshot) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_resolved_location(mut self, location: ResolvedLocation) -> Self {
        self.resolved_location = Some(location);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryMode {
    /// Recommendations came from the AI advisor
    Delegated,
    /// Recommendations came from the static rule table
    Deterministic,
}

impl AdvisoryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryMode::Delegated => "delegated",
            AdvisoryMode::Deterministic => "deterministic",
        }
    }
}

impl std::fmt::Display for AdvisoryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub recommendations: Vec<CropRecommendation>,
    pub mode: AdvisoryMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Outbound response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdvisoryResponse {
    Success(Advisory),
    Failure { error: String, fallback: bool },
}

impl AdvisoryResponse {
    pub fn failure(error: impl std::fmt::Display) -> Self {
        AdvisoryResponse::Failure {
            error: error.to_string(),
            fallback: true,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AdvisoryResponse::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_partial_body() {
        let request: FarmRequest = serde_json::from_str(
            r#"{
                "location": "Pune, Maharashtra",
                "season": "Kharif",
                "soilType": "",
                "climate": "",
                "temperature": "",
                "coordinates": {"lat": 18.5, "lon": 73.8}
            }"#,
        )
        .unwrap();

        assert_eq!(request.location, "Pune, Maharashtra");
        assert_eq!(request.season, "Kharif");
        assert_eq!(request.coordinates, Some(Coordinates::new(18.5, 73.8)));
        assert!(request.additional_info.is_empty());
    }

    #[test]
    fn request_accepts_alternate_field_names() {
        let request: FarmRequest = serde_json::from_str(
            r#"{"location": "Jaipur", "climateType": "arid", "additionalNotes": "drip irrigation"}"#,
        )
        .unwrap();

        assert_eq!(request.climate, "arid");
        assert_eq!(request.additional_info, "drip irrigation");
        assert!(request.season.is_empty());
        assert!(request.coordinates.is_none());
    }

    #[test]
    fn failure_response_shape() {
        let json = serde_json::to_value(AdvisoryResponse::failure("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "boom", "fallback": true}));
    }

    #[test]
    fn success_response_omits_missing_narrative() {
        let response = AdvisoryResponse::Success(Advisory {
            recommendations: vec![],
            mode: AdvisoryMode::Deterministic,
            narrative: None,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["mode"], "deterministic");
        assert!(json.get("narrative").is_none());
        assert!(json["recommendations"].is_array());
    }
}
