use crate::error::{KrishiError, Result};
use serde::{Deserialize, Serialize};

/// A GPS fix as captured by the caller. Never mutated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(KrishiError::InvalidData(format!(
                "latitude {} outside -90..90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(KrishiError::InvalidData(format!(
                "longitude {} outside -180..180",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Which geocoding tier produced a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    High,
    Medium,
    Low,
}

impl AccuracyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccuracyTier::High => "high",
            AccuracyTier::Medium => "medium",
            AccuracyTier::Low => "low",
        }
    }
}

impl std::fmt::Display for AccuracyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Place fields as normalized from a single provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub city: String,
    pub state: String,
    pub country: String,
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    pub country: String,
    pub district: Option<String>,
    pub accuracy: AccuracyTier,
}

impl ResolvedLocation {
    pub fn from_place(coords: Coordinates, place: GeocodedPlace, accuracy: AccuracyTier) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            city: place.city,
            state: place.state,
            country: place.country,
            district: place.district,
            accuracy,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// "City, State, Country", the form a farmer would type.
    pub fn label(&self) -> String {
        format!("{}, {}, {}", self.city, self.state, self.country)
    }
}
