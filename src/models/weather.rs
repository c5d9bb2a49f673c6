use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    /// Observed by a weather provider
    Provider,
    /// Derived from latitude and calendar month
    Estimated,
}

impl WeatherSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherSource::Provider => "OpenWeatherMap",
            WeatherSource::Estimated => "Estimated",
        }
    }
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current conditions plus the 5-day rainfall outlook, in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature_current: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity: f64,
    pub rainfall_next_5_days_mm: f64,
    pub conditions: String,
    /// m/s
    pub wind_speed: f64,
    pub soil_temperature_estimate: Option<f64>,
    pub source: WeatherSource,
}

impl WeatherSnapshot {
    pub fn is_estimated(&self) -> bool {
        self.source == WeatherSource::Estimated
    }

    pub fn temperature_label(&self) -> String {
        format!("{:.0}°C", self.temperature_current)
    }

    pub fn is_raining(&self) -> bool {
        let conditions = self.conditions.to_lowercase();
        conditions.contains("rain") || conditions.contains("drizzle") || conditions.contains("thunder")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(conditions: &str, source: WeatherSource) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_current: 27.6,
            temperature_min: 24.0,
            temperature_max: 31.0,
            humidity: 65.0,
            rainfall_next_5_days_mm: 0.0,
            conditions: conditions.to_string(),
            wind_speed: 3.1,
            soil_temperature_estimate: Some(26.0),
            source,
        }
    }

    #[test]
    fn estimated_snapshots_are_flagged() {
        assert!(snapshot("Clear conditions (estimated)", WeatherSource::Estimated).is_estimated());
        assert!(!snapshot("clear sky", WeatherSource::Provider).is_estimated());
    }

    #[test]
    fn temperature_label_rounds_to_whole_degrees() {
        assert_eq!(snapshot("clear sky", WeatherSource::Provider).temperature_label(), "28°C");
    }

    #[test]
    fn rain_detection_from_conditions_text() {
        assert!(snapshot("light rain", WeatherSource::Provider).is_raining());
        assert!(snapshot("Thunderstorm", WeatherSource::Provider).is_raining());
        assert!(!snapshot("overcast clouds", WeatherSource::Provider).is_raining());
    }
}
