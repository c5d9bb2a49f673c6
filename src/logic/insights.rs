//! Field conditions derived from a weather snapshot.

use crate::models::{Level, WeatherSnapshot};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonSuitability {
    Excellent,
    Good,
    Moderate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationAdvice {
    Reduce,
    Minimal,
    Normal,
    Increase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantingConditions {
    Ideal,
    Good,
    Moderate,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInsights {
    pub season_suitability: SeasonSuitability,
    pub irrigation_need: IrrigationAdvice,
    pub pest_risk: Level,
    pub planting_conditions: PlantingConditions,
}

impl FieldInsights {
    pub fn from_weather(weather: &WeatherSnapshot, latitude: f64) -> Self {
        Self {
            season_suitability: season_suitability(weather, latitude),
            irrigation_need: irrigation_need(weather),
            pest_risk: pest_risk(weather),
            planting_conditions: planting_conditions(weather),
        }
    }
}

/// (excellent temp range, minimum humidity for excellent, good temp range)
fn comfort_band(latitude: f64) -> ((f64, f64), f64, (f64, f64)) {
    if latitude > 28.0 {
        ((15.0, 30.0), 40.0, (10.0, 35.0))
    } else if latitude > 20.0 {
        ((20.0, 35.0), 50.0, (15.0, 40.0))
    } else {
        ((22.0, 32.0), 60.0, (18.0, 38.0))
    }
}

pub fn season_suitability(weather: &WeatherSnapshot, latitude: f64) -> SeasonSuitability {
    let temp = weather.temperature_current;
    let ((ex_lo, ex_hi), min_humidity, (good_lo, good_hi)) = comfort_band(latitude);

    if temp >= ex_lo && temp <= ex_hi && weather.humidity >= min_humidity {
        SeasonSuitability::Excellent
    } else if temp >= good_lo && temp <= good_hi {
        SeasonSuitability::Good
    } else {
        SeasonSuitability::Moderate
    }
}

pub fn irrigation_need(weather: &WeatherSnapshot) -> IrrigationAdvice {
    let rain = weather.rainfall_next_5_days_mm;

    if rain > 20.0 {
        IrrigationAdvice::Reduce
    } else if rain > 5.0 && weather.humidity > 70.0 {
        IrrigationAdvice::Minimal
    } else if weather.humidity < 40.0 {
        IrrigationAdvice::Increase
    } else {
        IrrigationAdvice::Normal
    }
}

/// Warm and humid favours pests.
pub fn pest_risk(weather: &WeatherSnapshot) -> Level {
    let temp = weather.temperature_current;
    let humidity = weather.humidity;

    if temp > 30.0 && humidity > 80.0 {
        Level::High
    } else if temp > 25.0 && humidity > 60.0 {
        Level::Medium
    } else {
        Level::Low
    }
}

pub fn planting_conditions(weather: &WeatherSnapshot) -> PlantingConditions {
    let temp = weather.temperature_current;

    if weather.is_raining() && temp > 15.0 {
        PlantingConditions::Ideal
    } else if (18.0..=30.0).contains(&temp) {
        PlantingConditions::Good
    } else if !(10.0..=40.0).contains(&temp) {
        PlantingConditions::Poor
    } else {
        PlantingConditions::Moderate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherSource;

    fn weather(temp: f64, humidity: f64, rain: f64, conditions: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_current: temp,
            temperature_min: temp - 4.0,
            temperature_max: temp + 4.0,
            humidity,
            rainfall_next_5_days_mm: rain,
            conditions: conditions.into(),
            wind_speed: 3.0,
            soil_temperature_estimate: Some(temp - 2.0),
            source: WeatherSource::Provider,
        }
    }

    #[test]
    fn suitability_depends_on_latitude_band() {
        let mild = weather(25.0, 55.0, 0.0, "clear sky");
        assert_eq!(season_suitability(&mild, 30.0), SeasonSuitability::Excellent);
        assert_eq!(season_suitability(&mild, 24.0), SeasonSuitability::Excellent);
        // Southern needs 60% humidity for excellent
        assert_eq!(season_suitability(&mild, 12.0), SeasonSuitability::Good);
    }

    #[test]
    fn suitability_moderate_outside_good_range() {
        let hot = weather(39.0, 30.0, 0.0, "clear sky");
        assert_eq!(season_suitability(&hot, 30.0), SeasonSuitability::Moderate);
        assert_eq!(season_suitability(&hot, 24.0), SeasonSuitability::Good);
        assert_eq!(season_suitability(&hot, 12.0), SeasonSuitability::Moderate);
    }

    #[test]
    fn irrigation_thresholds() {
        assert_eq!(irrigation_need(&weather(28.0, 50.0, 25.0, "rain")), IrrigationAdvice::Reduce);
        assert_eq!(irrigation_need(&weather(28.0, 75.0, 8.0, "rain")), IrrigationAdvice::Minimal);
        assert_eq!(irrigation_need(&weather(28.0, 35.0, 0.0, "clear")), IrrigationAdvice::Increase);
        assert_eq!(irrigation_need(&weather(28.0, 60.0, 8.0, "clouds")), IrrigationAdvice::Normal);
    }

    #[test]
    fn pest_risk_thresholds() {
        assert_eq!(pest_risk(&weather(32.0, 85.0, 0.0, "haze")), Level::High);
        assert_eq!(pest_risk(&weather(32.0, 70.0, 0.0, "haze")), Level::Medium);
        assert_eq!(pest_risk(&weather(25.0, 90.0, 0.0, "haze")), Level::Low);
    }

    #[test]
    fn planting_conditions_thresholds() {
        assert_eq!(planting_conditions(&weather(24.0, 80.0, 10.0, "light rain")), PlantingConditions::Ideal);
        assert_eq!(planting_conditions(&weather(12.0, 80.0, 10.0, "light rain")), PlantingConditions::Moderate);
        assert_eq!(planting_conditions(&weather(24.0, 50.0, 0.0, "clear sky")), PlantingConditions::Good);
        assert_eq!(planting_conditions(&weather(42.0, 20.0, 0.0, "clear sky")), PlantingConditions::Poor);
        assert_eq!(planting_conditions(&weather(8.0, 60.0, 0.0, "mist")), PlantingConditions::Poor);
        assert_eq!(planting_conditions(&weather(34.0, 40.0, 0.0, "clear sky")), PlantingConditions::Moderate);
    }

    #[test]
    fn insights_serialize_camel_case() {
        let insights = FieldInsights::from_weather(&weather(31.0, 82.0, 30.0, "thunderstorm"), 19.0);
        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["pestRisk"], "high");
        assert_eq!(json["irrigationNeed"], "reduce");
        assert_eq!(json["plantingConditions"], "ideal");
        assert_eq!(json["seasonSuitability"], "excellent");
    }
}
