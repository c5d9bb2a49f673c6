use crate::config::Config;
use crate::datasources::OpenWeatherMapClient;
use crate::error::{KrishiError, Result};
use crate::models::{Coordinates, WeatherSnapshot, WeatherSource};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::time::Duration;

/// A source of observed weather.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot>;
}

pub const ESTIMATED_CONDITIONS: &str = "Clear conditions (estimated)";

/// Rough temperature for a latitude and calendar month, clamped to 10-45°C.
pub fn estimate_temperature(latitude: f64, month: u32) -> f64 {
    let mut base_temp: f64 = 25.0;

    // Higher latitude is cooler
    if latitude > 28.0 {
        base_temp -= 5.0;
    } else if latitude < 15.0 {
        base_temp += 5.0;
    }

    match month {
        12 | 1 | 2 => base_temp -= 8.0,
        3..=5 => base_temp += 5.0,
        6..=9 => base_temp += 2.0,
        _ => {}
    }

    base_temp.clamp(10.0, 45.0)
}

/// Coastal south is humid, the north dry.
pub fn estimate_humidity(latitude: f64) -> f64 {
    if latitude < 20.0 {
        70.0
    } else if latitude > 28.0 {
        50.0
    } else {
        60.0
    }
}

/// Deterministic stand-in when no provider answers. Never claims rainfall.
pub fn estimate(coords: Coordinates, date: NaiveDate) -> WeatherSnapshot {
    let temp = estimate_temperature(coords.latitude, date.month());

    WeatherSnapshot {
        temperature_current: temp,
        temperature_min: temp - 5.0,
        temperature_max: temp + 5.0,
        humidity: estimate_humidity(coords.latitude),
        rainfall_next_5_days_mm: 0.0,
        conditions: ESTIMATED_CONDITIONS.to_string(),
        wind_speed: 2.5,
        soil_temperature_estimate: Some(temp - 2.0),
        source: WeatherSource::Estimated,
    }
}

pub struct WeatherResolver {
    providers: Vec<Box<dyn WeatherProvider>>,
    timeout: Duration,
}

impl WeatherResolver {
    /// A resolver that only estimates.
    pub fn new(timeout: Duration) -> Self {
        Self {
            providers: Vec::new(),
            timeout,
        }
    }

    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        let resolver = Self::new(config.http.timeout());

        match config.weather_api() {
            Some(owm) => {
                tracing::info!("OpenWeatherMap configured for weather data");
                resolver.with_provider(OpenWeatherMapClient::new(client.clone(), owm.clone()))
            }
            None => {
                tracing::info!("OpenWeatherMap not configured - weather will be estimated");
                resolver
            }
        }
    }

    pub fn with_provider(mut self, provider: impl WeatherProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Provider data when any provider answers, otherwise an estimate for `today`.
    pub async fn resolve(&self, coords: Coordinates, today: NaiveDate) -> WeatherSnapshot {
        if let Err(e) = coords.validate() {
            tracing::warn!("Skipping weather providers: {}", e);
            return estimate(coords, today);
        }

        for provider in &self.providers {
            let attempt = tokio::time::timeout(self.timeout, provider.current(coords))
                .await
                .unwrap_or_else(|_| {
                    Err(KrishiError::DataSourceUnavailable(format!(
                        "{} timed out after {:?}",
                        provider.name(),
                        self.timeout
                    )))
                });

            match attempt {
                Ok(snapshot) => {
                    tracing::debug!(
                        "{} reports {:.0}°C, {:.0}% humidity at {}",
                        provider.name(),
                        snapshot.temperature_current,
                        snapshot.humidity,
                        coords
                    );
                    return snapshot;
                }
                Err(e) => {
                    tracing::warn!("Weather via {} failed, trying next: {}", provider.name(), e);
                }
            }
        }

        estimate(coords, today)
    }
}
