use crate::config::OpenWeatherMapConfig;
use crate::error::{KrishiError, Result};
use crate::logic::weather_resolver::WeatherProvider;
use crate::models::{Coordinates, WeatherSnapshot, WeatherSource};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures. Every field defaults so a sparse
// payload still produces a snapshot.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmCurrentResponse {
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
    #[allow(dead_code)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmWeather {
    #[allow(dead_code)]
    id: u32,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwmForecastItem {
    rain: Option<OwmPrecipitation>,
    snow: Option<OwmPrecipitation>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

impl OpenWeatherMapClient {
    pub fn new(client: reqwest::Client, config: OpenWeatherMapConfig) -> Self {
        Self { client, config }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, coords: Coordinates) -> Result<T> {
        let url = format!(
            "{}/{}?lat={}&lon={}&appid={}&units=metric",
            API_BASE_URL, endpoint, coords.latitude, coords.longitude, self.config.api_key
        );

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                KrishiError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KrishiError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(|e| {
            KrishiError::DataSourceUnavailable(format!("OpenWeatherMap: {}", e.without_url()))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            KrishiError::InvalidData(format!("Failed to parse OpenWeatherMap response: {}", e))
        })
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self) -> Result<bool> {
        self.get_json::<OwmCurrentResponse>("weather", Coordinates::new(18.52, 73.86))
            .await
            .map(|_| true)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapClient {
    fn name(&self) -> &'static str {
        "OpenWeatherMap"
    }

    async fn current(&self, coords: Coordinates) -> Result<WeatherSnapshot> {
        let current: OwmCurrentResponse = self.get_json("weather", coords).await?;

        // The forecast only feeds the rainfall total; losing it is not fatal
        let forecast = match self.get_json::<OwmForecastResponse>("forecast", coords).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                tracing::warn!("OpenWeatherMap forecast unavailable: {}", e);
                None
            }
        };

        Ok(build_snapshot(current, forecast.as_ref()))
    }
}

fn build_snapshot(current: OwmCurrentResponse, forecast: Option<&OwmForecastResponse>) -> WeatherSnapshot {
    let rainfall_total: f64 = forecast
        .map(|f| {
            f.list
                .iter()
                .map(|item| {
                    let rain_mm = item.rain.as_ref().map(|r| r.three_hour).unwrap_or(0.0);
                    let snow_mm = item.snow.as_ref().map(|s| s.three_hour).unwrap_or(0.0);
                    rain_mm + snow_mm
                })
                .sum()
        })
        .unwrap_or(0.0);

    let conditions = current
        .weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_default();

    let temp = current.main.temp.round();

    WeatherSnapshot {
        temperature_current: temp,
        temperature_min: current.main.temp_min.round(),
        temperature_max: current.main.temp_max.round(),
        humidity: current.main.humidity,
        rainfall_next_5_days_mm: (rainfall_total * 10.0).round() / 10.0,
        conditions,
        wind_speed: current.wind.speed,
        soil_temperature_estimate: Some((current.main.temp - 2.0).round()),
        source: WeatherSource::Provider,
    }
}
