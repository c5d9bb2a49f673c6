use crate::config::Config;
use crate::error::{KrishiError, Result};
use crate::logic::agronomic_defaults::{climate_type_for, soil_type_for};
use crate::logic::season_clock::current_season;
use crate::logic::{AdvisoryEngine, GeoResolver, WeatherResolver};
use crate::models::{Advisory, AdvisoryResponse, FarmContext, FarmRequest, Season};
use chrono::NaiveDate;

/// Runs one advisory request from raw form input to recommendations.
pub struct Orchestrator {
    geo: GeoResolver,
    weather: WeatherResolver,
    engine: AdvisoryEngine,
}

impl Orchestrator {
    pub fn new(geo: GeoResolver, weather: WeatherResolver, engine: AdvisoryEngine) -> Self {
        Self {
            geo,
            weather,
            engine,
        }
    }

    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        Self::new(
            GeoResolver::from_config(config, client),
            WeatherResolver::from_config(config, client),
            AdvisoryEngine::from_config(config, client),
        )
    }

    pub fn geo(&self) -> &GeoResolver {
        &self.geo
    }

    pub fn weather(&self) -> &WeatherResolver {
        &self.weather
    }

    pub fn engine(&self) -> &AdvisoryEngine {
        &self.engine
    }

    /// Outbound response; failures become `{error, fallback: true}`.
    pub async fn handle(&self, request: FarmRequest, today: NaiveDate) -> AdvisoryResponse {
        match self.advise(request, today).await {
            Ok(advisory) => AdvisoryResponse::Success(advisory),
            Err(e) => {
                tracing::error!("Advisory request failed: {}", e);
                AdvisoryResponse::failure(e)
            }
        }
    }

    pub async fn advise(&self, request: FarmRequest, today: NaiveDate) -> Result<Advisory> {
        let context = self.build_context(request, today).await?;
        tracing::debug!(
            "Advising for {} ({}, soil {}, climate {})",
            context.location,
            context.season,
            context.soil_type,
            context.climate_type
        );
        let advisory = self.engine.recommend(&context).await?;
        tracing::info!(
            "{} recommendations for {} ({} mode)",
            advisory.recommendations.len(),
            context.location,
            advisory.mode
        );
        Ok(advisory)
    }

    /// Resolves location and weather, then fills every blank field with a default.
    pub async fn build_context(&self, request: FarmRequest, today: NaiveDate) -> Result<FarmContext> {
        let location = request.location.trim();
        if location.is_empty() && request.coordinates.is_none() {
            return Err(KrishiError::InvalidRequest(
                "A location or coordinates are required".into(),
            ));
        }

        let season = resolve_season(&request.season, today);

        let (resolved, weather) = match request.coordinates {
            Some(coords) => {
                let (resolved, weather) =
                    tokio::join!(self.geo.resolve(coords), self.weather.resolve(coords, today));
                if weather.is_estimated() {
                    tracing::debug!("Using estimated weather for {}", coords);
                }
                (Some(resolved), Some(weather))
            }
            None => (None, None),
        };

        let location_text = match (&resolved, location.is_empty()) {
            (Some(resolved), true) => resolved.label(),
            _ => location.to_string(),
        };

        // Typed text can name a city or a state, so it feeds both tables
        let (city_text, state_text) = match &resolved {
            Some(r) => (
                format!("{} {}", location_text, r.city),
                format!("{} {}", location_text, r.state),
            ),
            None => (location_text.clone(), location_text.clone()),
        };

        let soil_type = non_blank(&request.soil_type)
            .unwrap_or_else(|| soil_type_for(&city_text, &state_text).to_string());
        let climate_type = non_blank(&request.climate)
            .unwrap_or_else(|| climate_type_for(&city_text, &state_text).to_string());
        let temperature_text = non_blank(&request.temperature)
            .or_else(|| weather.as_ref().map(|w| w.temperature_label()))
            .unwrap_or_default();

        let mut context = FarmContext::new(location_text, season)
            .with_soil_type(soil_type)
            .with_climate_type(climate_type)
            .with_temperature(temperature_text)
            .with_notes(request.additional_info.trim());

        if let Some(coords) = request.coordinates {
            context = context.with_coordinates(coords);
        }
        if let Some(weather) = weather {
            context = context.with_weather(weather);
        }
        if let Some(resolved) = resolved {
            context = context.with_resolved_location(resolved);
        }

        Ok(context)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Blank means "now"; anything unrecognised is treated as Kharif.
fn resolve_season(text: &str, today: NaiveDate) -> Season {
    if text.trim().is_empty() {
        return current_season(today).season;
    }

    Season::from_str(text).unwrap_or_else(|| {
        tracing::warn!("Unknown season '{}', defaulting to Kharif", text);
        Season::Kharif
    })
}
