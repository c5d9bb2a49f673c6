mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;

use clap::Parser;
use cli::{Cli, Commands, LocateArgs, RecommendArgs};
use config::Config;
use datasources::{ChatAdvisorClient, OpenWeatherMapClient};
use error::{KrishiError, Result};
use logic::insights::FieldInsights;
use logic::season_clock::{current_season, next_season, season_info};
use logic::Orchestrator;
use models::{AdvisoryResponse, Coordinates, FarmRequest, Season};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

// New Delhi, used to probe geocoders
const PROBE_COORDINATES: Coordinates = Coordinates {
    latitude: 28.6139,
    longitude: 77.2090,
};

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` means the command ran but its outcome is a failure.
async fn run(cli: Cli) -> Result<bool> {
    if let Commands::Init = cli.command {
        let (_, path) = Config::setup_interactive()?;
        println!("Config written to {}", path.display());
        return Ok(true);
    }

    let config = match Config::load(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `krishi init` or copy config/config.yaml.example to config/config.yaml");
            return Ok(false);
        }
    };

    // Per-request deadlines are applied by each resolver
    let client = reqwest::Client::builder()
        .connect_timeout(config.http.timeout())
        .build()?;
    let orchestrator = Orchestrator::from_config(&config, &client);
    tracing::debug!(
        "Geocoders: {:?}, weather: {:?}, advisor: {}",
        orchestrator.geo().provider_names(),
        orchestrator.weather().provider_names(),
        orchestrator.engine().advisor_name().unwrap_or("none")
    );
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Recommend(args) => {
            let response = match build_request(args) {
                Ok(request) => orchestrator.handle(request, today).await,
                Err(e) => rejected_request(e),
            };
            print_json(&response)?;
            Ok(response.is_success())
        }
        Commands::Season { date } => {
            let date = date.unwrap_or(today);
            print_json(&serde_json::json!({
                "date": date,
                "current": current_season(date),
                "next": next_season(date),
                "seasons": Season::all()
                    .iter()
                    .map(|s| season_info(*s))
                    .collect::<Vec<_>>(),
            }))?;
            Ok(true)
        }
        Commands::Locate(LocateArgs { lat, lon, address }) => {
            let location = match (lat, lon, address) {
                (Some(lat), Some(lon), _) => {
                    Some(orchestrator.geo().resolve(Coordinates::new(lat, lon)).await)
                }
                (_, _, Some(address)) => orchestrator.geo().resolve_address(&address).await,
                _ => {
                    return Err(KrishiError::InvalidRequest(
                        "Pass --lat and --lon, or --address".into(),
                    ))
                }
            };

            match location {
                Some(location) => {
                    tracing::debug!(
                        "Resolved {} with {} accuracy",
                        location.coordinates(),
                        location.accuracy
                    );
                    print_json(&location)?;
                    Ok(true)
                }
                None => {
                    eprintln!("No match found");
                    Ok(false)
                }
            }
        }
        Commands::Weather { lat, lon } => {
            let coords = Coordinates::new(lat, lon);
            let weather = orchestrator.weather().resolve(coords, today).await;
            tracing::debug!("Weather for {} from {}", coords, weather.source);
            let insights = FieldInsights::from_weather(&weather, lat);
            print_json(&serde_json::json!({
                "weather": weather,
                "insights": insights,
            }))?;
            Ok(true)
        }
        Commands::Check => check(&config, &client, &orchestrator).await,
        Commands::Init => Ok(true),
    }
}

fn build_request(args: RecommendArgs) -> Result<FarmRequest> {
    let mut request = match args.request.as_deref() {
        Some(path) => read_request(path)?,
        None => FarmRequest::default(),
    };

    if let Some(location) = args.location {
        request.location = location;
    }
    if let Some(season) = args.season {
        request.season = season;
    }
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        request.coordinates = Some(Coordinates::new(lat, lon));
    }
    if let Some(soil) = args.soil {
        request.soil_type = soil;
    }
    if let Some(climate) = args.climate {
        request.climate = climate;
    }
    if let Some(temperature) = args.temperature {
        request.temperature = temperature;
    }
    if let Some(notes) = args.notes {
        request.additional_info = notes;
    }

    Ok(request)
}

/// An unreadable request body still answers with the failure shape.
fn rejected_request(e: KrishiError) -> AdvisoryResponse {
    tracing::error!("Could not read request: {}", e);
    AdvisoryResponse::failure(e)
}

fn read_request(path: &Path) -> Result<FarmRequest> {
    let body = if path == Path::new("-") {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body)?;
        body
    } else {
        std::fs::read_to_string(path)?
    };

    Ok(serde_json::from_str(&body)?)
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn probe_ok(config: &Config, probe: impl std::future::Future<Output = Result<bool>>) -> bool {
    matches!(
        tokio::time::timeout(config.http.timeout(), probe).await,
        Ok(Ok(true))
    )
}

fn status_label(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "FAILED"
    }
}

async fn check(
    config: &Config,
    client: &reqwest::Client,
    orchestrator: &Orchestrator,
) -> Result<bool> {
    println!("Configuration loaded");
    let mut all_ok = true;

    let geocoders = orchestrator.geo().check_providers(PROBE_COORDINATES).await;
    if geocoders.is_empty() {
        println!("  Geocoding: disabled (latitude bands only)");
    }
    for (name, ok) in geocoders {
        println!("  {}: {}", name, status_label(ok));
        all_ok &= ok;
    }

    match config.weather_api() {
        Some(owm) => {
            let probe = OpenWeatherMapClient::new(client.clone(), owm.clone());
            let ok = probe_ok(config, probe.test_connection()).await;
            println!("  OpenWeatherMap: {}", status_label(ok));
            all_ok &= ok;
        }
        None => println!("  OpenWeatherMap: not configured (weather will be estimated)"),
    }

    match config.advisor_api() {
        Some(advisor) => {
            let probe = ChatAdvisorClient::new(client.clone(), advisor.clone());
            let ok = probe_ok(config, probe.test_connection()).await;
            println!("  AI advisor ({}): {}", advisor.model, status_label(ok));
            all_ok &= ok;
        }
        None => println!("  AI advisor: not configured (rule table recommendations)"),
    }

    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_for(path: PathBuf) -> RecommendArgs {
        RecommendArgs {
            request: Some(path),
            location: None,
            season: None,
            lat: None,
            lon: None,
            soil: None,
            climate: None,
            temperature: None,
            notes: None,
        }
    }

    fn temp_request(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("krishi-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn malformed_request_body_becomes_failure_json() {
        let path = temp_request("malformed", "{\"location\": ");
        let result = build_request(args_for(path.clone()));
        std::fs::remove_file(&path).unwrap();

        let response = rejected_request(result.unwrap_err());
        assert!(!response.is_success());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["fallback"], serde_json::json!(true));
        assert!(!json["error"].as_str().unwrap().is_empty());
    }

    #[test]
    fn missing_request_file_becomes_failure_json() {
        let path = std::env::temp_dir().join("krishi-no-such-request.json");
        let response = rejected_request(build_request(args_for(path)).unwrap_err());
        assert!(matches!(
            response,
            AdvisoryResponse::Failure { fallback: true, .. }
        ));
    }

    #[test]
    fn flags_override_request_body() {
        let path = temp_request("override", r#"{"location": "Nashik", "season": "rabi"}"#);
        let mut args = args_for(path.clone());
        args.season = Some("Zaid".into());
        args.lat = Some(20.0);
        args.lon = Some(73.8);
        let request = build_request(args).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(request.location, "Nashik");
        assert_eq!(request.season, "Zaid");
        assert_eq!(request.coordinates, Some(Coordinates::new(20.0, 73.8)));
    }
}
