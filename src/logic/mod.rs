pub mod advisory;
pub mod agronomic_defaults;
pub mod geo_resolver;
pub mod insights;
pub mod orchestrator;
pub mod season_clock;
pub mod weather_resolver;

pub use advisory::AdvisoryEngine;
pub use geo_resolver::GeoResolver;
pub use orchestrator::Orchestrator;
pub use weather_resolver::WeatherResolver;
