pub mod bigdatacloud;
pub mod chat_advisor;
pub mod nominatim;
pub mod openweathermap;

pub use bigdatacloud::BigDataCloudClient;
pub use chat_advisor::ChatAdvisorClient;
pub use nominatim::NominatimClient;
pub use openweathermap::OpenWeatherMapClient;

/// Providers send "" as often as they omit a field; treat both as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
