use crate::error::{KrishiError, Result};
use dialoguer::{Input, Password, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub openweathermap: Option<OpenWeatherMapConfig>,
    #[serde(default)]
    pub advisor: Option<AdvisorConfig>,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    #[serde(default = "default_secondary_url")]
    pub secondary_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_primary_url() -> String {
    "https://api.bigdatacloud.net/data/reverse-geocode-client".into()
}

fn default_secondary_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}

fn default_user_agent() -> String {
    "KrishiAI-App/1.0".into()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            secondary_url: default_secondary_url(),
            user_agent: default_user_agent(),
            enabled: true,
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl OpenWeatherMapConfig {
    pub fn is_usable(&self) -> bool {
        self.enabled && key_is_set(&self.api_key)
    }
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// How the AI advisor's reply is consumed. Fixed per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorMode {
    /// Reply is a JSON array of crop recommendations
    #[default]
    Structured,
    /// Reply is free text shown alongside rule-table recommendations
    Narrative,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_advisor_url")]
    pub api_url: String,
    pub api_key: String,
    #[serde(default = "default_advisor_model")]
    pub model: String,
    #[serde(default)]
    pub mode: AdvisorMode,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Upper bound for one completion, independent of `http.timeout_secs`
    #[serde(default = "default_advisor_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_advisor_url() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_advisor_model() -> String {
    "llama-3.1-70b-versatile".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_advisor_timeout_secs() -> u64 {
    30
}

impl AdvisorConfig {
    pub fn is_usable(&self) -> bool {
        self.enabled && key_is_set(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("mode", &self.mode)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("enabled", &self.enabled)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// An unresolved `${VAR}` placeholder counts as unset.
fn key_is_set(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.starts_with("${")
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(KrishiError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found - using defaults and environment");
                    return Ok(Self::from_env());
                }
            },
        };

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| KrishiError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| KrishiError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Defaults with API keys taken from `OPENWEATHER_API_KEY` and `GROQ_API_KEY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("OPENWEATHER_API_KEY") {
            config.openweathermap = Some(OpenWeatherMapConfig {
                api_key,
                enabled: true,
            });
        }

        if let Ok(api_key) = std::env::var("GROQ_API_KEY") {
            config.advisor = Some(AdvisorConfig {
                api_url: default_advisor_url(),
                api_key,
                model: default_advisor_model(),
                mode: AdvisorMode::Structured,
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                enabled: true,
                timeout_secs: default_advisor_timeout_secs(),
            });
        }

        config
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("krishi").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/krishi/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| KrishiError::Config("Cannot determine config directory".into()))?
            .join("krishi");
        Ok(config_dir.join("config.yaml"))
    }

    pub fn weather_api(&self) -> Option<&OpenWeatherMapConfig> {
        self.openweathermap.as_ref().filter(|c| c.is_usable())
    }

    pub fn advisor_api(&self) -> Option<&AdvisorConfig> {
        self.advisor.as_ref().filter(|c| c.is_usable())
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up Krishi!");
        println!("Leave an API key blank to skip that service; fallbacks cover it.");
        println!();

        println!("OpenWeatherMap");
        let owm_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| KrishiError::Config(format!("Input error: {}", e)))?;

        let openweathermap = if owm_api_key.is_empty() {
            None
        } else {
            Some(OpenWeatherMapConfig {
                api_key: owm_api_key,
                enabled: true,
            })
        };

        println!();
        println!("AI advisor (OpenAI-compatible chat completions)");
        let advisor_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| KrishiError::Config(format!("Input error: {}", e)))?;

        let advisor = if advisor_api_key.is_empty() {
            None
        } else {
            let api_url: String = Input::new()
                .with_prompt("  API URL")
                .default(default_advisor_url())
                .interact_text()
                .map_err(|e| KrishiError::Config(format!("Input error: {}", e)))?;

            let model: String = Input::new()
                .with_prompt("  Model")
                .default(default_advisor_model())
                .interact_text()
                .map_err(|e| KrishiError::Config(format!("Input error: {}", e)))?;

            let mode_index = Select::new()
                .with_prompt("  Reply format")
                .items(&["structured (JSON crop list)", "narrative (free text)"])
                .default(0)
                .interact()
                .map_err(|e| KrishiError::Config(format!("Input error: {}", e)))?;

            Some(AdvisorConfig {
                api_url,
                api_key: advisor_api_key,
                model,
                mode: if mode_index == 0 {
                    AdvisorMode::Structured
                } else {
                    AdvisorMode::Narrative
                },
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                enabled: true,
                timeout_secs: default_advisor_timeout_secs(),
            })
        };

        println!();

        let timeout_secs: u64 = Input::new()
            .with_prompt("HTTP timeout (seconds)")
            .default(default_timeout_secs())
            .interact_text()
            .map_err(|e| KrishiError::Config(format!("Input error: {}", e)))?;

        let config = Config {
            geocoding: GeocodingConfig::default(),
            openweathermap,
            advisor,
            http: HttpConfig { timeout_secs },
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| KrishiError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# Krishi Configuration\n# Generated by `krishi init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config_fills_defaults() {
        let config = Config::parse("http:\n  timeout_secs: 8\n").unwrap();
        assert_eq!(config.http.timeout_secs, 8);
        assert_eq!(config.geocoding.user_agent, "KrishiAI-App/1.0");
        assert!(config.geocoding.enabled);
        assert!(config.openweathermap.is_none());
        assert!(config.advisor_api().is_none());
    }

    #[test]
    fn parse_advisor_section() {
        let config = Config::parse(
            "advisor:\n  api_key: abc123\n  mode: narrative\n  model: llama-3.3-70b\n",
        )
        .unwrap();
        let advisor = config.advisor_api().unwrap();
        assert_eq!(advisor.mode, AdvisorMode::Narrative);
        assert_eq!(advisor.model, "llama-3.3-70b");
        assert_eq!(advisor.max_tokens, 2000);
        assert_eq!(advisor.timeout_secs, 30);
        assert!((advisor.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn unresolved_placeholder_counts_as_unset() {
        let config = Config::parse(
            "openweathermap:\n  api_key: ${KRISHI_TEST_SURELY_UNSET_VAR}\n",
        )
        .unwrap();
        assert!(config.openweathermap.is_some());
        assert!(config.weather_api().is_none());
    }

    #[test]
    fn disabled_service_is_not_usable() {
        let config =
            Config::parse("openweathermap:\n  api_key: real-key\n  enabled: false\n").unwrap();
        assert!(config.weather_api().is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = Config::parse("advisor:\n  api_key: super-secret\n").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn example_config_parses() {
        let config = Config::parse(include_str!("../config/config.yaml.example")).unwrap();
        assert!(config.geocoding.enabled);
        assert_eq!(config.http.timeout_secs, 10);
        let advisor = config.advisor.unwrap();
        assert_eq!(advisor.model, "llama-3.1-70b-versatile");
        assert_eq!(advisor.mode, AdvisorMode::Structured);
    }

    #[test]
    fn timeout_is_never_zero() {
        let http = HttpConfig { timeout_secs: 0 };
        assert_eq!(http.timeout(), Duration::from_secs(1));
    }
}
