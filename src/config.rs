//! TOML configuration.
//!
//! Every section is optional except `[server]`; missing sections fall back
//! to their defaults. See `config/care.example.toml` for a full example.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use care_directory_core::suggest::DEFAULT_SUGGESTION_CITIES;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Seed file overrides. Absent paths use the data compiled into the binary.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub facilities: Option<PathBuf>,
    #[serde(default)]
    pub cities: Option<PathBuf>,
    #[serde(default)]
    pub resources: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_suggestion_cities")]
    pub suggestion_cities: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            api_base: default_api_base(),
            suggestion_cities: default_suggestion_cities(),
        }
    }
}

impl AssistantConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "claude-3-7-sonnet-20250219".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_api_base() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_suggestion_cities() -> Vec<String> {
    DEFAULT_SUGGESTION_CITIES
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for running without a config file: local bind, embedded
    /// seed data, assistant disabled.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
            },
            seed: SeedConfig::default(),
            assistant: AssistantConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    match config.assistant.provider.as_str() {
        "disabled" | "anthropic" => {}
        other => anyhow::bail!(
            "Unknown assistant provider: '{}'. Must be disabled or anthropic.",
            other
        ),
    }

    if config.assistant.max_tokens == 0 {
        anyhow::bail!("assistant.max_tokens must be > 0");
    }
    if config.assistant.timeout_secs == 0 {
        anyhow::bail!("assistant.timeout_secs must be > 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let file = write_config("[server]\nbind = \"0.0.0.0:8080\"\n");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert!(!cfg.assistant.is_enabled());
        assert_eq!(cfg.assistant.max_tokens, 1024);
        assert_eq!(cfg.assistant.suggestion_cities.len(), 5);
        assert_eq!(cfg.logging.filter, "info");
        assert!(cfg.seed.facilities.is_none());
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
[server]
bind = "127.0.0.1:5001"

[seed]
facilities = "data/seed/facilities.json"

[assistant]
provider = "anthropic"
model = "claude-test"
max_tokens = 256
timeout_secs = 5
suggestion_cities = ["Pueblo"]

[logging]
filter = "care_directory=debug"
json = true
"#,
        );
        let cfg = load_config(file.path()).unwrap();
        assert!(cfg.assistant.is_enabled());
        assert_eq!(cfg.assistant.model, "claude-test");
        assert_eq!(cfg.assistant.api_base, "https://api.anthropic.com");
        assert_eq!(cfg.assistant.suggestion_cities, vec!["Pueblo".to_string()]);
        assert_eq!(
            cfg.seed.facilities.as_deref(),
            Some(Path::new("data/seed/facilities.json"))
        );
        assert!(cfg.logging.json);
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let file = write_config("[server]\nbind = \"x\"\n[assistant]\nprovider = \"openai\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unknown assistant provider"));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let file = write_config("[server]\nbind = \"x\"\n[assistant]\nmax_tokens = 0\n");
        assert!(load_config(file.path()).is_err());
        let file = write_config("[server]\nbind = \"x\"\n[assistant]\ntimeout_secs = 0\n");
        assert!(load_config(file.path()).is_err());
        let file = write_config("[server]\nbind = \" \"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/care.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
