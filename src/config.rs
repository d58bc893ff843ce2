use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the JSON slots and uploaded files
    pub data: String,
    /// Directory for exported reports, evaluations and logs
    pub output: String,
}

/// External model API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when the selected model is not served by this API
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Environment variable holding the API key (read once at startup)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Optional cap on generated tokens per call
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
            max_tokens: None,
        }
    }
}

impl GatewayConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// An unset or empty variable yields `None`; the gateway then fails each
    /// call instead of failing startup.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate_ms: u64,
    /// Number of dataset rows shown in the validation preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_refresh_rate() -> u64 {
    250
}

fn default_preview_rows() -> usize {
    5
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Config {
    /// Project-local config file, checked before the user config
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("dashmigrate.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the wizard works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/dashmigrate/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dashmigrate").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with DASHMIGRATE_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("DASHMIGRATE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Write this config as TOML to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(path, toml_str).context("Failed to write config file")?;
        Ok(())
    }

    /// Get absolute path to the data directory
    pub fn data_path(&self) -> PathBuf {
        absolutize(&self.paths.data)
    }

    /// Get absolute path to the output directory
    pub fn output_path(&self) -> PathBuf {
        absolutize(&self.paths.output)
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.output_path().join("logs")
    }
}

fn absolutize(raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                data: "data".to_string(),
                output: "output".to_string(),
            },
            gateway: GatewayConfig::default(),
            logging: LoggingConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        let config = Config::default();
        assert_eq!(config.paths.data, "data");
        assert_eq!(config.paths.output, "output");
        assert!(config.data_path().is_absolute());
        assert!(config.logs_path().ends_with("output/logs"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.data = temp_dir.path().to_string_lossy().to_string();
        assert_eq!(config.data_path(), temp_dir.path());
    }

    #[test]
    fn test_gateway_defaults() {
        let gateway = GatewayConfig::default();
        assert_eq!(gateway.default_model, "gpt-4o");
        assert_eq!(gateway.api_key_env, "OPENAI_API_KEY");
        assert_eq!(gateway.timeout_secs, 120);
        assert!(gateway.max_tokens.is_none());
    }

    #[test]
    fn test_missing_api_key_env_yields_none() {
        let gateway = GatewayConfig {
            api_key_env: "DASHMIGRATE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..GatewayConfig::default()
        };
        assert!(gateway.api_key().is_none());
    }

    #[test]
    fn test_save_and_reload_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");

        let mut config = Config::default();
        config.ui.preview_rows = 12;
        config.gateway.default_model = "gpt-4o-mini".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.ui.preview_rows, 12);
        assert_eq!(loaded.gateway.default_model, "gpt-4o-mini");
    }
}
