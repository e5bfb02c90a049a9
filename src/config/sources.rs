use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "LINKEMBED_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/linkembed.toml";
const ENV_PREFIX: &str = "LINKEMBED";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    load_from_sources(default_path())
}

/// Path of the configuration file, honoring `LINKEMBED_CONFIG`
pub fn default_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // LINKEMBED__HTTP__TIMEOUT -> http.timeout
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockHandlerMode, BootstrapSource, CacheBackend};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.http.timeout.as_duration(), Duration::from_secs(3));
        assert_eq!(config.providers.bootstrap, BootstrapSource::Basic);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[http]
timeout = "500ms"
user_agent = "example-bot/1.0"

[render]
urlize_all = false
block_handler = "none"

[render.urlize_attributes]
rel = "nofollow"

[render.params]
maxwidth = "600"

[providers]
bootstrap = "noembed"
refresh = true

[[providers.custom]]
pattern = 'https?://example\.com/v/\S+'
endpoint = "https://example.com/oembed"

[cache]
backend = "fjall"
path = "data/test-cache"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.http.timeout.as_duration(), Duration::from_millis(500));
        assert_eq!(config.http.user_agent, "example-bot/1.0");
        assert!(!config.render.urlize_all);
        assert_eq!(config.render.block_handler, BlockHandlerMode::None);
        assert_eq!(config.render.urlize_attributes["rel"], "nofollow");
        assert_eq!(config.render.params["maxwidth"], "600");
        assert_eq!(config.providers.bootstrap, BootstrapSource::Noembed);
        assert!(config.providers.refresh);
        assert_eq!(config.providers.custom.len(), 1);
        assert_eq!(config.providers.custom[0].endpoint, "https://example.com/oembed");
        assert_eq!(config.cache.backend, CacheBackend::Fjall);
        assert_eq!(config.cache.path, PathBuf::from("data/test-cache"));
    }

    // Environment overrides are left out: env::set_var is unsafe with
    // parallel tests.
}
