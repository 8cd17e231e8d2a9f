use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

#[derive(Deserialize)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// OTLP trace export. `api_key` is sent as the `x-honeycomb-team` header when set.
#[derive(Deserialize, Clone)]
pub struct TelemetryConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Deserialize)]
pub struct Config {
    pub database_url: String,
    pub signups_enabled: bool,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    pub telemetry: Option<TelemetryConfig>,
    pub ssl: Option<SSLConfig>,
}

fn default_max_pool_size() -> u32 {
    10
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_owned()
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Config::from_toml(&config)
    }

    pub fn from_toml(config: &str) -> Result<Config, anyhow::Error> {
        toml::from_str(config).with_context(|| "Unable to parse config")
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let signups_enabled = read_env("SIGNUPS_ENABLED")?;
        let signups_enabled = signups_enabled
            .parse()
            .context("Unable to parse SIGNUPS_ENABLED value")?;
        let database_url = read_env("DATABASE_URL")?;
        let max_pool_size = match env::var("MAX_POOL_SIZE") {
            Ok(size) => size.parse().context("Unable to parse MAX_POOL_SIZE value")?,
            Err(_) => default_max_pool_size(),
        };
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| default_bind_address());
        let telemetry = env::var("OTLP_ENDPOINT")
            .ok()
            .map(|endpoint| TelemetryConfig {
                endpoint,
                api_key: env::var("OTLP_API_KEY").ok(),
            });

        let config = Config {
            database_url,
            signups_enabled,
            max_pool_size,
            bind_address,
            telemetry,
            ssl: None,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://localhost/flashcards"
            signups_enabled = true
            "#,
        )
        .unwrap();

        assert_eq!("postgres://localhost/flashcards", config.database_url);
        assert!(config.signups_enabled);
        assert_eq!(10, config.max_pool_size);
        assert_eq!("0.0.0.0:8000", config.bind_address);
        assert!(config.telemetry.is_none());
        assert!(config.ssl.is_none());
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://db/flashcards"
            signups_enabled = false
            max_pool_size = 3
            bind_address = "127.0.0.1:9000"

            [telemetry]
            endpoint = "https://api.honeycomb.io"
            api_key = "key"

            [ssl]
            private_key_file = "/etc/flashcards/key.pem"
            certificate_chain_file = "/etc/flashcards/chain.pem"
            "#,
        )
        .unwrap();

        assert!(!config.signups_enabled);
        assert_eq!(3, config.max_pool_size);
        assert_eq!("127.0.0.1:9000", config.bind_address);
        let telemetry = config.telemetry.unwrap();
        assert_eq!("https://api.honeycomb.io", telemetry.endpoint);
        assert_eq!(Some("key".to_owned()), telemetry.api_key);
        assert!(config.ssl.is_some());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(Config::from_toml("signups_enabled = true").is_err());
    }
}
