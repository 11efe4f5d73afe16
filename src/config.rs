use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub telegram_bot_token: String,
    pub public_rps: u32,
    pub api_rps: u32,
    pub uploads_dir: String,
    pub public_base_url: url::Url,
    pub max_upload_bytes: usize,
    pub init_data_max_age_secs: Option<u64>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_address", &self.server_address)
            .field("database_url", &"<redacted>")
            .field("telegram_bot_token", &"<redacted>")
            .field("public_rps", &self.public_rps)
            .field("api_rps", &self.api_rps)
            .field("uploads_dir", &self.uploads_dir)
            .field("public_base_url", &self.public_base_url.as_str())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("init_data_max_age_secs", &self.init_data_max_age_secs)
            .field("log_format", &self.log_format)
            .finish()
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let telegram_bot_token = get_env("TELEGRAM_BOT_TOKEN")?;
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN must not be blank".to_string(),
            ));
        }

        let public_base_url = get_env_or("PUBLIC_BASE_URL", "http://localhost:3000");
        let public_base_url = url::Url::parse(&public_base_url)
            .map_err(|e| Error::Config(format!("Invalid value for PUBLIC_BASE_URL: {}", e)))?;

        let log_format = match get_env_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "" => LogFormat::Pretty,
            other => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            database_url: get_env("DATABASE_URL")?,
            telegram_bot_token,
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            api_rps: get_env_parse_or("API_RPS", 100)?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            public_base_url,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            init_data_max_age_secs: get_env_parse_opt::<u64>("INIT_DATA_MAX_AGE_SECS")?
                .filter(|secs| *secs > 0),
            log_format,
        })
    }

    pub fn init_data_max_age(&self) -> Option<chrono::Duration> {
        self.init_data_max_age_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_opt<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(None),
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse_opt(name)?.unwrap_or(default))
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    get_config()
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
