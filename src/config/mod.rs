use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub http_timeout_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let api_base_url = env_or("QUIRE_API_URL", DEFAULT_API_URL);
        Url::parse(&api_base_url).map_err(|err| anyhow!("invalid QUIRE_API_URL: {}", err))?;

        let http_timeout_seconds: u64 = env_or_parse("QUIRE_HTTP_TIMEOUT_SECONDS", "10")?;
        validate_timeout(http_timeout_seconds)?;

        Ok(Self {
            api_base_url,
            session_file: PathBuf::from(env_or("QUIRE_SESSION_FILE", ".quire/session.json")),
            http_timeout_seconds,
        })
    }

    pub fn with_api_url(mut self, api_base_url: Option<String>) -> Result<Self> {
        if let Some(url) = api_base_url {
            Url::parse(&url).map_err(|err| anyhow!("invalid api url: {}", err))?;
            self.api_base_url = url;
        }
        Ok(self)
    }
}

fn validate_timeout(seconds: u64) -> Result<()> {
    if seconds == 0 {
        return Err(anyhow!(
            "invalid QUIRE_HTTP_TIMEOUT_SECONDS: must be at least 1"
        ));
    }
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
