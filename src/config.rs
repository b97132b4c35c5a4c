use crate::errors::ConfigError;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DATABASE_FILE: &str = "rentals.db";

/// Settings the client needs before it can talk to the backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root every request path is appended to, without a trailing slash
    pub api_url: String,
    /// SQLite file holding the credential pair
    pub database_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_url: &str, database_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            database_url: database_url.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
        })
    }

    /// Resolve configuration from `RENTALS_*` environment variables (a `.env`
    /// file is honoured), falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_url = match env::var("RENTALS_API_URL") {
            Ok(url) => {
                tracing::info!(api_url = %url, "Using API url from RENTALS_API_URL");
                url
            }
            Err(_) => {
                tracing::info!(api_url = DEFAULT_API_URL, "Using default API url");
                DEFAULT_API_URL.to_string()
            }
        };

        let database_url = match env::var("RENTALS_DATABASE_URL") {
            Ok(path) => {
                tracing::info!(database_url = %path, "Using credential store from RENTALS_DATABASE_URL");
                path
            }
            Err(_) => {
                let mut path = env::current_dir()?;
                path.push(DEFAULT_DATABASE_FILE);
                let res = path.display().to_string();
                tracing::info!(database_url = %res, "Using default credential store");
                res
            }
        };

        let timeout = match env::var("RENTALS_TIMEOUT_SECS") {
            Ok(value) => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber {
                        key: "RENTALS_TIMEOUT_SECS".to_string(),
                        value: value.clone(),
                    })?;
                tracing::info!(timeout_secs = secs, "Using timeout from RENTALS_TIMEOUT_SECS");
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url: normalize_api_url(&api_url)?,
            database_url,
            timeout,
            user_agent: default_user_agent(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn default_user_agent() -> String {
    format!("rentals/{}", env!("CARGO_PKG_VERSION"))
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("http://localhost:8000/api/", "rentals.db").unwrap();
        assert_eq!(config.api_url, "http://localhost:8000/api");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = ClientConfig::new("not a url", "rentals.db");
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let result = ClientConfig::new("ftp://example.com/api", "rentals.db");
        assert!(matches!(result, Err(ConfigError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new(DEFAULT_API_URL, "rentals.db").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.user_agent.starts_with("rentals/"));
    }
}
