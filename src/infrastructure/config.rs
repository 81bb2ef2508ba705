use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEV_JWT_SECRET: &str = "life-manager-dev-secret-change-me";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// sled database location; in-memory storage when unset.
    pub data_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Single allowed origin; any origin when unset.
    pub cors_origin: Option<String>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            data_dir: None,
            upload_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origin: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = value("DATA_DIR").map(PathBuf::from);
        let upload_dir = value("UPLOAD_DIR")
            .map(PathBuf::from)
            .or_else(|| data_dir.as_ref().map(|dir| dir.join("uploads")));

        Ok(Self {
            host: value("HOST").unwrap_or(defaults.host),
            port: parse_or("PORT", value("PORT"), defaults.port)?,
            jwt_secret: value("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_secs: parse_or("TOKEN_TTL_SECS", value("TOKEN_TTL_SECS"), defaults.token_ttl_secs)?,
            data_dir,
            upload_dir,
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                value("MAX_UPLOAD_BYTES"),
                defaults.max_upload_bytes,
            )?,
            cors_origin: value("CORS_ORIGIN"),
            log_filter: value("LOG_LEVEL").unwrap_or(defaults.log_filter),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key,
                value: value.clone(),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.data_dir.is_none());
        assert!(config.upload_dir.is_none());
        assert_eq!(config.token_ttl_secs, 3600);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_upload_dir_follows_data_dir() {
        let config = Config::from_lookup(lookup(&[("DATA_DIR", "/var/lib/life")])).unwrap();
        assert_eq!(config.upload_dir, Some(PathBuf::from("/var/lib/life/uploads")));
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("UPLOAD_DIR", "/tmp/up"),
            ("CORS_ORIGIN", "http://localhost:3000"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.upload_dir, Some(PathBuf::from("/tmp/up")));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
