//! Service configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_STORAGE_BUCKET: &str = "images";
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_MAX_OPEN_PANELS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub admin_passphrase: String,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// `None` disables image uploads.
    pub storage: Option<StorageConfig>,
    /// Largest image body the upload route buffers.
    pub upload_max_bytes: usize,
    /// Open admin panels kept before the oldest is evicted.
    pub max_open_panels: usize,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Required:
    /// - `ADMIN_PASSPHRASE`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: in-memory store when absent
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `STORAGE_URL` + `STORAGE_SERVICE_KEY`: uploads disabled unless both are set
    /// - `STORAGE_BUCKET`: default `images`
    /// - `STORAGE_TIMEOUT_SECS`: default 30
    /// - `UPLOAD_MAX_BYTES`: default 20 MiB
    /// - `MAX_OPEN_PANELS`: default 8, at least 1
    ///
    /// # Errors
    ///
    /// Returns `Missing` for an unset passphrase and `Invalid` for values that
    /// do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let admin_passphrase = get("ADMIN_PASSPHRASE").ok_or(ConfigError::Missing("ADMIN_PASSPHRASE"))?;
        let port = env_parse(&get, "PORT", DEFAULT_PORT)?;
        let db_max_connections = env_parse(&get, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        let storage = match (get("STORAGE_URL"), get("STORAGE_SERVICE_KEY")) {
            (Some(base_url), Some(service_key)) => Some(StorageConfig {
                base_url: base_url.trim_end_matches('/').to_owned(),
                service_key,
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_owned()),
                timeout_secs: env_parse(&get, "STORAGE_TIMEOUT_SECS", DEFAULT_STORAGE_TIMEOUT_SECS)?,
            }),
            _ => None,
        };

        let upload_max_bytes = env_parse(&get, "UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES)?;
        let max_open_panels = env_parse(&get, "MAX_OPEN_PANELS", DEFAULT_MAX_OPEN_PANELS)?;
        if max_open_panels == 0 {
            return Err(ConfigError::Invalid { key: "MAX_OPEN_PANELS", value: "0".into() });
        }

        Ok(Self {
            port,
            admin_passphrase,
            database_url: get("DATABASE_URL"),
            db_max_connections,
            storage,
            upload_max_bytes,
            max_open_panels,
        })
    }
}

fn env_parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
