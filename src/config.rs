use std::{env, path::PathBuf};

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// shared with every handler through the unified `AppState` (pulled out via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and error redaction.
    pub env: Env,
    // Port the HTTP server binds on 0.0.0.0.
    pub port: u16,
    // Which repository implementation backs the API.
    pub data: DataBackend,
    // Where uploaded files are persisted.
    pub storage: StorageBackend,
    // URL prefix under which uploaded files are publicly resolvable.
    pub uploads_public_prefix: String,
    // Directory holding the frontend single-page application build.
    pub static_dir: PathBuf,
}

/// Env
///
/// Runtime context. `Production` switches logs to JSON and hides internal error messages.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// DataBackend
///
/// Selects the single repository implementation at startup.
#[derive(Clone, PartialEq, Debug)]
pub enum DataBackend {
    Postgres { url: String, max_connections: u32 },
    /// In-process store. Data is lost on restart; refused in production.
    Memory,
}

/// StorageBackend
///
/// Selects where uploads are written: a local directory tree or an S3-compatible bucket.
#[derive(Clone, PartialEq, Debug)]
pub enum StorageBackend {
    Local {
        dir: PathBuf,
    },
    S3 {
        endpoint: String,
        region: String,
        access_key: String,
        secret_key: String,
        bucket: String,
        // Base URL at which objects of the bucket are publicly readable.
        public_url: String,
    },
}

/// ConfigError
///
/// Startup configuration failures. `main` treats any of these as fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("DATA_BACKEND=memory is not allowed in production")]
    MemoryInProduction,
}

impl Default for AppConfig {
    /// default
    ///
    /// Safe configuration for test scaffolding: in-memory data, local uploads.
    fn default() -> Self {
        Self {
            env: Env::Local,
            port: 3000,
            data: DataBackend::Memory,
            storage: StorageBackend::Local {
                dir: PathBuf::from("uploads"),
            },
            uploads_public_prefix: "/api/uploads".to_string(),
            static_dir: PathBuf::from("build"),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from process environment variables (after `.env` has been
    /// loaded by `main`). Fails fast on anything missing for the selected backends.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// from_lookup
    ///
    /// Builds the configuration from an arbitrary variable source. `load` delegates here
    /// with the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let env = match get("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let data = match get("DATA_BACKEND").as_deref() {
            None | Some("postgres") => {
                let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let max_connections = match get("DB_MAX_CONNECTIONS") {
                    Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                        var: "DB_MAX_CONNECTIONS",
                        value: raw,
                    })?,
                    None => 5,
                };
                DataBackend::Postgres {
                    url,
                    max_connections,
                }
            }
            Some("memory") if env == Env::Production => {
                return Err(ConfigError::MemoryInProduction);
            }
            Some("memory") => DataBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "DATA_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let storage = match get("STORAGE_BACKEND").as_deref() {
            None | Some("local") => StorageBackend::Local {
                dir: PathBuf::from(get("UPLOADS_DIR").unwrap_or_else(|| "uploads".to_string())),
            },
            Some("s3") => StorageBackend::S3 {
                endpoint: get("S3_ENDPOINT").ok_or(ConfigError::Missing("S3_ENDPOINT"))?,
                region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key: get("S3_ACCESS_KEY").ok_or(ConfigError::Missing("S3_ACCESS_KEY"))?,
                secret_key: get("S3_SECRET_KEY").ok_or(ConfigError::Missing("S3_SECRET_KEY"))?,
                bucket: get("S3_BUCKET_NAME").ok_or(ConfigError::Missing("S3_BUCKET_NAME"))?,
                public_url: get("S3_PUBLIC_URL")
                    .ok_or(ConfigError::Missing("S3_PUBLIC_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let uploads_public_prefix = get("UPLOADS_PUBLIC_PREFIX")
            .unwrap_or_else(|| "/api/uploads".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            env,
            port,
            data,
            storage,
            uploads_public_prefix,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "build".to_string())),
        })
    }

    /// Whether internal error messages may be echoed to clients.
    pub fn exposes_internal_errors(&self) -> bool {
        self.env != Env::Production
    }
}
