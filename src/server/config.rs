use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_address: Option<String>,
    log_dir: Option<String>,
    max_db_connections: Option<u32>,
}

fn default_listen_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_max_db_connections() -> u32 {
    10
}

impl ServerConfig {
    /// Loads the config from an optional TOML file, with environment
    /// variables (and `.env`) taking precedence over the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let env_config = envy::from_env::<PartialServerConfig>()?;
        Self::from_layers(config_path, env_config)
    }

    fn from_layers(
        config_path: Option<&str>,
        env_config: PartialServerConfig,
    ) -> Result<Self, ConfigError> {
        // 1. Load from file (optional)
        let file_config = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::Read {
                    path: path_str.to_string(),
                    source,
                })?;
                toml::from_str::<PartialServerConfig>(&contents).map_err(|source| {
                    ConfigError::Parse {
                        path: path_str.to_string(),
                        source,
                    }
                })?
            }
            _ => PartialServerConfig::default(),
        };

        // 2. Merge: environment overrides file
        Ok(ServerConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            listen_address: env_config
                .listen_address
                .or(file_config.listen_address)
                .unwrap_or_else(default_listen_address),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            max_db_connections: env_config
                .max_db_connections
                .or(file_config.max_db_connections)
                .unwrap_or_else(default_max_db_connections),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> Result<PartialServerConfig, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    fn load(path: Option<&str>, pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        ServerConfig::from_layers(path, env_from(pairs)?)
    }

    #[test]
    fn test_env_only_uses_defaults() {
        let config = load(
            None,
            &[("DATABASE_URL", "sqlite::memory:"), ("JWT_SECRET", "s3cret")],
        )
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.listen_address, "0.0.0.0:8000");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.max_db_connections, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url = \"postgres://file/db\"\njwt_secret = \"from-file\"\nlisten_address = \"127.0.0.1:9000\"\nmax_db_connections = 3"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = load(
            Some(&path),
            &[("JWT_SECRET", "from-env"), ("MAX_DB_CONNECTIONS", "7")],
        )
        .unwrap();

        assert_eq!(config.database_url, "postgres://file/db");
        assert_eq!(config.jwt_secret, "from-env");
        assert_eq!(config.listen_address, "127.0.0.1:9000");
        assert_eq!(config.max_db_connections, 7);
    }

    #[test]
    fn test_unrelated_env_vars_are_ignored() {
        let config = load(
            None,
            &[
                ("DATABASE_URL", "sqlite::memory:"),
                ("JWT_SECRET", "x"),
                ("PATH", "/usr/bin"),
            ],
        )
        .unwrap();
        assert_eq!(config.jwt_secret, "x");
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let err = load(None, &[("DATABASE_URL", "sqlite::memory:")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_invalid_connection_count() {
        let err = load(
            None,
            &[
                ("DATABASE_URL", "sqlite::memory:"),
                ("JWT_SECRET", "x"),
                ("MAX_DB_CONNECTIONS", "lots"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }

    #[test]
    fn test_bad_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = ").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let err = load(Some(&path), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
