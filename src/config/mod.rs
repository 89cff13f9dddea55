use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `CHEMVIZ_WEB__PORT=9000`
pub const ENV_PREFIX: &str = "CHEMVIZ";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Number of most recent datasets to keep; `0` keeps everything
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub max_rows: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./chemviz.db".to_string(),
            max_connections: Some(5),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_limit: 5,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self { max_rows: 100_000 }
    }
}

impl Config {
    /// Load configuration from the TOML file at `path`, then the environment.
    /// Keys missing from both fall back to the defaults.
    ///
    /// A default file is written when `path` does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, contents)?;
            tracing::info!("Wrote default configuration to {}", path.display());
        }

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl StorageConfig {
    /// Retention bound for the dataset store, `None` when unlimited
    pub fn retention(&self) -> Option<usize> {
        (self.history_limit > 0).then_some(self.history_limit)
    }
}

impl DatabaseConfig {
    /// Whether the URL points at a private in-memory SQLite database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.web.port, 8000);
        assert_eq!(config.storage.retention(), Some(5));

        let written: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.database.url, config.database.url);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[database]
url = "sqlite://./other.db"
max_connections = 2

[web]
host = "127.0.0.1"
port = 9100
max_upload_bytes = 4096

[storage]
history_limit = 20

[ingestion]
max_rows = 50
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.database.url, "sqlite://./other.db");
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 9100);
        assert_eq!(config.web.max_upload_bytes, 4096);
        assert_eq!(config.storage.retention(), Some(20));
        assert_eq!(config.ingestion.max_rows, 50);
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[web]\nport = 9200\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.web.port, 9200);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.ingestion.max_rows, 100_000);
        assert_eq!(config.storage.retention(), Some(5));
    }

    #[test]
    fn test_zero_history_limit_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nhistory_limit = 0\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.storage.history_limit, 0);
        assert_eq!(config.storage.retention(), None);
    }

    #[test]
    fn test_default_file_round_trips_history_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::load(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("history_limit = 5"), "{}", written);
    }

    #[test]
    fn test_in_memory_detection() {
        let mut config = Config::default();
        assert!(!config.database.is_in_memory());

        config.database.url = "sqlite::memory:".to_string();
        assert!(config.database.is_in_memory());
    }
}
