use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_URL: &str = "https://openlibrary.org";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org/b/id";
pub const DEFAULT_READING_LIST_PATH: &str = "/people/mekBot/books/want-to-read.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No data directory available; set BOOKHAVEN_DATA_DIR")]
    NoDataDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Open Library API root, without trailing slash
    pub api_url: String,
    /// Cover image root; ids are appended as `/{id}-L.jpg`
    pub covers_url: String,
    /// Path of the reading-list endpoint under `api_url`
    pub reading_list_path: String,
    /// Directory holding the durable key-value slots. `None` when the
    /// platform has no data dir and none was configured.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            covers_url: DEFAULT_COVERS_URL.to_string(),
            reading_list_path: DEFAULT_READING_LIST_PATH.to_string(),
            data_dir: dirs::data_dir().map(|d| d.join("bookhaven")),
        }
    }
}

impl Config {
    /// Load from the environment. A `.env` file in the working directory, or
    /// `BOOKHAVEN_DEV_MODE`, switches on dev mode.
    pub fn load() -> Self {
        if Self::is_dev_mode() {
            info!("Dev mode activated - loading from .env");
        }
        Self::from_env()
    }

    pub fn is_dev_mode() -> bool {
        std::env::var("BOOKHAVEN_DEV_MODE").is_ok() || dotenvy::dotenv().is_ok()
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env_non_empty("BOOKHAVEN_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            covers_url: env_non_empty("BOOKHAVEN_COVERS_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.covers_url),
            reading_list_path: env_non_empty("BOOKHAVEN_READING_LIST_PATH")
                .unwrap_or(defaults.reading_list_path),
            data_dir: env_non_empty("BOOKHAVEN_DATA_DIR")
                .map(PathBuf::from)
                .or(defaults.data_dir),
        }
    }

    pub fn reading_list_url(&self) -> String {
        let path = self.reading_list_path.trim_start_matches('/');
        format!("{}/{}", self.api_url, path)
    }

    pub fn work_url(&self, id: &str) -> String {
        format!("{}/works/{}.json", self.api_url, id)
    }

    /// The data directory, created if missing.
    pub fn ensure_data_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = self.data_dir.clone().ok_or(ConfigError::NoDataDir)?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(api_url: &str) -> Config {
        Config {
            api_url: api_url.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_endpoints() {
        let config = Config::default();
        assert_eq!(
            config.reading_list_url(),
            "https://openlibrary.org/people/mekBot/books/want-to-read.json"
        );
        assert_eq!(
            config.work_url("OL45804W"),
            "https://openlibrary.org/works/OL45804W.json"
        );
    }

    #[test]
    fn test_reading_list_path_without_leading_slash() {
        let config = Config {
            reading_list_path: "people/someone/books/already-read.json".to_string(),
            ..local("http://127.0.0.1:9000")
        };
        assert_eq!(
            config.reading_list_url(),
            "http://127.0.0.1:9000/people/someone/books/already-read.json"
        );
    }

    #[test]
    fn test_ensure_data_dir_creates_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("bookhaven");
        let config = Config {
            data_dir: Some(dir.clone()),
            ..Config::default()
        };
        assert_eq!(config.ensure_data_dir().unwrap(), dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn test_ensure_data_dir_without_dir() {
        let config = Config {
            data_dir: None,
            ..Config::default()
        };
        assert!(matches!(
            config.ensure_data_dir(),
            Err(ConfigError::NoDataDir)
        ));
    }
}
