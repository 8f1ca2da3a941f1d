//! Configuration file discovery and generation.
//!
//! # Configuration File Format
//!
//! ```toml
//! api_key = "your-google-books-key"
//! api_base = "https://www.googleapis.com"
//! queries = ["history", "fantasy"]
//! page_size = 40
//! max_start_index = 500
//! request_timeout_secs = 15
//! politeness_delay_ms = 500
//! output_path = "books_10000_data.csv"
//!
//! [retry]
//! max_attempts = 3
//! base_backoff_secs = 2
//! ```

use std::path::{Path, PathBuf};

use super::{Config, ConfigError};

/// File name searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "book-harvest.toml";

/// Locate a configuration file.
///
/// Checks `./book-harvest.toml` first, then `<config dir>/book-harvest/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("book-harvest").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Load a `.env` file into the process environment.
///
/// Reads `path` when given, otherwise searches the working directory and its parents.
/// Variables already set in the environment win. Returns the file that was loaded.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Some(path),
        Err(err) if err.not_found() => None,
        Err(err) => {
            tracing::warn!("Ignoring unreadable .env file: {}", err);
            None
        }
    }
}

/// Write the default configuration as TOML. The API key is never written.
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let config = Config {
        api_key: None,
        ..Config::default()
    };
    let content = toml::to_string_pretty(&config)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn test_save_default_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        save_default_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("api_key"));
        assert!(content.contains("[retry]"));

        let config = load_config(&path).unwrap();
        assert_eq!(config.page_size, 40);
        assert_eq!(config.queries.len(), 20);
    }

    #[test]
    fn test_load_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "BOOK_HARVEST_TEST_DOTENV_MARKER=from-dotenv\n").unwrap();

        assert_eq!(load_env_file(Some(&path)), Some(path.clone()));
        assert_eq!(
            std::env::var("BOOK_HARVEST_TEST_DOTENV_MARKER").as_deref(),
            Ok("from-dotenv")
        );
    }

    #[test]
    fn test_load_env_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_env_file(Some(&dir.path().join(".env"))), None);
    }
}
