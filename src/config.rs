//! Client configuration.
//!
//! The base URL comes from `COUNCIL_BASE_URL`, the bearer token from
//! `COUNCIL_API_TOKEN` or from the credentials file the login page writes
//! (`~/.config/council/credentials.json`). Obtaining the token in the first
//! place is the web client's concern; this client only attaches it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const BASE_URL_ENV: &str = "COUNCIL_BASE_URL";
pub const API_TOKEN_ENV: &str = "COUNCIL_API_TOKEN";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_token: Option<String>,
}

/// On-disk shape of the credentials file.
#[derive(Debug, Deserialize)]
struct StoredCredentials {
    access_token: Option<String>,
}

impl Config {
    /// Load from the environment, falling back to the credentials file for
    /// the token.
    pub fn load() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let api_token = std::env::var(API_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| credentials_path().and_then(|path| read_credentials(&path)));

        Self {
            base_url,
            api_token,
        }
    }
}

/// Default location of the credentials file.
pub fn credentials_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("council").join("credentials.json"))
}

/// Read the access token from a credentials file, if present and valid.
pub fn read_credentials(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<StoredCredentials>(&raw) {
        Ok(stored) => stored.access_token.filter(|token| !token.is_empty()),
        Err(err) => {
            warn!(path = %path.display(), %err, "unreadable credentials file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_credentials_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"access_token": "tok-123"}}"#).unwrap();
        assert_eq!(read_credentials(file.path()), Some("tok-123".to_string()));
    }

    #[test]
    fn test_read_credentials_empty_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"access_token": ""}}"#).unwrap();
        assert_eq!(read_credentials(file.path()), None);
    }

    #[test]
    fn test_read_credentials_missing_file() {
        assert_eq!(read_credentials(Path::new("/nonexistent/creds.json")), None);
    }

    #[test]
    fn test_read_credentials_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(read_credentials(file.path()), None);
    }
}
