//! Twitter credential file.
//!
//! A small JSON document read once at startup:
//!
//! ```json
//! { "bearer_token": "..." }
//! ```
//!
//! An optional `api_url` points the client at another API base.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors loading the credential file
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Failed to read credentials {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// API keys for the posting client
#[derive(Clone, Deserialize)]
pub struct TwitterCredentials {
    /// OAuth 2.0 user-context access token
    pub bearer_token: String,

    /// Override for the API base URL
    #[serde(default)]
    pub api_url: Option<String>,
}

impl fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("bearer_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Read and parse the credential file
pub fn load_credentials(path: &Path) -> Result<TwitterCredentials, CredentialsError> {
    let content = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CredentialsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_credentials() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("twitter-keys.json");
        std::fs::write(&path, r#"{"bearer_token": "abc123"}"#).unwrap();

        let credentials = load_credentials(&path).unwrap();
        assert_eq!(credentials.bearer_token, "abc123");
        assert!(credentials.api_url.is_none());
    }

    #[test]
    fn test_missing_file() {
        let result = load_credentials(Path::new("/nonexistent/twitter-keys.json"));
        assert!(matches!(result, Err(CredentialsError::Read { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("twitter-keys.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = load_credentials(&path);
        assert!(matches!(result, Err(CredentialsError::Parse { .. })));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credentials = TwitterCredentials {
            bearer_token: "secret-token".to_string(),
            api_url: None,
        };
        assert!(!format!("{:?}", credentials).contains("secret-token"));
    }
}
