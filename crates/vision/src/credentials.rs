//! Vision service credentials, loaded from a JSON file.
//!
//! The file path comes from configuration (`VISION_CREDENTIALS_PATH`); the
//! file holds the API key and an optional endpoint override:
//!
//! ```json
//! { "api_key": "...", "endpoint": "https://vision.example.com/v1/images:annotate" }
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("cannot read credentials file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed credentials file {path}: {message}")]
    Malformed { path: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionCredentials {
    pub api_key: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl VisionCredentials {
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: display.clone(),
            source,
        })?;

        let credentials: VisionCredentials =
            serde_json::from_str(&raw).map_err(|e| CredentialsError::Malformed {
                path: display.clone(),
                message: e.to_string(),
            })?;

        if credentials.api_key.trim().is_empty() {
            return Err(CredentialsError::Malformed {
                path: display,
                message: "api_key is empty".to_string(),
            });
        }

        Ok(credentials)
    }
}
