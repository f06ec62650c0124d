//! OAuth2 credential file handling.
//!
//! The credentials file is a JSON document holding the OAuth client and a
//! refresh token, plus the last access token and its expiry:
//!
//! ```json
//! {
//!   "client_id": "....apps.googleusercontent.com",
//!   "client_secret": "...",
//!   "refresh_token": "...",
//!   "access_token": "...",
//!   "expires_at": "2024-05-01T12:00:00Z"
//! }
//! ```
//!
//! Obtaining the first refresh token (the interactive consent flow) is not
//! handled here.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::TokenResponse;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|e| Error::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| Error::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Whether the access token is missing or about to expire at `now`.
    ///
    /// A token without a recorded expiry is trusted.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expires_at) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(expires_at)) => {
                expires_at <= now + Duration::seconds(EXPIRY_MARGIN_SECS)
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    pub fn refresh(&mut self, http: &Client) -> Result<(), Error> {
        tracing::debug!(token_uri = %self.token_uri, "refreshing access token");
        let response = http
            .post(&self.token_uri)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::TokenRefresh {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        self.access_token = Some(token.access_token);
        self.expires_at = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        if let Some(refresh_token) = token.refresh_token {
            self.refresh_token = refresh_token;
        }
        Ok(())
    }
}

/// Load the credentials at `path`, refresh them if needed (rewriting the
/// file), and return a usable access token.
pub fn authorize(path: &Path, http: &Client) -> Result<String, Error> {
    let mut credentials = Credentials::load(path)?;

    if credentials.needs_refresh(Utc::now()) {
        credentials.refresh(http)?;
        credentials.save(path)?;
    }

    credentials
        .access_token
        .ok_or(Error::MissingField {
            field: "access_token",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
            access_token: None,
            expires_at: None,
            token_uri: default_token_uri(),
        }
    }

    #[test]
    fn missing_token_needs_refresh() {
        assert!(credentials().needs_refresh(Utc::now()));
    }

    #[test]
    fn token_without_expiry_is_trusted() {
        let mut c = credentials();
        c.access_token = Some("token".to_string());
        assert!(!c.needs_refresh(Utc::now()));
    }

    #[test]
    fn expiry_margin() {
        let now = Utc::now();
        let mut c = credentials();
        c.access_token = Some("token".to_string());

        c.expires_at = Some(now + Duration::seconds(30));
        assert!(c.needs_refresh(now));

        c.expires_at = Some(now + Duration::seconds(3600));
        assert!(!c.needs_refresh(now));
    }

    #[test]
    fn load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(
            &path,
            r#"{"client_id": "a", "client_secret": "b", "refresh_token": "c"}"#,
        )
        .unwrap();

        let c = Credentials::load(&path).unwrap();
        assert_eq!(c.token_uri, DEFAULT_TOKEN_URI);
        assert!(c.access_token.is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let mut c = credentials();
        c.access_token = Some("token".to_string());

        c.save(&path).unwrap();
        assert_eq!(Credentials::load(&path).unwrap(), c);
    }

    #[test]
    fn missing_file_is_a_credentials_error() {
        let err = Credentials::load(Path::new("/nonexistent/credentials.json")).unwrap_err();
        assert!(matches!(err, Error::Credentials { .. }));
    }
}
