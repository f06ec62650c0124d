use std::path::PathBuf;

use drivefs_tree_store::Error as StoreError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credentials error ({}): {message}", path.display())]
    Credentials { path: PathBuf, message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("Response is missing field '{field}'")]
    MissingField { field: &'static str },
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidUrl { .. } | Error::UrlParse(_) => StoreError::InvalidInput {
                message: error.to_string(),
            },
            Error::Credentials { .. } | Error::TokenRefresh { .. } => {
                StoreError::BackendUnavailable {
                    message: error.to_string(),
                }
            }
            _ => StoreError::Transport {
                message: error.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_transport() {
        let e: StoreError = Error::Status {
            status: 403,
            message: "quota exceeded".to_string(),
        }
        .into();
        assert_eq!(
            e,
            StoreError::Transport {
                message: "HTTP 403: quota exceeded".to_string()
            }
        );
    }

    #[test]
    fn invalid_url_maps_to_invalid_input() {
        let e: StoreError = Error::InvalidUrl {
            message: "no folder id".to_string(),
        }
        .into();
        assert!(e.is_invalid_input());
    }

    #[test]
    fn credentials_map_to_backend_unavailable() {
        let e: StoreError = Error::Credentials {
            path: PathBuf::from("client_secrets.json"),
            message: "missing".to_string(),
        }
        .into();
        assert!(matches!(e, StoreError::BackendUnavailable { .. }));
        assert!(e.to_string().contains("client_secrets.json"));
    }
}
