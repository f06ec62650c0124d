//! # drivefs-http
//!
//! Google Drive backend for `drivefs-tree-store`.
//!
//! - [`DriveClient`]: a `TreeClient` over the Drive v3 REST API
//! - [`auth`]: OAuth2 credential file loading and token refresh
//! - [`download`]: public-link downloads with an optional disk cache
//! - [`locator`]: file and folder id extraction from Drive links
//!
//! ## Opening a store
//!
//! ```ignore
//! use drivefs_http::{open_store, DriveConfig};
//! use drivefs_tree_store::{PathReader, PathWriter, StoreConfig};
//!
//! let config = DriveConfig::new(StoreConfig::new(
//!     "https://drive.google.com/drive/folders/FOLDER_ID",
//! ));
//! let mut store = open_store(&config)?;
//!
//! store.write("dir/file.txt", b"Nested".into())?;
//! let content = store.read("dir/file.txt")?;
//! store.delete("dir/file.txt")?;
//! ```

pub mod auth;
pub mod download;
pub mod error;
pub mod locator;
pub mod types;

mod client;

use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use drivefs_tree_store::{DriveReader, DriveStore, Error as StoreError, StoreConfig};

pub use client::{DriveClient, DEFAULT_API_BASE};
pub use download::{CacheMode, DownloadOptions, Downloaded, Downloader, LocalOutput};
pub use error::Error;

fn default_credentials_file() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Everything needed to open a store on a Drive folder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveConfig {
    #[serde(flatten)]
    pub store: StoreConfig,

    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DriveConfig {
    pub fn new(store: StoreConfig) -> Self {
        Self {
            store,
            credentials_file: default_credentials_file(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = path.into();
        self
    }
}

/// Authenticate and build a [`DriveClient`].
///
/// Any failure is reported as `BackendUnavailable`, before the store is
/// ever used.
pub fn connect(config: &DriveConfig) -> Result<DriveClient, StoreError> {
    let unavailable = |e: Error| StoreError::BackendUnavailable {
        message: e.to_string(),
    };

    let http = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| unavailable(e.into()))?;
    let token = auth::authorize(&config.credentials_file, &http).map_err(unavailable)?;
    DriveClient::with_client(http, &config.api_base, token).map_err(unavailable)
}

/// Open a read-only store.
pub fn open_reader(config: &DriveConfig) -> Result<DriveReader<DriveClient>, StoreError> {
    DriveReader::open(connect(config)?, &config.store)
}

/// Open a read-write store.
pub fn open_store(config: &DriveConfig) -> Result<DriveStore<DriveClient>, StoreError> {
    DriveStore::open(connect(config)?, &config.store)
}
