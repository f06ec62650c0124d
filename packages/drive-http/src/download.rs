//! Downloads of publicly shared files, no API credentials needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::{Client, Response};
use reqwest::header::SET_COOKIE;
use url::Url;

use crate::error::Error;
use crate::locator;

pub const DEFAULT_DOWNLOAD_BASE: &str = "https://drive.google.com/";

/// Where downloaded content is cached, keyed by file id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Disabled,
    /// `<user cache dir>/drivefs/cached`
    Default,
    Dir(PathBuf),
}

/// What to do with downloaded content besides returning it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocalOutput {
    /// Return the bytes.
    #[default]
    None,
    /// Return a path to a file holding the bytes: the cache file when the
    /// content came from the cache, otherwise a new temporary file.
    Temp,
    /// Write the bytes to this path, creating parent directories, and
    /// return the bytes.
    Path(PathBuf),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    pub local: LocalOutput,
    pub cache: CacheMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Downloaded {
    Bytes(Bytes),
    File(PathBuf),
}

/// The default cache directory, if the platform has one.
pub fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("drivefs").join("cached"))
}

/// One-shot downloader for public Drive links.
pub struct Downloader {
    client: Client,
    base: Url,
}

impl Downloader {
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Self::with_client(client, DEFAULT_DOWNLOAD_BASE)
    }

    pub fn with_client(client: Client, base: &str) -> Result<Self, Error> {
        let base = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{}/", base))?
        };
        Ok(Self { client, base })
    }

    /// Download the file behind a shared link.
    ///
    /// ```ignore
    /// use drivefs_http::download::{Downloader, DownloadOptions, CacheMode};
    ///
    /// let downloader = Downloader::new()?;
    /// let options = DownloadOptions { cache: CacheMode::Default, ..Default::default() };
    /// let content = downloader.get_bytes("https://drive.google.com/file/d/ID/view", &options)?;
    /// ```
    pub fn get_bytes(&self, url: &str, options: &DownloadOptions) -> Result<Downloaded, Error> {
        let file_id = locator::extract_file_id(url)
            .filter(|id| locator::is_bare_id(id))
            .ok_or_else(|| Error::InvalidUrl {
                message: format!("Could not extract file ID from URL: {}", url),
            })?;

        let cache_dir = resolve_cache_dir(&options.cache)?;
        if let Some(dir) = &cache_dir {
            let cached = dir.join(file_id);
            if cached.exists() {
                tracing::debug!(file_id, path = %cached.display(), "cache hit");
                let content = Bytes::from(fs::read(&cached)?);
                return finish(content, &options.local, Some(&cached));
            }
        }

        let content = self.fetch(file_id)?;

        if let Some(dir) = &cache_dir {
            let cached = dir.join(file_id);
            tracing::debug!(file_id, path = %cached.display(), "caching download");
            fs::write(&cached, &content)?;
        }

        finish(content, &options.local, None)
    }

    fn fetch(&self, file_id: &str) -> Result<Bytes, Error> {
        let url = self.base.join("uc")?;
        let params = [("export", "download"), ("id", file_id)];

        let response = self.client.get(url.clone()).query(&params).send()?;
        let mut status = response.status();
        let confirm = download_warning_cookie(&response);
        let mut content = response.bytes()?;

        // large files get an interstitial page instead of the content
        if looks_like_warning(&content) {
            if let Some(confirm) = confirm {
                tracing::debug!(file_id, "confirming large-file download");
                let response = self
                    .client
                    .get(url)
                    .query(&params)
                    .query(&[("confirm", confirm.as_str())])
                    .send()?;
                status = response.status();
                content = response.bytes()?;
            }
        }

        if status.as_u16() != 200 {
            return Err(Error::Status {
                status: status.as_u16(),
                message: format!("Download failed for {}", file_id),
            });
        }

        Ok(content)
    }
}

fn resolve_cache_dir(mode: &CacheMode) -> Result<Option<PathBuf>, Error> {
    let dir = match mode {
        CacheMode::Disabled => return Ok(None),
        CacheMode::Default => default_cache_dir().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no cache directory on this platform",
            ))
        })?,
        CacheMode::Dir(dir) => dir.clone(),
    };
    fs::create_dir_all(&dir)?;
    Ok(Some(dir))
}

fn looks_like_warning(content: &[u8]) -> bool {
    let text = String::from_utf8_lossy(content);
    text.contains("download_warning") || text.to_lowercase().contains("virus")
}

/// Value of the first `download_warning*` cookie set by the response.
fn download_warning_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim().starts_with("download_warning"))
        .map(|(_, value)| value.trim().to_string())
}

fn finish(content: Bytes, local: &LocalOutput, cached: Option<&Path>) -> Result<Downloaded, Error> {
    match local {
        LocalOutput::None => Ok(Downloaded::Bytes(content)),
        LocalOutput::Temp => {
            if let Some(cached) = cached {
                return Ok(Downloaded::File(cached.to_path_buf()));
            }
            let file = tempfile::NamedTempFile::new()?;
            fs::write(file.path(), &content)?;
            let (_, path) = file.keep().map_err(|e| Error::Io(e.error))?;
            Ok(Downloaded::File(path))
        }
        LocalOutput::Path(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &content)?;
            Ok(Downloaded::Bytes(content))
        }
    }
}
