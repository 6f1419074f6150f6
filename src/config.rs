use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::BatchError;

/// The hosting service every landing page must belong to.
pub const SERVICE_ORIGIN: &str = "https://fuckingfast.co/";
/// Path prefix of direct-download links embedded in landing pages.
pub const DOWNLOAD_PATH_PREFIX: &str = "/dl/";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub origin: Url,
    pub download_prefix: String,
    pub connect_timeout: Option<Duration>,
    /// Cap on simultaneous transfers; `None` runs every transfer at once.
    pub max_transfers: Option<usize>,
}

impl ServiceConfig {
    pub fn new(origin: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            origin: Url::parse(origin)?,
            download_prefix: DOWNLOAD_PATH_PREFIX.to_string(),
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            max_transfers: None,
        })
    }

    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder.build()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(SERVICE_ORIGIN).expect("SERVICE_ORIGIN is a valid url")
    }
}

/// Picks the per-OS download directory used when no save path is given.
pub fn default_download_dir() -> Result<PathBuf, BatchError> {
    if cfg!(windows) {
        let profile = std::env::var_os("USERPROFILE")
            .ok_or_else(|| BatchError::NoDownloadDir("USERPROFILE is not set".into()))?;
        return Ok(PathBuf::from(profile).join("Downloads"));
    }

    if cfg!(target_os = "linux") {
        if let Some(dir) = std::env::var_os("XDG_DOWNLOAD_DIR").filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
    }

    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join("Downloads"))
        .ok_or_else(|| BatchError::NoDownloadDir("HOME is not set".into()))
}
