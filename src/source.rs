//! Resolves the dataset to a local CSV file.
//!
//! A local path is used as-is. A URL is fetched once with a blocking HTTP GET
//! into a temporary `.csv` file that lives as long as the source. There is no
//! persistent cache and no retry: a failed download is returned to the caller.

use crate::config;
use crate::error::{MetricsError, Result};
use reqwest::blocking::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Where the dataset CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    Url(String),
    File(PathBuf),
}

impl Default for DatasetLocation {
    fn default() -> Self {
        DatasetLocation::Url(config::DATASET_URL.to_string())
    }
}

/// Resolves a [`DatasetLocation`] to a readable local file.
pub struct DatasetSource {
    /// The configured dataset location.
    pub location: DatasetLocation,
    timeout: Duration,
    client: Option<Client>,
    downloaded: Option<NamedTempFile>,
}

impl DatasetSource {
    pub fn new(location: DatasetLocation, timeout: Duration) -> Self {
        Self {
            location,
            timeout,
            client: None,
            downloaded: None,
        }
    }

    /// Source backed by an HTTP(S) URL.
    pub fn url(url: &str, timeout: Duration) -> Self {
        Self::new(DatasetLocation::Url(url.to_string()), timeout)
    }

    /// Source backed by a CSV file on disk.
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self::new(
            DatasetLocation::File(path.as_ref().to_path_buf()),
            config::DEFAULT_TIMEOUT,
        )
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| MetricsError::InvalidArgument("HTTP client unavailable".into()))
    }

    /// Return a local path to the dataset, downloading it on first call.
    ///
    /// # Returns
    ///
    /// The configured file for [`DatasetLocation::File`], or the temporary
    /// download for [`DatasetLocation::Url`].
    pub fn ensure_local(&mut self) -> Result<PathBuf> {
        match self.location.clone() {
            DatasetLocation::File(path) => {
                if !path.exists() {
                    return Err(MetricsError::NotFound(format!(
                        "Dataset file {} does not exist",
                        path.display()
                    )));
                }
                Ok(path)
            }
            DatasetLocation::Url(url) => {
                if let Some(file) = &self.downloaded {
                    return Ok(file.path().to_path_buf());
                }
                let file = self.download(&url)?;
                let path = file.path().to_path_buf();
                self.downloaded = Some(file);
                Ok(path)
            }
        }
    }

    /// Fetch `url` into a fresh temporary file.
    ///
    /// The temp file is removed automatically if anything fails before it is
    /// handed back.
    fn download(&mut self, url: &str) -> Result<NamedTempFile> {
        tracing::info!(url, "downloading dataset");

        let client = self.client()?.clone();
        let bytes = client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| {
                tracing::warn!(url, error = %e, "dataset download failed");
                MetricsError::from(e)
            })?;

        let mut file = tempfile::Builder::new()
            .prefix("covid-metrics-")
            .suffix(".csv")
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;

        tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "dataset written");
        Ok(file)
    }

    /// Whether a downloaded copy is currently held.
    pub fn is_downloaded(&self) -> bool {
        self.downloaded.is_some()
    }

    /// Drop any downloaded copy so the next [`ensure_local`](Self::ensure_local)
    /// fetches again.
    pub fn clear(&mut self) {
        self.downloaded = None;
    }
}
