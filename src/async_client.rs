//! Async wrapper around [`CovidMetrics`] for use in Tokio runtimes.
//!
//! Runs every operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], since both the dataset download and the
//! DuckDB queries are blocking.
//!
//! # Example
//!
//! ```ignore
//! use covid_metrics::models::Field;
//! use covid_metrics::AsyncCovidMetrics;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AsyncCovidMetrics::builder().build().await.unwrap();
//!
//!     let peaks = client.max_daily_by_country(Field::Confirmed).await.unwrap();
//!     let italy = client.run(|c| c.series("Italy", Field::Deaths)).await.unwrap();
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config;
use crate::error::{MetricsError, Result};
use crate::models::{DerivedSeries, Field, LockdownEvent, LockdownTimeline};
use crate::CovidMetrics;

// ---------------------------------------------------------------------------
// AsyncCovidMetricsBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`AsyncCovidMetrics`] client.
pub struct AsyncCovidMetricsBuilder {
    url: Option<String>,
    path: Option<PathBuf>,
    timeout: Duration,
}

impl Default for AsyncCovidMetricsBuilder {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl AsyncCovidMetricsBuilder {
    pub fn dataset_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self.path = None;
        self
    }

    pub fn dataset_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self.url = None;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncCovidMetrics> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CovidMetrics::builder().timeout(self.timeout);
            if let Some(url) = self.url {
                builder = builder.dataset_url(&url);
            }
            if let Some(path) = self.path {
                builder = builder.dataset_path(path);
            }
            let client = builder.build()?;
            Ok(AsyncCovidMetrics {
                inner: Arc::new(Mutex::new(client)),
            })
        })
        .await
        .map_err(|e| MetricsError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCovidMetrics
// ---------------------------------------------------------------------------

/// Async wrapper around [`CovidMetrics`].
///
/// The client is guarded by a [`Mutex`] because it uses `RefCell` internally;
/// concurrent calls are serialized.
pub struct AsyncCovidMetrics {
    inner: Arc<Mutex<CovidMetrics>>,
}

impl AsyncCovidMetrics {
    pub fn builder() -> AsyncCovidMetricsBuilder {
        AsyncCovidMetricsBuilder::default()
    }

    /// Run a sync client operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CovidMetrics) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = client
                .lock()
                .map_err(|_| MetricsError::InvalidArgument("client lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| MetricsError::InvalidArgument(format!("Task join error: {e}")))?
    }

    pub async fn series(&self, country: &str, field: Field) -> Result<DerivedSeries> {
        let country = country.to_string();
        self.run(move |c| c.series(&country, field)).await
    }

    pub async fn max_daily_by_country(&self, field: Field) -> Result<BTreeMap<String, Option<i64>>> {
        self.run(move |c| c.max_daily_by_country(field)).await
    }

    pub async fn lockdown_timeline(&self, event: LockdownEvent) -> Result<LockdownTimeline> {
        self.run(move |c| c.lockdown_timeline(&event)).await
    }

    pub async fn countries(&self) -> Result<Vec<String>> {
        self.run(|c| c.observations().countries()).await
    }
}
