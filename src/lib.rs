//! COVID-19 country time series metrics for Rust.
//!
//! Loads the per-country cumulative case and death counts (by default the
//! public `countries-aggregated.csv` dataset) into an in-process DuckDB
//! database and derives day-over-day deltas, caseload-relative rates,
//! maxima and max-normalized series for charting.
//!
//! The [`metrics`] and [`timeline`] modules are pure functions over
//! [`Observation`](models::Observation) slices and can be used without a
//! client at all.
//!
//! # Quick start
//!
//! ```no_run
//! use covid_metrics::models::{Field, Metric};
//! use covid_metrics::CovidMetrics;
//!
//! let client = CovidMetrics::builder().build().unwrap();
//!
//! // Daily new cases for one country, as (date, value) pairs
//! let series = client.series("Italy", Field::Confirmed).unwrap();
//! let points = series.points(Metric::Delta);
//!
//! // Largest daily increase for every country
//! let peaks = client.max_daily_by_country(Field::Confirmed).unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod models;
pub mod queries;
pub mod source;
pub mod sql_builder;
pub mod timeline;

#[cfg(feature = "async")]
pub use async_client::AsyncCovidMetrics;
pub use connection::Connection;
pub use error::{MetricsError, Result};
pub use source::{DatasetLocation, DatasetSource};
pub use sql_builder::SqlBuilder;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use models::{DerivedSeries, Field, LockdownEvent, LockdownTimeline};

// ---------------------------------------------------------------------------
// CovidMetricsBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CovidMetrics`] client.
pub struct CovidMetricsBuilder {
    location: DatasetLocation,
    timeout: Duration,
}

impl Default for CovidMetricsBuilder {
    fn default() -> Self {
        Self {
            location: DatasetLocation::default(),
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl CovidMetricsBuilder {
    /// Download the dataset from `url` instead of [`config::DATASET_URL`].
    pub fn dataset_url(mut self, url: &str) -> Self {
        self.location = DatasetLocation::Url(url.to_string());
        self
    }

    /// Read the dataset from a local CSV file. Nothing is downloaded.
    pub fn dataset_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.location = DatasetLocation::File(path.as_ref().to_path_buf());
        self
    }

    /// Set the HTTP request timeout for the dataset download.
    ///
    /// Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client and open the DuckDB connection.
    ///
    /// The dataset is **not** read here; it is loaded lazily on first query.
    pub fn build(self) -> Result<CovidMetrics> {
        let source = DatasetSource::new(self.location, self.timeout);
        let conn = Connection::new(source)?;
        Ok(CovidMetrics::from_connection(conn))
    }
}

// ---------------------------------------------------------------------------
// CovidMetrics
// ---------------------------------------------------------------------------

/// Main entry point: owns the [`Connection`] and combines queries with the
/// metric functions.
///
/// Created via [`CovidMetrics::builder()`].
pub struct CovidMetrics {
    conn: Connection,
}

impl CovidMetrics {
    pub fn builder() -> CovidMetricsBuilder {
        CovidMetricsBuilder::default()
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Access the observation query interface.
    pub fn observations(&self) -> queries::ObservationQuery<'_> {
        queries::ObservationQuery::new(&self.conn)
    }

    /// Derived series (delta, rate, normalized) of `field` for one country.
    ///
    /// The series starts at the country's first confirmed case, so the first
    /// delta is always undefined. Fails with [`MetricsError::NotFound`] for an
    /// unknown country and [`MetricsError::EmptyInput`] for a country that
    /// never reported a case.
    pub fn series(&self, country: &str, field: Field) -> Result<DerivedSeries> {
        let rows = self.outbreak_rows(country)?;
        metrics::derive_series(&rows, country, field)
    }

    /// Largest daily increase of `field` for every country in the dataset.
    ///
    /// Days before a country's first confirmed case are skipped, so the
    /// summary starts where the outbreak does.
    pub fn max_daily_by_country(&self, field: Field) -> Result<BTreeMap<String, Option<i64>>> {
        let rows = self.observations().all()?;
        let positive = metrics::filter_positive(&rows, Field::Confirmed);
        Ok(metrics::max_delta_by_country(&positive, field))
    }

    /// Daily new infections and deaths around a lockdown, starting at the
    /// country's first confirmed case.
    pub fn lockdown_timeline(&self, event: &LockdownEvent) -> Result<LockdownTimeline> {
        let rows = self.outbreak_rows(&event.country)?;
        timeline::lockdown_timeline(&rows, event)
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Loads the dataset first so the `observations` table is available.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.ensure_observations()?;
        self.conn.execute(query, params)
    }

    /// Drop the loaded table and any downloaded copy; the next query reads
    /// the dataset again.
    pub fn reload(&self) {
        let mut source = self.conn.source.borrow_mut();
        if source.is_downloaded() {
            tracing::info!("discarding downloaded dataset");
        }
        source.clear();
        drop(source);
        self.conn.reset_tables();
        tracing::info!("dataset will be reloaded on next query");
    }

    /// Rows of one country from its first confirmed case on.
    fn outbreak_rows(&self, country: &str) -> Result<Vec<models::Observation>> {
        let rows = self.observations().by_country(country)?;
        let positive = metrics::filter_positive(&rows, Field::Confirmed);
        if positive.is_empty() {
            return Err(MetricsError::EmptyInput(format!(
                "No confirmed cases for {}",
                country
            )));
        }
        Ok(positive)
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for CovidMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.conn.source.borrow();
        let location = match &source.location {
            DatasetLocation::Url(url) => url.clone(),
            DatasetLocation::File(path) => path.display().to_string(),
        };
        write!(
            f,
            "CovidMetrics(dataset={}, tables=[{}])",
            location,
            self.conn.tables().join(", ")
        )
    }
}
