//! Observation queries against the DuckDB `observations` table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::OBSERVATIONS_TABLE;
use crate::error::{MetricsError, Result};
use crate::models::{Field, Observation};
use crate::sql_builder::SqlBuilder;

const OBSERVATION_COLUMNS: &[&str] = &["country", "date", "confirmed", "deaths"];

// ---------------------------------------------------------------------------
// ObservationFilter
// ---------------------------------------------------------------------------

/// Parameters for [`ObservationQuery::list`]. All filters are optional and
/// combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub country: Option<String>,
    /// Restrict to these countries. Ignored when empty.
    pub countries: Vec<String>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Exclusive upper date bound.
    pub date_before: Option<NaiveDate>,
    /// Keep only rows where this cumulative field is strictly positive.
    pub positive: Option<Field>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize)]
struct MaxDeltaRow {
    country: String,
    max_delta: Option<i64>,
}

#[derive(Deserialize)]
struct DateRangeRow {
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// ObservationQuery
// ---------------------------------------------------------------------------

/// Query interface for the per-country cumulative time series.
///
/// Every method returns rows ordered by country, then date.
pub struct ObservationQuery<'a> {
    conn: &'a crate::connection::Connection,
}

impl<'a> ObservationQuery<'a> {
    /// Create a new `ObservationQuery` bound to the given connection.
    pub fn new(conn: &'a crate::connection::Connection) -> Self {
        Self { conn }
    }

    /// Every observation in the dataset.
    pub fn all(&self) -> Result<Vec<Observation>> {
        self.list(&ObservationFilter::default())
    }

    /// Observations matching `filter`.
    pub fn list(&self, filter: &ObservationFilter) -> Result<Vec<Observation>> {
        self.conn.ensure_observations()?;

        let mut qb = SqlBuilder::new(OBSERVATIONS_TABLE);
        qb.select(OBSERVATION_COLUMNS);
        qb.order_by(&["country ASC", "date ASC"]);

        if let Some(ref country) = filter.country {
            qb.where_eq("country", country);
        }

        if !filter.countries.is_empty() {
            let names: Vec<&str> = filter.countries.iter().map(String::as_str).collect();
            qb.where_in("country", &names);
        }

        if let Some(from) = filter.date_from {
            qb.where_date_gte("date", &from.to_string());
        }

        if let Some(before) = filter.date_before {
            qb.where_date_lt("date", &before.to_string());
        }

        if let Some(field) = filter.positive {
            qb.where_positive(field.column());
        }

        if let Some(l) = filter.limit {
            qb.limit(l);
        }
        if let Some(o) = filter.offset {
            qb.offset(o);
        }

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Observations for a single country.
    ///
    /// Fails with [`MetricsError::NotFound`] when the country has no rows,
    /// matching [`crate::metrics::select_country`].
    pub fn by_country(&self, country: &str) -> Result<Vec<Observation>> {
        let rows = self.list(&ObservationFilter {
            country: Some(country.to_string()),
            ..Default::default()
        })?;
        if rows.is_empty() {
            return Err(MetricsError::NotFound(format!("Country not in dataset: {}", country)));
        }
        Ok(rows)
    }

    /// Distinct country names, sorted.
    pub fn countries(&self) -> Result<Vec<String>> {
        self.conn.ensure_observations()?;

        let (sql, params) = SqlBuilder::new(OBSERVATIONS_TABLE)
            .select(&["country"])
            .distinct()
            .order_by(&["country ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(rows
            .iter()
            .filter_map(|r| r.get("country").and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    /// Count observations, optionally for one country.
    pub fn count(&self, country: Option<&str>) -> Result<i64> {
        self.conn.ensure_observations()?;

        let mut qb = SqlBuilder::new(OBSERVATIONS_TABLE);
        qb.select(&["COUNT(*) AS cnt"]);

        if let Some(c) = country {
            qb.where_eq("country", c);
        }

        let (sql, params) = qb.build();
        let cnt = self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        Ok(cnt)
    }

    /// First and last date in the dataset, or `None` when it is empty.
    pub fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        self.conn.ensure_observations()?;

        let (sql, params) = SqlBuilder::new(OBSERVATIONS_TABLE)
            .select(&["MIN(date) AS first_date", "MAX(date) AS last_date"])
            .build();

        let rows: Vec<DateRangeRow> = self.conn.execute_into(&sql, &params)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| Some((r.first_date?, r.last_date?))))
    }

    /// Largest day-over-day increase of `field` per country, computed in SQL.
    ///
    /// Uses a `LAG` window partitioned by country and ordered by date, so it
    /// agrees with [`crate::metrics::max_delta_by_country`] over [`all`](Self::all).
    /// Countries with a single row map to `None`.
    pub fn max_daily_delta(&self, field: Field) -> Result<BTreeMap<String, Option<i64>>> {
        self.conn.ensure_observations()?;

        let deltas = format!(
            "(SELECT country, {col} - LAG({col}) OVER (PARTITION BY country ORDER BY date) AS delta FROM {table})",
            col = field.column(),
            table = OBSERVATIONS_TABLE
        );
        let (sql, params) = SqlBuilder::new(&deltas)
            .select(&["country", "MAX(delta) AS max_delta"])
            .group_by(&["country"])
            .order_by(&["country ASC"])
            .build();

        let rows: Vec<MaxDeltaRow> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().map(|r| (r.country, r.max_delta)).collect())
    }
}
