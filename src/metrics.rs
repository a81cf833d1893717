//! Pure metric computations over observation slices and numeric series.
//!
//! Nothing here performs I/O or keeps state between calls. Arithmetic edge
//! cases (no previous day, zero denominators, empty maxima) produce `None`
//! instead of an error, so an undefined value is always distinguishable from a
//! computed zero.
//!
//! # Example
//!
//! ```rust
//! use covid_metrics::metrics::{daily_delta, normalize, rate};
//!
//! let cumulative = [10, 15, 15, 20];
//! let delta = daily_delta(&cumulative);
//! assert_eq!(delta, vec![None, Some(5), Some(0), Some(5)]);
//!
//! let pct = rate(&cumulative, &delta);
//! assert_eq!(pct[3], Some(25.0));
//!
//! let norm = normalize(&delta);
//! assert_eq!(norm, vec![None, Some(1.0), Some(0.0), Some(1.0)]);
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{MetricsError, Result};
use crate::models::{DerivedRecord, DerivedSeries, Field, Observation};

// ---------------------------------------------------------------------------
// SeriesValue
// ---------------------------------------------------------------------------

/// Numeric element of a series that can be compared and widened to `f64`.
pub trait SeriesValue: Copy + PartialOrd {
    fn to_f64(self) -> f64;

    /// `false` for values that must be skipped like a missing entry (NaN).
    fn is_defined(self) -> bool {
        true
    }
}

impl SeriesValue for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SeriesValue for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl SeriesValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn is_defined(self) -> bool {
        !self.is_nan()
    }
}

fn defined<T: SeriesValue>(value: &Option<T>) -> Option<T> {
    value.filter(|v| v.is_defined())
}

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Keep rows whose cumulative `field` is strictly positive, in input order.
pub fn filter_positive(observations: &[Observation], field: Field) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| o.value(field) > 0)
        .cloned()
        .collect()
}

/// Return the rows for one country, in input order.
///
/// Fails with [`MetricsError::NotFound`] when the country has no rows. An
/// unknown country is never reported as an empty sequence.
pub fn select_country(observations: &[Observation], country: &str) -> Result<Vec<Observation>> {
    let rows: Vec<Observation> = observations
        .iter()
        .filter(|o| o.country == country)
        .cloned()
        .collect();

    if rows.is_empty() {
        return Err(MetricsError::NotFound(format!("Country not in dataset: {}", country)));
    }
    Ok(rows)
}

/// Keep rows dated strictly before `cutoff`.
pub fn before(observations: &[Observation], cutoff: NaiveDate) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| o.date < cutoff)
        .cloned()
        .collect()
}

/// Extract one cumulative column, preserving order.
pub fn values(observations: &[Observation], field: Field) -> Vec<u64> {
    observations.iter().map(|o| o.value(field)).collect()
}

// ---------------------------------------------------------------------------
// Series arithmetic
// ---------------------------------------------------------------------------

/// Day-over-day difference of a cumulative series.
///
/// The output has the same length as the input. Position 0 is always `None`
/// since there is no prior day; position `i` is `series[i] - series[i - 1]`.
/// Differences are signed so a downward correction in the source data shows
/// up as a negative delta. A count too large for `i64` yields `None`.
pub fn daily_delta(series: &[u64]) -> Vec<Option<i64>> {
    let mut out = Vec::with_capacity(series.len());
    if series.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(series.windows(2).map(|w| signed_diff(w[1], w[0])));
    out
}

fn signed_diff(current: u64, previous: u64) -> Option<i64> {
    let current = i64::try_from(current).ok()?;
    let previous = i64::try_from(previous).ok()?;
    current.checked_sub(previous)
}

/// Delta as a percentage of the same day's cumulative count.
///
/// This is a rate relative to the existing caseload, not a growth rate
/// against the previous day. The output has `cumulative.len()` elements; a
/// position is `None` when the cumulative count is zero or the delta is
/// missing or undefined.
pub fn rate(cumulative: &[u64], delta: &[Option<i64>]) -> Vec<Option<f64>> {
    cumulative
        .iter()
        .enumerate()
        .map(|(i, &total)| {
            let d = delta.get(i).copied().flatten()?;
            if total == 0 {
                return None;
            }
            Some(d as f64 / total as f64 * 100.0)
        })
        .collect()
}

/// Maximum over the defined values of a series.
///
/// Returns `None` when the series holds no defined value, e.g. an empty
/// series or the delta of a single-day series.
pub fn max_of<T: SeriesValue>(series: &[Option<T>]) -> Option<T> {
    series
        .iter()
        .filter_map(defined)
        .fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
}

/// Prefix maximum: element `i` is the max of the defined values in `0..=i`.
pub fn running_max<T: SeriesValue>(series: &[Option<T>]) -> Vec<Option<T>> {
    series
        .iter()
        .scan(None::<T>, |acc, v| {
            if let Some(v) = defined(v) {
                *acc = match *acc {
                    Some(m) if m >= v => Some(m),
                    _ => Some(v),
                };
            }
            Some(*acc)
        })
        .collect()
}

/// Scale a series by its maximum so the peak becomes `1.0`.
///
/// If the maximum is zero or undefined every output is `None`; nothing is
/// ever divided by zero.
pub fn normalize<T: SeriesValue>(series: &[Option<T>]) -> Vec<Option<f64>> {
    let max = match max_of(series).map(SeriesValue::to_f64) {
        Some(m) if m != 0.0 => m,
        _ => return vec![None; series.len()],
    };
    series
        .iter()
        .map(|v| defined(v).map(|x| x.to_f64() / max))
        .collect()
}

// ---------------------------------------------------------------------------
// Per-country aggregates
// ---------------------------------------------------------------------------

/// Largest daily delta of `field` for every distinct country.
///
/// Each country's values are taken in input order. A country with a single
/// row maps to `None`.
pub fn max_delta_by_country(
    observations: &[Observation],
    field: Field,
) -> BTreeMap<String, Option<i64>> {
    let mut grouped: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for o in observations {
        grouped.entry(o.country.as_str()).or_default().push(o.value(field));
    }

    grouped
        .into_iter()
        .map(|(country, series)| (country.to_string(), max_of(&daily_delta(&series))))
        .collect()
}

/// Build the full derived series (delta, rate, normalized) for one country.
///
/// # Arguments
///
/// * `observations` - Rows for any number of countries, date-ascending per country.
/// * `country` - Country to derive; must be present.
/// * `field` - Cumulative column to derive from.
pub fn derive_series(
    observations: &[Observation],
    country: &str,
    field: Field,
) -> Result<DerivedSeries> {
    let rows = select_country(observations, country)?;
    let cumulative = values(&rows, field);
    let delta = daily_delta(&cumulative);
    let rate_percent = rate(&cumulative, &delta);
    let normalized = normalize(&delta);

    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| DerivedRecord {
            date: row.date,
            cumulative: cumulative[i],
            delta: delta[i],
            rate_percent: rate_percent[i],
            normalized: normalized[i],
        })
        .collect();

    Ok(DerivedSeries {
        country: country.to_string(),
        field,
        records,
    })
}
