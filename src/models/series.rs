use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Field;

// ---------------------------------------------------------------------------
// DerivedRecord — One day of derived metrics
// ---------------------------------------------------------------------------

/// Derived metrics for a single day. `None` marks a value that is undefined
/// (first day, zero denominator), which is distinct from a computed zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRecord {
    pub date: NaiveDate,
    pub cumulative: u64,
    pub delta: Option<i64>,
    pub rate_percent: Option<f64>,
    pub normalized: Option<f64>,
}

// ---------------------------------------------------------------------------
// Metric — Column selector for renderer output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cumulative,
    Delta,
    RatePercent,
    Normalized,
}

// ---------------------------------------------------------------------------
// DerivedSeries — Date-ordered derived metrics for one country
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    pub country: String,
    pub field: Field,
    pub records: Vec<DerivedRecord>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Project one metric as `(date, value)` pairs in date order.
    pub fn points(&self, metric: Metric) -> Vec<(NaiveDate, Option<f64>)> {
        self.records
            .iter()
            .map(|r| {
                let value = match metric {
                    Metric::Cumulative => Some(r.cumulative as f64),
                    Metric::Delta => r.delta.map(|d| d as f64),
                    Metric::RatePercent => r.rate_percent,
                    Metric::Normalized => r.normalized,
                };
                (r.date, value)
            })
            .collect()
    }

    pub fn deltas(&self) -> Vec<Option<i64>> {
        self.records.iter().map(|r| r.delta).collect()
    }
}
