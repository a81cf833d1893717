use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config;

pub const LOCKDOWN_START_LABEL: &str = "Lockdown Start";
pub const LOCKDOWN_FOLLOW_UP_LABEL: &str = "Lockdown +1 Month";

// ---------------------------------------------------------------------------
// LockdownEvent — A country's lockdown and the window to inspect around it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockdownEvent {
    pub country: String,
    pub start: NaiveDate,
    pub follow_up: NaiveDate,
    /// Rows dated on or after this day are excluded.
    pub cutoff: NaiveDate,
}

impl LockdownEvent {
    /// Event starting at `start`, followed up one calendar month later, cut
    /// off at [`config::default_cutoff`].
    ///
    /// The follow-up saturates at [`NaiveDate::MAX`] when `start` is within a
    /// month of the end of the representable calendar.
    pub fn new(country: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            country: country.into(),
            start,
            follow_up: start
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
            cutoff: config::default_cutoff(),
        }
    }

    pub fn with_follow_up(mut self, follow_up: NaiveDate) -> Self {
        self.follow_up = follow_up;
        self
    }

    pub fn with_cutoff(mut self, cutoff: NaiveDate) -> Self {
        self.cutoff = cutoff;
        self
    }
}

// ---------------------------------------------------------------------------
// Timeline output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub new_infections: Option<i64>,
    pub new_deaths: Option<i64>,
    pub infections_normalized: Option<f64>,
    pub deaths_normalized: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub date: NaiveDate,
    pub label: String,
}

/// Daily new infections and deaths around a lockdown, raw and max-normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockdownTimeline {
    pub country: String,
    pub points: Vec<TimelinePoint>,
    pub peak_infections: Option<i64>,
    pub peak_deaths: Option<i64>,
    pub markers: Vec<Marker>,
}
