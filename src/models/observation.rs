use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Observation — One (country, date) row of cumulative counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub country: String,
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
}

impl Observation {
    pub fn new(country: impl Into<String>, date: NaiveDate, confirmed: u64, deaths: u64) -> Self {
        Self {
            country: country.into(),
            date,
            confirmed,
            deaths,
        }
    }

    /// Read the cumulative count named by `field`.
    pub fn value(&self, field: Field) -> u64 {
        match field {
            Field::Confirmed => self.confirmed,
            Field::Deaths => self.deaths,
        }
    }
}

// ---------------------------------------------------------------------------
// Field — Which cumulative column an operation reads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Confirmed,
    Deaths,
}

impl Field {
    /// Column name in the `observations` table.
    pub fn column(self) -> &'static str {
        match self {
            Field::Confirmed => "confirmed",
            Field::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
