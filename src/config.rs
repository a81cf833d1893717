use std::time::Duration;

use chrono::NaiveDate;

use crate::models::LockdownEvent;

/// Country-level aggregate of the Johns Hopkins data, one row per (country, date).
pub const DATASET_URL: &str =
    "https://raw.githubusercontent.com/datasets/covid-19/master/data/countries-aggregated.csv";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Name of the DuckDB table the dataset is loaded into.
pub const OBSERVATIONS_TABLE: &str = "observations";

/// Rows on or after this date are dropped from lockdown timelines.
pub const DEFAULT_CUTOFF: NaiveDate = ymd(2020, 9, 1);

/// Italy's national lockdown.
pub const ITALY_LOCKDOWN_START: NaiveDate = ymd(2020, 3, 9);

/// Germany's lockdown.
pub const GERMANY_LOCKDOWN_START: NaiveDate = ymd(2020, 3, 23);

pub fn default_cutoff() -> NaiveDate {
    DEFAULT_CUTOFF
}

pub fn italy_lockdown() -> LockdownEvent {
    LockdownEvent::new("Italy", ITALY_LOCKDOWN_START)
}

pub fn germany_lockdown() -> LockdownEvent {
    LockdownEvent::new("Germany", GERMANY_LOCKDOWN_START)
}

pub fn default_lockdowns() -> Vec<LockdownEvent> {
    vec![italy_lockdown(), germany_lockdown()]
}

// Only called in const context, so an invalid literal fails the build.
const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}
