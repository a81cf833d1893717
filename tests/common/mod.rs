//! Shared test fixtures for the covid-metrics integration tests.
//!
//! Provides a small CSV in the layout of `countries-aggregated.csv` (rows
//! sorted by date, with the extra `Recovered` column) and helpers that load it
//! through a file-backed [`DatasetSource`], so no test touches the network.

use chrono::NaiveDate;
use covid_metrics::models::Observation;
use covid_metrics::{Connection, CovidMetrics, DatasetSource};
use std::fs;
use std::path::{Path, PathBuf};

pub const SAMPLE_CSV: &str = "\
Date,Country,Confirmed,Recovered,Deaths
2020-01-22,China,548,28,17
2020-01-22,Italy,0,0,0
2020-01-23,China,643,30,18
2020-01-23,Italy,0,0,0
2020-01-24,China,920,36,26
2020-01-24,Italy,0,0,0
2020-01-25,China,1406,39,42
2020-01-31,Italy,2,0,0
2020-03-01,Monaco,1,0,0
2020-03-08,Italy,7375,622,366
2020-03-09,Italy,9172,724,463
2020-03-10,Italy,10149,1004,631
2020-03-22,Germany,24873,266,94
2020-03-23,Germany,29056,453,123
2020-08-31,Italy,269214,208224,35483
2020-09-01,Germany,244802,219654,9302
2020-09-01,Italy,270189,208490,35491
";

pub const SAMPLE_ROWS: i64 = 17;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Write [`SAMPLE_CSV`] into `dir` and return its path.
pub fn write_sample_csv(dir: &Path) -> PathBuf {
    let path = dir.join("countries-aggregated.csv");
    fs::write(&path, SAMPLE_CSV).unwrap();
    path
}

/// Create a `Connection` over the sample CSV with the `observations` table
/// already loaded.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = write_sample_csv(tmp_dir.path());
    let conn = Connection::new(DatasetSource::file(&path)).unwrap();
    conn.ensure_observations().unwrap();
    (conn, tmp_dir)
}

/// Create a `CovidMetrics` client reading the sample CSV lazily.
pub fn setup_client() -> (CovidMetrics, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = write_sample_csv(tmp_dir.path());
    let client = CovidMetrics::builder().dataset_path(&path).build().unwrap();
    (client, tmp_dir)
}

/// The sample data as in-memory observations, ordered by (country, date).
pub fn sample_observations() -> Vec<Observation> {
    let mut rows: Vec<Observation> = SAMPLE_CSV
        .lines()
        .skip(1)
        .map(|line| {
            let cols: Vec<&str> = line.split(',').collect();
            Observation::new(
                cols[1],
                date(cols[0]),
                cols[2].parse().unwrap(),
                cols[4].parse().unwrap(),
            )
        })
        .collect();
    rows.sort_by(|a, b| a.country.cmp(&b.country).then(a.date.cmp(&b.date)));
    rows
}

/// Observations for a single synthetic country with the given cumulative
/// confirmed counts on consecutive days from 2020-03-01.
pub fn country_series(country: &str, confirmed: &[u64]) -> Vec<Observation> {
    let start = date("2020-03-01");
    confirmed
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            Observation::new(country, start + chrono::Duration::days(i as i64), c, 0)
        })
        .collect()
}
