//! Observation query integration tests against the sample CSV.

mod common;

use covid_metrics::metrics::max_delta_by_country;
use covid_metrics::models::Field;
use covid_metrics::queries::{ObservationFilter, ObservationQuery};
use covid_metrics::MetricsError;

// ---------------------------------------------------------------------------
// all / list
// ---------------------------------------------------------------------------

#[test]
fn all_returns_every_row_ordered_by_country_then_date() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q.all().unwrap();
    assert_eq!(rows.len() as i64, common::SAMPLE_ROWS);
    assert_eq!(rows, common::sample_observations());
}

#[test]
fn all_parses_dates_and_counts() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q.all().unwrap();
    let first = &rows[0];
    assert_eq!(first.country, "China");
    assert_eq!(first.date, common::date("2020-01-22"));
    assert_eq!(first.confirmed, 548);
    assert_eq!(first.deaths, 17);
}

#[test]
fn list_with_positive_filter() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q
        .list(&ObservationFilter {
            positive: Some(Field::Confirmed),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 14);
    assert!(rows.iter().all(|o| o.confirmed > 0));

    let deaths = q
        .list(&ObservationFilter {
            positive: Some(Field::Deaths),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(deaths.len(), 12);
}

#[test]
fn list_with_date_window() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q
        .list(&ObservationFilter {
            date_from: Some(common::date("2020-03-01")),
            date_before: Some(common::date("2020-03-23")),
            ..Default::default()
        })
        .unwrap();

    let countries: Vec<&str> = rows.iter().map(|o| o.country.as_str()).collect();
    assert_eq!(countries, vec!["Germany", "Italy", "Italy", "Italy", "Monaco"]);
}

#[test]
fn list_with_country_set() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q
        .list(&ObservationFilter {
            countries: vec!["China".to_string(), "Monaco".to_string()],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rows.len(), 5);
}

#[test]
fn list_with_limit_and_offset() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q
        .list(&ObservationFilter {
            country: Some("China".to_string()),
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        })
        .unwrap();
    let confirmed: Vec<u64> = rows.iter().map(|o| o.confirmed).collect();
    assert_eq!(confirmed, vec![643, 920]);
}

// ---------------------------------------------------------------------------
// by_country
// ---------------------------------------------------------------------------

#[test]
fn by_country_returns_date_ascending_rows() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let rows = q.by_country("Italy").unwrap();
    assert_eq!(rows.len(), 9);
    assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn by_country_unknown_is_not_found() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let err = q.by_country("Atlantis").unwrap_err();
    assert!(matches!(err, MetricsError::NotFound(_)));
}

#[test]
fn by_country_does_not_interpolate_input() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    assert!(q.by_country("' OR '1'='1").is_err());
}

// ---------------------------------------------------------------------------
// countries / count / date_range
// ---------------------------------------------------------------------------

#[test]
fn countries_are_distinct_and_sorted() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    assert_eq!(
        q.countries().unwrap(),
        vec!["China", "Germany", "Italy", "Monaco"]
    );
}

#[test]
fn count_total_and_per_country() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    assert_eq!(q.count(None).unwrap(), common::SAMPLE_ROWS);
    assert_eq!(q.count(Some("Italy")).unwrap(), 9);
    assert_eq!(q.count(Some("Atlantis")).unwrap(), 0);
}

#[test]
fn date_range_spans_dataset() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let (first, last) = q.date_range().unwrap().unwrap();
    assert_eq!(first, common::date("2020-01-22"));
    assert_eq!(last, common::date("2020-09-01"));
}

// ---------------------------------------------------------------------------
// max_daily_delta
// ---------------------------------------------------------------------------

#[test]
fn max_daily_delta_matches_engine() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);
    let rows = q.all().unwrap();

    for field in [Field::Confirmed, Field::Deaths] {
        assert_eq!(
            q.max_daily_delta(field).unwrap(),
            max_delta_by_country(&rows, field)
        );
    }
}

#[test]
fn max_daily_delta_single_row_country_is_none() {
    let (conn, _tmp) = common::setup_sample_db();
    let q = ObservationQuery::new(&conn);

    let result = q.max_daily_delta(Field::Confirmed).unwrap();
    assert_eq!(result["Monaco"], None);
    assert_eq!(result["Germany"], Some(215746));
}
