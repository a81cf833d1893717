//! Unit tests for the SqlBuilder query construction.

use covid_metrics::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("observations").build();
    assert_eq!(sql, "SELECT *\nFROM observations");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("observations")
        .select(&["country", "date"])
        .build();
    assert!(sql.starts_with("SELECT country, date\n"));
}

#[test]
fn distinct_is_added_to_select() {
    let (sql, _) = SqlBuilder::new("observations")
        .select(&["country"])
        .distinct()
        .build();
    assert!(sql.starts_with("SELECT DISTINCT country\n"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_eq("country", "Italy")
        .build();
    assert!(sql.contains("WHERE country = ?"));
    assert_eq!(params, vec!["Italy"]);
}

#[test]
fn where_in_adds_in_clause() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_in("country", &["China", "Italy", "Germany"])
        .build();
    assert!(sql.contains("country IN (?, ?, ?)"));
    assert_eq!(params, vec!["China", "Italy", "Germany"]);
}

#[test]
fn where_in_empty_produces_false() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_in("country", &[])
        .build();
    assert!(sql.contains("WHERE FALSE"));
    assert!(params.is_empty());
}

#[test]
fn date_bounds_cast_their_parameter() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_date_gte("date", "2020-03-01")
        .where_date_lt("date", "2020-09-01")
        .build();
    assert!(sql.contains("date >= CAST(? AS DATE) AND date < CAST(? AS DATE)"));
    assert_eq!(params, vec!["2020-03-01", "2020-09-01"]);
}

#[test]
fn where_positive_takes_no_param() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_positive("confirmed")
        .build();
    assert!(sql.contains("WHERE confirmed > 0"));
    assert!(params.is_empty());
}

#[test]
fn conditions_keep_params_in_order() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_eq("country", "Italy")
        .where_date_gte("date", "2020-03-01")
        .build();
    assert!(sql.contains("WHERE country = ? AND date >= CAST(? AS DATE)"));
    assert_eq!(params, vec!["Italy", "2020-03-01"]);
}

// ---------------------------------------------------------------------------
// GROUP BY / ORDER BY / LIMIT / OFFSET
// ---------------------------------------------------------------------------

#[test]
fn group_by_and_order_by() {
    let (sql, _) = SqlBuilder::new("observations")
        .select(&["country", "MAX(confirmed) AS peak"])
        .group_by(&["country"])
        .order_by(&["peak DESC"])
        .build();
    assert!(sql.contains("GROUP BY country\nORDER BY peak DESC"));
}

#[test]
fn subquery_can_stand_in_for_table() {
    let (sql, _) = SqlBuilder::new("(SELECT country, 1 AS delta FROM observations)")
        .select(&["country", "MAX(delta) AS max_delta"])
        .group_by(&["country"])
        .build();
    assert!(sql.starts_with(
        "SELECT country, MAX(delta) AS max_delta\nFROM (SELECT country, 1 AS delta FROM observations)\nGROUP BY country"
    ));
}

#[test]
fn limit_and_offset_come_last() {
    let (sql, _) = SqlBuilder::new("observations")
        .order_by(&["country ASC", "date ASC"])
        .limit(10)
        .offset(20)
        .build();
    assert!(sql.ends_with("ORDER BY country ASC, date ASC\nLIMIT 10\nOFFSET 20"));
}

#[test]
fn values_are_never_interpolated() {
    let (sql, params) = SqlBuilder::new("observations")
        .where_eq("country", "'; DROP TABLE observations; --")
        .build();
    assert!(!sql.contains("DROP TABLE"));
    assert_eq!(params.len(), 1);
}
