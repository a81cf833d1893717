//! DuckDB connection wrapper with lazy dataset loading and query execution.
//!
//! The dataset CSV is loaded into an in-memory table on first use, with its
//! columns normalized to `country VARCHAR, date DATE, confirmed BIGINT,
//! deaths BIGINT` regardless of how the file spells or orders them.

use crate::config::OBSERVATIONS_TABLE;
use crate::error::{MetricsError, Result};
use crate::source::DatasetSource;
use chrono::NaiveDate;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Wraps a DuckDB connection and loads the dataset as a table on demand.
pub struct Connection {
    conn: DuckDbConnection,
    /// The source used to locate or download the dataset.
    pub source: RefCell<DatasetSource>,
    registered_tables: RefCell<HashSet<String>>,
}

impl Connection {
    /// Create a connection backed by the given dataset source.
    ///
    /// Opens an in-memory DuckDB database. Nothing is read until the first
    /// query.
    pub fn new(source: DatasetSource) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            source: RefCell::new(source),
            registered_tables: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure the `observations` table is loaded, fetching the dataset if needed.
    pub fn ensure_observations(&self) -> Result<()> {
        if self.has_table(OBSERVATIONS_TABLE) {
            return Ok(());
        }
        let path = self.source.borrow_mut().ensure_local()?;
        self.register_csv(OBSERVATIONS_TABLE, &path)
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// DATE columns come back as `YYYY-MM-DD` strings.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let column_names: Vec<String> = rows
            .as_ref()
            .map(|s| {
                s.column_names()
                    .into_iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<String>>()
            })
            .ok_or_else(|| MetricsError::InvalidArgument("statement has no result set".into()))?;
        let column_count = column_names.len();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        tracing::debug!(rows = out.len(), "query executed");
        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Create a DuckDB table from a dataset CSV file.
    ///
    /// The file must have `Country`, `Date`, `Confirmed` and `Deaths` columns;
    /// any others are ignored. Rows are stored ordered by country, then date.
    pub fn register_csv(&self, table_name: &str, csv_path: &Path) -> Result<()> {
        // Forward slashes and doubled quotes for the DuckDB string literal
        let path_str = csv_path
            .to_string_lossy()
            .replace('\\', "/")
            .replace('\'', "''");

        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {table} AS \
             SELECT CAST(\"Country\" AS VARCHAR) AS country, \
                    CAST(\"Date\" AS DATE) AS date, \
                    CAST(\"Confirmed\" AS BIGINT) AS confirmed, \
                    CAST(\"Deaths\" AS BIGINT) AS deaths \
             FROM read_csv_auto('{path}', header = true) \
             ORDER BY country, date",
            table = table_name,
            path = path_str
        ))?;
        self.registered_tables.borrow_mut().insert(table_name.to_string());
        tracing::info!(table = table_name, path = %csv_path.display(), "registered dataset table");

        Ok(())
    }

    /// Check whether a table has been registered.
    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.borrow().contains(name)
    }

    /// Return a list of all registered table names.
    pub fn tables(&self) -> Vec<String> {
        self.registered_tables.borrow().iter().cloned().collect()
    }

    /// Forget registered tables so they are reloaded on next access.
    pub fn reset_tables(&self) {
        self.registered_tables.borrow_mut().clear();
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        ValueRef::Date32(days) => date_from_epoch_days(days)
            .map(|d| serde_json::Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(serde_json::Value::Null),
        _ => serde_json::Value::Null,
    }
}

/// DuckDB stores DATE as days since 1970-01-01.
fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
}
