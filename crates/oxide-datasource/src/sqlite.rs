//! SQLite transport over a sqlx pool.

use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Column, Decode, Row, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::{DatasourceError, Result};
use crate::transport::{Transport, WriteAck};
use crate::value::{Record, Value};

/// Runs statements against a SQLite pool.
///
/// SQLite reports only the number of affected rows for an INSERT, so every
/// write acknowledgment is [`WriteAck::Affected`].
#[derive(Debug, Clone)]
pub struct SqliteTransport {
    pool: SqlitePool,
}

impl SqliteTransport {
    /// Creates a transport over an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl Transport for SqliteTransport {
    fn run_statement(&self, sql: String, values: Vec<Value>) -> BoxFuture<'_, Result<WriteAck>> {
        async move {
            debug!(sql = %sql, params = values.len(), "Executing statement");
            let mut query = sqlx::query(&sql);
            for value in values {
                query = bind_param(query, value);
            }
            let result = query
                .execute(&self.pool)
                .await
                .map_err(DatasourceError::from_driver)?;
            Ok(WriteAck::Affected(result.rows_affected()))
        }
        .boxed()
    }

    fn run_query(&self, sql: String, values: Vec<Value>) -> BoxFuture<'_, Result<Vec<Record>>> {
        async move {
            debug!(sql = %sql, params = values.len(), "Executing query");
            let mut query = sqlx::query(&sql);
            for value in values {
                query = bind_param(query, value);
            }
            let rows = query
                .fetch_all(&self.pool)
                .await
                .map_err(DatasourceError::from_driver)?;
            rows.iter().map(decode_row).collect()
        }
        .boxed()
    }
}

/// Binds a value parameter to a raw query.
fn bind_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(Option::<i64>::None),
        Value::Bool(b) => query.bind(b),
        Value::Int(i) => query.bind(i),
        Value::Float(f) => query.bind(f),
        Value::Text(s) => query.bind(s),
        Value::Blob(b) => query.bind(b),
    }
}

/// Decodes a row by the storage class of each value.
fn decode_row(row: &SqliteRow) -> Result<Record> {
    let mut record = Record::new();
    for column in row.columns() {
        let raw = row
            .try_get_raw(column.ordinal())
            .map_err(DatasourceError::from_driver)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => Value::Int(decode(raw)?),
                "REAL" => Value::Float(decode(raw)?),
                "BLOB" => Value::Blob(decode(raw)?),
                _ => Value::Text(decode(raw)?),
            }
        };
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode<'r, T: Decode<'r, Sqlite>>(raw: sqlx::sqlite::SqliteValueRef<'r>) -> Result<T> {
    T::decode(raw).map_err(|e| DatasourceError::Database(sqlx::Error::Decode(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_transport() -> SqliteTransport {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        SqliteTransport::new(pool)
    }

    #[tokio::test]
    async fn test_statement_reports_affected_rows() {
        let transport = create_test_transport().await;
        transport
            .run_statement("CREATE TABLE t (a TEXT, b INTEGER)".to_string(), vec![])
            .await
            .unwrap();
        let ack = transport
            .run_statement(
                "INSERT INTO t (a, b) VALUES (?, ?)".to_string(),
                vec![Value::Text("x".to_string()), Value::Int(3)],
            )
            .await
            .unwrap();
        assert_eq!(ack, WriteAck::Affected(1));
    }

    #[tokio::test]
    async fn test_query_decodes_storage_classes() {
        let transport = create_test_transport().await;
        let rows = transport
            .run_query(
                "SELECT 1 AS i, 2.5 AS f, 'txt' AS s, NULL AS n, x'0102' AS b".to_string(),
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["i"], Value::Int(1));
        assert_eq!(row["f"], Value::Float(2.5));
        assert_eq!(row["s"], Value::Text("txt".to_string()));
        assert_eq!(row["n"], Value::Null);
        assert_eq!(row["b"], Value::Blob(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_bad_sql_is_database_error() {
        let transport = create_test_transport().await;
        let err = transport
            .run_query("SELEC nonsense".to_string(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, DatasourceError::Database(_)));
    }
}
