#![allow(dead_code)]

use oxide_datasource::prelude::*;
use sqlx::sqlite::SqlitePoolOptions;

pub type SqliteDatasource = Datasource<SqliteTransport, SqliteDialect>;

pub async fn sqlite_datasource() -> SqliteDatasource {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    Datasource::new(SqliteTransport::new(pool), SqliteDialect::new())
}

pub async fn exec(ds: &SqliteDatasource, sql: &str) {
    ds.transport()
        .run_statement(sql.to_string(), vec![])
        .await
        .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e:?}"));
}

pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub fn people() -> ModelDefinition {
    ModelDefinition::new("people").with_schema(
        DeclaredSchema::new()
            .field("name", "string")
            .field("age", "number")
            .field("active", "boolean")
            .field("born", "date"),
    )
}
