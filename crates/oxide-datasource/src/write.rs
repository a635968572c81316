//! Record insertion.

use tracing::{debug, info};

use crate::compile::{compile_insert, compile_lookup};
use crate::datasource::Datasource;
use crate::dialect::Dialect;
use crate::error::{DatasourceError, Result};
use crate::model::Model;
use crate::transport::{Transport, WriteAck};
use crate::value::Record;

impl<T: Transport, D: Dialect> Datasource<T, D> {
    /// Inserts `record` into the model's table and returns the stored row.
    ///
    /// When the driver echoes a row carrying the primary key, that row is the
    /// result. Otherwise the row is read back by the primary key value taken
    /// from `record`. The model's cache is invalidated once the insert has
    /// succeeded, before the acknowledgment is looked at.
    ///
    /// # Errors
    ///
    /// Returns a compile error for an empty record, surfaces transport errors
    /// unchanged, and reports a [`DatasourceError::DriverInconsistency`] when
    /// the stored row cannot be recovered.
    pub async fn insert_record<M: Model + ?Sized>(
        &self,
        model: &M,
        record: &Record,
    ) -> Result<Record> {
        let table = model.table();
        let primary_key = model.primary_key();

        let stmt = compile_insert(&self.dialect, table, record)?;
        let ack = self.transport.run_statement(stmt.sql, stmt.values).await?;
        model.invalidate_cache();
        info!(table = %table, "Inserted record");

        if let WriteAck::Rows(rows) = ack {
            if let Some(row) = rows.into_iter().next() {
                if row.contains_key(primary_key) {
                    return Ok(row);
                }
            }
        }

        let key = record
            .get(primary_key)
            .cloned()
            .ok_or_else(|| DatasourceError::DriverInconsistency {
                table: table.to_string(),
                detail: format!("record has no '{primary_key}' value to read the row back"),
            })?;

        debug!(table = %table, primary_key = %primary_key, "Reading inserted row back");
        let lookup = compile_lookup(&self.dialect, table, primary_key, key);
        let rows = self.transport.run_query(lookup.sql, lookup.values).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatasourceError::DriverInconsistency {
                table: table.to_string(),
                detail: "inserted row not found by primary key".to_string(),
            })
    }
}
