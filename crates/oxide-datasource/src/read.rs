//! Query execution.

use tracing::debug;

use crate::compile::{self, CompiledStatement};
use crate::criteria::Criteria;
use crate::datasource::Datasource;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::transport::Transport;
use crate::value::Record;

impl<T: Transport, D: Dialect> Datasource<T, D> {
    /// Compiles a SELECT over `table` for this datasource's dialect.
    ///
    /// # Errors
    ///
    /// Returns a compile error if the sort specification is malformed.
    pub fn compile_select(&self, table: &str, criteria: &Criteria) -> Result<CompiledStatement> {
        compile::compile_select(&self.dialect, table, criteria)
    }

    /// Runs a compiled statement and returns its rows.
    ///
    /// # Errors
    ///
    /// Surfaces transport errors unchanged.
    pub async fn query_all(&self, stmt: CompiledStatement) -> Result<Vec<Record>> {
        let rows = self.transport.run_query(stmt.sql, stmt.values).await?;
        debug!(rows = rows.len(), "Query returned");
        Ok(rows)
    }

    /// Selects the rows of `table` matching `criteria`.
    ///
    /// # Errors
    ///
    /// See [`Self::compile_select`] and [`Self::query_all`].
    pub async fn select_rows(&self, table: &str, criteria: &Criteria) -> Result<Vec<Record>> {
        let stmt = self.compile_select(table, criteria)?;
        self.query_all(stmt).await
    }
}
