//! Live schema introspection.

use tracing::debug;

use crate::datasource::Datasource;
use crate::dialect::Dialect;
use crate::error::{DatasourceError, Result};
use crate::transport::Transport;
use crate::value::{Record, Value};

/// A column as reported by the live database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveColumn {
    /// Column name.
    pub name: String,
    /// Type string as the database reports it.
    pub reported_type: String,
}

/// The columns a table currently has, in table order.
///
/// Empty when the table does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSchema {
    columns: Vec<LiveColumn>,
}

impl LiveSchema {
    /// Creates a live schema from columns.
    #[must_use]
    pub fn new(columns: Vec<LiveColumn>) -> Self {
        Self { columns }
    }

    /// Whether a column with exactly this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Returns the reported type of a column.
    #[must_use]
    pub fn reported_type(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.reported_type.as_str())
    }

    /// Iterates columns in table order.
    pub fn iter(&self) -> impl Iterator<Item = &LiveColumn> {
        self.columns.iter()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no columns were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<T: Transport, D: Dialect> Datasource<T, D> {
    /// Reads the columns `table` currently has.
    ///
    /// A missing table yields an empty schema.
    ///
    /// # Errors
    ///
    /// Surfaces transport errors unchanged, and reports rows without a
    /// textual `name`/`type` as a driver inconsistency.
    pub async fn table_info(&self, table: &str) -> Result<LiveSchema> {
        let stmt = self.dialect.introspection_query(table);
        let rows = self.transport.run_query(stmt.sql, stmt.values).await?;

        let columns = rows
            .iter()
            .map(|row| live_column(table, row))
            .collect::<Result<Vec<_>>>()?;

        debug!(table = %table, columns = columns.len(), "Introspected table");
        Ok(LiveSchema::new(columns))
    }
}

fn live_column(table: &str, row: &Record) -> Result<LiveColumn> {
    let text = |key: &str| match row.get(key) {
        Some(Value::Text(s)) => Ok(s.clone()),
        // SQLite reports an empty declared type as NULL
        Some(Value::Null) if key == "type" => Ok(String::new()),
        _ => Err(DatasourceError::DriverInconsistency {
            table: table.to_string(),
            detail: format!("introspection row has no textual '{key}' column"),
        }),
    };

    Ok(LiveColumn {
        name: text("name")?,
        reported_type: text("type")?,
    })
}
