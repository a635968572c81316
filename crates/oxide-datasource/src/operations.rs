//! Additive schema operations.
//!
//! Reconciliation only ever creates tables and adds columns. Renames, drops
//! and type changes are not expressible here.

/// A single DDL operation emitted by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOperation {
    /// Create a table holding only its primary key column, if absent.
    CreateTable {
        /// Table name.
        table: String,
        /// Primary key column.
        primary_key: String,
    },

    /// Add a column to an existing table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Column type, already mapped for the dialect.
        sql_type: String,
    },
}

impl SchemaOperation {
    /// Creates a `CreateTable` operation.
    #[must_use]
    pub fn create_table(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self::CreateTable {
            table: table.into(),
            primary_key: primary_key.into(),
        }
    }

    /// Creates an `AddColumn` operation.
    #[must_use]
    pub fn add_column(
        table: impl Into<String>,
        column: impl Into<String>,
        sql_type: impl Into<String>,
    ) -> Self {
        Self::AddColumn {
            table: table.into(),
            column: column.into(),
            sql_type: sql_type.into(),
        }
    }
}
