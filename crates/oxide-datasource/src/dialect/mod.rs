//! Database dialect implementations.
//!
//! A dialect decides how identifiers are quoted, which column types the
//! abstract datatypes map to, how the live schema of a table is read, and
//! how pagination is spelled. Values are never rendered by a dialect; they
//! always travel as bound parameters.

mod generic;
mod mysql;
mod sqlite;

pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::compile::CompiledStatement;
use crate::datatype::{self, Datatype};
use crate::operations::SchemaOperation;

/// Trait for database-specific SQL generation.
pub trait Dialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier (table name, column name, etc.).
    ///
    /// Quote characters inside the name are doubled so the name can never
    /// leave the quoted region.
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name, self.identifier_quote())
    }

    /// Returns the column type for a declared datatype.
    fn column_type(&self, datatype: Datatype) -> &'static str {
        datatype::sql_column_type(datatype)
    }

    /// Returns the column type of the primary key created with a table.
    fn primary_key_type(&self) -> &'static str {
        "VARCHAR(24)"
    }

    /// Maps a reported column type back to a datatype.
    fn reverse_type(&self, reported: &str) -> Option<Datatype> {
        datatype::datatype_for_reported(reported)
    }

    /// Returns the statement listing a table's columns.
    ///
    /// The rows it produces must carry the column name in `name` and the
    /// reported type in `type`.
    fn introspection_query(&self, table: &str) -> CompiledStatement;

    /// Returns the LIMIT clause body to use when only an offset is given.
    ///
    /// `None` means the dialect accepts OFFSET on its own.
    fn unbounded_limit(&self) -> Option<&'static str> {
        None
    }

    /// Generates SQL for a schema operation.
    fn generate_sql(&self, operation: &SchemaOperation) -> String {
        match operation {
            SchemaOperation::CreateTable { table, primary_key } => format!(
                "CREATE TABLE IF NOT EXISTS {} ({} {} PRIMARY KEY)",
                self.quote_identifier(table),
                self.quote_identifier(primary_key),
                self.primary_key_type()
            ),
            SchemaOperation::AddColumn {
                table,
                column,
                sql_type,
            } => format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                self.quote_identifier(table),
                self.quote_identifier(column),
                sql_type
            ),
        }
    }
}

impl<D: Dialect + ?Sized> Dialect for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn identifier_quote(&self) -> char {
        (**self).identifier_quote()
    }

    fn quote_identifier(&self, name: &str) -> String {
        (**self).quote_identifier(name)
    }

    fn column_type(&self, datatype: Datatype) -> &'static str {
        (**self).column_type(datatype)
    }

    fn primary_key_type(&self) -> &'static str {
        (**self).primary_key_type()
    }

    fn reverse_type(&self, reported: &str) -> Option<Datatype> {
        (**self).reverse_type(reported)
    }

    fn introspection_query(&self, table: &str) -> CompiledStatement {
        (**self).introspection_query(table)
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        (**self).unbounded_limit()
    }

    fn generate_sql(&self, operation: &SchemaOperation) -> String {
        (**self).generate_sql(operation)
    }
}

/// Wraps `name` in `quote`, doubling any `quote` it contains.
#[must_use]
pub fn escape_identifier(name: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push(quote);
    for c in name.chars() {
        if c == quote {
            escaped.push(quote);
        }
        escaped.push(c);
    }
    escaped.push(quote);
    escaped
}

/// Reads back a quoted identifier produced by [`escape_identifier`].
///
/// Returns `None` if `quoted` is not a well-formed quoted identifier.
#[must_use]
pub fn unescape_identifier(quoted: &str, quote: char) -> Option<String> {
    let inner = quoted.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut name = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            // A lone quote inside the region would have ended it.
            if chars.next() != Some(quote) {
                return None;
            }
        }
        name.push(c);
    }
    Some(name)
}
