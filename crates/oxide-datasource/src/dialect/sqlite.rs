//! SQLite dialect.
//!
//! SQLite reads its live schema through the `pragma_table_info` table-valued
//! function, and refuses OFFSET without LIMIT.
//!
//! Identifiers are quoted with backticks. SQLite falls back to reading a
//! double-quoted name that matches no column as a string literal, which would
//! turn a misspelled field into a constant; a backtick-quoted name is always
//! an identifier.

use super::Dialect;
use crate::compile::CompiledStatement;
use crate::value::Value;

/// SQLite dialect.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn introspection_query(&self, table: &str) -> CompiledStatement {
        CompiledStatement::new(
            "SELECT name, type FROM pragma_table_info(?) ORDER BY cid",
            vec![Value::Text(table.to_string())],
        )
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("-1")
    }
}
