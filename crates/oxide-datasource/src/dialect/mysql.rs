//! MySQL dialect.

use super::Dialect;
use crate::compile::CompiledStatement;
use crate::datatype::{self, Datatype};
use crate::value::Value;

/// MySQL dialect: backtick identifiers and `information_schema` introspection.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn reverse_type(&self, reported: &str) -> Option<Datatype> {
        // MySQL reports booleans as tinyint(1)
        if reported.trim().eq_ignore_ascii_case("tinyint(1)") {
            return Some(Datatype::Boolean);
        }
        datatype::datatype_for_reported(reported)
    }

    fn introspection_query(&self, table: &str) -> CompiledStatement {
        CompiledStatement::new(
            "SELECT COLUMN_NAME AS name, COLUMN_TYPE AS type \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
            vec![Value::Text(table.to_string())],
        )
    }

    fn unbounded_limit(&self) -> Option<&'static str> {
        Some("18446744073709551615")
    }
}
