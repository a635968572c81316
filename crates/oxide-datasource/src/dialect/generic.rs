//! Generic SQL dialect.

use super::Dialect;
use crate::compile::CompiledStatement;
use crate::value::Value;

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn introspection_query(&self, table: &str) -> CompiledStatement {
        CompiledStatement::new(
            "SELECT column_name AS name, data_type AS type \
             FROM information_schema.columns \
             WHERE table_schema = CURRENT_SCHEMA AND table_name = ? \
             ORDER BY ordinal_position",
            vec![Value::Text(table.to_string())],
        )
    }
}
