//! Criteria-to-SQL compilation.
//!
//! Every statement is produced as text plus its bound values. Identifiers are
//! quoted by the dialect and inlined; values never are.

use std::fmt;

use crate::criteria::Criteria;
use crate::dialect::Dialect;
use crate::error::{CompileError, Result};
use crate::value::{Record, Value};

/// SQL text paired with its positional parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// Statement text with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub values: Vec<Value>,
}

impl CompiledStatement {
    /// Creates a statement.
    #[must_use]
    pub fn new(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }
}

impl fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Compiles `SELECT *` over `table` with the criteria's filter, sort and
/// pagination.
///
/// # Errors
///
/// Returns [`CompileError`] if the sort specification is malformed.
pub fn compile_select(
    dialect: &dyn Dialect,
    table: &str,
    criteria: &Criteria,
) -> Result<CompiledStatement> {
    let mut sql = format!("SELECT * FROM {}", dialect.quote_identifier(table));
    let mut values = Vec::new();

    // WHERE clause
    if let Some(filter) = &criteria.filter {
        let (where_sql, where_values) = filter.build(dialect);
        sql.push_str(" WHERE ");
        sql.push_str(&where_sql);
        values.extend(where_values);
    }

    // ORDER BY clause
    if let Some(sort) = &criteria.sort {
        let order = sort.normalize()?;
        if !order.is_empty() {
            let parts: Vec<String> = order
                .iter()
                .map(|(field, direction)| {
                    format!("{} {}", dialect.quote_identifier(field), direction.as_sql())
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }
    }

    // LIMIT / OFFSET
    match (criteria.limit, criteria.skip) {
        (Some(limit), skip) => {
            sql.push_str(&format!(" LIMIT {limit}"));
            if let Some(skip) = skip {
                sql.push_str(&format!(" OFFSET {skip}"));
            }
        }
        (None, Some(skip)) => {
            if let Some(unbounded) = dialect.unbounded_limit() {
                sql.push_str(&format!(" LIMIT {unbounded}"));
            }
            sql.push_str(&format!(" OFFSET {skip}"));
        }
        (None, None) => {}
    }

    Ok(CompiledStatement { sql, values })
}

/// Compiles an INSERT of every field in `record`.
///
/// Columns and values share the record's iteration order.
///
/// # Errors
///
/// Returns [`CompileError::EmptyRecord`] if the record has no fields.
pub fn compile_insert(
    dialect: &dyn Dialect,
    table: &str,
    record: &Record,
) -> Result<CompiledStatement> {
    if record.is_empty() {
        return Err(CompileError::EmptyRecord(table.to_string()).into());
    }

    let columns: Vec<String> = record.keys().map(|k| dialect.quote_identifier(k)).collect();
    let placeholders = vec!["?"; record.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dialect.quote_identifier(table),
        columns.join(", "),
        placeholders
    );

    Ok(CompiledStatement::new(sql, record.values().cloned().collect()))
}

/// Compiles a point lookup on the primary key.
#[must_use]
pub fn compile_lookup(
    dialect: &dyn Dialect,
    table: &str,
    primary_key: &str,
    key: Value,
) -> CompiledStatement {
    CompiledStatement::new(
        format!(
            "SELECT * FROM {} WHERE {} = ?",
            dialect.quote_identifier(table),
            dialect.quote_identifier(primary_key)
        ),
        vec![key],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Sort;
    use crate::dialect::{GenericDialect, MySqlDialect, SqliteDialect};
    use crate::error::DatasourceError;
    use crate::filter::Q;
    use serde_json::json;

    fn compile(criteria: &Criteria) -> CompiledStatement {
        compile_select(&GenericDialect::new(), "people", criteria).unwrap()
    }

    #[test]
    fn test_select_all() {
        let stmt = compile(&Criteria::new());
        assert_eq!(stmt.sql, "SELECT * FROM \"people\"");
        assert!(stmt.values.is_empty());
    }

    #[test]
    fn test_select_with_filter() {
        let stmt = compile(&Criteria::new().filter(Q::eq("name", "Alice")));
        assert_eq!(stmt.sql, "SELECT * FROM \"people\" WHERE \"name\" = ?");
        assert_eq!(stmt.values, vec![Value::Text("Alice".to_string())]);
    }

    #[test]
    fn test_ordered_sort() {
        let sort = Sort::from_json(&json!([["age", -1], ["name", 1]])).unwrap();
        let criteria = Criteria::new().sort(sort);
        let stmt = compile(&criteria);
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"people\" ORDER BY \"age\" DESC, \"name\" ASC"
        );
    }

    #[test]
    fn test_keyed_sort_follows_map_order() {
        let sort = Sort::from_json(&json!({"age": -1, "name": 1})).unwrap();
        let expected: Vec<String> = sort
            .normalize()
            .unwrap()
            .into_iter()
            .map(|(f, d)| format!("\"{f}\" {}", d.as_sql()))
            .collect();
        let stmt = compile(&Criteria::new().sort(sort));
        assert!(stmt.sql.ends_with(&format!("ORDER BY {}", expected.join(", "))));
    }

    #[test]
    fn test_limit_without_skip() {
        let stmt = compile(&Criteria::new().limit(10));
        assert!(stmt.sql.contains("LIMIT 10"));
        assert!(!stmt.sql.contains("OFFSET"));
    }

    #[test]
    fn test_skip_without_limit() {
        let stmt = compile(&Criteria::new().skip(5));
        assert!(stmt.sql.contains("OFFSET 5"));
        assert!(!stmt.sql.contains("LIMIT"));
    }

    #[test]
    fn test_limit_and_skip() {
        let stmt = compile(&Criteria::new().limit(10).skip(20));
        assert!(stmt.sql.ends_with("LIMIT 10 OFFSET 20"));
    }

    #[test]
    fn test_zero_limit_is_kept() {
        let stmt = compile(&Criteria::new().limit(0));
        assert!(stmt.sql.ends_with("LIMIT 0"));
    }

    #[test]
    fn test_skip_needs_limit_on_sqlite_and_mysql() {
        let criteria = Criteria::new().skip(5);
        let stmt = compile_select(&SqliteDialect::new(), "people", &criteria).unwrap();
        assert!(stmt.sql.ends_with("LIMIT -1 OFFSET 5"));

        let stmt = compile_select(&MySqlDialect::new(), "people", &criteria).unwrap();
        assert!(stmt.sql.ends_with("LIMIT 18446744073709551615 OFFSET 5"));
    }

    #[test]
    fn test_full_statement_value_order() {
        let criteria = Criteria::new()
            .filter(Q::gt("age", 18).and(Q::in_list("role", vec!["a", "b"])))
            .sort(Sort::ordered([("age", 1)]))
            .limit(3);
        let stmt = compile(&criteria);
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"people\" WHERE (\"age\" > ?) AND (\"role\" IN (?, ?)) \
             ORDER BY \"age\" ASC LIMIT 3"
        );
        assert_eq!(
            stmt.values,
            vec![
                Value::Int(18),
                Value::Text("a".to_string()),
                Value::Text("b".to_string())
            ]
        );
    }

    #[test]
    fn test_malformed_sort_fails_before_sql() {
        let criteria = Criteria::new().sort(Sort::Sequence(vec![json!("age")]));
        let err = compile_select(&GenericDialect::new(), "people", &criteria).unwrap_err();
        assert!(matches!(
            err,
            DatasourceError::Compile(CompileError::MalformedSort(_))
        ));
    }

    #[test]
    fn test_insert() {
        let mut record = Record::new();
        record.insert("_id".to_string(), Value::Text("abc".to_string()));
        record.insert("name".to_string(), Value::Text("x".to_string()));

        let stmt = compile_insert(&MySqlDialect::new(), "people", &record).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `people` (`_id`, `name`) VALUES (?, ?)"
        );
        assert_eq!(
            stmt.values,
            vec![Value::Text("abc".to_string()), Value::Text("x".to_string())]
        );
    }

    #[test]
    fn test_insert_empty_record() {
        let err = compile_insert(&GenericDialect::new(), "people", &Record::new()).unwrap_err();
        assert!(matches!(
            err,
            DatasourceError::Compile(CompileError::EmptyRecord(t)) if t == "people"
        ));
    }

    #[test]
    fn test_lookup() {
        let stmt = compile_lookup(
            &GenericDialect::new(),
            "people",
            "_id",
            Value::Text("abc".to_string()),
        );
        assert_eq!(stmt.sql, "SELECT * FROM \"people\" WHERE \"_id\" = ?");
        assert_eq!(stmt.values, vec![Value::Text("abc".to_string())]);
    }
}
