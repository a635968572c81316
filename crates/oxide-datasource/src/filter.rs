//! Q objects: the filter predicate tree.
//!
//! A `Q` renders itself to a WHERE fragment plus its bound values. Field
//! names are quoted through the dialect; values are always placeholders.

use std::fmt;

use serde_json::Map;

use crate::dialect::Dialect;
use crate::error::CompileError;
use crate::value::{ToValue, Value};

/// A filter expression that can be combined with other expressions.
///
/// # Example
///
/// ```
/// use oxide_datasource::filter::Q;
///
/// let filter = Q::eq("status", "active")
///     .and(Q::gt("age", 18).or(Q::eq("verified", true)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Q {
    expr: FilterExpr,
}

/// Internal filter expression representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Simple comparison: field op value
    Comparison {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// IS NULL check
    IsNull { field: String },
    /// IS NOT NULL check
    IsNotNull { field: String },
    /// IN list check
    InList { field: String, values: Vec<Value> },
    /// NOT IN list check
    NotInList { field: String, values: Vec<Value> },
    /// LIKE pattern match
    Like { field: String, pattern: String },
    /// BETWEEN range check
    Between {
        field: String,
        low: Value,
        high: Value,
    },
    /// AND combination
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// OR combination
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// NOT negation
    Not(Box<FilterExpr>),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
        }
    }
}

impl Q {
    fn compare<V: ToValue>(field: &str, op: CompareOp, value: V) -> Self {
        Self {
            expr: FilterExpr::Comparison {
                field: field.to_string(),
                op,
                value: value.to_value(),
            },
        }
    }

    /// Creates an equality filter (field = value).
    pub fn eq<V: ToValue>(field: &str, value: V) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Creates an inequality filter (field != value).
    pub fn ne<V: ToValue>(field: &str, value: V) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// Creates a greater-than filter (field > value).
    pub fn gt<V: ToValue>(field: &str, value: V) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// Creates a greater-than-or-equal filter (field >= value).
    pub fn gte<V: ToValue>(field: &str, value: V) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Creates a less-than filter (field < value).
    pub fn lt<V: ToValue>(field: &str, value: V) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// Creates a less-than-or-equal filter (field <= value).
    pub fn lte<V: ToValue>(field: &str, value: V) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// Creates an IS NULL filter.
    pub fn is_null(field: &str) -> Self {
        Self {
            expr: FilterExpr::IsNull {
                field: field.to_string(),
            },
        }
    }

    /// Creates an IS NOT NULL filter.
    pub fn is_not_null(field: &str) -> Self {
        Self {
            expr: FilterExpr::IsNotNull {
                field: field.to_string(),
            },
        }
    }

    /// Creates an IN list filter.
    pub fn in_list<V: ToValue>(field: &str, values: Vec<V>) -> Self {
        Self {
            expr: FilterExpr::InList {
                field: field.to_string(),
                values: values.into_iter().map(ToValue::to_value).collect(),
            },
        }
    }

    /// Creates a NOT IN list filter.
    pub fn not_in_list<V: ToValue>(field: &str, values: Vec<V>) -> Self {
        Self {
            expr: FilterExpr::NotInList {
                field: field.to_string(),
                values: values.into_iter().map(ToValue::to_value).collect(),
            },
        }
    }

    /// Creates a LIKE filter. Use `%` for wildcard matching.
    pub fn like(field: &str, pattern: &str) -> Self {
        Self {
            expr: FilterExpr::Like {
                field: field.to_string(),
                pattern: pattern.to_string(),
            },
        }
    }

    /// Creates a BETWEEN filter (low <= field <= high).
    pub fn between<V: ToValue>(field: &str, low: V, high: V) -> Self {
        Self {
            expr: FilterExpr::Between {
                field: field.to_string(),
                low: low.to_value(),
                high: high.to_value(),
            },
        }
    }

    /// Combines this filter with another using AND.
    #[must_use]
    pub fn and(self, other: Q) -> Q {
        Q {
            expr: FilterExpr::And(Box::new(self.expr), Box::new(other.expr)),
        }
    }

    /// Combines this filter with another using OR.
    #[must_use]
    pub fn or(self, other: Q) -> Q {
        Q {
            expr: FilterExpr::Or(Box::new(self.expr), Box::new(other.expr)),
        }
    }

    /// Negates this filter with NOT.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Q {
        Q {
            expr: FilterExpr::Not(Box::new(self.expr)),
        }
    }

    /// Builds the WHERE fragment and its bound values.
    pub fn build(&self, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        let mut values = Vec::new();
        let sql = build_filter_expr(&self.expr, dialect, &mut values);
        (sql, values)
    }

    /// Parses a document-style filter such as
    /// `{"age": {"$gte": 18}, "$or": [{"role": "admin"}, {"verified": true}]}`.
    ///
    /// Returns `Ok(None)` for an empty document. Sibling keys are ANDed in
    /// the map's iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] for unknown `$` operators or malformed shapes.
    pub fn from_document(document: &serde_json::Value) -> Result<Option<Q>, CompileError> {
        match document {
            serde_json::Value::Object(map) => parse_document(map),
            serde_json::Value::Null => Ok(None),
            other => Err(CompileError::InvalidFilter(format!(
                "expected an object, got {other}"
            ))),
        }
    }
}

/// ANDs a list of filters together, left to right.
fn conjunction(parts: Vec<Q>) -> Option<Q> {
    parts.into_iter().reduce(Q::and)
}

fn parse_document(map: &Map<String, serde_json::Value>) -> Result<Option<Q>, CompileError> {
    let mut parts = Vec::with_capacity(map.len());

    for (key, value) in map {
        match key.as_str() {
            "$and" | "$or" => {
                let branches = parse_branches(key, value)?;
                let combined = if key == "$and" {
                    branches.into_iter().reduce(Q::and)
                } else {
                    branches.into_iter().reduce(Q::or)
                };
                parts.extend(combined);
            }
            "$not" => {
                let inner = Q::from_document(value)?
                    .ok_or_else(|| CompileError::InvalidFilter("empty $not".to_string()))?;
                parts.push(inner.not());
            }
            op if op.starts_with('$') => {
                return Err(CompileError::UnsupportedOperator(op.to_string()));
            }
            field => parts.extend(parse_field(field, value)?),
        }
    }

    Ok(conjunction(parts))
}

fn parse_branches(key: &str, value: &serde_json::Value) -> Result<Vec<Q>, CompileError> {
    let serde_json::Value::Array(items) = value else {
        return Err(CompileError::InvalidFilter(format!("{key} expects an array")));
    };
    if items.is_empty() {
        return Err(CompileError::InvalidFilter(format!("{key} expects at least one branch")));
    }

    let mut branches = Vec::with_capacity(items.len());
    for item in items {
        let branch = Q::from_document(item)?
            .ok_or_else(|| CompileError::InvalidFilter(format!("empty branch in {key}")))?;
        branches.push(branch);
    }
    Ok(branches)
}

/// Whether a field's value is an operator object like `{"$gt": 1}`.
///
/// Objects without `$` keys are plain values. Mixing both is rejected.
fn is_operator_object(
    field: &str,
    map: &Map<String, serde_json::Value>,
) -> Result<bool, CompileError> {
    let operators = map.keys().filter(|k| k.starts_with('$')).count();
    if operators > 0 && operators < map.len() {
        return Err(CompileError::InvalidFilter(format!(
            "'{field}' mixes operators and plain keys"
        )));
    }
    Ok(operators > 0)
}

fn parse_field(field: &str, value: &serde_json::Value) -> Result<Option<Q>, CompileError> {
    match value {
        serde_json::Value::Object(ops) if is_operator_object(field, ops)? => {
            let mut parts = Vec::with_capacity(ops.len());
            for (op, operand) in ops {
                parts.push(parse_operator(field, op, operand)?);
            }
            Ok(conjunction(parts))
        }
        serde_json::Value::Null => Ok(Some(Q::is_null(field))),
        other => Ok(Some(Q::eq(field, Value::from_json(other)))),
    }
}

fn parse_operator(field: &str, op: &str, operand: &serde_json::Value) -> Result<Q, CompileError> {
    let q = match op {
        "$eq" if operand.is_null() => Q::is_null(field),
        "$ne" if operand.is_null() => Q::is_not_null(field),
        "$eq" => Q::eq(field, Value::from_json(operand)),
        "$ne" => Q::ne(field, Value::from_json(operand)),
        "$gt" => Q::gt(field, Value::from_json(operand)),
        "$gte" => Q::gte(field, Value::from_json(operand)),
        "$lt" => Q::lt(field, Value::from_json(operand)),
        "$lte" => Q::lte(field, Value::from_json(operand)),
        "$in" | "$nin" => {
            let serde_json::Value::Array(items) = operand else {
                return Err(CompileError::InvalidFilter(format!(
                    "{op} on '{field}' expects an array"
                )));
            };
            let values: Vec<Value> = items.iter().map(Value::from_json).collect();
            if op == "$in" {
                Q::in_list(field, values)
            } else {
                Q::not_in_list(field, values)
            }
        }
        "$like" => {
            let serde_json::Value::String(pattern) = operand else {
                return Err(CompileError::InvalidFilter(format!(
                    "$like on '{field}' expects a string"
                )));
            };
            Q::like(field, pattern)
        }
        "$exists" => match operand {
            serde_json::Value::Bool(true) => Q::is_not_null(field),
            serde_json::Value::Bool(false) => Q::is_null(field),
            _ => {
                return Err(CompileError::InvalidFilter(format!(
                    "$exists on '{field}' expects a boolean"
                )))
            }
        },
        other => return Err(CompileError::UnsupportedOperator(other.to_string())),
    };
    Ok(q)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Builds SQL from a filter expression, appending bound values in order.
fn build_filter_expr(expr: &FilterExpr, dialect: &dyn Dialect, values: &mut Vec<Value>) -> String {
    match expr {
        FilterExpr::Comparison { field, op, value } => {
            values.push(value.clone());
            format!("{} {op} ?", dialect.quote_identifier(field))
        }
        FilterExpr::IsNull { field } => format!("{} IS NULL", dialect.quote_identifier(field)),
        FilterExpr::IsNotNull { field } => {
            format!("{} IS NOT NULL", dialect.quote_identifier(field))
        }
        FilterExpr::InList { field, values: list } => {
            if list.is_empty() {
                return "1 = 0".to_string();
            }
            values.extend(list.iter().cloned());
            format!(
                "{} IN ({})",
                dialect.quote_identifier(field),
                placeholders(list.len())
            )
        }
        FilterExpr::NotInList { field, values: list } => {
            if list.is_empty() {
                return "1 = 1".to_string();
            }
            values.extend(list.iter().cloned());
            format!(
                "{} NOT IN ({})",
                dialect.quote_identifier(field),
                placeholders(list.len())
            )
        }
        FilterExpr::Like { field, pattern } => {
            values.push(Value::Text(pattern.clone()));
            format!("{} LIKE ?", dialect.quote_identifier(field))
        }
        FilterExpr::Between { field, low, high } => {
            values.push(low.clone());
            values.push(high.clone());
            format!("{} BETWEEN ? AND ?", dialect.quote_identifier(field))
        }
        FilterExpr::And(left, right) => {
            let left_sql = build_filter_expr(left, dialect, values);
            let right_sql = build_filter_expr(right, dialect, values);
            format!("({left_sql}) AND ({right_sql})")
        }
        FilterExpr::Or(left, right) => {
            let left_sql = build_filter_expr(left, dialect, values);
            let right_sql = build_filter_expr(right, dialect, values);
            format!("({left_sql}) OR ({right_sql})")
        }
        FilterExpr::Not(inner) => {
            let inner_sql = build_filter_expr(inner, dialect, values);
            format!("NOT ({inner_sql})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, MySqlDialect};
    use serde_json::json;

    fn build(q: &Q) -> (String, Vec<Value>) {
        q.build(&GenericDialect::new())
    }

    #[test]
    fn test_simple_eq() {
        let (sql, params) = build(&Q::eq("status", "active"));
        assert_eq!(sql, "\"status\" = ?");
        assert_eq!(params, vec![Value::Text("active".to_string())]);
    }

    #[test]
    fn test_complex_expression() {
        let q = Q::eq("status", "active").and(Q::gt("age", 18).or(Q::eq("verified", true)));
        let (sql, params) = build(&q);
        assert_eq!(
            sql,
            "(\"status\" = ?) AND ((\"age\" > ?) OR (\"verified\" = ?))"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("active".to_string()),
                Value::Int(18),
                Value::Bool(true)
            ]
        );
    }

    #[test]
    fn test_not_and_null() {
        let (sql, params) = build(&Q::is_null("deleted_at").not());
        assert_eq!(sql, "NOT (\"deleted_at\" IS NULL)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_in_list() {
        let (sql, params) = build(&Q::in_list("status", vec!["active", "pending"]));
        assert_eq!(sql, "\"status\" IN (?, ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_empty_in_list() {
        let (sql, params) = build(&Q::in_list::<i64>("id", vec![]));
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());
        let (sql, _) = build(&Q::not_in_list::<i64>("id", vec![]));
        assert_eq!(sql, "1 = 1");
    }

    #[test]
    fn test_between_and_like() {
        let (sql, params) = build(&Q::between("price", 10, 100));
        assert_eq!(sql, "\"price\" BETWEEN ? AND ?");
        assert_eq!(params, vec![Value::Int(10), Value::Int(100)]);

        let (sql, params) = build(&Q::like("email", "%@example.com"));
        assert_eq!(sql, "\"email\" LIKE ?");
        assert_eq!(params, vec![Value::Text("%@example.com".to_string())]);
    }

    #[test]
    fn test_field_names_are_quoted_by_dialect() {
        let (sql, _) = Q::eq("we`ird", 1).build(&MySqlDialect::new());
        assert_eq!(sql, "`we``ird` = ?");
    }

    #[test]
    fn test_document_equality() {
        let q = Q::from_document(&json!({"name": "x"})).unwrap().unwrap();
        assert_eq!(q, Q::eq("name", "x"));
    }

    #[test]
    fn test_document_null_is_null_check() {
        let q = Q::from_document(&json!({"deleted": null})).unwrap().unwrap();
        assert_eq!(q, Q::is_null("deleted"));
    }

    #[test]
    fn test_document_operators() {
        let q = Q::from_document(&json!({"age": {"$gte": 18, "$lt": 65}}))
            .unwrap()
            .unwrap();
        let (sql, params) = build(&q);
        assert_eq!(sql, "(\"age\" >= ?) AND (\"age\" < ?)");
        assert_eq!(params, vec![Value::Int(18), Value::Int(65)]);
    }

    #[test]
    fn test_document_or() {
        let q = Q::from_document(&json!({"$or": [{"role": "admin"}, {"verified": true}]}))
            .unwrap()
            .unwrap();
        assert_eq!(q, Q::eq("role", "admin").or(Q::eq("verified", true)));
    }

    #[test]
    fn test_document_in_and_exists() {
        let q = Q::from_document(&json!({"tag": {"$in": ["a", "b"]}}))
            .unwrap()
            .unwrap();
        assert_eq!(q, Q::in_list("tag", vec!["a", "b"]));

        let q = Q::from_document(&json!({"tag": {"$exists": false}}))
            .unwrap()
            .unwrap();
        assert_eq!(q, Q::is_null("tag"));
    }

    #[test]
    fn test_document_nested_object_value_is_text() {
        let q = Q::from_document(&json!({"meta": {"a": 1}})).unwrap().unwrap();
        assert_eq!(q, Q::eq("meta", Value::Text("{\"a\":1}".to_string())));
    }

    #[test]
    fn test_document_mixed_operator_object() {
        let err = Q::from_document(&json!({"age": {"$gt": 1, "x": 2}})).unwrap_err();
        assert!(matches!(err, CompileError::InvalidFilter(msg) if msg.contains("'age'")));
    }

    #[test]
    fn test_document_empty() {
        assert_eq!(Q::from_document(&json!({})).unwrap(), None);
        assert_eq!(Q::from_document(&json!(null)).unwrap(), None);
    }

    #[test]
    fn test_document_unsupported_operator() {
        let err = Q::from_document(&json!({"age": {"$regex": "x"}})).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator(op) if op == "$regex"));

        let err = Q::from_document(&json!({"$where": "1"})).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator(_)));
    }

    #[test]
    fn test_document_malformed() {
        assert!(matches!(
            Q::from_document(&json!([1, 2])),
            Err(CompileError::InvalidFilter(_))
        ));
        assert!(matches!(
            Q::from_document(&json!({"$and": []})),
            Err(CompileError::InvalidFilter(_))
        ));
        assert!(matches!(
            Q::from_document(&json!({"tag": {"$in": "a"}})),
            Err(CompileError::InvalidFilter(_))
        ));
    }
}
