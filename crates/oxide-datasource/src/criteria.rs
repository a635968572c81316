//! Normalized query criteria.
//!
//! Criteria arrive already validated by the query layer. This module only
//! reads them: the filter tree, the sort specification and pagination.

use serde_json::Map;

use crate::error::CompileError;
use crate::filter::Q;

/// Order direction for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (ASC)
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl SortDirection {
    /// Reduces a raw direction value to ascending or descending.
    ///
    /// `1`, `true`, `"1"`, `"asc"` and `"ascending"` are ascending. Anything
    /// else, including `-1` and `"desc"`, is descending.
    #[must_use]
    pub fn from_sentinel(value: &serde_json::Value) -> Self {
        let ascending = match value {
            serde_json::Value::Number(n) => n.as_f64() == Some(1.0),
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => {
                let s = s.trim();
                s == "1" || s.eq_ignore_ascii_case("asc") || s.eq_ignore_ascii_case("ascending")
            }
            _ => false,
        };
        if ascending {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort specification as handed over by the query layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Sort {
    /// Ordered `[field, direction]` pairs.
    Sequence(Vec<serde_json::Value>),
    /// Field to direction mapping, applied in the map's iteration order.
    Keyed(Map<String, serde_json::Value>),
}

impl Sort {
    /// Builds an ordered sort from `(field, direction)` pairs.
    pub fn ordered<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self::Sequence(
            pairs
                .into_iter()
                .map(|(field, dir)| {
                    let field: String = field.into();
                    serde_json::json!([field, dir])
                })
                .collect(),
        )
    }

    /// Reads a sort specification from JSON: an array of pairs or an object.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedSort`] for any other shape.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CompileError> {
        match value {
            serde_json::Value::Array(entries) => Ok(Self::Sequence(entries.clone())),
            serde_json::Value::Object(map) => Ok(Self::Keyed(map.clone())),
            other => Err(CompileError::MalformedSort(other.to_string())),
        }
    }

    /// Normalizes into `(field, direction)` pairs, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedSort`] when a sequence entry is not a
    /// two-element array starting with a field name.
    pub fn normalize(&self) -> Result<Vec<(String, SortDirection)>, CompileError> {
        match self {
            Self::Sequence(entries) => entries
                .iter()
                .map(|entry| match entry.as_array().map(Vec::as_slice) {
                    Some([serde_json::Value::String(field), direction]) => {
                        Ok((field.clone(), SortDirection::from_sentinel(direction)))
                    }
                    _ => Err(CompileError::MalformedSort(entry.to_string())),
                })
                .collect(),
            Self::Keyed(map) => Ok(map
                .iter()
                .map(|(field, direction)| (field.clone(), SortDirection::from_sentinel(direction)))
                .collect()),
        }
    }
}

/// Filter, sort and pagination for a read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    /// Filter predicate tree; `None` selects every row.
    pub filter: Option<Q>,
    /// Sort specification.
    pub sort: Option<Sort>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Number of rows to skip.
    pub skip: Option<u64>,
}

impl Criteria {
    /// Creates empty criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter, ANDing with any filter already present.
    #[must_use]
    pub fn filter(mut self, q: Q) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(q),
            None => q,
        });
        self
    }

    /// Sets the sort specification.
    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Limits the number of results.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skips the first `n` results.
    #[must_use]
    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    /// Reads criteria from a JSON document:
    /// `{"filter": {...}, "sort": [...], "limit": n, "skip": n}`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when a part cannot be understood.
    pub fn from_document(document: &serde_json::Value) -> Result<Self, CompileError> {
        let serde_json::Value::Object(map) = document else {
            return Err(CompileError::InvalidFilter(format!(
                "criteria must be an object, got {document}"
            )));
        };

        let mut criteria = Self::new();
        for (key, value) in map {
            match key.as_str() {
                "filter" => criteria.filter = Q::from_document(value)?,
                "sort" if value.is_null() => {}
                "sort" => criteria.sort = Some(Sort::from_json(value)?),
                "limit" => criteria.limit = read_count(key, value)?,
                "skip" => criteria.skip = read_count(key, value)?,
                other => {
                    return Err(CompileError::InvalidFilter(format!(
                        "unknown criteria key '{other}'"
                    )))
                }
            }
        }
        Ok(criteria)
    }
}

fn read_count(key: &str, value: &serde_json::Value) -> Result<Option<u64>, CompileError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_u64()
        .map(Some)
        .ok_or_else(|| CompileError::InvalidFilter(format!("{key} must be a non-negative integer")))
}
