//! Abstract datatypes declared by the model layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of datatypes a model field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Free text.
    String,
    /// A record identifier (`objectid` in older model definitions).
    Identifier,
    /// True/false.
    Boolean,
    /// Any numeric value.
    Number,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Datetime,
    /// Structured value, stored serialized as text.
    Object,
}

impl Datatype {
    /// All datatypes, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Identifier,
        Self::Boolean,
        Self::Number,
        Self::Date,
        Self::Time,
        Self::Datetime,
        Self::Object,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Identifier => "identifier",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A datatype name that is not part of [`Datatype`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown datatype '{0}'")]
pub struct UnknownDatatype(pub String);

impl FromStr for Datatype {
    type Err = UnknownDatatype;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "identifier" | "objectid" => Ok(Self::Identifier),
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "datetime" => Ok(Self::Datetime),
            "object" => Ok(Self::Object),
            _ => Err(UnknownDatatype(s.to_string())),
        }
    }
}

/// Maps a datatype to the column type used when adding it to a table.
///
/// Total over [`Datatype`]; dialects may override it through
/// [`crate::dialect::Dialect::column_type`].
#[must_use]
pub const fn sql_column_type(datatype: Datatype) -> &'static str {
    match datatype {
        Datatype::String | Datatype::Identifier | Datatype::Object => "TEXT",
        Datatype::Boolean => "TINYINT(1)",
        Datatype::Number => "INT",
        Datatype::Date => "DATE",
        Datatype::Time | Datatype::Datetime => "DATETIME",
    }
}

/// Maps a column type reported by the database back to a datatype.
///
/// Returns `None` for types this adapter has no opinion about.
#[must_use]
pub fn datatype_for_reported(reported: &str) -> Option<Datatype> {
    let lowered = reported.trim().to_ascii_lowercase();
    let base = lowered
        .split(['(', ' '])
        .next()
        .unwrap_or_default();

    match base {
        "int" | "integer" | "bigint" | "smallint" | "mediumint" | "tinyint" => {
            Some(Datatype::Number)
        }
        "real" | "double" | "float" | "decimal" | "numeric" => Some(Datatype::Number),
        "text" | "varchar" | "char" | "clob" | "tinytext" | "mediumtext" | "longtext" => {
            Some(Datatype::String)
        }
        "boolean" | "bool" => Some(Datatype::Boolean),
        "date" => Some(Datatype::Date),
        "datetime" | "timestamp" => Some(Datatype::Datetime),
        "time" => Some(Datatype::Time),
        _ => None,
    }
}
