//! Error types for the datasource.

/// Errors that can occur while reconciling schemas or running statements.
#[derive(Debug, thiserror::Error)]
pub enum DatasourceError {
    /// The transport could not execute a statement at all.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The driver rejected a statement.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A declared schema could not be applied to the live table.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Criteria or a record could not be turned into SQL.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The driver reported success but the stored row cannot be found.
    #[error("Driver inconsistency on table '{table}': {detail}")]
    DriverInconsistency {
        /// Table the statement targeted.
        table: String,
        /// What went missing.
        detail: String,
    },

    /// IO error (reading model definition files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatasourceError {
    /// Sorts a driver error into connectivity failures and statement failures.
    #[must_use]
    pub fn from_driver(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Connectivity(err.to_string()),
            other => Self::Database(other),
        }
    }

    /// Returns whether this is a schema error.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

/// Errors raised by schema reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A declared field uses a datatype with no column mapping.
    #[error("Unknown datatype '{datatype}' for field '{field}' on table '{table}'")]
    UnknownDatatype {
        /// Table being reconciled.
        table: String,
        /// Offending field.
        field: String,
        /// Offending datatype name.
        datatype: String,
    },

    /// A DDL statement failed.
    #[error("DDL failed on table '{table}' ({statement}): {source}")]
    Ddl {
        /// Table being reconciled.
        table: String,
        /// The statement that failed.
        statement: String,
        /// Underlying driver error.
        #[source]
        source: Box<DatasourceError>,
    },
}

/// Errors raised while compiling criteria or records into SQL.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A sort entry is not a `[field, direction]` pair.
    #[error("Malformed sort entry: {0}")]
    MalformedSort(String),

    /// A filter uses an operator with no SQL translation.
    #[error("Unsupported filter operator '{0}'")]
    UnsupportedOperator(String),

    /// A filter document has an invalid shape.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A record is not a field-to-value mapping.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A record with no fields cannot be inserted.
    #[error("Cannot insert an empty record into '{0}'")]
    EmptyRecord(String),
}

/// Result type for datasource operations.
pub type Result<T> = std::result::Result<T, DatasourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connectivity() {
        let err = DatasourceError::from_driver(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatasourceError::Connectivity(_)));

        let err = DatasourceError::from_driver(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatasourceError::Database(_)));
    }

    #[test]
    fn test_unknown_datatype_message() {
        let err: DatasourceError = SchemaError::UnknownDatatype {
            table: "users".to_string(),
            field: "avatar".to_string(),
            datatype: "blob".to_string(),
        }
        .into();
        assert!(err.is_schema_error());
        assert_eq!(
            err.to_string(),
            "Unknown datatype 'blob' for field 'avatar' on table 'users'"
        );
    }
}
