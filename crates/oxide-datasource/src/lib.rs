//! SQL datasource adapter for a model layer.
//!
//! `oxide-datasource` sits between models and a relational database. It:
//! - Brings a live table up to a model's declared schema, additively
//! - Derives a model's schema from an existing table
//! - Compiles normalized query criteria into parameterized SELECT statements
//! - Inserts records and recovers the stored row
//!
//! # Architecture
//!
//! - **Dialect** - Identifier quoting, type mapping, introspection and DDL text
//! - **Transport** - Executes SQL text with bound values (see [`SqliteTransport`])
//! - **Datasource** - Binds a dialect to a transport and runs every operation
//! - **Model** - The boundary trait through which schemas are read and updated
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_datasource::prelude::*;
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await?;
//! let ds = Datasource::new(SqliteTransport::new(pool), SqliteDialect::new());
//!
//! let mut people = ModelDefinition::new("people")
//!     .with_schema(DeclaredSchema::new().field("name", "string").field("age", "number"));
//! ds.configure_table(&mut people).await?;
//!
//! let criteria = Criteria::new()
//!     .filter(Q::gte("age", 18))
//!     .sort(Sort::ordered([("name", 1)]))
//!     .limit(10);
//! let rows = ds.select_rows("people", &criteria).await?;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create or extend the table behind a model file
//! oxide-datasource configure --model people.json
//!
//! # Show the SQL a criteria document compiles to
//! oxide-datasource sql --table people --criteria '{"filter": {"age": {"$gt": 18}}, "limit": 5}'
//! ```

pub mod compile;
pub mod criteria;
pub mod datasource;
pub mod datatype;
pub mod dialect;
pub mod error;
pub mod filter;
pub mod introspect;
pub mod model;
pub mod operations;
pub mod read;
pub mod reconcile;
pub mod sqlite;
pub mod transport;
pub mod value;
pub mod write;

pub use compile::CompiledStatement;
pub use criteria::{Criteria, Sort, SortDirection};
pub use datasource::{Datasource, DatasourceOptions};
pub use datatype::Datatype;
pub use dialect::{Dialect, GenericDialect, MySqlDialect, SqliteDialect};
pub use error::{CompileError, DatasourceError, Result, SchemaError};
pub use filter::Q;
pub use introspect::{LiveColumn, LiveSchema};
pub use model::{DeclaredSchema, FieldDescriptor, Model, ModelDefinition};
pub use reconcile::ReconcileReport;
pub use sqlite::SqliteTransport;
pub use transport::{Transport, WriteAck};
pub use value::{Record, ToValue, Value};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::compile::CompiledStatement;
    pub use crate::criteria::{Criteria, Sort, SortDirection};
    pub use crate::datasource::Datasource;
    pub use crate::datatype::Datatype;
    pub use crate::dialect::{Dialect, GenericDialect, MySqlDialect, SqliteDialect};
    pub use crate::error::{DatasourceError, Result};
    pub use crate::filter::Q;
    pub use crate::model::{DeclaredSchema, FieldDescriptor, Model, ModelDefinition};
    pub use crate::sqlite::SqliteTransport;
    pub use crate::transport::{Transport, WriteAck};
    pub use crate::value::{Record, Value};
}
