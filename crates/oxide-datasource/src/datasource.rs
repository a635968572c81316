//! The datasource: a dialect and a transport bound together.
//!
//! Operations are split by concern across `introspect`, `reconcile`, `read`
//! and `write`; each adds an `impl` block to [`Datasource`].

use crate::dialect::Dialect;
use crate::transport::Transport;

/// Options controlling how the datasource applies changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasourceOptions {
    /// Plan DDL without executing it.
    pub dry_run: bool,
}

/// A relational datasource speaking one SQL dialect over one transport.
pub struct Datasource<T: Transport, D: Dialect> {
    pub(crate) transport: T,
    pub(crate) dialect: D,
    pub(crate) options: DatasourceOptions,
}

impl<T: Transport, D: Dialect> Datasource<T, D> {
    /// Creates a new datasource.
    pub fn new(transport: T, dialect: D) -> Self {
        Self {
            transport,
            dialect,
            options: DatasourceOptions::default(),
        }
    }

    /// Enables dry-run mode (DDL is planned and reported but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.options.dry_run = enabled;
        self
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &DatasourceOptions {
        &self.options
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Quotes a table or column name for this datasource's dialect.
    #[must_use]
    pub fn escape_identifier(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    /// Whether queries can traverse associations between models.
    ///
    /// Joins are not supported by SQL datasources.
    #[must_use]
    pub const fn supports_associations(&self) -> bool {
        false
    }
}
