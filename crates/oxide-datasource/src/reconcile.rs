//! Additive schema reconciliation.
//!
//! The live table is brought up to the declared schema by creating it (with
//! only its primary key) and adding each missing column. Existing columns are
//! trusted as they are: no type check, no alteration, no removal.

use tracing::{debug, info, warn};

use crate::datasource::Datasource;
use crate::datatype::Datatype;
use crate::dialect::Dialect;
use crate::error::{Result, SchemaError};
use crate::introspect::LiveSchema;
use crate::model::{DeclaredSchema, FieldDescriptor, Model};
use crate::operations::SchemaOperation;
use crate::transport::Transport;

/// What a reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// DDL statements issued, in order (planned only, in dry-run mode).
    pub statements: Vec<String>,
    /// Fields derived from the live table for external-schema models.
    pub derived: Vec<(String, Datatype)>,
}

impl ReconcileReport {
    /// Returns true if nothing was issued or derived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.derived.is_empty()
    }
}

impl<T: Transport, D: Dialect> Datasource<T, D> {
    /// Creates `table` with only its primary key column, if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Ddl`] if the statement fails.
    pub async fn ensure_table(&self, table: &str, primary_key: &str) -> Result<String> {
        let sql = self
            .dialect
            .generate_sql(&SchemaOperation::create_table(table, primary_key));
        self.execute_ddl(table, &sql).await?;
        info!(table = %table, "Ensured table exists");
        Ok(sql)
    }

    /// Adds every declared field missing from the live table.
    ///
    /// Fields are processed in declaration order and each ALTER runs before
    /// the next field is looked at. An unknown datatype or a failing ALTER
    /// stops the run; columns added before that point stay added.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for an unknown datatype or a failing ALTER, and
    /// surfaces introspection errors unchanged.
    pub async fn reconcile_columns(
        &self,
        table: &str,
        schema: &DeclaredSchema,
    ) -> Result<ReconcileReport> {
        let live = self.table_info(table).await?;
        let mut report = ReconcileReport::default();

        for (name, descriptor) in schema.iter() {
            if live.contains(name) {
                continue;
            }

            let operation = self.column_operation(table, name, descriptor)?;
            let sql = self.dialect.generate_sql(&operation);
            self.execute_ddl(table, &sql).await?;
            info!(table = %table, column = %name, "Added column");
            report.statements.push(sql);
        }

        Ok(report)
    }

    /// Computes the column additions reconciliation would perform against
    /// `live`, without executing anything.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownDatatype`] for the first unmappable field.
    pub fn plan_columns(
        &self,
        table: &str,
        schema: &DeclaredSchema,
        live: &LiveSchema,
    ) -> Result<Vec<SchemaOperation>> {
        schema
            .iter()
            .filter(|(name, _)| !live.contains(name))
            .map(|(name, descriptor)| self.column_operation(table, name, descriptor))
            .collect()
    }

    /// Derives the model's fields from the live table.
    ///
    /// Columns whose reported type has no datatype are logged and skipped.
    ///
    /// # Errors
    ///
    /// Surfaces introspection errors unchanged.
    pub async fn load_external_schema<M: Model + ?Sized>(
        &self,
        model: &mut M,
    ) -> Result<Vec<(String, Datatype)>> {
        let table = model.table().to_string();
        let live = self.table_info(&table).await?;
        let mut derived = Vec::new();

        for column in live.iter() {
            match self.dialect.reverse_type(&column.reported_type) {
                Some(datatype) => {
                    model.add_field(&column.name, datatype);
                    derived.push((column.name.clone(), datatype));
                }
                None => warn!(
                    table = %table,
                    column = %column.name,
                    reported_type = %column.reported_type,
                    "Unknown field type, skipping"
                ),
            }
        }

        info!(table = %table, fields = derived.len(), "Loaded external schema");
        Ok(derived)
    }

    /// Prepares the table backing `model`.
    ///
    /// External-schema models only derive their fields. Other models get
    /// their table created and their missing columns added.
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_table`], [`Self::reconcile_columns`] and
    /// [`Self::load_external_schema`].
    pub async fn configure_table<M: Model + ?Sized>(
        &self,
        model: &mut M,
    ) -> Result<ReconcileReport> {
        if model.uses_external_schema() {
            let derived = self.load_external_schema(model).await?;
            return Ok(ReconcileReport {
                statements: Vec::new(),
                derived,
            });
        }

        let create = self.ensure_table(model.table(), model.primary_key()).await?;
        let mut report = self.reconcile_columns(model.table(), model.schema()).await?;
        report.statements.insert(0, create);
        Ok(report)
    }

    fn column_operation(
        &self,
        table: &str,
        name: &str,
        descriptor: &FieldDescriptor,
    ) -> Result<SchemaOperation> {
        let datatype: Datatype = descriptor.datatype.parse().map_err(|_| {
            SchemaError::UnknownDatatype {
                table: table.to_string(),
                field: name.to_string(),
                datatype: descriptor.datatype.clone(),
            }
        })?;

        Ok(SchemaOperation::add_column(
            table,
            name,
            self.dialect.column_type(datatype),
        ))
    }

    async fn execute_ddl(&self, table: &str, sql: &str) -> Result<()> {
        if self.options.dry_run {
            debug!(sql = %sql, "Dry run, not executing");
            return Ok(());
        }

        debug!(sql = %sql, "Executing SQL");
        self.transport
            .run_statement(sql.to_string(), Vec::new())
            .await
            .map_err(|source| {
                warn!(table = %table, sql = %sql, error = %source, "DDL failed");
                SchemaError::Ddl {
                    table: table.to_string(),
                    statement: sql.to_string(),
                    source: Box::new(source),
                }
            })?;
        Ok(())
    }
}
