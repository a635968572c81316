//! oxide-datasource CLI
//!
//! Command-line tool for reconciling tables and inspecting compiled queries.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_datasource::prelude::*;
use oxide_datasource::value::record_from_json;

/// SQL datasource adapter: schema reconciliation and query compilation.
#[derive(Parser)]
#[command(name = "oxide-datasource")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database: String,

    /// SQL dialect used by the `sql` subcommand. Statements that run against
    /// the database always use the SQLite dialect.
    #[arg(long, value_enum, default_value_t = DialectKind::Sqlite)]
    dialect: DialectKind,

    /// Maximum number of pooled connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Plan DDL without executing it.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectKind {
    Sqlite,
    Mysql,
    Generic,
}

impl DialectKind {
    fn build(self) -> Box<dyn Dialect> {
        match self {
            Self::Sqlite => Box::new(SqliteDialect::new()),
            Self::Mysql => Box::new(MySqlDialect::new()),
            Self::Generic => Box::new(GenericDialect::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or extend the table behind a model definition file.
    Configure {
        /// Path to the model definition (JSON).
        #[arg(short, long)]
        model: PathBuf,
    },

    /// List the live columns of a table.
    Introspect {
        /// Table name.
        #[arg(short, long)]
        table: String,
    },

    /// Derive datatypes for the columns of an existing table.
    Derive {
        /// Table name.
        #[arg(short, long)]
        table: String,
    },

    /// Insert a record and print the stored row.
    Insert {
        /// Table name.
        #[arg(short, long)]
        table: String,

        /// Record as a JSON object.
        #[arg(short, long)]
        record: String,

        /// Primary key field.
        #[arg(long, default_value = "_id")]
        primary_key: String,
    },

    /// Select rows matching a criteria document.
    Select {
        /// Table name.
        #[arg(short, long)]
        table: String,

        /// Criteria as JSON: `{"filter": ..., "sort": ..., "limit": n, "skip": n}`.
        #[arg(short, long, default_value = "{}")]
        criteria: String,
    },

    /// Print the SQL a criteria document compiles to, without running it.
    Sql {
        /// Table name.
        #[arg(short, long)]
        table: String,

        /// Criteria as JSON.
        #[arg(short, long, default_value = "{}")]
        criteria: String,
    },
}

/// Opens the datasource that executes statements.
///
/// The pool is SQLite, so execution uses the SQLite dialect whatever
/// `--dialect` says.
async fn connect(cli: &Cli) -> anyhow::Result<Datasource<SqliteTransport, SqliteDialect>> {
    let pool = SqlitePoolOptions::new()
        .max_connections(cli.max_connections)
        .connect(&cli.database)
        .await?;
    info!("Connected to {}", cli.database);

    Ok(Datasource::new(SqliteTransport::new(pool), SqliteDialect::new()).dry_run(cli.dry_run))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Compiling needs no connection
    if let Commands::Sql { table, criteria } = &cli.command {
        let dialect = cli.dialect.build();
        let document: serde_json::Value = serde_json::from_str(criteria)?;
        let criteria = Criteria::from_document(&document)?;
        let stmt = oxide_datasource::compile::compile_select(&*dialect, table, &criteria)?;
        println!("{stmt}");
        if !stmt.values.is_empty() {
            println!("-- values: {}", serde_json::to_string(&stmt.values)?);
        }
        return Ok(());
    }

    let ds = connect(&cli).await?;

    match cli.command {
        Commands::Configure { model } => {
            let mut model = ModelDefinition::from_path(&model)?;
            if cli.dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }

            let report = ds.configure_table(&mut model).await?;
            for sql in &report.statements {
                println!("{sql};");
            }
            for (field, datatype) in &report.derived {
                println!("{field}: {datatype}");
            }
            info!(
                table = %model.table(),
                statements = report.statements.len(),
                derived = report.derived.len(),
                "Table configured"
            );
        }

        Commands::Introspect { table } => {
            let live = ds.table_info(&table).await?;
            if live.is_empty() {
                info!("Table '{}' has no columns or does not exist.", table);
            }
            for column in live.iter() {
                println!("{:<30} {}", column.name, column.reported_type);
            }
        }

        Commands::Derive { table } => {
            let mut model = ModelDefinition::new(&table).external();
            ds.load_external_schema(&mut model).await?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }

        Commands::Insert {
            table,
            record,
            primary_key,
        } => {
            let model = ModelDefinition::new(&table).with_primary_key(primary_key);
            let document: serde_json::Value = serde_json::from_str(&record)?;
            let record = record_from_json(&document)?;
            let stored = ds.insert_record(&model, &record).await?;
            println!("{}", serde_json::to_string(&stored)?);
        }

        Commands::Select { table, criteria } => {
            let document: serde_json::Value = serde_json::from_str(&criteria)?;
            let criteria = Criteria::from_document(&document)?;
            let rows = ds.select_rows(&table, &criteria).await?;
            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
            info!("{} row(s)", rows.len());
        }

        Commands::Sql { .. } => {}
    }

    Ok(())
}
