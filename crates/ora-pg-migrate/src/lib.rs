//! # ora-pg-migrate
//!
//! Oracle to PostgreSQL schema and data translation.
//!
//! The library reads an Oracle schema through its data dictionary and writes
//! PostgreSQL scripts that recreate it:
//!
//! - **Type mapping** with configurable explicit mappings and boolean heuristics
//! - **Value formatting** of every row into INSERT literals
//! - **Sequence translation** into the bigint range, with overflow protection
//! - **DDL assembly** for tables, comments, indexes, constraints and views
//! - **Script replay** against PostgreSQL, tolerating failing statements
//!
//! ## Example
//!
//! ```rust,no_run
//! use ora_pg_migrate::catalog::CatalogConnection;
//! use ora_pg_migrate::{Config, Orchestrator};
//!
//! async fn export<C: CatalogConnection>(source: C) -> ora_pg_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::new(config, source)?;
//!     let result = orchestrator.run(None).await?;
//!     println!("Exported {} rows", result.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod ddl;
pub mod error;
pub mod format;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod script;
pub mod sequence;
pub mod typemap;

// Re-exports for convenient access
pub use catalog::{CatalogConnection, OracleCatalog};
pub use config::{Config, MigrationConfig, OutputConfig, SourceConfig, TargetConfig};
pub use crate::core::{Diagnostic, DiagnosticKind, Diagnostics, Severity, SqlValue};
pub use ddl::DdlAssembler;
pub use error::{MigrateError, Result};
pub use orchestrator::{MigrationResult, Orchestrator};
pub use script::{execute_files, split_statements, ImportSummary, StatementExecutor};
pub use sequence::{SequenceBounds, SequenceTranslator};
pub use typemap::{TypeMapper, TypeMapping};
