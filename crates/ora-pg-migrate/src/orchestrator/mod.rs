//! Migration orchestrator - main workflow coordinator.
//!
//! Phases run strictly in order: tables (CREATE then INSERT per table),
//! sequences, indexes, constraints, views, routines. A failing table is
//! recorded and skipped; the run continues with the next object.
//! Cancellation is honoured between objects, never inside one.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogConnection, OracleCatalog};
use crate::config::Config;
use crate::core::{Column, DiagnosticKind, Diagnostics, Severity, Table};
use crate::ddl::DdlAssembler;
use crate::error::{MigrateError, Result};
use crate::format::format_value;
use crate::output::{ArtifactKind, ScriptWriter};
use crate::sequence::{SequenceBounds, SequenceTranslator};
use crate::typemap::{ColumnTypeMap, TypeMapper, FALLBACK_TYPE};

/// Rows between progress log lines while writing INSERT scripts.
const PROGRESS_INTERVAL: u64 = 1000;

/// Remove the scripts of a table that did not finish exporting so a later
/// replay does not pick them up.
fn discard_partial(paths: &[PathBuf]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => debug!("Removed partial script {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove partial script {}: {}", path.display(), e),
        }
    }
}

/// Migration orchestrator.
pub struct Orchestrator<C> {
    config: Config,
    catalog: OracleCatalog<C>,
    mapper: TypeMapper,
    assembler: DdlAssembler,
    sequences: SequenceTranslator,
    writer: ScriptWriter,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationResult {
    /// Final status: "completed", "failed" or "cancelled".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Tables selected for migration.
    pub tables_total: usize,

    /// Tables whose CREATE and INSERT scripts were written.
    pub tables_success: usize,

    /// Tables that failed.
    pub tables_failed: usize,

    /// INSERT statements written across all tables.
    pub rows_exported: u64,

    /// List of failed table names.
    pub failed_tables: Vec<String>,

    pub sequences_written: usize,
    pub indexes_written: usize,
    pub constraints_written: usize,
    pub views_written: usize,
    pub routines_written: usize,

    /// Every script file written, in order.
    pub files: Vec<PathBuf>,

    /// Non-fatal conditions raised during the run.
    pub diagnostics: Diagnostics,
}

/// Outcome of one table.
struct TableExport {
    rows: u64,
    files: Vec<PathBuf>,
}

/// Mutable bookkeeping threaded through the phases.
#[derive(Default)]
struct RunState {
    diagnostics: Diagnostics,
    files: Vec<PathBuf>,
    cancelled: bool,
}

impl<C: CatalogConnection> Orchestrator<C> {
    /// Create a new orchestrator over a source catalog connection.
    pub fn new(config: Config, connection: C) -> Result<Self> {
        config.validate()?;

        let mapper = TypeMapper::new(&config.migration);
        let assembler = DdlAssembler::new(&config.migration);
        let sequences = SequenceTranslator::new(SequenceBounds::default())
            .with_suffix(config.migration.sequence_suffix.clone());
        let writer = ScriptWriter::new(&config.output, &config.source);

        Ok(Self {
            config,
            catalog: OracleCatalog::new(connection),
            mapper,
            assembler,
            sequences,
            writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the migration.
    pub async fn run(&self, cancel: Option<CancellationToken>) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let cancel = cancel.unwrap_or_else(CancellationToken::new);
        let mut state = RunState::default();

        info!(
            "Starting migration of {} ({})",
            self.config.source.database_name, self.config.source.environment
        );

        info!("Phase 1: Selecting tables");
        let tables = self.select_tables().await?;
        info!("Found {} tables to migrate", tables.len());

        info!("Phase 2: Exporting tables");
        let mut tables_success = 0;
        let mut failed_tables = Vec::new();
        let mut migrated = BTreeSet::new();
        let mut rows_exported = 0;

        for name in &tables {
            if cancel.is_cancelled() {
                info!("Cancellation requested, stopping before table {}", name);
                state.cancelled = true;
                break;
            }

            match self.export_table(name, &mut state.diagnostics).await {
                Ok(export) => {
                    info!("{}: completed ({} rows)", name, export.rows);
                    tables_success += 1;
                    rows_exported += export.rows;
                    state.files.extend(export.files);
                    migrated.insert(name.to_uppercase());
                }
                Err(e) => {
                    error!("{}: failed: {}", name, e);
                    state.diagnostics.push(
                        DiagnosticKind::CatalogAccessFailure,
                        Severity::Error,
                        name,
                        e.to_string(),
                    );
                    failed_tables.push(name.clone());
                }
            }
        }

        let sequences_written = self
            .run_phase(&cancel, &mut state, Phase::Sequences, &migrated)
            .await?;
        let indexes_written = self
            .run_phase(&cancel, &mut state, Phase::Indexes, &migrated)
            .await?;
        let constraints_written = self
            .run_phase(&cancel, &mut state, Phase::Constraints, &migrated)
            .await?;
        let views_written = self
            .run_phase(&cancel, &mut state, Phase::Views, &migrated)
            .await?;
        let routines_written = self
            .run_phase(&cancel, &mut state, Phase::Routines, &migrated)
            .await?;

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let status = if state.cancelled {
            "cancelled"
        } else if !failed_tables.is_empty() {
            "failed"
        } else {
            "completed"
        };

        let result = MigrationResult {
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            tables_total: tables.len(),
            tables_success,
            tables_failed: failed_tables.len(),
            rows_exported,
            failed_tables,
            sequences_written,
            indexes_written,
            constraints_written,
            views_written,
            routines_written,
            files: state.files,
            diagnostics: state.diagnostics,
        };

        info!(
            "Migration {}: {}/{} tables, {} rows in {:.1}s ({} diagnostics)",
            result.status,
            result.tables_success,
            result.tables_total,
            result.rows_exported,
            result.duration_seconds,
            result.diagnostics.len()
        );

        Ok(result)
    }

    /// Tables to migrate: the whitelist or every source table, minus the
    /// blacklist and blacklisted prefixes.
    pub async fn select_tables(&self) -> Result<Vec<String>> {
        let migration = &self.config.migration;
        let candidates = if migration.migrate_all_tables {
            self.catalog.list_tables().await?
        } else {
            migration.whitelist.iter().map(|t| t.trim().to_string()).collect()
        };

        let mut seen = BTreeSet::new();
        let selected: Vec<String> = candidates
            .into_iter()
            .filter(|t| !t.is_empty() && seen.insert(t.to_uppercase()))
            .filter(|t| {
                let keep = migration.should_migrate_table(t);
                if !keep {
                    debug!("Skipping blacklisted table {}", t);
                }
                keep
            })
            .collect();
        Ok(selected)
    }

    /// Write the CREATE and INSERT scripts of one table.
    async fn export_table(&self, name: &str, diagnostics: &mut Diagnostics) -> Result<TableExport> {
        let ignored = self.config.migration.ignored_columns_for(name);
        let table = self.catalog.load_table(name, ignored, diagnostics).await?;

        let types = self.mapper.map_table(&table, diagnostics);
        let create = self.assembler.render_create_table(&table, &types);
        let create_path = self.writer.write(ArtifactKind::TableCreate, &table.name, &create)?;

        match self.export_rows(&table, &types).await {
            Ok((rows, inserts_path)) => Ok(TableExport {
                rows,
                files: vec![create_path, inserts_path],
            }),
            Err(e) => {
                let inserts_path = self.writer.path_for(ArtifactKind::TableInserts, &table.name);
                discard_partial(&[create_path, inserts_path]);
                Err(e)
            }
        }
    }

    async fn export_rows(&self, table: &Table, types: &ColumnTypeMap) -> Result<(u64, PathBuf)> {
        let columns: Vec<&Column> = table.migrated_columns().collect();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        let tags: Vec<String> = columns.iter().map(|c| c.source_type.tag()).collect();
        let targets: Vec<&str> = names
            .iter()
            .map(|n| types.get(n).unwrap_or(FALLBACK_TYPE))
            .collect();

        let mut file = self.writer.create(ArtifactKind::TableInserts, &table.name)?;
        let mut stream = self.catalog.stream_rows(table).await?;
        let mut rows: u64 = 0;

        while let Some(row) = stream.next().await {
            let row = row.map_err(|e| MigrateError::transfer(&table.name, e.to_string()))?;
            if row.len() != names.len() {
                return Err(MigrateError::transfer(
                    &table.name,
                    format!("expected {} values per row, got {}", names.len(), row.len()),
                ));
            }

            let literals: Vec<String> = row
                .iter()
                .zip(tags.iter().zip(&targets))
                .map(|(value, (tag, target))| format_value(value, tag, Some(*target)))
                .collect();
            file.write_statement(&self.assembler.render_insert(&table.name, &names, &literals))?;

            rows += 1;
            if rows % PROGRESS_INTERVAL == 0 {
                info!("{}: {} rows written", table.name, rows);
            }
        }

        Ok((rows, file.finish()?))
    }

    /// Run one aggregate phase if enabled. Returns the number of objects
    /// written. A catalog failure is recorded and the phase is skipped.
    async fn run_phase(
        &self,
        cancel: &CancellationToken,
        state: &mut RunState,
        phase: Phase,
        migrated: &BTreeSet<String>,
    ) -> Result<usize> {
        if state.cancelled || !phase.enabled(&self.config) {
            return Ok(0);
        }
        if cancel.is_cancelled() {
            info!("Cancellation requested, skipping {}", phase.label());
            state.cancelled = true;
            return Ok(0);
        }

        info!("Exporting {}", phase.label());
        let rendered = match self.render_phase(phase, migrated, &mut state.diagnostics).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("Skipping {}: {}", phase.label(), e);
                state.diagnostics.push(
                    DiagnosticKind::CatalogAccessFailure,
                    Severity::Error,
                    phase.label(),
                    e.to_string(),
                );
                return Ok(0);
            }
        };

        let mut file = self.writer.create(phase.artifact(), phase.label())?;
        for statement in &rendered {
            file.write_statement(statement)?;
            file.write_raw("\n")?;
        }
        state.files.push(file.finish()?);

        info!("Wrote {} {}", rendered.len(), phase.label());
        Ok(rendered.len())
    }

    async fn render_phase(
        &self,
        phase: Phase,
        migrated: &BTreeSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<String>> {
        let is_migrated = |table: &str| migrated.contains(&table.to_uppercase());
        let quote = self.config.migration.quote_identifiers;

        let rendered = match phase {
            Phase::Sequences => self
                .catalog
                .load_sequences()
                .await?
                .iter()
                .map(|seq| self.sequences.translate(seq, diagnostics).to_sql(quote))
                .collect(),
            Phase::Indexes => self
                .catalog
                .load_indexes()
                .await?
                .iter()
                .filter(|index| is_migrated(&index.table))
                .filter_map(|index| self.assembler.render_index(index, diagnostics))
                .collect(),
            Phase::Constraints => self
                .catalog
                .load_constraints()
                .await?
                .iter()
                .filter(|constraint| is_migrated(&constraint.table))
                .filter_map(|constraint| self.assembler.render_constraint(constraint, diagnostics))
                .collect(),
            Phase::Views => self
                .catalog
                .load_views()
                .await?
                .iter()
                .map(|view| self.assembler.render_view(view))
                .collect(),
            Phase::Routines => self
                .catalog
                .load_routines()
                .await?
                .iter()
                .map(|routine| self.assembler.render_routine_annotation(routine))
                .collect(),
        };
        Ok(rendered)
    }
}

/// Aggregate export phases, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sequences,
    Indexes,
    Constraints,
    Views,
    Routines,
}

impl Phase {
    fn enabled(&self, config: &Config) -> bool {
        let m = &config.migration;
        match self {
            Phase::Sequences => m.migrate_sequences,
            Phase::Indexes => m.migrate_indexes,
            Phase::Constraints => m.migrate_constraints,
            Phase::Views => m.migrate_views,
            Phase::Routines => m.migrate_routines,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Phase::Sequences => "sequences",
            Phase::Indexes => "indexes",
            Phase::Constraints => "constraints",
            Phase::Views => "views",
            Phase::Routines => "routines",
        }
    }

    fn artifact(&self) -> ArtifactKind {
        match self {
            Phase::Sequences => ArtifactKind::Sequences,
            Phase::Indexes => ArtifactKind::Indexes,
            Phase::Constraints => ArtifactKind::Constraints,
            Phase::Views => ArtifactKind::Views,
            Phase::Routines => ArtifactKind::Routines,
        }
    }
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
