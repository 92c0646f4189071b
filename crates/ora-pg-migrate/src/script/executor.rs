//! Sequential replay of SQL script files against a destination connection.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};

use super::tokenizer::split_statements;
use crate::core::{DiagnosticKind, Diagnostics, Severity};
use crate::error::Result;

/// Characters of a failing statement kept in logs and reports.
pub const STATEMENT_EXCERPT_LEN: usize = 100;

/// Execute one statement on the destination.
///
/// Each call is committed on its own; there is no surrounding transaction.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_statement(&self, sql: &str) -> Result<()>;
}

#[async_trait]
impl StatementExecutor for tokio_postgres::Client {
    async fn execute_statement(&self, sql: &str) -> Result<()> {
        self.batch_execute(sql).await?;
        Ok(())
    }
}

/// A statement that failed during replay.
#[derive(Debug, Clone, Serialize)]
pub struct StatementFailure {
    /// 1-based position of the statement in its file.
    pub index: usize,
    /// First characters of the statement text.
    pub excerpt: String,
    pub error: String,
}

/// Outcome of replaying one script.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub name: String,
    pub statements_total: usize,
    pub statements_succeeded: usize,
    pub statements_failed: usize,
    pub failures: Vec<StatementFailure>,
    /// Set when the file could not be read at all.
    pub read_error: Option<String>,
}

impl FileReport {
    /// A file succeeds when it was read and every statement ran.
    pub fn is_success(&self) -> bool {
        self.read_error.is_none() && self.statements_failed == 0
    }
}

/// Aggregate outcome of replaying a list of scripts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub files: Vec<FileReport>,
    pub files_total: usize,
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub statements_total: usize,
    pub statements_succeeded: usize,
    pub statements_failed: usize,
    /// File names (without `.sql`) that had at least one failure.
    pub failed_files: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl ImportSummary {
    fn record(&mut self, report: FileReport) {
        self.files_total += 1;
        self.statements_total += report.statements_total;
        self.statements_succeeded += report.statements_succeeded;
        self.statements_failed += report.statements_failed;

        if report.is_success() {
            self.files_succeeded += 1;
        } else {
            self.files_failed += 1;
            self.failed_files.push(display_name(&report.name));
        }
        self.files.push(report);
    }
}

fn display_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".sql") {
        name[..name.len() - 4].to_string()
    } else {
        name.to_string()
    }
}

fn excerpt(sql: &str) -> String {
    sql.chars().take(STATEMENT_EXCERPT_LEN).collect()
}

/// Replay the statements of one script in order, continuing past failures.
pub async fn execute_script<E: StatementExecutor + ?Sized>(
    executor: &E,
    name: &str,
    script: &str,
    diagnostics: &mut Diagnostics,
) -> FileReport {
    let mut report = FileReport {
        name: name.to_string(),
        ..FileReport::default()
    };

    for (i, statement) in split_statements(script).iter().enumerate() {
        report.statements_total += 1;
        debug!("{}: executing statement {}", name, i + 1);

        match executor.execute_statement(statement).await {
            Ok(()) => report.statements_succeeded += 1,
            Err(e) => {
                let excerpt = excerpt(statement);
                error!("{}: statement {} failed: {} [{}]", name, i + 1, e, excerpt);
                diagnostics.push(
                    DiagnosticKind::StatementExecutionFailure,
                    Severity::Error,
                    name,
                    format!("{}: {}", e, excerpt),
                );
                report.statements_failed += 1;
                report.failures.push(StatementFailure {
                    index: i + 1,
                    excerpt,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Replay script files in the given order.
///
/// An unreadable file counts as a failed file with no statements.
pub async fn execute_files<E: StatementExecutor + ?Sized>(
    executor: &E,
    paths: &[PathBuf],
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let report = match std::fs::read_to_string(path) {
            Ok(script) => {
                info!("Executing {}", path.display());
                execute_script(executor, &name, &script, &mut summary.diagnostics).await
            }
            Err(e) => {
                error!("Cannot read {}: {}", path.display(), e);
                summary.diagnostics.push(
                    DiagnosticKind::StatementExecutionFailure,
                    Severity::Error,
                    &name,
                    format!("cannot read file: {}", e),
                );
                FileReport {
                    name,
                    read_error: Some(e.to_string()),
                    ..FileReport::default()
                }
            }
        };

        summary.record(report);
    }

    info!(
        "Import finished: {}/{} files succeeded, {}/{} statements succeeded",
        summary.files_succeeded,
        summary.files_total,
        summary.statements_succeeded,
        summary.statements_total
    );

    summary
}

/// List the `*.sql` files of a folder in name order.
pub fn collect_script_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_sql = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if path.is_file() && is_sql {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
