//! Structured channel for non-fatal conditions.
//!
//! Translation never aborts a run for a recoverable problem. Instead the
//! condition is pushed here with a kind and severity, mirrored to `tracing`,
//! and surfaced in the final [`MigrationResult`](crate::orchestrator::MigrationResult).

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Category of a non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Dictionary query returned nothing; coarse cursor metadata was used.
    MetadataUnavailable,
    /// No mapping rule matched; the fallback type was used.
    UnmappableType,
    /// A sequence attribute was unparseable or outside destination range.
    NumericOverflow,
    /// A statement failed while replaying a script.
    StatementExecutionFailure,
    /// Catalog access or row streaming failed for one object.
    CatalogAccessFailure,
    /// A foreign key rule name is not one the destination supports.
    UnknownReferentialRule,
    /// A constraint references a column excluded by configuration.
    IgnoredColumnReference,
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One non-fatal condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Object the condition applies to (e.g., "CUSTOMER.STATUS").
    pub object: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.object, self.message)
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it to the log.
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        object: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            severity,
            object: object.into(),
            message: message.into(),
        };

        let (kind, object, message) = (&diagnostic.kind, &diagnostic.object, &diagnostic.message);
        match diagnostic.severity {
            Severity::Info => info!(?kind, "{}: {}", object, message),
            Severity::Warning => warn!(?kind, "{}: {}", object, message),
            Severity::Critical | Severity::Error => error!(?kind, "{}: {}", object, message),
        }

        self.entries.push(diagnostic);
    }

    /// Shorthand for a warning.
    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        object: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(kind, Severity::Warning, object, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Highest severity recorded, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|d| d.severity).max()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
