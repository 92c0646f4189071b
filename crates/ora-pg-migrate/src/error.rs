//! Error types for the migration library.
//!
//! Only conditions that abort a unit of work are errors. Everything the
//! translation layer can recover from is reported through
//! [`Diagnostics`](crate::core::Diagnostics) instead.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, inconsistent options, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog access failed (connectivity or dictionary query error).
    ///
    /// Aborts the object being translated, never the whole run.
    #[error("Catalog access failed for {object}: {message}")]
    Catalog { object: String, message: String },

    /// Destination database error
    #[error("Target database error: {0}")]
    Target(#[from] tokio_postgres::Error),

    /// Row streaming failed for a specific table
    #[error("Transfer failed for table {table}: {message}")]
    Transfer { table: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Migration was cancelled between objects
    #[error("Migration cancelled")]
    Cancelled,
}

impl MigrateError {
    /// Create a Catalog error for the named object.
    pub fn catalog(object: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Catalog {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Create a Transfer error
    pub fn transfer(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Transfer {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
