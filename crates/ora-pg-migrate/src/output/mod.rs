//! Script file layout and writing.
//!
//! Every artifact class has its own folder under `base_dir` when
//! `create_subfolders` is set; otherwise all files land in `base_dir`.
//! Per-table artifacts are named `<TABLE>_create.sql` and
//! `<TABLE>_inserts.sql`; aggregate artifacts use a fixed file name.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::config::{OutputConfig, SourceConfig};
use crate::error::Result;

/// Class of generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    TableCreate,
    TableInserts,
    Sequences,
    Indexes,
    Constraints,
    Views,
    Routines,
}

impl ArtifactKind {
    /// File name for this artifact. `object` is used by per-table kinds.
    pub fn file_name(&self, object: &str) -> String {
        match self {
            ArtifactKind::TableCreate => format!("{}_create.sql", object),
            ArtifactKind::TableInserts => format!("{}_inserts.sql", object),
            ArtifactKind::Sequences => "sequences.sql".to_string(),
            ArtifactKind::Indexes => "indexes.sql".to_string(),
            ArtifactKind::Constraints => "constraints.sql".to_string(),
            ArtifactKind::Views => "views.sql".to_string(),
            ArtifactKind::Routines => "routines.sql".to_string(),
        }
    }
}

/// Writes generated scripts into the configured folder layout.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    output: OutputConfig,
    database_name: String,
    environment: String,
}

impl ScriptWriter {
    pub fn new(output: &OutputConfig, source: &SourceConfig) -> Self {
        Self {
            output: output.clone(),
            database_name: source.database_name.clone(),
            environment: source.environment.clone(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        Path::new(&self.output.base_dir)
    }

    /// Folder that holds artifacts of the given kind.
    pub fn dir_for(&self, kind: ArtifactKind) -> PathBuf {
        let base = self.base_dir();
        if !self.output.create_subfolders {
            return base.to_path_buf();
        }
        let sub = match kind {
            ArtifactKind::TableCreate => &self.output.tables_create_dir,
            ArtifactKind::TableInserts => &self.output.tables_inserts_dir,
            ArtifactKind::Sequences => &self.output.sequences_dir,
            ArtifactKind::Indexes => &self.output.indexes_dir,
            ArtifactKind::Constraints => &self.output.constraints_dir,
            ArtifactKind::Views => &self.output.views_dir,
            ArtifactKind::Routines => &self.output.routines_dir,
        };
        base.join(sub)
    }

    pub fn path_for(&self, kind: ArtifactKind, object: &str) -> PathBuf {
        self.dir_for(kind).join(kind.file_name(object))
    }

    /// Provenance comment block placed at the top of a script.
    pub fn header(&self, object: &str) -> String {
        format!(
            "-- Created: {}\n-- Source object: {}\n-- Database: {}\n-- Environment: {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            object,
            self.database_name,
            self.environment
        )
    }

    /// Create a script file, writing the provenance header if enabled.
    pub fn create(&self, kind: ArtifactKind, object: &str) -> Result<ScriptFile> {
        let dir = self.dir_for(kind);
        fs::create_dir_all(&dir)?;
        let path = dir.join(kind.file_name(object));

        let mut file = ScriptFile {
            writer: BufWriter::new(File::create(&path)?),
            path,
            statements: 0,
        };
        if self.output.provenance_headers {
            file.writer.write_all(self.header(object).as_bytes())?;
        }
        Ok(file)
    }

    /// Write a complete script in one go.
    pub fn write(&self, kind: ArtifactKind, object: &str, body: &str) -> Result<PathBuf> {
        let mut file = self.create(kind, object)?;
        file.write_raw(body)?;
        file.finish()
    }
}

/// A script being written.
pub struct ScriptFile {
    writer: BufWriter<File>,
    path: PathBuf,
    statements: usize,
}

impl ScriptFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of statements appended with [`write_statement`](Self::write_statement).
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Append one rendered statement.
    pub fn write_statement(&mut self, sql: &str) -> Result<()> {
        self.writer.write_all(sql.as_bytes())?;
        self.statements += 1;
        Ok(())
    }

    /// Append text that is not counted as a statement.
    pub fn write_raw(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Flush and close the file, returning its path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        debug!("Wrote {} ({} statements)", self.path.display(), self.statements);
        Ok(self.path)
    }
}
