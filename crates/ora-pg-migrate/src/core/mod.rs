//! Core data types shared by every translation stage.
//!
//! - [`schema`]: descriptors for tables, columns, constraints, sequences, views
//! - [`value`]: source row values
//! - [`identifier`]: identifier validation and quoting
//! - [`diagnostics`]: structured channel for non-fatal conditions

pub mod diagnostics;
pub mod identifier;
pub mod schema;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use schema::{
    Column, Constraint, ConstraintKind, Index, ReferentialAction, Routine, Sequence, SourceType,
    Table, View,
};
pub use value::SqlValue;
