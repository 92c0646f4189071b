//! PostgreSQL DDL and DML text assembly.
//!
//! The assembler is pure text composition: it never touches the catalog
//! and never fails. Conditions that make a statement impossible (for
//! example a foreign key over an ignored column) skip that statement and
//! record a diagnostic.

mod comment;
mod constraint;
mod index;
mod insert;
mod routine;
mod table;
mod view;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::MigrationConfig;
use crate::core::identifier::pg_ident;

pub use comment::{comment_literal, CommentOn, MULTILINE_PLACEHOLDER};
pub use table::translate_default;

/// Statement terminator used in every generated script.
pub const STATEMENT_END: &str = ";\n";

/// Options that shape generated DDL.
#[derive(Debug, Clone, Default)]
pub struct DdlOptions {
    pub quote_identifiers: bool,
    pub transfer_not_null: bool,
    pub transfer_defaults: bool,
    pub transfer_comments: bool,
    pub rewrite_view_bodies: bool,
    pub index_prefix: String,
    pub sequence_suffix: String,
}

impl DdlOptions {
    pub fn from_config(config: &MigrationConfig) -> Self {
        Self {
            quote_identifiers: config.quote_identifiers,
            transfer_not_null: config.transfer_not_null,
            transfer_defaults: config.transfer_defaults,
            transfer_comments: config.transfer_comments,
            rewrite_view_bodies: config.rewrite_view_bodies,
            index_prefix: config.index_prefix.clone(),
            sequence_suffix: config.sequence_suffix.clone(),
        }
    }
}

/// Composes descriptors and resolved types into statement text.
#[derive(Debug, Clone, Default)]
pub struct DdlAssembler {
    options: DdlOptions,
    /// Upper-cased table name → upper-cased ignored column names.
    ignored: BTreeMap<String, BTreeSet<String>>,
}

impl DdlAssembler {
    /// Create an assembler from the migration configuration.
    pub fn new(config: &MigrationConfig) -> Self {
        let ignored = config
            .ignored_columns
            .keys()
            .map(|table| (table.to_uppercase(), config.ignored_columns_for(table)))
            .collect();

        Self {
            options: DdlOptions::from_config(config),
            ignored,
        }
    }

    /// Create an assembler from explicit options, with no ignored columns.
    pub fn with_options(options: DdlOptions) -> Self {
        Self {
            options,
            ignored: BTreeMap::new(),
        }
    }

    fn ident(&self, name: &str) -> String {
        pg_ident(name, self.options.quote_identifiers)
    }

    fn ident_list<S: AsRef<str>>(&self, names: &[S]) -> String {
        crate::core::identifier::pg_ident_list(names, self.options.quote_identifiers)
    }

    fn is_ignored(&self, table: &str, column: &str) -> bool {
        self.ignored
            .get(&table.to_uppercase())
            .is_some_and(|cols| cols.contains(&column.to_uppercase()))
    }
}
