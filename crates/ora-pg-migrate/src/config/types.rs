//! Configuration type definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Source database labels (used for provenance headers).
    #[serde(default)]
    pub source: SourceConfig,

    /// Destination database configuration (PostgreSQL).
    #[serde(default)]
    pub target: TargetConfig,

    /// Translation behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,

    /// Script output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Source database (Oracle) labels.
///
/// The connection itself is handed to the engine as an opaque catalog
/// capability, so only descriptive values live here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database name written into provenance headers.
    #[serde(default = "default_unknown")]
    pub database_name: String,

    /// Environment label (e.g. "prod", "test") written into provenance headers.
    #[serde(default = "default_unknown")]
    pub environment: String,

    /// Owning schema, informational only (dictionary views are `USER_*`).
    #[serde(default)]
    pub schema: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            database_name: default_unknown(),
            environment: default_unknown(),
            schema: None,
        }
    }
}

/// Destination database (PostgreSQL) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Database host.
    #[serde(default = "default_localhost")]
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name.
    #[serde(default = "default_postgres")]
    pub database: String,

    /// Username.
    #[serde(default = "default_postgres")]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Target schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_localhost(),
            port: default_pg_port(),
            database: default_postgres(),
            user: default_postgres(),
            password: String::new(),
            schema: default_public_schema(),
        }
    }
}

impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Column-name heuristics that force a BOOLEAN target type.
///
/// All comparisons are case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BooleanHeuristics {
    /// Exact column names.
    #[serde(default)]
    pub names: Vec<String>,

    /// Column name prefixes (e.g. "IS_").
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Column name suffixes (e.g. "_FLAG").
    #[serde(default)]
    pub suffixes: Vec<String>,
}

impl BooleanHeuristics {
    /// Check whether a column name matches any configured heuristic.
    pub fn matches(&self, column_name: &str) -> bool {
        let name = column_name.to_uppercase();
        self.names.iter().any(|n| n.to_uppercase() == name)
            || self
                .prefixes
                .iter()
                .any(|p| !p.is_empty() && name.starts_with(&p.to_uppercase()))
            || self
                .suffixes
                .iter()
                .any(|s| !s.is_empty() && name.ends_with(&s.to_uppercase()))
    }

    /// True when no heuristic is configured.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.prefixes.is_empty() && self.suffixes.is_empty()
    }
}

/// Translation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Migrate every table in the source schema instead of the whitelist.
    #[serde(default)]
    pub migrate_all_tables: bool,

    /// Tables to migrate when `migrate_all_tables` is false.
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Tables never migrated.
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Table name prefixes never migrated.
    #[serde(default)]
    pub blacklist_prefixes: Vec<String>,

    /// Per-table column names excluded from DDL, INSERT, keys and comments.
    #[serde(default)]
    pub ignored_columns: BTreeMap<String, Vec<String>>,

    /// Explicit source type → target type overrides.
    #[serde(default = "default_type_mapping")]
    pub type_mapping: BTreeMap<String, String>,

    /// Column-name heuristics that force BOOLEAN.
    #[serde(default)]
    pub boolean_columns: BooleanHeuristics,

    /// Target type for a numeric column declared without precision and scale.
    #[serde(default = "default_bare_numeric_type")]
    pub bare_numeric_type: String,

    /// Emit CREATE SEQUENCE scripts (default: true).
    #[serde(default = "default_true")]
    pub migrate_sequences: bool,

    /// Emit CREATE INDEX scripts (default: true).
    #[serde(default = "default_true")]
    pub migrate_indexes: bool,

    /// Emit ALTER TABLE ... ADD CONSTRAINT scripts (default: true).
    #[serde(default = "default_true")]
    pub migrate_constraints: bool,

    /// Emit CREATE VIEW scripts (default: true).
    #[serde(default = "default_true")]
    pub migrate_views: bool,

    /// Emit procedural source as inert annotated blocks (default: false).
    #[serde(default)]
    pub migrate_routines: bool,

    /// Carry NOT NULL over to the destination (default: true).
    #[serde(default = "default_true")]
    pub transfer_not_null: bool,

    /// Carry column defaults over to the destination (default: true).
    #[serde(default = "default_true")]
    pub transfer_defaults: bool,

    /// Carry table and column comments over (default: true).
    #[serde(default = "default_true")]
    pub transfer_comments: bool,

    /// Apply best-effort function rewrites to view bodies (default: true).
    #[serde(default = "default_true")]
    pub rewrite_view_bodies: bool,

    /// Double-quote every emitted identifier (default: false).
    #[serde(default)]
    pub quote_identifiers: bool,

    /// Prefix prepended to every emitted index name.
    #[serde(default)]
    pub index_prefix: String,

    /// Suffix appended to every emitted sequence name.
    #[serde(default)]
    pub sequence_suffix: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrate_all_tables: false,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            blacklist_prefixes: Vec::new(),
            ignored_columns: BTreeMap::new(),
            type_mapping: default_type_mapping(),
            boolean_columns: BooleanHeuristics::default(),
            bare_numeric_type: default_bare_numeric_type(),
            migrate_sequences: true,
            migrate_indexes: true,
            migrate_constraints: true,
            migrate_views: true,
            migrate_routines: false,
            transfer_not_null: true,
            transfer_defaults: true,
            transfer_comments: true,
            rewrite_view_bodies: true,
            quote_identifiers: false,
            index_prefix: String::new(),
            sequence_suffix: String::new(),
        }
    }
}

impl MigrationConfig {
    /// Check if a table passes the blacklist and blacklist-prefix filters.
    pub fn should_migrate_table(&self, table: &str) -> bool {
        if self.blacklist.iter().any(|b| b.eq_ignore_ascii_case(table)) {
            return false;
        }
        let upper = table.to_uppercase();
        !self
            .blacklist_prefixes
            .iter()
            .any(|p| !p.is_empty() && upper.starts_with(&p.to_uppercase()))
    }

    /// Ignored column names for a table (upper-cased for comparison).
    pub fn ignored_columns_for(&self, table: &str) -> BTreeSet<String> {
        self.ignored_columns
            .iter()
            .filter(|(t, _)| t.eq_ignore_ascii_case(table))
            .flat_map(|(_, cols)| cols.iter().map(|c| c.trim().to_uppercase()))
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Look up an explicit type mapping, case-insensitively.
    pub fn explicit_type(&self, source_type: &str) -> Option<&str> {
        self.type_mapping
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(source_type))
            .map(|(_, v)| v.as_str())
    }
}

/// Script output layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root folder for generated scripts.
    #[serde(default = "default_output_dir")]
    pub base_dir: String,

    /// Place each artifact class in its own subfolder (default: true).
    #[serde(default = "default_true")]
    pub create_subfolders: bool,

    #[serde(default = "default_tables_create_dir")]
    pub tables_create_dir: String,

    #[serde(default = "default_tables_inserts_dir")]
    pub tables_inserts_dir: String,

    #[serde(default = "default_sequences_dir")]
    pub sequences_dir: String,

    #[serde(default = "default_indexes_dir")]
    pub indexes_dir: String,

    #[serde(default = "default_constraints_dir")]
    pub constraints_dir: String,

    #[serde(default = "default_views_dir")]
    pub views_dir: String,

    #[serde(default = "default_routines_dir")]
    pub routines_dir: String,

    /// Prefix every file with a provenance comment block (default: true).
    #[serde(default = "default_true")]
    pub provenance_headers: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_output_dir(),
            create_subfolders: true,
            tables_create_dir: default_tables_create_dir(),
            tables_inserts_dir: default_tables_inserts_dir(),
            sequences_dir: default_sequences_dir(),
            indexes_dir: default_indexes_dir(),
            constraints_dir: default_constraints_dir(),
            views_dir: default_views_dir(),
            routines_dir: default_routines_dir(),
            provenance_headers: true,
        }
    }
}

// Default value functions for serde
fn default_unknown() -> String {
    "unknown".to_string()
}

fn default_localhost() -> String {
    "localhost".to_string()
}

fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bare_numeric_type() -> String {
    "NUMERIC".to_string()
}

fn default_output_dir() -> String {
    "./output".to_string()
}

fn default_tables_create_dir() -> String {
    "tables_create".to_string()
}

fn default_tables_inserts_dir() -> String {
    "tables_inserts".to_string()
}

fn default_sequences_dir() -> String {
    "sequences".to_string()
}

fn default_indexes_dir() -> String {
    "indexes".to_string()
}

fn default_constraints_dir() -> String {
    "constraints".to_string()
}

fn default_views_dir() -> String {
    "views".to_string()
}

fn default_routines_dir() -> String {
    "routines".to_string()
}

/// Built-in explicit mappings, merged underneath user entries on load.
pub(crate) fn default_type_mapping() -> BTreeMap<String, String> {
    [
        ("TIMESTAMP", "TIMESTAMP WITHOUT TIME ZONE"),
        ("TIMESTAMP WITH TIME ZONE", "TIMESTAMP WITH TIME ZONE"),
        ("TIMESTAMP WITH LOCAL TIME ZONE", "TIMESTAMP WITH TIME ZONE"),
        ("FLOAT", "DOUBLE PRECISION"),
        ("BINARY_FLOAT", "REAL"),
        ("BINARY_DOUBLE", "DOUBLE PRECISION"),
        ("XMLTYPE", "XML"),
        ("ROWID", "VARCHAR(18)"),
        ("UROWID", "VARCHAR(4000)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
