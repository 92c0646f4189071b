//! Schema and metadata descriptors for tables, columns, constraints, and
//! the other catalog objects read from the source database.
//!
//! Descriptors are built fresh for each object, used for that object's
//! translation, and then dropped. Nothing here caches across objects.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A source column type: base name plus optional length, precision and scale.
///
/// Renders as an Oracle-style tag such as `NUMBER(10,2)` or `VARCHAR2(100)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceType {
    /// Base type name (e.g., "NUMBER", "VARCHAR2", "TIMESTAMP(6)").
    pub name: String,

    /// Declared character or byte length.
    pub length: Option<u32>,

    /// Numeric precision.
    pub precision: Option<u32>,

    /// Numeric scale (may be negative for rounding-left types).
    pub scale: Option<i32>,
}

impl SourceType {
    /// Create a type with no size information.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_uppercase(),
            length: None,
            precision: None,
            scale: None,
        }
    }

    /// Create a numeric type with optional precision and scale.
    pub fn numeric(name: impl Into<String>, precision: Option<u32>, scale: Option<i32>) -> Self {
        Self {
            precision,
            scale,
            ..Self::new(name)
        }
    }

    /// Set the declared length.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// True for the exact-numeric family (`NUMBER`, `NUMERIC`, `DECIMAL`, `INTEGER`...).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.name.as_str(),
            "NUMBER" | "NUMERIC" | "DECIMAL" | "DEC" | "INTEGER" | "INT" | "SMALLINT"
        )
    }

    /// Type name with any parenthesized size segments removed.
    ///
    /// `TIMESTAMP(6) WITH TIME ZONE` becomes `TIMESTAMP WITH TIME ZONE`.
    pub fn base_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut depth = 0usize;
        for ch in self.name.chars() {
            match ch {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ if depth == 0 => out.push(ch),
                _ => {}
            }
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Full tag including size information.
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.precision, self.scale, self.length) {
            (Some(p), Some(s), _) => write!(f, "{}({},{})", self.name, p, s),
            (Some(p), None, _) => write!(f, "{}({})", self.name, p),
            (None, _, Some(len)) if !self.name.contains('(') => {
                write!(f, "{}({})", self.name, len)
            }
            _ => write!(f, "{}", self.name),
        }
    }
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Declared source type.
    pub source_type: SourceType,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Raw default expression text as stored by the source.
    pub default: Option<String>,

    /// Column comment.
    pub comment: Option<String>,
}

impl Column {
    /// Create a nullable column with no default or comment.
    pub fn new(name: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            source_type,
            is_nullable: true,
            default: None,
            comment: None,
        }
    }
}

/// Table metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Column definitions in source order.
    pub columns: Vec<Column>,

    /// Primary key constraint, if any.
    pub primary_key: Option<Constraint>,

    /// Upper-cased names of columns excluded from every emitted statement.
    pub ignored_columns: BTreeSet<String>,

    /// Table comment.
    pub comment: Option<String>,
}

impl Table {
    /// Create an empty table descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            ignored_columns: BTreeSet::new(),
            comment: None,
        }
    }

    /// Check whether a column is ignored.
    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignored_columns.contains(&column.to_uppercase())
    }

    /// Columns that take part in DDL and INSERT output, in source order.
    pub fn migrated_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| !self.is_ignored(&c.name))
    }

    /// Find a column by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Constraint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Check,
}

impl ConstraintKind {
    /// Map the Oracle `CONSTRAINT_TYPE` code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "P" => Some(ConstraintKind::PrimaryKey),
            "R" => Some(ConstraintKind::ForeignKey),
            "C" => Some(ConstraintKind::Check),
            _ => None,
        }
    }
}

/// Referential action for foreign key update/delete rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
    /// Any rule name outside the known set.
    Unknown(String),
}

impl ReferentialAction {
    /// Parse a rule name as reported by the catalog.
    pub fn from_rule(rule: &str) -> Self {
        let normalized = rule.trim().to_uppercase().replace('_', " ");
        match normalized.as_str() {
            "CASCADE" => ReferentialAction::Cascade,
            "SET NULL" => ReferentialAction::SetNull,
            "SET DEFAULT" => ReferentialAction::SetDefault,
            "RESTRICT" => ReferentialAction::Restrict,
            "NO ACTION" => ReferentialAction::NoAction,
            _ => ReferentialAction::Unknown(rule.trim().to_string()),
        }
    }

    /// SQL keyword text, or `None` for an unknown rule.
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            ReferentialAction::Cascade => Some("CASCADE"),
            ReferentialAction::SetNull => Some("SET NULL"),
            ReferentialAction::SetDefault => Some("SET DEFAULT"),
            ReferentialAction::Restrict => Some("RESTRICT"),
            ReferentialAction::NoAction => Some("NO ACTION"),
            ReferentialAction::Unknown(_) => None,
        }
    }
}

/// Primary key, foreign key, or check constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint kind.
    pub kind: ConstraintKind,

    /// Constraint name.
    pub name: String,

    /// Owning table.
    pub table: String,

    /// Constrained columns, in key order.
    pub columns: Vec<String>,

    /// Referenced table (foreign keys only).
    pub ref_table: Option<String>,

    /// Referenced columns (foreign keys only).
    pub ref_columns: Vec<String>,

    /// ON DELETE rule.
    pub on_delete: Option<ReferentialAction>,

    /// ON UPDATE rule.
    pub on_update: Option<ReferentialAction>,

    /// Check condition text (check constraints only).
    pub condition: Option<String>,
}

impl Constraint {
    /// Create a primary key constraint.
    pub fn primary_key(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            kind: ConstraintKind::PrimaryKey,
            name: name.into(),
            table: table.into(),
            columns,
            ref_table: None,
            ref_columns: Vec::new(),
            on_delete: None,
            on_update: None,
            condition: None,
        }
    }

    /// Create a foreign key constraint.
    pub fn foreign_key(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
        ref_table: impl Into<String>,
        ref_columns: Vec<String>,
    ) -> Self {
        Self {
            kind: ConstraintKind::ForeignKey,
            ref_table: Some(ref_table.into()),
            ref_columns,
            ..Self::primary_key(name, table, columns)
        }
    }

    /// Create a check constraint.
    pub fn check(
        name: impl Into<String>,
        table: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            kind: ConstraintKind::Check,
            condition: Some(condition.into()),
            ..Self::primary_key(name, table, Vec::new())
        }
    }
}

/// Index metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Indexed table.
    pub table: String,

    /// Whether this is a unique index.
    pub is_unique: bool,

    /// Index columns (in order).
    pub columns: Vec<String>,
}

/// Sequence metadata.
///
/// All numeric attributes stay textual: Oracle sequences routinely carry
/// bounds such as `9999999999999999999999999999` that exceed 64 bits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequence {
    /// Sequence name.
    pub name: String,

    /// MIN_VALUE as reported by the catalog.
    pub min_value: String,

    /// MAX_VALUE as reported by the catalog.
    pub max_value: String,

    /// INCREMENT_BY as reported by the catalog.
    pub increment_by: String,

    /// CACHE_SIZE as reported by the catalog.
    pub cache_size: String,

    /// Whether the sequence cycles.
    pub cycle: bool,

    /// LAST_NUMBER as reported by the catalog.
    pub last_value: String,
}

/// View metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    /// View name.
    pub name: String,

    /// Query text of the view.
    pub text: String,

    /// View comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Stored procedural object (function, procedure, package, trigger, type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    /// Object name.
    pub name: String,

    /// Object kind as reported by the catalog (e.g., "PROCEDURE").
    pub kind: String,

    /// Full source text.
    pub source: String,
}
