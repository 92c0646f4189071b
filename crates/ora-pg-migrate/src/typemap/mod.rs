//! Type mapping from Oracle column types to PostgreSQL.
//!
//! Rules are evaluated in a fixed priority order and the first match wins:
//!
//! 1. `DATE` → `TIMESTAMP WITHOUT TIME ZONE` (Oracle dates carry a time of day)
//! 2. Column name matches a boolean heuristic → `BOOLEAN`
//! 3. Numeric with precision 1, scale 0 → `BOOLEAN`
//! 4. Numeric with scale 0 → `BIGINT`
//! 5. Numeric with scale > 0 → `NUMERIC`
//! 6. Explicit entry in the configured type map
//! 7. Variable-length character → `VARCHAR(n)`
//! 8. Fixed-length character → unchanged
//! 9. Character LOB → `TEXT`, binary LOB or raw → `BYTEA`
//! 10. Anything else → `TEXT`, with a warning
//!
//! A numeric type declared with neither precision nor scale maps to the
//! configured `bare_numeric_type`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{BooleanHeuristics, MigrationConfig};
use crate::core::{DiagnosticKind, Diagnostics, SourceType, Table};

/// Target type used when no rule matches.
pub const FALLBACK_TYPE: &str = "TEXT";

/// Which rule produced a target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingRule {
    DateAsTimestamp,
    BooleanName,
    BooleanPrecision,
    IntegerScale,
    DecimalScale,
    BareNumeric,
    Explicit,
    VariableCharacter,
    FixedCharacter,
    LargeObject,
    Fallback,
}

/// Result of a type mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target PostgreSQL type.
    pub target_type: String,

    /// Rule that matched.
    pub rule: MappingRule,

    /// Warning message, set only for the fallback rule.
    pub warning: Option<String>,
}

impl TypeMapping {
    fn new(target_type: impl Into<String>, rule: MappingRule) -> Self {
        Self {
            target_type: target_type.into(),
            rule,
            warning: None,
        }
    }

    /// True when the target type is BOOLEAN.
    pub fn is_boolean(&self) -> bool {
        self.target_type.eq_ignore_ascii_case("BOOLEAN")
    }
}

/// Oracle → PostgreSQL type mapper.
///
/// Holds its own copy of the mapping-related configuration, so a mapper
/// built once answers identically for the whole run.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    explicit: BTreeMap<String, String>,
    boolean_columns: BooleanHeuristics,
    bare_numeric_type: String,
}

impl TypeMapper {
    /// Create a mapper from the migration configuration.
    pub fn new(config: &MigrationConfig) -> Self {
        let explicit = config
            .type_mapping
            .iter()
            .map(|(k, v)| (k.trim().to_uppercase(), v.trim().to_string()))
            .collect();

        Self {
            explicit,
            boolean_columns: config.boolean_columns.clone(),
            bare_numeric_type: config.bare_numeric_type.trim().to_string(),
        }
    }

    /// Map a single column type.
    pub fn map_type(&self, ty: &SourceType, column_name: &str) -> TypeMapping {
        let base = ty.base_name();

        if base == "DATE" {
            return TypeMapping::new("TIMESTAMP WITHOUT TIME ZONE", MappingRule::DateAsTimestamp);
        }

        if self.boolean_columns.matches(column_name) {
            return TypeMapping::new("BOOLEAN", MappingRule::BooleanName);
        }

        if ty.is_numeric() {
            return self.map_numeric(ty);
        }

        if let Some(target) = self.lookup_explicit(ty) {
            return TypeMapping::new(target, MappingRule::Explicit);
        }

        match base.as_str() {
            "VARCHAR2" | "NVARCHAR2" | "VARCHAR" => {
                let target = match ty.length {
                    Some(len) if len > 0 => format!("VARCHAR({})", len),
                    _ => "VARCHAR".to_string(),
                };
                TypeMapping::new(target, MappingRule::VariableCharacter)
            }
            "CHAR" | "NCHAR" => TypeMapping::new(ty.tag(), MappingRule::FixedCharacter),
            "CLOB" | "NCLOB" | "LONG" => TypeMapping::new("TEXT", MappingRule::LargeObject),
            "BLOB" | "RAW" | "LONG RAW" | "BFILE" => {
                TypeMapping::new("BYTEA", MappingRule::LargeObject)
            }
            _ => TypeMapping {
                target_type: FALLBACK_TYPE.to_string(),
                rule: MappingRule::Fallback,
                warning: Some(format!(
                    "Unknown source type {} for column {}, using {}",
                    ty.tag(),
                    column_name,
                    FALLBACK_TYPE
                )),
            },
        }
    }

    fn map_numeric(&self, ty: &SourceType) -> TypeMapping {
        if matches!(ty.name.as_str(), "INTEGER" | "INT" | "SMALLINT") {
            return TypeMapping::new("BIGINT", MappingRule::IntegerScale);
        }

        match (ty.precision, ty.scale) {
            (Some(1), Some(0) | None) => TypeMapping::new("BOOLEAN", MappingRule::BooleanPrecision),
            (None, None) => {
                TypeMapping::new(self.bare_numeric_type.clone(), MappingRule::BareNumeric)
            }
            (_, Some(scale)) if scale > 0 => TypeMapping::new("NUMERIC", MappingRule::DecimalScale),
            _ => TypeMapping::new("BIGINT", MappingRule::IntegerScale),
        }
    }

    fn lookup_explicit(&self, ty: &SourceType) -> Option<&str> {
        [ty.tag(), ty.name.clone(), ty.base_name()]
            .iter()
            .find_map(|key| self.explicit.get(key.as_str()))
            .map(String::as_str)
    }

    /// Resolve the target type of every migrated column of a table.
    ///
    /// Fallback mappings are recorded as `UnmappableType` diagnostics.
    pub fn map_table(&self, table: &Table, diagnostics: &mut Diagnostics) -> ColumnTypeMap {
        let mut types = ColumnTypeMap::default();
        for column in table.migrated_columns() {
            let mapping = self.map_type(&column.source_type, &column.name);
            if let Some(warning) = &mapping.warning {
                diagnostics.warn(
                    DiagnosticKind::UnmappableType,
                    format!("{}.{}", table.name, column.name),
                    warning.clone(),
                );
            }
            types.insert(&column.name, mapping.target_type);
        }
        types
    }
}

/// Per-table column → target type table.
///
/// Produced while rendering CREATE TABLE and consumed while formatting the
/// same table's rows. Lookups are case-insensitive; iteration follows
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypeMap {
    entries: Vec<(String, String)>,
}

impl ColumnTypeMap {
    /// Add or replace the target type of a column.
    pub fn insert(&mut self, column: &str, target_type: String) {
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
        {
            Some(entry) => entry.1 = target_type,
            None => self.entries.push((column.to_string(), target_type)),
        }
    }

    /// Target type of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, ty)| ty.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, t)| (c.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
