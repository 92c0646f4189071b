//! Oracle dictionary reader.
//!
//! All metadata comes from the `USER_*` views of the connected schema.
//! Queries that return one row per key column are grouped back into
//! descriptors here, so no server-side aggregation (`LISTAGG`) is needed.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::{CatalogConnection, CatalogRow, ColumnDescription, RowStream};
use crate::core::identifier::quote_oracle;
use crate::core::{
    Column, Constraint, DiagnosticKind, Diagnostics, Index, ReferentialAction, Routine, Sequence,
    SourceType, Table, View,
};
use crate::error::{MigrateError, Result};

const TABLES_QUERY: &str = "SELECT TABLE_NAME FROM USER_TABLES ORDER BY TABLE_NAME";

const COLUMNS_QUERY: &str = r#"
    SELECT COLUMN_NAME, DATA_TYPE, CHAR_LENGTH, DATA_LENGTH,
           DATA_PRECISION, DATA_SCALE, NULLABLE, DATA_DEFAULT
    FROM USER_TAB_COLUMNS
    WHERE TABLE_NAME = :1
    ORDER BY COLUMN_ID
"#;

const COLUMN_COMMENTS_QUERY: &str = r#"
    SELECT COLUMN_NAME, COMMENTS
    FROM USER_COL_COMMENTS
    WHERE TABLE_NAME = :1 AND COMMENTS IS NOT NULL
"#;

const TABLE_COMMENT_QUERY: &str = r#"
    SELECT COMMENTS
    FROM USER_TAB_COMMENTS
    WHERE TABLE_NAME = :1 AND COMMENTS IS NOT NULL
"#;

const PRIMARY_KEY_QUERY: &str = r#"
    SELECT c.CONSTRAINT_NAME, cc.COLUMN_NAME
    FROM USER_CONSTRAINTS c
    JOIN USER_CONS_COLUMNS cc
      ON cc.CONSTRAINT_NAME = c.CONSTRAINT_NAME AND cc.TABLE_NAME = c.TABLE_NAME
    WHERE c.CONSTRAINT_TYPE = 'P' AND c.TABLE_NAME = :1
    ORDER BY cc.POSITION
"#;

const SEQUENCES_QUERY: &str = r#"
    SELECT SEQUENCE_NAME, MIN_VALUE, MAX_VALUE, INCREMENT_BY,
           CACHE_SIZE, CYCLE_FLAG, LAST_NUMBER
    FROM USER_SEQUENCES
    ORDER BY SEQUENCE_NAME
"#;

// Indexes backing a primary key are recreated by the destination itself.
const INDEXES_QUERY: &str = r#"
    SELECT i.INDEX_NAME, i.TABLE_NAME, i.UNIQUENESS, ic.COLUMN_NAME
    FROM USER_INDEXES i
    JOIN USER_IND_COLUMNS ic ON ic.INDEX_NAME = i.INDEX_NAME
    WHERE i.INDEX_TYPE = 'NORMAL'
      AND i.GENERATED = 'N'
      AND NOT EXISTS (
          SELECT 1 FROM USER_CONSTRAINTS c
          WHERE c.INDEX_NAME = i.INDEX_NAME AND c.CONSTRAINT_TYPE = 'P'
      )
    ORDER BY i.TABLE_NAME, i.INDEX_NAME, ic.COLUMN_POSITION
"#;

const FOREIGN_KEYS_QUERY: &str = r#"
    SELECT c.CONSTRAINT_NAME, c.TABLE_NAME, cc.COLUMN_NAME,
           rc.TABLE_NAME, rcc.COLUMN_NAME, c.DELETE_RULE
    FROM USER_CONSTRAINTS c
    JOIN USER_CONS_COLUMNS cc ON cc.CONSTRAINT_NAME = c.CONSTRAINT_NAME
    JOIN USER_CONSTRAINTS rc ON rc.CONSTRAINT_NAME = c.R_CONSTRAINT_NAME
    JOIN USER_CONS_COLUMNS rcc
      ON rcc.CONSTRAINT_NAME = rc.CONSTRAINT_NAME AND rcc.POSITION = cc.POSITION
    WHERE c.CONSTRAINT_TYPE = 'R'
    ORDER BY c.TABLE_NAME, c.CONSTRAINT_NAME, cc.POSITION
"#;

const CHECKS_QUERY: &str = r#"
    SELECT c.CONSTRAINT_NAME, c.TABLE_NAME, c.SEARCH_CONDITION, cc.COLUMN_NAME
    FROM USER_CONSTRAINTS c
    LEFT JOIN USER_CONS_COLUMNS cc ON cc.CONSTRAINT_NAME = c.CONSTRAINT_NAME
    WHERE c.CONSTRAINT_TYPE = 'C' AND c.GENERATED = 'USER NAME'
    ORDER BY c.TABLE_NAME, c.CONSTRAINT_NAME, cc.POSITION
"#;

const VIEWS_QUERY: &str = r#"
    SELECT v.VIEW_NAME, v.TEXT, c.COMMENTS
    FROM USER_VIEWS v
    LEFT JOIN USER_TAB_COMMENTS c ON c.TABLE_NAME = v.VIEW_NAME
    ORDER BY v.VIEW_NAME
"#;

const ROUTINES_QUERY: &str = r#"
    SELECT NAME, TYPE, TEXT
    FROM USER_SOURCE
    ORDER BY TYPE, NAME, LINE
"#;

/// Type names whose declared length is part of the type tag.
const SIZED_TYPES: &[&str] = &["VARCHAR2", "NVARCHAR2", "VARCHAR", "CHAR", "NCHAR", "RAW"];

/// Schema reader over the Oracle data dictionary.
pub struct OracleCatalog<C> {
    conn: C,
}

impl<C: CatalogConnection> OracleCatalog<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    async fn query(&self, object: &str, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| MigrateError::catalog(object, e.to_string()))
    }

    /// Names of all tables owned by the connected user.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let rows = self.query("USER_TABLES", TABLES_QUERY, &[]).await?;
        let tables: Vec<String> = rows.iter().filter_map(|r| r.text(0)).collect();
        info!("Found {} tables in source schema", tables.len());
        Ok(tables)
    }

    /// Load the full descriptor of one table: columns, comments, primary key.
    ///
    /// When the dictionary has no column rows for the table, the columns are
    /// derived from the cursor metadata of an empty select instead, and a
    /// `MetadataUnavailable` diagnostic is recorded.
    pub async fn load_table(
        &self,
        name: &str,
        ignored_columns: BTreeSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Table> {
        let mut table = Table::new(name);
        table.ignored_columns = ignored_columns;

        self.load_columns(&mut table, diagnostics).await?;
        self.load_comments(&mut table).await?;
        self.load_primary_key(&mut table).await?;

        for ignored in &table.ignored_columns {
            if table.column(ignored).is_none() {
                diagnostics.warn(
                    DiagnosticKind::IgnoredColumnReference,
                    format!("{}.{}", table.name, ignored),
                    "configured ignored column does not exist",
                );
            }
        }

        debug!(
            "Loaded {} columns for {} ({} ignored)",
            table.columns.len(),
            table.name,
            table.ignored_columns.len()
        );
        Ok(table)
    }

    async fn load_columns(&self, table: &mut Table, diagnostics: &mut Diagnostics) -> Result<()> {
        let rows = self.query(&table.name, COLUMNS_QUERY, &[table.name.as_str()]).await?;

        for row in &rows {
            let Some(name) = row.text(0) else { continue };
            let source_type = source_type(
                &row.string(1),
                row.int(2),
                row.int(3),
                row.int(4),
                row.int(5),
            );

            let mut column = Column::new(name, source_type);
            column.is_nullable = row.text(6).map_or(true, |n| !n.trim().eq_ignore_ascii_case("N"));
            column.default = row
                .text(7)
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("NULL"));
            table.columns.push(column);
        }

        if table.columns.is_empty() {
            diagnostics.warn(
                DiagnosticKind::MetadataUnavailable,
                &table.name,
                "no dictionary column metadata, using cursor metadata",
            );
            let sql = format!(
                "SELECT * FROM {} WHERE 1=0",
                quote_oracle(&table.name)?
            );
            let described = self
                .conn
                .describe(&sql)
                .await
                .map_err(|e| MigrateError::catalog(&table.name, e.to_string()))?;
            table.columns = described.iter().map(column_from_description).collect();
        }

        if table.columns.is_empty() {
            return Err(MigrateError::catalog(&table.name, "table has no columns"));
        }
        Ok(())
    }

    async fn load_comments(&self, table: &mut Table) -> Result<()> {
        let rows = self
            .query(&table.name, TABLE_COMMENT_QUERY, &[table.name.as_str()])
            .await?;
        table.comment = rows.first().and_then(|r| r.text(0));

        let rows = self
            .query(&table.name, COLUMN_COMMENTS_QUERY, &[table.name.as_str()])
            .await?;
        for row in &rows {
            let (Some(column), Some(comment)) = (row.text(0), row.text(1)) else {
                continue;
            };
            if let Some(col) = table
                .columns
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(&column))
            {
                col.comment = Some(comment);
            }
        }
        Ok(())
    }

    async fn load_primary_key(&self, table: &mut Table) -> Result<()> {
        let rows = self
            .query(&table.name, PRIMARY_KEY_QUERY, &[table.name.as_str()])
            .await?;

        let Some(name) = rows.first().and_then(|r| r.text(0)) else {
            return Ok(());
        };
        let columns = rows.iter().filter_map(|r| r.text(1)).collect();
        table.primary_key = Some(Constraint::primary_key(name, &table.name, columns));
        Ok(())
    }

    /// All sequences of the schema, attributes kept as catalog text.
    pub async fn load_sequences(&self) -> Result<Vec<Sequence>> {
        let rows = self.query("USER_SEQUENCES", SEQUENCES_QUERY, &[]).await?;
        let sequences: Vec<Sequence> = rows
            .iter()
            .filter_map(|row| {
                Some(Sequence {
                    name: row.text(0)?,
                    min_value: row.string(1),
                    max_value: row.string(2),
                    increment_by: row.string(3),
                    cache_size: row.string(4),
                    cycle: row.string(5).trim().eq_ignore_ascii_case("Y"),
                    last_value: row.string(6),
                })
            })
            .collect();
        info!("Found {} sequences", sequences.len());
        Ok(sequences)
    }

    /// User-created normal indexes, excluding primary-key indexes.
    pub async fn load_indexes(&self) -> Result<Vec<Index>> {
        let rows = self.query("USER_INDEXES", INDEXES_QUERY, &[]).await?;

        let mut indexes: Vec<Index> = Vec::new();
        for row in &rows {
            let (Some(name), Some(column)) = (row.text(0), row.text(3)) else {
                continue;
            };
            match indexes.last_mut() {
                Some(last) if last.name == name => last.columns.push(column),
                _ => indexes.push(Index {
                    name,
                    table: row.string(1),
                    is_unique: row.string(2).eq_ignore_ascii_case("UNIQUE"),
                    columns: vec![column],
                }),
            }
        }
        info!("Found {} indexes", indexes.len());
        Ok(indexes)
    }

    /// Foreign key and user-named check constraints, ordered by table.
    ///
    /// Primary keys are not included; they are part of the table descriptor.
    pub async fn load_constraints(&self) -> Result<Vec<Constraint>> {
        let mut constraints: Vec<Constraint> = Vec::new();

        let rows = self.query("USER_CONSTRAINTS", FOREIGN_KEYS_QUERY, &[]).await?;
        for row in &rows {
            let (Some(name), Some(column), Some(ref_column)) =
                (row.text(0), row.text(2), row.text(4))
            else {
                continue;
            };
            match constraints.last_mut() {
                Some(last) if last.name == name => {
                    last.columns.push(column);
                    last.ref_columns.push(ref_column);
                }
                _ => {
                    let mut fk = Constraint::foreign_key(
                        name,
                        row.string(1),
                        vec![column],
                        row.string(3),
                        vec![ref_column],
                    );
                    fk.on_delete = row.text(5).map(|rule| ReferentialAction::from_rule(&rule));
                    constraints.push(fk);
                }
            }
        }
        let fk_count = constraints.len();

        let rows = self.query("USER_CONSTRAINTS", CHECKS_QUERY, &[]).await?;
        for row in &rows {
            let Some(name) = row.text(0) else { continue };
            let column = row.text(3);
            match constraints.last_mut() {
                Some(last) if last.name == name && last.condition.is_some() => {
                    last.columns.extend(column);
                }
                _ => {
                    let mut check = Constraint::check(name, row.string(1), row.string(2));
                    check.columns.extend(column);
                    constraints.push(check);
                }
            }
        }

        info!(
            "Found {} foreign keys and {} check constraints",
            fk_count,
            constraints.len() - fk_count
        );
        Ok(constraints)
    }

    pub async fn load_views(&self) -> Result<Vec<View>> {
        let rows = self.query("USER_VIEWS", VIEWS_QUERY, &[]).await?;
        let views: Vec<View> = rows
            .iter()
            .filter_map(|row| {
                Some(View {
                    name: row.text(0)?,
                    text: row.string(1),
                    comment: row.text(2),
                })
            })
            .collect();
        info!("Found {} views", views.len());
        Ok(views)
    }

    /// Procedural objects with their source lines joined back together.
    pub async fn load_routines(&self) -> Result<Vec<Routine>> {
        let rows = self.query("USER_SOURCE", ROUTINES_QUERY, &[]).await?;

        let mut routines: Vec<Routine> = Vec::new();
        for row in &rows {
            let Some(name) = row.text(0) else { continue };
            let kind = row.string(1);
            let line = row.string(2);
            match routines.last_mut() {
                Some(last) if last.name == name && last.kind == kind => last.source.push_str(&line),
                _ => routines.push(Routine {
                    name,
                    kind,
                    source: line,
                }),
            }
        }
        info!("Found {} routines", routines.len());
        Ok(routines)
    }

    /// Stream the migrated columns of a table, in descriptor order.
    pub async fn stream_rows(&self, table: &Table) -> Result<RowStream<'_>> {
        let columns = table
            .migrated_columns()
            .map(|c| quote_oracle(&c.name))
            .collect::<Result<Vec<_>>>()?;
        let sql = format!("SELECT {} FROM {}", columns.join(", "), quote_oracle(&table.name)?);
        debug!("Row query for {}: {}", table.name, sql);

        self.conn
            .stream(&sql)
            .await
            .map_err(|e| MigrateError::transfer(&table.name, e.to_string()))
    }
}

fn to_u32(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok()).filter(|v| *v > 0)
}

fn source_type(
    data_type: &str,
    char_length: Option<i64>,
    data_length: Option<i64>,
    precision: Option<i64>,
    scale: Option<i64>,
) -> SourceType {
    let ty = SourceType::new(data_type);
    if ty.is_numeric() {
        let scale = scale.and_then(|s| i32::try_from(s).ok());
        return SourceType::numeric(ty.name, to_u32(precision), scale);
    }
    if SIZED_TYPES.contains(&ty.name.as_str()) {
        if let Some(len) = to_u32(char_length).or_else(|| to_u32(data_length)) {
            return ty.with_length(len);
        }
    }
    ty
}

fn column_from_description(desc: &ColumnDescription) -> Column {
    let ty = SourceType::new(&desc.type_name);
    let source_type = if ty.is_numeric() {
        SourceType::numeric(ty.name, desc.precision.filter(|p| *p > 0), desc.scale)
    } else if SIZED_TYPES.contains(&ty.name.as_str()) {
        match desc.precision.filter(|p| *p > 0) {
            Some(len) => ty.with_length(len),
            None => ty,
        }
    } else {
        ty
    };

    let mut column = Column::new(&desc.name, source_type);
    column.is_nullable = desc.nullable;
    column
}
