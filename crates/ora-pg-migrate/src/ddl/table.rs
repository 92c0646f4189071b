//! CREATE TABLE rendering and default-expression translation.

use std::sync::OnceLock;

use regex::Regex;

use super::{CommentOn, DdlAssembler, STATEMENT_END};
use crate::core::identifier::pg_ident;
use crate::core::Table;
use crate::typemap::{ColumnTypeMap, FALLBACK_TYPE};

fn nextval_default() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)^(.+?)\."?NEXTVAL"?$"#).expect("Invalid nextval pattern")
    })
}

/// Translate an Oracle column default into PostgreSQL syntax.
///
/// Recognized pseudo-functions are rewritten; anything else is kept verbatim.
pub fn translate_default(
    raw: &str,
    target_type: &str,
    sequence_suffix: &str,
    quote: bool,
) -> String {
    let value = raw.trim();
    let upper = value.to_uppercase();

    if target_type.eq_ignore_ascii_case("BOOLEAN") {
        match value {
            "0" => return "false".to_string(),
            "1" => return "true".to_string(),
            _ => {}
        }
    }

    match upper.as_str() {
        "SYSDATE" | "SYSTIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIMESTAMP" | "LOCALTIMESTAMP" => {
            return "CURRENT_TIMESTAMP".to_string()
        }
        "USER" => return "CURRENT_USER".to_string(),
        "SYS_GUID()" => return "gen_random_uuid()".to_string(),
        _ => {}
    }

    if let Some(caps) = nextval_default().captures(value) {
        let sequence = format!("{}{}", caps[1].replace('"', ""), sequence_suffix);
        return format!("nextval('{}')", pg_ident(&sequence, quote).replace('\'', "''"));
    }

    value.to_string()
}

impl DdlAssembler {
    /// Render `CREATE TABLE` for the migrated columns of a table.
    ///
    /// Column types come from `types`, the map produced by
    /// [`TypeMapper::map_table`](crate::typemap::TypeMapper::map_table).
    /// Table and column comments follow when comment transfer is enabled.
    pub fn render_create_table(&self, table: &Table, types: &ColumnTypeMap) -> String {
        let opts = &self.options;
        let mut definitions: Vec<String> = Vec::new();

        for column in table.migrated_columns() {
            let target_type = types.get(&column.name).unwrap_or(FALLBACK_TYPE);
            let mut def = format!("    {} {}", self.ident(&column.name), target_type);

            if opts.transfer_not_null && !column.is_nullable {
                def.push_str(" NOT NULL");
            }

            if opts.transfer_defaults {
                if let Some(raw) = column.default.as_deref().filter(|d| !d.trim().is_empty()) {
                    def.push_str(" DEFAULT ");
                    def.push_str(&translate_default(
                        raw,
                        target_type,
                        &opts.sequence_suffix,
                        opts.quote_identifiers,
                    ));
                }
            }

            definitions.push(def);
        }

        if let Some(pk) = &table.primary_key {
            let pk_columns: Vec<&String> =
                pk.columns.iter().filter(|c| !table.is_ignored(c)).collect();
            if !pk_columns.is_empty() {
                definitions.push(format!(
                    "    CONSTRAINT {} PRIMARY KEY ({})",
                    self.ident(&pk.name),
                    self.ident_list(&pk_columns)
                ));
            }
        }

        let mut sql = format!(
            "CREATE TABLE {} (\n{}\n){}",
            self.ident(&table.name),
            definitions.join(",\n"),
            STATEMENT_END
        );

        if opts.transfer_comments {
            let mut comments = String::new();
            if let Some(text) = &table.comment {
                if let Some(stmt) = self.render_comment(CommentOn::Table(&table.name), text) {
                    comments.push_str(&stmt);
                }
            }
            for column in table.migrated_columns() {
                if let Some(text) = &column.comment {
                    if let Some(stmt) =
                        self.render_comment(CommentOn::Column(&table.name, &column.name), text)
                    {
                        comments.push_str(&stmt);
                    }
                }
            }
            if !comments.is_empty() {
                sql.push_str(&format!("\n-- Comments for table {}\n", table.name));
                sql.push_str(&comments);
            }
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrationConfig;
    use crate::core::{Column, Constraint, SourceType};

    fn customer() -> Table {
        let mut table = Table::new("CUSTOMER");

        let mut id = Column::new("ID", SourceType::numeric("NUMBER", Some(10), Some(0)));
        id.is_nullable = false;
        id.default = Some("CUSTOMER_SEQ.NEXTVAL".to_string());
        table.columns.push(id);

        let mut active = Column::new("ACTIVE", SourceType::numeric("NUMBER", Some(1), Some(0)));
        active.default = Some("1 ".to_string());
        active.comment = Some("Customer's active flag".to_string());
        table.columns.push(active);

        let mut created = Column::new("CREATED", SourceType::new("DATE"));
        created.default = Some("sysdate\n".to_string());
        table.columns.push(created);

        table.columns.push(Column::new("LEGACY", SourceType::new("CLOB")));
        table.ignored_columns.insert("LEGACY".to_string());
        table.primary_key = Some(Constraint::primary_key(
            "PK_CUSTOMER",
            "CUSTOMER",
            vec!["ID".to_string(), "LEGACY".to_string()],
        ));
        table.comment = Some("Customers".to_string());
        table
    }

    fn types() -> ColumnTypeMap {
        let mut types = ColumnTypeMap::default();
        types.insert("ID", "BIGINT".to_string());
        types.insert("ACTIVE", "BOOLEAN".to_string());
        types.insert("CREATED", "TIMESTAMP WITHOUT TIME ZONE".to_string());
        types
    }

    #[test]
    fn test_translate_default() {
        assert_eq!(translate_default("SYSDATE", "TIMESTAMP", "", false), "CURRENT_TIMESTAMP");
        assert_eq!(translate_default(" user ", "VARCHAR(30)", "", false), "CURRENT_USER");
        assert_eq!(translate_default("SYS_GUID()", "BYTEA", "", false), "gen_random_uuid()");
        assert_eq!(translate_default("0", "BOOLEAN", "", false), "false");
        assert_eq!(translate_default("0", "BIGINT", "", false), "0");
        assert_eq!(translate_default("'N/A'", "VARCHAR(10)", "", false), "'N/A'");
        assert_eq!(
            translate_default("ORDER_SEQ.nextval", "BIGINT", "_seq", false),
            "nextval('ORDER_SEQ_seq')"
        );
        assert_eq!(
            translate_default("\"ORDER_SEQ\".\"NEXTVAL\"", "BIGINT", "", true),
            "nextval('\"ORDER_SEQ\"')"
        );
    }

    #[test]
    fn test_render_create_table() {
        let assembler = DdlAssembler::new(&MigrationConfig::default());
        let sql = assembler.render_create_table(&customer(), &types());

        let expected_head = "CREATE TABLE CUSTOMER (\n\
            \x20   ID BIGINT NOT NULL DEFAULT nextval('CUSTOMER_SEQ'),\n\
            \x20   ACTIVE BOOLEAN DEFAULT true,\n\
            \x20   CREATED TIMESTAMP WITHOUT TIME ZONE DEFAULT CURRENT_TIMESTAMP,\n\
            \x20   CONSTRAINT PK_CUSTOMER PRIMARY KEY (ID)\n\
            );\n";
        assert!(sql.starts_with(expected_head), "got:\n{}", sql);
        assert!(!sql.contains("LEGACY"));
        assert!(sql.contains("COMMENT ON TABLE CUSTOMER IS 'Customers';\n"));
        assert!(sql.contains("COMMENT ON COLUMN CUSTOMER.ACTIVE IS 'Customer''s active flag';\n"));
    }

    #[test]
    fn test_render_create_table_flags_off() {
        let config = MigrationConfig {
            transfer_not_null: false,
            transfer_defaults: false,
            transfer_comments: false,
            quote_identifiers: true,
            ..MigrationConfig::default()
        };
        let sql = DdlAssembler::new(&config).render_create_table(&customer(), &types());

        assert!(sql.starts_with("CREATE TABLE \"CUSTOMER\" (\n    \"ID\" BIGINT,\n"));
        assert!(!sql.contains("NOT NULL"));
        assert!(!sql.contains("DEFAULT"));
        assert!(!sql.contains("COMMENT ON"));
    }
}
