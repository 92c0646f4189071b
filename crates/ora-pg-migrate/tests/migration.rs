//! End-to-end export and replay against an in-memory Oracle dictionary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use rust_decimal::Decimal;

use ora_pg_migrate::catalog::{CatalogRow, ColumnDescription, RowStream};
use ora_pg_migrate::script::collect_script_files;
use ora_pg_migrate::{
    execute_files, CatalogConnection, Config, DiagnosticKind, MigrateError, Orchestrator, Result,
    SqlValue, StatementExecutor,
};

type Row = Vec<SqlValue<'static>>;

/// Dictionary contents keyed the way the `USER_*` views are queried.
#[derive(Default)]
struct FakeOracle {
    tables: Vec<&'static str>,
    columns: HashMap<&'static str, Vec<Row>>,
    table_comments: HashMap<&'static str, &'static str>,
    column_comments: HashMap<&'static str, Vec<Row>>,
    primary_keys: HashMap<&'static str, Vec<Row>>,
    data: HashMap<&'static str, Vec<Row>>,
    sequences: Vec<Row>,
    indexes: Vec<Row>,
    foreign_keys: Vec<Row>,
    checks: Vec<Row>,
    views: Vec<Row>,
    routines: Vec<Row>,
    fail_views: bool,
}

impl FakeOracle {
    fn per_table(map: &HashMap<&'static str, Vec<Row>>, params: &[&str]) -> Vec<Row> {
        let Some(table) = params.first() else {
            return Vec::new();
        };
        map.iter()
            .find(|(name, _)| **name == *table)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogConnection for FakeOracle {
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>> {
        let rows = if sql.contains("USER_VIEWS") {
            if self.fail_views {
                return Err(MigrateError::Config("ORA-00942: table or view does not exist".into()));
            }
            self.views.clone()
        } else if sql.contains("USER_INDEXES") {
            self.indexes.clone()
        } else if sql.contains("USER_SEQUENCES") {
            self.sequences.clone()
        } else if sql.contains("USER_SOURCE") {
            self.routines.clone()
        } else if sql.contains("CONSTRAINT_TYPE = 'R'") {
            self.foreign_keys.clone()
        } else if sql.contains("CONSTRAINT_TYPE = 'C'") {
            self.checks.clone()
        } else if sql.contains("CONSTRAINT_TYPE = 'P'") {
            Self::per_table(&self.primary_keys, params)
        } else if sql.contains("USER_TAB_COLUMNS") {
            Self::per_table(&self.columns, params)
        } else if sql.contains("USER_COL_COMMENTS") {
            Self::per_table(&self.column_comments, params)
        } else if sql.contains("USER_TAB_COMMENTS") {
            self.table_comments
                .iter()
                .find(|(name, _)| params.first().copied() == Some(**name))
                .map(|(_, comment)| vec![vec![SqlValue::from(*comment)]])
                .unwrap_or_default()
        } else if sql.contains("USER_TABLES") {
            self.tables.iter().map(|t| vec![SqlValue::from(*t)]).collect()
        } else {
            Vec::new()
        };
        Ok(rows.into_iter().map(CatalogRow::new).collect())
    }

    async fn describe(&self, _sql: &str) -> Result<Vec<ColumnDescription>> {
        Ok(Vec::new())
    }

    async fn stream(&self, sql: &str) -> Result<RowStream<'_>> {
        let rows = self
            .data
            .iter()
            .find(|(table, _)| sql.ends_with(&format!("FROM \"{}\"", table)))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default();
        Ok(futures::stream::iter(rows.into_iter().map(Ok)).boxed())
    }
}

/// Accepts every statement except those naming a missing relation.
#[derive(Default)]
struct RecordingPostgres {
    executed: Mutex<Vec<String>>,
}

#[async_trait]
impl StatementExecutor for RecordingPostgres {
    async fn execute_statement(&self, sql: &str) -> Result<()> {
        self.executed.lock().unwrap().push(sql.to_string());
        if sql.contains("MISSING_TABLE") {
            return Err(MigrateError::Config(
                "relation \"missing_table\" does not exist".into(),
            ));
        }
        Ok(())
    }
}

fn t(s: &'static str) -> SqlValue<'static> {
    SqlValue::from(s)
}

/// COLUMN_NAME, DATA_TYPE, CHAR_LENGTH, DATA_LENGTH, DATA_PRECISION, DATA_SCALE,
/// NULLABLE, DATA_DEFAULT
fn number_column(name: &'static str, precision: i64, scale: i64, nullable: &'static str) -> Row {
    vec![
        t(name),
        t("NUMBER"),
        SqlValue::Null,
        22i64.into(),
        precision.into(),
        scale.into(),
        t(nullable),
        SqlValue::Null,
    ]
}

fn varchar_column(name: &'static str, length: i64, default: Option<&'static str>) -> Row {
    vec![
        t(name),
        t("VARCHAR2"),
        length.into(),
        (length * 4).into(),
        SqlValue::Null,
        SqlValue::Null,
        t("Y"),
        default.map(t).unwrap_or(SqlValue::Null),
    ]
}

fn shop() -> FakeOracle {
    let mut oracle = FakeOracle {
        tables: vec!["CUSTOMER", "ORDERS", "TMP_LOAD"],
        ..FakeOracle::default()
    };

    oracle.columns.insert(
        "CUSTOMER",
        vec![
            number_column("ID", 10, 0, "N"),
            number_column("ACTIVE", 1, 0, "Y"),
            varchar_column("NAME", 50, Some("'n/a'")),
            varchar_column("LEGACY_CODE", 10, None),
        ],
    );
    oracle.table_comments.insert("CUSTOMER", "Customer master");
    oracle
        .column_comments
        .insert("CUSTOMER", vec![vec![t("NAME"), t("Customer's display name")]]);
    oracle
        .primary_keys
        .insert("CUSTOMER", vec![vec![t("PK_CUSTOMER"), t("ID")]]);
    oracle.data.insert(
        "CUSTOMER",
        vec![
            vec![1i64.into(), 1i64.into(), t("O'Brien")],
            vec![2i64.into(), 0i64.into(), SqlValue::Null],
        ],
    );

    oracle.columns.insert(
        "ORDERS",
        vec![
            number_column("ID", 10, 0, "N"),
            number_column("CUSTOMER_ID", 10, 0, "N"),
            number_column("AMOUNT", 10, 2, "Y"),
        ],
    );
    oracle
        .primary_keys
        .insert("ORDERS", vec![vec![t("PK_ORDERS"), t("ID")]]);
    oracle.data.insert(
        "ORDERS",
        vec![vec![
            100i64.into(),
            1i64.into(),
            Decimal::new(1_234_567, 2).into(),
        ]],
    );

    oracle.sequences = vec![vec![
        t("ORDER_SEQ"),
        1i64.into(),
        SqlValue::number("9.9E125"),
        1i64.into(),
        20i64.into(),
        t("N"),
        42i64.into(),
    ]];
    oracle.indexes = vec![
        vec![t("IX_ORDERS_CUSTOMER"), t("ORDERS"), t("NONUNIQUE"), t("CUSTOMER_ID")],
        vec![t("IX_LOAD"), t("TMP_LOAD"), t("NONUNIQUE"), t("ID")],
    ];
    oracle.foreign_keys = vec![vec![
        t("FK_ORDERS_CUSTOMER"),
        t("ORDERS"),
        t("CUSTOMER_ID"),
        t("CUSTOMER"),
        t("ID"),
        t("CASCADE"),
    ]];
    oracle.checks = vec![vec![t("CK_AMOUNT"), t("ORDERS"), t("AMOUNT >= 0"), t("AMOUNT")]];
    oracle.views = vec![vec![
        t("V_ORDERS"),
        t("SELECT ID, NVL(AMOUNT, 0) AS AMOUNT, SYSDATE AS TAKEN FROM ORDERS"),
        t("Orders with amounts"),
    ]];
    oracle.routines = vec![
        vec![t("RECALC"), t("PROCEDURE"), t("PROCEDURE RECALC IS\n")],
        vec![t("RECALC"), t("PROCEDURE"), t("BEGIN /* no-op */ NULL; END;\n")],
    ];
    oracle
}

fn config(base_dir: &Path) -> Config {
    let yaml = format!(
        r#"
source:
  database_name: SHOP
  environment: test
migration:
  migrate_all_tables: true
  blacklist_prefixes: [TMP_]
  migrate_routines: true
  ignored_columns:
    CUSTOMER: [LEGACY_CODE]
output:
  base_dir: "{}"
"#,
        base_dir.display()
    );
    Config::from_yaml(&yaml).unwrap()
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_full_export_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(config(dir.path()), shop()).unwrap();

    let result = orchestrator.run(None).await.unwrap();

    assert_eq!(result.status, "completed");
    assert_eq!(result.tables_total, 2);
    assert_eq!(result.tables_success, 2);
    assert_eq!(result.rows_exported, 3);
    assert_eq!(result.sequences_written, 1);
    assert_eq!(result.indexes_written, 1);
    assert_eq!(result.constraints_written, 2);
    assert_eq!(result.views_written, 1);
    assert_eq!(result.routines_written, 1);
    assert!(result.files.iter().all(|f| f.starts_with(dir.path())));

    let create = read(&dir.path().join("tables_create/CUSTOMER_create.sql"));
    assert!(create.starts_with("-- Created: "));
    assert!(create.contains("-- Database: SHOP\n-- Environment: test\n"));
    assert!(create.contains("    ID BIGINT NOT NULL,\n"));
    assert!(create.contains("    ACTIVE BOOLEAN,\n"));
    assert!(create.contains("    NAME VARCHAR(50) DEFAULT 'n/a',\n"));
    assert!(create.contains("    CONSTRAINT PK_CUSTOMER PRIMARY KEY (ID)\n"));
    assert!(!create.contains("LEGACY_CODE"));
    assert!(create.contains("COMMENT ON TABLE CUSTOMER IS 'Customer master';\n"));
    assert!(create.contains("COMMENT ON COLUMN CUSTOMER.NAME IS 'Customer''s display name';\n"));

    let inserts = read(&dir.path().join("tables_inserts/CUSTOMER_inserts.sql"));
    assert!(inserts
        .contains("INSERT INTO CUSTOMER (ID, ACTIVE, NAME) VALUES (1, true, 'O''Brien');\n"));
    assert!(inserts.contains("INSERT INTO CUSTOMER (ID, ACTIVE, NAME) VALUES (2, false, NULL);\n"));

    let orders = read(&dir.path().join("tables_create/ORDERS_create.sql"));
    assert!(orders.contains("    AMOUNT NUMERIC,\n"));
    let order_rows = read(&dir.path().join("tables_inserts/ORDERS_inserts.sql"));
    assert!(order_rows.contains("VALUES (100, 1, 12345.67);\n"));

    let sequences = read(&dir.path().join("sequences/sequences.sql"));
    assert!(sequences.contains("CREATE SEQUENCE ORDER_SEQ\n    START WITH 42\n"));
    assert!(sequences.contains("MAXVALUE 9223372036854775807"));
    assert!(sequences.contains("-- Original values: MIN=1, MAX=9.9E125, LAST=42\n"));

    let indexes = read(&dir.path().join("indexes/indexes.sql"));
    assert!(indexes.contains("CREATE INDEX IX_ORDERS_CUSTOMER ON ORDERS (CUSTOMER_ID);\n"));
    assert!(!indexes.contains("TMP_LOAD"));

    let constraints = read(&dir.path().join("constraints/constraints.sql"));
    assert!(constraints.contains(
        "ALTER TABLE ORDERS ADD CONSTRAINT FK_ORDERS_CUSTOMER FOREIGN KEY (CUSTOMER_ID) \
         REFERENCES CUSTOMER (ID) ON DELETE CASCADE;\n"
    ));
    assert!(
        constraints.contains("ALTER TABLE ORDERS ADD CONSTRAINT CK_AMOUNT CHECK (AMOUNT >= 0);\n")
    );

    let views = read(&dir.path().join("views/views.sql"));
    assert!(views.contains("COALESCE(AMOUNT, 0)"));
    assert!(views.contains("CURRENT_TIMESTAMP AS TAKEN"));
    assert!(views.contains("COMMENT ON VIEW V_ORDERS IS 'Orders with amounts';\n"));

    let routines = read(&dir.path().join("routines/routines.sql"));
    assert!(routines.contains("-- NOT TRANSLATED: PROCEDURE RECALC\n"));

    assert_eq!(result.diagnostics.count(DiagnosticKind::NumericOverflow), 1);
}

#[tokio::test]
async fn test_generated_scripts_replay_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(config(dir.path()), shop()).unwrap();
    let result = orchestrator.run(None).await.unwrap();

    let postgres = RecordingPostgres::default();
    let summary = execute_files(&postgres, &result.files).await;

    assert_eq!(summary.files_total, result.files.len());
    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.statements_failed, 0);

    let executed = postgres.executed.lock().unwrap().clone();
    assert!(executed.iter().all(|s| !s.trim_start().starts_with("--")));
    assert!(executed.iter().any(|s| s.starts_with("CREATE TABLE CUSTOMER (")));
    assert!(executed.iter().any(|s| s.starts_with("CREATE SEQUENCE ORDER_SEQ")));
    assert!(executed.iter().any(|s| s.starts_with("CREATE OR REPLACE VIEW V_ORDERS AS")));
    // The routine annotation is entirely commented out.
    assert!(!executed.iter().any(|s| s.contains("RECALC")));

    let inserts: Vec<_> = executed.iter().filter(|s| s.starts_with("INSERT INTO")).collect();
    assert_eq!(inserts.len(), 3);
}

#[tokio::test]
async fn test_replay_continues_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("01_ok.sql"),
        "-- seed\nINSERT INTO A (ID) VALUES (1);\nINSERT INTO A (ID) VALUES (2);\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("02_broken.sql"),
        "INSERT INTO MISSING_TABLE (ID) VALUES (1);\nINSERT INTO A (ID) VALUES (3);\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a script").unwrap();

    let files = collect_script_files(dir.path()).unwrap();
    assert_eq!(files.len(), 2);

    let postgres = RecordingPostgres::default();
    let summary = execute_files(&postgres, &files).await;

    assert_eq!(summary.files_total, 2);
    assert_eq!(summary.files_succeeded, 1);
    assert_eq!(summary.failed_files, vec!["02_broken".to_string()]);
    assert_eq!(summary.statements_total, 4);
    assert_eq!(summary.statements_succeeded, 3);
    assert_eq!(summary.statements_failed, 1);
    assert_eq!(
        summary.diagnostics.count(DiagnosticKind::StatementExecutionFailure),
        1
    );
    assert_eq!(postgres.executed.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_failed_phase_is_skipped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut oracle = shop();
    oracle.fail_views = true;
    oracle.tables.push("GHOST");

    let orchestrator = Orchestrator::new(config(dir.path()), oracle).unwrap();
    let result = orchestrator.run(None).await.unwrap();

    assert_eq!(result.status, "failed");
    assert_eq!(result.failed_tables, vec!["GHOST".to_string()]);
    assert_eq!(result.tables_success, 2);
    assert_eq!(result.views_written, 0);
    assert_eq!(result.routines_written, 1);
    assert!(!dir.path().join("views/views.sql").exists());
    assert_eq!(result.diagnostics.count(DiagnosticKind::CatalogAccessFailure), 2);
    assert_eq!(result.diagnostics.count(DiagnosticKind::MetadataUnavailable), 1);
}

#[tokio::test]
async fn test_failed_table_leaves_no_scripts_behind() {
    let dir = tempfile::tempdir().unwrap();
    let mut oracle = shop();
    oracle.tables.push("BROKEN");
    oracle.columns.insert(
        "BROKEN",
        vec![number_column("ID", 10, 0, "N"), varchar_column("NAME", 20, None)],
    );
    oracle.data.insert(
        "BROKEN",
        vec![vec![1i64.into(), t("ok")], vec![2i64.into()]],
    );

    let orchestrator = Orchestrator::new(config(dir.path()), oracle).unwrap();
    let result = orchestrator.run(None).await.unwrap();

    assert_eq!(result.failed_tables, vec!["BROKEN".to_string()]);
    assert_eq!(result.tables_success, 2);
    assert!(!dir.path().join("tables_create/BROKEN_create.sql").exists());
    assert!(!dir.path().join("tables_inserts/BROKEN_inserts.sql").exists());
    assert!(dir.path().join("tables_create/CUSTOMER_create.sql").exists());

    let replayed = collect_script_files(&dir.path().join("tables_inserts")).unwrap();
    assert_eq!(replayed.len(), 2);
}
