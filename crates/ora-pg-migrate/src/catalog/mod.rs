//! Source catalog access.
//!
//! The engine never opens a source connection itself. It is handed a
//! [`CatalogConnection`], an opaque capability that can run dictionary
//! queries, describe a result set, and stream rows. [`OracleCatalog`] turns
//! the Oracle `USER_*` dictionary views into schema descriptors on top of
//! that capability.

mod oracle;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::SqlValue;
use crate::error::Result;

pub use oracle::OracleCatalog;

/// Stream of source rows, one value per selected column.
pub type RowStream<'a> = BoxStream<'a, Result<Vec<SqlValue<'static>>>>;

/// One row of a dictionary query, addressed by column position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    values: Vec<SqlValue<'static>>,
}

impl CatalogRow {
    pub fn new(values: Vec<SqlValue<'static>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `idx` rendered as text; `None` for NULL or a missing column.
    pub fn text(&self, idx: usize) -> Option<String> {
        match self.values.get(idx)? {
            SqlValue::Null => None,
            SqlValue::Bool(v) => Some(v.to_string()),
            SqlValue::I64(v) => Some(v.to_string()),
            SqlValue::F64(v) => Some(v.to_string()),
            SqlValue::Decimal(v) => Some(v.to_string()),
            SqlValue::Number(v) | SqlValue::Text(v) => Some(v.to_string()),
            SqlValue::Bytes(v) => Some(hex::encode(v)),
            SqlValue::Date(v) => Some(v.to_string()),
            SqlValue::DateTime(v) => Some(v.to_string()),
            SqlValue::DateTimeOffset(v) => Some(v.to_string()),
        }
    }

    /// Value at `idx` as text, or an empty string.
    pub fn string(&self, idx: usize) -> String {
        self.text(idx).unwrap_or_default()
    }

    /// Value at `idx` as an integer, if it is one or parses as one.
    pub fn int(&self, idx: usize) -> Option<i64> {
        match self.values.get(idx)? {
            SqlValue::I64(v) => Some(*v),
            SqlValue::Decimal(v) if v.fract().is_zero() => v.to_string().parse().ok(),
            SqlValue::F64(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => self.text(idx)?.trim().parse().ok(),
        }
    }
}

impl From<Vec<SqlValue<'static>>> for CatalogRow {
    fn from(values: Vec<SqlValue<'static>>) -> Self {
        Self::new(values)
    }
}

/// Column of a described result set (coarse cursor metadata).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub type_name: String,
    /// Precision for numeric columns, display size for character columns.
    pub precision: Option<u32>,
    pub scale: Option<i32>,
    pub nullable: bool,
}

/// Query capability over the source database.
///
/// Dictionary queries bind positional parameters as `:1`, `:2`, ...
#[async_trait]
pub trait CatalogConnection: Send + Sync {
    /// Run a dictionary query and collect its rows.
    async fn query(&self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>>;

    /// Describe the result set of a query without fetching rows.
    async fn describe(&self, sql: &str) -> Result<Vec<ColumnDescription>>;

    /// Stream the rows of a data query.
    async fn stream(&self, sql: &str) -> Result<RowStream<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_catalog_row_accessors() {
        let row = CatalogRow::new(vec![
            SqlValue::from("ORDERS"),
            SqlValue::Null,
            SqlValue::from(Decimal::new(42, 0)),
            SqlValue::number("9999999999999999999999999999"),
            SqlValue::from(" 17 "),
        ]);

        assert_eq!(row.len(), 5);
        assert_eq!(row.text(0).as_deref(), Some("ORDERS"));
        assert_eq!(row.text(1), None);
        assert_eq!(row.string(1), "");
        assert_eq!(row.int(2), Some(42));
        assert_eq!(row.text(3).as_deref(), Some("9999999999999999999999999999"));
        assert_eq!(row.int(3), None);
        assert_eq!(row.int(4), Some(17));
        assert_eq!(row.text(9), None);
    }
}
