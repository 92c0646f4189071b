//! Identifier validation and quoting.
//!
//! SQL identifiers (table, column, sequence names) cannot be bound as query
//! parameters, so every identifier that ends up in generated or executed
//! SQL goes through this module.
//!
//! Two flavours exist:
//! 1. [`quote_oracle`] validates and always quotes. It is used
//!    for catalog queries that read user data from the source.
//! 2. [`pg_ident`] renders a destination identifier for generated scripts.
//!    It never fails: unquoted mode emits the name as the source stores it
//!    (Oracle upper case folds to lower case in PostgreSQL), quoted mode
//!    preserves case exactly.

use crate::error::{MigrateError, Result};

/// Maximum identifier length accepted from the catalog.
/// - Oracle 12.2+: 128 bytes
/// - PostgreSQL: 63 bytes (longer names are truncated by the server)
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
///
/// # Errors
///
/// Returns `MigrateError::Config` for invalid identifiers with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote an Oracle identifier.
///
/// Oracle uses the same double-quote convention as PostgreSQL; a quoted
/// name is matched case-sensitively, which is what catalog-reported names need.
pub fn quote_oracle(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(double_quote(name))
}

/// Render a destination identifier for a generated script.
pub fn pg_ident(name: &str, quote: bool) -> String {
    if quote {
        double_quote(name)
    } else {
        name.to_string()
    }
}

/// Render a comma-separated identifier list.
pub fn pg_ident_list<S: AsRef<str>>(names: &[S], quote: bool) -> String {
    names
        .iter()
        .map(|n| pg_ident(n.as_ref(), quote))
        .collect::<Vec<_>>()
        .join(", ")
}

fn double_quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("CUSTOMER").is_ok());
        assert!(validate_identifier("ORDER_ITEMS").is_ok());
        assert!(validate_identifier("column with spaces").is_ok());
        assert!(validate_identifier("ÄNDERUNG").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let result = validate_identifier("");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let result = validate_identifier("table\0name");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_rejects_too_long() {
        let long_name = "A".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let result = validate_identifier(&long_name);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_quote_oracle_escapes_double_quote() {
        assert_eq!(quote_oracle("CUSTOMER").unwrap(), "\"CUSTOMER\"");
        assert_eq!(quote_oracle("A\"B").unwrap(), "\"A\"\"B\"");
        assert!(quote_oracle("").is_err());
    }

    #[test]
    fn test_quote_oracle_sql_injection_safely_quoted() {
        let result = quote_oracle("Robert'); DROP TABLE Students;--");
        assert_eq!(result.unwrap(), "\"Robert'); DROP TABLE Students;--\"");
    }

    #[test]
    fn test_pg_ident_modes() {
        assert_eq!(pg_ident("CUSTOMER", false), "CUSTOMER");
        assert_eq!(pg_ident("CUSTOMER", true), "\"CUSTOMER\"");
        assert_eq!(pg_ident_list(&["ID", "NAME"], false), "ID, NAME");
        assert_eq!(pg_ident_list(&["ID", "NAME"], true), "\"ID\", \"NAME\"");
    }
}
