//! Destination literal formatting for INSERT statements.
//!
//! Formatting is a pure function of the value, the source type tag, and
//! the resolved target type. Text is protected only by quote doubling.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::SqlValue;

/// The NULL literal.
pub const NULL_LITERAL: &str = "NULL";

fn numeric_literal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid numeric pattern")
    })
}

/// Format a source value as a PostgreSQL literal.
///
/// - NULL becomes `NULL`.
/// - For a `BOOLEAN` target, numeric `0`/`1` and text `0`/`1`/`true`/`false`
///   become `false`/`true`; any other representation passes through verbatim.
/// - Text is single-quoted with embedded quotes doubled. Drivers that hand
///   `NUMBER` columns over as text get them back unquoted when the source
///   tag is numeric and the text is a plain numeric literal.
/// - Dates and timestamps are single-quoted in their default text form.
/// - Binary data becomes a `'\x..'` bytea literal.
/// - Everything else is emitted unquoted.
pub fn format_value(value: &SqlValue<'_>, source_tag: &str, target_type: Option<&str>) -> String {
    if value.is_null() {
        return NULL_LITERAL.to_string();
    }

    if target_type.is_some_and(|t| t.trim().eq_ignore_ascii_case("BOOLEAN")) {
        return format_boolean(value);
    }

    match value {
        SqlValue::Null => NULL_LITERAL.to_string(),
        SqlValue::Bool(v) => v.to_string(),
        SqlValue::I64(v) => v.to_string(),
        SqlValue::F64(v) => format_float(*v),
        SqlValue::Decimal(v) => v.to_string(),
        SqlValue::Number(v) => v.to_string(),
        SqlValue::Text(v) => {
            if is_numeric_tag(source_tag) && numeric_literal().is_match(v.trim()) {
                v.trim().to_string()
            } else {
                quote_text(v)
            }
        }
        SqlValue::Bytes(v) => format!("'\\x{}'", hex::encode(v)),
        SqlValue::Date(v) => format!("'{}'", v),
        SqlValue::DateTime(v) => format!("'{}'", v),
        SqlValue::DateTimeOffset(v) => format!("'{}'", v),
    }
}

/// Wrap text in single quotes, doubling every embedded quote.
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn format_boolean(value: &SqlValue<'_>) -> String {
    let parsed = match value {
        SqlValue::Bool(v) => Some(*v),
        SqlValue::I64(v) => numeric_flag(*v == 0, *v == 1),
        SqlValue::F64(v) => numeric_flag(*v == 0.0, *v == 1.0),
        SqlValue::Decimal(v) => numeric_flag(v.is_zero(), *v == rust_decimal::Decimal::ONE),
        SqlValue::Number(v) => text_flag(v),
        SqlValue::Text(v) => text_flag(v),
        _ => None,
    };

    match parsed {
        Some(flag) => flag.to_string(),
        None => verbatim(value),
    }
}

fn numeric_flag(is_zero: bool, is_one: bool) -> Option<bool> {
    if is_one {
        Some(true)
    } else if is_zero {
        Some(false)
    } else {
        None
    }
}

fn text_flag(text: &str) -> Option<bool> {
    let t = text.trim();
    if t == "1" || t.eq_ignore_ascii_case("true") {
        Some(true)
    } else if t == "0" || t.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Unquoted canonical text of a value.
fn verbatim(value: &SqlValue<'_>) -> String {
    match value {
        SqlValue::Null => NULL_LITERAL.to_string(),
        SqlValue::Bool(v) => v.to_string(),
        SqlValue::I64(v) => v.to_string(),
        SqlValue::F64(v) => v.to_string(),
        SqlValue::Decimal(v) => v.to_string(),
        SqlValue::Number(v) | SqlValue::Text(v) => v.to_string(),
        SqlValue::Bytes(v) => hex::encode(v),
        SqlValue::Date(v) => v.to_string(),
        SqlValue::DateTime(v) => v.to_string(),
        SqlValue::DateTimeOffset(v) => v.to_string(),
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "'NaN'".to_string()
    } else if v == f64::INFINITY {
        "'Infinity'".to_string()
    } else if v == f64::NEG_INFINITY {
        "'-Infinity'".to_string()
    } else {
        v.to_string()
    }
}

fn is_numeric_tag(tag: &str) -> bool {
    let upper = tag.trim().to_uppercase();
    ["NUMBER", "NUMERIC", "DECIMAL", "INTEGER", "FLOAT", "BINARY_"]
        .iter()
        .any(|p| upper.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_null_always_null() {
        assert_eq!(format_value(&SqlValue::Null, "VARCHAR2(10)", Some("VARCHAR(10)")), "NULL");
        assert_eq!(format_value(&SqlValue::Null, "NUMBER(1,0)", Some("BOOLEAN")), "NULL");
        assert_eq!(format_value(&SqlValue::Null, "DATE", None), "NULL");
    }

    #[test]
    fn test_boolean_target() {
        let b = Some("BOOLEAN");
        assert_eq!(format_value(&SqlValue::I64(1), "NUMBER(1,0)", b), "true");
        assert_eq!(format_value(&SqlValue::I64(0), "NUMBER(1,0)", b), "false");
        assert_eq!(format_value(&SqlValue::from("TRUE"), "VARCHAR2(5)", b), "true");
        assert_eq!(format_value(&SqlValue::from("0"), "CHAR(1)", b), "false");
        assert_eq!(format_value(&SqlValue::Decimal(Decimal::ONE), "NUMBER", b), "true");
        assert_eq!(format_value(&SqlValue::Bool(false), "NUMBER", b), "false");
    }

    #[test]
    fn test_boolean_target_other_values_pass_through() {
        let b = Some("boolean");
        assert_eq!(format_value(&SqlValue::from("Y"), "CHAR(1)", b), "Y");
        assert_eq!(format_value(&SqlValue::I64(2), "NUMBER(1,0)", b), "2");
    }

    #[test]
    fn test_text_quote_doubling_round_trips() {
        let original = "O'Brien's \"quoted\" -- text";
        let literal = format_value(&SqlValue::from(original), "VARCHAR2(50)", Some("VARCHAR(50)"));
        assert_eq!(literal, "'O''Brien''s \"quoted\" -- text'");

        let inner = &literal[1..literal.len() - 1];
        assert_eq!(inner.replace("''", "'"), original);
    }

    #[test]
    fn test_numeric_values_unquoted() {
        let dec = Decimal::from_str("12345.67").unwrap();
        assert_eq!(
            format_value(&SqlValue::Decimal(dec), "NUMBER(10,2)", Some("NUMERIC")),
            "12345.67"
        );
        assert_eq!(format_value(&SqlValue::I64(-42), "NUMBER(10,0)", Some("BIGINT")), "-42");
        assert_eq!(
            format_value(
                &SqlValue::number("123456789012345678901234567890"),
                "NUMBER",
                Some("NUMERIC")
            ),
            "123456789012345678901234567890"
        );
        assert_eq!(format_value(&SqlValue::F64(f64::NAN), "BINARY_DOUBLE", None), "'NaN'");
    }

    #[test]
    fn test_numeric_text_from_numeric_source() {
        let numeric = Some("NUMERIC");
        assert_eq!(format_value(&SqlValue::from("12.50"), "NUMBER(10,2)", numeric), "12.50");
        assert_eq!(format_value(&SqlValue::from("12;drop"), "NUMBER(10,2)", numeric), "'12;drop'");
        assert_eq!(format_value(&SqlValue::from("42"), "VARCHAR2(5)", Some("VARCHAR(5)")), "'42'");
    }

    #[test]
    fn test_temporal_values_quoted() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let ts = date.and_hms_opt(13, 45, 0).unwrap();
        assert_eq!(format_value(&SqlValue::Date(date), "DATE", None), "'2024-02-29'");
        assert_eq!(
            format_value(&SqlValue::DateTime(ts), "DATE", Some("TIMESTAMP WITHOUT TIME ZONE")),
            "'2024-02-29 13:45:00'"
        );
    }

    #[test]
    fn test_bytes_hex_literal() {
        let v = SqlValue::from(vec![0xde, 0xad, 0x01]);
        assert_eq!(format_value(&v, "RAW(16)", Some("BYTEA")), "'\\xdead01'");
    }

    #[test]
    fn test_deterministic() {
        let v = SqlValue::from("abc'def");
        let a = format_value(&v, "VARCHAR2(10)", Some("VARCHAR(10)"));
        let b = format_value(&v, "VARCHAR2(10)", Some("VARCHAR(10)"));
        assert_eq!(a, b);
    }
}
