//! Sequence range translation with overflow protection.
//!
//! Oracle sequences may declare bounds far beyond 64 bits (the default
//! `MAXVALUE` is 28 nines). The translator parses the textual catalog
//! values, clamps them into the destination range, and moves the start
//! value away from the top of the range when the sequence would exhaust
//! within a thousand increments.

use serde::Serialize;

use crate::core::identifier::pg_ident;
use crate::core::{DiagnosticKind, Diagnostics, Sequence, Severity};

/// Number of increments of headroom required below MAXVALUE.
const OVERFLOW_HEADROOM: i64 = 1000;

/// Representable range of a destination sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceBounds {
    pub min: i64,
    pub max: i64,
}

impl Default for SequenceBounds {
    /// PostgreSQL `bigint` sequences.
    fn default() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }
}

/// Resolved sequence, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceTranslation {
    /// Destination sequence name (suffix applied).
    pub name: String,
    pub start: i64,
    pub increment: i64,
    pub min: i64,
    pub max: i64,
    pub cache: i64,
    pub cycle: bool,
    /// Catalog MIN_VALUE text.
    pub original_min: String,
    /// Catalog MAX_VALUE text.
    pub original_max: String,
    /// Catalog LAST_NUMBER text.
    pub original_last: String,
    /// Adjustments made, rendered as comments above the statement.
    pub notes: Vec<(Severity, String)>,
}

impl SequenceTranslation {
    /// Render the `CREATE SEQUENCE` statement with its comments.
    pub fn to_sql(&self, quote_identifiers: bool) -> String {
        let mut sql = String::new();
        for (severity, note) in &self.notes {
            sql.push_str(&format!("-- {}: {}\n", severity, note));
        }
        sql.push_str(&format!(
            "CREATE SEQUENCE {}\n    START WITH {}\n    INCREMENT BY {}\n    \
             MINVALUE {}\n    MAXVALUE {}\n    CACHE {}\n    {};\n",
            pg_ident(&self.name, quote_identifiers),
            self.start,
            self.increment,
            self.min,
            self.max,
            self.cache,
            if self.cycle { "CYCLE" } else { "NO CYCLE" },
        ));
        sql.push_str(&format!(
            "-- Original values: MIN={}, MAX={}, LAST={}\n",
            self.original_min, self.original_max, self.original_last
        ));
        sql
    }
}

/// Translates catalog sequences into destination sequences.
#[derive(Debug, Clone, Default)]
pub struct SequenceTranslator {
    bounds: SequenceBounds,
    suffix: String,
}

impl SequenceTranslator {
    pub fn new(bounds: SequenceBounds) -> Self {
        Self {
            bounds,
            suffix: String::new(),
        }
    }

    /// Append a suffix to every emitted sequence name.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Translate one sequence.
    ///
    /// Every adjustment is recorded both as a note on the result and as a
    /// `NumericOverflow` diagnostic. The result always satisfies
    /// `min <= max` and `max(min, 1) <= start <= max`.
    pub fn translate(&self, seq: &Sequence, diagnostics: &mut Diagnostics) -> SequenceTranslation {
        let mut notes: Vec<(Severity, String)> = Vec::new();
        let bounds = self.bounds;

        let min = parse_or(&seq.min_value, 1, "MIN_VALUE", &mut notes);
        let max = parse_or(&seq.max_value, bounds.max, "MAX_VALUE", &mut notes);
        let last = parse_or(&seq.last_value, 1, "LAST_NUMBER", &mut notes);
        let mut increment = parse_or(&seq.increment_by, 1, "INCREMENT_BY", &mut notes);
        let mut cache = parse_or(&seq.cache_size, 1, "CACHE_SIZE", &mut notes);

        if increment == 0 {
            notes.push((Severity::Warning, "INCREMENT BY 0 is invalid, using 1".to_string()));
            increment = 1;
        }
        if cache < 1 {
            cache = 1;
        }

        let mut safe_min = min.max(bounds.min);
        if safe_min != min {
            notes.push((
                Severity::Warning,
                format!("MIN_VALUE adjusted from {} to {} (destination limit)", min, safe_min),
            ));
        }
        if safe_min > bounds.max {
            let reset = bounds.min.max(1);
            notes.push((
                Severity::Warning,
                format!(
                    "MIN_VALUE {} is above the destination maximum {}, using {}",
                    safe_min, bounds.max, reset
                ),
            ));
            safe_min = reset;
        }

        let mut safe_max = max.min(bounds.max);
        if safe_max != max {
            notes.push((
                Severity::Warning,
                format!("MAX_VALUE adjusted from {} to {} (destination limit)", max, safe_max),
            ));
        }

        if safe_max < 1 || safe_max < safe_min {
            notes.push((
                Severity::Warning,
                format!(
                    "MAX_VALUE {} is below MIN_VALUE {} or 1, using {}",
                    safe_max, safe_min, bounds.max
                ),
            ));
            safe_max = bounds.max;
        }

        let mut start = last.max(safe_min);
        if start <= 0 {
            notes.push((
                Severity::Warning,
                format!("START WITH {} is not positive, using 1", start),
            ));
            start = 1;
        }

        let headroom = increment.saturating_mul(OVERFLOW_HEADROOM);
        if increment > 0 && start > safe_max.saturating_sub(headroom) {
            let reduced = (safe_max / 4).max(1);
            notes.push((
                Severity::Critical,
                format!(
                    "sequence {} may overflow soon (current {}, max {}), restarting at {}",
                    seq.name, start, safe_max, reduced
                ),
            ));
            start = reduced;
        }

        let lower = safe_min.max(1);
        if start < lower {
            notes.push((
                Severity::Warning,
                format!("START WITH {} raised to {}", start, lower),
            ));
            start = lower;
        } else if start > safe_max {
            start = safe_max;
        }

        debug_assert!(
            bounds.min <= safe_min && safe_min <= safe_max && safe_max <= bounds.max,
            "sequence range outside destination bounds"
        );
        debug_assert!(safe_min.max(1) <= start && start <= safe_max, "start outside range");

        for (severity, note) in &notes {
            diagnostics.push(
                DiagnosticKind::NumericOverflow,
                *severity,
                seq.name.clone(),
                note.clone(),
            );
        }

        SequenceTranslation {
            name: format!("{}{}", seq.name, self.suffix),
            start,
            increment,
            min: safe_min,
            max: safe_max,
            cache,
            cycle: seq.cycle,
            original_min: seq.min_value.clone(),
            original_max: seq.max_value.clone(),
            original_last: seq.last_value.clone(),
            notes,
        }
    }
}

fn parse_or(text: &str, default: i64, field: &str, notes: &mut Vec<(Severity, String)>) -> i64 {
    match text.trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            notes.push((
                Severity::Warning,
                format!("{} '{}' is not representable, using {}", field, text.trim(), default),
            ));
            default
        }
    }
}
