//! CREATE INDEX rendering.

use super::{DdlAssembler, STATEMENT_END};
use crate::core::{DiagnosticKind, Diagnostics, Index};

impl DdlAssembler {
    /// Render `CREATE [UNIQUE] INDEX`, with the configured name prefix.
    ///
    /// Indexes over ignored columns are skipped with a diagnostic.
    pub fn render_index(&self, index: &Index, diagnostics: &mut Diagnostics) -> Option<String> {
        if index.columns.iter().any(|c| self.is_ignored(&index.table, c)) {
            diagnostics.warn(
                DiagnosticKind::IgnoredColumnReference,
                format!("{}.{}", index.table, index.name),
                "index covers an ignored column, skipped",
            );
            return None;
        }

        let name = format!("{}{}", self.options.index_prefix, index.name);
        Some(format!(
            "CREATE {}INDEX {} ON {} ({}){}",
            if index.is_unique { "UNIQUE " } else { "" },
            self.ident(&name),
            self.ident(&index.table),
            self.ident_list(&index.columns),
            STATEMENT_END
        ))
    }
}
