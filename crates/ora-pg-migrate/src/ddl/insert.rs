//! INSERT statement rendering.

use super::{DdlAssembler, STATEMENT_END};

impl DdlAssembler {
    /// Render a single-row `INSERT INTO t (c1, ...) VALUES (v1, ...);`.
    ///
    /// `literals` must already be formatted destination literals, one per
    /// column and in the same order.
    pub fn render_insert<C, L>(&self, table: &str, columns: &[C], literals: &[L]) -> String
    where
        C: AsRef<str>,
        L: AsRef<str>,
    {
        let values = literals
            .iter()
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({}){}",
            self.ident(table),
            self.ident_list(columns),
            values,
            STATEMENT_END
        )
    }
}
