//! ALTER TABLE ... ADD CONSTRAINT rendering.

use super::{DdlAssembler, STATEMENT_END};
use crate::core::{Constraint, ConstraintKind, DiagnosticKind, Diagnostics, ReferentialAction};

impl DdlAssembler {
    /// Render a primary key, foreign key, or check constraint.
    ///
    /// Returns `None` when the constraint touches an ignored column; the
    /// skip is recorded as an `IgnoredColumnReference` diagnostic. Unknown
    /// referential rules drop only their clause.
    pub fn render_constraint(
        &self,
        constraint: &Constraint,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let object = format!("{}.{}", constraint.table, constraint.name);

        let ignored_local: Vec<&String> = constraint
            .columns
            .iter()
            .filter(|c| self.is_ignored(&constraint.table, c))
            .collect();

        let body = match constraint.kind {
            ConstraintKind::PrimaryKey => {
                let columns: Vec<&String> = constraint
                    .columns
                    .iter()
                    .filter(|c| !self.is_ignored(&constraint.table, c))
                    .collect();
                if columns.is_empty() {
                    diagnostics.warn(
                        DiagnosticKind::IgnoredColumnReference,
                        object,
                        "primary key has no remaining columns, skipped",
                    );
                    return None;
                }
                format!("PRIMARY KEY ({})", self.ident_list(&columns))
            }
            ConstraintKind::ForeignKey => {
                let ref_table = constraint.ref_table.as_deref().unwrap_or_default();
                let ignored_remote = constraint
                    .ref_columns
                    .iter()
                    .any(|c| self.is_ignored(ref_table, c));

                if !ignored_local.is_empty() || ignored_remote {
                    diagnostics.warn(
                        DiagnosticKind::IgnoredColumnReference,
                        object,
                        "foreign key references an ignored column, skipped",
                    );
                    return None;
                }

                let mut body = format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    self.ident_list(&constraint.columns),
                    self.ident(ref_table),
                    self.ident_list(&constraint.ref_columns)
                );
                self.push_rule(
                    &mut body,
                    "ON DELETE",
                    constraint.on_delete.as_ref(),
                    &object,
                    diagnostics,
                );
                self.push_rule(
                    &mut body,
                    "ON UPDATE",
                    constraint.on_update.as_ref(),
                    &object,
                    diagnostics,
                );
                body
            }
            ConstraintKind::Check => {
                if !ignored_local.is_empty() {
                    diagnostics.warn(
                        DiagnosticKind::IgnoredColumnReference,
                        object,
                        "check constraint references an ignored column, skipped",
                    );
                    return None;
                }
                format!("CHECK ({})", constraint.condition.as_deref().unwrap_or("TRUE").trim())
            }
        };

        Some(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}{}",
            self.ident(&constraint.table),
            self.ident(&constraint.name),
            body,
            STATEMENT_END
        ))
    }

    fn push_rule(
        &self,
        body: &mut String,
        clause: &str,
        rule: Option<&ReferentialAction>,
        object: &str,
        diagnostics: &mut Diagnostics,
    ) {
        match rule {
            // NO ACTION is the destination default.
            None | Some(ReferentialAction::NoAction) => {}
            Some(ReferentialAction::Unknown(name)) => diagnostics.warn(
                DiagnosticKind::UnknownReferentialRule,
                object,
                format!("unsupported {} rule '{}', clause omitted", clause, name),
            ),
            Some(action) => {
                if let Some(sql) = action.as_sql() {
                    body.push(' ');
                    body.push_str(clause);
                    body.push(' ');
                    body.push_str(sql);
                }
            }
        }
    }
}
