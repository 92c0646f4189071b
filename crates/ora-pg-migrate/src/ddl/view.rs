//! CREATE VIEW rendering with best-effort body rewrites.

use std::sync::OnceLock;

use regex::Regex;

use super::{CommentOn, DdlAssembler, STATEMENT_END};
use crate::core::View;

struct ViewRewrites {
    nvl: Regex,
    sysdate: Regex,
    from_dual: Regex,
    nextval: Regex,
}

impl ViewRewrites {
    fn instance() -> &'static Self {
        static REWRITES: OnceLock<ViewRewrites> = OnceLock::new();
        REWRITES.get_or_init(|| ViewRewrites {
            nvl: Regex::new(r"(?i)\bNVL\s*\(").expect("Invalid NVL pattern"),
            sysdate: Regex::new(r"(?i)\b(SYSDATE|SYSTIMESTAMP)\b")
                .expect("Invalid SYSDATE pattern"),
            from_dual: Regex::new(r"(?i)\s+FROM\s+DUAL\b").expect("Invalid DUAL pattern"),
            nextval: Regex::new(r"(?i)\b([A-Z_][A-Z0-9_$#]*)\.NEXTVAL\b")
                .expect("Invalid NEXTVAL pattern"),
        })
    }
}

/// Apply the fixed list of function rewrites to a view body.
///
/// Best effort only: the patterns are not aware of string literals or
/// comments, and anything not listed passes through unchanged.
pub fn rewrite_view_body(body: &str, sequence_suffix: &str) -> String {
    let rw = ViewRewrites::instance();
    let out = rw.nvl.replace_all(body, "COALESCE(");
    let out = rw.sysdate.replace_all(&out, "CURRENT_TIMESTAMP");
    let out = rw.from_dual.replace_all(&out, "");
    let replacement = format!("nextval('${{1}}{}')", sequence_suffix.replace('$', "$$"));
    rw.nextval.replace_all(&out, replacement.as_str()).into_owned()
}

impl DdlAssembler {
    /// Render `CREATE OR REPLACE VIEW`, followed by the view comment when
    /// comment transfer is enabled.
    pub fn render_view(&self, view: &View) -> String {
        let body = view.text.trim().trim_end_matches(';').trim_end();
        let body = if self.options.rewrite_view_bodies {
            rewrite_view_body(body, &self.options.sequence_suffix)
        } else {
            body.to_string()
        };

        let mut sql = format!(
            "CREATE OR REPLACE VIEW {} AS\n{}{}",
            self.ident(&view.name),
            body,
            STATEMENT_END
        );

        if self.options.transfer_comments {
            if let Some(stmt) = view
                .comment
                .as_deref()
                .and_then(|text| self.render_comment(CommentOn::View(&view.name), text))
            {
                sql.push_str(&stmt);
            }
        }

        sql
    }
}
