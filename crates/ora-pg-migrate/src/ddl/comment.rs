//! COMMENT ON rendering.

use super::{DdlAssembler, STATEMENT_END};

/// Replacement for `$$` inside a dollar-quoted comment body.
pub const MULTILINE_PLACEHOLDER: &str = "<<>>";

/// Object a comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOn<'a> {
    Table(&'a str),
    /// Table name, column name.
    Column(&'a str, &'a str),
    View(&'a str),
}

/// Render comment text as a literal.
///
/// Single-line text is single-quoted with quotes doubled. Multi-line text
/// becomes a `$$` block with each line trimmed and any `$$`, or a `$`
/// ending the text, replaced by [`MULTILINE_PLACEHOLDER`].
pub fn comment_literal(text: &str) -> String {
    if text.contains('\n') || text.contains('\r') {
        let mut body = text
            .replace("$$", MULTILINE_PLACEHOLDER)
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");
        // A trailing `$` would merge with the closing delimiter.
        if body.ends_with('$') {
            body.pop();
            body.push_str(MULTILINE_PLACEHOLDER);
        }
        format!("$${}$$", body)
    } else {
        format!("'{}'", text.trim().replace('\'', "''"))
    }
}

impl DdlAssembler {
    /// Render `COMMENT ON ... IS ...;`, or `None` for blank text.
    pub fn render_comment(&self, on: CommentOn<'_>, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        let target = match on {
            CommentOn::Table(table) => format!("TABLE {}", self.ident(table)),
            CommentOn::Column(table, column) => {
                format!("COLUMN {}.{}", self.ident(table), self.ident(column))
            }
            CommentOn::View(view) => format!("VIEW {}", self.ident(view)),
        };

        Some(format!(
            "COMMENT ON {} IS {}{}",
            target,
            comment_literal(text),
            STATEMENT_END
        ))
    }
}
