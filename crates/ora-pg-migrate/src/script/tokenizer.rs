//! Statement splitting for SQL scripts.
//!
//! The tokenizer works line by line, carrying its lexical state (inside a
//! quoted literal, a `$$` block or a block comment) from one line to the next:
//!
//! 1. A line that starts outside any literal and whose trimmed text starts
//!    with `COMMENT ON` (any case) is kept as is, so `--` inside a comment
//!    body survives.
//! 2. Block comments are removed, including ones spanning several lines.
//!    Text before and after the comment on its boundary lines is kept.
//! 3. A `--` comment runs to the end of the line. Comment markers inside
//!    single-quoted, double-quoted or `$$` text are literal, also when that
//!    text opened on an earlier line.
//! 4. The remaining text is split on `;` outside quoted text. A `;`
//!    preceded by a backslash never terminates a statement.
//!
//! Blank segments are dropped.

/// Lexical state at a position in the script.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Single,
    Double,
    Dollar,
    Block,
}

/// Split a script into trimmed, non-empty statements without their
/// terminating `;`.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(script.len());
    let mut state = Scan::Code;

    for line in script.lines() {
        let strip = !(state == Scan::Code && is_comment_on(line));
        let (kept, next) = scan_line(line, state, strip);
        cleaned.push_str(&kept);
        cleaned.push('\n');
        state = next;
    }

    split_on_terminators(&cleaned)
}

fn is_comment_on(line: &str) -> bool {
    line.trim_start()
        .get(..10)
        .is_some_and(|head| head.eq_ignore_ascii_case("COMMENT ON"))
}

/// Scan one line starting in `state`. Returns the retained text and the
/// state at the end of the line. With `strip` unset, comment markers are
/// kept and only literal boundaries are tracked.
fn scan_line(line: &str, mut state: Scan, strip: bool) -> (String, Scan) {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        let next = chars.peek().copied();
        match (state, c) {
            (Scan::Block, '*') if next == Some('/') => {
                chars.next();
                state = Scan::Code;
                if !out.is_empty() {
                    out.push(' ');
                }
                continue;
            }
            (Scan::Block, _) => continue,
            (Scan::Code, '-') if strip && next == Some('-') => break,
            (Scan::Code, '/') if strip && next == Some('*') => {
                chars.next();
                state = Scan::Block;
                continue;
            }
            (Scan::Code, '\'') => state = Scan::Single,
            (Scan::Code, '"') => state = Scan::Double,
            (Scan::Code, '$') | (Scan::Dollar, '$') if next == Some('$') => {
                chars.next();
                out.push_str("$$");
                state = if state == Scan::Code { Scan::Dollar } else { Scan::Code };
                continue;
            }
            (Scan::Single, '\'') | (Scan::Double, '"') => state = Scan::Code,
            _ => {}
        }
        out.push(c);
    }

    (out, state)
}

fn split_on_terminators(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote = Scan::Code;
    let mut prev: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Scan::Code, ';') if prev != Some('\\') => {
                push_statement(&mut statements, &current);
                current.clear();
                prev = None;
                continue;
            }
            (Scan::Code, '\'') => quote = Scan::Single,
            (Scan::Code, '"') => quote = Scan::Double,
            (Scan::Code, '$') if chars.peek() == Some(&'$') => {
                current.push(c);
                current.push('$');
                chars.next();
                quote = Scan::Dollar;
                prev = Some('$');
                continue;
            }
            (Scan::Single, '\'') | (Scan::Double, '"') => quote = Scan::Code,
            (Scan::Dollar, '$') if chars.peek() == Some(&'$') => {
                current.push(c);
                current.push('$');
                chars.next();
                quote = Scan::Code;
                prev = Some('$');
                continue;
            }
            _ => {}
        }
        current.push(c);
        prev = Some(c);
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}
