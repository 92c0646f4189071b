//! SQL script tokenizing and replay.
//!
//! Generated (or hand-written) scripts are split into statements by
//! [`split_statements`] and executed one at a time by [`execute_files`].
//! A failing statement is logged and counted; execution moves on.

mod executor;
mod tokenizer;

pub use executor::{
    collect_script_files, execute_files, execute_script, FileReport, ImportSummary,
    StatementExecutor, StatementFailure, STATEMENT_EXCERPT_LEN,
};
pub use tokenizer::split_statements;
