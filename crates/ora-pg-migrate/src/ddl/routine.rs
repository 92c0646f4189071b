//! Inert annotation blocks for procedural source.

use super::DdlAssembler;
use crate::core::Routine;

impl DdlAssembler {
    /// Wrap procedural source in a comment block so the script replays as a
    /// no-op.
    ///
    /// Comment markers inside the source are broken apart because
    /// PostgreSQL block comments nest.
    pub fn render_routine_annotation(&self, routine: &Routine) -> String {
        let source = routine
            .source
            .trim_end()
            .replace("/*", "/ *")
            .replace("*/", "* /");

        format!(
            "-- NOT TRANSLATED: {} {}\n/*\n{}\n*/\n",
            routine.kind.trim().to_uppercase(),
            routine.name,
            source
        )
    }
}
