use super::{Check, CheckContext};
use crate::parser::DiagnosticKind;

/// Surfaces every parser diagnostic as a violation on its line
pub struct ParsingErrorCheck;

impl Check for ParsingErrorCheck {
    fn key(&self) -> &'static str {
        "ParsingError"
    }

    fn visit_file(&mut self, ctx: &mut CheckContext<'_>) {
        let analysis = ctx.analysis;
        for diagnostic in &analysis.diagnostics {
            if diagnostic.kind == DiagnosticKind::ParseError {
                ctx.report(diagnostic.line, diagnostic.message.clone());
            }
        }
    }
}
