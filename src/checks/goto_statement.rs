use super::{Check, CheckContext};
use crate::parser::{AstNode, NodeKind};

pub struct GotoStatementCheck;

impl Check for GotoStatementCheck {
    fn key(&self) -> &'static str {
        "GotoStatement"
    }

    fn subscribed_kinds(&self) -> &[NodeKind] {
        &[NodeKind::GotoStatement]
    }

    fn visit_node(&mut self, node: &AstNode, ctx: &mut CheckContext<'_>) {
        ctx.report(node.line(), "Remove this use of \"goto\".");
    }
}
