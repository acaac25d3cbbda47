//! Rule dispatch
//!
//! Checks subscribe to AST node tags. [`CheckRegistry::run`] walks the tree
//! once in pre-order and hands every node to the checks registered for its tag,
//! bracketed by per-file `visit_file` / `leave_file` callbacks.

mod file_encoding;
mod goto_statement;
mod parsing_error;

use std::fmt;

use rustc_hash::FxHashMap;

use crate::parser::{AstNode, NodeKind};
use crate::pipeline::Analysis;

pub use file_encoding::FileEncodingCheck;
pub use goto_statement::GotoStatementCheck;
pub use parsing_error::ParsingErrorCheck;

/// One rule finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// `None` for file-level findings
    pub line: Option<usize>,
    pub rule: &'static str,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// What a check sees while it runs: the analyzed file and a sink for findings
pub struct CheckContext<'a> {
    pub analysis: &'a Analysis,
    rule: &'static str,
    violations: &'a mut Vec<Violation>,
}

impl<'a> CheckContext<'a> {
    pub fn report(&mut self, line: usize, message: impl Into<String>) {
        self.push(Some(line), message.into());
    }

    pub fn report_file(&mut self, message: impl Into<String>) {
        self.push(None, message.into());
    }

    fn push(&mut self, line: Option<usize>, message: String) {
        self.violations.push(Violation {
            line,
            rule: self.rule,
            message,
        });
    }
}

/// A rule run over each analyzed file.
///
/// All callbacks default to doing nothing, so a check only implements what it
/// needs. `visit_node` is only called for tags listed in `subscribed_kinds`.
pub trait Check: Send {
    /// Stable rule key reported with every violation
    fn key(&self) -> &'static str;

    fn subscribed_kinds(&self) -> &[NodeKind] {
        &[]
    }

    fn visit_file(&mut self, _ctx: &mut CheckContext<'_>) {}

    fn visit_node(&mut self, _node: &AstNode, _ctx: &mut CheckContext<'_>) {}

    fn leave_file(&mut self, _ctx: &mut CheckContext<'_>) {}
}

#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
    subscriptions: FxHashMap<NodeKind, Vec<usize>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in check
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ParsingErrorCheck));
        registry.register(Box::new(FileEncodingCheck));
        registry.register(Box::new(GotoStatementCheck));
        registry
    }

    pub fn register(&mut self, check: Box<dyn Check>) {
        let index = self.checks.len();
        for &kind in check.subscribed_kinds() {
            self.subscriptions.entry(kind).or_default().push(index);
        }
        self.checks.push(check);
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|c| c.key())
    }

    /// Runs every check over one file; violations come back ordered by line,
    /// file-level ones first.
    pub fn run(&mut self, analysis: &Analysis) -> Vec<Violation> {
        let mut violations = Vec::new();

        for check in &mut self.checks {
            let mut ctx = CheckContext {
                analysis,
                rule: check.key(),
                violations: &mut violations,
            };
            check.visit_file(&mut ctx);
        }

        if !self.subscriptions.is_empty() {
            for node in analysis.ast.descendants() {
                let Some(indices) = self.subscriptions.get(&node.kind) else {
                    continue;
                };
                for &index in indices {
                    let check = &mut self.checks[index];
                    let mut ctx = CheckContext {
                        analysis,
                        rule: check.key(),
                        violations: &mut violations,
                    };
                    check.visit_node(node, &mut ctx);
                }
            }
        }

        for check in &mut self.checks {
            let mut ctx = CheckContext {
                analysis,
                rule: check.key(),
                violations: &mut violations,
            };
            check.leave_file(&mut ctx);
        }

        // Option orders None first
        violations.sort_by_key(|v| v.line);
        violations
    }
}
