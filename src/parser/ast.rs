// AST (Abstract Syntax Tree) definitions for the C++ front end

use std::fmt;
use std::fmt::Write as _;
use std::ops::Range;

/// Source location information for diagnostics.
///
/// Always relative to the original physical line layout, including for text
/// that the normalizer collapsed out of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte range `[start, end)` into the original source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} > end {end}");
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

/// Grammar tag of an AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TranslationUnit,
    PreprocessorDirective,

    // Declarations
    EmptyDeclaration,
    SimpleDeclaration,
    FunctionDefinition,
    CtorInitializer,
    ClassSpecifier,
    AccessSpecifier,
    EnumSpecifier,
    Enumerator,
    NamespaceDefinition,
    NamespaceAlias,
    LinkageSpecification,
    TemplateDeclaration,
    UsingDirective,
    UsingDeclaration,
    AliasDeclaration,
    StaticAssertDeclaration,

    // Statements
    CompoundStatement,
    ExpressionStatement,
    EmptyStatement,
    IfStatement,
    SwitchStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    RangeForStatement,
    ForRangeDeclaration,
    Condition,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    GotoStatement,
    LabeledStatement,
    CaseLabel,
    DefaultLabel,
    TryBlock,
    Handler,
    AsmDeclaration,

    // Expressions
    AssignmentExpression,
    ConditionalExpression,
    BinaryExpression,
    UnaryExpression,
    PostfixExpression,
    CastExpression,
    CallExpression,
    SubscriptExpression,
    MemberAccess,
    ParenthesizedExpression,
    BracedInitList,
    LambdaExpression,
    NewExpression,
    DeleteExpression,
    ThrowExpression,
    BuiltinExpression,
    IdExpression,
    TypeId,
    Literal,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translationUnit",
            NodeKind::PreprocessorDirective => "preprocessorDirective",
            NodeKind::EmptyDeclaration => "emptyDeclaration",
            NodeKind::SimpleDeclaration => "simpleDeclaration",
            NodeKind::FunctionDefinition => "functionDefinition",
            NodeKind::CtorInitializer => "ctorInitializer",
            NodeKind::ClassSpecifier => "classSpecifier",
            NodeKind::AccessSpecifier => "accessSpecifier",
            NodeKind::EnumSpecifier => "enumSpecifier",
            NodeKind::Enumerator => "enumerator",
            NodeKind::NamespaceDefinition => "namespaceDefinition",
            NodeKind::NamespaceAlias => "namespaceAlias",
            NodeKind::LinkageSpecification => "linkageSpecification",
            NodeKind::TemplateDeclaration => "templateDeclaration",
            NodeKind::UsingDirective => "usingDirective",
            NodeKind::UsingDeclaration => "usingDeclaration",
            NodeKind::AliasDeclaration => "aliasDeclaration",
            NodeKind::StaticAssertDeclaration => "staticAssertDeclaration",
            NodeKind::CompoundStatement => "compoundStatement",
            NodeKind::ExpressionStatement => "expressionStatement",
            NodeKind::EmptyStatement => "emptyStatement",
            NodeKind::IfStatement => "ifStatement",
            NodeKind::SwitchStatement => "switchStatement",
            NodeKind::WhileStatement => "whileStatement",
            NodeKind::DoStatement => "doStatement",
            NodeKind::ForStatement => "forStatement",
            NodeKind::RangeForStatement => "rangeForStatement",
            NodeKind::ForRangeDeclaration => "forRangeDeclaration",
            NodeKind::Condition => "condition",
            NodeKind::ReturnStatement => "returnStatement",
            NodeKind::BreakStatement => "breakStatement",
            NodeKind::ContinueStatement => "continueStatement",
            NodeKind::GotoStatement => "gotoStatement",
            NodeKind::LabeledStatement => "labeledStatement",
            NodeKind::CaseLabel => "caseLabel",
            NodeKind::DefaultLabel => "defaultLabel",
            NodeKind::TryBlock => "tryBlock",
            NodeKind::Handler => "handler",
            NodeKind::AsmDeclaration => "asmDeclaration",
            NodeKind::AssignmentExpression => "assignmentExpression",
            NodeKind::ConditionalExpression => "conditionalExpression",
            NodeKind::BinaryExpression => "binaryExpression",
            NodeKind::UnaryExpression => "unaryExpression",
            NodeKind::PostfixExpression => "postfixExpression",
            NodeKind::CastExpression => "castExpression",
            NodeKind::CallExpression => "callExpression",
            NodeKind::SubscriptExpression => "subscriptExpression",
            NodeKind::MemberAccess => "memberAccess",
            NodeKind::ParenthesizedExpression => "parenthesizedExpression",
            NodeKind::BracedInitList => "bracedInitList",
            NodeKind::LambdaExpression => "lambdaExpression",
            NodeKind::NewExpression => "newExpression",
            NodeKind::DeleteExpression => "deleteExpression",
            NodeKind::ThrowExpression => "throwExpression",
            NodeKind::BuiltinExpression => "builtinExpression",
            NodeKind::IdExpression => "idExpression",
            NodeKind::TypeId => "typeId",
            NodeKind::Literal => "literal",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the syntax tree.
///
/// `tokens` indexes into the token stream the tree was parsed from (end
/// exclusive). `recovered` is set on everything built after the parser had to
/// resynchronize, marking it as lower-confidence for rules.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: NodeKind,
    pub children: Vec<AstNode>,
    pub tokens: Range<usize>,
    pub location: SourceLocation,
    pub recovered: bool,
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// Pre-order iterator over this node and all of its descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All descendants (including `self`) with the given tag, in source order
    pub fn find_all(&self, kind: NodeKind) -> Vec<&AstNode> {
        self.descendants().filter(|n| n.kind == kind).collect()
    }

    /// Indented one-node-per-line rendering used by `--ast`
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.descendants_with_depth() {
            let _ = write!(out, "{:indent$}{} @{}", "", node.kind, node.location, indent = depth * 2);
            if node.recovered {
                out.push_str(" (recovered)");
            }
            out.push('\n');
        }
        out
    }

    fn descendants_with_depth(&self) -> Vec<(usize, &AstNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}

// Long chains such as `a.b().c().d()...` nest deeply; tear the tree down
// with an explicit stack instead of recursive drop glue.
impl Drop for AstNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Iterator returned by [`AstNode::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, line: usize) -> AstNode {
        AstNode {
            kind,
            children: Vec::new(),
            tokens: 0..1,
            location: SourceLocation::new(line, 1),
            recovered: false,
        }
    }

    #[test]
    fn test_descendants_are_preorder() {
        let mut root = leaf(NodeKind::TranslationUnit, 1);
        let mut func = leaf(NodeKind::FunctionDefinition, 2);
        func.children.push(leaf(NodeKind::CompoundStatement, 2));
        root.children.push(func);
        root.children.push(leaf(NodeKind::SimpleDeclaration, 5));

        let kinds: Vec<NodeKind> = root.descendants().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::TranslationUnit,
                NodeKind::FunctionDefinition,
                NodeKind::CompoundStatement,
                NodeKind::SimpleDeclaration,
            ]
        );
        assert_eq!(root.find_all(NodeKind::SimpleDeclaration)[0].line(), 5);
    }

    #[test]
    fn test_pretty_marks_recovered_nodes() {
        let mut root = leaf(NodeKind::TranslationUnit, 1);
        let mut stmt = leaf(NodeKind::ExpressionStatement, 3);
        stmt.recovered = true;
        root.children.push(stmt);

        let text = root.pretty();
        assert_eq!(
            text,
            "translationUnit @1:1\n  expressionStatement @3:1 (recovered)\n"
        );
    }
}
