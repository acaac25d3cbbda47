//! Statement parsing implementation
//!
//! This module handles parsing of the statements found in function bodies:
//!
//! - Declarations: `int x = 42;`, local classes, `using`, `static_assert`
//! - Control flow: `if`, `switch`, `while`, `do-while`, `for`, range `for`
//! - Jump statements: `return`, `co_return`, `break`, `continue`, `goto`
//! - Labels: `name:`, `case value:`, `default:`
//! - `try` blocks with handlers, `asm`
//! - Compound statements: `{ ... }`
//! - Expression statements
//!
//! # Grammar
//!
//! ```text
//! statement ::= compound | if_stmt | switch_stmt | while_stmt | do_stmt
//!             | for_stmt | jump_stmt | label | try_block | declaration
//!             | expr_stmt | ";"
//! condition ::= [init_stmt ";"] (declaration | expression)
//! ```
//!
//! A statement that starts like a declaration is parsed as one; C++ resolves
//! the same ambiguity the same way.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::keywords;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// How far ahead the declaration check looks before giving up
const DECLARATION_LOOKAHEAD: usize = 64;

impl<'t> Parser<'t> {
    /// Parse `{ statements }`
    pub(crate) fn parse_compound_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.expect_lbrace("to open block")?;

        let mut statements = Vec::new();
        self.parse_sequence(&mut statements, Some("}"), Self::parse_statement)?;
        self.expect_rbrace("after block")?;

        Ok(self.finish(NodeKind::CompoundStatement, start, statements))
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<AstNode, ParseError> {
        let token = self.peek();
        let start = self.mark();

        match token.kind {
            TokenKind::Punctuation if token.value == "{" => return self.parse_compound_statement(),
            TokenKind::Punctuation if token.value == ";" => {
                self.advance();
                return Ok(self.finish(NodeKind::EmptyStatement, start, Vec::new()));
            }
            TokenKind::Keyword => match token.value.as_str() {
                "if" => return self.parse_if_statement(),
                "switch" => return self.parse_switch_statement(),
                "while" => return self.parse_while_statement(),
                "do" => return self.parse_do_statement(),
                "for" => return self.parse_for_statement(),
                "return" | "co_return" => return self.parse_return_statement(),
                "break" => {
                    self.advance();
                    self.expect_semicolon("after 'break'")?;
                    return Ok(self.finish(NodeKind::BreakStatement, start, Vec::new()));
                }
                "continue" => {
                    self.advance();
                    self.expect_semicolon("after 'continue'")?;
                    return Ok(self.finish(NodeKind::ContinueStatement, start, Vec::new()));
                }
                "goto" => {
                    self.advance();
                    self.expect_identifier()?;
                    self.expect_semicolon("after 'goto'")?;
                    return Ok(self.finish(NodeKind::GotoStatement, start, Vec::new()));
                }
                "case" => {
                    self.advance();
                    let value = self.parse_conditional_expression()?;
                    self.expect_op(":", "Expected ':' after case value")?;
                    return Ok(self.finish(NodeKind::CaseLabel, start, vec![value]));
                }
                "default" => {
                    self.advance();
                    self.expect_op(":", "Expected ':' after 'default'")?;
                    return Ok(self.finish(NodeKind::DefaultLabel, start, Vec::new()));
                }
                "try" => return self.parse_try_block(),
                "asm" => return self.parse_asm(),
                value if keywords::is_decl_specifier_keyword(value) => {
                    return self.parse_declaration();
                }
                _ => {}
            },
            TokenKind::Identifier if self.peek_ahead(1).is_op(":") => {
                // label
                self.advance();
                self.advance();
                let mut children = Vec::new();
                if !self.check_punct("}") {
                    children.push(self.parse_statement()?);
                }
                return Ok(self.finish(NodeKind::LabeledStatement, start, children));
            }
            _ => {}
        }

        if self.looks_like_declaration() {
            return self.parse_simple_declaration();
        }

        let expression = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(self.finish(NodeKind::ExpressionStatement, start, vec![expression]))
    }

    /// Parse `if [constexpr] (condition) statement [else statement]`.
    ///
    /// An `else if` ladder is read in a loop: each further branch becomes an
    /// `IfStatement` child of the first one, and a final plain `else`
    /// statement, if any, comes last.
    fn parse_if_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let mut children = self.parse_if_branch()?;

        while self.match_keyword("else") {
            if !self.check_keyword("if") {
                children.push(self.parse_statement()?);
                break;
            }
            let branch_start = self.mark();
            let branch = self.parse_if_branch()?;
            children.push(self.finish(NodeKind::IfStatement, branch_start, branch));
        }

        Ok(self.finish(NodeKind::IfStatement, start, children))
    }

    /// One `if` head and its statement, without any `else`
    fn parse_if_branch(&mut self) -> Result<Vec<AstNode>, ParseError> {
        self.advance(); // 'if'

        let mut children = Vec::new();
        let is_consteval = self.check_keyword("consteval")
            || (self.check_op("!") && self.peek_ahead(1).is_keyword("consteval"));
        if is_consteval {
            self.match_op("!");
            self.advance(); // 'consteval'
            children.push(self.parse_compound_statement()?);
        } else {
            self.match_keyword("constexpr");
            self.expect_lparen("after 'if'")?;
            children.extend(self.parse_condition_clause()?);
            self.expect_rparen("after if condition")?;
            children.push(self.parse_statement()?);
        }

        Ok(children)
    }

    /// Parse `switch (condition) statement`
    fn parse_switch_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'switch'
        self.expect_lparen("after 'switch'")?;

        let mut children = self.parse_condition_clause()?;
        self.expect_rparen("after switch condition")?;
        children.push(self.parse_statement()?);

        Ok(self.finish(NodeKind::SwitchStatement, start, children))
    }

    /// Parse `while (condition) statement`
    fn parse_while_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'while'
        self.expect_lparen("after 'while'")?;

        let mut children = vec![self.parse_condition()?];
        self.expect_rparen("after while condition")?;
        children.push(self.parse_statement()?);

        Ok(self.finish(NodeKind::WhileStatement, start, children))
    }

    /// Parse `do statement while (expression);`
    fn parse_do_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'do'

        let body = self.parse_statement()?;
        if !self.match_keyword("while") {
            return Err(self.error_here("Expected 'while' after do body"));
        }
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(self.finish(NodeKind::DoStatement, start, vec![body, condition]))
    }

    /// Parse classic and range-based `for`
    fn parse_for_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'for'
        self.match_keyword("co_await");
        self.expect_lparen("after 'for'")?;

        let mut children = Vec::new();
        if !self.check_punct(";") {
            let init = self.parse_condition()?;
            if self.check_op(":") {
                return self.finish_range_for(start, children, init);
            }
            children.push(init);
        }
        self.expect_semicolon("after for initializer")?;

        // C++20 range-for with an init-statement
        if !self.check_punct(";") {
            let condition = self.parse_condition()?;
            if self.check_op(":") {
                return self.finish_range_for(start, children, condition);
            }
            children.push(condition);
        }
        self.expect_semicolon("after for condition")?;

        if !self.check_punct(")") {
            children.push(self.parse_expression()?);
        }
        self.expect_rparen("after for clauses")?;
        children.push(self.parse_statement()?);

        Ok(self.finish(NodeKind::ForStatement, start, children))
    }

    fn finish_range_for(
        &mut self,
        start: usize,
        mut children: Vec<AstNode>,
        mut declaration: AstNode,
    ) -> Result<AstNode, ParseError> {
        declaration.kind = NodeKind::ForRangeDeclaration;
        children.push(declaration);

        self.advance(); // ':'
        children.push(self.parse_initializer_clause()?);
        self.expect_rparen("after range")?;
        children.push(self.parse_statement()?);

        Ok(self.finish(NodeKind::RangeForStatement, start, children))
    }

    /// Parse `return [value];`
    fn parse_return_statement(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'return' / 'co_return'

        let mut children = Vec::new();
        if !self.check_punct(";") {
            children.push(self.parse_initializer_clause()?);
        }
        self.expect_semicolon("after return value")?;

        Ok(self.finish(NodeKind::ReturnStatement, start, children))
    }

    /// Parse `try { ... } catch (...) { ... }...`
    pub(crate) fn parse_try_block(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'try'

        let mut children = vec![self.parse_compound_statement()?];
        while self.check_keyword("catch") {
            let handler_start = self.mark();
            self.advance();
            if !self.check_punct("(") {
                return Err(self.error_here("Expected '(' after 'catch'"));
            }
            self.skip_balanced("after exception declaration")?;
            let body = self.parse_compound_statement()?;
            children.push(self.finish(NodeKind::Handler, handler_start, vec![body]));
        }

        if children.len() == 1 {
            return Err(self.error_here("Expected 'catch' after try block"));
        }
        Ok(self.finish(NodeKind::TryBlock, start, children))
    }

    /// Parse `[init-statement ;] condition` inside the parentheses of `if` or
    /// `switch`
    fn parse_condition_clause(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut children = vec![self.parse_condition()?];
        if self.match_punct(";") {
            children.push(self.parse_condition()?);
        }
        Ok(children)
    }

    /// Parse an expression or a declaration with initializer, as found in
    /// conditions and `for` clauses.
    ///
    /// Stops before `;`, `)` and the `:` of a range-based `for`.
    fn parse_condition(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();

        if !self.looks_like_declaration() {
            let expression = self.parse_expression()?;
            return Ok(self.finish(NodeKind::Condition, start, vec![expression]));
        }

        let mut children = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Punctuation => match token.value.as_str() {
                    ";" | ")" => break,
                    "(" | "[" => self.skip_balanced("in declaration")?,
                    "{" => children.push(self.parse_braced_init_list()?),
                    "," => {
                        self.advance();
                    }
                    _ => return Err(self.unexpected()),
                },
                TokenKind::Operator => match keywords::canonical_operator(&token.value) {
                    ":" => break,
                    "=" => {
                        self.advance();
                        children.push(self.parse_initializer_clause()?);
                    }
                    "<" => self.skip_template_arguments()?,
                    "::" | "*" | "&" | "&&" | "..." => {
                        self.advance();
                    }
                    _ => return Err(self.unexpected()),
                },
                TokenKind::Identifier => {
                    self.advance();
                }
                TokenKind::Keyword if !keywords::is_statement_keyword(&token.value) => {
                    if token.value == "decltype" && self.peek_ahead(1).is_punct("(") {
                        self.advance();
                        self.skip_balanced("after decltype")?;
                    } else {
                        self.advance();
                    }
                }
                _ => return Err(self.unexpected()),
            }
        }

        Ok(self.finish(NodeKind::Condition, start, children))
    }

    /// Whether the tokens ahead read as a declaration.
    ///
    /// A declaration starts with a declaration keyword, or with a (qualified,
    /// possibly templated) type name followed by pointer/reference markers and
    /// then a declarator name or structured binding.
    pub(crate) fn looks_like_declaration(&self) -> bool {
        let first = self.peek();
        match first.kind {
            TokenKind::Keyword => return keywords::is_decl_specifier_keyword(&first.value),
            TokenKind::Identifier => {}
            TokenKind::Operator if first.value == "::" => {}
            _ => return false,
        }

        let mut offset = 0;
        // type name: [::] name (:: name | <args>)*
        if self.peek_ahead(offset).is_op("::") {
            offset += 1;
        }
        loop {
            if self.peek_ahead(offset).kind != TokenKind::Identifier {
                return false;
            }
            offset += 1;
            if self.peek_ahead(offset).is_op("<") {
                if !self.template_arguments_ahead(offset, true) {
                    return false;
                }
                offset = match self.matching_angle(offset) {
                    Some(close) => close + 1,
                    None => return false,
                };
            }
            if self.peek_ahead(offset).is_op("::") {
                offset += 1;
            } else {
                break;
            }
            if offset > DECLARATION_LOOKAHEAD {
                return false;
            }
        }

        // cv-qualifiers, pointers and references
        loop {
            let token = self.peek_ahead(offset);
            let is_marker = match token.kind {
                TokenKind::Operator => {
                    matches!(keywords::canonical_operator(&token.value), "*" | "&" | "&&" | "...")
                }
                TokenKind::Keyword => matches!(token.value.as_str(), "const" | "volatile"),
                _ => false,
            };
            if !is_marker || offset > DECLARATION_LOOKAHEAD {
                break;
            }
            offset += 1;
        }

        let name = self.peek_ahead(offset);
        if name.kind != TokenKind::Identifier {
            // structured binding with a named type is not valid; only `auto [`
            return false;
        }
        let after = self.peek_ahead(offset + 1);
        match after.kind {
            TokenKind::Punctuation => matches!(after.value.as_str(), ";" | "," | "(" | "{" | "[" | ")"),
            TokenKind::Operator => matches!(after.value.as_str(), "=" | ":"),
            _ => false,
        }
    }

    /// Significant offset of the `>` closing the `<` at `open`
    fn matching_angle(&self, open: usize) -> Option<usize> {
        let mut angles = 0usize;
        let mut offset = open;
        while offset <= open + DECLARATION_LOOKAHEAD {
            let token = self.peek_ahead(offset);
            if token.kind == TokenKind::Eof {
                return None;
            }
            if token.kind == TokenKind::Operator {
                match token.value.as_str() {
                    "<" => angles += 1,
                    ">" => angles = angles.saturating_sub(1),
                    ">>" => angles = angles.saturating_sub(2),
                    _ => {}
                }
                if angles == 0 {
                    return Some(offset);
                }
            }
            offset += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{AstNode, NodeKind};
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::{parse, ParserState};

    /// Parses `body` as the body of a function and returns its statements
    fn statements(body: &str) -> Vec<AstNode> {
        let source = format!("void f() {{\n{body}\n}}");
        let stream = tokenize(&source);
        let outcome = parse(&stream.tokens, false);
        assert_eq!(outcome.state, ParserState::Normal, "{body}: {:?}", outcome.diagnostics);
        let function = outcome.ast.children.first().expect("function");
        let block = function.children.last().expect("body");
        block.children.clone()
    }

    fn statement_kinds(body: &str) -> Vec<NodeKind> {
        statements(body).iter().map(|s| s.kind).collect()
    }

    #[test]
    fn test_control_flow() {
        assert_eq!(
            statement_kinds(
                "if (x > 0) return 1; else return 0;\n\
                 while (n--) {}\n\
                 do { n++; } while (n < 10);\n\
                 for (int i = 0, j = 1; i < n; ++i) sum += i;\n\
                 for (;;) break;\n\
                 switch (c) { case 'a': case B::C: break; default: continue; }"
            ),
            vec![
                NodeKind::IfStatement,
                NodeKind::WhileStatement,
                NodeKind::DoStatement,
                NodeKind::ForStatement,
                NodeKind::ForStatement,
                NodeKind::SwitchStatement,
            ]
        );
    }

    #[test]
    fn test_long_else_if_ladder() {
        let mut body = String::from("if (x == 0) a();");
        for i in 1..500 {
            body.push_str(&format!("\nelse if (x == {i}) a();"));
        }
        body.push_str("\nelse b();");

        let stmts = statements(&body);
        assert_eq!(stmts.len(), 1);
        let ladder = &stmts[0];
        assert_eq!(ladder.kind, NodeKind::IfStatement);
        // condition, statement, 499 branches, final else
        assert_eq!(ladder.children.len(), 502);
        assert!(ladder.children[2..501].iter().all(|c| c.kind == NodeKind::IfStatement));
        assert_eq!(ladder.children[2].line(), 3);
        assert_eq!(ladder.children[501].kind, NodeKind::ExpressionStatement);
    }

    #[test]
    fn test_range_for() {
        let stmts = statements(
            "for (const auto& [key, value] : table) use(key);\n\
             for (std::string s : names) {}\n\
             for (auto v = load(); auto& x : v) {}",
        );
        assert!(stmts.iter().all(|s| s.kind == NodeKind::RangeForStatement));
        assert_eq!(stmts[0].children[0].kind, NodeKind::ForRangeDeclaration);
    }

    #[test]
    fn test_if_with_initializer_and_constexpr() {
        let stmts = statements("if (auto it = m.find(k); it != m.end()) {}\nif constexpr (N > 0) {} else {}");
        assert_eq!(stmts[0].children[0].kind, NodeKind::Condition);
        assert_eq!(stmts[0].children[1].kind, NodeKind::Condition);
        assert_eq!(stmts[1].children.len(), 3);
    }

    #[test]
    fn test_declarations_versus_expressions() {
        assert_eq!(
            statement_kinds(
                "int x = 1;\nstd::vector<int> v{1, 2};\nFoo* p = nullptr;\nFoo f(1, 2);\n\
                 x = 2;\nfoo(1);\nstd::cout << x << std::endl;\na < b;\ni++;\n\
                 const char* s = \"x\";\nstd::map<int, int>::iterator it;"
            ),
            vec![
                NodeKind::SimpleDeclaration,
                NodeKind::SimpleDeclaration,
                NodeKind::SimpleDeclaration,
                NodeKind::SimpleDeclaration,
                NodeKind::ExpressionStatement,
                NodeKind::ExpressionStatement,
                NodeKind::ExpressionStatement,
                NodeKind::ExpressionStatement,
                NodeKind::ExpressionStatement,
                NodeKind::SimpleDeclaration,
                NodeKind::SimpleDeclaration,
            ]
        );
    }

    #[test]
    fn test_jumps_labels_and_try() {
        let stmts = statements(
            "goto done;\ntry { risky(); } catch (const std::exception& e) { } catch (...) { throw; }\n\
             done:\n  return;",
        );
        let kinds: Vec<NodeKind> = stmts.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::GotoStatement, NodeKind::TryBlock, NodeKind::LabeledStatement]
        );
        assert_eq!(stmts[0].line(), 2);
        assert_eq!(stmts[1].find_all(NodeKind::Handler).len(), 2);
        assert_eq!(stmts[2].children[0].kind, NodeKind::ReturnStatement);
    }

    #[test]
    fn test_local_class_and_using() {
        assert_eq!(
            statement_kinds("struct Local { int a; };\nusing namespace std;\nstatic_assert(true);"),
            vec![
                NodeKind::SimpleDeclaration,
                NodeKind::UsingDirective,
                NodeKind::StaticAssertDeclaration,
            ]
        );
    }

    #[test]
    fn test_missing_semicolon_reports_statement_line() {
        let stream = tokenize("void f() {\n  int a = 1\n  int b = 2;\n}");
        let outcome = parse(&stream.tokens, false);
        assert_eq!(outcome.state, ParserState::Failed);
        assert_eq!(outcome.diagnostics[0].line, 3);
    }
}
