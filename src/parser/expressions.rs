//! Expression parsing implementation
//!
//! This module handles parsing of C++ expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, characters, (concatenated) strings, `true`, `nullptr`
//! - Qualified names and template-ids: `std::vector<int>::size_type`
//! - Binary operators: arithmetic, comparison, `<=>`, logical, bitwise, `.*`
//! - Unary operators and casts: `-`, `!`, `~`, `*`, `&`, `++`, `--`, `(T)x`
//! - Postfix: `[]`, `.`, `->`, `()`, `{}`, `++`, `--`, `...`
//! - Conditional, assignment, comma and `throw`
//! - `sizeof`, `alignof`, `typeid`, `decltype`, `noexcept`, named casts
//! - `new`, `delete`, lambdas, braced initializer lists, fold expressions
//!
//! # Template arguments
//!
//! A `<` after a name is read as the start of template arguments only when a
//! matching `>` follows soon, with nothing in between that a template argument
//! list cannot hold, and the token after it can follow a template-id.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::keywords;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{is_operator, ParseError, Parser};

/// Binding strength of a binary operator, higher binds tighter
fn binary_precedence(op: &str) -> Option<u8> {
    let precedence = match op {
        "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" => 6,
        "<" | ">" | "<=" | ">=" => 7,
        "<=>" => 8,
        "<<" | ">>" => 9,
        "+" | "-" => 10,
        "*" | "/" | "%" => 11,
        ".*" | "->*" => 12,
        _ => return None,
    };
    Some(precedence)
}

fn is_assignment_operator(op: &str) -> bool {
    matches!(
        op,
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "&=" | "|=" | "^=" | "<<=" | ">>="
    )
}

/// A right-associative operator still waiting for its right operand
enum Pending {
    Throw { start: usize },
    Yield { start: usize },
    /// `a = b = ...`, every target read so far
    Assignment { start: usize, operands: Vec<AstNode> },
    /// `c1 ? e1 : c2 ? e2 : ...`, every condition and value read so far
    Conditional { start: usize, operands: Vec<AstNode> },
}

impl<'t> Parser<'t> {
    /// Parse expression (top-level entry point), comma operator included
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let first = self.parse_assignment_expression()?;
        if !self.check_punct(",") {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.match_punct(",") {
            operands.push(self.parse_assignment_expression()?);
        }
        Ok(self.finish(NodeKind::BinaryExpression, start, operands))
    }

    /// Parse an initializer: braced list or assignment expression
    pub(crate) fn parse_initializer_clause(&mut self) -> Result<AstNode, ParseError> {
        if self.check_punct("{") {
            self.parse_braced_init_list()
        } else {
            self.parse_assignment_expression()
        }
    }

    /// Parse assignment, conditional, throw or co_yield
    pub(crate) fn parse_assignment_expression(&mut self) -> Result<AstNode, ParseError> {
        self.nested(|parser| parser.parse_right_associative(true))
    }

    /// Parse conditional: condition ? true_expr : false_expr
    ///
    /// Only the false branch may hold an assignment or a throw.
    pub(crate) fn parse_conditional_expression(&mut self) -> Result<AstNode, ParseError> {
        self.nested(|parser| parser.parse_right_associative(false))
    }

    /// Read a chain of right-associative operators in a loop.
    ///
    /// Operators still missing their right operand wait on `pending` and are
    /// closed from the innermost out once the last operand is read. A run of
    /// the same operator (`a = b = c`, `c1 ? e1 : c2 ? e2 : e3`) becomes a
    /// single node, so long chains stay shallow.
    fn parse_right_associative(&mut self, allow_assignment: bool) -> Result<AstNode, ParseError> {
        let mut pending: Vec<Pending> = Vec::new();

        let mut expr = loop {
            self.check_nesting(pending.len())?;
            let start = self.mark();
            let allowed = allow_assignment || !pending.is_empty();

            if allowed && self.match_keyword("throw") {
                if self.at_expression_end() {
                    break self.finish(NodeKind::ThrowExpression, start, Vec::new());
                }
                pending.push(Pending::Throw { start });
                continue;
            }
            if allowed && self.match_keyword("co_yield") {
                if self.check_punct("{") {
                    let list = self.parse_braced_init_list()?;
                    break self.finish(NodeKind::UnaryExpression, start, vec![list]);
                }
                pending.push(Pending::Yield { start });
                continue;
            }

            let operand = self.parse_binary(1)?;

            if self.match_op("?") {
                let value = self.parse_expression()?;
                self.expect_op(":", "Expected ':' in conditional expression")?;
                // the top entry, if conditional, is waiting for this false branch
                match pending.last_mut() {
                    Some(Pending::Conditional { operands, .. }) => operands.extend([operand, value]),
                    _ => pending.push(Pending::Conditional {
                        start,
                        operands: vec![operand, value],
                    }),
                }
                continue;
            }

            let token = self.peek();
            if allowed
                && token.kind == TokenKind::Operator
                && is_assignment_operator(keywords::canonical_operator(&token.value))
            {
                self.advance();
                match pending.last_mut() {
                    Some(Pending::Assignment { operands, .. }) => operands.push(operand),
                    _ => pending.push(Pending::Assignment {
                        start,
                        operands: vec![operand],
                    }),
                }
                if self.check_punct("{") {
                    break self.parse_braced_init_list()?;
                }
                continue;
            }

            break operand;
        };

        while let Some(open) = pending.pop() {
            expr = match open {
                Pending::Throw { start } => self.finish(NodeKind::ThrowExpression, start, vec![expr]),
                Pending::Yield { start } => self.finish(NodeKind::UnaryExpression, start, vec![expr]),
                Pending::Assignment { start, mut operands } => {
                    operands.push(expr);
                    self.finish(NodeKind::AssignmentExpression, start, operands)
                }
                Pending::Conditional { start, mut operands } => {
                    operands.push(expr);
                    self.finish(NodeKind::ConditionalExpression, start, operands)
                }
            };
        }

        Ok(expr)
    }

    /// Precedence climbing over binary operators binding at least `min_precedence`.
    ///
    /// Consecutive operators of one precedence level share a node: `a + b - c`
    /// is one `BinaryExpression` with three operands.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let mut operands = vec![self.parse_cast_expression()?];
        let mut level = None;

        loop {
            let token = self.peek();
            if token.kind != TokenKind::Operator {
                break;
            }
            let Some(precedence) = binary_precedence(keywords::canonical_operator(&token.value))
            else {
                break;
            };
            if precedence < min_precedence {
                break;
            }

            // a looser operator closes the run read so far
            if level.is_some_and(|l| l != precedence) {
                let run = self.finish(NodeKind::BinaryExpression, start, std::mem::take(&mut operands));
                operands.push(run);
            }
            level = Some(precedence);

            self.advance();
            operands.push(self.parse_binary(precedence + 1)?);
        }

        Ok(match level {
            None => operands.remove(0),
            Some(_) => self.finish(NodeKind::BinaryExpression, start, operands),
        })
    }

    /// Operand of a unary operator or a cast, one level deeper
    fn parse_cast_operand(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_cast_expression)
    }

    /// Parse unary operators and casts
    fn parse_cast_expression(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let token = self.peek();

        match token.kind {
            TokenKind::Punctuation if token.value == "(" && self.is_cast_ahead() => {
                self.skip_balanced("after cast type")?;
                let operand = if self.check_punct("{") {
                    self.parse_braced_init_list()?
                } else {
                    self.parse_cast_operand()?
                };
                Ok(self.finish(NodeKind::CastExpression, start, vec![operand]))
            }
            TokenKind::Operator => match keywords::canonical_operator(&token.value) {
                "++" | "--" | "+" | "-" | "!" | "~" | "*" | "&" | "&&" => {
                    self.advance();
                    let operand = self.parse_cast_operand()?;
                    Ok(self.finish(NodeKind::UnaryExpression, start, vec![operand]))
                }
                "::" if self.peek_ahead(1).is_keyword("new") => {
                    self.advance();
                    self.parse_new_expression()
                }
                "::" if self.peek_ahead(1).is_keyword("delete") => {
                    self.advance();
                    self.parse_delete_expression()
                }
                _ => self.parse_postfix_expression(),
            },
            TokenKind::Keyword => match token.value.as_str() {
                "sizeof" => {
                    self.advance();
                    if self.match_op("...") || self.check_punct("(") {
                        self.skip_balanced("after sizeof operand")?;
                        Ok(self.finish(NodeKind::BuiltinExpression, start, Vec::new()))
                    } else {
                        let operand = self.parse_cast_operand()?;
                        Ok(self.finish(NodeKind::UnaryExpression, start, vec![operand]))
                    }
                }
                "alignof" | "typeid" | "noexcept" => {
                    self.advance();
                    if !self.check_punct("(") {
                        return Err(self.error_here(&format!("Expected '(' after '{}'", token.value)));
                    }
                    self.skip_balanced("after operand")?;
                    self.parse_postfix_from(start, NodeKind::BuiltinExpression, Vec::new())
                }
                "new" => self.parse_new_expression(),
                "delete" => self.parse_delete_expression(),
                "co_await" => {
                    self.advance();
                    let operand = self.parse_cast_operand()?;
                    Ok(self.finish(NodeKind::UnaryExpression, start, vec![operand]))
                }
                _ => self.parse_postfix_expression(),
            },
            _ => self.parse_postfix_expression(),
        }
    }

    /// Whether the `(` at the current position starts a C-style cast.
    ///
    /// The parenthesized tokens must read as a type (a type keyword, or names
    /// followed by pointer/reference markers) and an operand must follow.
    fn is_cast_ahead(&self) -> bool {
        let mut offset = 1;
        let mut has_type_keyword = false;
        let mut ends_with_marker = false;

        loop {
            let token = self.peek_ahead(offset);
            match token.kind {
                TokenKind::Keyword if keywords::is_type_keyword(&token.value) => {
                    has_type_keyword = true;
                    ends_with_marker = false;
                }
                TokenKind::Identifier => {
                    ends_with_marker = false;
                }
                TokenKind::Operator if token.value == "::" => {}
                TokenKind::Operator if matches!(token.value.as_str(), "*" | "&" | "&&") => {
                    ends_with_marker = true;
                }
                TokenKind::Operator if token.value == "<" => return false,
                TokenKind::Punctuation if token.value == ")" => break,
                _ => return false,
            }
            offset += 1;
            if offset > 16 {
                return false;
            }
        }
        if offset == 1 {
            return false;
        }

        let next = self.peek_ahead(offset + 1);
        let starts_operand = match next.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Character => true,
            TokenKind::Keyword => matches!(
                next.value.as_str(),
                "this" | "true" | "false" | "nullptr" | "sizeof" | "new" | "static_cast"
                    | "dynamic_cast" | "const_cast" | "reinterpret_cast"
            ),
            TokenKind::Punctuation => next.value == "(" || next.value == "{",
            TokenKind::Operator => {
                (has_type_keyword || ends_with_marker)
                    && matches!(keywords::canonical_operator(&next.value), "!" | "~" | "-" | "+" | "*" | "&" | "++" | "--" | "::")
            }
            _ => false,
        };

        if has_type_keyword || ends_with_marker {
            starts_operand
        } else {
            // `(name) x` is a cast, `(name)(x)` and `(name) - x` are not
            starts_operand && next.kind != TokenKind::Punctuation
        }
    }

    fn parse_new_expression(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'new'

        if self.check_punct("(") {
            // placement arguments or parenthesized type
            self.skip_balanced("after placement arguments")?;
        }

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Identifier | TokenKind::Keyword
                    if !matches!(token.value.as_str(), "new" | "delete" | "this") =>
                {
                    self.advance();
                }
                TokenKind::Operator if matches!(token.value.as_str(), "::" | "*" | "&") => {
                    self.advance();
                }
                TokenKind::Operator if token.value == "<" => self.skip_template_arguments()?,
                _ => break,
            }
        }
        while self.check_punct("[") {
            self.skip_balanced("after array size")?;
        }

        let mut children = Vec::new();
        if self.check_punct("(") {
            children.extend(self.parse_call_arguments()?);
        } else if self.check_punct("{") {
            children.push(self.parse_braced_init_list()?);
        }

        Ok(self.finish(NodeKind::NewExpression, start, children))
    }

    fn parse_delete_expression(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'delete'
        if self.check_punct("[") && self.peek_ahead(1).is_punct("]") {
            self.advance();
            self.advance();
        }

        let operand = self.parse_cast_operand()?;
        Ok(self.finish(NodeKind::DeleteExpression, start, vec![operand]))
    }

    fn parse_postfix_expression(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let primary = self.parse_primary()?;
        self.parse_postfix_operators(start, primary)
    }

    /// Build a node of `kind` and continue with postfix operators on it
    fn parse_postfix_from(
        &mut self,
        start: usize,
        kind: NodeKind,
        children: Vec<AstNode>,
    ) -> Result<AstNode, ParseError> {
        let node = self.finish(kind, start, children);
        self.parse_postfix_operators(start, node)
    }

    /// Parse postfix operators: calls, subscripts, member access, `++`/`--`
    fn parse_postfix_operators(&mut self, start: usize, mut expr: AstNode) -> Result<AstNode, ParseError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Punctuation if token.value == "(" => {
                    let mut children = vec![expr];
                    children.extend(self.parse_call_arguments()?);
                    expr = self.finish(NodeKind::CallExpression, start, children);
                }
                TokenKind::Punctuation if token.value == "[" => {
                    self.advance();
                    let index = self.parse_initializer_or_expression()?;
                    self.expect_punct("]", "Expected ']' after subscript")?;
                    expr = self.finish(NodeKind::SubscriptExpression, start, vec![expr, index]);
                }
                TokenKind::Punctuation
                    if token.value == "{" && matches!(expr.kind, NodeKind::IdExpression | NodeKind::TypeId) =>
                {
                    let list = self.parse_braced_init_list()?;
                    expr = self.finish(NodeKind::CallExpression, start, vec![expr, list]);
                }
                TokenKind::Operator if token.value == "." || token.value == "->" => {
                    self.advance();
                    self.match_keyword("template");
                    if !self.check_kind(TokenKind::Identifier)
                        && !self.check_op("~")
                        && !self.check_keyword("operator")
                    {
                        return Err(self.error_here(&format!("Expected member name after '{}'", token.value)));
                    }
                    let member = self.parse_id_expression()?;
                    expr = self.finish(NodeKind::MemberAccess, start, vec![expr, member]);
                }
                TokenKind::Operator if matches!(token.value.as_str(), "++" | "--" | "...") => {
                    self.advance();
                    expr = self.finish(NodeKind::PostfixExpression, start, vec![expr]);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parse `( arguments )`, returning the arguments
    pub(crate) fn parse_call_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        self.advance(); // '('

        let mut arguments = Vec::new();
        if !self.check_punct(")") {
            loop {
                let start = self.mark();
                let mut argument = self.parse_initializer_clause()?;
                if self.match_op("...") {
                    argument = self.finish(NodeKind::PostfixExpression, start, vec![argument]);
                }
                arguments.push(argument);
                if !self.match_punct(",") {
                    break;
                }
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(arguments)
    }

    fn parse_initializer_or_expression(&mut self) -> Result<AstNode, ParseError> {
        if self.check_punct("{") {
            self.parse_braced_init_list()
        } else {
            self.parse_expression()
        }
    }

    /// Parse primary expressions: literals, names, parentheses, lambdas
    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let token = self.peek();

        match token.kind {
            TokenKind::Number | TokenKind::Character => {
                self.advance();
                Ok(self.finish(NodeKind::Literal, start, Vec::new()))
            }
            TokenKind::String => {
                // adjacent literals concatenate
                while self.check_kind(TokenKind::String) {
                    self.advance();
                }
                Ok(self.finish(NodeKind::Literal, start, Vec::new()))
            }
            TokenKind::Identifier => self.parse_id_expression(),
            TokenKind::Operator if matches!(token.value.as_str(), "::" | "~") => self.parse_id_expression(),
            TokenKind::Operator if token.value == "..." => {
                // fold expression operand: `(args + ...)`
                self.advance();
                Ok(self.finish(NodeKind::IdExpression, start, Vec::new()))
            }
            TokenKind::Keyword => self.parse_keyword_primary(),
            TokenKind::Punctuation => match token.value.as_str() {
                "(" => {
                    self.advance();
                    let inner = self.parse_expression()?;
                    self.expect_rparen("after expression")?;
                    Ok(self.finish(NodeKind::ParenthesizedExpression, start, vec![inner]))
                }
                "[" => self.parse_lambda(),
                "{" => self.parse_braced_init_list(),
                _ => Err(self.error_here("Expected expression")),
            },
            _ => Err(self.error_here("Expected expression")),
        }
    }

    fn parse_keyword_primary(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let token = self.peek();

        match token.value.as_str() {
            "true" | "false" | "nullptr" => {
                self.advance();
                Ok(self.finish(NodeKind::Literal, start, Vec::new()))
            }
            "this" => {
                self.advance();
                Ok(self.finish(NodeKind::IdExpression, start, Vec::new()))
            }
            "operator" => self.parse_id_expression(),
            "static_cast" | "dynamic_cast" | "const_cast" | "reinterpret_cast" => {
                self.advance();
                if !self.check_op("<") {
                    return Err(self.error_here(&format!("Expected '<' after '{}'", token.value)));
                }
                self.skip_template_arguments()?;
                self.expect_lparen("after cast type")?;
                let operand = self.parse_expression()?;
                self.expect_rparen("after cast operand")?;
                Ok(self.finish(NodeKind::CastExpression, start, vec![operand]))
            }
            "decltype" => {
                self.advance();
                if !self.check_punct("(") {
                    return Err(self.error_here("Expected '(' after 'decltype'"));
                }
                self.skip_balanced("after decltype operand")?;
                if self.check_op("::") {
                    self.advance();
                    return self.parse_id_expression();
                }
                Ok(self.finish(NodeKind::TypeId, start, Vec::new()))
            }
            "requires" => {
                self.advance();
                if self.check_punct("(") {
                    self.skip_balanced("after requirement parameters")?;
                }
                if !self.check_punct("{") {
                    return Err(self.error_here("Expected '{' after 'requires'"));
                }
                self.skip_balanced("after requirements")?;
                Ok(self.finish(NodeKind::BuiltinExpression, start, Vec::new()))
            }
            value if keywords::is_type_keyword(value) => {
                // functional cast such as `int(x)` or `unsigned{}`
                while self.peek().kind == TokenKind::Keyword && keywords::is_type_keyword(&self.peek().value) {
                    if self.advance().value == "typename" {
                        let name = self.parse_id_expression()?;
                        return Ok(self.finish(NodeKind::TypeId, start, vec![name]));
                    }
                }
                Ok(self.finish(NodeKind::TypeId, start, Vec::new()))
            }
            _ => Err(self.error_here("Expected expression")),
        }
    }

    /// Parse a possibly qualified name: `::a::b<T>::c`, `~T`, `operator+`
    pub(crate) fn parse_id_expression(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.match_op("::");

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Identifier => {
                    self.advance();
                }
                TokenKind::Keyword if token.value == "template" => {
                    self.advance();
                    continue;
                }
                TokenKind::Keyword if token.value == "operator" => {
                    self.parse_operator_name()?;
                }
                TokenKind::Operator if token.value == "~" => {
                    self.advance();
                    self.expect_identifier()?;
                }
                _ => return Err(self.error_here("Expected identifier")),
            }

            if self.check_op("<") && self.template_arguments_ahead(0, false) {
                self.skip_template_arguments()?;
            }
            if self.check_op("::") {
                self.advance();
            } else {
                break;
            }
        }

        Ok(self.finish(NodeKind::IdExpression, start, Vec::new()))
    }

    /// Parse the name after `operator` in an expression
    fn parse_operator_name(&mut self) -> Result<(), ParseError> {
        self.advance(); // 'operator'
        let token = self.peek();

        match token.kind {
            TokenKind::Punctuation
                if (token.value == "(" && self.peek_ahead(1).is_punct(")"))
                    || (token.value == "[" && self.peek_ahead(1).is_punct("]")) =>
            {
                self.advance();
                self.advance();
                Ok(())
            }
            TokenKind::Punctuation if token.value == "," => {
                self.advance();
                Ok(())
            }
            TokenKind::Operator => {
                self.advance();
                Ok(())
            }
            TokenKind::String => {
                self.advance();
                self.expect_identifier()?;
                Ok(())
            }
            TokenKind::Keyword | TokenKind::Identifier => {
                // new/delete or a conversion type
                self.advance();
                while is_operator(self.peek(), "*") || is_operator(self.peek(), "&") {
                    self.advance();
                }
                Ok(())
            }
            _ => Err(self.error_here("Expected operator after 'operator'")),
        }
    }

    /// Parse `[captures] <tparams> (params) specifiers -> type { body }`
    fn parse_lambda(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.skip_balanced("after lambda captures")?;

        if self.check_op("<") {
            self.skip_template_arguments()?;
        }
        if self.check_punct("(") {
            self.skip_balanced("after lambda parameters")?;
        }

        // specifiers, attributes, noexcept, trailing return type
        while !self.check_punct("{") {
            let token = self.peek();
            match token.kind {
                TokenKind::Punctuation if token.value == "(" || token.value == "[" => {
                    self.skip_balanced("in lambda declarator")?;
                }
                TokenKind::Operator if token.value == "<" => self.skip_template_arguments()?,
                TokenKind::Keyword | TokenKind::Identifier | TokenKind::Operator => {
                    self.advance();
                }
                _ => return Err(self.error_here("Expected '{' before lambda body")),
            }
        }

        let body = self.parse_compound_statement()?;
        Ok(self.finish(NodeKind::LambdaExpression, start, vec![body]))
    }

    /// Parse `{ clause, clause, ... }`, trailing comma and designators allowed
    pub(crate) fn parse_braced_init_list(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_braced_init_list_inner)
    }

    fn parse_braced_init_list_inner(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.expect_lbrace("to open initializer list")?;

        let mut children = Vec::new();
        while !self.check_punct("}") {
            // designated initializer: `.field = value`
            if self.check_op(".") && self.peek_ahead(1).kind == TokenKind::Identifier {
                self.advance();
                self.advance();
                if !self.check_punct("{") {
                    self.expect_op("=", "Expected '=' after designator")?;
                }
            }

            let clause_start = self.mark();
            let mut clause = self.parse_initializer_clause()?;
            if self.match_op("...") {
                clause = self.finish(NodeKind::PostfixExpression, clause_start, vec![clause]);
            }
            children.push(clause);

            if !self.match_punct(",") {
                break;
            }
        }

        self.expect_rbrace("after initializer list")?;
        Ok(self.finish(NodeKind::BracedInitList, start, children))
    }

    /// True when the current token cannot start an operand
    fn at_expression_end(&self) -> bool {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => true,
            TokenKind::Punctuation => matches!(token.value.as_str(), ";" | ")" | "]" | "}" | ","),
            TokenKind::Operator => token.value == ":",
            _ => false,
        }
    }
}
