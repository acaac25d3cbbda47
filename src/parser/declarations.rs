//! Declaration parsing implementation
//!
//! This module handles parsing of declarations at namespace and class scope:
//!
//! - Namespaces, namespace aliases and `extern "C"` linkage blocks
//! - `using` directives, declarations and aliases
//! - Templates (the parameter list is skipped, the declaration is parsed)
//! - Class, struct, union and enum specifiers with their bodies
//! - Simple declarations and function definitions
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= namespace_def | using_decl | template_decl | linkage_spec
//!                | static_assert | asm_decl | ";" | simple_decl
//! simple_decl  ::= (specifier | declarator_token)* (";" | function_body)
//! function_body ::= ctor_initializer? compound_stmt | "try" ... | "=" ("default" | "delete") ";"
//! ```
//!
//! Declarators are not modelled in detail. A simple declaration is a walk over
//! specifier and declarator tokens that stops at `;`, descends into class and
//! enum bodies, parses initializers as expressions and turns into a function
//! definition when a `{` follows a parameter list.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::keywords;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl<'t> Parser<'t> {
    /// Parse one declaration at namespace scope
    pub(crate) fn parse_declaration(&mut self) -> Result<AstNode, ParseError> {
        self.nested(Self::parse_declaration_inner)
    }

    fn parse_declaration_inner(&mut self) -> Result<AstNode, ParseError> {
        let token = self.peek();

        match (token.kind, token.value.as_str()) {
            (TokenKind::Punctuation, ";") => {
                let start = self.mark();
                self.advance();
                Ok(self.finish(NodeKind::EmptyDeclaration, start, Vec::new()))
            }
            (TokenKind::Keyword, "namespace") => self.parse_namespace(),
            (TokenKind::Keyword, "inline") if self.peek_ahead(1).is_keyword("namespace") => {
                self.parse_namespace()
            }
            (TokenKind::Keyword, "using") => self.parse_using(),
            (TokenKind::Keyword, "template") => self.parse_template_declaration(),
            (TokenKind::Keyword, "export") if self.peek_ahead(1).is_keyword("template") => {
                self.advance();
                self.parse_template_declaration()
            }
            (TokenKind::Keyword, "extern") if self.peek_ahead(1).kind == TokenKind::String => {
                self.parse_linkage_specification()
            }
            (TokenKind::Keyword, "extern") if self.peek_ahead(1).is_keyword("template") => {
                self.advance();
                self.parse_template_declaration()
            }
            (TokenKind::Keyword, "static_assert") => self.parse_static_assert(),
            (TokenKind::Keyword, "asm") => self.parse_asm(),
            _ => self.parse_simple_declaration(),
        }
    }

    /// Parse a class member: access specifier or declaration
    fn parse_member_declaration(&mut self) -> Result<AstNode, ParseError> {
        let token = self.peek();
        let is_access_keyword = matches!(token.value.as_str(), "public" | "protected" | "private")
            && token.kind == TokenKind::Keyword;

        // `public:`, `public slots:` and bare `signals:` style labels
        let label_len = if is_access_keyword && self.peek_ahead(1).is_op(":") {
            Some(2)
        } else if is_access_keyword
            && self.peek_ahead(1).kind == TokenKind::Identifier
            && self.peek_ahead(2).is_op(":")
        {
            Some(3)
        } else if token.kind == TokenKind::Identifier
            && self.peek_ahead(1).is_op(":")
            && self.peek_ahead(2).kind != TokenKind::Number
        {
            Some(2)
        } else {
            None
        };

        match label_len {
            Some(len) => {
                let start = self.mark();
                for _ in 0..len {
                    self.advance();
                }
                Ok(self.finish(NodeKind::AccessSpecifier, start, Vec::new()))
            }
            None => self.parse_declaration(),
        }
    }

    /// Parse namespace definition or alias: `[inline] namespace A::B { ... }`
    fn parse_namespace(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.match_keyword("inline");
        self.advance(); // 'namespace'
        self.skip_attributes()?;

        // name, possibly nested (`A::inline B`); anonymous when absent
        while self.check_kind(TokenKind::Identifier)
            || self.check_op("::")
            || self.check_keyword("inline")
        {
            self.advance();
        }

        if self.match_op("=") {
            self.skip_to_semicolon("after namespace alias")?;
            return Ok(self.finish(NodeKind::NamespaceAlias, start, Vec::new()));
        }

        self.skip_attributes()?;
        self.expect_lbrace("after namespace name")?;
        let mut children = Vec::new();
        self.parse_sequence(&mut children, Some("}"), Self::parse_declaration)?;
        self.expect_rbrace("after namespace body")?;

        Ok(self.finish(NodeKind::NamespaceDefinition, start, children))
    }

    /// Parse `using namespace X;`, `using X = type;` or `using A::b;`
    fn parse_using(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'using'

        let kind = if self.check_keyword("namespace") {
            NodeKind::UsingDirective
        } else if self.check_kind(TokenKind::Identifier)
            && (self.peek_ahead(1).is_op("=") || self.peek_ahead(1).is_punct("["))
        {
            NodeKind::AliasDeclaration
        } else {
            NodeKind::UsingDeclaration
        };

        if kind == NodeKind::AliasDeclaration {
            self.advance(); // alias name
            self.skip_attributes()?;
            self.expect_op("=", "Expected '=' in alias declaration")?;
            if self.check_punct(";") {
                return Err(self.error_here("Expected type after '='"));
            }
        }
        self.skip_to_semicolon(match kind {
            NodeKind::UsingDirective => "after using directive",
            NodeKind::AliasDeclaration => "after alias declaration",
            _ => "after using declaration",
        })?;

        Ok(self.finish(kind, start, Vec::new()))
    }

    /// Parse `template <params> declaration`, explicit instantiations and
    /// specializations included.
    fn parse_template_declaration(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'template'

        if self.check_op("<") {
            self.skip_template_arguments()?;
        }
        if self.check_keyword("requires") {
            self.skip_requires_clause()?;
        }

        let declaration = self.parse_declaration()?;
        Ok(self.finish(NodeKind::TemplateDeclaration, start, vec![declaration]))
    }

    /// Parse `extern "C" { ... }` or `extern "C" declaration`
    fn parse_linkage_specification(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'extern'
        self.advance(); // language string

        let mut children = Vec::new();
        if self.match_punct("{") {
            self.parse_sequence(&mut children, Some("}"), Self::parse_declaration)?;
            self.expect_rbrace("after linkage specification")?;
        } else {
            children.push(self.parse_declaration()?);
        }

        Ok(self.finish(NodeKind::LinkageSpecification, start, children))
    }

    /// Parse `static_assert(condition[, message]);`
    fn parse_static_assert(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'static_assert'
        self.expect_lparen("after 'static_assert'")?;

        let mut children = vec![self.parse_assignment_expression()?];
        if self.match_punct(",") {
            children.push(self.parse_assignment_expression()?);
        }

        self.expect_rparen("after static assertion")?;
        self.expect_semicolon("after static assertion")?;
        Ok(self.finish(NodeKind::StaticAssertDeclaration, start, children))
    }

    /// Parse `asm [volatile] ( ... );`, the assembler text is not inspected
    pub(crate) fn parse_asm(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // 'asm'
        while self.match_keyword("volatile")
            || self.match_keyword("inline")
            || self.match_keyword("goto")
        {}

        if !self.check_punct("(") {
            return Err(self.error_here("Expected '(' after 'asm'"));
        }
        self.skip_balanced("after assembler text")?;
        self.expect_semicolon("after asm declaration")?;
        Ok(self.finish(NodeKind::AsmDeclaration, start, Vec::new()))
    }

    /// Parse a simple declaration or a function definition
    pub(crate) fn parse_simple_declaration(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        let mut children = Vec::new();
        // the current declarator has a parameter (or argument) list
        let mut saw_paren_group = false;

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => return Err(self.error_here("Expected ';' after declaration")),
                TokenKind::Punctuation => match token.value.as_str() {
                    ";" => {
                        self.advance();
                        return Ok(self.finish(NodeKind::SimpleDeclaration, start, children));
                    }
                    "(" => {
                        self.skip_balanced("after parameter list")?;
                        saw_paren_group = true;
                    }
                    "[" => {
                        self.skip_balanced("after array bound")?;
                    }
                    "{" if saw_paren_group => {
                        children.push(self.parse_compound_statement()?);
                        return Ok(self.finish(NodeKind::FunctionDefinition, start, children));
                    }
                    "{" => {
                        children.push(self.parse_braced_init_list()?);
                        self.expect_declarator_end()?;
                    }
                    "," => {
                        self.advance();
                        saw_paren_group = false;
                    }
                    _ => return Err(self.unexpected()),
                },
                TokenKind::Operator => match keywords::canonical_operator(&token.value) {
                    "=" => {
                        self.advance();
                        if saw_paren_group
                            && (self.match_keyword("default") || self.match_keyword("delete"))
                        {
                            self.expect_semicolon("after function declaration")?;
                            return Ok(self.finish(NodeKind::FunctionDefinition, start, children));
                        }
                        children.push(self.parse_initializer_clause()?);
                        self.expect_declarator_end()?;
                    }
                    "<" => self.skip_template_arguments()?,
                    ":" if saw_paren_group => {
                        children.push(self.parse_ctor_initializer()?);
                        if !self.check_punct("{") && !self.check_keyword("try") {
                            return Err(self.error_here("Expected '{' after constructor initializer"));
                        }
                    }
                    ":" => {
                        // bit-field width
                        self.advance();
                        children.push(self.parse_conditional_expression()?);
                        self.expect_declarator_end()?;
                    }
                    "::" | "*" | "&" | "&&" | "..." | "~" | "->" => {
                        self.advance();
                    }
                    _ => return Err(self.unexpected()),
                },
                TokenKind::Keyword => match token.value.as_str() {
                    "class" | "struct" | "union" => {
                        if let Some(class) = self.parse_class_specifier()? {
                            children.push(class);
                        }
                    }
                    "enum" => {
                        if let Some(enumeration) = self.parse_enum_specifier()? {
                            children.push(enumeration);
                        }
                    }
                    "operator" => self.skip_operator_function_id(),
                    "try" if saw_paren_group => {
                        let body = self.parse_try_block()?;
                        children.push(body);
                        return Ok(self.finish(NodeKind::FunctionDefinition, start, children));
                    }
                    "requires" => self.skip_requires_clause()?,
                    "alignas" | "decltype" | "noexcept" | "throw" => {
                        self.advance();
                        if self.check_punct("(") {
                            self.skip_balanced("after specifier")?;
                        }
                    }
                    "namespace" | "using" | "static_assert" | "true" | "false" | "nullptr"
                    | "this" | "new" | "delete" | "sizeof" | "default" => {
                        return Err(self.unexpected());
                    }
                    value if keywords::is_statement_keyword(value) => return Err(self.unexpected()),
                    _ => {
                        self.advance();
                    }
                },
                TokenKind::Identifier => {
                    self.advance();
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// After an initializer only another declarator or the end may follow
    fn expect_declarator_end(&self) -> Result<(), ParseError> {
        if self.check_punct(",") || self.check_punct(";") {
            Ok(())
        } else {
            Err(self.error_here("Expected ';' after declaration"))
        }
    }

    /// Parse `class|struct|union [name] [final] [: bases] [{ members }]`.
    ///
    /// Returns `None` for an elaborated type specifier (no body), whose tokens
    /// are consumed all the same.
    fn parse_class_specifier(&mut self) -> Result<Option<AstNode>, ParseError> {
        let start = self.mark();
        self.advance(); // class key
        self.skip_attributes()?;

        // name, possibly qualified or a specialization
        loop {
            if self.check_kind(TokenKind::Identifier) || self.check_op("::") {
                self.advance();
            } else if self.check_op("<") {
                self.skip_template_arguments()?;
            } else {
                break;
            }
        }
        while self.check_kind(TokenKind::Identifier) {
            // `final` and vendor macros between name and body
            self.advance();
        }

        if self.check_op(":") {
            self.advance();
            self.skip_base_clause()?;
        } else if !self.check_punct("{") {
            return Ok(None);
        }

        self.expect_lbrace("before class body")?;
        let mut children = Vec::new();
        self.parse_sequence(&mut children, Some("}"), Self::parse_member_declaration)?;
        self.expect_rbrace("after class body")?;

        Ok(Some(self.finish(NodeKind::ClassSpecifier, start, children)))
    }

    /// Skip the base-specifier list up to the class body
    fn skip_base_clause(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Punctuation if token.value == "{" => return Ok(()),
                TokenKind::Punctuation if token.value == "(" => self.skip_balanced("in base clause")?,
                TokenKind::Operator if token.value == "<" => self.skip_template_arguments()?,
                TokenKind::Identifier | TokenKind::Keyword | TokenKind::Operator => {
                    self.advance();
                }
                TokenKind::Punctuation if token.value == "," => {
                    self.advance();
                }
                _ => return Err(self.error_here("Expected '{' after base clause")),
            }
        }
    }

    /// Parse `enum [class] [name] [: type] [{ enumerators }]`
    fn parse_enum_specifier(&mut self) -> Result<Option<AstNode>, ParseError> {
        let start = self.mark();
        self.advance(); // 'enum'
        if !self.match_keyword("class") {
            self.match_keyword("struct");
        }
        self.skip_attributes()?;

        while self.check_kind(TokenKind::Identifier) || self.check_op("::") {
            self.advance();
        }

        if self.match_op(":") {
            // underlying type
            while self.check_kind(TokenKind::Identifier)
                || self.check_kind(TokenKind::Keyword)
                || self.check_op("::")
            {
                self.advance();
            }
        }

        if !self.check_punct("{") {
            return Ok(None);
        }
        self.advance();

        let mut children = Vec::new();
        while !self.check_punct("}") {
            children.push(self.parse_enumerator()?);
            if !self.match_punct(",") && !self.check_punct("}") {
                return Err(self.error_here("Expected ',' or '}' after enumerator"));
            }
        }
        self.expect_rbrace("after enumerator list")?;

        Ok(Some(self.finish(NodeKind::EnumSpecifier, start, children)))
    }

    /// Parse `name [attributes] [= value]`
    fn parse_enumerator(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.expect_identifier()?;
        self.skip_attributes()?;

        let mut children = Vec::new();
        if self.match_op("=") {
            children.push(self.parse_conditional_expression()?);
        }
        Ok(self.finish(NodeKind::Enumerator, start, children))
    }

    /// Parse `: member(args), base{args}...` up to the constructor body
    fn parse_ctor_initializer(&mut self) -> Result<AstNode, ParseError> {
        let start = self.mark();
        self.advance(); // ':'

        let mut children = Vec::new();
        loop {
            let member_start = self.mark();
            let member = self.parse_id_expression()?;

            let initializer = if self.check_punct("(") {
                let mut parts = vec![member];
                parts.extend(self.parse_call_arguments()?);
                self.finish(NodeKind::CallExpression, member_start, parts)
            } else if self.check_punct("{") {
                let list = self.parse_braced_init_list()?;
                self.finish(NodeKind::CallExpression, member_start, vec![member, list])
            } else {
                return Err(self.error_here("Expected '(' or '{' after member initializer"));
            };
            children.push(initializer);
            self.match_op("...");

            if !self.match_punct(",") {
                break;
            }
        }

        Ok(self.finish(NodeKind::CtorInitializer, start, children))
    }

    /// Consume the operator name after `operator`
    fn skip_operator_function_id(&mut self) {
        self.advance(); // 'operator'

        let token = self.peek();
        match token.kind {
            TokenKind::Punctuation if token.value == "(" && self.peek_ahead(1).is_punct(")") => {
                self.advance();
                self.advance();
            }
            TokenKind::Punctuation if token.value == "[" && self.peek_ahead(1).is_punct("]") => {
                self.advance();
                self.advance();
            }
            TokenKind::Punctuation if token.value == "," => {
                self.advance();
            }
            TokenKind::Keyword if token.value == "new" || token.value == "delete" => {
                self.advance();
                if self.check_punct("[") && self.peek_ahead(1).is_punct("]") {
                    self.advance();
                    self.advance();
                }
            }
            TokenKind::Operator => {
                self.advance();
            }
            TokenKind::String => {
                // literal operator: operator""_suffix
                self.advance();
                if self.check_kind(TokenKind::Identifier) {
                    self.advance();
                }
            }
            // conversion function: the type follows as ordinary tokens
            _ => {}
        }
    }

    /// Skip `[[...]]` attribute groups
    pub(crate) fn skip_attributes(&mut self) -> Result<(), ParseError> {
        while self.check_punct("[") && self.peek_ahead(1).is_punct("[") {
            self.skip_balanced("after attribute")?;
        }
        Ok(())
    }

    /// Skip a `requires` constraint: names, template-ids and parenthesized
    /// groups joined by `&&` and `||`.
    pub(crate) fn skip_requires_clause(&mut self) -> Result<(), ParseError> {
        self.advance(); // 'requires'

        loop {
            while self.match_op("!") {}

            if self.check_punct("(") {
                self.skip_balanced("after requires clause")?;
            } else if self.check_keyword("true") || self.check_keyword("false") {
                self.advance();
            } else {
                self.match_op("::");
                self.expect_identifier()?;
                loop {
                    if self.check_op("<") {
                        self.skip_template_arguments()?;
                    }
                    if self.check_op("::") && self.peek_ahead(1).kind == TokenKind::Identifier {
                        self.advance();
                        self.advance();
                    } else {
                        break;
                    }
                }
            }

            if !self.match_op("&&") && !self.match_op("||") {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{AstNode, NodeKind};
    use crate::parser::lexer::tokenize;
    use crate::parser::parse::{parse, ParserState};

    fn parse_ok(source: &str) -> AstNode {
        let stream = tokenize(source);
        let outcome = parse(&stream.tokens, false);
        assert_eq!(outcome.state, ParserState::Normal, "{source}: {:?}", outcome.diagnostics);
        outcome.ast
    }

    fn top_kinds(source: &str) -> Vec<NodeKind> {
        parse_ok(source).children.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_parse_struct() {
        let ast = parse_ok("struct Point { int x; int y; };");
        assert_eq!(ast.children.len(), 1);
        let class = &ast.children[0].children[0];
        assert_eq!(class.kind, NodeKind::ClassSpecifier);
        assert_eq!(class.children.len(), 2);
    }

    #[test]
    fn test_class_members() {
        let source = "class Widget : public Base<int>, private Other {\n\
                      public:\n  Widget() : size_(0), name_{\"w\"} {}\n\
                      virtual ~Widget() = default;\n  int size() const override { return size_; }\n\
                      static constexpr int kMax = 10;\n  unsigned flags : 3;\n\
                      protected:\n  Widget& operator=(const Widget&) = delete;\n\
                      bool operator()(int a) const;\n  friend class Helper;\n\
                      private:\n  int size_;\n};";
        let ast = parse_ok(source);
        let class = &ast.children[0].children[0];
        assert_eq!(class.find_all(NodeKind::AccessSpecifier).len(), 3);
        assert_eq!(class.find_all(NodeKind::FunctionDefinition).len(), 4);
        assert_eq!(class.find_all(NodeKind::CtorInitializer).len(), 1);
    }

    #[test]
    fn test_namespaces_and_using() {
        assert_eq!(
            top_kinds(
                "namespace a::b { int x; }\nnamespace { }\ninline namespace v1 {}\n\
                 namespace fs = std::filesystem;\nusing namespace std;\nusing Vec = std::vector<int>;\n\
                 using std::string;"
            ),
            vec![
                NodeKind::NamespaceDefinition,
                NodeKind::NamespaceDefinition,
                NodeKind::NamespaceDefinition,
                NodeKind::NamespaceAlias,
                NodeKind::UsingDirective,
                NodeKind::AliasDeclaration,
                NodeKind::UsingDeclaration,
            ]
        );
    }

    #[test]
    fn test_templates() {
        let ast = parse_ok(
            "template <typename T, int N = 3>\nstruct Array { T data[N]; };\n\
             template <class T> requires std::integral<T> T twice(T v) { return v * 2; }\n\
             template class Array<int>;\nstd::map<std::string, std::vector<int>> table;",
        );
        assert_eq!(ast.find_all(NodeKind::TemplateDeclaration).len(), 3);
        assert_eq!(ast.find_all(NodeKind::FunctionDefinition).len(), 1);
        assert_eq!(ast.children[3].kind, NodeKind::SimpleDeclaration);
    }

    #[test]
    fn test_enums() {
        let ast = parse_ok("enum class Color : unsigned char { Red, Green = 2, Blue, };\nenum Plain { A, B };");
        let enums = ast.find_all(NodeKind::EnumSpecifier);
        assert_eq!(enums.len(), 2);
        assert_eq!(enums[0].children.len(), 3);
        assert_eq!(ast.find_all(NodeKind::Enumerator).len(), 5);
    }

    #[test]
    fn test_linkage_and_misc_declarations() {
        assert_eq!(
            top_kinds(
                "extern \"C\" { int c_func(void); }\nextern \"C\" void other();\n\
                 static_assert(sizeof(int) == 4, \"int size\");\n;\n\
                 int (*fp)(int) = nullptr;\nauto lambda = [](int x) { return x; };"
            ),
            vec![
                NodeKind::LinkageSpecification,
                NodeKind::LinkageSpecification,
                NodeKind::StaticAssertDeclaration,
                NodeKind::EmptyDeclaration,
                NodeKind::SimpleDeclaration,
                NodeKind::SimpleDeclaration,
            ]
        );
    }

    #[test]
    fn test_function_try_block_and_trailing_return() {
        let ast = parse_ok(
            "auto add(int a, int b) -> int { return a + b; }\n\
             void risky() try { work(); } catch (...) { }",
        );
        assert_eq!(ast.find_all(NodeKind::FunctionDefinition).len(), 2);
        assert_eq!(ast.find_all(NodeKind::Handler).len(), 1);
    }

    #[test]
    fn test_statement_at_namespace_scope_is_an_error() {
        let stream = tokenize("return 0;");
        let outcome = parse(&stream.tokens, false);
        assert_eq!(outcome.state, ParserState::Failed);
        assert!(outcome.diagnostics[0].message.contains("Unexpected 'return'"));
    }
}
