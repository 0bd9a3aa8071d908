//! Recursive-descent parser for declarations.
//!
//! Method and initializer bodies are skipped as balanced brace groups. Expressions are parsed
//! where declarations carry them (see `expr.rs`). Every parse function makes progress and
//! records a [`ParseError`] instead of failing, so a unit with syntax errors still yields
//! every declaration that could be recognized.

use std::sync::Arc;

use crate::ast::*;
use crate::lexer::{Token, TokenKind};
use crate::{ParseError, Span};

const RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
];

pub(crate) const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

#[derive(Clone, Copy)]
pub(crate) struct Checkpoint {
    pos: usize,
    errors: usize,
}

pub(crate) struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) errors: Vec<ParseError>,
    len: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            errors: Vec::new(),
            len,
        }
    }

    // ----- token helpers -----

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    pub(crate) fn nth_is(&self, n: usize, kind: TokenKind) -> bool {
        self.peek_n(n).is_some_and(|token| token.kind == kind)
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.nth_keyword(0, keyword)
    }

    pub(crate) fn nth_keyword(&self, n: usize, keyword: &str) -> bool {
        self.peek_n(n)
            .is_some_and(|token| token.kind == TokenKind::Ident && token.text == keyword)
    }

    pub(crate) fn at_op(&self, op: &str) -> bool {
        self.peek()
            .is_some_and(|token| token.kind == TokenKind::Op && token.text == op)
    }

    pub(crate) fn at_identifier(&self) -> bool {
        self.peek().is_some_and(|token| {
            token.kind == TokenKind::Ident && !RESERVED.contains(&token.text.as_str())
        })
    }

    pub(crate) fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Start offset of the current token (end of input at EOF).
    pub(crate) fn current_start(&self) -> usize {
        self.peek().map_or(self.len, |token| token.range.start)
    }

    /// End offset of the previously consumed token.
    pub(crate) fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx)) {
            Some(token) => token.range.end,
            None => 0,
        }
    }

    pub(crate) fn current_range(&self) -> Span {
        match self.peek() {
            Some(token) => token.range,
            None => Span::new(self.len, self.len),
        }
    }

    pub(crate) fn error_here(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(ParseError::new(message, range));
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_here(format!("expected {what}"));
            false
        }
    }

    fn expect_ident(&mut self, what: &str) -> Option<Token> {
        if self.at_identifier() {
            self.bump()
        } else {
            self.error_here(format!("expected {what}"));
            None
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            errors: self.errors.len(),
        }
    }

    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.errors.truncate(checkpoint.errors);
    }

    /// Skips a balanced `open ... close` group starting at the current token.
    pub(crate) fn skip_balanced(&mut self) -> Span {
        let start = self.current_start();
        let Some(open) = self.bump() else {
            return Span::new(start, start);
        };
        let close = match open.kind {
            TokenKind::LBrace => TokenKind::RBrace,
            TokenKind::LParen => TokenKind::RParen,
            TokenKind::LBracket => TokenKind::RBracket,
            _ => return open.range,
        };
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            if token.kind == open.kind {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Span::new(start, token.range.end);
                }
            }
        }
        self.errors.push(ParseError::new(
            "unbalanced delimiter",
            Span::new(start, start + 1),
        ));
        Span::new(start, self.len)
    }

    /// Skips to the end of a broken member: past the next `;` or balanced block, or up to
    /// the enclosing `}`.
    fn recover_member(&mut self) {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semi => {
                    self.bump();
                    return;
                }
                TokenKind::LBrace => {
                    self.skip_balanced();
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::LParen | TokenKind::LBracket => {
                    self.skip_balanced();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    // ----- compilation unit -----

    pub(crate) fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let pending_start = self.current_start();
        let mut pending = Some(self.parse_modifiers());

        let package = if self.at_keyword("package") {
            let annotations = pending.take().map(|m| m.annotations).unwrap_or_default();
            let start = pending_start;
            self.bump();
            let name = self.parse_qualified_name().unwrap_or_default();
            self.expect(TokenKind::Semi, "`;`");
            Some(PackageDecl {
                annotations,
                name,
                range: Span::new(start, self.prev_end()),
            })
        } else {
            None
        };

        if pending
            .as_ref()
            .is_some_and(|m| m.keywords.is_empty() && m.annotations.is_empty())
        {
            pending = None;
        }

        let mut imports = Vec::new();
        let mut types = Vec::new();
        loop {
            if self.eat(TokenKind::Semi) {
                continue;
            }
            if self.is_eof() {
                break;
            }
            if self.at_keyword("import") {
                imports.push(self.parse_import());
                continue;
            }

            let (start, modifiers) = match pending.take() {
                Some(modifiers) => (pending_start, modifiers),
                None => (self.current_start(), self.parse_modifiers()),
            };
            if self.at_type_decl_start() {
                types.push(Arc::new(self.parse_type_decl(modifiers, start)));
            } else {
                self.error_here("expected class, interface, enum, or record");
                self.bump();
                while !self.is_eof() && !self.at_type_decl_start() && !self.at(TokenKind::At) {
                    self.bump();
                }
            }
        }

        CompilationUnit {
            package,
            imports,
            types,
            range: Span::new(0, self.len),
        }
    }

    fn parse_import(&mut self) -> ImportDecl {
        let start = self.current_start();
        self.bump();
        let is_static = self.eat_keyword("static");
        let mut parts = Vec::new();
        let mut is_star = false;
        if let Some(first) = self.expect_ident("import path") {
            parts.push(first.text);
            while self.eat(TokenKind::Dot) {
                if self.at_op("*") {
                    self.bump();
                    is_star = true;
                    break;
                }
                match self.expect_ident("identifier") {
                    Some(part) => parts.push(part.text),
                    None => break,
                }
            }
        }
        if !self.expect(TokenKind::Semi, "`;`") {
            while !self.is_eof() && !self.at(TokenKind::Semi) && !self.at_keyword("import") && !self.at_type_decl_start() {
                self.bump();
            }
            self.eat(TokenKind::Semi);
        }
        ImportDecl {
            is_static,
            is_star,
            path: parts.join("."),
            range: Span::new(start, self.prev_end()),
        }
    }

    pub(crate) fn parse_qualified_name(&mut self) -> Option<String> {
        let first = self.expect_ident("name")?;
        let mut name = first.text;
        while self.at(TokenKind::Dot) && self.peek_n(1).is_some_and(|t| t.kind == TokenKind::Ident) {
            self.bump();
            if let Some(part) = self.bump() {
                name.push('.');
                name.push_str(&part.text);
            }
        }
        Some(name)
    }

    // ----- modifiers and annotations -----

    pub(crate) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        loop {
            if self.at(TokenKind::At) && !self.nth_keyword(1, "interface") {
                modifiers.annotations.push(self.parse_annotation());
                continue;
            }
            let Some(token) = self.peek() else { break };
            if token.kind != TokenKind::Ident {
                break;
            }
            if token.text == "non"
                && self.peek_n(1).is_some_and(|t| t.text == "-" && t.range.start == token.range.end)
                && self.nth_keyword(2, "sealed")
            {
                self.pos += 3;
                modifiers.keywords.push(Modifier::NonSealed);
                continue;
            }
            let Some(modifier) = Modifier::from_keyword(&token.text) else {
                break;
            };
            if modifier == Modifier::Sealed && !self.nth_is(1, TokenKind::Ident) {
                break;
            }
            self.bump();
            modifiers.keywords.push(modifier);
        }
        modifiers
    }

    pub(crate) fn parse_annotation(&mut self) -> Annotation {
        let start = self.current_start();
        self.bump();
        let name_start = self.current_start();
        let name = self.parse_qualified_name().unwrap_or_default();
        let name_range = Span::new(name_start, self.prev_end().max(name_start));

        let mut elements = Vec::new();
        if self.eat(TokenKind::LParen) {
            if self.at_identifier() && self.nth_is(1, TokenKind::Eq) {
                loop {
                    let pair_start = self.current_start();
                    let Some(name) = self.expect_ident("element name") else {
                        break;
                    };
                    self.bump();
                    let value = self.parse_element_value();
                    elements.push(ElementValuePair {
                        name: name.text,
                        value,
                        range: Span::new(pair_start, self.prev_end()),
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            } else if !self.at(TokenKind::RParen) {
                let pair_start = self.current_start();
                let value = self.parse_element_value();
                elements.push(ElementValuePair {
                    name: "value".to_string(),
                    value,
                    range: Span::new(pair_start, self.prev_end()),
                });
            }
            if !self.expect(TokenKind::RParen, "`)`") {
                self.skip_to_annotation_end();
            }
        }

        Annotation {
            name,
            name_range,
            elements,
            range: Span::new(start, self.prev_end()),
        }
    }

    fn skip_to_annotation_end(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen if depth == 0 => {
                    self.bump();
                    return;
                }
                TokenKind::RParen => depth -= 1,
                TokenKind::Semi | TokenKind::LBrace | TokenKind::RBrace if depth == 0 => return,
                _ => {}
            }
            self.bump();
        }
    }

    /// Annotation element value: nested annotation, `{...}` array, or conditional expression.
    pub(crate) fn parse_element_value(&mut self) -> Expr {
        match self.peek().map(|t| t.kind) {
            None | Some(TokenKind::RParen | TokenKind::Comma | TokenKind::RBrace | TokenKind::Semi) => {
                let at = self.current_start();
                self.error_here("expected annotation value");
                Expr::Missing(Span::new(at, at))
            }
            Some(TokenKind::At) => Expr::Annotation(Box::new(self.parse_annotation())),
            Some(TokenKind::LBrace) => {
                let start = self.current_start();
                self.bump();
                let mut elements = Vec::new();
                while !self.at(TokenKind::RBrace) && !self.is_eof() {
                    if self.at(TokenKind::Comma) {
                        self.error_here("expected annotation value");
                        self.bump();
                        continue;
                    }
                    elements.push(self.parse_element_value());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "`}`");
                Expr::ArrayInit(ArrayInitExpr {
                    elements,
                    range: Span::new(start, self.prev_end()),
                })
            }
            Some(_) => self.parse_expr_or_opaque(&[
                TokenKind::Comma,
                TokenKind::RParen,
                TokenKind::RBrace,
                TokenKind::Semi,
            ]),
        }
    }

    // ----- type declarations -----

    pub(crate) fn at_type_decl_start(&self) -> bool {
        if self.at(TokenKind::At) {
            return self.nth_keyword(1, "interface");
        }
        if self.at_keyword("class") || self.at_keyword("interface") || self.at_keyword("enum") {
            return true;
        }
        self.at_keyword("record")
            && self.nth_is(1, TokenKind::Ident)
            && (self.nth_is(2, TokenKind::LParen) || self.nth_is(2, TokenKind::Lt))
    }

    fn parse_type_decl(&mut self, modifiers: Modifiers, start: usize) -> TypeDecl {
        let kind = if self.eat(TokenKind::At) {
            self.bump();
            TypeDeclKind::Annotation
        } else {
            let keyword = self.bump().map(|t| t.text).unwrap_or_default();
            match keyword.as_str() {
                "interface" => TypeDeclKind::Interface,
                "enum" => TypeDeclKind::Enum,
                "record" => TypeDeclKind::Record,
                _ => TypeDeclKind::Class,
            }
        };

        let (name, name_range) = match self.expect_ident("type name") {
            Some(token) => (token.text, token.range),
            None => (String::new(), self.current_range()),
        };

        let type_params = if self.at(TokenKind::Lt) {
            self.parse_type_params()
        } else {
            Vec::new()
        };

        let record_components = if kind == TypeDeclKind::Record {
            self.parse_params()
        } else {
            Vec::new()
        };

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        let mut permits = Vec::new();
        loop {
            if self.eat_keyword("extends") {
                extends.extend(self.parse_type_list());
            } else if self.eat_keyword("implements") {
                implements.extend(self.parse_type_list());
            } else if self.eat_keyword("permits") {
                permits.extend(self.parse_type_list());
            } else {
                break;
            }
        }

        let body_start = self.current_start();
        let mut enum_constants = Vec::new();
        let mut members = Vec::new();
        if self.expect(TokenKind::LBrace, "`{`") {
            if kind == TypeDeclKind::Enum {
                enum_constants = self.parse_enum_constants();
            }
            while !self.at(TokenKind::RBrace) && !self.is_eof() {
                let before = self.pos;
                if let Some(member) = self.parse_member(&name, kind) {
                    members.push(member);
                }
                if self.pos == before {
                    self.error_here("unexpected token in type body");
                    self.bump();
                }
            }
            self.expect(TokenKind::RBrace, "`}`");
        }

        TypeDecl {
            kind,
            modifiers,
            name,
            name_range,
            type_params,
            extends,
            implements,
            permits,
            record_components,
            enum_constants,
            members,
            range: Span::new(start, self.prev_end()),
            body_range: Span::new(body_start, self.prev_end().max(body_start)),
        }
    }

    fn parse_type_list(&mut self) -> Vec<TypeRef> {
        let mut out = vec![self.parse_type()];
        while self.eat(TokenKind::Comma) {
            out.push(self.parse_type());
        }
        out
    }

    fn parse_enum_constants(&mut self) -> Vec<EnumConstantDecl> {
        let mut constants = Vec::new();
        loop {
            if self.eat(TokenKind::Semi) || self.at(TokenKind::RBrace) || self.is_eof() {
                break;
            }
            let start = self.current_start();
            let annotations = self.parse_modifiers().annotations;
            let Some(name) = self.expect_ident("enum constant") else {
                self.recover_member();
                break;
            };

            let mut args = Vec::new();
            if self.eat(TokenKind::LParen) {
                while !self.at(TokenKind::RParen) && !self.is_eof() {
                    args.push(self.parse_expr_or_opaque(&[TokenKind::Comma, TokenKind::RParen]));
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "`)`");
            }
            let has_body = self.at(TokenKind::LBrace);
            if has_body {
                self.skip_balanced();
            }
            constants.push(EnumConstantDecl {
                annotations,
                name: name.text,
                name_range: name.range,
                args,
                has_body,
                range: Span::new(start, self.prev_end()),
            });

            if !self.eat(TokenKind::Comma) {
                self.eat(TokenKind::Semi);
                break;
            }
        }
        constants
    }

    fn parse_member(&mut self, type_name: &str, kind: TypeDeclKind) -> Option<MemberDecl> {
        if self.eat(TokenKind::Semi) {
            return None;
        }
        let start = self.current_start();
        if self.at(TokenKind::LBrace) || (self.at_keyword("static") && self.nth_is(1, TokenKind::LBrace)) {
            let is_static = self.eat_keyword("static");
            self.skip_balanced();
            return Some(MemberDecl::Initializer(InitializerDecl {
                is_static,
                range: Span::new(start, self.prev_end()),
            }));
        }

        let modifiers = self.parse_modifiers();
        if self.at_type_decl_start() {
            return Some(MemberDecl::Type(Arc::new(self.parse_type_decl(modifiers, start))));
        }

        let type_params = if self.at(TokenKind::Lt) {
            self.parse_type_params()
        } else {
            Vec::new()
        };

        let at_own_name = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text == type_name);
        if at_own_name && self.nth_is(1, TokenKind::LParen) {
            let name = self.bump()?;
            return Some(MemberDecl::Method(self.parse_method_rest(
                modifiers,
                type_params,
                None,
                true,
                name,
                start,
            )));
        }
        if at_own_name && kind == TypeDeclKind::Record && self.nth_is(1, TokenKind::LBrace) {
            // Compact canonical constructor; the canonical signature comes from the header.
            self.bump();
            self.skip_balanced();
            return None;
        }

        let return_ty = if self.eat_keyword("void") {
            None
        } else {
            let ty = self.parse_type();
            if ty.kind == TypeRefKind::Missing {
                self.recover_member();
                return None;
            }
            Some(ty)
        };

        let Some(name) = self.expect_ident("member name") else {
            self.recover_member();
            return None;
        };

        if self.at(TokenKind::LParen) {
            return Some(MemberDecl::Method(self.parse_method_rest(
                modifiers,
                type_params,
                return_ty,
                false,
                name,
                start,
            )));
        }

        let Some(ty) = return_ty else {
            self.error_here("expected `(`");
            self.recover_member();
            return None;
        };
        Some(MemberDecl::Field(self.parse_field_rest(modifiers, ty, name, start)))
    }

    fn parse_method_rest(
        &mut self,
        modifiers: Modifiers,
        type_params: Vec<TypeParamDecl>,
        return_ty: Option<TypeRef>,
        is_constructor: bool,
        name: Token,
        start: usize,
    ) -> MethodDecl {
        let params = self.parse_params();
        let dims = self.parse_dims();
        let return_ty = return_ty.map(|ty| {
            let range = Span::new(ty.range.start, self.prev_end());
            ty.with_dims(dims, range)
        });

        let mut throws = Vec::new();
        if self.eat_keyword("throws") {
            throws = self.parse_type_list();
        }

        let default_value = if self.eat_keyword("default") {
            Some(self.parse_element_value())
        } else {
            None
        };

        let body_range = if self.at(TokenKind::LBrace) {
            Some(self.skip_balanced())
        } else {
            if !self.expect(TokenKind::Semi, "`;` or method body") {
                self.recover_member();
            }
            None
        };

        MethodDecl {
            modifiers,
            type_params,
            return_ty,
            is_constructor,
            name: name.text,
            name_range: name.range,
            params,
            throws,
            default_value,
            body_range,
            range: Span::new(start, self.prev_end()),
        }
    }

    fn parse_field_rest(&mut self, modifiers: Modifiers, ty: TypeRef, first: Token, start: usize) -> FieldDecl {
        let mut declarators = Vec::new();
        let mut name = Some(first);
        while let Some(token) = name.take() {
            let dims = self.parse_dims();
            let initializer = if self.eat(TokenKind::Eq) {
                Some(self.parse_variable_initializer())
            } else {
                None
            };
            declarators.push(VariableDeclarator {
                name: token.text,
                name_range: token.range,
                dims,
                initializer,
                range: Span::new(token.range.start, self.prev_end()),
            });
            if self.eat(TokenKind::Comma) {
                name = self.expect_ident("field name");
            }
        }
        if !self.expect(TokenKind::Semi, "`;`") {
            self.recover_member();
        }
        FieldDecl {
            modifiers,
            ty,
            declarators,
            range: Span::new(start, self.prev_end()),
        }
    }

    fn parse_variable_initializer(&mut self) -> Expr {
        if !self.at(TokenKind::LBrace) {
            return self.parse_expr_or_opaque(&[TokenKind::Comma, TokenKind::Semi]);
        }
        let start = self.current_start();
        self.bump();
        let mut elements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.is_eof() {
            if self.at(TokenKind::LBrace) {
                elements.push(self.parse_variable_initializer());
            } else {
                elements.push(self.parse_expr_or_opaque(&[TokenKind::Comma, TokenKind::RBrace]));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "`}`");
        Expr::ArrayInit(ArrayInitExpr {
            elements,
            range: Span::new(start, self.prev_end()),
        })
    }

    fn parse_params(&mut self) -> Vec<ParamDecl> {
        let mut params = Vec::new();
        if !self.expect(TokenKind::LParen, "`(`") {
            return params;
        }
        while !self.at(TokenKind::RParen) && !self.is_eof() {
            let start = self.current_start();
            let modifiers = self.parse_modifiers();
            let ty = self.parse_type();
            let mut is_varargs = false;
            while self.at(TokenKind::At) {
                self.parse_annotation();
            }
            if self.eat(TokenKind::Ellipsis) {
                is_varargs = true;
            }

            if self.at_keyword("this") {
                // Receiver parameter.
                self.bump();
            } else if let Some(name) = self.expect_ident("parameter name") {
                let dims = self.parse_dims();
                let ty_range = Span::new(ty.range.start, self.prev_end());
                params.push(ParamDecl {
                    modifiers,
                    ty: ty.with_dims(dims, ty_range),
                    is_varargs,
                    name: name.text,
                    name_range: name.range,
                    range: Span::new(start, self.prev_end()),
                });
            } else {
                while !self.is_eof() && !self.at(TokenKind::Comma) && !self.at(TokenKind::RParen) {
                    if self.at(TokenKind::LBrace) || self.at(TokenKind::Semi) {
                        return params;
                    }
                    self.bump();
                }
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)`");
        params
    }

    fn parse_type_params(&mut self) -> Vec<TypeParamDecl> {
        let mut out = Vec::new();
        self.bump();
        while !self.at(TokenKind::Gt) && !self.is_eof() {
            let start = self.current_start();
            let annotations = self.parse_modifiers().annotations;
            let Some(name) = self.expect_ident("type parameter") else {
                break;
            };
            let mut bounds = Vec::new();
            if self.eat_keyword("extends") {
                bounds.push(self.parse_type());
                while self.at_op("&") {
                    self.bump();
                    bounds.push(self.parse_type());
                }
            }
            out.push(TypeParamDecl {
                annotations,
                name: name.text,
                bounds,
                range: Span::new(start, self.prev_end()),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>`");
        out
    }

    // ----- types -----

    fn parse_dims(&mut self) -> usize {
        let mut dims = 0;
        while self.at(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
            self.pos += 2;
            dims += 1;
        }
        dims
    }

    pub(crate) fn parse_type(&mut self) -> TypeRef {
        let start = self.current_start();
        let mut annotations = Vec::new();
        while self.at(TokenKind::At) && !self.nth_keyword(1, "interface") {
            annotations.push(self.parse_annotation());
        }

        let kind = if self.eat(TokenKind::Question) {
            let bound = if self.eat_keyword("extends") {
                Some(WildcardBound::Extends(Box::new(self.parse_type())))
            } else if self.eat_keyword("super") {
                Some(WildcardBound::Super(Box::new(self.parse_type())))
            } else {
                None
            };
            return TypeRef {
                kind: TypeRefKind::Wildcard(bound),
                annotations,
                range: Span::new(start, self.prev_end()),
            };
        } else if let Some(keyword) = self
            .peek()
            .filter(|t| t.kind == TokenKind::Ident && PRIMITIVES.contains(&t.text.as_str()))
            .map(|t| t.text.clone())
        {
            self.bump();
            TypeRefKind::Primitive(keyword)
        } else if self.at_identifier() {
            let mut segments = Vec::new();
            loop {
                let Some(name) = self.bump() else { break };
                let args = if self.at(TokenKind::Lt) {
                    self.parse_type_args()
                } else {
                    Vec::new()
                };
                segments.push(TypeRefSegment {
                    name: name.text,
                    args,
                });
                if self.at(TokenKind::Dot)
                    && self.nth_is(1, TokenKind::Ident)
                    && !self.nth_keyword(1, "class")
                {
                    self.bump();
                } else {
                    break;
                }
            }
            TypeRefKind::Named(segments)
        } else {
            self.error_here("expected type");
            return TypeRef {
                annotations,
                ..TypeRef::missing(Span::new(start, start))
            };
        };

        let base = TypeRef {
            kind,
            annotations,
            range: Span::new(start, self.prev_end()),
        };
        let dims = self.parse_dims();
        let range = Span::new(start, self.prev_end());
        base.with_dims(dims, range)
    }

    fn parse_type_args(&mut self) -> Vec<TypeRef> {
        self.bump();
        let mut args = Vec::new();
        while !self.at(TokenKind::Gt) && !self.is_eof() {
            let arg = self.parse_type();
            let missing = arg.kind == TypeRefKind::Missing;
            args.push(arg);
            if missing || !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt, "`>`");
        args
    }
}
