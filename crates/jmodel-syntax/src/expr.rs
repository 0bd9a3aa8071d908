//! Expression parsing for initializers, enum arguments and annotation values.
//!
//! The grammar covers what constant folding and annotation conversion care about. Anything
//! else that is still well formed (lambdas, method references, `switch`, assignments) comes
//! back as [`Expr::Opaque`] covering its source range, without a diagnostic.

use crate::ast::*;
use crate::lexer::TokenKind;
use crate::parser::{Parser, PRIMITIVES};
use crate::Span;

impl Parser {
    /// Parses one expression that must end at one of `terminators` (or end of input).
    pub(crate) fn parse_expr_or_opaque(&mut self, terminators: &[TokenKind]) -> Expr {
        let checkpoint = self.checkpoint();
        if let Some(expr) = self.parse_expr() {
            if self.at_terminator(terminators) {
                return expr;
            }
        }
        self.rewind(checkpoint);

        let start = self.current_start();
        let end = self.skip_to_terminator(terminators);
        if end <= start {
            self.error_here("expected expression");
            return Expr::Missing(Span::new(start, start));
        }
        Expr::Opaque(Span::new(start, end))
    }

    fn at_terminator(&self, terminators: &[TokenKind]) -> bool {
        match self.peek() {
            None => true,
            Some(token) => terminators.contains(&token.kind),
        }
    }

    /// Consumes tokens up to the next terminator at nesting depth zero; returns the end offset
    /// of the last consumed token.
    fn skip_to_terminator(&mut self, terminators: &[TokenKind]) -> usize {
        let mut end = self.current_start();
        let mut depth = 0usize;
        let mut angle = 0usize;
        let mut generic_context = false;
        while let Some(token) = self.peek() {
            let kind = token.kind;
            if depth == 0 && angle == 0 && terminators.contains(&kind) {
                break;
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    if angle == 0 {
                        generic_context = false;
                    }
                    depth += 1;
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Ident if token.text == "new" => generic_context = true,
                TokenKind::Dot if self.nth_is(1, TokenKind::Lt) => generic_context = true,
                TokenKind::Lt if generic_context => angle += 1,
                TokenKind::Gt if angle > 0 => angle -= 1,
                _ => {}
            }
            end = token.range.end;
            self.bump();
        }
        end
    }

    /// Conditional expression; `None` when the input is not in the modelled subset.
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        let condition = self.parse_binary(1)?;
        if !self.eat(TokenKind::Question) {
            return Some(condition);
        }
        let then_expr = self.parse_expr()?;
        if !self.eat(TokenKind::Colon) {
            return None;
        }
        let else_expr = self.parse_expr()?;
        let range = Span::new(condition.range().start, else_expr.range().end);
        Some(Expr::Conditional(ConditionalExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            range,
        }))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, prec, width)) = self.peek_binary_op() {
            if prec < min_prec {
                break;
            }
            self.pos += width;
            let rhs = self.parse_binary(prec + 1)?;
            let range = Span::new(lhs.range().start, rhs.range().end);
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                range,
            });
        }
        Some(lhs)
    }

    /// Operator at the cursor with its precedence and token width. `>` tokens are joined
    /// here since the lexer never merges them.
    fn peek_binary_op(&self) -> Option<(BinaryOp, u8, usize)> {
        let token = self.peek()?;
        let adjacent = |n: usize, kind: TokenKind| {
            let prev = self.peek_n(n - 1);
            let next = self.peek_n(n);
            matches!((prev, next), (Some(p), Some(t)) if t.kind == kind && t.range.start == p.range.end)
        };
        match token.kind {
            TokenKind::Lt => Some((BinaryOp::Lt, 7, 1)),
            TokenKind::Gt => {
                if adjacent(1, TokenKind::Gt) {
                    if adjacent(2, TokenKind::Gt) {
                        if adjacent(3, TokenKind::Eq) {
                            return None;
                        }
                        return Some((BinaryOp::UShr, 8, 3));
                    }
                    if adjacent(2, TokenKind::Eq) {
                        return None;
                    }
                    return Some((BinaryOp::Shr, 8, 2));
                }
                if adjacent(1, TokenKind::Eq) {
                    return Some((BinaryOp::Ge, 7, 2));
                }
                Some((BinaryOp::Gt, 7, 1))
            }
            TokenKind::Op => {
                let (op, prec) = match token.text.as_str() {
                    "||" => (BinaryOp::Or, 1),
                    "&&" => (BinaryOp::And, 2),
                    "|" => (BinaryOp::BitOr, 3),
                    "^" => (BinaryOp::BitXor, 4),
                    "&" => (BinaryOp::BitAnd, 5),
                    "==" => (BinaryOp::Eq, 6),
                    "!=" => (BinaryOp::Ne, 6),
                    "<=" => (BinaryOp::Le, 7),
                    "<<" => (BinaryOp::Shl, 8),
                    "+" => (BinaryOp::Add, 9),
                    "-" => (BinaryOp::Sub, 9),
                    "*" => (BinaryOp::Mul, 10),
                    "/" => (BinaryOp::Div, 10),
                    "%" => (BinaryOp::Rem, 10),
                    _ => return None,
                };
                Some((op, prec, 1))
            }
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_start();
        let op = match self.peek() {
            Some(token) if token.kind == TokenKind::Op => match token.text.as_str() {
                "+" => Some(UnaryOp::Plus),
                "-" => Some(UnaryOp::Minus),
                "!" => Some(UnaryOp::Not),
                "~" => Some(UnaryOp::BitNot),
                _ => return None,
            },
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary()?;
            let range = Span::new(start, operand.range().end);
            return Some(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                range,
            }));
        }

        if self.at(TokenKind::LParen) {
            if let Some(cast) = self.try_parse_cast() {
                return Some(cast);
            }
            self.bump();
            let inner = self.parse_expr()?;
            if !self.eat(TokenKind::RParen) {
                return None;
            }
            let paren = Expr::Paren(ParenExpr {
                expr: Box::new(inner),
                range: Span::new(start, self.prev_end()),
            });
            return self.parse_postfix(paren);
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn try_parse_cast(&mut self) -> Option<Expr> {
        let checkpoint = self.checkpoint();
        let start = self.current_start();
        self.bump();
        let primitive = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Ident && PRIMITIVES.contains(&t.text.as_str()));
        if !primitive && !self.at_identifier() {
            self.rewind(checkpoint);
            return None;
        }
        let ty = self.parse_type();
        if ty.kind == TypeRefKind::Missing || !self.eat(TokenKind::RParen) {
            self.rewind(checkpoint);
            return None;
        }
        if !primitive && !self.starts_cast_operand() {
            self.rewind(checkpoint);
            return None;
        }
        let Some(operand) = self.parse_unary() else {
            self.rewind(checkpoint);
            return None;
        };
        let range = Span::new(start, operand.range().end);
        Some(Expr::Cast(CastExpr {
            ty,
            expr: Box::new(operand),
            range,
        }))
    }

    /// A reference-type cast is only recognized when the operand cannot be read as the
    /// right-hand side of a binary `+`/`-`.
    fn starts_cast_operand(&self) -> bool {
        let Some(token) = self.peek() else {
            return false;
        };
        match token.kind {
            TokenKind::IntLiteral
            | TokenKind::LongLiteral
            | TokenKind::FloatLiteral
            | TokenKind::DoubleLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral
            | TokenKind::TextBlock
            | TokenKind::LParen => true,
            TokenKind::Ident => token.text != "instanceof",
            TokenKind::Op => token.text == "!" || token.text == "~",
            _ => false,
        }
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek()?.clone();
        let literal = |kind| {
            Some(Expr::Literal(LiteralExpr {
                kind,
                text: token.text.clone(),
                range: token.range,
            }))
        };
        let expr = match token.kind {
            TokenKind::IntLiteral => literal(LiteralKind::Int),
            TokenKind::LongLiteral => literal(LiteralKind::Long),
            TokenKind::FloatLiteral => literal(LiteralKind::Float),
            TokenKind::DoubleLiteral => literal(LiteralKind::Double),
            TokenKind::CharLiteral => literal(LiteralKind::Char),
            TokenKind::StringLiteral => literal(LiteralKind::String),
            TokenKind::TextBlock => literal(LiteralKind::TextBlock),
            TokenKind::Ident => match token.text.as_str() {
                "true" => literal(LiteralKind::True),
                "false" => literal(LiteralKind::False),
                "null" => literal(LiteralKind::Null),
                "new" => return self.parse_new(),
                "void" => return self.parse_primitive_class_literal(),
                text if PRIMITIVES.contains(&text) => return self.parse_primitive_class_literal(),
                "this" | "super" => Some(Expr::Name(NameExpr {
                    name: token.text.clone(),
                    range: token.range,
                })),
                _ if self.at_identifier() => Some(Expr::Name(NameExpr {
                    name: token.text.clone(),
                    range: token.range,
                })),
                _ => None,
            },
            _ => None,
        };
        if expr.is_some() {
            self.bump();
        }
        expr
    }

    fn parse_primitive_class_literal(&mut self) -> Option<Expr> {
        let start = self.current_start();
        let ty = if self.at_keyword("void") {
            let token = self.bump()?;
            TypeRef {
                kind: TypeRefKind::Void,
                annotations: Vec::new(),
                range: token.range,
            }
        } else {
            self.parse_type()
        };
        if !self.eat(TokenKind::Dot) || !self.eat_keyword("class") {
            return None;
        }
        Some(Expr::ClassLiteral(ClassLiteralExpr {
            ty,
            range: Span::new(start, self.prev_end()),
        }))
    }

    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.current_start();
        self.bump();
        let checkpoint = self.checkpoint();
        let mut ty = self.parse_type();
        if ty.kind == TypeRefKind::Missing {
            self.rewind(checkpoint);
            return None;
        }

        if self.at(TokenKind::LParen) {
            let args = self.parse_args()?;
            if self.at(TokenKind::LBrace) {
                // Anonymous class body.
                return None;
            }
            return Some(Expr::New(NewExpr {
                ty,
                args,
                range: Span::new(start, self.prev_end()),
            }));
        }

        // Array creation: `new int[n][]` or `new String[] {..}`; sizes are not modelled.
        let mut dims = 0;
        while self.at(TokenKind::LBracket) {
            self.skip_balanced();
            dims += 1;
        }
        if dims == 0 && !matches!(ty.kind, TypeRefKind::Array(_)) {
            return None;
        }
        if self.at(TokenKind::LBrace) {
            self.skip_balanced();
        }
        let range = Span::new(start, self.prev_end());
        ty = ty.with_dims(dims, range);
        Some(Expr::New(NewExpr {
            ty,
            args: Vec::new(),
            range,
        }))
    }

    fn parse_args(&mut self) -> Option<Vec<Expr>> {
        self.bump();
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if !self.eat(TokenKind::RParen) {
            return None;
        }
        Some(args)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Option<Expr> {
        loop {
            let start = expr.range().start;
            if self.at(TokenKind::Dot) {
                if self.nth_keyword(1, "class") {
                    let ty = type_ref_from_name(&expr)?;
                    self.pos += 2;
                    expr = Expr::ClassLiteral(ClassLiteralExpr {
                        ty,
                        range: Span::new(start, self.prev_end()),
                    });
                    continue;
                }
                if !self.nth_is(1, TokenKind::Ident) {
                    return None;
                }
                self.bump();
                let name = self.bump()?;
                if self.at(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    expr = Expr::Call(CallExpr {
                        target: Some(Box::new(expr)),
                        name: name.text,
                        args,
                        range: Span::new(start, self.prev_end()),
                    });
                } else {
                    expr = Expr::FieldAccess(FieldAccessExpr {
                        target: Box::new(expr),
                        name: name.text,
                        range: Span::new(start, self.prev_end()),
                    });
                }
                continue;
            }

            if self.at(TokenKind::LParen) {
                let Expr::Name(name) = &expr else {
                    return None;
                };
                let name = name.name.clone();
                let args = self.parse_args()?;
                expr = Expr::Call(CallExpr {
                    target: None,
                    name,
                    args,
                    range: Span::new(start, self.prev_end()),
                });
                continue;
            }

            if self.at(TokenKind::LBracket) {
                // Only `Name[].class` is modelled; element access is not.
                if !self.nth_is(1, TokenKind::RBracket) {
                    return None;
                }
                let base = type_ref_from_name(&expr)?;
                let mut dims = 0;
                while self.at(TokenKind::LBracket) && self.nth_is(1, TokenKind::RBracket) {
                    self.pos += 2;
                    dims += 1;
                }
                let ty = base.with_dims(dims, Span::new(start, self.prev_end()));
                if !self.eat(TokenKind::Dot) || !self.eat_keyword("class") {
                    return None;
                }
                expr = Expr::ClassLiteral(ClassLiteralExpr {
                    ty,
                    range: Span::new(start, self.prev_end()),
                });
                continue;
            }

            return Some(expr);
        }
    }
}

fn type_ref_from_name(expr: &Expr) -> Option<TypeRef> {
    let name = expr.qualified_name()?;
    let segments = name
        .split('.')
        .map(|segment| TypeRefSegment {
            name: segment.to_string(),
            args: Vec::new(),
        })
        .collect();
    Some(TypeRef {
        kind: TypeRefKind::Named(segments),
        annotations: Vec::new(),
        range: expr.range(),
    })
}
