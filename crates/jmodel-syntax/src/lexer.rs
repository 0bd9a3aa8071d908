use crate::{ParseError, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) range: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    IntLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    TextBlock,
    At,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Ellipsis,
    Question,
    Colon,
    ColonColon,
    Arrow,
    Eq,
    Lt,
    /// Always a single `>`; the parser joins adjacent tokens into shifts and `>=`.
    Gt,
    /// Remaining operators, identified by their text.
    Op,
    Unknown,
}

/// Longest operators first so that greedy matching picks `<<=` over `<<`.
const OPERATORS: &[&str] = &[
    "<<=", "...", "::", "->", "==", "!=", "<=", "&&", "||", "++", "--", "<<", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "+", "-", "*", "/", "%", "!", "~", "&", "|", "^",
];

pub(crate) struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Lexer {
            text,
            pos: 0,
            errors: Vec::new(),
        }
    }

    pub(crate) fn tokenize(mut self) -> (Vec<Token>, Vec<ParseError>) {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        (tokens, self.errors)
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining().chars().nth(n)
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&mut self, message: &str, start: usize) {
        self.errors.push(ParseError::new(message, Span::new(start, self.pos)));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.bump_char();
            }

            let rem = self.remaining();
            if rem.starts_with("//") {
                while let Some(c) = self.bump_char() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            if rem.starts_with("/*") {
                let start = self.pos;
                match rem[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => {
                        self.pos = self.text.len();
                        self.error("unterminated block comment", start);
                    }
                }
                continue;
            }

            break;
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let ch = self.peek_char()?;

        let kind = match ch {
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ';' => self.single(TokenKind::Semi),
            ',' => self.single(TokenKind::Comma),
            '@' => self.single(TokenKind::At),
            '?' => self.single(TokenKind::Question),
            '>' => self.single(TokenKind::Gt),
            '"' => self.lex_string(),
            '\'' => self.lex_char(),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ident_start(c) => {
                self.bump_char();
                while self.peek_char().is_some_and(is_ident_continue) {
                    self.bump_char();
                }
                TokenKind::Ident
            }
            _ => self.lex_operator(),
        };

        Some(Token {
            kind,
            text: self.text[start..self.pos].to_string(),
            range: Span::new(start, self.pos),
        })
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump_char();
        kind
    }

    fn lex_operator(&mut self) -> TokenKind {
        let rem = self.remaining();
        if let Some(op) = OPERATORS.iter().find(|op| rem.starts_with(**op)) {
            self.pos += op.len();
            return match *op {
                "..." => TokenKind::Ellipsis,
                "::" => TokenKind::ColonColon,
                "->" => TokenKind::Arrow,
                _ => TokenKind::Op,
            };
        }
        match self.bump_char() {
            Some('.') => TokenKind::Dot,
            Some(':') => TokenKind::Colon,
            Some('=') => TokenKind::Eq,
            Some('<') => TokenKind::Lt,
            _ => {
                self.error("unexpected character", self.pos - 1);
                TokenKind::Unknown
            }
        }
    }

    fn lex_string(&mut self) -> TokenKind {
        let start = self.pos;
        if self.remaining().starts_with("\"\"\"") {
            self.pos += 3;
            loop {
                let rem = self.remaining();
                if rem.starts_with("\"\"\"") {
                    self.pos += 3;
                    return TokenKind::TextBlock;
                }
                match self.bump_char() {
                    Some('\\') => {
                        self.bump_char();
                    }
                    Some(_) => {}
                    None => {
                        self.error("unterminated text block", start);
                        return TokenKind::TextBlock;
                    }
                }
            }
        }

        self.bump_char();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.bump_char();
                    return TokenKind::StringLiteral;
                }
                Some('\\') => {
                    self.bump_char();
                    self.bump_char();
                }
                Some('\n') | None => {
                    self.error("unterminated string literal", start);
                    return TokenKind::StringLiteral;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }

    fn lex_char(&mut self) -> TokenKind {
        let start = self.pos;
        self.bump_char();
        loop {
            match self.peek_char() {
                Some('\'') => {
                    self.bump_char();
                    return TokenKind::CharLiteral;
                }
                Some('\\') => {
                    self.bump_char();
                    self.bump_char();
                }
                Some('\n') | None => {
                    self.error("unterminated character literal", start);
                    return TokenKind::CharLiteral;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let rem = self.remaining();
        let is_hex = rem.starts_with("0x") || rem.starts_with("0X");
        let is_binary = rem.starts_with("0b") || rem.starts_with("0B");
        if is_hex || is_binary {
            self.pos += 2;
        }

        let digit = |c: char| {
            if is_hex {
                c.is_ascii_hexdigit() || c == '_'
            } else {
                c.is_ascii_digit() || c == '_'
            }
        };

        let mut floating = false;
        while self.peek_char().is_some_and(digit) {
            self.bump_char();
        }
        if !is_binary
            && self.peek_char() == Some('.')
            && self.peek_nth(1).map_or(true, |c| !is_ident_start(c) || digit(c))
        {
            floating = true;
            self.bump_char();
            while self.peek_char().is_some_and(digit) {
                self.bump_char();
            }
        }

        let exponent = if is_hex { ['p', 'P'] } else { ['e', 'E'] };
        if !is_binary && self.peek_char().is_some_and(|c| exponent.contains(&c)) {
            floating = true;
            self.bump_char();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.bump_char();
            }
            while self.peek_char().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.bump_char();
            }
        }

        match self.peek_char() {
            Some('l' | 'L') if !floating => {
                self.bump_char();
                TokenKind::LongLiteral
            }
            Some('f' | 'F') if !is_binary => {
                self.bump_char();
                TokenKind::FloatLiteral
            }
            Some('d' | 'D') if !is_binary => {
                self.bump_char();
                TokenKind::DoubleLiteral
            }
            _ if floating => TokenKind::DoubleLiteral,
            _ => TokenKind::IntLiteral,
        }
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}
