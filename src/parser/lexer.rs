//! Scanner for Mutex Source Text
//!
//! The scanner tokenizes input into a stream of tokens that the parser
//! consumes. It handles:
//! - Punctuators and one/two-char operators
//! - Compound assignment and increment/decrement operators
//! - String literals (", ' single-line; ` multiline)
//! - Line and block comments
//! - Numbers, identifiers and reserved keywords
//!
//! Lexical errors are reported to the diagnostic sink and scanning
//! continues, so one bad character does not hide the errors after it.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticSink};

/// Token types for the Mutex scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Single-char tokens
    LeftParenthesis,
    RightParenthesis,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Minus,
    Plus,
    Star,
    Slash,
    Modulo,

    // One or two char tokens
    Not,
    NotEqual,
    EqualTo,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Assignment,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    ModuloEquals,

    PlusPlus,
    MinusMinus,

    // Literals
    Identifier,
    Str,
    Number,

    // Keywords
    And,
    Or,
    Class,
    Else,
    Function,
    If,
    For,
    Mutable,
    Immutable,
    Return,
    Super,
    This,
    Var,
    While,

    Eof,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftParenthesis => "LEFT_PARENTHESIS",
            Self::RightParenthesis => "RIGHT_PARENTHESIS",
            Self::LeftBrace => "LEFT_BRACE",
            Self::RightBrace => "RIGHT_BRACE",
            Self::LeftBracket => "LEFT_BRACKET",
            Self::RightBracket => "RIGHT_BRACKET",
            Self::Comma => "COMMA",
            Self::Dot => "DOT",
            Self::Colon => "COLON",
            Self::Semicolon => "SEMICOLON",
            Self::Minus => "MINUS",
            Self::Plus => "PLUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::Modulo => "MODULO",
            Self::Not => "NOT",
            Self::NotEqual => "NOT_EQUAL",
            Self::EqualTo => "EQUAL_TO",
            Self::Greater => "GREATER",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::Less => "LESS",
            Self::LessEqual => "LESS_EQUAL",
            Self::Assignment => "ASSIGNMENT",
            Self::PlusEquals => "PLUS_EQUALS",
            Self::MinusEquals => "MINUS_EQUALS",
            Self::StarEquals => "STAR_EQUALS",
            Self::SlashEquals => "SLASH_EQUALS",
            Self::ModuloEquals => "MODULO_EQUALS",
            Self::PlusPlus => "PLUS_PLUS",
            Self::MinusMinus => "MINUS_MINUS",
            Self::Identifier => "IDENTIFIER",
            Self::Str => "STRING",
            Self::Number => "NUMBER",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Class => "CLASS",
            Self::Else => "ELSE",
            Self::Function => "FUNCTION",
            Self::If => "IF",
            Self::For => "FOR",
            Self::Mutable => "MUTABLE",
            Self::Immutable => "IMMUTABLE",
            Self::Return => "RETURN",
            Self::Super => "SUPER",
            Self::This => "THIS",
            Self::Var => "VAR",
            Self::While => "WHILE",
            Self::Eof => "EOF",
        }
    }
}

/// Literal payload carried by NUMBER and STRING tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
}

/// A token produced by the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            literal: None,
            line,
        }
    }

    pub fn with_literal(
        token_type: TokenType,
        lexeme: impl Into<String>,
        literal: Literal,
        line: usize,
    ) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            literal: Some(literal),
            line,
        }
    }
}

lazy_static::lazy_static! {
    /// Reserved words in Mutex. `class`, `super` and `this` are scanned
    /// but not accepted by any parser rule.
    static ref RESERVED_KEYWORDS: HashMap<&'static str, TokenType> = {
        let mut m = HashMap::new();
        m.insert("and", TokenType::And);
        m.insert("or", TokenType::Or);
        m.insert("not", TokenType::Not);
        m.insert("class", TokenType::Class);
        m.insert("else", TokenType::Else);
        m.insert("fn", TokenType::Function);
        m.insert("if", TokenType::If);
        m.insert("for", TokenType::For);
        m.insert("mut", TokenType::Mutable);
        m.insert("imm", TokenType::Immutable);
        m.insert("return", TokenType::Return);
        m.insert("super", TokenType::Super);
        m.insert("this", TokenType::This);
        m.insert("var", TokenType::Var);
        m.insert("while", TokenType::While);
        m
    };
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scanner class
pub struct Scanner {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    first_error: Option<Diagnostic>,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            first_error: None,
        }
    }

    /// Tokenize the entire input.
    ///
    /// Every lexical error is reported to the sink; scanning continues
    /// past recoverable errors so they accumulate. If any error was
    /// reported, the first one is returned and the token stream is
    /// discarded by the caller.
    pub fn scan_tokens(
        mut self,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<Token>, Diagnostic> {
        while !self.is_eof() {
            self.start = self.current;
            self.scan_token(sink);
        }

        self.tokens
            .push(Token::new(TokenType::Eof, "", self.line));

        match self.first_error {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(self.tokens),
        }
    }

    fn scan_token(&mut self, sink: &mut dyn DiagnosticSink) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenType::LeftParenthesis),
            ')' => self.add_token(TokenType::RightParenthesis),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ':' => self.add_token(TokenType::Colon),
            ';' => self.add_token(TokenType::Semicolon),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => {
                if self.match_char('=') {
                    self.add_token(TokenType::MinusEquals);
                } else if self.match_char('-') {
                    self.add_token(TokenType::MinusMinus);
                } else {
                    self.add_token(TokenType::Minus);
                }
            }
            '+' => {
                if self.match_char('=') {
                    self.add_token(TokenType::PlusEquals);
                } else if self.match_char('+') {
                    self.add_token(TokenType::PlusPlus);
                } else {
                    self.add_token(TokenType::Plus);
                }
            }
            '*' => {
                if self.match_char('=') {
                    self.add_token(TokenType::StarEquals);
                } else {
                    self.add_token(TokenType::Star);
                }
            }
            '%' => {
                if self.match_char('=') {
                    self.add_token(TokenType::ModuloEquals);
                } else {
                    self.add_token(TokenType::Modulo);
                }
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualTo
                } else {
                    TokenType::Assignment
                };
                self.add_token(token_type);
            }
            '!' => {
                let token_type = if self.match_char('=') {
                    TokenType::NotEqual
                } else {
                    TokenType::Not
                };
                self.add_token(token_type);
            }
            '/' => self.scan_slash(sink),
            '"' | '\'' => self.scan_string(c, sink),
            '`' => self.scan_raw_string(sink),

            // Whitespace
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            _ => {
                if is_digit(c) {
                    self.scan_number(sink);
                } else if is_identifier_start(c) {
                    self.scan_identifier();
                } else {
                    self.report(sink, self.line, format!("Unexpected token found: {}", c));
                }
            }
        }
    }

    /// `/` starts a line comment, a block comment, `/=`, or plain division.
    fn scan_slash(&mut self, sink: &mut dyn DiagnosticSink) {
        if self.match_char('/') {
            while !self.is_eof() && self.peek() != '\n' {
                self.current += 1;
            }
        } else if self.match_char('*') {
            let opening_line = self.line;
            loop {
                if self.is_eof() {
                    self.report(sink, opening_line, "Unterminated block comment");
                    return;
                }
                if self.peek() == '*' && self.peek_next() == '/' {
                    self.current += 2;
                    return;
                }
                if self.peek() == '\n' {
                    self.line += 1;
                }
                self.current += 1;
            }
        } else if self.match_char('=') {
            self.add_token(TokenType::SlashEquals);
        } else {
            self.add_token(TokenType::Slash);
        }
    }

    /// Single-line string delimited by `"` or `'`. A raw newline before
    /// the closing delimiter is an error.
    fn scan_string(&mut self, delimiter: char, sink: &mut dyn DiagnosticSink) {
        while !self.is_eof() && self.peek() != delimiter {
            if self.peek() == '\n' {
                let value: String = self.source[self.start + 1..self.current].iter().collect();
                self.report(
                    sink,
                    self.line,
                    format!(
                        "Missing closing string ('{}') after string value \"{}\"",
                        delimiter, value
                    ),
                );
                return;
            }
            self.current += 1;
        }

        if self.is_eof() {
            let value: String = self.source[self.start + 1..self.current].iter().collect();
            self.report(
                sink,
                self.line,
                format!(
                    "Missing closing string ('{}') after string value \"{}\"",
                    delimiter, value
                ),
            );
            return;
        }

        self.current += 1; // eat the closing delimiter

        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.tokens.push(Token::with_literal(
            TokenType::Str,
            value.clone(),
            Literal::Str(value),
            self.line,
        ));
    }

    /// Backtick string: raw contents, embedded newlines allowed.
    fn scan_raw_string(&mut self, sink: &mut dyn DiagnosticSink) {
        let opening_line = self.line;

        while !self.is_eof() && self.peek() != '`' {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.current += 1;
        }

        if self.is_eof() {
            let value: String = self.source[self.start + 1..self.current].iter().collect();
            self.report(
                sink,
                opening_line,
                format!("Missing closing string ('`') after string value \"{}\"", value),
            );
            return;
        }

        self.current += 1; // eat the closing backtick

        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.tokens.push(Token::with_literal(
            TokenType::Str,
            value.clone(),
            Literal::Str(value),
            opening_line,
        ));
    }

    fn scan_number(&mut self, sink: &mut dyn DiagnosticSink) {
        while is_digit(self.peek()) {
            self.current += 1;
        }

        if self.peek() == '.' {
            if !is_digit(self.peek_next()) {
                let after = match self.source.get(self.current + 1) {
                    Some(c) => c.to_string(),
                    None => "end of input".to_string(),
                };
                self.report(
                    sink,
                    self.line,
                    format!("Expected number after '.' but got '{}'", after),
                );
                return;
            }

            self.current += 1; // eat the dot
            while is_digit(self.peek()) {
                self.current += 1;
            }
        }

        let value: String = self.source[self.start..self.current].iter().collect();
        match value.parse::<f64>() {
            Ok(number) => self.tokens.push(Token::with_literal(
                TokenType::Number,
                value,
                Literal::Number(number),
                self.line,
            )),
            Err(e) => {
                self.report(
                    sink,
                    self.line,
                    format!("Failed to parse number '{}': {}", value, e),
                );
            }
        }
    }

    fn scan_identifier(&mut self) {
        while is_identifier_part(self.peek()) {
            self.current += 1;
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let token_type = RESERVED_KEYWORDS
            .get(text.as_str())
            .copied()
            .unwrap_or(TokenType::Identifier);

        self.tokens.push(Token::new(token_type, text, self.line));
    }

    fn is_eof(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_eof() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(token_type, lexeme, self.line));
    }

    fn report(&mut self, sink: &mut dyn DiagnosticSink, line: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::scan(line, message);
        if self.first_error.is_none() {
            self.first_error = Some(diagnostic.clone());
        }
        sink.report(diagnostic);
    }
}

// ============================================================================
// Tests
// ============================================================================
