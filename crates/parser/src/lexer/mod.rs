//! Hand-written lexer for Helio source text.
//!
//! Lexing never fails fatally: unknown characters and unterminated strings
//! are recorded as [`LexError`]s and skipped, and lexing continues until the
//! end of input. The returned token stream always ends with an `Eof` token.

pub mod token;

use crate::error::LexError;
use token::{keyword_or_ident, Token, TokenKind};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    errors: Vec<LexError>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            errors: Vec::new(),
        }
    }

    /// Lexical diagnostics collected while tokenizing.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume the next character if it matches `expected`.
    fn matches(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    // Block comments do not nest.
    fn skip_block_comment(&mut self) {
        while self.current_char().is_some() {
            if self.current_char() == Some('*') && self.peek_char() == Some('/') {
                self.advance();
                self.advance();
                break;
            }
            self.advance();
        }
    }

    fn read_number(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // A '.' is consumed only when a digit follows; a trailing '.' stays a
        // Dot token and numbers never start with one.
        if self.current_char() == Some('.')
            && self.peek_char().map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            lexeme.push('.');
            self.advance();
            while let Some(ch) = self.current_char() {
                if ch.is_ascii_digit() {
                    lexeme.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            return Token::new(TokenKind::FloatLiteral, lexeme, line, column);
        }

        Token::new(TokenKind::IntLiteral, lexeme, line, column)
    }

    /// Read a string literal. The lexeme keeps the surrounding quotes and no
    /// escape processing happens here; newlines are permitted inside.
    fn read_string(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::from('"');
        self.advance();

        loop {
            match self.current_char() {
                Some('"') => {
                    self.advance();
                    lexeme.push('"');
                    return Token::new(TokenKind::StringLiteral, lexeme, line, column);
                }
                Some(ch) => {
                    lexeme.push(ch);
                    self.advance();
                }
                None => {
                    self.errors.push(LexError::new(
                        self.line,
                        self.column,
                        "Unterminated string.",
                    ));
                    return Token::new(TokenKind::Invalid, lexeme, line, column);
                }
            }
        }
    }

    fn read_identifier(&mut self, line: usize, column: usize) -> Token {
        let mut lexeme = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                lexeme.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword_or_ident(&lexeme);
        Token::new(kind, lexeme, line, column)
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            let line = self.line;
            let column = self.column;

            let Some(ch) = self.current_char() else {
                tokens.push(Token::new(TokenKind::Eof, String::new(), line, column));
                break;
            };

            match ch {
                '#' => {
                    self.skip_line_comment();
                }
                '/' if self.peek_char() == Some('*') => {
                    self.advance();
                    self.advance();
                    self.skip_block_comment();
                }
                '0'..='9' => tokens.push(self.read_number(line, column)),
                '"' => tokens.push(self.read_string(line, column)),
                _ if ch.is_ascii_alphabetic() || ch == '_' => {
                    tokens.push(self.read_identifier(line, column));
                }
                _ => {
                    self.advance();
                    let operator = match ch {
                        '(' => Some((TokenKind::LParen, "(")),
                        ')' => Some((TokenKind::RParen, ")")),
                        '{' => Some((TokenKind::LBrace, "{")),
                        '}' => Some((TokenKind::RBrace, "}")),
                        '[' => Some((TokenKind::LBracket, "[")),
                        ']' => Some((TokenKind::RBracket, "]")),
                        ',' => Some((TokenKind::Comma, ",")),
                        ';' => Some((TokenKind::Semicolon, ";")),
                        '.' => Some((TokenKind::Dot, ".")),
                        '+' => Some((TokenKind::Plus, "+")),
                        '-' => Some((TokenKind::Minus, "-")),
                        '*' => Some((TokenKind::Star, "*")),
                        '/' => Some((TokenKind::Slash, "/")),
                        '%' => Some((TokenKind::Percent, "%")),
                        '=' => Some(if self.matches('=') {
                            (TokenKind::EqEq, "==")
                        } else {
                            (TokenKind::Assign, "=")
                        }),
                        '!' => Some(if self.matches('=') {
                            (TokenKind::NotEq, "!=")
                        } else {
                            (TokenKind::Not, "!")
                        }),
                        '<' => Some(if self.matches('=') {
                            (TokenKind::LessEq, "<=")
                        } else {
                            (TokenKind::Less, "<")
                        }),
                        '>' => Some(if self.matches('=') {
                            (TokenKind::GreaterEq, ">=")
                        } else {
                            (TokenKind::Greater, ">")
                        }),
                        _ => {
                            self.errors.push(LexError::new(
                                line,
                                column,
                                format!("Unexpected character '{ch}'."),
                            ));
                            None
                        }
                    };

                    if let Some((kind, lexeme)) = operator {
                        tokens.push(Token::new(kind, lexeme.to_string(), line, column));
                    }
                }
            }
        }

        tokens
    }
}
