//! Lexer for tokenizing user.js preference files
//!
//! Converts a character stream into tokens for the statement parser. It
//! handles the JavaScript escape sequences Firefox accepts in string
//! literals and tracks line/column numbers for error reporting.

use crate::error::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier (e.g., user_pref, pref, lock_pref, sticky_pref)
    Identifier(String),
    /// String value with escape sequences already processed
    String(String),
    /// Integer literal
    Integer(i64),
    /// Literal with a fraction or exponent
    Float(f64),
    Boolean(bool),
    Null,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Eof,
}

/// Lexer for tokenizing user.js files
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Position where the most recent token started
    token_start: (usize, usize),
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            token_start: (1, 1),
        }
    }

    /// Line and column where the last returned token began
    pub fn token_start(&self) -> (usize, usize) {
        self.token_start
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;
        self.token_start = (self.line, self.column);

        let c = match self.chars.peek() {
            Some(&c) => c,
            None => return Ok(Token::Eof),
        };

        match c {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            '"' => self.lex_string(),
            '-' | '0'..='9' => self.lex_number(),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.lex_identifier()),
            _ => Err(self.error(format!("Unexpected character: '{}'", c))),
        }
    }

    fn error(&self, message: String) -> Error {
        Error::Lexer {
            message,
            line: self.line,
            column: self.column,
        }
    }

    /// Consume one character, keeping line/column in step
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance(&mut self) {
        self.bump();
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            while let Some(&c) = self.chars.peek() {
                if c.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            if self.chars.peek() != Some(&'/') {
                return Ok(());
            }

            let (start_line, start_col) = (self.line, self.column);
            self.advance();
            match self.chars.peek() {
                Some(&'/') => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(&'*') => {
                    self.advance();
                    let mut closed = false;
                    while let Some(c) = self.bump() {
                        if c == '*' && self.chars.peek() == Some(&'/') {
                            self.advance();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(Error::Lexer {
                            message: "Unterminated block comment".to_string(),
                            line: start_line,
                            column: start_col,
                        });
                    }
                }
                _ => {
                    return Err(Error::Lexer {
                        message: "Unexpected character: '/'".to_string(),
                        line: start_line,
                        column: start_col,
                    });
                }
            }
        }
    }

    /// Lex an identifier (e.g., user_pref, pref, true, false, null)
    fn lex_identifier(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            _ => Token::Identifier(ident),
        }
    }

    /// Read exactly `n` hex digits following a `\x` or `\u` escape
    fn read_hex(&mut self, n: usize, kind: char) -> Result<u32> {
        let mut hex = String::with_capacity(n);
        for _ in 0..n {
            match self.chars.peek() {
                Some(&c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }
        if hex.len() != n {
            return Err(self.error(format!("Incomplete hex escape: \\{}{}", kind, hex)));
        }
        u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("Invalid hex escape: \\{}{}", kind, hex)))
    }

    /// Lex a string literal (only double-quoted strings in user.js)
    fn lex_string(&mut self) -> Result<Token> {
        let (start_line, start_col) = (self.line, self.column);
        self.advance();

        let mut result = String::new();

        loop {
            match self.bump() {
                Some('"') => return Ok(Token::String(result)),
                Some('\\') => match self.bump() {
                    Some('"') => result.push('"'),
                    Some('\'') => result.push('\''),
                    Some('\\') => result.push('\\'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    Some('b') => result.push('\x08'),
                    Some('f') => result.push('\x0c'),
                    Some('0') => {
                        if self.chars.peek() == Some(&'0') {
                            return Err(self.error(
                                "Octal escape sequences are not supported. Use \\x00 instead."
                                    .to_string(),
                            ));
                        }
                        result.push('\x00');
                    }
                    Some('x') => {
                        let code = self.read_hex(2, 'x')?;
                        result.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    Some('u') => {
                        let code = self.read_hex(4, 'u')?;
                        result.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    }
                    Some(c) => {
                        return Err(self.error(format!("Invalid escape sequence: \\{}", c)));
                    }
                    None => {
                        return Err(
                            self.error("Unexpected end of input in escape sequence".to_string())
                        );
                    }
                },
                Some(c) => result.push(c),
                None => {
                    return Err(Error::Lexer {
                        message: "Unterminated string literal".to_string(),
                        line: start_line,
                        column: start_col,
                    });
                }
            }
        }
    }

    fn push_digits(&mut self, buf: &mut String) -> bool {
        let mut any = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                buf.push(c);
                self.advance();
                any = true;
            } else {
                break;
            }
        }
        any
    }

    /// Lex a number; integers stay integral, anything with a fraction or
    /// exponent becomes a float
    fn lex_number(&mut self) -> Result<Token> {
        let start_col = self.column;
        let mut num_str = String::new();
        let mut is_float = false;

        if self.chars.peek() == Some(&'-') {
            num_str.push('-');
            self.advance();
        }

        if !self.push_digits(&mut num_str) {
            return Err(self.error(format!("Expected digits after '{}'", num_str)));
        }

        if self.chars.peek() == Some(&'.') {
            is_float = true;
            num_str.push('.');
            self.advance();
            self.push_digits(&mut num_str);
        }

        if let Some(&('e' | 'E')) = self.chars.peek() {
            is_float = true;
            num_str.push('e');
            self.advance();

            if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
                num_str.push(sign);
                self.advance();
            }

            if !self.push_digits(&mut num_str) {
                return Err(
                    self.error("Missing exponent digits in scientific notation".to_string())
                );
            }
        }

        let parsed = if is_float {
            num_str.parse::<f64>().map(Token::Float).ok()
        } else {
            num_str.parse::<i64>().map(Token::Integer).ok()
        };

        parsed.ok_or_else(|| Error::Lexer {
            message: format!("Failed to parse number: {}", num_str),
            line: self.line,
            column: start_col,
        })
    }
}
