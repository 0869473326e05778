//! Parser for user.js preference files
//!
//! A recursive descent parser over the [`Lexer`](crate::lexer::Lexer) token
//! stream. The grammar is one statement per preference:
//!
//! ```text
//! user_pref("preference.name", value);
//! pref("preference.name", value);           // default
//! lock_pref("preference.name", value);      // locked
//! sticky_pref("preference.name", value);    // sticky
//! ```
//!
//! The shipped file only uses `user_pref`; the other functions are accepted
//! so a profile's `prefs.js` or a vendor defaults file parses too.
//!
//! # Example
//!
//! ```rust
//! use userjs::{parse_user_js, PrefType, PrefValue};
//!
//! let content = r#"
//!     // Dark devtools
//!     user_pref("devtools.theme", "dark");
//!     user_pref("browser.sessionstore.interval", 60000);
//! "#;
//!
//! let settings = parse_user_js(content)?;
//! assert_eq!(settings[0].value, PrefValue::String("dark".to_string()));
//! assert_eq!(settings[0].pref_type, PrefType::User);
//! assert_eq!(settings[1].line, 4);
//! # Ok::<(), userjs::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::types::{PrefType, PrefValue, Setting};
use std::path::Path;

/// Parse user.js content into settings, in declaration order
///
/// Duplicate keys are kept; use [`SettingsTable`](crate::SettingsTable) or
/// [`validate_content`](crate::validate_content) to reject them.
pub fn parse_user_js(content: &str) -> Result<Vec<Setting>> {
    let mut parser = Parser::new(content)?;
    parser.parse()
}

/// Read and parse a user.js (or prefs.js) file
pub fn parse_user_js_file(path: &Path) -> Result<Vec<Setting>> {
    tracing::debug!(path = %path.display(), "reading preference file");
    let content = std::fs::read_to_string(path)?;
    parse_user_js(&content)
}

/// Parser for user.js files
struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Current lookahead token
    current: Token,
    /// Where the lookahead token starts
    position: (usize, usize),
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        let position = lexer.token_start();
        Ok(Parser {
            lexer,
            current,
            position,
        })
    }

    fn parse(&mut self) -> Result<Vec<Setting>> {
        let mut settings = Vec::new();
        while self.current != Token::Eof {
            settings.push(self.parse_statement()?);
        }
        Ok(settings)
    }

    /// statement := pref_fn "(" string "," value ")" ";"
    fn parse_statement(&mut self) -> Result<Setting> {
        let line = self.position.0;
        let pref_type = self.parse_pref_function()?;
        self.expect_token(Token::LeftParen)?;
        let key = self.expect_string()?;
        self.expect_token(Token::Comma)?;
        let value = self.parse_value()?;
        self.expect_token(Token::RightParen)?;
        self.expect_token(Token::Semicolon)?;

        Ok(Setting {
            key,
            value,
            pref_type,
            line,
        })
    }

    fn error(&self, message: String) -> Error {
        Error::Parser {
            line: self.position.0,
            column: self.position.1,
            message,
        }
    }

    fn parse_pref_function(&mut self) -> Result<PrefType> {
        match &self.current {
            Token::Identifier(ident) => match PrefType::from_function_name(ident) {
                Some(pref_type) => {
                    self.advance()?;
                    Ok(pref_type)
                }
                None => Err(self.error(format!(
                    "Unknown pref function '{}'. Expected user_pref, pref, lock_pref, or sticky_pref",
                    ident
                ))),
            },
            token => Err(self.error(format!(
                "Expected pref function name (user_pref, pref, lock_pref, sticky_pref), got {:?}",
                token
            ))),
        }
    }

    fn parse_value(&mut self) -> Result<PrefValue> {
        let value = match std::mem::replace(&mut self.current, Token::Eof) {
            Token::String(s) => PrefValue::String(s),
            Token::Integer(n) => PrefValue::Integer(n),
            Token::Float(x) => PrefValue::Float(x),
            Token::Boolean(b) => PrefValue::Bool(b),
            Token::Null => PrefValue::Null,
            token => {
                let message = match &token {
                    Token::Eof => "Unexpected end of input".to_string(),
                    other => format!("Expected value, got {:?}", other),
                };
                self.current = token;
                return Err(self.error(message));
            }
        };
        self.advance()?;
        Ok(value)
    }

    fn expect_token(&mut self, expected: Token) -> Result<()> {
        if self.current == expected {
            self.advance()
        } else if self.current == Token::Eof {
            Err(self.error(format!("Expected {:?}, got end of input", expected)))
        } else {
            Err(self.error(format!("Expected {:?}, got {:?}", expected, self.current)))
        }
    }

    fn expect_string(&mut self) -> Result<String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::String(s) => {
                self.advance()?;
                Ok(s)
            }
            token => {
                let message = format!("Expected string, got {:?}", token);
                self.current = token;
                Err(self.error(message))
            }
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        self.position = self.lexer.token_start();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string() {
        let input = r#"user_pref("browser.contentblocking.category", "strict");"#;
        let result = parse_user_js(input).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].key, "browser.contentblocking.category");
        assert_eq!(result[0].value, PrefValue::String("strict".to_string()));
        assert_eq!(result[0].pref_type, PrefType::User);
    }

    #[test]
    fn test_parse_boolean() {
        let input = r#"user_pref("geo.enabled", false);"#;
        let result = parse_user_js(input).unwrap();
        assert_eq!(result[0].value, PrefValue::Bool(false));
    }

    #[test]
    fn test_parse_negative_integer() {
        let input = r#"user_pref("mousewheel.acceleration.start", -1);"#;
        let result = parse_user_js(input).unwrap();
        assert_eq!(result[0].value, PrefValue::Integer(-1));
    }

    #[test]
    fn test_parse_float_and_null_are_kept() {
        let input = r#"
            user_pref("a.float", 2.5);
            user_pref("a.null", null);
        "#;
        let result = parse_user_js(input).unwrap();
        assert_eq!(result[0].value, PrefValue::Float(2.5));
        assert_eq!(result[1].value, PrefValue::Null);
    }

    #[test]
    fn test_parse_records_lines() {
        let input = "// header\n\nuser_pref(\"a.b\", 1);\n// note\nuser_pref(\"a.c\", 2);\n";
        let result = parse_user_js(input).unwrap();
        assert_eq!(result[0].line, 3);
        assert_eq!(result[1].line, 5);
    }

    #[test]
    fn test_parse_multiline_statement() {
        let input = "user_pref(\n  \"a.b\",\n  true\n);";
        let result = parse_user_js(input).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].line, 1);
    }

    #[test]
    fn test_parse_mixed_pref_types() {
        let input = r#"
            user_pref("a", 1);
            pref("b", 2);
            lock_pref("c", 3);
            sticky_pref("d", 4);
        "#;
        let types: Vec<PrefType> = parse_user_js(input)
            .unwrap()
            .into_iter()
            .map(|s| s.pref_type)
            .collect();
        assert_eq!(
            types,
            vec![
                PrefType::User,
                PrefType::Default,
                PrefType::Locked,
                PrefType::Sticky
            ]
        );
    }

    #[test]
    fn test_parse_keeps_duplicates() {
        let input = r#"user_pref("a.b", 1); user_pref("a.b", 2);"#;
        assert_eq!(parse_user_js(input).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_empty_and_comment_only() {
        assert!(parse_user_js("").unwrap().is_empty());
        assert!(parse_user_js("// nothing here\n/* or here */").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_missing_semicolon() {
        let input = r#"user_pref("a.b", true)"#;
        let err = parse_user_js(input).unwrap_err();
        assert!(matches!(err, Error::Parser { .. }));
        assert!(err.to_string().contains("Semicolon"));
    }

    #[test]
    fn test_malformed_unknown_pref_function() {
        let input = r#"set_pref("a.b", true);"#;
        match parse_user_js(input) {
            Err(Error::Parser { message, line, .. }) => {
                assert!(message.contains("set_pref"));
                assert_eq!(line, 1);
            }
            other => panic!("expected parser error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_error_position() {
        let input = "user_pref(\"a\", 1);\nuser_pref(\"b\" 2);";
        match parse_user_js(input) {
            Err(Error::Parser { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 15);
            }
            other => panic!("expected parser error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_key_not_string() {
        let input = r#"user_pref(geo.enabled, false);"#;
        assert!(parse_user_js(input).is_err());
    }

    #[test]
    fn test_malformed_unclosed_string_is_lexer_error() {
        let input = r#"user_pref("a.b", "open);"#;
        assert!(matches!(parse_user_js(input), Err(Error::Lexer { .. })));
    }
}
