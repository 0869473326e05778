//! Error types for user.js parsing and operations
//!
//! This module defines the error types used throughout the userjs library.
//! All public functions return [`Result<T, Error>`] for consistent error handling.

use std::path::PathBuf;

/// Errors that can occur while reading, checking or installing a user.js
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lexer error during tokenization
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },

    /// Parser error during parsing
    #[error("Parser error at line {line}, column {column}: {message}")]
    Parser {
        line: usize,
        column: usize,
        message: String,
    },

    /// The same preference key was declared twice
    #[error("Duplicate preference '{key}' on lines {first_line} and {second_line}")]
    DuplicateKey {
        key: String,
        first_line: usize,
        second_line: usize,
    },

    /// Invalid preference type or value
    #[error("Invalid preference: {0}")]
    InvalidPreference(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile discovery failed
    #[error("Profile error: {0}")]
    Profile(String),

    /// Target of an install is not a profile directory
    #[error("Invalid profile directory: {0}")]
    InvalidProfileDirectory(PathBuf),

    /// Invalid glob pattern in query
    #[error("Invalid glob pattern: {0}")]
    InvalidGlobPattern(String),
}

impl Error {
    /// Source line the error points at, when it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Lexer { line, .. } | Error::Parser { line, .. } => Some(*line),
            Error::DuplicateKey { second_line, .. } => Some(*second_line),
            _ => None,
        }
    }
}

/// Result type alias for convenience
///
/// # Example
///
/// ```rust
/// use userjs::{Result, parse_user_js};
///
/// fn count(content: &str) -> Result<usize> {
///     Ok(parse_user_js(content)?.len())
/// }
/// # assert_eq!(count("user_pref(\"a.b\", 1);").unwrap(), 1);
/// ```
pub type Result<T> = std::result::Result<T, Error>;
