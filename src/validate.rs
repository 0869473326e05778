//! Integrity checks for a preference table
//!
//! A user.js is inert data, so the only things worth checking are that the
//! file is a well-formed sequence of statements, that every key is unique
//! and that every value is a scalar Firefox can store.

use crate::error::Error;
use crate::parser::parse_user_js;
use crate::types::{PrefType, PrefValue, Setting};
use serde::Serialize;
use std::collections::HashMap;

/// What kind of problem an [`Issue`] describes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The file does not parse; nothing after this point was checked
    Malformed { message: String },
    /// Key already declared on `first_line`
    DuplicateKey { first_line: usize },
    /// Float or null literal
    UnsupportedValue { found: &'static str },
    /// Firefox integer prefs are 32-bit
    IntegerOutOfRange { value: i64 },
    /// Empty key, whitespace, or an empty dotted segment
    InvalidKey,
    /// `pref`/`lock_pref`/`sticky_pref` are not honoured in a user.js
    NotUserPref { function: &'static str },
}

/// One integrity problem, tied to a source line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub kind: IssueKind,
}

/// Result of checking a whole file
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    /// Number of statements that parsed
    pub settings: usize,
    pub issues: Vec<Issue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check user.js content: well-formed, unique keys, well-typed values
///
/// # Example
///
/// ```rust
/// use userjs::{validate_content, IssueKind};
///
/// let report = validate_content(r#"
///     user_pref("geo.enabled", false);
///     user_pref("geo.enabled", true);
/// "#);
/// assert!(!report.is_clean());
/// assert_eq!(report.issues[0].kind, IssueKind::DuplicateKey { first_line: 2 });
/// ```
pub fn validate_content(content: &str) -> IntegrityReport {
    match parse_user_js(content) {
        Ok(settings) => validate_settings(&settings),
        Err(e) => {
            let line = e.line().unwrap_or(0);
            let message = match e {
                Error::Lexer { message, .. } | Error::Parser { message, .. } => message,
                other => other.to_string(),
            };
            IntegrityReport {
                settings: 0,
                issues: vec![Issue {
                    line,
                    key: None,
                    kind: IssueKind::Malformed { message },
                }],
            }
        }
    }
}

/// Check already-parsed settings
pub fn validate_settings(settings: &[Setting]) -> IntegrityReport {
    let mut issues = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for setting in settings {
        let issue = |kind| Issue {
            line: setting.line,
            key: Some(setting.key.clone()),
            kind,
        };

        if let Some(&first_line) = seen.get(setting.key.as_str()) {
            issues.push(issue(IssueKind::DuplicateKey { first_line }));
        } else {
            seen.insert(&setting.key, setting.line);
        }

        if !is_valid_key(&setting.key) {
            issues.push(issue(IssueKind::InvalidKey));
        }

        if setting.pref_type != PrefType::User {
            issues.push(issue(IssueKind::NotUserPref {
                function: setting.pref_type.function_name(),
            }));
        }

        match &setting.value {
            PrefValue::Integer(n) if i32::try_from(*n).is_err() => {
                issues.push(issue(IssueKind::IntegerOutOfRange { value: *n }));
            }
            value if !value.is_scalar() => {
                issues.push(issue(IssueKind::UnsupportedValue {
                    found: value.type_name(),
                }));
            }
            _ => {}
        }
    }

    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "integrity check found issues");
    }

    IntegrityReport {
        settings: settings.len(),
        issues,
    }
}

/// A dotted preference name: non-empty segments, no whitespace or quotes
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.split('.').all(|segment| !segment.is_empty())
        && !key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '"')
}
