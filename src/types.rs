//! Core data types shared across the crate

use serde::Serialize;
use std::fmt;

/// A preference value as written in a user.js statement
///
/// Firefox only stores booleans, 32-bit integers and strings. `Float` and
/// `Null` are accepted by the parser so that files containing them can still
/// be loaded and reported on by the integrity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrefValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for the three kinds Firefox can actually store
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            PrefValue::Bool(_) | PrefValue::Integer(_) | PrefValue::String(_)
        )
    }

    /// Short type name used in reports
    pub fn type_name(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "boolean",
            PrefValue::Integer(_) => "integer",
            PrefValue::Float(_) => "float",
            PrefValue::String(_) => "string",
            PrefValue::Null => "null",
        }
    }
}

/// Formats the value as a user.js literal
impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Integer(n) => write!(f, "{}", n),
            PrefValue::Float(x) => write!(f, "{}", x),
            PrefValue::String(s) => write!(f, "\"{}\"", escape_string(s)),
            PrefValue::Null => f.write_str("null"),
        }
    }
}

/// Escape a string for use inside a double-quoted user.js literal
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Which pref function declared the setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefType {
    /// `user_pref(...)`
    User,
    /// `pref(...)`
    Default,
    /// `lock_pref(...)`
    Locked,
    /// `sticky_pref(...)`
    Sticky,
}

impl PrefType {
    pub fn function_name(self) -> &'static str {
        match self {
            PrefType::User => "user_pref",
            PrefType::Default => "pref",
            PrefType::Locked => "lock_pref",
            PrefType::Sticky => "sticky_pref",
        }
    }

    pub(crate) fn from_function_name(name: &str) -> Option<Self> {
        match name {
            "user_pref" => Some(PrefType::User),
            "pref" => Some(PrefType::Default),
            "lock_pref" => Some(PrefType::Locked),
            "sticky_pref" => Some(PrefType::Sticky),
            _ => None,
        }
    }
}

/// A single named configuration override
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setting {
    /// Dotted preference name, e.g. `browser.tabs.warnOnClose`
    pub key: String,
    pub value: PrefValue,
    pub pref_type: PrefType,
    /// 1-based line the statement starts on
    pub line: usize,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: PrefValue) -> Self {
        Setting {
            key: key.into(),
            value,
            pref_type: PrefType::User,
            line: 0,
        }
    }
}

/// Key/value pair for JSON array output
#[derive(Debug, Clone, Serialize)]
pub struct SettingView<'a> {
    pub key: &'a str,
    pub value: &'a PrefValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_literals() {
        assert_eq!(PrefValue::Bool(false).to_string(), "false");
        assert_eq!(PrefValue::Integer(-1).to_string(), "-1");
        assert_eq!(
            PrefValue::String("strict".to_string()).to_string(),
            "\"strict\""
        );
        assert_eq!(PrefValue::Null.to_string(), "null");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string(r#"a"b"#), r#"a\"b"#);
        assert_eq!(escape_string(r"C:\dir"), r"C:\\dir");
        assert_eq!(escape_string("x\ty\n"), r"x\ty\n");
        assert_eq!(escape_string("\x08"), r"\x08");
    }

    #[test]
    fn test_scalar_kinds() {
        assert!(PrefValue::Bool(true).is_scalar());
        assert!(PrefValue::Integer(2).is_scalar());
        assert!(PrefValue::String(String::new()).is_scalar());
        assert!(!PrefValue::Float(1.5).is_scalar());
        assert!(!PrefValue::Null.is_scalar());
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&PrefValue::Integer(60000)).unwrap();
        assert_eq!(json, "60000");
        let json = serde_json::to_string(&PrefValue::String("dark".into())).unwrap();
        assert_eq!(json, "\"dark\"");
    }

    #[test]
    fn test_pref_type_function_names() {
        for t in [
            PrefType::User,
            PrefType::Default,
            PrefType::Locked,
            PrefType::Sticky,
        ] {
            assert_eq!(PrefType::from_function_name(t.function_name()), Some(t));
        }
        assert_eq!(PrefType::from_function_name("set_pref"), None);
    }
}
