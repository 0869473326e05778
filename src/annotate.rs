//! Authoring structure of a user.js
//!
//! The parser throws comments away. This module walks the raw lines again to
//! recover what the author wrote around the statements:
//!
//! - the header block at the top of the file: a title between `// ====`
//!   rules, optionally followed by free text and a closing rule
//! - section banners, a `// ----` rule, a title comment, another rule
//! - notes, the run of comment lines directly above a block of statements
//! - optional settings, statements that are commented out as alternatives
//!
//! A note applies to every statement after it until a blank line or the next
//! comment. The header block ends at the first blank or code line.

use crate::error::Result;
use crate::parser::parse_user_js;
use crate::types::Setting;
use serde::Serialize;
use std::collections::HashMap;

/// A banner-delimited group of settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    /// Line of the title comment
    pub line: usize,
    /// Active settings, in file order
    pub keys: Vec<String>,
    /// Commented-out settings, in file order
    pub optional: Vec<String>,
}

/// A commented-out statement offered as an alternative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionalSetting {
    #[serde(flatten)]
    pub setting: Setting,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Sections, notes and optional settings recovered from a file
#[derive(Debug, Clone, Default, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Header text after the title, one entry per comment line
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preamble: Vec<String>,
    sections: Vec<Section>,
    optional: Vec<OptionalSetting>,
    #[serde(skip)]
    notes: HashMap<String, String>,
    #[serde(skip)]
    section_of: HashMap<String, usize>,
}

impl Annotations {
    /// Title from the `// ====` header block, if the file has one
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Header lines after the title, without the `// ` prefix
    pub fn preamble(&self) -> &[String] {
        &self.preamble
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn optional(&self) -> &[OptionalSetting] {
        &self.optional
    }

    /// Section of an active setting, or of an optional one if no active
    /// setting has that key
    pub fn section_of(&self, key: &str) -> Option<&str> {
        self.section_of
            .get(key)
            .map(|&i| self.sections[i].title.as_str())
    }

    /// Note above an active setting, falling back to an optional one
    pub fn note_of(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    /// Look up an optional setting by key
    pub fn optional_setting(&self, key: &str) -> Option<&OptionalSetting> {
        self.optional.iter().find(|o| o.setting.key == key)
    }
}

/// Classification of one physical line
enum Line<'a> {
    Blank,
    /// `// ----` (section) or `// ====` (header)
    Rule(char),
    /// A comment whose body is itself a statement
    Commented(Setting),
    /// Any other `//` comment, body trimmed
    Comment(&'a str),
    /// Inside, opening or closing a `/* */` block, with no code after it
    Block,
    Code,
}

fn classify<'a>(raw: &'a str, line_no: usize, in_block: &mut bool) -> Line<'a> {
    let line = raw.trim();

    if *in_block {
        return match line.split_once("*/") {
            Some((_, rest)) => {
                *in_block = false;
                after_block(rest)
            }
            None => Line::Block,
        };
    }
    if line.is_empty() {
        return Line::Blank;
    }
    if let Some(rest) = line.strip_prefix("/*") {
        return match rest.split_once("*/") {
            Some((_, rest)) => after_block(rest),
            None => {
                *in_block = true;
                Line::Block
            }
        };
    }

    let body = match line.strip_prefix("//") {
        Some(body) => body.trim(),
        None => return Line::Code,
    };

    if body.len() >= 3 {
        for rule in ['-', '='] {
            if body.chars().all(|c| c == rule) {
                return Line::Rule(rule);
            }
        }
    }

    if looks_like_statement(body) {
        if let Ok(mut parsed) = parse_user_js(body) {
            if parsed.len() == 1 {
                let mut setting = parsed.remove(0);
                setting.line = line_no;
                return Line::Commented(setting);
            }
        }
    }

    Line::Comment(body)
}

/// What is left of a line once a block comment closes on it
fn after_block<'a>(rest: &str) -> Line<'a> {
    let rest = rest.trim();
    if rest.is_empty() || rest.starts_with("//") {
        Line::Block
    } else {
        Line::Code
    }
}

/// Header comment text with one separating space removed, indentation kept
fn header_text(raw: &str) -> String {
    let body = raw.trim().strip_prefix("//").unwrap_or_default();
    body.strip_prefix(' ').unwrap_or(body).trim_end().to_string()
}

#[derive(Clone, Copy, PartialEq)]
enum Header {
    NotSeen,
    Open,
    Closed,
}

fn looks_like_statement(body: &str) -> bool {
    ["user_pref(", "pref(", "lock_pref(", "sticky_pref("]
        .iter()
        .any(|f| body.starts_with(f))
}

/// Recover sections, notes and optional settings from user.js content
///
/// Fails only if the active statements do not parse.
///
/// # Example
///
/// ```rust
/// use userjs::annotate;
///
/// let content = r#"
/// // ------------------
/// // Downloads
/// // ------------------
/// // Always ask where to save
/// user_pref("browser.download.useDownloadDir", false);
/// "#;
///
/// let notes = annotate(content)?;
/// assert_eq!(notes.section_of("browser.download.useDownloadDir"), Some("Downloads"));
/// assert_eq!(notes.note_of("browser.download.useDownloadDir"), Some("Always ask where to save"));
/// # Ok::<(), userjs::Error>(())
/// ```
pub fn annotate(content: &str) -> Result<Annotations> {
    let settings = parse_user_js(content)?;

    let mut out = Annotations::default();
    // line -> (section index, note) for every code line
    let mut context: HashMap<usize, (Option<usize>, Option<String>)> = HashMap::new();

    let mut in_block = false;
    let mut header = Header::NotSeen;
    let mut banner_open = false;
    let mut banner_title: Option<(String, usize)> = None;
    let mut current_section: Option<usize> = None;
    let mut pending_note: Vec<&str> = Vec::new();
    let mut active_note: Option<String> = None;

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = classify(raw, line_no, &mut in_block);
        let ends_header = matches!(line, Line::Blank | Line::Code | Line::Commented(_));
        if header == Header::Open && ends_header {
            header = Header::Closed;
        }
        match line {
            Line::Block => {}
            Line::Blank => {
                pending_note.clear();
                active_note = None;
            }
            Line::Rule('=') => {
                if header == Header::NotSeen {
                    header = Header::Open;
                }
                pending_note.clear();
                active_note = None;
            }
            Line::Rule(_) => {
                if banner_open {
                    if let Some((title, line)) = banner_title.take() {
                        out.sections.push(Section {
                            title,
                            line,
                            keys: Vec::new(),
                            optional: Vec::new(),
                        });
                        current_section = Some(out.sections.len() - 1);
                    }
                }
                banner_open = !banner_open;
                pending_note.clear();
                active_note = None;
            }
            Line::Comment(body) => {
                if header == Header::Open {
                    if out.title.is_some() {
                        out.preamble.push(header_text(raw));
                    } else if !body.is_empty() {
                        out.title = Some(body.to_string());
                    }
                } else if banner_open {
                    if banner_title.is_none() && !body.is_empty() {
                        banner_title = Some((body.to_string(), line_no));
                    }
                } else {
                    active_note = None;
                    if !body.is_empty() {
                        pending_note.push(body);
                    }
                }
            }
            Line::Commented(setting) => {
                if !pending_note.is_empty() {
                    active_note = Some(pending_note.join(" "));
                    pending_note.clear();
                }
                if let Some(idx) = current_section {
                    out.sections[idx].optional.push(setting.key.clone());
                    out.section_of.entry(setting.key.clone()).or_insert(idx);
                }
                if let Some(note) = &active_note {
                    out.notes
                        .entry(setting.key.clone())
                        .or_insert_with(|| note.clone());
                }
                out.optional.push(OptionalSetting {
                    setting,
                    section: current_section.map(|i| out.sections[i].title.clone()),
                    note: active_note.clone(),
                });
            }
            Line::Code => {
                if !pending_note.is_empty() {
                    active_note = Some(pending_note.join(" "));
                    pending_note.clear();
                }
                context.insert(line_no, (current_section, active_note.clone()));
            }
        }
    }

    for setting in &settings {
        let Some((section, note)) = context.get(&setting.line) else {
            continue;
        };
        if let Some(idx) = *section {
            out.sections[idx].keys.push(setting.key.clone());
            out.section_of.insert(setting.key.clone(), idx);
        }
        if let Some(note) = note {
            out.notes.insert(setting.key.clone(), note.clone());
        }
    }

    tracing::debug!(
        sections = out.sections.len(),
        optional = out.optional.len(),
        "annotated user.js"
    );

    Ok(out)
}
