//! Emit settings back in user.js form
//!
//! Output is one `user_pref("<key>", <value>);` statement per line. With
//! [`Annotations`] the header, section banners, notes and commented-out
//! optional settings are written back too, so a shipped file can be
//! regenerated after optional settings are enabled.

use crate::annotate::Annotations;
use crate::error::{Error, Result};
use crate::table::SettingsTable;
use crate::types::{escape_string, PrefType, Setting};

const RULE: &str =
    "// -----------------------------------------------------------------------------";
const HEADER_RULE: &str =
    "// =============================================================================";

/// Render a single statement, always as `user_pref`
pub fn render_setting(setting: &Setting) -> String {
    format!(
        "{}(\"{}\", {});",
        PrefType::User.function_name(),
        escape_string(&setting.key),
        setting.value
    )
}

/// Render a whole table, in declaration order
///
/// Without annotations the output is the bare list of statements. With
/// annotations the header and each section banner are written, each note
/// block gets its comment, and the optional settings of a section follow its
/// last active setting as `// user_pref(...)` lines. Blank-line layout is
/// normalized, and optional settings outside any section are not written.
///
/// # Example
///
/// ```rust
/// use userjs::{render_table, SettingsTable};
///
/// let table = SettingsTable::parse(r#"
///     user_pref("devtools.theme", "dark");
///     user_pref("geo.enabled", false);
/// "#)?;
/// assert_eq!(
///     render_table(&table, None),
///     "user_pref(\"devtools.theme\", \"dark\");\nuser_pref(\"geo.enabled\", false);\n"
/// );
/// # Ok::<(), userjs::Error>(())
/// ```
pub fn render_table(table: &SettingsTable, annotations: Option<&Annotations>) -> String {
    let settings: Vec<&Setting> = table.iter().collect();
    render_settings(&settings, annotations)
}

fn push_comment(out: &mut String, text: &str) {
    if text.is_empty() {
        out.push_str("//\n");
    } else {
        out.push_str(&format!("// {}\n", text));
    }
}

fn push_header(out: &mut String, notes: &Annotations) {
    let Some(title) = notes.title() else {
        return;
    };
    out.push_str(&format!("{}\n// {}\n{}\n", HEADER_RULE, title, HEADER_RULE));
    if !notes.preamble().is_empty() {
        for line in notes.preamble() {
            push_comment(out, line);
        }
        out.push_str(HEADER_RULE);
        out.push('\n');
    }
    out.push('\n');
}

/// Commented-out settings of `section` that are not rendered as active.
/// Returns whether anything was written.
fn push_optional(
    out: &mut String,
    notes: &Annotations,
    section: &str,
    active: &[&Setting],
) -> bool {
    let mut note: Option<&str> = None;
    let mut written = false;
    for optional in notes.optional() {
        if optional.section.as_deref() != Some(section)
            || active.iter().any(|s| s.key == optional.setting.key)
        {
            continue;
        }
        let this_note = optional.note.as_deref();
        if !written || this_note != note {
            out.push('\n');
            if let Some(text) = this_note {
                push_comment(out, text);
            }
            note = this_note;
        }
        out.push_str(&format!("// {}\n", render_setting(&optional.setting)));
        written = true;
    }
    written
}

fn render_settings(settings: &[&Setting], annotations: Option<&Annotations>) -> String {
    let mut out = String::new();

    let Some(notes) = annotations else {
        for setting in settings {
            out.push_str(&render_setting(setting));
            out.push('\n');
        }
        return out;
    };

    push_header(&mut out, notes);

    let mut section: Option<&str> = None;
    let mut note: Option<&str> = None;
    let mut first = true;
    // a note must not run on from commented-out lines
    let mut after_optional = false;

    for (i, setting) in settings.iter().enumerate() {
        let this_section = notes.section_of(&setting.key);
        let this_note = notes.note_of(&setting.key);

        match this_section {
            Some(title) if this_section != section => {
                if !first {
                    out.push('\n');
                }
                out.push_str(&format!("{}\n// {}\n{}\n", RULE, title, RULE));
                section = this_section;
                note = None;
            }
            _ if (this_note != note || after_optional) && !first => {
                out.push('\n');
                note = None;
            }
            _ => {}
        }

        if this_note != note {
            if let Some(text) = this_note {
                push_comment(&mut out, text);
            }
            note = this_note;
        }

        out.push_str(&render_setting(setting));
        out.push('\n');
        first = false;
        after_optional = false;

        let section_ends = settings
            .get(i + 1)
            .map(|next| notes.section_of(&next.key) != this_section)
            .unwrap_or(true);
        if let (true, Some(title)) = (section_ends, this_section) {
            after_optional = push_optional(&mut out, notes, title, settings);
        }
    }

    out
}

/// Render the table with some optional settings switched on
///
/// Each key must name an optional setting in `annotations` and must not
/// already be active. A key given more than once is enabled once. Enabled
/// settings are placed at the end of their section.
pub fn enable_optional(
    table: &SettingsTable,
    annotations: &Annotations,
    keys: &[&str],
) -> Result<String> {
    let mut extra: Vec<&Setting> = Vec::with_capacity(keys.len());
    for key in keys {
        if table.contains(key) {
            return Err(Error::InvalidPreference(format!(
                "'{}' is already active",
                key
            )));
        }
        if extra.iter().any(|s| s.key == *key) {
            continue;
        }
        let optional = annotations.optional_setting(key).ok_or_else(|| {
            Error::InvalidPreference(format!("'{}' is not an optional setting", key))
        })?;
        tracing::info!(key = %key, "enabling optional setting");
        extra.push(&optional.setting);
    }

    // Keep each enabled setting with its section: emit it after the last
    // active setting of that section.
    let mut ordered: Vec<&Setting> = Vec::with_capacity(table.len() + extra.len());
    let settings = table.as_slice();
    for (i, setting) in settings.iter().enumerate() {
        ordered.push(setting);
        let section = annotations.section_of(&setting.key);
        let section_ends = settings
            .get(i + 1)
            .map(|next| annotations.section_of(&next.key) != section)
            .unwrap_or(true);
        if section_ends {
            ordered.extend(
                extra
                    .iter()
                    .copied()
                    .filter(|o| annotations.section_of(&o.key) == section),
            );
        }
    }
    // Optional settings whose section has no active settings
    for &setting in &extra {
        if !ordered.iter().any(|s| s.key == setting.key) {
            ordered.push(setting);
        }
    }

    Ok(render_settings(&ordered, Some(annotations)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::parser::parse_user_js;
    use crate::types::PrefValue;

    const SAMPLE: &str = r#"// ---------------------
// Privacy
// ---------------------
// Disable WebRTC leak
user_pref("media.peerconnection.enabled", false);
// Or keep it and hide local addresses:
// user_pref("media.peerconnection.ice.no_host", true);

// ---------------------
// Developer Tools
// ---------------------
user_pref("devtools.theme", "dark");
"#;

    #[test]
    fn test_render_setting_kinds() {
        assert_eq!(
            render_setting(&Setting::new("geo.enabled", PrefValue::Bool(false))),
            r#"user_pref("geo.enabled", false);"#
        );
        assert_eq!(
            render_setting(&Setting::new("mousewheel.acceleration.start", PrefValue::Integer(-1))),
            r#"user_pref("mousewheel.acceleration.start", -1);"#
        );
        assert_eq!(
            render_setting(&Setting::new("a.s", PrefValue::String("say \"hi\"".into()))),
            r#"user_pref("a.s", "say \"hi\"");"#
        );
    }

    #[test]
    fn test_render_then_parse_keeps_settings() {
        let table = SettingsTable::parse(SAMPLE).unwrap();
        let notes = annotate(SAMPLE).unwrap();
        for rendered in [render_table(&table, None), render_table(&table, Some(&notes))] {
            let reparsed = parse_user_js(&rendered).unwrap();
            let pairs: Vec<_> = reparsed.iter().map(|s| (&s.key, &s.value)).collect();
            let expected: Vec<_> = table.iter().map(|s| (&s.key, &s.value)).collect();
            assert_eq!(pairs, expected);
        }
    }

    #[test]
    fn test_render_annotated_keeps_structure() {
        let table = SettingsTable::parse(SAMPLE).unwrap();
        let notes = annotate(SAMPLE).unwrap();
        let rendered = render_table(&table, Some(&notes));
        let again = annotate(&rendered).unwrap();
        assert_eq!(
            again.section_of("devtools.theme"),
            Some("Developer Tools")
        );
        assert_eq!(
            again.note_of("media.peerconnection.enabled"),
            Some("Disable WebRTC leak")
        );
    }

    #[test]
    fn test_enable_optional_places_in_section() {
        let table = SettingsTable::parse(SAMPLE).unwrap();
        let notes = annotate(SAMPLE).unwrap();
        let rendered =
            enable_optional(&table, &notes, &["media.peerconnection.ice.no_host"]).unwrap();
        let reparsed = SettingsTable::parse(&rendered).unwrap();
        assert_eq!(reparsed.len(), 3);
        assert_eq!(
            reparsed.keys().collect::<Vec<_>>(),
            vec![
                "media.peerconnection.enabled",
                "media.peerconnection.ice.no_host",
                "devtools.theme"
            ]
        );
    }

    #[test]
    fn test_render_annotated_writes_optional_back() {
        let table = SettingsTable::parse(SAMPLE).unwrap();
        let notes = annotate(SAMPLE).unwrap();
        let rendered = render_table(&table, Some(&notes));
        assert!(rendered.contains(
            "// Or keep it and hide local addresses:\n// user_pref(\"media.peerconnection.ice.no_host\", true);\n"
        ));
        let again = annotate(&rendered).unwrap();
        let opt = again
            .optional_setting("media.peerconnection.ice.no_host")
            .unwrap();
        assert_eq!(opt.section.as_deref(), Some("Privacy"));
        assert_eq!(opt.note.as_deref(), Some("Or keep it and hide local addresses:"));
        // the note stays with the commented-out line
        assert_eq!(again.note_of("devtools.theme"), None);
    }

    #[test]
    fn test_render_annotated_keeps_header_text() {
        let content = "// ====\n// Title\n// ====\n//\n// Install:\n//    copy it\n// ====\n\nuser_pref(\"a.b\", 1);\n";
        let table = SettingsTable::parse(content).unwrap();
        let notes = annotate(content).unwrap();
        let rendered = render_table(&table, Some(&notes));
        assert!(rendered.contains("// Title\n"));
        assert!(rendered.contains("//\n// Install:\n//    copy it\n"));
        let again = annotate(&rendered).unwrap();
        assert_eq!(again.title(), Some("Title"));
        assert_eq!(again.preamble(), notes.preamble());
    }

    #[test]
    fn test_enable_optional_same_key_twice() {
        let table = SettingsTable::parse(SAMPLE).unwrap();
        let notes = annotate(SAMPLE).unwrap();
        let key = "media.peerconnection.ice.no_host";
        let rendered = enable_optional(&table, &notes, &[key, key]).unwrap();
        assert_eq!(rendered.matches("user_pref(\"media.peerconnection.ice.no_host\"").count(), 1);
        assert_eq!(SettingsTable::parse(&rendered).unwrap().len(), 3);
    }

    #[test]
    fn test_enable_optional_rejects_unknown_and_active() {
        let table = SettingsTable::parse(SAMPLE).unwrap();
        let notes = annotate(SAMPLE).unwrap();
        assert!(enable_optional(&table, &notes, &["no.such.pref"]).is_err());
        assert!(enable_optional(&table, &notes, &["devtools.theme"]).is_err());
    }
}
