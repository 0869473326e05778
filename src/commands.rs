use crate::cli::{OutputType, ProfileArgs, SourceArgs};
use anyhow::Context;
use serde_json::{Map, Value};
use std::borrow::Cow;
use userjs::{
    annotate, compute_drift, enable_optional, find_profile_path, install_user_js, list_profiles,
    parse_user_js_file, prefs_js_path, query_settings, render_table, validate_content,
    InstallOptions, SettingView, SettingsTable, SHIPPED_USER_JS,
};

/// Raw text of the table to work on: `--file` or the shipped user.js
fn load_source(source: &SourceArgs) -> anyhow::Result<Cow<'static, str>> {
    match &source.file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading user.js");
            let content = std::fs::read_to_string(path).with_context(|| {
                format!(
                    "Failed to read {}. Make sure the file exists and is readable.",
                    path.display()
                )
            })?;
            Ok(Cow::Owned(content))
        }
        None => Ok(Cow::Borrowed(SHIPPED_USER_JS)),
    }
}

fn load_table(content: &str) -> anyhow::Result<SettingsTable> {
    SettingsTable::parse(content).map_err(|e| {
        anyhow::anyhow!("Failed to load user.js: {e}. Run 'userjs check' for details.")
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print settings, optionally filtered, as JSON
pub fn show(
    source: &SourceArgs,
    query: &[String],
    get: Option<&str>,
    output_type: OutputType,
) -> anyhow::Result<()> {
    let content = load_source(source)?;
    let table = load_table(&content)?;

    // --get prints the bare value, no JSON wrapping for strings
    if let Some(key) = get {
        let value = table
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("Preference '{}' not found", key))?;
        match value.as_str() {
            Some(s) => println!("{}", s),
            None => println!("{}", value),
        }
        return Ok(());
    }

    let selected: Vec<_> = if query.is_empty() {
        table.iter().collect()
    } else {
        let patterns: Vec<&str> = query.iter().map(String::as_str).collect();
        query_settings(&table, &patterns).context("Failed to apply query")?
    };

    match output_type {
        OutputType::JsonObject => {
            let object: Map<String, Value> = selected
                .iter()
                .map(|s| -> serde_json::Result<(String, Value)> {
                    Ok((s.key.clone(), serde_json::to_value(&s.value)?))
                })
                .collect::<serde_json::Result<_>>()?;
            print_json(&object)
        }
        OutputType::JsonArray => {
            let notes = annotate(&content)?;
            let views: Vec<SettingView<'_>> = selected
                .iter()
                .map(|s| SettingView {
                    key: &s.key,
                    value: &s.value,
                    section: notes.section_of(&s.key),
                    note: notes.note_of(&s.key),
                })
                .collect();
            print_json(&views)
        }
    }
}

/// Print the integrity report; `Ok(false)` when issues were found
pub fn check(source: &SourceArgs) -> anyhow::Result<bool> {
    let content = load_source(source)?;
    let report = validate_content(&content);
    print_json(&report)?;
    if report.is_clean() {
        tracing::info!(settings = report.settings, "user.js is clean");
    }
    Ok(report.is_clean())
}

pub fn sections(source: &SourceArgs) -> anyhow::Result<()> {
    let content = load_source(source)?;
    let notes = annotate(&content)?;
    print_json(&notes)
}

pub fn render(source: &SourceArgs, annotated: bool, enable: &[String]) -> anyhow::Result<()> {
    let content = load_source(source)?;
    let table = load_table(&content)?;

    let output = if !enable.is_empty() {
        let notes = annotate(&content)?;
        let keys: Vec<&str> = enable.iter().map(String::as_str).collect();
        enable_optional(&table, &notes, &keys)?
    } else if annotated {
        render_table(&table, Some(&annotate(&content)?))
    } else {
        render_table(&table, None)
    };

    print!("{}", output);
    Ok(())
}

pub fn profiles(args: &ProfileArgs) -> anyhow::Result<()> {
    let profiles = list_profiles(args.profiles_dir.as_deref()).map_err(|e| {
        anyhow::anyhow!(
            "Failed to list profiles: {}. Make sure Firefox is installed.",
            e
        )
    })?;
    print_json(&profiles)
}

fn resolve_profile(args: &ProfileArgs) -> anyhow::Result<std::path::PathBuf> {
    find_profile_path(&args.profile, args.profiles_dir.as_deref()).map_err(|e| {
        anyhow::anyhow!(
            "Failed to find profile '{}': {}. Use 'userjs profiles' to see available profiles.",
            args.profile,
            e
        )
    })
}

pub fn install(
    source: &SourceArgs,
    profile: &ProfileArgs,
    dry_run: bool,
    no_backup: bool,
) -> anyhow::Result<bool> {
    let content = load_source(source)?;

    // Never hand Firefox a file that fails the integrity check
    let report = validate_content(&content);
    if !report.is_clean() {
        print_json(&report)?;
        tracing::error!("refusing to install a user.js with integrity issues");
        return Ok(false);
    }

    let profile_path = resolve_profile(profile)?;
    let options = InstallOptions { dry_run, no_backup };
    let outcome = install_user_js(&profile_path, &content, &options)
        .with_context(|| format!("Failed to install into {}", profile_path.display()))?;
    print_json(&outcome)?;
    Ok(true)
}

/// Print the drift report; `Ok(false)` when some setting differs
pub fn drift(source: &SourceArgs, profile: &ProfileArgs) -> anyhow::Result<bool> {
    let content = load_source(source)?;
    let table = load_table(&content)?;
    let profile_path = resolve_profile(profile)?;

    let prefs_path = prefs_js_path(&profile_path);
    let live = parse_user_js_file(&prefs_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read prefs.js at {}: {e}. Start Firefox once with this profile.",
            prefs_path.display()
        )
    })?;

    let report = compute_drift(&table, &live);
    print_json(&report)?;
    Ok(report.is_in_sync())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    const CLEAN: &str = "user_pref(\"geo.enabled\", false);\nuser_pref(\"browser.uidensity\", 1);\n";
    const DUPLICATED: &str = "user_pref(\"geo.enabled\", false);\nuser_pref(\"geo.enabled\", true);\n";

    fn source_file(dir: &Path, content: &str) -> SourceArgs {
        let path = dir.join("candidate.js");
        std::fs::write(&path, content).unwrap();
        SourceArgs { file: Some(path) }
    }

    /// Profiles directory with one profile named "test" holding `prefs`
    fn temp_profile(prefs: &str) -> (tempfile::TempDir, ProfileArgs, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let profile = dir.path().join("Profiles/test.default");
        std::fs::create_dir_all(&profile).unwrap();
        std::fs::write(
            dir.path().join("profiles.ini"),
            "[Profile0]\nName=test\nIsRelative=1\nPath=Profiles/test.default\nDefault=1\n",
        )
        .unwrap();
        std::fs::write(profile.join("prefs.js"), prefs).unwrap();
        let args = ProfileArgs {
            profile: "test".to_string(),
            profiles_dir: Some(dir.path().to_path_buf()),
        };
        (dir, args, profile)
    }

    #[test]
    fn test_check_reports_clean_and_dirty() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(check(&source_file(dir.path(), CLEAN)).unwrap());
        assert!(!check(&source_file(dir.path(), DUPLICATED)).unwrap());
        assert!(check(&SourceArgs { file: None }).unwrap());
    }

    #[test]
    fn test_install_refuses_file_with_issues() {
        let (dir, profile_args, profile) = temp_profile("");
        let source = source_file(dir.path(), DUPLICATED);

        assert!(!install(&source, &profile_args, false, false).unwrap());
        assert!(!profile.join("user.js").exists());
    }

    #[test]
    fn test_install_writes_clean_file() {
        let (dir, profile_args, profile) = temp_profile("");
        let source = source_file(dir.path(), CLEAN);

        assert!(install(&source, &profile_args, true, false).unwrap());
        assert!(!profile.join("user.js").exists());

        assert!(install(&source, &profile_args, false, false).unwrap());
        assert_eq!(std::fs::read_to_string(profile.join("user.js")).unwrap(), CLEAN);
    }

    #[test]
    fn test_install_unknown_profile_is_an_error() {
        let (dir, mut profile_args, _) = temp_profile("");
        profile_args.profile = "missing".to_string();
        let err = install(&source_file(dir.path(), CLEAN), &profile_args, false, false)
            .unwrap_err();
        assert!(err.to_string().contains("userjs profiles"));
    }

    #[test]
    fn test_drift_fails_only_on_differing_values() {
        let (dir, profile_args, _) = temp_profile("user_pref(\"geo.enabled\", false);\n");
        let source = source_file(dir.path(), CLEAN);
        // browser.uidensity is not persisted, which is not drift
        assert!(drift(&source, &profile_args).unwrap());

        let (dir, profile_args, _) = temp_profile("user_pref(\"geo.enabled\", true);\n");
        let source = source_file(dir.path(), CLEAN);
        assert!(!drift(&source, &profile_args).unwrap());
    }

    #[test]
    fn test_drift_without_prefs_js_is_an_error() {
        let (dir, profile_args, profile) = temp_profile("");
        std::fs::remove_file(profile.join("prefs.js")).unwrap();
        let err = drift(&source_file(dir.path(), CLEAN), &profile_args).unwrap_err();
        assert!(err.to_string().contains("prefs.js"));
    }

    #[test]
    fn test_render_rejects_unknown_optional() {
        let shipped = SourceArgs { file: None };
        assert!(render(&shipped, false, &["no.such.pref".to_string()]).is_err());
        assert!(render(
            &shipped,
            true,
            &[
                "privacy.resistFingerprinting".to_string(),
                "privacy.resistFingerprinting".to_string()
            ]
        )
        .is_ok());
    }
}
