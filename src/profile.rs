//! Firefox profile discovery
//!
//! Finds the profile a user.js should be installed into. The profiles
//! directory is resolved from an explicit path, then `MOZ_PROFILES_DIR`, then
//! the platform default. Profiles are looked up through `profiles.ini`, with a
//! directory scan as fallback.

use crate::error::{Error, Result};
use anyhow::Context;
use configparser::ini::Ini;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A profile as listed in profiles.ini
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_default: bool,
    pub is_relative: bool,
    /// Install hash of the Firefox installation this profile is default for
    pub locked_to_install: Option<String>,
}

impl ProfileInfo {
    /// Absolute profile directory
    pub fn resolve(&self, profiles_dir: &Path) -> PathBuf {
        if self.is_relative {
            profiles_dir.join(&self.path)
        } else {
            self.path.clone()
        }
    }
}

/// Parsed profiles.ini: `[ProfileN]` sections plus `[<install hash>]` sections
#[derive(Debug, Default)]
struct ProfilesIni {
    profiles: Vec<ProfileInfo>,
    /// install hash (as written) -> default profile path
    installs: HashMap<String, String>,
}

impl ProfilesIni {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profiles.ini from {}", path.display()))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> anyhow::Result<Self> {
        // case_sensitive keeps install hash section names as written
        let mut ini = Ini::new_cs();
        ini.read(content.to_string())
            .map_err(|e| anyhow::anyhow!("Failed to parse profiles.ini: {}", e))?;

        let mut parsed = ProfilesIni::default();
        // sections come back in hash order; ProfileN order is restored below
        let mut numbered: Vec<(u32, ProfileInfo)> = Vec::new();

        for section in ini.sections() {
            let lower = section.to_lowercase();
            if lower.starts_with("profile") {
                let name = ini.get(&section, "Name").unwrap_or_default();
                let path = ini.get(&section, "Path").unwrap_or_default();
                if name.is_empty() || path.is_empty() {
                    continue;
                }
                let flag = |key: &str, default: u64| {
                    ini.getuint(&section, key)
                        .ok()
                        .flatten()
                        .unwrap_or(default)
                        == 1
                };
                let number = lower["profile".len()..].parse().unwrap_or(u32::MAX);
                numbered.push((
                    number,
                    ProfileInfo {
                        name,
                        path: PathBuf::from(path),
                        is_relative: flag("IsRelative", 1),
                        is_default: flag("Default", 0),
                        locked_to_install: None,
                    },
                ));
            } else if lower != "general" && !lower.starts_with("backgroundtasksprofiles") {
                if let Some(default) = ini.get(&section, "Default") {
                    parsed.installs.insert(section, default);
                }
            }
        }

        numbered.sort_by_key(|(number, _)| *number);
        parsed.profiles = numbered.into_iter().map(|(_, profile)| profile).collect();

        for profile in &mut parsed.profiles {
            let path = profile.path.to_string_lossy();
            profile.locked_to_install = parsed
                .installs
                .iter()
                .find(|(_, default)| default.as_str() == path)
                .map(|(hash, _)| hash.clone());
        }

        Ok(parsed)
    }

    /// Default profile recorded for the install with the given hash
    fn default_for_install(&self, install_hash: &str) -> Option<&str> {
        self.installs
            .iter()
            .find(|(hash, _)| hash.eq_ignore_ascii_case(install_hash))
            .map(|(_, path)| path.as_str())
    }
}

/// List all profiles in profiles.ini
pub fn list_profiles(profiles_dir: Option<&Path>) -> Result<Vec<ProfileInfo>> {
    let dir = get_profiles_directory(profiles_dir)?;
    let ini_path = dir.join("profiles.ini");
    if !ini_path.exists() {
        return Err(Error::Profile(format!(
            "profiles.ini not found at {}. \
             Firefox may not be installed or this is not a standard Firefox setup.",
            ini_path.display()
        )));
    }
    let ini = ProfilesIni::load(&ini_path).map_err(to_profile_error)?;
    Ok(ini.profiles)
}

/// Find the directory of a profile by name
///
/// `"default"` resolves to the default profile of the local Firefox install
/// (Firefox 67+ install sections), then to the profile marked `Default=1`.
pub fn find_profile_path(profile_name: &str, profiles_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = get_profiles_directory(profiles_dir)?;
    find_in_directory(&dir, profile_name).map_err(to_profile_error)
}

fn to_profile_error(e: anyhow::Error) -> Error {
    Error::Profile(format!("{:#}", e))
}

fn find_in_directory(dir: &Path, profile_name: &str) -> anyhow::Result<PathBuf> {
    let ini_path = dir.join("profiles.ini");

    if ini_path.exists() {
        match ProfilesIni::load(&ini_path) {
            Ok(ini) => {
                if let Some(path) = resolve_from_ini(&ini, dir, profile_name) {
                    tracing::debug!(profile = profile_name, path = %path.display(), "resolved profile from profiles.ini");
                    return Ok(path);
                }
            }
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable profiles.ini"),
        }
    }

    scan_profiles_directory(dir, profile_name)
}

fn resolve_from_ini(ini: &ProfilesIni, dir: &Path, profile_name: &str) -> Option<PathBuf> {
    let existing = |p: PathBuf| p.exists().then_some(p);

    if let Some(profile) = ini.profiles.iter().find(|p| p.name == profile_name) {
        if let Some(path) = existing(profile.resolve(dir)) {
            return Some(path);
        }
    }

    if profile_name != "default" {
        return None;
    }

    if let Some(default) = firefox_install_path()
        .ok()
        .and_then(|bin| ini.default_for_install(&hash_install_path(&bin)))
    {
        let listed = ini.profiles.iter().find(|p| {
            let p = p.path.to_string_lossy();
            p == default || p == format!("Profiles/{}", default)
        });
        let candidate = match listed {
            Some(profile) => profile.resolve(dir),
            None if Path::new(default).is_absolute() => PathBuf::from(default),
            None => dir.join(default),
        };
        if let Some(path) = existing(candidate) {
            return Some(path);
        }
    }

    ini.profiles
        .iter()
        .find(|p| p.is_default)
        .and_then(|p| existing(p.resolve(dir)))
}

/// Locate the Firefox binary, honouring `FIREFOX_BIN`
fn firefox_install_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("FIREFOX_BIN") {
        return Ok(PathBuf::from(path));
    }

    #[cfg(target_os = "linux")]
    let candidates: Vec<PathBuf> = [
        "/usr/bin/firefox",
        "/usr/lib/firefox/firefox",
        "/snap/bin/firefox",
        "/opt/firefox/firefox",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    #[cfg(target_os = "macos")]
    let candidates: Vec<PathBuf> = [
        "/Applications/Firefox.app/Contents/MacOS/firefox",
        "/Applications/Firefox Developer Edition.app/Contents/MacOS/firefox",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    #[cfg(target_os = "windows")]
    let candidates: Vec<PathBuf> = std::env::var("PROGRAMFILES")
        .map(|pf| vec![PathBuf::from(pf).join("Mozilla Firefox").join("firefox.exe")])
        .unwrap_or_default();

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    let candidates: Vec<PathBuf> = Vec::new();

    candidates
        .into_iter()
        .find(|p| p.exists())
        .ok_or_else(|| anyhow::anyhow!("Could not find Firefox installation"))
}

/// Install hash Firefox uses to name install sections in profiles.ini
///
/// CityHash64 of the installation directory (parent of the binary, symlinks
/// resolved), as 16 uppercase hex digits.
fn hash_install_path(binary: &Path) -> String {
    let resolved = std::fs::canonicalize(binary).unwrap_or_else(|_| binary.to_path_buf());
    let install_dir = resolved.parent().unwrap_or(&resolved);
    let hash: u64 = cityhasher::hash(install_dir.to_string_lossy().as_bytes());
    format!("{:016X}", hash)
}

/// Fallback: match directory names `name` or `xxxxxxxx.name`
fn scan_profiles_directory(dir: &Path, profile_name: &str) -> anyhow::Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read profiles directory: {}", dir.display()))?;

    let suffix = format!(".{}", profile_name);
    let mut matches: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let dir_name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if dir_name == profile_name {
            return Ok(path);
        }
        if dir_name.ends_with(&suffix) {
            matches.push(path);
        }
    }

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(anyhow::anyhow!(
            "Profile '{}' not found in {}. Use 'userjs profiles' to see available profiles.",
            profile_name,
            dir.display()
        )),
        _ => {
            let names: Vec<&str> = matches
                .iter()
                .filter_map(|p| p.file_name().and_then(|s| s.to_str()))
                .collect();
            Err(anyhow::anyhow!(
                "Multiple profiles match '{}': {}. Use the full directory name.",
                profile_name,
                names.join(", ")
            ))
        }
    }
}

/// Resolve the profiles directory
///
/// Priority:
/// 1. Path given on the command line
/// 2. `MOZ_PROFILES_DIR` environment variable
/// 3. Platform default
pub fn get_profiles_directory(manual_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = manual_path {
        return validate_profiles_dir(path);
    }

    if let Ok(env_path) = std::env::var("MOZ_PROFILES_DIR") {
        return validate_profiles_dir(Path::new(&env_path));
    }

    default_profiles_directory()
}

fn validate_profiles_dir(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::Profile(format!(
            "Profiles directory does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(Error::Profile(format!(
            "Profiles directory path is not a directory: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

fn default_profiles_directory() -> Result<PathBuf> {
    let env = |name: &str| {
        std::env::var(name)
            .map(PathBuf::from)
            .map_err(|_| Error::Profile(format!("{} environment variable not set", name)))
    };

    #[cfg(target_os = "linux")]
    return Ok(env("HOME")?.join(".mozilla/firefox"));

    #[cfg(target_os = "macos")]
    return Ok(env("HOME")?.join("Library/Application Support/Firefox"));

    #[cfg(target_os = "windows")]
    return Ok(env("APPDATA")?.join("Mozilla/Firefox"));

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = env;
        Err(Error::Profile("Unsupported operating system".to_string()))
    }
}

/// Path of the live preferences Firefox writes in a profile
pub fn prefs_js_path(profile_path: &Path) -> PathBuf {
    profile_path.join("prefs.js")
}

/// Path a user.js must have inside a profile
pub fn user_js_path(profile_path: &Path) -> PathBuf {
    profile_path.join("user.js")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI: &str = r#"
[General]
StartWithLastProfile=1
Version=2

[Profile0]
Name=default
IsRelative=1
Path=Profiles/abcdefgh.default
Default=1

[Profile1]
Name=work
IsRelative=1
Path=Profiles/work.profile

[308046B0AF4A39CB]
Default=Profiles/work.profile
Locked=1
"#;

    #[test]
    fn test_profile_paths() {
        let profile = PathBuf::from("/home/user/.mozilla/firefox/test.default");
        assert_eq!(prefs_js_path(&profile), profile.join("prefs.js"));
        assert_eq!(user_js_path(&profile), profile.join("user.js"));
    }

    #[test]
    fn test_parse_profiles_ini() {
        let ini = ProfilesIni::parse(INI).unwrap();
        assert_eq!(ini.profiles.len(), 2);
        assert_eq!(ini.profiles[0].name, "default");
        assert!(ini.profiles[0].is_default);
        assert!(ini.profiles[0].is_relative);
        assert!(!ini.profiles[1].is_default);
    }

    #[test]
    fn test_install_sections_lock_profiles() {
        let ini = ProfilesIni::parse(INI).unwrap();
        assert_eq!(
            ini.default_for_install("308046b0af4a39cb"),
            Some("Profiles/work.profile")
        );
        let by_name = |name: &str| ini.profiles.iter().find(|p| p.name == name).unwrap();
        assert_eq!(
            by_name("work").locked_to_install.as_deref(),
            Some("308046B0AF4A39CB")
        );
        assert_eq!(by_name("default").locked_to_install, None);
    }

    #[test]
    fn test_profiles_keep_ini_numbering() {
        let content = (0..12)
            .rev()
            .map(|n| format!("[Profile{n}]\nName=p{n}\nIsRelative=1\nPath=Profiles/p{n}\n\n"))
            .collect::<String>();
        let ini = ProfilesIni::parse(&content).unwrap();
        let names: Vec<String> = ini.profiles.iter().map(|p| p.name.clone()).collect();
        let expected: Vec<String> = (0..12).map(|n| format!("p{n}")).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_hash_install_path_format() {
        let hash = hash_install_path(Path::new("/nonexistent/firefox/firefox"));
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_find_by_name_and_scan_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Profiles/work.profile")).unwrap();
        std::fs::create_dir_all(dir.path().join("x1y2z3.dev-edition")).unwrap();
        std::fs::write(dir.path().join("profiles.ini"), INI).unwrap();

        let work = find_profile_path("work", Some(dir.path())).unwrap();
        assert_eq!(work, dir.path().join("Profiles/work.profile"));

        let scanned = find_profile_path("dev-edition", Some(dir.path())).unwrap();
        assert_eq!(scanned, dir.path().join("x1y2z3.dev-edition"));

        assert!(find_profile_path("missing", Some(dir.path())).is_err());
    }

    #[test]
    fn test_list_profiles_requires_ini() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = list_profiles(Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("profiles.ini not found"));
    }

    #[test]
    fn test_profiles_dir_validation_nonexistent() {
        let err = get_profiles_directory(Some(Path::new("/nonexistent/path"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_profiles_dir_validation_file_not_directory() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let err = get_profiles_directory(Some(temp_file.path())).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_profiles_dir_validation_valid_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = get_profiles_directory(Some(temp_dir.path())).unwrap();
        assert_eq!(result, temp_dir.path());
    }
}
