//! # userjs - the Obsidian · Sapphire · Tyrian Firefox preference table
//!
//! This crate ships `firefox/user.js`, a flat list of Firefox preference
//! overrides (UI appearance, privacy and security posture, developer tools,
//! performance), and the tooling around it: parsing, integrity checks,
//! recovering the file's sections and notes, rendering, installing into a
//! profile and comparing against a profile's live `prefs.js`.
//!
//! The file itself is inert data. Firefox's preference loader reads it at
//! startup; nothing here changes how Firefox interprets it.
//!
//! ## Quick Start
//!
//! ### The shipped table
//!
//! ```rust
//! use userjs::{PrefValue, SettingsTable};
//!
//! let table = SettingsTable::shipped()?;
//! assert_eq!(table.get("devtools.theme"), Some(&PrefValue::String("dark".to_string())));
//! assert_eq!(table.get("browser.sessionstore.interval"), Some(&PrefValue::Integer(60000)));
//! # Ok::<(), userjs::Error>(())
//! ```
//!
//! ### Checking a file
//!
//! ```rust
//! use userjs::{validate_content, SHIPPED_USER_JS};
//!
//! let report = validate_content(SHIPPED_USER_JS);
//! assert!(report.is_clean(), "{:?}", report.issues);
//! ```
//!
//! ### Sections and optional settings
//!
//! ```rust
//! use userjs::{annotate, SHIPPED_USER_JS};
//!
//! let notes = annotate(SHIPPED_USER_JS)?;
//! assert_eq!(notes.section_of("devtools.theme"), Some("Developer Tools (Pentesting)"));
//! assert!(notes.optional_setting("privacy.resistFingerprinting").is_some());
//! # Ok::<(), userjs::Error>(())
//! ```
//!
//! ### Querying
//!
//! ```rust
//! use userjs::{query_settings, SettingsTable};
//!
//! let table = SettingsTable::shipped()?;
//! let telemetry = query_settings(table, &["toolkit.telemetry.*"])?;
//! assert!(telemetry.iter().all(|s| s.value.as_bool() == Some(false)));
//! # Ok::<(), userjs::Error>(())
//! ```
//!
//! ### Installing into a profile
//!
//! ```rust,no_run
//! use userjs::{find_profile_path, install_user_js, InstallOptions, SHIPPED_USER_JS};
//!
//! let profile = find_profile_path("default-release", None)?;
//! let outcome = install_user_js(&profile, SHIPPED_USER_JS, &InstallOptions::default())?;
//! println!("{:?}", outcome);
//! # Ok::<(), userjs::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All functions return [`Result<T, Error>`]. Lexer and parser errors carry
//! the line and column they point at:
//!
//! ```rust
//! use userjs::{parse_user_js, Error};
//!
//! match parse_user_js("user_pref(\"geo.enabled\" false);") {
//!     Err(Error::Parser { line, column, .. }) => assert_eq!((line, column), (1, 25)),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

pub use annotate::{annotate, Annotations, OptionalSetting, Section};
pub use drift::{compute_drift, DriftEntry, DriftReport, DriftStatus};
pub use error::{Error, Result};
pub use install::{install_user_js, InstallOptions, InstallOutcome};
pub use parser::{parse_user_js, parse_user_js_file};
pub use profile::{
    find_profile_path, get_profiles_directory, list_profiles, prefs_js_path, user_js_path,
    ProfileInfo,
};
pub use query::query_settings;
pub use render::{enable_optional, render_setting, render_table};
pub use table::{SettingsTable, SHIPPED_USER_JS};
pub use types::{PrefType, PrefValue, Setting, SettingView};
pub use validate::{
    is_valid_key, validate_content, validate_settings, IntegrityReport, Issue, IssueKind,
};

// All modules are private - use re-exports above for public API
mod annotate;
mod drift;
mod error;
mod install;
mod lexer;
mod parser;
mod profile;
mod query;
mod render;
mod table;
mod types;
mod validate;
