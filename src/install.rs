//! Placing a user.js into a Firefox profile
//!
//! Firefox reads `<profile>/user.js` on every start and copies its values
//! over `prefs.js`. Installing is a file write; the only care taken is that
//! an existing, different user.js is kept as `user.js.bak` and that the new
//! file appears atomically.

use crate::error::{Error, Result};
use crate::profile::user_js_path;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options for [`install_user_js`]
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Report what would happen without writing anything
    pub dry_run: bool,
    /// Skip the `user.js.bak` copy of a replaced file
    pub no_backup: bool,
}

/// What an install did (or would do, for a dry run)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InstallOutcome {
    /// No user.js existed
    Created { path: PathBuf },
    /// A different user.js was replaced
    Replaced {
        path: PathBuf,
        backup: Option<PathBuf>,
    },
    /// The profile already has identical content
    Unchanged { path: PathBuf },
    /// Dry run; `would` is the outcome a real run would produce
    DryRun { would: Box<InstallOutcome> },
}

/// Write `content` as the profile's user.js
pub fn install_user_js(
    profile_path: &Path,
    content: &str,
    options: &InstallOptions,
) -> Result<InstallOutcome> {
    if !profile_path.is_dir() {
        return Err(Error::InvalidProfileDirectory(profile_path.to_path_buf()));
    }

    let target = user_js_path(profile_path);
    let existing = match std::fs::read_to_string(&target) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let backup_path = target.with_extension("js.bak");
    let planned = match &existing {
        None => InstallOutcome::Created {
            path: target.clone(),
        },
        Some(text) if text == content => InstallOutcome::Unchanged {
            path: target.clone(),
        },
        Some(_) => InstallOutcome::Replaced {
            path: target.clone(),
            backup: (!options.no_backup).then(|| backup_path.clone()),
        },
    };

    if options.dry_run {
        tracing::info!(path = %target.display(), "dry run, nothing written");
        return Ok(InstallOutcome::DryRun {
            would: Box::new(planned),
        });
    }

    match &planned {
        InstallOutcome::Unchanged { .. } => {
            tracing::info!(path = %target.display(), "user.js already up to date");
            return Ok(planned);
        }
        InstallOutcome::Replaced {
            backup: Some(backup),
            ..
        } => {
            std::fs::copy(&target, backup)?;
            tracing::info!(backup = %backup.display(), "backed up existing user.js");
        }
        _ => {}
    }

    // Write next to the target so the rename stays on one filesystem
    let mut tmp = tempfile::NamedTempFile::new_in(profile_path)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| Error::Io(e.error))?;

    tracing::info!(path = %target.display(), "installed user.js");
    Ok(planned)
}
