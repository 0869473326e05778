use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for userjs
#[derive(Parser, Debug)]
#[command(name = "userjs")]
#[command(version)]
#[command(about = "Check, render and install the Obsidian · Sapphire · Tyrian Firefox user.js")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print settings as JSON
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Only settings matching these glob patterns (e.g. "browser.urlbar.*")
        #[arg(short, long)]
        query: Vec<String>,

        /// Print the raw value of a single setting
        #[arg(long, conflicts_with = "query")]
        get: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputType::JsonObject)]
        output_type: OutputType,
    },

    /// Check integrity: well-formed statements, unique keys, scalar values
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List sections, their settings and the optional (commented-out) settings
    Sections {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the table in user.js form
    Render {
        #[command(flatten)]
        source: SourceArgs,

        /// Keep section banners and notes
        #[arg(long)]
        annotated: bool,

        /// Switch on an optional setting (repeatable); implies --annotated
        #[arg(long = "enable", value_name = "KEY")]
        enable: Vec<String>,
    },

    /// List Firefox profiles
    Profiles {
        #[command(flatten)]
        profiles: ProfileArgs,
    },

    /// Copy user.js into a Firefox profile
    Install {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        profiles: ProfileArgs,

        /// Show what would happen without writing
        #[arg(long)]
        dry_run: bool,

        /// Do not keep user.js.bak when replacing a different file
        #[arg(long)]
        no_backup: bool,
    },

    /// Compare the table with a profile's live prefs.js
    Drift {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        profiles: ProfileArgs,
    },
}

/// Where the preference table comes from
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// user.js to read instead of the shipped one
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Which profile to act on
#[derive(clap::Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Firefox profile name
    #[arg(short, long, default_value = "default")]
    pub profile: String,

    /// Profiles directory (default: MOZ_PROFILES_DIR, then the platform location)
    #[arg(long, value_name = "DIR")]
    pub profiles_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    /// {"key": value, ...}
    JsonObject,
    /// [{"key": ..., "value": ..., "section": ..., "note": ...}, ...]
    JsonArray,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_with_queries() {
        let cli = Cli::parse_from(["userjs", "show", "-q", "network.*", "-q", "geo.*"]);
        match cli.command {
            Commands::Show { query, get, .. } => {
                assert_eq!(query, vec!["network.*", "geo.*"]);
                assert!(get.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_get_conflicts_with_query() {
        let result = Cli::try_parse_from(["userjs", "show", "-q", "a.*", "--get", "a.b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_install_defaults() {
        let cli = Cli::parse_from(["userjs", "-vv", "install", "--dry-run"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Install {
                profiles, dry_run, ..
            } => {
                assert_eq!(profiles.profile, "default");
                assert!(dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_render_enable_repeatable() {
        let cli = Cli::parse_from([
            "userjs",
            "render",
            "--enable",
            "privacy.resistFingerprinting",
            "--enable",
            "privacy.clearOnShutdown.cache",
        ]);
        match cli.command {
            Commands::Render { enable, .. } => assert_eq!(enable.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
