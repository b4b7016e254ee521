use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::cli::Cli;

pub const SETTINGS_FILE: &str = "prune-remote.json";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_PROTECTED: &str = "main";

/// Per-repository defaults read from `<git-dir>/prune-remote.json`.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Settings {
    pub remote: Option<String>,
    pub protected: Option<String>,
}

impl Settings {
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                debug!(path = %path.display(), error = %e, "Ignoring malformed settings file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub dry_run: bool,
    pub force: bool,
    pub remote: String,
    pub protected: String,
}

impl RunConfig {
    pub fn resolve(cli: &Cli, settings: Settings) -> Self {
        Self {
            dry_run: cli.dry_run,
            force: cli.force,
            remote: cli
                .remote
                .clone()
                .or(settings.remote)
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            protected: cli
                .protected
                .clone()
                .or(settings.protected)
                .unwrap_or_else(|| DEFAULT_PROTECTED.to_string()),
        }
    }
}
