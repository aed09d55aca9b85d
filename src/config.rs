//! Application-level configuration loading: contest sizing, persistence and background timers.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::contest::ContestSettings;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TRIVIA_HUB_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    contest: ContestSettings,
    save_dir: PathBuf,
    save_interval: Duration,
    standings_base_url: Option<String>,
    idle_window: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        team = %app_config.contest.team_name,
                        rounds = app_config.contest.n_rounds,
                        "loaded contest configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    pub fn contest(&self) -> &ContestSettings {
        &self.contest
    }

    /// Directory snapshots are written to.
    pub fn save_dir(&self) -> &PathBuf {
        &self.save_dir
    }

    /// Period of the standings poll and automatic save.
    pub fn save_interval(&self) -> Duration {
        self.save_interval
    }

    /// Base URL of the published standings; `None` disables the poll.
    pub fn standings_base_url(&self) -> Option<&str> {
        self.standings_base_url.as_deref()
    }

    /// Window used when a presence query gives none.
    pub fn idle_window(&self) -> Duration {
        self.idle_window
    }

    /// Same configuration with snapshots written under `dir`.
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Same configuration with a different contest shape.
    pub fn with_contest(mut self, contest: ContestSettings) -> Self {
        self.contest = contest;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    team_name: String,
    n_rounds: usize,
    n_questions_normal: usize,
    n_questions_speed: usize,
    n_teams: usize,
    n_visual: usize,
    save_dir: PathBuf,
    save_interval_secs: u64,
    standings_base_url: Option<String>,
    idle_window_secs: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        let contest = ContestSettings::default();
        Self {
            team_name: contest.team_name,
            n_rounds: contest.n_rounds,
            n_questions_normal: contest.n_questions_normal,
            n_questions_speed: contest.n_questions_speed,
            n_teams: contest.n_teams,
            n_visual: contest.n_visual,
            save_dir: PathBuf::from("saves"),
            save_interval_secs: 300,
            standings_base_url: None,
            idle_window_secs: 300,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            contest: ContestSettings {
                team_name: value.team_name,
                n_rounds: value.n_rounds.max(1),
                n_questions_normal: value.n_questions_normal.max(1),
                n_questions_speed: value.n_questions_speed.max(1),
                n_teams: value.n_teams,
                n_visual: value.n_visual,
            },
            save_dir: value.save_dir,
            save_interval: Duration::from_secs(value.save_interval_secs.max(1)),
            standings_base_url: value
                .standings_base_url
                .filter(|url| !url.trim().is_empty()),
            idle_window: Duration::from_secs(value.idle_window_secs),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
