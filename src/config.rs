use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::Difficulty;
use crate::source::DEFAULT_API_URL;
use crate::timer::DEFAULT_SECONDS;

pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub question_count: u32,
    pub seconds_per_question: u32,
    pub difficulty: Difficulty,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            question_count: DEFAULT_QUESTION_COUNT,
            seconds_per_question: DEFAULT_SECONDS,
            difficulty: Difficulty::Easy,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Zero counts and durations make no sense; put the defaults back.
    fn sanitized(mut self) -> Self {
        if self.question_count == 0 {
            self.question_count = DEFAULT_QUESTION_COUNT;
        }
        if self.seconds_per_question == 0 {
            self.seconds_per_question = DEFAULT_SECONDS;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.api_url.trim().is_empty() {
            self.api_url = DEFAULT_API_URL.to_string();
        }
        self
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "trivia")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.yaml"))
}

pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".trivia"))
}

pub fn parse(content: &str) -> Result<Config, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str::<Config>(content).map(Config::sanitized)
}

/// Reads the config at `path` (or the default location). A missing file
/// yields defaults; a malformed one is logged and yields defaults too.
pub fn load(path: Option<&Path>) -> Config {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) => p,
        None => return Config::default(),
    };

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            debug!("no config at {}, using defaults", path.display());
            return Config::default();
        }
    };

    match parse(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring malformed config {}: {}", path.display(), e);
            Config::default()
        }
    }
}
