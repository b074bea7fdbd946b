//! skillmeter configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::session::{SessionConfig, DEFAULT_DURATION_SECS};

/// Top-level skillmeter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillmeterConfig {
    /// Session length in seconds.
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    /// Clock period in milliseconds. One tick removes one second from the
    /// countdown regardless of this value.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Question bank file. The built-in bank is used when unset.
    #[serde(default)]
    pub question_bank: Option<PathBuf>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}
fn default_tick_interval() -> u64 {
    1000
}

impl Default for SkillmeterConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            tick_interval_ms: default_tick_interval(),
            question_bank: None,
        }
    }
}

impl SkillmeterConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: self.duration_secs,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = var("SKILLMETER_DURATION_SECS") {
            self.duration_secs = value
                .trim()
                .parse()
                .with_context(|| format!("invalid SKILLMETER_DURATION_SECS: '{value}'"))?;
        }
        if let Some(value) = var("SKILLMETER_QUESTION_BANK") {
            if !value.trim().is_empty() {
                self.question_bank = Some(PathBuf::from(value));
            }
        }
        Ok(())
    }
}

/// Load configuration from the given path, `./skillmeter.toml`, or
/// `~/.config/skillmeter/config.toml`, in that order, then apply
/// environment overrides.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillmeterConfig> {
    let config_path = if let Some(p) = path {
        Some(p.to_path_buf())
    } else {
        let local = PathBuf::from("skillmeter.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<SkillmeterConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => SkillmeterConfig::default(),
    };

    config.apply_env_overrides(|name| std::env::var(name).ok())?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillmeter"))
}
