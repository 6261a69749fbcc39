//! Configuration for dicer.
//!
//! The raw file shape ([`DicerConfig`]) mirrors `~/.dicer/config.toml`, with every
//! field optional. [`DicerConfig::settings`] validates it into [`Settings`], the
//! read-only value shared by every roll request.
//!
//! ```toml
//! [roll]
//! max_roll_times = 10
//! max_details_size = 500
//! display_name_order = ["configured", "nickname", "username"]
//!
//! [chat]
//! prefixes = [".", "。"]
//! bot_name = "dicer"
//!
//! [evaluator]
//! max_roll_count = 100
//! [evaluator.d]
//! count = 1
//! faces = 100
//! ```

use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use dicer_types::{EvaluatorConfig, NameSource, RollLimits, default_name_order};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "DICER_CONFIG";

const DEFAULT_BOT_NAME: &str = "dicer";

#[derive(Debug, Default, Deserialize)]
pub struct DicerConfig {
    pub roll: Option<RollConfig>,
    pub chat: Option<ChatConfig>,
    pub evaluator: Option<EvaluatorConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path.as_path()),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RollConfig {
    /// Repeat-count ceiling for `times#expression`. Default: 10. Minimum: 1.
    pub max_roll_times: Option<u32>,
    /// Longest evaluation trace shown in a single-roll reply. Default: 500.
    pub max_details_size: Option<usize>,
    /// Display name sources, first non-empty wins.
    pub display_name_order: Option<Vec<NameSource>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatConfig {
    /// Command prefixes recognized in front of roll shorthands.
    pub prefixes: Option<Vec<String>>,
    /// Name used in `@mentions` addressing the bot.
    pub bot_name: Option<String>,
}

/// Validated, read-only configuration for the roll pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub limits: RollLimits,
    pub display_name_order: Vec<NameSource>,
    pub prefixes: Vec<String>,
    pub bot_name: String,
    pub evaluator: EvaluatorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limits: RollLimits::default(),
            display_name_order: default_name_order(),
            prefixes: default_prefixes(),
            bot_name: DEFAULT_BOT_NAME.to_string(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

fn default_prefixes() -> Vec<String> {
    vec![".".to_string(), "。".to_string()]
}

impl DicerConfig {
    /// Load the config file, returning `Ok(None)` when none exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        Self::parse(&content).map_err(|err| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, err);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Validate into [`Settings`], filling in defaults for absent fields.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let defaults = Settings::default();
        let roll = self.roll.as_ref();

        let limits = RollLimits::new(
            roll.and_then(|r| r.max_roll_times)
                .unwrap_or(RollLimits::DEFAULT_MAX_ROLL_TIMES),
            roll.and_then(|r| r.max_details_size)
                .unwrap_or(RollLimits::DEFAULT_MAX_DETAILS_SIZE),
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let display_name_order = roll
            .and_then(|r| r.display_name_order.clone())
            .unwrap_or(defaults.display_name_order);
        if display_name_order.is_empty() {
            return Err(ConfigError::Invalid(
                "display_name_order must list at least one source".to_string(),
            ));
        }

        let chat = self.chat.as_ref();
        let prefixes: Vec<String> = chat
            .and_then(|c| c.prefixes.clone())
            .unwrap_or(defaults.prefixes)
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        let bot_name = chat
            .and_then(|c| c.bot_name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(defaults.bot_name);

        let evaluator = self.evaluator.clone().unwrap_or(defaults.evaluator);
        if evaluator.d.count == 0 || evaluator.d.faces == 0 {
            return Err(ConfigError::Invalid(
                "evaluator.d.count and evaluator.d.faces must be at least 1".to_string(),
            ));
        }

        Ok(Settings {
            limits,
            display_name_order,
            prefixes,
            bot_name,
            evaluator,
        })
    }
}

/// `$DICER_CONFIG`, else `~/.dicer/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".dicer").join("config.toml"))
}
