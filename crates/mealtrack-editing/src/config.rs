//! Editor configuration and its loader

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use mealtrack_undo_redo::{HistoryConfig, SharedHistory};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

const NAME_PLACEHOLDER: &str = "{name}";

/// Texts used by the close prompts; `{name}` is replaced with the entity name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Dialog caption
    pub caption: String,
    /// Asked when closing a dirty, valid session
    pub save_question: String,
    /// Asked when closing a dirty, invalid session
    pub discard_question: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            caption: "Unsaved Changes".to_string(),
            save_question: "Do you want to save the changes to {name}?".to_string(),
            discard_question:
                "{name} has errors and cannot be saved. Do you want to discard your changes?"
                    .to_string(),
        }
    }
}

impl PromptConfig {
    /// Save question for `name`
    pub fn save_question_for(&self, name: &str) -> String {
        self.save_question.replace(NAME_PLACEHOLDER, name)
    }

    /// Discard question for `name`
    pub fn discard_question_for(&self, name: &str) -> String {
        self.discard_question.replace(NAME_PLACEHOLDER, name)
    }
}

/// Everything an editor can be configured with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo history limits
    pub history: HistoryConfig,
    /// Close prompt texts
    pub prompts: PromptConfig,
}

impl EditorConfig {
    /// Reject values no editor can work with
    pub fn validate(&self) -> EditResult<()> {
        if self.history.max_entries == Some(0) {
            return Err(EditError::invalid_config(
                "history.max_entries must be greater than 0",
            ));
        }
        let prompts = [
            ("prompts.caption", &self.prompts.caption),
            ("prompts.save_question", &self.prompts.save_question),
            ("prompts.discard_question", &self.prompts.discard_question),
        ];
        for (key, text) in prompts {
            if text.trim().is_empty() {
                return Err(EditError::invalid_config(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }

    /// A fresh history honoring these limits
    pub fn shared_history(&self) -> SharedHistory {
        SharedHistory::with_config(self.history.clone())
    }
}

/// Loads [`EditorConfig`] from an optional TOML file plus environment overrides
///
/// Environment keys look like `MEALTRACK_HISTORY__MAX_ENTRIES=200`.
pub struct ConfigLoader {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader for the default config file location
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Loader for a custom config file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        ConfigLoader {
            config_path: path.into(),
            env_prefix: "MEALTRACK".to_string(),
        }
    }

    /// Read overrides from variables starting with `prefix` instead
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mealtrack")
            .join("editor.toml")
    }

    /// Path of the config file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate; a missing file yields the defaults
    pub fn load(&self) -> EditResult<EditorConfig> {
        let settings = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: EditorConfig = settings.try_deserialize()?;
        config.validate()?;
        tracing::debug!(path = %self.config_path.display(), "editor config loaded");
        Ok(config)
    }

    /// Validate and write `config` as TOML
    pub fn save(&self, config: &EditorConfig) -> EditResult<()> {
        config.validate()?;
        let text = toml::to_string_pretty(config)?;
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.config_path, text)?;
        tracing::info!(path = %self.config_path.display(), "editor config saved");
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
