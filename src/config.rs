//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `$XDG_CONFIG_HOME/twentyq/twentyq.toml`, or an explicit `--config` file
//! 3. Environment variables: `TWENTYQ_*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, TagMatching};

/// Unified configuration for twentyq.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Question document played and updated (default: ~/.twentyq/questions.txt)
    pub questions_file: PathBuf,
    /// Object a brand-new game starts from
    pub seed_object: String,
    /// How tag lines are recognised when reading documents
    pub tag_matching: TagMatching,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            questions_file: default_questions_file(),
            seed_object: "computer".into(),
            tag_matching: TagMatching::default(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub questions_file: Option<PathBuf>,
    pub seed_object: Option<String>,
    pub tag_matching: Option<TagMatching>,
}

fn default_questions_file() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".twentyq").join("questions.txt"))
        .unwrap_or_else(|| PathBuf::from("~/.twentyq/questions.txt"))
}

/// Get the XDG config directory for twentyq.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "twentyq").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("twentyq.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

fn parse_tag_matching(value: &str) -> Result<TagMatching, ApplicationError> {
    match value.trim().to_lowercase().as_str() {
        "loose" => Ok(TagMatching::Loose),
        "strict" => Ok(TagMatching::Strict),
        other => Err(ApplicationError::Config {
            message: format!("tag_matching must be 'loose' or 'strict', got '{}'", other),
        }),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file replacing the global one; it must exist
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                debug!("config file: {}", path.display());
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!("global config: {}", global_path.display());
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        Ok(current)
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            questions_file: overlay
                .questions_file
                .clone()
                .unwrap_or_else(|| self.questions_file.clone()),
            seed_object: overlay
                .seed_object
                .clone()
                .unwrap_or_else(|| self.seed_object.clone()),
            tag_matching: overlay.tag_matching.unwrap_or(self.tag_matching),
        }
    }

    /// Apply TWENTYQ_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TWENTYQ")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("questions_file") {
            settings.questions_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("seed_object") {
            settings.seed_object = val;
        }
        if let Ok(val) = config.get_string("tag_matching") {
            settings.tag_matching = parse_tag_matching(&val)?;
        }
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the document path.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.questions_file.to_string_lossy().as_ref());
        self.questions_file = PathBuf::from(expanded);
    }

    /// Render settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented config file template with the compiled defaults.
    pub fn template() -> Result<String, ApplicationError> {
        let body = Self::default().to_toml()?;
        Ok(format!(
            "# twentyq configuration\n\
             #\n\
             # questions_file: question document played and updated (~ and $VAR expand)\n\
             # seed_object:    object a brand-new game starts from\n\
             # tag_matching:   \"loose\" (any tag containing Q is a question) or \"strict\"\n\
             \n{}",
            body
        ))
    }
}
