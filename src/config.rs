//! Configuration management for devloop.
//!
//! Settings come from `.devloop.json` or `.devloop.toml` in the project
//! directory (JSON wins when both exist), or from an explicit `--config` path.
//! Keys are camelCase in either format. Missing keys take their defaults, and a
//! project with no config file runs entirely on defaults.

pub mod validation;

pub use validation::{ConfigValidator, ValidationReport};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DevLoopError, IntoConfigError, Result};

/// Project-local JSON config file name
pub const JSON_CONFIG_FILE: &str = ".devloop.json";

/// Project-local TOML config file name
pub const TOML_CONFIG_FILE: &str = ".devloop.toml";

/// Agent back-ends the loop can drive.
pub const VALID_LLM_PROVIDERS: &[&str] = &["claude", "copilot"];

/// Project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Agent back-end, `claude` or `copilot`
    #[serde(default = "default_llm")]
    pub llm: String,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub verbose: bool,

    /// Plan file name, resolved under `paths.docs`
    #[serde(default = "default_plan_file", rename = "planFile")]
    pub plan_file: String,
}

fn default_llm() -> String {
    "claude".to_string()
}

fn default_plan_file() -> String {
    "implementation-plan.md".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            llm: default_llm(),
            paths: PathsConfig::default(),
            validation: ValidationConfig::default(),
            verbose: false,
            plan_file: default_plan_file(),
        }
    }
}

/// Project-relative directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_docs_dir")]
    pub docs: String,

    /// Where run artifacts such as `current-task.md` live
    #[serde(default = "default_context_dir")]
    pub context: String,

    #[serde(default = "default_prompts_dir")]
    pub prompts: String,
}

fn default_docs_dir() -> String {
    "docs".to_string()
}

fn default_context_dir() -> String {
    "context".to_string()
}

fn default_prompts_dir() -> String {
    "prompts".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs: default_docs_dir(),
            context: default_context_dir(),
            prompts: default_prompts_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Review/fix cycles allowed before the loop gives up
    #[serde(default = "default_max_review_iterations", rename = "maxReviewIterations")]
    pub max_review_iterations: u32,

    /// Named shell commands, e.g. `build = "cargo build"`
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
}

fn default_max_review_iterations() -> u32 {
    3
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_review_iterations: default_max_review_iterations(),
            commands: BTreeMap::new(),
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file, relative to the project directory unless absolute
    pub config_path: Option<PathBuf>,
    pub llm: Option<String>,
    /// Only ever turns verbose output on
    pub verbose: bool,
}

impl ProjectConfig {
    /// Load configuration for a project directory and apply CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`DevLoopError::Config`] when an explicit config path does not
    /// exist, or when the chosen file cannot be read or parsed.
    pub fn load(project_dir: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match Self::locate(project_dir, overrides)? {
            Some(path) => Self::load_file(&path)?,
            None => {
                debug!(dir = %project_dir.display(), "No config file found, using defaults");
                Self::default()
            }
        };

        if let Some(llm) = overrides.llm.as_deref().filter(|l| !l.is_empty()) {
            config.llm = llm.to_string();
        }
        if overrides.verbose {
            config.verbose = true;
        }

        Ok(config)
    }

    /// Resolve which config file applies, if any.
    pub fn locate(project_dir: &Path, overrides: &ConfigOverrides) -> Result<Option<PathBuf>> {
        if let Some(explicit) = overrides.config_path.as_deref() {
            let candidate = if explicit.is_absolute() {
                explicit.to_path_buf()
            } else {
                project_dir.join(explicit)
            };
            if !candidate.is_file() {
                return Err(DevLoopError::config_with_path(
                    format!("Config file not found: {}", candidate.display()),
                    &candidate,
                ));
            }
            return Ok(Some(candidate));
        }

        Ok([JSON_CONFIG_FILE, TOML_CONFIG_FILE]
            .iter()
            .map(|name| project_dir.join(name))
            .find(|path| path.is_file()))
    }

    /// Parse a single config file, choosing the format by extension.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).into_config_error(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).into_config_error(path)?,
            Some("toml") => toml::from_str(&content).into_config_error(path)?,
            _ => {
                return Err(DevLoopError::config_with_path(
                    format!(
                        "Unsupported config format (expected .json or .toml): {}",
                        path.display()
                    ),
                    path,
                ))
            }
        };

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Path of the planning document
    #[must_use]
    pub fn plan_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.docs).join(&self.plan_file)
    }

    /// Directory holding the resume artifacts
    #[must_use]
    pub fn context_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.context)
    }

    #[must_use]
    pub fn prompts_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.paths.prompts)
    }

    /// Check the llm name against [`VALID_LLM_PROVIDERS`], ignoring case
    #[must_use]
    pub fn is_known_llm(&self) -> bool {
        VALID_LLM_PROVIDERS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&self.llm))
    }
}
