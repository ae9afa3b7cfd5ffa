//! Configuration validation for devloop.
//!
//! Validation accumulates every problem instead of stopping at the first one,
//! so a single `devloop config validate` run shows everything to fix.
//!
//! # Example
//!
//! ```
//! use devloop::config::{ConfigValidator, ProjectConfig};
//!
//! let mut config = ProjectConfig::default();
//! config.llm = "gpt".to_string();
//! config.validation.max_review_iterations = 0;
//!
//! let report = ConfigValidator::validate(&config);
//! assert!(!report.is_valid());
//! assert_eq!(report.errors.len(), 2);
//! assert_eq!(report.exit_code(), 1);
//! ```

use std::path::{Path, PathBuf};

use super::{ConfigOverrides, ProjectConfig, VALID_LLM_PROVIDERS};

/// Result of configuration validation.
///
/// Contains all errors and warnings found during validation, along with
/// the files that were checked.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Errors that prevent the configuration from being valid.
    pub errors: Vec<String>,
    /// Warnings that don't prevent validity but indicate potential issues.
    pub warnings: Vec<String>,
    /// Config file the settings came from, `None` when running on defaults.
    pub config_source: Option<PathBuf>,
    /// Files that were validated.
    pub files_checked: Vec<PathBuf>,
}

impl ValidationReport {
    /// Create a new empty validation report.
    ///
    /// An empty report is considered valid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the configuration is valid (no errors).
    ///
    /// Warnings do not affect validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns 0 if valid, 1 if invalid.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_valid() {
            0
        } else {
            1
        }
    }

    /// Generate a human-readable summary of the validation result.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_valid() {
            if self.warnings.is_empty() {
                "Configuration is valid.".to_string()
            } else {
                format!(
                    "Configuration is valid with {} warning(s).",
                    self.warnings.len()
                )
            }
        } else {
            format!(
                "Configuration is invalid with {} error(s).",
                self.errors.len()
            )
        }
    }

    /// Generate a verbose report including all details.
    #[must_use]
    pub fn verbose_report(&self) -> String {
        let mut lines = vec![
            "Configuration Validation Report".to_string(),
            "\u{2500}".repeat(50),
            String::new(),
        ];

        match &self.config_source {
            Some(path) => lines.push(format!("Config source: {}", path.display())),
            None => lines.push("Config source: (defaults, no config file found)".to_string()),
        }

        if !self.files_checked.is_empty() {
            lines.push(String::new());
            lines.push(format!("Files checked ({}):", self.files_checked.len()));
            for file in &self.files_checked {
                lines.push(format!("  - {}", file.display()));
            }
        }

        if !self.errors.is_empty() {
            lines.push(String::new());
            lines.push(format!("Errors ({}):", self.errors.len()));
            for error in &self.errors {
                lines.push(format!("  \u{2717} {}", error));
            }
        }

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push(format!("Warnings ({}):", self.warnings.len()));
            for warning in &self.warnings {
                lines.push(format!("  \u{26a0} {}", warning));
            }
        }

        lines.push(String::new());
        lines.push(format!("Status: {}", self.summary()));

        lines.join("\n")
    }
}

/// Validates project configuration.
///
/// [`ConfigValidator::validate`] checks an already-loaded [`ProjectConfig`].
/// [`ConfigValidator::validate_project`] also loads the config from disk and
/// checks that the plan file it points at exists.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    project_dir: PathBuf,
    overrides: ConfigOverrides,
}

impl ConfigValidator {
    /// Create a new validator for the given project directory.
    #[must_use]
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            overrides: ConfigOverrides::default(),
        }
    }

    /// Apply command-line overrides before validating.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Check every field of `config`.
    #[must_use]
    pub fn validate(config: &ProjectConfig) -> ValidationReport {
        let mut report = ValidationReport::new();

        if !config.is_known_llm() {
            report.errors.push(format!(
                "LLM provider must be one of {}, but was '{}'.",
                VALID_LLM_PROVIDERS
                    .iter()
                    .map(|p| format!("'{p}'"))
                    .collect::<Vec<_>>()
                    .join(" or "),
                config.llm
            ));
        }

        if config.validation.max_review_iterations == 0 {
            report
                .errors
                .push("maxReviewIterations must be greater than 0, but was 0.".to_string());
        }

        for (name, value) in [
            ("docs", &config.paths.docs),
            ("context", &config.paths.context),
            ("prompts", &config.paths.prompts),
        ] {
            if value.trim().is_empty() {
                report
                    .errors
                    .push(format!("paths.{name} must be a non-empty string."));
            }
        }

        if config.plan_file.trim().is_empty() {
            report
                .errors
                .push("planFile must be a non-empty string.".to_string());
        }

        if config.validation.commands.is_empty() {
            report
                .warnings
                .push("no validation commands configured".to_string());
        }
        for (name, command) in &config.validation.commands {
            if command.trim().is_empty() {
                report.errors.push(format!(
                    "Validation command '{name}' must have a non-empty command string."
                ));
            }
        }

        report
    }

    /// Load the project's configuration and validate it.
    ///
    /// Load failures are reported as errors rather than returned.
    #[must_use]
    pub fn validate_project(&self) -> ValidationReport {
        let source = match ProjectConfig::locate(&self.project_dir, &self.overrides) {
            Ok(source) => source,
            Err(e) => {
                let mut report = ValidationReport::new();
                report.errors.push(e.to_string());
                return report;
            }
        };

        let config = match ProjectConfig::load(&self.project_dir, &self.overrides) {
            Ok(config) => config,
            Err(e) => {
                let mut report = ValidationReport::new();
                report.errors.push(e.to_string());
                report.files_checked.extend(source.clone());
                report.config_source = source;
                return report;
            }
        };

        let mut report = Self::validate(&config);
        report.files_checked.extend(source.clone());
        report.config_source = source;

        let plan_path = config.plan_path(&self.project_dir);
        if plan_path.is_file() {
            report.files_checked.push(plan_path);
        } else {
            report.warnings.push(format!(
                "plan file not found: {}",
                plan_path.display()
            ));
        }

        report
    }
}
