//! Configuration validation.

use crate::error::ConfigError;
use crate::loader::ConfigLoader;
use crate::schema::{Config, KNOWN_MODES};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_scheduler(config, &mut result);
        Self::validate_page(config, &mut result);
        Self::validate_surface(config, &mut result);
        Self::validate_solvers(config, &mut result);
        Self::validate_actions(config, &mut result);

        Ok(result)
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        if config.scheduler.interval_ms == 0 {
            result.add_error(ValidationError::new(
                "scheduler.interval_ms",
                "interval_ms must be greater than 0",
            ));
        } else if config.scheduler.interval_ms < 100 {
            result.add_warning(ValidationWarning::new(
                "scheduler.interval_ms",
                "interval_ms below 100 polls the page very aggressively",
            ));
        }

        if config.scheduler.cycle_timeout_ms == Some(0) {
            result.add_error(ValidationError::new(
                "scheduler.cycle_timeout_ms",
                "cycle_timeout_ms must be greater than 0 when set",
            ));
        }
    }

    fn validate_page(config: &Config, result: &mut ValidationResult) {
        if config.page.surface_selector.trim().is_empty() {
            result.add_error(ValidationError::new(
                "page.surface_selector",
                "surface_selector cannot be empty",
            ));
        }
    }

    fn validate_surface(config: &Config, result: &mut ValidationResult) {
        if config.surface.log_capacity == 0 {
            result.add_error(ValidationError::new(
                "surface.log_capacity",
                "log_capacity must be greater than 0",
            ));
        }
    }

    fn validate_solvers(config: &Config, result: &mut ValidationResult) {
        for (mode, path) in &config.solvers {
            let field = format!("solvers.{}", mode);
            if !KNOWN_MODES.contains(&mode.as_str()) {
                result.add_error(ValidationError::new(
                    field,
                    format!("Unknown mode '{}'", mode),
                ));
            } else if !ConfigLoader::expand_path(&path.to_string_lossy()).exists() {
                result.add_warning(ValidationWarning::new(
                    field,
                    format!("Solver script not found: {}", path.display()),
                ));
            }
        }

        for mode in KNOWN_MODES {
            if !config.solvers.contains_key(mode) {
                result.add_warning(ValidationWarning::new(
                    format!("solvers.{}", mode),
                    "No solver configured; cycles in this mode will never act",
                ));
            }
        }
    }

    fn validate_actions(config: &Config, result: &mut ValidationResult) {
        let mut seen = std::collections::HashSet::new();
        for (i, action) in config.privileged_actions.iter().enumerate() {
            let field = format!("privileged_actions[{}]", i);
            if action.name.trim().is_empty() {
                result.add_error(ValidationError::new(field.clone(), "name cannot be empty"));
            }
            if !seen.insert(action.name.as_str()) {
                result.add_error(ValidationError::new(
                    field.clone(),
                    format!("Duplicate action name '{}'", action.name),
                ));
            }
            if !ConfigLoader::expand_path(&action.script.to_string_lossy()).exists() {
                result.add_warning(ValidationWarning::new(
                    field,
                    format!("Action script not found: {}", action.script.display()),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
