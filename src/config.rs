//! Configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! the deployment `APP_ENV` variable, then `SENZ_*` variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::SenzError;

/// Default `logFloor`: ln(1e-30)
pub const DEFAULT_PROB_LOWER_BOUND: f64 = -69.07755278982137;

/// Default `mutiMaxNum`
pub const DEFAULT_MAX_HYPOTHESES: usize = 3;

/// Processor and CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment environment: `local`, `test` or `prod`
    pub app_env: String,
    /// Tracing filter directive; derived from `app_env` when unset
    pub log_filter: Option<String>,
    /// Log-probability floor used when a rank request gives none
    pub prob_lower_bound: f64,
    /// Hypotheses kept when a rank request gives no `mutiMaxNum`
    pub max_hypotheses: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_env: "local".to_string(),
            log_filter: None,
            prob_lower_bound: DEFAULT_PROB_LOWER_BOUND,
            max_hypotheses: DEFAULT_MAX_HYPOTHESES,
        }
    }
}

impl Config {
    /// Loads configuration from the environment only.
    pub fn load() -> Result<Self, SenzError> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific TOML file.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, SenzError> {
        let config: Self = Self::figment(config_path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider stack, before extraction
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::raw().only(&["APP_ENV"]))
            .merge(Env::prefixed("SENZ_"))
    }

    pub fn validate(&self) -> Result<(), SenzError> {
        if !self.prob_lower_bound.is_finite() {
            return Err(SenzError::ConfigError(format!(
                "prob_lower_bound must be finite, got {}",
                self.prob_lower_bound
            )));
        }
        Ok(())
    }

    pub fn is_prod(&self) -> bool {
        self.app_env == "prod"
    }

    /// Filter directive for the tracing subscriber
    pub fn effective_log_filter(&self) -> String {
        match &self.log_filter {
            Some(filter) => filter.clone(),
            None if self.is_prod() => "info".to_string(),
            None => "debug".to_string(),
        }
    }
}
