//! Engine configuration, loaded from TOML.
//!
//! Every section is optional; missing keys take the documented defaults.
//!
//! ```toml
//! [assembler]
//! min_bars = 50
//!
//! [rules]
//! buy_score = 2.0
//!
//! [scoring]
//! strategy = "rule"
//! include_probabilities = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::features::AssemblerConfig;
use crate::labels::LabelConfig;
use crate::reasoning::ReasoningConfig;
use crate::scoring::{RuleConfig, ScoringStrategy};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Strategy selection and output options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub strategy: ScoringStrategy,
    /// Attach per-action probabilities to classifier-backed signals.
    pub include_probabilities: bool,
}

/// Complete configuration of the signal pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub assembler: AssemblerConfig,
    pub rules: RuleConfig,
    pub reasoning: ReasoningConfig,
    pub labels: LabelConfig,
    pub scoring: ScoringConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assembler.validate()?;
        self.rules.validate()?;
        self.reasoning.validate()?;
        self.labels.validate()?;
        Ok(())
    }
}
