//! Run configuration: solver parameters and the constraint overlay.
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! [solver]
//! time_limit_seconds = 120
//! log_search_progress = true
//!
//! [constraints.fairness]
//! enabled = true
//! weight = 2000
//!
//! [constraints.frequency]
//! enabled = true
//! [constraints.frequency.parameters]
//! max_periods_between = 3
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constraints::{ConstraintConfig, ConstraintParameters};
use crate::solver::registry::with_global_registry;
use crate::solver::shift_solver::SolverOptions;

/// Error raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration for constraint '{constraint_id}': {message}")]
    InvalidConstraint {
        constraint_id: String,
        message: String,
    },
}

/// Solver parameter block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub time_limit_seconds: f64,
    pub num_search_workers: Option<u32>,
    pub relative_gap_limit: Option<f64>,
    pub log_search_progress: bool,
    pub random_seed: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_seconds: 300.0,
            num_search_workers: None,
            relative_gap_limit: None,
            log_search_progress: false,
            random_seed: None,
        }
    }
}

/// Partial per-constraint override; unset fields keep registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintOverride {
    pub enabled: Option<bool>,
    pub is_hard: Option<bool>,
    pub weight: Option<i64>,
    pub parameters: Option<ConstraintParameters>,
}

impl ConstraintOverride {
    fn merge_onto(&self, mut base: ConstraintConfig) -> ConstraintConfig {
        if let Some(enabled) = self.enabled {
            base.enabled = enabled;
        }
        if let Some(is_hard) = self.is_hard {
            base.is_hard = is_hard;
        }
        if let Some(weight) = self.weight {
            base.weight = weight;
        }
        if let Some(parameters) = &self.parameters {
            base.parameters = parameters.clone();
        }
        base
    }
}

/// Full run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub solver: SolverSettings,
    pub constraints: BTreeMap<String, ConstraintOverride>,
}

impl SolverConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (constraint_id, overlay) in &self.constraints {
            if let Some(weight) = overlay.weight {
                if weight < 0 {
                    return Err(ConfigError::InvalidConstraint {
                        constraint_id: constraint_id.clone(),
                        message: format!("weight must be >= 0, got {weight}"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            time_limit_seconds: self.solver.time_limit_seconds,
            num_search_workers: self.solver.num_search_workers,
            relative_gap_limit: self.solver.relative_gap_limit,
            log_search_progress: self.solver.log_search_progress,
            random_seed: self.solver.random_seed,
        }
    }

    /// Resolves the overlay against the registry's defaults into full
    /// per-constraint configurations. Ids the registry does not know are
    /// dropped silently.
    pub fn merged_constraint_configs(&self) -> BTreeMap<String, ConstraintConfig> {
        let mut merged = BTreeMap::new();
        with_global_registry(|registry| {
            for (constraint_id, overlay) in &self.constraints {
                let Some(registration) = registry.get(constraint_id) else {
                    log::debug!("ignoring override for unknown constraint '{constraint_id}'");
                    continue;
                };
                merged.insert(
                    constraint_id.clone(),
                    overlay.merge_onto(registration.default_config.clone()),
                );
            }
        });
        merged
    }
}
