//! Per-constraint configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form parameter map attached to a constraint configuration.
pub type ConstraintParameters = BTreeMap<String, serde_json::Value>;

/// Configuration under which a constraint is instantiated.
///
/// `weight` only matters for the soft posture; `parameters` is interpreted
/// by the individual constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    pub enabled: bool,
    pub is_hard: bool,
    #[serde(default = "default_weight")]
    pub weight: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: ConstraintParameters,
}

fn default_weight() -> i64 {
    100
}

impl ConstraintConfig {
    pub fn hard() -> Self {
        Self {
            enabled: true,
            is_hard: true,
            weight: 0,
            parameters: ConstraintParameters::new(),
        }
    }

    pub fn soft(enabled: bool, weight: i64) -> Self {
        Self {
            enabled,
            is_hard: false,
            weight,
            parameters: ConstraintParameters::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    /// Reads a positive integer parameter, falling back to `default` when
    /// the key is absent or not a positive integer.
    pub fn usize_parameter(&self, key: &str, default: usize) -> usize {
        self.parameters
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .filter(|v| *v > 0)
            .map(|v| v as usize)
            .unwrap_or(default)
    }

    /// Reads a list-of-strings parameter; `None` when absent or malformed.
    pub fn string_list_parameter(&self, key: &str) -> Option<Vec<String>> {
        let values = self.parameters.get(key)?.as_array()?;
        Some(
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }
}
