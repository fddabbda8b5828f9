//! Worker domain model.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::error::{ModelError, ModelResult};

/// A worker that can be assigned to shifts.
///
/// Workers are read-only inputs to the solver. `restricted_shifts` lists
/// shift type ids the worker may never be assigned to; `preferred_shifts`
/// is informational and never enforced by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub restricted_shifts: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub preferred_shifts: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Worker {
    /// Creates a worker with no restrictions, preferences, or attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            worker_type: None,
            restricted_shifts: BTreeSet::new(),
            preferred_shifts: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_restricted_shifts<I, S>(mut self, shift_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restricted_shifts = shift_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferred_shifts<I, S>(mut self, shift_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_shifts = shift_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Checks structural invariants.
    ///
    /// Rejects empty ids/names and any overlap between restricted and
    /// preferred shift sets.
    pub fn validate(&self) -> ModelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ModelError::MissingField("worker.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("worker.name"));
        }
        if let Some(overlap) = self
            .restricted_shifts
            .intersection(&self.preferred_shifts)
            .next()
        {
            return Err(ModelError::InvalidValue {
                field: "worker.restricted_shifts",
                message: format!(
                    "shift '{}' is both restricted and preferred for worker '{}'",
                    overlap, self.id
                ),
            });
        }
        Ok(())
    }

    /// Whether this worker is allowed to work the given shift type.
    pub fn can_work_shift(&self, shift_type_id: &str) -> bool {
        !self.restricted_shifts.contains(shift_type_id)
    }
}
