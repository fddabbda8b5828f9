//! Shift type domain model.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::error::{ModelError, ModelResult};

/// A named category of work with a daily time window and a staffing demand.
///
/// `workers_required` is the minimum number of workers every active period
/// must staff for this shift type. `applicable_days` restricts the shift to
/// a subset of weekdays (0 = Monday .. 6 = Sunday); `None` means every day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftType {
    pub id: String,
    pub name: String,
    pub category: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_hours: f64,
    pub workers_required: u32,
    #[serde(default)]
    pub is_undesirable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_days: Option<BTreeSet<u8>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub required_attributes: BTreeMap<String, String>,
}

impl ShiftType {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        duration_hours: f64,
        workers_required: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            start_time,
            end_time,
            duration_hours,
            workers_required,
            is_undesirable: false,
            applicable_days: None,
            required_attributes: BTreeMap::new(),
        }
    }

    pub fn undesirable(mut self) -> Self {
        self.is_undesirable = true;
        self
    }

    pub fn with_applicable_days<I: IntoIterator<Item = u8>>(mut self, days: I) -> Self {
        self.applicable_days = Some(days.into_iter().collect());
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ModelError::MissingField("shift_type.id"));
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("shift_type.name"));
        }
        if self.duration_hours <= 0.0 {
            return Err(ModelError::InvalidValue {
                field: "shift_type.duration_hours",
                message: format!("must be > 0, got {}", self.duration_hours),
            });
        }
        if self.workers_required == 0 {
            return Err(ModelError::InvalidValue {
                field: "shift_type.workers_required",
                message: "must be >= 1".to_string(),
            });
        }
        if let Some(days) = &self.applicable_days {
            if let Some(bad) = days.iter().find(|d| **d > 6) {
                return Err(ModelError::InvalidValue {
                    field: "shift_type.applicable_days",
                    message: format!("weekday index {} is outside 0..=6", bad),
                });
            }
        }
        Ok(())
    }

    /// Whether this shift type is active on the given weekday (0 = Monday).
    pub fn applies_on_weekday(&self, weekday: u8) -> bool {
        match &self.applicable_days {
            Some(days) => days.contains(&weekday),
            None => true,
        }
    }
}
