//! Availability, request, and preference input records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::error::{ModelError, ModelResult};

/// How an availability entry should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityType {
    /// Hard prohibition for overlapping periods.
    Unavailable,
    /// Informational hint; carried through for statistics.
    Preferred,
    /// Informational hint; carried through for statistics.
    Required,
}

impl AvailabilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityType::Unavailable => "unavailable",
            AvailabilityType::Preferred => "preferred",
            AvailabilityType::Required => "required",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unavailable" => Some(AvailabilityType::Unavailable),
            "preferred" => Some(AvailabilityType::Preferred),
            "required" => Some(AvailabilityType::Required),
            _ => None,
        }
    }
}

/// Worker availability entry over an inclusive date range.
///
/// When `shift_type_id` is set the entry applies only to that shift type;
/// otherwise it applies to every shift type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub worker_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub availability_type: AvailabilityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type_id: Option<String>,
}

impl Availability {
    pub fn new(
        worker_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        availability_type: AvailabilityType,
        shift_type_id: Option<String>,
    ) -> ModelResult<Self> {
        let entry = Self {
            worker_id: worker_id.into(),
            start_date,
            end_date,
            availability_type,
            shift_type_id,
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.worker_id.trim().is_empty() {
            return Err(ModelError::MissingField("availability.worker_id"));
        }
        if self.end_date < self.start_date {
            return Err(ModelError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Inclusive duration of this entry in days.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether this entry's date range intersects the inclusive range
    /// `[period_start, period_end]`.
    pub fn overlaps(&self, period_start: NaiveDate, period_end: NaiveDate) -> bool {
        self.start_date <= period_end && self.end_date >= period_start
    }
}

/// Sign of a scheduling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Positive,
    Negative,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Positive => "positive",
            RequestKind::Negative => "negative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(RequestKind::Positive),
            "negative" => Some(RequestKind::Negative),
            _ => None,
        }
    }
}

/// A worker's request to work (positive) or avoid (negative) a shift type
/// over an inclusive date range.
///
/// `is_hard` pins the assignment when `Some(true)`, forces the soft posture
/// when `Some(false)`, and defers to the request constraint's configuration
/// when `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRequest {
    pub worker_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub request_type: RequestKind,
    pub shift_type_id: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hard: Option<bool>,
}

fn default_priority() -> i64 {
    1
}

impl SchedulingRequest {
    pub fn new(
        worker_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        request_type: RequestKind,
        shift_type_id: impl Into<String>,
        priority: i64,
    ) -> ModelResult<Self> {
        let request = Self {
            worker_id: worker_id.into(),
            start_date,
            end_date,
            request_type,
            shift_type_id: shift_type_id.into(),
            priority,
            is_hard: None,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn hard(mut self) -> Self {
        self.is_hard = Some(true);
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.worker_id.trim().is_empty() {
            return Err(ModelError::MissingField("request.worker_id"));
        }
        if self.shift_type_id.trim().is_empty() {
            return Err(ModelError::MissingField("request.shift_type_id"));
        }
        if self.end_date < self.start_date {
            return Err(ModelError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.priority < 1 {
            return Err(ModelError::InvalidValue {
                field: "request.priority",
                message: format!("must be >= 1, got {}", self.priority),
            });
        }
        Ok(())
    }

    pub fn is_positive(&self) -> bool {
        self.request_type == RequestKind::Positive
    }

    pub fn overlaps(&self, period_start: NaiveDate, period_end: NaiveDate) -> bool {
        self.start_date <= period_end && self.end_date >= period_start
    }
}

/// Per-worker requirement to work at least one of a set of shift types in
/// every sliding window of `max_periods_between` consecutive periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftFrequencyRequirement {
    pub worker_id: String,
    pub shift_types: BTreeSet<String>,
    pub max_periods_between: usize,
}

impl ShiftFrequencyRequirement {
    pub fn new<I, S>(
        worker_id: impl Into<String>,
        shift_types: I,
        max_periods_between: usize,
    ) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requirement = Self {
            worker_id: worker_id.into(),
            shift_types: shift_types.into_iter().map(Into::into).collect(),
            max_periods_between,
        };
        requirement.validate()?;
        Ok(requirement)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.worker_id.trim().is_empty() {
            return Err(ModelError::MissingField("shift_frequency.worker_id"));
        }
        if self.shift_types.is_empty() {
            return Err(ModelError::InvalidValue {
                field: "shift_frequency.shift_types",
                message: "must not be empty".to_string(),
            });
        }
        if self.max_periods_between == 0 {
            return Err(ModelError::InvalidValue {
                field: "shift_frequency.max_periods_between",
                message: "must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Condition that triggers a shift order preference at some period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OrderTrigger {
    /// The worker works this shift type.
    ShiftType(String),
    /// The worker works any shift in this category.
    Category(String),
    /// The worker is unavailable in the trigger period.
    Unavailability,
}

/// What should be assigned in the adjacent period when a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OrderTarget {
    ShiftType(String),
    Category(String),
}

/// Whether the preferred assignment sits after or before the trigger period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Preferred at period N+1 when the trigger fires at N.
    After,
    /// Preferred at period N when the trigger fires at N+1.
    Before,
}

/// Preference for shift transitions between adjacent periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftOrderPreference {
    pub rule_id: String,
    pub trigger: OrderTrigger,
    pub direction: Direction,
    pub preferred: OrderTarget,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_ids: Option<BTreeSet<String>>,
}

impl ShiftOrderPreference {
    pub fn validate(&self) -> ModelResult<()> {
        if self.rule_id.trim().is_empty() {
            return Err(ModelError::MissingField("shift_order.rule_id"));
        }
        if self.priority < 1 {
            return Err(ModelError::InvalidValue {
                field: "shift_order.priority",
                message: format!("must be >= 1, got {}", self.priority),
            });
        }
        match &self.trigger {
            OrderTrigger::ShiftType(id) | OrderTrigger::Category(id) if id.trim().is_empty() => {
                return Err(ModelError::MissingField("shift_order.trigger"));
            }
            _ => {}
        }
        match &self.preferred {
            OrderTarget::ShiftType(id) | OrderTarget::Category(id) if id.trim().is_empty() => {
                return Err(ModelError::MissingField("shift_order.preferred"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Whether this rule applies to the given worker.
    pub fn applies_to(&self, worker_id: &str) -> bool {
        match &self.worker_ids {
            Some(ids) => ids.contains(worker_id),
            None => true,
        }
    }
}
