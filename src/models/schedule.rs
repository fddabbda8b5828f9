//! Schedule output model.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::shift::ShiftType;
use crate::models::worker::Worker;

/// Label derived from the length of the first period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Day,
    Week,
    Biweek,
    Month,
    Custom,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Day => "day",
            PeriodType::Week => "week",
            PeriodType::Biweek => "biweek",
            PeriodType::Month => "month",
            PeriodType::Custom => "custom",
        }
    }

    /// Derives the label from a list of inclusive (start, end) ranges.
    ///
    /// Only the first period's length matters; an empty list defaults to
    /// `Week`.
    pub fn derive(period_dates: &[(NaiveDate, NaiveDate)]) -> Self {
        let Some((start, end)) = period_dates.first() else {
            return PeriodType::Week;
        };
        let duration = (*end - *start).num_days() + 1;
        match duration {
            1 => PeriodType::Day,
            7 => PeriodType::Week,
            14 => PeriodType::Biweek,
            28..=31 => PeriodType::Month,
            _ => PeriodType::Custom,
        }
    }
}

/// One assignment of a worker to a shift type within a period.
///
/// `date` is stamped at the period start; date granularity is period-level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInstance {
    pub shift_type_id: String,
    pub period_index: usize,
    pub date: NaiveDate,
    pub worker_id: String,
}

/// All assignments for a single period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAssignment {
    pub period_index: usize,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub assignments: BTreeMap<String, Vec<ShiftInstance>>,
}

impl PeriodAssignment {
    pub fn new(period_index: usize, period_start: NaiveDate, period_end: NaiveDate) -> Self {
        Self {
            period_index,
            period_start,
            period_end,
            assignments: BTreeMap::new(),
        }
    }

    pub fn worker_shifts(&self, worker_id: &str) -> &[ShiftInstance] {
        self.assignments
            .get(worker_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total assignments in this period across all workers.
    pub fn total_assignments(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }
}

/// Per-worker summary counters.
///
/// `shift_counts` is keyed by shift type id and flattened on serialization
/// so the JSON document reads `{"total_shifts": 3, "day": 2, "night": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatistics {
    pub total_shifts: u32,
    pub periods_worked: u32,
    #[serde(flatten)]
    pub shift_counts: BTreeMap<String, u32>,
}

/// A complete generated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period_type: PeriodType,
    pub periods: Vec<PeriodAssignment>,
    pub workers: Vec<Worker>,
    pub shift_types: Vec<ShiftType>,
    #[serde(default)]
    pub statistics: BTreeMap<String, WorkerStatistics>,
}

impl Schedule {
    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    /// All shift instances across every period, in period order.
    pub fn all_instances(&self) -> impl Iterator<Item = &ShiftInstance> {
        self.periods
            .iter()
            .flat_map(|p| p.assignments.values().flatten())
    }

    pub fn worker(&self, worker_id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    pub fn shift_type(&self, shift_type_id: &str) -> Option<&ShiftType> {
        self.shift_types.iter().find(|s| s.id == shift_type_id)
    }
}
