//! Shared read-only context handed to every constraint.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{
    Availability, AvailabilityType, SchedulingRequest, ShiftFrequencyRequirement,
    ShiftOrderPreference, ShiftType, Worker,
};

/// Everything a constraint may read while emitting model constraints.
///
/// The context is a frozen struct with named fields; a constraint that
/// needs data not present here fails to compile rather than silently
/// skipping work.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    pub workers: &'a [Worker],
    pub shift_types: &'a [ShiftType],
    pub num_periods: usize,
    pub period_dates: &'a [(NaiveDate, NaiveDate)],
    pub availabilities: &'a [Availability],
    pub requests: &'a [SchedulingRequest],
    pub shift_frequency_requirements: &'a [ShiftFrequencyRequirement],
    pub shift_order_preferences: &'a [ShiftOrderPreference],
}

impl<'a> ConstraintContext<'a> {
    /// Indices of periods whose inclusive range intersects `[start, end]`.
    pub fn overlapping_periods(&self, start: NaiveDate, end: NaiveDate) -> Vec<usize> {
        self.period_dates
            .iter()
            .enumerate()
            .filter(|(_, (p_start, p_end))| start <= *p_end && end >= *p_start)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Shift types grouped by category, preserving catalog order.
    pub fn shifts_by_category(&self) -> BTreeMap<&'a str, Vec<&'a ShiftType>> {
        let mut by_category: BTreeMap<&str, Vec<&ShiftType>> = BTreeMap::new();
        for shift_type in self.shift_types {
            by_category
                .entry(shift_type.category.as_str())
                .or_default()
                .push(shift_type);
        }
        by_category
    }

    /// Period indices in which each worker is blanket-unavailable
    /// (an `Unavailable` entry with no shift type filter).
    pub fn unavailability_index(&self) -> BTreeMap<&'a str, Vec<usize>> {
        let mut index: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for avail in self.availabilities {
            if avail.availability_type != AvailabilityType::Unavailable {
                continue;
            }
            if avail.shift_type_id.is_some() {
                continue;
            }
            let periods = self.overlapping_periods(avail.start_date, avail.end_date);
            let entry = index.entry(avail.worker_id.as_str()).or_default();
            for period in periods {
                if !entry.contains(&period) {
                    entry.push(period);
                }
            }
        }
        for periods in index.values_mut() {
            periods.sort_unstable();
        }
        index
    }

    /// Weekdays (0 = Monday) covered by a period, capped at one cycle.
    pub fn period_weekdays(&self, period: usize) -> Vec<u8> {
        let Some((start, end)) = self.period_dates.get(period).copied() else {
            return Vec::new();
        };
        let span = ((end - start).num_days() + 1).min(7);
        (0..span)
            .map(|offset| {
                let date = start + chrono::Duration::days(offset);
                date.weekday().num_days_from_monday() as u8
            })
            .collect()
    }
}
