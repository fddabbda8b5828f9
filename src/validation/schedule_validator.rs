//! Post-solve schedule validation and statistics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Availability, AvailabilityType, Schedule, SchedulingRequest};

/// Category of a post-solve violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Coverage,
    Restriction,
    Availability,
    Data,
}

/// One violated invariant with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Fairness summary over per-worker assignment counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FairnessStats {
    pub average_assignments: f64,
    pub std_deviation: f64,
    pub min_assignments: u32,
    pub max_assignments: u32,
    pub average_undesirable: f64,
}

/// Request fulfillment summary, date-granular over each request's range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFulfillmentStats {
    pub total_requests: u32,
    pub fulfilled: u32,
    pub violated: u32,
    pub rate: f64,
}

impl Default for RequestFulfillmentStats {
    fn default() -> Self {
        Self {
            total_requests: 0,
            fulfilled: 0,
            violated: 0,
            rate: 1.0,
        }
    }
}

/// Counts of non-enforced availability hints, carried for downstream use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityHintStats {
    pub preferred: u32,
    pub required: u32,
}

/// Aggregate statistics computed during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    pub total_assignments: u32,
    pub assignments_per_worker: BTreeMap<String, u32>,
    pub fairness: FairnessStats,
    pub request_fulfillment: RequestFulfillmentStats,
    pub availability_hints: AvailabilityHintStats,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Violation>,
    pub statistics: ValidationStatistics,
}

impl ValidationOutcome {
    fn add_violation(&mut self, violation: Violation) {
        self.is_valid = false;
        self.violations.push(violation);
    }
}

/// Independently re-verifies an extracted schedule against the enforced
/// invariants (coverage, restrictions, availability) and computes fairness
/// and request-fulfillment statistics.
///
/// The checks deliberately do not share code with the constraint library:
/// they recount assignments from the schedule itself.
pub struct ScheduleValidator<'a> {
    schedule: &'a Schedule,
    availabilities: &'a [Availability],
    requests: &'a [SchedulingRequest],
}

impl<'a> ScheduleValidator<'a> {
    pub fn new(
        schedule: &'a Schedule,
        availabilities: &'a [Availability],
        requests: &'a [SchedulingRequest],
    ) -> Self {
        Self {
            schedule,
            availabilities,
            requests,
        }
    }

    pub fn validate(&self) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            is_valid: true,
            ..ValidationOutcome::default()
        };

        self.validate_coverage(&mut outcome);
        self.validate_restrictions(&mut outcome);
        self.validate_availability(&mut outcome);
        self.compute_statistics(&mut outcome);
        self.compute_request_fulfillment(&mut outcome);

        if outcome.is_valid {
            log::info!("schedule '{}' passed validation", self.schedule.schedule_id);
        } else {
            log::warn!(
                "schedule '{}' failed validation with {} violations",
                self.schedule.schedule_id,
                outcome.violations.len()
            );
            for violation in &outcome.violations {
                log::warn!("  {:?}: {}", violation.kind, violation.message);
            }
        }
        outcome
    }

    fn validate_coverage(&self, outcome: &mut ValidationOutcome) {
        for period in &self.schedule.periods {
            let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
            for shifts in period.assignments.values() {
                for shift in shifts {
                    *counts.entry(shift.shift_type_id.as_str()).or_default() += 1;
                }
            }

            for shift_type in &self.schedule.shift_types {
                let count = counts.get(shift_type.id.as_str()).copied().unwrap_or(0);
                let active = period_has_applicable_day(
                    period.period_start,
                    period.period_end,
                    shift_type,
                );
                if active && count < shift_type.workers_required {
                    outcome.add_violation(Violation {
                        kind: ViolationKind::Coverage,
                        message: format!(
                            "Period {}: shift '{}' has {} workers, requires {}",
                            period.period_index,
                            shift_type.name,
                            count,
                            shift_type.workers_required
                        ),
                        period_index: Some(period.period_index),
                        worker_id: None,
                        shift_type_id: Some(shift_type.id.clone()),
                        date: None,
                    });
                }
            }
        }
    }

    fn validate_restrictions(&self, outcome: &mut ValidationOutcome) {
        for period in &self.schedule.periods {
            for (worker_id, shifts) in &period.assignments {
                let Some(worker) = self.schedule.worker(worker_id) else {
                    outcome.add_violation(Violation {
                        kind: ViolationKind::Data,
                        message: format!("Unknown worker '{}' in assignments", worker_id),
                        period_index: Some(period.period_index),
                        worker_id: Some(worker_id.clone()),
                        shift_type_id: None,
                        date: None,
                    });
                    continue;
                };

                for shift in shifts {
                    if !worker.can_work_shift(&shift.shift_type_id) {
                        let shift_name = self
                            .schedule
                            .shift_type(&shift.shift_type_id)
                            .map(|s| s.name.clone())
                            .unwrap_or_else(|| shift.shift_type_id.clone());
                        outcome.add_violation(Violation {
                            kind: ViolationKind::Restriction,
                            message: format!(
                                "Worker '{}' assigned to restricted shift '{}' on {}",
                                worker.name, shift_name, shift.date
                            ),
                            period_index: Some(period.period_index),
                            worker_id: Some(worker_id.clone()),
                            shift_type_id: Some(shift.shift_type_id.clone()),
                            date: Some(shift.date),
                        });
                        continue;
                    }

                    let attribute_gap = self
                        .schedule
                        .shift_type(&shift.shift_type_id)
                        .map(|shift_type| {
                            !crate::constraints::restriction::worker_meets_attributes(
                                worker, shift_type,
                            )
                        })
                        .unwrap_or(false);
                    if attribute_gap {
                        outcome.add_violation(Violation {
                            kind: ViolationKind::Restriction,
                            message: format!(
                                "Worker '{}' lacks the attributes required by shift '{}'",
                                worker.name, shift.shift_type_id
                            ),
                            period_index: Some(period.period_index),
                            worker_id: Some(worker_id.clone()),
                            shift_type_id: Some(shift.shift_type_id.clone()),
                            date: Some(shift.date),
                        });
                    }
                }
            }
        }
    }

    fn validate_availability(&self, outcome: &mut ValidationOutcome) {
        for avail in self.availabilities {
            if avail.availability_type != AvailabilityType::Unavailable {
                continue;
            }
            for period in &self.schedule.periods {
                if !avail.overlaps(period.period_start, period.period_end) {
                    continue;
                }
                for shift in period.worker_shifts(&avail.worker_id) {
                    let applies = match &avail.shift_type_id {
                        Some(shift_type_id) => shift_type_id == &shift.shift_type_id,
                        None => true,
                    };
                    if applies {
                        let worker_name = self
                            .schedule
                            .worker(&avail.worker_id)
                            .map(|w| w.name.clone())
                            .unwrap_or_else(|| avail.worker_id.clone());
                        outcome.add_violation(Violation {
                            kind: ViolationKind::Availability,
                            message: format!(
                                "Worker '{}' assigned in period {} but marked unavailable",
                                worker_name, period.period_index
                            ),
                            period_index: Some(period.period_index),
                            worker_id: Some(avail.worker_id.clone()),
                            shift_type_id: Some(shift.shift_type_id.clone()),
                            date: Some(shift.date),
                        });
                    }
                }
            }
        }
    }

    fn compute_statistics(&self, outcome: &mut ValidationOutcome) {
        let mut per_worker: BTreeMap<String, u32> = BTreeMap::new();
        let mut undesirable_per_worker: BTreeMap<String, u32> = BTreeMap::new();
        let mut total = 0u32;

        for period in &self.schedule.periods {
            for (worker_id, shifts) in &period.assignments {
                for shift in shifts {
                    total += 1;
                    *per_worker.entry(worker_id.clone()).or_default() += 1;
                    let undesirable = self
                        .schedule
                        .shift_type(&shift.shift_type_id)
                        .map(|s| s.is_undesirable)
                        .unwrap_or(false);
                    if undesirable {
                        *undesirable_per_worker.entry(worker_id.clone()).or_default() += 1;
                    }
                }
            }
        }

        outcome.statistics.total_assignments = total;
        outcome.statistics.fairness = if per_worker.is_empty() {
            FairnessStats::default()
        } else {
            let counts: Vec<u32> = per_worker.values().copied().collect();
            let n = counts.len() as f64;
            let mean = counts.iter().sum::<u32>() as f64 / n;
            let variance = counts
                .iter()
                .map(|c| (*c as f64 - mean).powi(2))
                .sum::<f64>()
                / n;
            let undesirable_mean = if undesirable_per_worker.is_empty() {
                0.0
            } else {
                undesirable_per_worker.values().sum::<u32>() as f64
                    / undesirable_per_worker.len() as f64
            };
            FairnessStats {
                average_assignments: mean,
                std_deviation: variance.sqrt(),
                min_assignments: counts.iter().min().copied().unwrap_or(0),
                max_assignments: counts.iter().max().copied().unwrap_or(0),
                average_undesirable: undesirable_mean,
            }
        };
        outcome.statistics.assignments_per_worker = per_worker;

        for avail in self.availabilities {
            match avail.availability_type {
                AvailabilityType::Preferred => outcome.statistics.availability_hints.preferred += 1,
                AvailabilityType::Required => outcome.statistics.availability_hints.required += 1,
                AvailabilityType::Unavailable => {}
            }
        }
    }

    fn compute_request_fulfillment(&self, outcome: &mut ValidationOutcome) {
        if self.requests.is_empty() {
            outcome.statistics.request_fulfillment = RequestFulfillmentStats::default();
            return;
        }

        // (worker, date, shift type) lookup of actual assignments.
        let mut assigned: std::collections::HashSet<(&str, NaiveDate, &str)> =
            std::collections::HashSet::new();
        for instance in self.schedule.all_instances() {
            assigned.insert((
                instance.worker_id.as_str(),
                instance.date,
                instance.shift_type_id.as_str(),
            ));
        }

        let horizon: Vec<(NaiveDate, NaiveDate)> = self
            .schedule
            .periods
            .iter()
            .map(|p| (p.period_start, p.period_end))
            .collect();

        let mut fulfilled = 0u32;
        let mut violated = 0u32;
        for request in self.requests {
            let mut current = request.start_date;
            while current <= request.end_date {
                // Dates outside every period are ignored.
                let in_horizon = horizon
                    .iter()
                    .any(|(start, end)| *start <= current && current <= *end);
                if in_horizon {
                    let is_assigned = assigned.contains(&(
                        request.worker_id.as_str(),
                        current,
                        request.shift_type_id.as_str(),
                    ));
                    if is_assigned == request.is_positive() {
                        fulfilled += 1;
                    } else {
                        violated += 1;
                    }
                }
                current += chrono::Duration::days(1);
            }
        }

        let total = fulfilled + violated;
        outcome.statistics.request_fulfillment = RequestFulfillmentStats {
            total_requests: total,
            fulfilled,
            violated,
            rate: if total > 0 {
                fulfilled as f64 / total as f64
            } else {
                1.0
            },
        };
    }
}

fn period_has_applicable_day(
    period_start: NaiveDate,
    period_end: NaiveDate,
    shift_type: &crate::models::ShiftType,
) -> bool {
    use chrono::Datelike;
    let span = ((period_end - period_start).num_days() + 1).min(7);
    (0..span).any(|offset| {
        let date = period_start + chrono::Duration::days(offset);
        shift_type.applies_on_weekday(date.weekday().num_days_from_monday() as u8)
    })
}
