//! Pre-solve feasibility checks.
//!
//! A cheap rule-by-rule pass that rejects inputs no solver could satisfy:
//! not enough eligible workers for a staffing demand, or hard-pinned
//! requests colliding with restrictions and unavailability. Running it
//! first saves a full model build on hopeless inputs and produces issues a
//! human can act on, which a bare UNSAT never does.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constraints::restriction::worker_meets_attributes;
use crate::models::{
    Availability, AvailabilityType, SchedulingRequest, ShiftType, Worker,
};

/// Category of a feasibility problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityIssueKind {
    /// Fewer eligible workers than `workers_required` for a (period,
    /// shift type) pair.
    CoverageGap,
    /// A hard positive request the worker cannot fulfill.
    ConflictingRequest,
}

/// One structured reason the inputs are unsatisfiable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityIssue {
    pub kind: FeasibilityIssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
}

/// Verdict of the pre-solve pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibilityResult {
    pub is_feasible: bool,
    pub issues: Vec<FeasibilityIssue>,
}

/// Rule-by-rule pre-solve checker.
pub struct FeasibilityChecker<'a> {
    workers: &'a [Worker],
    shift_types: &'a [ShiftType],
    period_dates: &'a [(NaiveDate, NaiveDate)],
    availabilities: &'a [Availability],
    requests: &'a [SchedulingRequest],
}

impl<'a> FeasibilityChecker<'a> {
    pub fn new(
        workers: &'a [Worker],
        shift_types: &'a [ShiftType],
        period_dates: &'a [(NaiveDate, NaiveDate)],
        availabilities: &'a [Availability],
        requests: &'a [SchedulingRequest],
    ) -> Self {
        Self {
            workers,
            shift_types,
            period_dates,
            availabilities,
            requests,
        }
    }

    pub fn check(&self) -> FeasibilityResult {
        let mut issues = Vec::new();
        self.check_coverage(&mut issues);
        self.check_hard_positive_requests(&mut issues);
        FeasibilityResult {
            is_feasible: issues.is_empty(),
            issues,
        }
    }

    fn check_coverage(&self, issues: &mut Vec<FeasibilityIssue>) {
        for (period, (p_start, p_end)) in self.period_dates.iter().enumerate() {
            let blanket_out: HashSet<&str> = self
                .availabilities
                .iter()
                .filter(|a| {
                    a.availability_type == AvailabilityType::Unavailable
                        && a.shift_type_id.is_none()
                        && a.overlaps(*p_start, *p_end)
                })
                .map(|a| a.worker_id.as_str())
                .collect();

            for shift_type in self.shift_types {
                if !self.shift_active_in_period(shift_type, *p_start, *p_end) {
                    continue;
                }

                let shift_out: HashSet<&str> = self
                    .availabilities
                    .iter()
                    .filter(|a| {
                        a.availability_type == AvailabilityType::Unavailable
                            && a.shift_type_id.as_deref() == Some(shift_type.id.as_str())
                            && a.overlaps(*p_start, *p_end)
                    })
                    .map(|a| a.worker_id.as_str())
                    .collect();

                let pinned_away: HashSet<&str> = self
                    .requests
                    .iter()
                    .filter(|r| {
                        r.is_hard == Some(true)
                            && !r.is_positive()
                            && r.shift_type_id == shift_type.id
                            && r.overlaps(*p_start, *p_end)
                    })
                    .map(|r| r.worker_id.as_str())
                    .collect();

                let eligible = self
                    .workers
                    .iter()
                    .filter(|w| w.can_work_shift(&shift_type.id))
                    .filter(|w| worker_meets_attributes(w, shift_type))
                    .filter(|w| !blanket_out.contains(w.id.as_str()))
                    .filter(|w| !shift_out.contains(w.id.as_str()))
                    .filter(|w| !pinned_away.contains(w.id.as_str()))
                    .count();

                if eligible < shift_type.workers_required as usize {
                    issues.push(FeasibilityIssue {
                        kind: FeasibilityIssueKind::CoverageGap,
                        message: format!(
                            "Period {}: shift '{}' needs {} workers but only {} are eligible",
                            period, shift_type.name, shift_type.workers_required, eligible
                        ),
                        period_index: Some(period),
                        shift_type_id: Some(shift_type.id.clone()),
                        worker_id: None,
                    });
                }
            }
        }
    }

    fn check_hard_positive_requests(&self, issues: &mut Vec<FeasibilityIssue>) {
        let shift_ids: BTreeSet<&str> = self.shift_types.iter().map(|s| s.id.as_str()).collect();

        for request in self.requests {
            if request.is_hard != Some(true) || !request.is_positive() {
                continue;
            }
            if !shift_ids.contains(request.shift_type_id.as_str()) {
                continue;
            }
            let Some(worker) = self.workers.iter().find(|w| w.id == request.worker_id) else {
                continue;
            };
            if !worker.can_work_shift(&request.shift_type_id) {
                issues.push(FeasibilityIssue {
                    kind: FeasibilityIssueKind::ConflictingRequest,
                    message: format!(
                        "Worker '{}' is pinned onto shift '{}' but restricted from it",
                        request.worker_id, request.shift_type_id
                    ),
                    period_index: None,
                    shift_type_id: Some(request.shift_type_id.clone()),
                    worker_id: Some(request.worker_id.clone()),
                });
                continue;
            }

            for (period, (p_start, p_end)) in self.period_dates.iter().enumerate() {
                if !request.overlaps(*p_start, *p_end) {
                    continue;
                }
                let blocked = self.availabilities.iter().any(|a| {
                    a.availability_type == AvailabilityType::Unavailable
                        && a.worker_id == request.worker_id
                        && a.overlaps(*p_start, *p_end)
                        && (a.shift_type_id.is_none()
                            || a.shift_type_id.as_deref() == Some(request.shift_type_id.as_str()))
                });
                if blocked {
                    issues.push(FeasibilityIssue {
                        kind: FeasibilityIssueKind::ConflictingRequest,
                        message: format!(
                            "Worker '{}' is pinned onto shift '{}' in period {} but unavailable",
                            request.worker_id, request.shift_type_id, period
                        ),
                        period_index: Some(period),
                        shift_type_id: Some(request.shift_type_id.clone()),
                        worker_id: Some(request.worker_id.clone()),
                    });
                }
            }
        }
    }

    fn shift_active_in_period(
        &self,
        shift_type: &ShiftType,
        p_start: NaiveDate,
        p_end: NaiveDate,
    ) -> bool {
        use chrono::Datelike;
        let span = ((p_end - p_start).num_days() + 1).min(7);
        (0..span).any(|offset| {
            let date = p_start + chrono::Duration::days(offset);
            shift_type.applies_on_weekday(date.weekday().num_days_from_monday() as u8)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestKind;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekly_periods(n: usize) -> Vec<(NaiveDate, NaiveDate)> {
        let start = date(2026, 1, 5);
        (0..n)
            .map(|i| {
                let s = start + chrono::Duration::weeks(i as i64);
                (s, s + chrono::Duration::days(6))
            })
            .collect()
    }

    fn shift(id: &str, required: u32) -> ShiftType {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        ShiftType::new(id, id, id, t(7), t(15), 8.0, required)
    }

    #[test]
    fn sufficient_workforce_is_feasible() {
        let workers = vec![Worker::new("W001", "Alice"), Worker::new("W002", "Bob")];
        let shift_types = vec![shift("day", 2)];
        let periods = weekly_periods(2);
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &[]);
        let result = checker.check();
        assert!(result.is_feasible);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn single_worker_cannot_cover_two_slots() {
        let workers = vec![Worker::new("W001", "Alice")];
        let shift_types = vec![shift("day", 2)];
        let periods = weekly_periods(1);
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &[]);
        let result = checker.check();
        assert!(!result.is_feasible);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.kind, FeasibilityIssueKind::CoverageGap);
        assert!(issue.message.contains("needs 2 workers but only 1"));
    }

    #[test]
    fn restrictions_shrink_the_eligible_pool() {
        let workers = vec![
            Worker::new("W001", "Alice").with_restricted_shifts(["day"]),
            Worker::new("W002", "Bob"),
        ];
        let shift_types = vec![shift("day", 2)];
        let periods = weekly_periods(1);
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &[]);
        assert!(!checker.check().is_feasible);
    }

    #[test]
    fn required_attributes_shrink_the_eligible_pool() {
        let mut workers = vec![Worker::new("W001", "Alice"), Worker::new("W002", "Bob")];
        workers[0]
            .attributes
            .insert("certification".to_string(), "icu".to_string());
        let mut shift_types = vec![shift("day", 2)];
        shift_types[0]
            .required_attributes
            .insert("certification".to_string(), "icu".to_string());
        let periods = weekly_periods(1);
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &[]);
        let result = checker.check();
        assert!(!result.is_feasible);
        assert!(result.issues[0].message.contains("only 1 are eligible"));
    }

    #[test]
    fn unavailability_shrinks_the_pool_only_in_overlap() {
        let workers = vec![Worker::new("W001", "Alice"), Worker::new("W002", "Bob")];
        let shift_types = vec![shift("day", 2)];
        let periods = weekly_periods(2);
        let availabilities = vec![Availability::new(
            "W001",
            date(2026, 1, 6),
            date(2026, 1, 7),
            AvailabilityType::Unavailable,
            None,
        )
        .unwrap()];
        let checker =
            FeasibilityChecker::new(&workers, &shift_types, &periods, &availabilities, &[]);
        let result = checker.check();
        assert!(!result.is_feasible);
        // Only period 0 overlaps the leave.
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].period_index, Some(0));
    }

    #[test]
    fn hard_negative_pin_counts_as_exclusion() {
        let workers = vec![Worker::new("W001", "Alice"), Worker::new("W002", "Bob")];
        let shift_types = vec![shift("day", 2)];
        let periods = weekly_periods(1);
        let requests = vec![SchedulingRequest::new(
            "W002",
            date(2026, 1, 5),
            date(2026, 1, 11),
            RequestKind::Negative,
            "day",
            1,
        )
        .unwrap()
        .hard()];
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &requests);
        assert!(!checker.check().is_feasible);
    }

    #[test]
    fn hard_positive_pin_against_restriction_is_flagged() {
        let workers = vec![
            Worker::new("W001", "Alice").with_restricted_shifts(["day"]),
            Worker::new("W002", "Bob"),
        ];
        let shift_types = vec![shift("day", 1)];
        let periods = weekly_periods(1);
        let requests = vec![SchedulingRequest::new(
            "W001",
            date(2026, 1, 5),
            date(2026, 1, 11),
            RequestKind::Positive,
            "day",
            1,
        )
        .unwrap()
        .hard()];
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &requests);
        let result = checker.check();
        assert!(!result.is_feasible);
        assert!(result
            .issues
            .iter()
            .any(|i| i.kind == FeasibilityIssueKind::ConflictingRequest));
    }

    #[test]
    fn hard_positive_pin_during_leave_is_flagged() {
        let workers = vec![Worker::new("W001", "Alice"), Worker::new("W002", "Bob")];
        let shift_types = vec![shift("day", 1)];
        let periods = weekly_periods(2);
        let availabilities = vec![Availability::new(
            "W001",
            date(2026, 1, 5),
            date(2026, 1, 11),
            AvailabilityType::Unavailable,
            None,
        )
        .unwrap()];
        let requests = vec![SchedulingRequest::new(
            "W001",
            date(2026, 1, 5),
            date(2026, 1, 11),
            RequestKind::Positive,
            "day",
            1,
        )
        .unwrap()
        .hard()];
        let checker = FeasibilityChecker::new(
            &workers,
            &shift_types,
            &periods,
            &availabilities,
            &requests,
        );
        let result = checker.check();
        assert!(!result.is_feasible);
        let issue = result
            .issues
            .iter()
            .find(|i| i.kind == FeasibilityIssueKind::ConflictingRequest)
            .unwrap();
        assert_eq!(issue.worker_id.as_deref(), Some("W001"));
        assert_eq!(issue.period_index, Some(0));
    }

    #[test]
    fn inactive_weekday_shift_needs_no_coverage() {
        // Single Saturday period with a weekday-only shift.
        let workers = vec![Worker::new("W001", "Alice")];
        let mut shift_types = vec![shift("day", 5)];
        shift_types[0].applicable_days = Some([0u8, 1, 2, 3, 4].into_iter().collect());
        let periods = vec![(date(2026, 1, 10), date(2026, 1, 10))];
        let checker = FeasibilityChecker::new(&workers, &shift_types, &periods, &[], &[]);
        assert!(checker.check().is_feasible);
    }
}
