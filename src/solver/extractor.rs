//! Schedule reconstruction from a solved model.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{
    PeriodAssignment, PeriodType, Schedule, ShiftInstance, ShiftType, Worker, WorkerStatistics,
};
use crate::solver::model::CpSolver;
use crate::solver::variables::SolverVariables;

/// Rebuilds the domain [`Schedule`] from the solver's value assignment.
///
/// One [`ShiftInstance`] is recorded per assigned (worker, period, shift
/// type) tuple, dated at the period start; date granularity is
/// period-level.
pub struct SolutionExtractor<'a> {
    solver: &'a CpSolver,
    variables: &'a SolverVariables,
    workers: &'a [Worker],
    shift_types: &'a [ShiftType],
    period_dates: &'a [(NaiveDate, NaiveDate)],
    schedule_id: &'a str,
}

impl<'a> SolutionExtractor<'a> {
    pub fn new(
        solver: &'a CpSolver,
        variables: &'a SolverVariables,
        workers: &'a [Worker],
        shift_types: &'a [ShiftType],
        period_dates: &'a [(NaiveDate, NaiveDate)],
        schedule_id: &'a str,
    ) -> Self {
        Self {
            solver,
            variables,
            workers,
            shift_types,
            period_dates,
            schedule_id,
        }
    }

    pub fn extract(&self) -> Schedule {
        let periods: Vec<PeriodAssignment> = self
            .period_dates
            .iter()
            .enumerate()
            .map(|(idx, (start, end))| self.extract_period(idx, *start, *end))
            .collect();

        let mut schedule = Schedule {
            schedule_id: self.schedule_id.to_string(),
            start_date: self.period_dates.first().map(|(s, _)| *s).unwrap_or_default(),
            end_date: self.period_dates.last().map(|(_, e)| *e).unwrap_or_default(),
            period_type: PeriodType::derive(self.period_dates),
            periods,
            workers: self.workers.to_vec(),
            shift_types: self.shift_types.to_vec(),
            statistics: BTreeMap::new(),
        };
        schedule.statistics = self.compute_statistics(&schedule);
        schedule
    }

    fn extract_period(
        &self,
        period_idx: usize,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> PeriodAssignment {
        let mut period = PeriodAssignment::new(period_idx, period_start, period_end);
        for worker in self.workers {
            let shifts = self.extract_worker_shifts(&worker.id, period_idx, period_start);
            if !shifts.is_empty() {
                period.assignments.insert(worker.id.clone(), shifts);
            }
        }
        period
    }

    fn extract_worker_shifts(
        &self,
        worker_id: &str,
        period_idx: usize,
        period_start: NaiveDate,
    ) -> Vec<ShiftInstance> {
        let mut shifts = Vec::new();
        for shift_type in self.shift_types {
            // Tuples missing from the variable set are simply skipped.
            let Ok(var) = self.variables.assignment(worker_id, period_idx, &shift_type.id)
            else {
                continue;
            };
            if self.solver.value(var) == Some(1) {
                shifts.push(ShiftInstance {
                    shift_type_id: shift_type.id.clone(),
                    period_index: period_idx,
                    date: period_start,
                    worker_id: worker_id.to_string(),
                });
            }
        }
        shifts
    }

    fn compute_statistics(&self, schedule: &Schedule) -> BTreeMap<String, WorkerStatistics> {
        let mut statistics = BTreeMap::new();
        for worker in self.workers {
            let mut stats = WorkerStatistics::default();
            for shift_type in self.shift_types {
                stats.shift_counts.insert(shift_type.id.clone(), 0);
            }

            for period in &schedule.periods {
                let shifts = period.worker_shifts(&worker.id);
                if shifts.is_empty() {
                    continue;
                }
                stats.periods_worked += 1;
                stats.total_shifts += shifts.len() as u32;
                for shift in shifts {
                    if let Some(count) = stats.shift_counts.get_mut(&shift.shift_type_id) {
                        *count += 1;
                    }
                }
            }
            statistics.insert(worker.id.clone(), stats);
        }
        statistics
    }
}
