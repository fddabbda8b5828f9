//! Solve orchestration: feasibility, model build, constraints, extraction.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::NaiveDate;

use crate::constraints::{ConstraintConfig, ConstraintContext};
use crate::models::{
    Availability, ModelError, SchedulingRequest, ShiftFrequencyRequirement, ShiftOrderPreference,
    ShiftType, Worker,
};
use crate::solver::extractor::SolutionExtractor;
use crate::solver::model::{CpModel, CpSolver, SolverParameters};
use crate::solver::objective::ObjectiveBuilder;
use crate::solver::registry::{with_global_registry, ConstraintRegistration};
use crate::solver::result::{SolverError, SolverResult};
use crate::solver::variables::VariableBuilder;
use crate::validation::feasibility::FeasibilityChecker;

/// Solver parameters exposed per run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    pub time_limit_seconds: f64,
    pub num_search_workers: Option<u32>,
    pub relative_gap_limit: Option<f64>,
    pub log_search_progress: bool,
    pub random_seed: Option<u64>,
}

impl Default for SolverOptions {
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

impl SolverOptions {
    pub fn with_time_limit(time_limit_seconds: f64) -> Self {
        Self {
            time_limit_seconds,
            ..Self::default()
        }
    }

    fn to_parameters(&self) -> SolverParameters {
        SolverParameters {
            max_time_in_seconds: self.time_limit_seconds,
            num_search_workers: self.num_search_workers,
            relative_gap_limit: self.relative_gap_limit,
            log_search_progress: self.log_search_progress,
            random_seed: self.random_seed,
        }
    }
}

/// Main orchestrator for one scheduling run.
///
/// ```no_run
/// # use shift_solver::solver::{ShiftSolver, SolverOptions};
/// # fn demo(workers: Vec<shift_solver::models::Worker>,
/// #         shift_types: Vec<shift_solver::models::ShiftType>,
/// #         period_dates: Vec<(chrono::NaiveDate, chrono::NaiveDate)>) {
/// let solver = ShiftSolver::new(workers, shift_types, period_dates, "SCH-001").unwrap();
/// let result = solver.solve(&SolverOptions::with_time_limit(300.0));
/// if result.success {
///     let schedule = result.schedule.unwrap();
///     println!("{} periods scheduled", schedule.num_periods());
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct ShiftSolver {
    workers: Vec<Worker>,
    shift_types: Vec<ShiftType>,
    period_dates: Vec<(NaiveDate, NaiveDate)>,
    schedule_id: String,
    availabilities: Vec<Availability>,
    requests: Vec<SchedulingRequest>,
    shift_frequency_requirements: Vec<ShiftFrequencyRequirement>,
    shift_order_preferences: Vec<ShiftOrderPreference>,
    constraint_configs: BTreeMap<String, ConstraintConfig>,
}

impl ShiftSolver {
    /// Validates the core inputs and creates a solver with no
    /// availabilities, requests, or overrides attached.
    pub fn new(
        workers: Vec<Worker>,
        shift_types: Vec<ShiftType>,
        period_dates: Vec<(NaiveDate, NaiveDate)>,
        schedule_id: impl Into<String>,
    ) -> Result<Self, SolverError> {
        if workers.is_empty() {
            return Err(SolverError::InvalidInput(
                "workers list cannot be empty".to_string(),
            ));
        }
        if shift_types.is_empty() {
            return Err(SolverError::InvalidInput(
                "shift_types list cannot be empty".to_string(),
            ));
        }
        if period_dates.is_empty() {
            return Err(SolverError::InvalidInput(
                "period_dates list cannot be empty".to_string(),
            ));
        }
        for (start, end) in &period_dates {
            if end < start {
                return Err(SolverError::InvalidInput(format!(
                    "period end {end} is before its start {start}"
                )));
            }
        }
        for worker in &workers {
            worker.validate()?;
        }
        let mut seen = BTreeSet::new();
        for shift_type in &shift_types {
            shift_type.validate()?;
            if !seen.insert(shift_type.id.as_str()) {
                return Err(ModelError::DuplicateShiftType(shift_type.id.clone()).into());
            }
        }
        let schedule_id = schedule_id.into();
        if schedule_id.trim().is_empty() {
            return Err(SolverError::InvalidInput(
                "schedule_id cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            workers,
            shift_types,
            period_dates,
            schedule_id,
            availabilities: Vec::new(),
            requests: Vec::new(),
            shift_frequency_requirements: Vec::new(),
            shift_order_preferences: Vec::new(),
            constraint_configs: BTreeMap::new(),
        })
    }

    pub fn with_availabilities(
        mut self,
        availabilities: Vec<Availability>,
    ) -> Result<Self, SolverError> {
        for entry in &availabilities {
            entry.validate()?;
        }
        self.availabilities = availabilities;
        Ok(self)
    }

    pub fn with_requests(mut self, requests: Vec<SchedulingRequest>) -> Result<Self, SolverError> {
        for request in &requests {
            request.validate()?;
        }
        self.requests = requests;
        Ok(self)
    }

    pub fn with_shift_frequency_requirements(
        mut self,
        requirements: Vec<ShiftFrequencyRequirement>,
    ) -> Result<Self, SolverError> {
        for requirement in &requirements {
            requirement.validate()?;
        }
        self.shift_frequency_requirements = requirements;
        Ok(self)
    }

    pub fn with_shift_order_preferences(
        mut self,
        preferences: Vec<ShiftOrderPreference>,
    ) -> Result<Self, SolverError> {
        for preference in &preferences {
            preference.validate()?;
        }
        self.shift_order_preferences = preferences;
        Ok(self)
    }

    /// Per-run configuration overlay keyed by constraint id. Unknown ids
    /// are ignored at apply time.
    pub fn with_constraint_configs(
        mut self,
        configs: BTreeMap<String, ConstraintConfig>,
    ) -> Self {
        self.constraint_configs = configs;
        self
    }

    pub fn num_periods(&self) -> usize {
        self.period_dates.len()
    }

    /// Runs feasibility, model build, constraint application, the solver,
    /// and extraction, returning a result envelope in every case.
    pub fn solve(&self, options: &SolverOptions) -> SolverResult {
        let start = Instant::now();
        log::info!(
            "solving schedule '{}': {} workers, {} shift types, {} periods",
            self.schedule_id,
            self.workers.len(),
            self.shift_types.len(),
            self.num_periods()
        );

        let feasibility = FeasibilityChecker::new(
            &self.workers,
            &self.shift_types,
            &self.period_dates,
            &self.availabilities,
            &self.requests,
        )
        .check();
        if !feasibility.is_feasible {
            log::warn!(
                "pre-solve feasibility check failed with {} issues",
                feasibility.issues.len()
            );
            return SolverResult::infeasible_pre_solve(
                feasibility.issues,
                start.elapsed().as_secs_f64(),
            );
        }

        let mut model = CpModel::new();
        let variables = match VariableBuilder::new(
            &mut model,
            &self.workers,
            &self.shift_types,
            self.num_periods(),
        ) {
            Ok(builder) => builder.build(),
            Err(error) => {
                log::error!("variable construction failed: {error}");
                return SolverResult::unsuccessful(
                    crate::solver::model::SolveStatus::ModelInvalid,
                    start.elapsed().as_secs_f64(),
                );
            }
        };

        let ctx = ConstraintContext {
            workers: &self.workers,
            shift_types: &self.shift_types,
            num_periods: self.num_periods(),
            period_dates: &self.period_dates,
            availabilities: &self.availabilities,
            requests: &self.requests,
            shift_frequency_requirements: &self.shift_frequency_requirements,
            shift_order_preferences: &self.shift_order_preferences,
        };

        // Snapshot the registry so a long solve never holds the lock.
        let (hard, soft) = with_global_registry(|registry| {
            (
                registry.hard_constraints().to_vec(),
                registry.soft_constraints().to_vec(),
            )
        });

        for registration in &hard {
            let config = self.effective_config(registration);
            if !config.enabled {
                continue;
            }
            let mut instance = registration.instantiate(config);
            instance.apply(&mut model, &variables, &ctx);
            log::debug!("applied hard constraint '{}'", registration.constraint_id);
        }

        let mut objective = ObjectiveBuilder::new();
        for registration in &soft {
            let config = self.effective_config(registration);
            if !config.enabled {
                continue;
            }
            let mut instance = registration.instantiate(config);
            instance.apply(&mut model, &variables, &ctx);
            log::debug!(
                "applied soft constraint '{}' ({} violation indicators)",
                registration.constraint_id,
                instance.violation_variables().len()
            );
            objective.add_constraint(&instance);
        }
        objective.build(&mut model);

        let mut solver = CpSolver::new();
        solver.parameters = options.to_parameters();
        let status = solver.solve(&model);
        let solve_time = start.elapsed().as_secs_f64();

        if !status.is_success() {
            log::warn!("solver finished without a solution: {}", status.name());
            return SolverResult::unsuccessful(status, solve_time);
        }

        let schedule = SolutionExtractor::new(
            &solver,
            &variables,
            &self.workers,
            &self.shift_types,
            &self.period_dates,
            &self.schedule_id,
        )
        .extract();
        log::info!(
            "solved '{}' in {:.3}s with status {}",
            self.schedule_id,
            solve_time,
            status.name()
        );
        SolverResult::successful(schedule, status, solve_time, solver.objective_value())
    }

    /// The configuration a registration runs with: the per-run override
    /// when present, otherwise the registered default. The request
    /// constraint flips on automatically when requests exist and its
    /// default left it off.
    fn effective_config(&self, registration: &ConstraintRegistration) -> ConstraintConfig {
        if let Some(config) = self.constraint_configs.get(registration.constraint_id) {
            return config.clone();
        }
        let mut config = registration.default_config.clone();
        if registration.constraint_id == "request" && !config.enabled {
            config.enabled = !self.requests.is_empty();
        }
        config
    }
}
