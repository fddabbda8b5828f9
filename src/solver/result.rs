//! Solver result envelope and error types.

use serde::{Deserialize, Serialize};

use crate::models::Schedule;
use crate::solver::model::SolveStatus;
use crate::validation::feasibility::FeasibilityIssue;

/// Error raised while assembling a solver run.
///
/// Solver failures (infeasible model, time limit) are not errors; they are
/// reported through [`SolverResult`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<crate::models::ModelError> for SolverError {
    fn from(err: crate::models::ModelError) -> Self {
        SolverError::InvalidInput(err.to_string())
    }
}

/// Outcome of one solver run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverResult {
    pub success: bool,
    pub schedule: Option<Schedule>,
    pub status: SolveStatus,
    pub status_name: String,
    pub solve_time_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feasibility_issues: Vec<FeasibilityIssue>,
}

impl SolverResult {
    pub(crate) fn infeasible_pre_solve(
        issues: Vec<FeasibilityIssue>,
        solve_time_seconds: f64,
    ) -> Self {
        Self {
            success: false,
            schedule: None,
            status: SolveStatus::InfeasiblePreSolve,
            status_name: SolveStatus::InfeasiblePreSolve.name().to_string(),
            solve_time_seconds,
            objective_value: None,
            feasibility_issues: issues,
        }
    }

    pub(crate) fn unsuccessful(status: SolveStatus, solve_time_seconds: f64) -> Self {
        Self {
            success: false,
            schedule: None,
            status,
            status_name: status.name().to_string(),
            solve_time_seconds,
            objective_value: None,
            feasibility_issues: Vec::new(),
        }
    }

    pub(crate) fn successful(
        schedule: Schedule,
        status: SolveStatus,
        solve_time_seconds: f64,
        objective_value: Option<f64>,
    ) -> Self {
        Self {
            success: true,
            schedule: Some(schedule),
            status,
            status_name: status.name().to_string(),
            solve_time_seconds,
            objective_value,
            feasibility_issues: Vec::new(),
        }
    }
}
