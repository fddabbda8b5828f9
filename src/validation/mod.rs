//! Pre-solve feasibility checks and post-solve schedule validation.

pub mod feasibility;
pub mod schedule_validator;

pub use feasibility::{FeasibilityChecker, FeasibilityIssue, FeasibilityIssueKind, FeasibilityResult};
pub use schedule_validator::{
    ScheduleValidator, ValidationOutcome, ValidationStatistics, Violation, ViolationKind,
};
