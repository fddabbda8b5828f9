//! # shift-solver
//!
//! Constraint-based worker shift scheduling.
//!
//! Given a roster of workers, a catalog of shift types with staffing
//! demands, a horizon partitioned into periods, and a set of business
//! rules (availability, restrictions, fairness, frequency, requests,
//! transition preferences), this crate builds a mixed-integer model over
//! binary assignment variables and solves it for a minimum-violation
//! schedule.
//!
//! ## Architecture
//!
//! - [`models`]: domain entities for inputs and the produced schedule
//! - [`solver`]: the model layer, variable builder, constraint registry,
//!   objective builder, orchestrator, and solution extractor
//! - [`constraints`]: one module per business rule, hard or soft
//! - [`validation`]: pre-solve feasibility checks and independent
//!   post-solve verification with fairness/request statistics
//! - [`io`]: CSV loaders and the schedule JSON document
//! - [`config`]: TOML-backed solver settings and constraint overlay
//!
//! ## Example
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use shift_solver::models::{ShiftType, Worker};
//! use shift_solver::solver::{ShiftSolver, SolverOptions};
//!
//! let workers = vec![
//!     Worker::new("W001", "Alice"),
//!     Worker::new("W002", "Bob"),
//!     Worker::new("W003", "Carol"),
//! ];
//! let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
//! let shift_types = vec![
//!     ShiftType::new("day", "Day Shift", "day", t(7), t(15), 8.0, 2),
//!     ShiftType::new("night", "Night Shift", "night", t(23), t(7), 8.0, 1).undesirable(),
//! ];
//! let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
//! let period_dates: Vec<_> = (0..2)
//!     .map(|i| {
//!         let s = start + chrono::Duration::weeks(i);
//!         (s, s + chrono::Duration::days(6))
//!     })
//!     .collect();
//!
//! let solver = ShiftSolver::new(workers, shift_types, period_dates, "SCH-001").unwrap();
//! let result = solver.solve(&SolverOptions::with_time_limit(60.0));
//! assert!(result.success);
//! ```

pub mod config;
pub mod constraints;
pub mod io;
pub mod models;
pub mod solver;
pub mod validation;

pub use models::{Schedule, ShiftType, Worker};
pub use solver::{ShiftSolver, SolverOptions, SolverResult};
