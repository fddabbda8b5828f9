//! Domain models for scheduling inputs and outputs.

pub mod data_models;
pub mod error;
pub mod schedule;
pub mod shift;
pub mod worker;

pub use data_models::{
    Availability, AvailabilityType, Direction, OrderTarget, OrderTrigger, RequestKind,
    SchedulingRequest, ShiftFrequencyRequirement, ShiftOrderPreference,
};
pub use error::{ModelError, ModelResult};
pub use schedule::{PeriodAssignment, PeriodType, Schedule, ShiftInstance, WorkerStatistics};
pub use shift::ShiftType;
pub use worker::Worker;
