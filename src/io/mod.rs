//! Boundary adapters: CSV loaders, schedule JSON, date parsing.

pub mod csv_loader;
pub mod date_utils;
pub mod error;
pub mod loader;
pub mod sample_generator;
pub mod schedule_json;

pub use csv_loader::CsvLoader;
pub use date_utils::{clear_ambiguity_warnings, is_ambiguous_date, parse_date, DateFormat};
pub use error::{IoError, IoResult};
pub use loader::{load_problem_inputs, ProblemInputs};
pub use sample_generator::{build_periods, generate_sample, standard_shift_types, SampleSize};
pub use schedule_json::{
    parse_schedule_json, read_schedule_json, schedule_to_json, write_schedule_json,
    ScheduleDocument,
};
