//! Directory-level input loading.

use std::path::Path;

use anyhow::{Context, Result};

use crate::io::csv_loader::CsvLoader;
use crate::io::date_utils::DateFormat;
use crate::models::{Availability, SchedulingRequest, ShiftType, Worker};

/// Everything the solver consumes, loaded from one directory.
#[derive(Debug, Clone, Default)]
pub struct ProblemInputs {
    pub workers: Vec<Worker>,
    pub shift_types: Vec<ShiftType>,
    pub availabilities: Vec<Availability>,
    pub requests: Vec<SchedulingRequest>,
}

/// Loads `workers.csv` and `shift_types.csv` (required) plus
/// `availability.csv` and `requests.csv` (optional) from a directory.
pub fn load_problem_inputs(dir: &Path, date_format: DateFormat) -> Result<ProblemInputs> {
    let loader = CsvLoader::with_date_format(date_format);

    let workers_path = dir.join("workers.csv");
    let workers = loader
        .load_workers(&workers_path)
        .with_context(|| format!("Failed to load workers from {}", workers_path.display()))?;

    let shifts_path = dir.join("shift_types.csv");
    let shift_types = loader
        .load_shift_types(&shifts_path)
        .with_context(|| format!("Failed to load shift types from {}", shifts_path.display()))?;

    let availability_path = dir.join("availability.csv");
    let availabilities = if availability_path.exists() {
        loader.load_availability(&availability_path).with_context(|| {
            format!(
                "Failed to load availability from {}",
                availability_path.display()
            )
        })?
    } else {
        Vec::new()
    };

    let requests_path = dir.join("requests.csv");
    let requests = if requests_path.exists() {
        loader
            .load_requests(&requests_path)
            .with_context(|| format!("Failed to load requests from {}", requests_path.display()))?
    } else {
        Vec::new()
    };

    Ok(ProblemInputs {
        workers,
        shift_types,
        availabilities,
        requests,
    })
}
