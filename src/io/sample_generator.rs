//! Seeded sample data generation for demos, benchmarks, and manual runs.

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::io::loader::ProblemInputs;
use crate::models::{
    Availability, AvailabilityType, RequestKind, SchedulingRequest, ShiftType, Worker,
};

/// Size presets for generated rosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    Small,
    Large,
}

impl std::str::FromStr for SampleSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(SampleSize::Small),
            "LARGE" => Ok(SampleSize::Large),
            _ => Err(()),
        }
    }
}

impl SampleSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleSize::Small => "SMALL",
            SampleSize::Large => "LARGE",
        }
    }

    fn parameters(&self) -> SampleParameters {
        match self {
            SampleSize::Small => SampleParameters {
                worker_count: 8,
                num_periods: 4,
                unavailability_rate: 0.2,
                request_rate: 0.3,
            },
            SampleSize::Large => SampleParameters {
                worker_count: 30,
                num_periods: 12,
                unavailability_rate: 0.3,
                request_rate: 0.5,
            },
        }
    }
}

struct SampleParameters {
    worker_count: usize,
    num_periods: usize,
    unavailability_rate: f64,
    request_rate: f64,
}

const FIRST_NAMES: &[&str] = &[
    "Amy", "Beth", "Carl", "Dan", "Elsa", "Flo", "Gus", "Hugo", "Ivy", "Jay", "Kim", "Liam",
    "Mia", "Noa", "Otto", "Pia", "Quinn", "Rosa", "Sam", "Tara",
];
const LAST_NAMES: &[&str] = &[
    "Cole", "Fox", "Green", "Hill", "Jones", "King", "Li", "Moore", "Novak", "Oduya", "Petrov",
    "Smith", "Watt", "Zhang",
];

/// Contiguous inclusive period ranges starting at `start`.
pub fn build_periods(
    start: NaiveDate,
    num_periods: usize,
    period_length_days: i64,
) -> Vec<(NaiveDate, NaiveDate)> {
    (0..num_periods)
        .map(|i| {
            let period_start = start + Duration::days(i as i64 * period_length_days);
            (period_start, period_start + Duration::days(period_length_days - 1))
        })
        .collect()
}

/// The standard three-shift catalog used by the generated rosters.
pub fn standard_shift_types() -> Vec<ShiftType> {
    let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or_default();
    vec![
        ShiftType::new("day", "Day Shift", "day", t(7), t(15), 8.0, 2),
        ShiftType::new("evening", "Evening Shift", "evening", t(15), t(23), 8.0, 1),
        ShiftType::new("night", "Night Shift", "night", t(23), t(7), 8.0, 1).undesirable(),
    ]
}

/// Generates a reproducible roster with workers, availability, and
/// requests, plus the weekly period partition to schedule over.
pub fn generate_sample(
    size: SampleSize,
    start: NaiveDate,
    seed: u64,
) -> (ProblemInputs, Vec<(NaiveDate, NaiveDate)>) {
    let params = size.parameters();
    let mut rng = StdRng::seed_from_u64(seed);
    let period_dates = build_periods(start, params.num_periods, 7);
    let shift_types = standard_shift_types();

    let mut workers = Vec::with_capacity(params.worker_count);
    for i in 0..params.worker_count {
        let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        let mut worker = Worker::new(format!("W{:03}", i + 1), format!("{first} {last}"));
        // A sprinkle of night-restricted workers, never so many that the
        // night shift loses coverage.
        if i % 5 == 4 {
            worker.restricted_shifts.insert("night".to_string());
        }
        workers.push(worker);
    }

    let horizon_end = period_dates
        .last()
        .map(|(_, end)| *end)
        .unwrap_or(start);

    let mut availabilities = Vec::new();
    let mut requests = Vec::new();
    for worker in &workers {
        if rng.gen_bool(params.unavailability_rate) {
            let offset = rng.gen_range(0..params.num_periods) as i64 * 7;
            let leave_start = start + Duration::days(offset);
            let leave_end = (leave_start + Duration::days(rng.gen_range(3..10))).min(horizon_end);
            if let Ok(entry) = Availability::new(
                worker.id.clone(),
                leave_start,
                leave_end,
                AvailabilityType::Unavailable,
                None,
            ) {
                availabilities.push(entry);
            }
        }

        if rng.gen_bool(params.request_rate) {
            let shift = &shift_types[rng.gen_range(0..shift_types.len())];
            if !worker.can_work_shift(&shift.id) {
                continue;
            }
            let offset = rng.gen_range(0..params.num_periods) as i64 * 7;
            let request_start = start + Duration::days(offset);
            let kind = if rng.gen_bool(0.5) {
                RequestKind::Positive
            } else {
                RequestKind::Negative
            };
            if let Ok(request) = SchedulingRequest::new(
                worker.id.clone(),
                request_start,
                (request_start + Duration::days(6)).min(horizon_end),
                kind,
                shift.id.clone(),
                rng.gen_range(1..=5),
            ) {
                requests.push(request);
            }
        }
    }

    (
        ProblemInputs {
            workers,
            shift_types,
            availabilities,
            requests,
        },
        period_dates,
    )
}
