//! CSV input through the solver to the JSON document and back.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tempfile::TempDir;

use shift_solver::io::{
    read_schedule_json, write_schedule_json, CsvLoader, DateFormat, IoError,
};
use shift_solver::solver::{ShiftSolver, SolverOptions};
use shift_solver::validation::ScheduleValidator;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

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

#[test]
fn csv_to_solver_to_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let workers_path = write_file(
        &dir,
        "workers.csv",
        "id,name,worker_type,restricted_shifts,preferred_shifts\n\
         W001,Alice,nurse,night,\n\
         W002,Bob,nurse,,night\n\
         W003,Carol,doctor,,\n",
    );
    let shifts_path = write_file(
        &dir,
        "shifts.csv",
        "id,name,category,start_time,end_time,duration_hours,workers_required,is_undesirable\n\
         day,Day Shift,day,07:00,15:00,8.0,2,false\n\
         night,Night Shift,night,23:00,07:00,8.0,1,true\n",
    );
    let availability_path = write_file(
        &dir,
        "availability.csv",
        "worker_id,start_date,end_date,availability_type,shift_type_id\n\
         W003,2026-01-12,2026-01-18,unavailable,\n\
         W002,2026-01-05,2026-01-11,preferred,night\n",
    );
    let requests_path = write_file(
        &dir,
        "requests.csv",
        "worker_id,start_date,end_date,request_type,shift_type_id,priority\n\
         W002,2026-01-05,2026-01-11,positive,night,3\n",
    );

    let loader = CsvLoader::new();
    let workers = loader.load_workers(&workers_path).unwrap();
    let shift_types = loader.load_shift_types(&shifts_path).unwrap();
    let availabilities = loader.load_availability(&availability_path).unwrap();
    let requests = loader.load_requests(&requests_path).unwrap();

    let solver = ShiftSolver::new(workers, shift_types, weekly_periods(2), "SCH-PIPE")
        .unwrap()
        .with_availabilities(availabilities.clone())
        .unwrap()
        .with_requests(requests.clone())
        .unwrap();
    let result = solver.solve(&SolverOptions::with_time_limit(60.0));
    assert!(result.success, "status {}", result.status_name);

    let schedule = result.schedule.unwrap();
    // W001 is restricted from night, W003 is away in period 1.
    for period in 0..2 {
        assert!(schedule.periods[period]
            .worker_shifts("W001")
            .iter()
            .all(|s| s.shift_type_id != "night"));
    }
    assert!(schedule.periods[1].worker_shifts("W003").is_empty());

    let outcome = ScheduleValidator::new(&schedule, &availabilities, &requests).validate();
    assert!(outcome.is_valid, "{:?}", outcome.violations);

    // Export, re-read, compare documents byte for byte.
    let json_path = dir.path().join("schedule.json");
    write_schedule_json(&schedule, &json_path).unwrap();
    let document = read_schedule_json(&json_path).unwrap();
    assert_eq!(document.schedule_id, "SCH-PIPE");
    assert_eq!(document.periods.len(), 2);

    let emitted = fs::read_to_string(&json_path).unwrap();
    let re_emitted = serde_json::to_string_pretty(&document).unwrap();
    assert_eq!(emitted, re_emitted);

    // And the rebuilt schedule matches the original.
    let rebuilt =
        document.into_schedule(schedule.workers.clone(), schedule.shift_types.clone());
    assert_eq!(rebuilt, schedule);
}

#[test]
fn eu_dates_flow_through_the_loader() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "availability.csv",
        "worker_id,start_date,end_date,availability_type\n\
         W001,05/01/2026,11/01/2026,unavailable\n",
    );
    let entries = CsvLoader::with_date_format(DateFormat::Eu)
        .load_availability(&path)
        .unwrap();
    assert_eq!(entries[0].start_date, date(2026, 1, 5));
    assert_eq!(entries[0].end_date, date(2026, 1, 11));
}

#[test]
fn loader_errors_carry_path_and_row() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "requests.csv",
        "worker_id,start_date,end_date,request_type,shift_type_id,priority\n\
         W001,2026-01-05,2026-01-11,positive,day,1\n\
         W001,2026-01-05,2026-01-11,positive,day,1.5\n",
    );
    let err = CsvLoader::new().load_requests(&path).unwrap_err();
    match err {
        IoError::InvalidField { path: p, line, .. } => {
            assert_eq!(p, path);
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn missing_file_surfaces_as_csv_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    let err = CsvLoader::new().load_workers(&missing).unwrap_err();
    assert!(matches!(err, IoError::Csv { .. }));
}
