//! Schedule JSON document export and import.
//!
//! The document is the stable external shape of a schedule: periods with
//! per-worker assignment lists plus per-worker statistics. Workers and
//! shift type catalogs travel separately; the document references them by
//! id only.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::io::error::{IoError, IoResult};
use crate::models::{
    PeriodAssignment, PeriodType, Schedule, ShiftInstance, ShiftType, Worker, WorkerStatistics,
};

/// One assignment entry in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDocument {
    pub shift_type_id: String,
    pub date: NaiveDate,
}

/// One period in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDocument {
    pub period_index: usize,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub assignments: BTreeMap<String, Vec<AssignmentDocument>>,
}

/// The schedule interchange document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDocument {
    pub schedule_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub periods: Vec<PeriodDocument>,
    #[serde(default)]
    pub statistics: BTreeMap<String, WorkerStatistics>,
}

impl ScheduleDocument {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            schedule_id: schedule.schedule_id.clone(),
            start_date: schedule.start_date,
            end_date: schedule.end_date,
            periods: schedule
                .periods
                .iter()
                .map(|period| PeriodDocument {
                    period_index: period.period_index,
                    period_start: period.period_start,
                    period_end: period.period_end,
                    assignments: period
                        .assignments
                        .iter()
                        .map(|(worker_id, shifts)| {
                            (
                                worker_id.clone(),
                                shifts
                                    .iter()
                                    .map(|s| AssignmentDocument {
                                        shift_type_id: s.shift_type_id.clone(),
                                        date: s.date,
                                    })
                                    .collect(),
                            )
                        })
                        .collect(),
                })
                .collect(),
            statistics: schedule.statistics.clone(),
        }
    }

    /// Rebuilds a domain schedule against the given catalogs.
    pub fn into_schedule(self, workers: Vec<Worker>, shift_types: Vec<ShiftType>) -> Schedule {
        let period_dates: Vec<(NaiveDate, NaiveDate)> = self
            .periods
            .iter()
            .map(|p| (p.period_start, p.period_end))
            .collect();
        Schedule {
            schedule_id: self.schedule_id,
            start_date: self.start_date,
            end_date: self.end_date,
            period_type: PeriodType::derive(&period_dates),
            periods: self
                .periods
                .into_iter()
                .map(|period| {
                    let period_index = period.period_index;
                    PeriodAssignment {
                        period_index,
                        period_start: period.period_start,
                        period_end: period.period_end,
                        assignments: period
                            .assignments
                            .into_iter()
                            .map(|(worker_id, shifts)| {
                                let instances = shifts
                                    .into_iter()
                                    .map(|s| ShiftInstance {
                                        shift_type_id: s.shift_type_id,
                                        period_index,
                                        date: s.date,
                                        worker_id: worker_id.clone(),
                                    })
                                    .collect();
                                (worker_id, instances)
                            })
                            .collect(),
                    }
                })
                .collect(),
            workers,
            shift_types,
            statistics: self.statistics,
        }
    }
}

/// Serializes a schedule to the document JSON.
pub fn schedule_to_json(schedule: &Schedule) -> String {
    let document = ScheduleDocument::from_schedule(schedule);
    // Serialization of a plain struct over BTreeMaps cannot fail.
    serde_json::to_string_pretty(&document).unwrap_or_default()
}

/// Writes the schedule document to a file.
pub fn write_schedule_json(schedule: &Schedule, path: &Path) -> IoResult<()> {
    fs::write(path, schedule_to_json(schedule)).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a schedule document from a JSON string.
pub fn parse_schedule_json(content: &str) -> Result<ScheduleDocument, IoError> {
    let deserializer = &mut serde_json::Deserializer::from_str(content);
    serde_path_to_error::deserialize(deserializer).map_err(|error| IoError::Json {
        path: Default::default(),
        pointer: error.path().to_string(),
        message: error.inner().to_string(),
    })
}

/// Reads a schedule document from a file.
pub fn read_schedule_json(path: &Path) -> IoResult<ScheduleDocument> {
    let content = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_schedule_json(&content).map_err(|error| match error {
        IoError::Json { pointer, message, .. } => IoError::Json {
            path: path.to_path_buf(),
            pointer,
            message,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_schedule() -> Schedule {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let workers = vec![Worker::new("W001", "Alice"), Worker::new("W002", "Bob")];
        let shift_types = vec![ShiftType::new("day", "Day", "day", t(7), t(15), 8.0, 1)];

        let mut period = PeriodAssignment::new(0, date(2026, 1, 5), date(2026, 1, 11));
        period.assignments.insert(
            "W001".to_string(),
            vec![ShiftInstance {
                shift_type_id: "day".to_string(),
                period_index: 0,
                date: date(2026, 1, 5),
                worker_id: "W001".to_string(),
            }],
        );

        let mut statistics = BTreeMap::new();
        statistics.insert(
            "W001".to_string(),
            WorkerStatistics {
                total_shifts: 1,
                periods_worked: 1,
                shift_counts: [("day".to_string(), 1)].into_iter().collect(),
            },
        );

        Schedule {
            schedule_id: "SCH-JSON".to_string(),
            start_date: date(2026, 1, 5),
            end_date: date(2026, 1, 11),
            period_type: PeriodType::Week,
            periods: vec![period],
            workers,
            shift_types,
            statistics,
        }
    }

    #[test]
    fn document_shape_matches_contract() {
        let schedule = sample_schedule();
        let json: serde_json::Value =
            serde_json::from_str(&schedule_to_json(&schedule)).unwrap();

        assert_eq!(json["schedule_id"], "SCH-JSON");
        assert_eq!(json["start_date"], "2026-01-05");
        assert_eq!(json["end_date"], "2026-01-11");
        assert_eq!(json["periods"][0]["period_index"], 0);
        assert_eq!(json["periods"][0]["period_start"], "2026-01-05");
        let assignment = &json["periods"][0]["assignments"]["W001"][0];
        assert_eq!(assignment["shift_type_id"], "day");
        assert_eq!(assignment["date"], "2026-01-05");
        assert_eq!(json["statistics"]["W001"]["total_shifts"], 1);
        assert_eq!(json["statistics"]["W001"]["day"], 1);
        // Catalogs are not embedded in the document.
        assert!(json.get("workers").is_none());
        assert!(json.get("shift_types").is_none());
    }

    #[test]
    fn parse_then_reserialize_is_identical() {
        let schedule = sample_schedule();
        let emitted = schedule_to_json(&schedule);
        let document = parse_schedule_json(&emitted).unwrap();
        let round_tripped = serde_json::to_string_pretty(&document).unwrap_or_default();
        assert_eq!(emitted, round_tripped);
    }

    #[test]
    fn into_schedule_rebuilds_domain_objects() {
        let schedule = sample_schedule();
        let document = parse_schedule_json(&schedule_to_json(&schedule)).unwrap();
        let rebuilt =
            document.into_schedule(schedule.workers.clone(), schedule.shift_types.clone());
        assert_eq!(rebuilt, schedule);
    }

    #[test]
    fn malformed_json_reports_the_path() {
        let content = r#"{
            "schedule_id": "S",
            "start_date": "2026-01-05",
            "end_date": "2026-01-11",
            "periods": [{ "period_index": "zero" }]
        }"#;
        let err = parse_schedule_json(content).unwrap_err();
        match err {
            IoError::Json { pointer, .. } => assert!(pointer.contains("periods")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let schedule = sample_schedule();
        write_schedule_json(&schedule, &path).unwrap();
        let document = read_schedule_json(&path).unwrap();
        assert_eq!(document.schedule_id, "SCH-JSON");
        assert_eq!(document.periods.len(), 1);
    }
}
