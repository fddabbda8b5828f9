//! CSV loaders for workers, shift types, availability, and requests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveTime;
use csv::StringRecord;

use crate::io::date_utils::{parse_date, DateFormat};
use crate::io::error::{IoError, IoResult};
use crate::models::{
    Availability, AvailabilityType, RequestKind, SchedulingRequest, ShiftType, Worker,
};

/// Loads scheduling inputs from CSV files.
///
/// Expected columns:
/// - workers: `id`, `name` (+ optional `worker_type`, `restricted_shifts`,
///   `preferred_shifts`)
/// - shift types: `id`, `name`, `category`, `start_time`, `end_time`,
///   `duration_hours`, `workers_required` (+ optional `is_undesirable`,
///   `applicable_days`)
/// - availability: `worker_id`, `start_date`, `end_date`,
///   `availability_type` (+ optional `shift_type_id`)
/// - requests: `worker_id`, `start_date`, `end_date`, `request_type`,
///   `shift_type_id` (+ optional `priority`)
///
/// Set-valued cells are comma-separated inside one (quoted) field; blank
/// entries are dropped.
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    date_format: DateFormat,
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_format(date_format: DateFormat) -> Self {
        Self { date_format }
    }

    pub fn load_workers(&self, path: &Path) -> IoResult<Vec<Worker>> {
        let rows = self.read_rows(path, &["id", "name"])?;
        let mut workers = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row.required(path, "id")?;
            let name = row.required(path, "name")?;
            let worker = Worker {
                id: id.to_string(),
                name: name.to_string(),
                worker_type: row.optional("worker_type").map(str::to_string),
                restricted_shifts: split_set(row.optional("restricted_shifts")),
                preferred_shifts: split_set(row.optional("preferred_shifts")),
                attributes: BTreeMap::new(),
            };
            worker.validate().map_err(|e| row.invalid(path, e.to_string()))?;
            workers.push(worker);
        }
        Ok(workers)
    }

    pub fn load_shift_types(&self, path: &Path) -> IoResult<Vec<ShiftType>> {
        let required = [
            "id",
            "name",
            "category",
            "start_time",
            "end_time",
            "duration_hours",
            "workers_required",
        ];
        let rows = self.read_rows(path, &required)?;
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut shift_types = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = row.required(path, "id")?.to_string();
            if !seen.insert(id.clone()) {
                return Err(IoError::DuplicateShiftType {
                    path: path.to_path_buf(),
                    line: row.line,
                    id,
                });
            }

            let shift_type = ShiftType {
                id,
                name: row.required(path, "name")?.to_string(),
                category: row.required(path, "category")?.to_string(),
                start_time: row.parse_time(path, "start_time")?,
                end_time: row.parse_time(path, "end_time")?,
                duration_hours: row.parse_f64(path, "duration_hours")?,
                workers_required: row.parse_u32(path, "workers_required")?,
                is_undesirable: row.parse_flag("is_undesirable"),
                applicable_days: parse_applicable_days(row, path)?,
                required_attributes: BTreeMap::new(),
            };
            shift_type
                .validate()
                .map_err(|e| row.invalid(path, e.to_string()))?;
            shift_types.push(shift_type);
        }
        Ok(shift_types)
    }

    pub fn load_availability(&self, path: &Path) -> IoResult<Vec<Availability>> {
        let required = ["worker_id", "start_date", "end_date", "availability_type"];
        let rows = self.read_rows(path, &required)?;
        let mut availabilities = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_type = row.required(path, "availability_type")?;
            let availability_type = AvailabilityType::parse(raw_type).ok_or_else(|| {
                row.invalid(
                    path,
                    format!(
                        "invalid availability_type '{raw_type}', expected one of \
                         unavailable, preferred, required"
                    ),
                )
            })?;

            let entry = Availability {
                worker_id: row.required(path, "worker_id")?.to_string(),
                start_date: self.parse_row_date(row, path, "start_date")?,
                end_date: self.parse_row_date(row, path, "end_date")?,
                availability_type,
                shift_type_id: row.optional("shift_type_id").map(str::to_string),
            };
            entry.validate().map_err(|e| row.invalid(path, e.to_string()))?;
            availabilities.push(entry);
        }
        Ok(availabilities)
    }

    pub fn load_requests(&self, path: &Path) -> IoResult<Vec<SchedulingRequest>> {
        let required = [
            "worker_id",
            "start_date",
            "end_date",
            "request_type",
            "shift_type_id",
        ];
        let rows = self.read_rows(path, &required)?;
        let mut requests = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_type = row.required(path, "request_type")?;
            let request_type = RequestKind::parse(raw_type).ok_or_else(|| {
                row.invalid(
                    path,
                    format!("invalid request_type '{raw_type}', expected positive or negative"),
                )
            })?;

            let priority = match row.optional("priority") {
                None => 1,
                Some(raw) => raw.parse::<i64>().ok().filter(|p| *p >= 1).ok_or_else(|| {
                    row.invalid(
                        path,
                        format!("priority must be a positive integer, got '{raw}'"),
                    )
                })?,
            };

            let request = SchedulingRequest {
                worker_id: row.required(path, "worker_id")?.to_string(),
                start_date: self.parse_row_date(row, path, "start_date")?,
                end_date: self.parse_row_date(row, path, "end_date")?,
                request_type,
                shift_type_id: row.required(path, "shift_type_id")?.to_string(),
                priority,
                is_hard: None,
            };
            request.validate().map_err(|e| row.invalid(path, e.to_string()))?;
            requests.push(request);
        }
        Ok(requests)
    }

    fn read_rows(&self, path: &Path, required_columns: &[&str]) -> IoResult<Vec<Row>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(Row {
                headers: headers.clone(),
                record,
                line: idx + 2, // header is line 1
            });
        }

        // An empty file (headers only, or nothing at all) is valid input;
        // column checks only apply when there is data.
        if !rows.is_empty() {
            for column in required_columns {
                if !headers.iter().any(|h| h == column) {
                    return Err(IoError::MissingColumn {
                        path: path.to_path_buf(),
                        column: column.to_string(),
                    });
                }
            }
        }
        Ok(rows)
    }

    fn parse_row_date(
        &self,
        row: &Row,
        path: &Path,
        column: &str,
    ) -> IoResult<chrono::NaiveDate> {
        let raw = row.required(path, column)?;
        parse_date(raw, self.date_format)
            .map_err(|e| row.invalid(path, format!("{column}: {e}")))
    }
}

struct Row {
    headers: Vec<String>,
    record: StringRecord,
    line: usize,
}

impl Row {
    fn optional(&self, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.record.get(idx).map(str::trim).filter(|v| !v.is_empty())
    }

    fn required(&self, path: &Path, column: &str) -> IoResult<&str> {
        self.optional(column)
            .ok_or_else(|| self.invalid(path, format!("empty '{column}'")))
    }

    fn invalid(&self, path: &Path, message: String) -> IoError {
        IoError::InvalidField {
            path: path.to_path_buf(),
            line: self.line,
            message,
        }
    }

    fn parse_time(&self, path: &Path, column: &str) -> IoResult<NaiveTime> {
        let raw = self.required(path, column)?;
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| self.invalid(path, format!("{column}: expected HH:MM, got '{raw}'")))
    }

    fn parse_f64(&self, path: &Path, column: &str) -> IoResult<f64> {
        let raw = self.required(path, column)?;
        raw.parse()
            .map_err(|_| self.invalid(path, format!("{column}: expected a number, got '{raw}'")))
    }

    fn parse_u32(&self, path: &Path, column: &str) -> IoResult<u32> {
        let raw = self.required(path, column)?;
        raw.parse().map_err(|_| {
            self.invalid(
                path,
                format!("{column}: expected a non-negative integer, got '{raw}'"),
            )
        })
    }

    fn parse_flag(&self, column: &str) -> bool {
        matches!(
            self.optional(column).map(str::to_ascii_lowercase).as_deref(),
            Some("true") | Some("1") | Some("yes")
        )
    }
}

fn split_set(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_applicable_days(row: &Row, path: &Path) -> IoResult<Option<BTreeSet<u8>>> {
    let Some(raw) = row.optional("applicable_days") else {
        return Ok(None);
    };
    let mut days = BTreeSet::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let day: u8 = part.parse().map_err(|_| {
            row.invalid(
                path,
                format!("applicable_days: expected weekday indices 0-6, got '{part}'"),
            )
        })?;
        days.insert(day);
    }
    Ok(if days.is_empty() { None } else { Some(days) })
}
