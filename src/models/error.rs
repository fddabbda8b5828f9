//! Error types for domain model validation.

/// Result type for model construction and validation
pub type ModelResult<T> = Result<T, ModelError>;

/// Error raised when input entities are malformed or inconsistent
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("Invalid date range: end_date {end} is before start_date {start}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Duplicate shift type id: {0}")]
    DuplicateShiftType(String),
}
