//! Date parsing with format selection and ambiguity warnings.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use once_cell::sync::Lazy;

/// Accepted date formats.
///
/// `Auto` accepts ISO and both slash conventions, resolving ambiguous
/// numeric dates to the US reading with a one-time warning per literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    #[default]
    Auto,
    Iso,
    Us,
    Eu,
}

/// Failure to parse a single date literal.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid date '{literal}': {message}")]
pub struct DateParseError {
    pub literal: String,
    pub message: String,
}

impl DateParseError {
    fn new(literal: &str, message: impl Into<String>) -> Self {
        Self {
            literal: literal.to_string(),
            message: message.into(),
        }
    }
}

// Literals already warned about, so repeated fields don't spam the log.
static WARNED_DATES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Forgets which ambiguous literals have been warned about. Test hook.
pub fn clear_ambiguity_warnings() {
    WARNED_DATES
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clear();
}

/// Whether a slash-formatted literal could be read as either US or EU
/// with different results.
pub fn is_ambiguous_date(raw: &str) -> bool {
    let Some((first, second, _)) = split_slash_date(raw) else {
        return false;
    };
    first <= 12 && second <= 12 && first != second
}

/// Parses a date literal.
///
/// `YYYY-MM-DD` is accepted in every mode. Slash forms follow the chosen
/// convention; in `Auto` an unambiguous literal picks its only valid
/// reading and an ambiguous one defaults to US (`MM/DD/YYYY`) with a
/// one-time `log::warn!` per distinct literal.
pub fn parse_date(raw: &str, format: DateFormat) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::new(raw, "empty date"));
    }

    if trimmed.contains('-') {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|e| DateParseError::new(trimmed, format!("expected YYYY-MM-DD ({e})")));
    }

    let Some((first, second, year)) = split_slash_date(trimmed) else {
        return Err(DateParseError::new(
            trimmed,
            "expected YYYY-MM-DD, MM/DD/YYYY, or DD/MM/YYYY",
        ));
    };

    let (month, day) = match format {
        DateFormat::Iso => {
            return Err(DateParseError::new(trimmed, "expected YYYY-MM-DD"));
        }
        DateFormat::Us => (first, second),
        DateFormat::Eu => (second, first),
        DateFormat::Auto => {
            if first > 12 {
                // Only the EU reading is possible.
                (second, first)
            } else if second > 12 {
                (first, second)
            } else {
                if first != second {
                    warn_once(trimmed);
                }
                (first, second)
            }
        }
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        DateParseError::new(
            trimmed,
            format!("no such calendar date (month {month}, day {day})"),
        )
    })
}

fn warn_once(literal: &str) {
    let mut warned = WARNED_DATES.lock().unwrap_or_else(|e| e.into_inner());
    if warned.insert(literal.to_string()) {
        log::warn!(
            "Ambiguous date '{literal}' interpreted as MM/DD/YYYY; \
             set the date format to 'eu' or 'us' to disambiguate"
        );
    }
}

fn split_slash_date(raw: &str) -> Option<(u32, u32, i32)> {
    let parts: Vec<&str> = raw.trim().split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;
    if parts[2].len() != 4 {
        return None;
    }
    Some((first, second, year))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_parses_in_every_mode() {
        for format in [DateFormat::Auto, DateFormat::Iso, DateFormat::Us, DateFormat::Eu] {
            assert_eq!(parse_date("2026-01-15", format).unwrap(), date(2026, 1, 15));
        }
    }

    #[test]
    fn explicit_us_and_eu_modes() {
        assert_eq!(
            parse_date("01/15/2026", DateFormat::Us).unwrap(),
            date(2026, 1, 15)
        );
        assert_eq!(
            parse_date("15/01/2026", DateFormat::Eu).unwrap(),
            date(2026, 1, 15)
        );
        // EU reads the ambiguous literal day-first.
        assert_eq!(
            parse_date("02/01/2026", DateFormat::Eu).unwrap(),
            date(2026, 1, 2)
        );
    }

    #[test]
    fn auto_resolves_unambiguous_literals() {
        clear_ambiguity_warnings();
        // Day over 12 forces the EU reading.
        assert_eq!(
            parse_date("25/12/2026", DateFormat::Auto).unwrap(),
            date(2026, 12, 25)
        );
        // Month over 12 in the first slot forces the US reading.
        assert_eq!(
            parse_date("12/25/2026", DateFormat::Auto).unwrap(),
            date(2026, 12, 25)
        );
    }

    #[test]
    fn auto_defaults_ambiguous_to_us() {
        clear_ambiguity_warnings();
        assert_eq!(
            parse_date("01/02/2026", DateFormat::Auto).unwrap(),
            date(2026, 1, 2)
        );
        assert_eq!(
            parse_date("12/01/2026", DateFormat::Auto).unwrap(),
            date(2026, 12, 1)
        );
    }

    #[test]
    fn unambiguous_literal_matches_in_auto_and_eu() {
        clear_ambiguity_warnings();
        let in_auto = parse_date("25/12/2026", DateFormat::Auto).unwrap();
        let in_eu = parse_date("25/12/2026", DateFormat::Eu).unwrap();
        assert_eq!(in_auto, in_eu);

        // An ambiguous literal differs by the documented rule.
        let in_auto = parse_date("02/01/2026", DateFormat::Auto).unwrap();
        let in_eu = parse_date("02/01/2026", DateFormat::Eu).unwrap();
        assert_eq!(in_auto, date(2026, 2, 1));
        assert_eq!(in_eu, date(2026, 1, 2));
    }

    #[test]
    fn ambiguity_detection() {
        assert!(is_ambiguous_date("01/02/2026"));
        assert!(is_ambiguous_date("03/04/2026"));
        assert!(is_ambiguous_date("12/11/2026"));
        assert!(!is_ambiguous_date("15/02/2026"));
        assert!(!is_ambiguous_date("02/15/2026"));
        assert!(!is_ambiguous_date("2026-01-02"));
        // Same value both ways reads the same either way.
        assert!(!is_ambiguous_date("05/05/2026"));
    }

    #[test]
    fn garbage_rejected() {
        assert!(parse_date("", DateFormat::Auto).is_err());
        assert!(parse_date("not-a-date", DateFormat::Auto).is_err());
        assert!(parse_date("13/13/2026", DateFormat::Auto).is_err());
        assert!(parse_date("01/02/26", DateFormat::Auto).is_err());
        assert!(parse_date("02/30/2026", DateFormat::Us).is_err());
        assert!(parse_date("01/15/2026", DateFormat::Iso).is_err());
    }
}
