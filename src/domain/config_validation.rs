//! Configuration validation.
//!
//! Validates config fields before a backtest runs.

use crate::domain::error::EventTraderError;
use crate::domain::event::DateRange;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use tracing::warn;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), EventTraderError> {
    validate_events_path(config)?;
    validate_window(
        config.get_string("backtest", "start_date").as_deref(),
        config.get_string("backtest", "end_date").as_deref(),
    )?;
    Ok(())
}

pub fn validate_store_config(config: &dyn ConfigPort) -> Result<(), EventTraderError> {
    match config.get_string("algorithms", "store_path") {
        Some(_) => Ok(()),
        None => Err(EventTraderError::ConfigMissing {
            section: "algorithms".to_string(),
            key: "store_path".to_string(),
        }),
    }
}

fn validate_events_path(config: &dyn ConfigPort) -> Result<(), EventTraderError> {
    match config.get_string("data", "events_path") {
        Some(_) => Ok(()),
        None => Err(EventTraderError::ConfigMissing {
            section: "data".to_string(),
            key: "events_path".to_string(),
        }),
    }
}

/// Validate an optional backtest window and build it.
///
/// A window applies only when both bounds are given. A lone bound is still
/// format-checked, then ignored and the backtest runs over all dates. Bounds
/// are `YYYY-MM-DD` with `start_date <= end_date`.
pub fn validate_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateRange>, EventTraderError> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        (None, None) => return Ok(None),
        (Some(lone), None) | (None, Some(lone)) => {
            let field = if end.is_none() { "start_date" } else { "end_date" };
            parse_date(lone, field)?;
            warn!(field, value = lone, "ignoring half-open date window");
            return Ok(None);
        }
    };

    let start_date = parse_date(start, "start_date")?;
    let end_date = parse_date(end, "end_date")?;
    if start_date > end_date {
        return Err(EventTraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(DateRange::from_bounds(Some(start), Some(end)))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, EventTraderError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        EventTraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: field.to_string(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", field),
        }
    })
}
