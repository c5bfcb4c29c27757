//! Market event records and the optional backtest date window.

use serde::{Deserialize, Serialize};

/// Realized percentage returns following an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impacts {
    pub return_1d: f64,
    pub return_1w: f64,
    pub return_1m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub ticker: String,
    pub scenario_id: String,
    pub headline: String,
    /// ISO-8601 date, compared lexically.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impacts: Option<Impacts>,
}

impl EventRecord {
    /// One-month return, or 0 when the event has no impacts.
    pub fn return_1m(&self) -> f64 {
        self.impacts.map_or(0.0, |i| i.return_1m)
    }
}

/// Inclusive `[start, end]` window of ISO-8601 date strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: &str, end: &str) -> Self {
        DateRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// A window exists only when both bounds are given and non-empty.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        match (start, end) {
            (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => {
                Some(DateRange::new(s.trim(), e.trim()))
            }
            _ => None,
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_event_with_impacts() {
        let json = r#"{
            "id": "e1", "ticker": "AAPL", "scenarioId": "dividend-increase",
            "headline": "Apple raises dividend", "date": "2024-01-05",
            "sector": "Technology",
            "impacts": { "return1d": 1.5, "return1w": -0.5, "return1m": 12 }
        }"#;
        let event: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(event.scenario_id, "dividend-increase");
        assert_eq!(event.sector.as_deref(), Some("Technology"));
        let impacts = event.impacts.unwrap();
        assert_eq!(impacts.return_1d, 1.5);
        assert_eq!(impacts.return_1w, -0.5);
        assert_eq!(impacts.return_1m, 12.0);
    }

    #[test]
    fn optional_fields_default_to_none() {
        let json = r#"{ "id": "e2", "ticker": "X", "scenarioId": "s", "headline": "", "date": "2024-02-01" }"#;
        let event: EventRecord = serde_json::from_str(json).unwrap();
        assert!(event.sector.is_none());
        assert!(event.impacts.is_none());
        assert_eq!(event.return_1m(), 0.0);
    }

    #[test]
    fn range_is_inclusive() {
        let range = DateRange::new("2024-01-01", "2024-01-31");
        assert!(range.contains("2024-01-01"));
        assert!(range.contains("2024-01-15"));
        assert!(range.contains("2024-01-31"));
        assert!(!range.contains("2023-12-31"));
        assert!(!range.contains("2024-02-01"));
    }

    #[test]
    fn range_requires_both_bounds() {
        assert_eq!(
            DateRange::from_bounds(Some("2024-01-01"), Some("2024-12-31")),
            Some(DateRange::new("2024-01-01", "2024-12-31"))
        );
        assert_eq!(DateRange::from_bounds(Some("2024-01-01"), None), None);
        assert_eq!(DateRange::from_bounds(None, Some("2024-12-31")), None);
        assert_eq!(DateRange::from_bounds(Some(""), Some("2024-12-31")), None);
    }
}
