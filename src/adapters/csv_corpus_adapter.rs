//! CSV event corpus adapter.
//!
//! Reads `events.csv` with the realized returns inline and, when configured,
//! joins each event's sector from `companies.csv` by ticker.
//!
//! ```text
//! events.csv:    id,ticker,scenario_id,headline,date,return_1d,return_1w,return_1m
//! companies.csv: ticker,name,sector
//! ```
//!
//! Blank return columns mean the event has no impacts yet.

use crate::domain::error::EventTraderError;
use crate::domain::event::{EventRecord, Impacts};
use crate::ports::config_port::ConfigPort;
use crate::ports::corpus_port::CorpusPort;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct EventRow {
    id: String,
    ticker: String,
    scenario_id: String,
    headline: String,
    date: String,
    return_1d: Option<f64>,
    return_1w: Option<f64>,
    return_1m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    ticker: String,
    sector: Option<String>,
}

pub struct CsvCorpusAdapter {
    events_path: PathBuf,
    companies_path: Option<PathBuf>,
}

impl CsvCorpusAdapter {
    pub fn new(events_path: PathBuf, companies_path: Option<PathBuf>) -> Self {
        Self {
            events_path,
            companies_path,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EventTraderError> {
        let events_path =
            config
                .get_string("data", "events_path")
                .ok_or_else(|| EventTraderError::ConfigMissing {
                    section: "data".into(),
                    key: "events_path".into(),
                })?;
        let companies_path = config.get_string("data", "companies_path");
        Ok(Self::new(
            PathBuf::from(events_path),
            companies_path.map(PathBuf::from),
        ))
    }

    fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, EventTraderError> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| EventTraderError::Corpus {
                reason: format!("failed to read {}: {}", path.display(), e),
            })
    }

    fn load_sectors(&self) -> Result<HashMap<String, String>, EventTraderError> {
        let Some(path) = &self.companies_path else {
            return Ok(HashMap::new());
        };

        let mut sectors = HashMap::new();
        for row in Self::reader(path)?.deserialize::<CompanyRow>() {
            let row = row.map_err(|e| EventTraderError::Corpus {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            if let Some(sector) = row.sector.filter(|s| !s.is_empty()) {
                sectors.insert(row.ticker, sector);
            }
        }
        Ok(sectors)
    }
}

fn impacts(row: &EventRow) -> Result<Option<Impacts>, EventTraderError> {
    match (row.return_1d, row.return_1w, row.return_1m) {
        (Some(return_1d), Some(return_1w), Some(return_1m)) => Ok(Some(Impacts {
            return_1d,
            return_1w,
            return_1m,
        })),
        (None, None, None) => Ok(None),
        _ => Err(EventTraderError::Corpus {
            reason: format!("event {} has incomplete returns", row.id),
        }),
    }
}

impl CorpusPort for CsvCorpusAdapter {
    fn load_events(&self) -> Result<Vec<EventRecord>, EventTraderError> {
        let sectors = self.load_sectors()?;
        let path = &self.events_path;

        let mut events = Vec::new();
        let mut unknown_tickers = 0usize;
        for row in Self::reader(path)?.deserialize::<EventRow>() {
            let row = row.map_err(|e| EventTraderError::Corpus {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            let impacts = impacts(&row)?;
            let sector = sectors.get(&row.ticker).cloned();
            if sector.is_none() && !sectors.is_empty() {
                unknown_tickers += 1;
            }
            events.push(EventRecord {
                id: row.id,
                ticker: row.ticker,
                scenario_id: row.scenario_id,
                headline: row.headline,
                date: row.date,
                sector,
                impacts,
            });
        }

        if unknown_tickers > 0 {
            warn!(unknown_tickers, "events without a matching company row");
        }
        debug!(events = events.len(), path = %path.display(), "loaded event corpus");
        Ok(events)
    }
}
