//! JSON report adapter.
//!
//! Writes `{ "algorithm": name, "trades": [...], "metrics": {...},
//! "equityCurve": [...] }` for the presentation layer.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::EventTraderError;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;

#[derive(Serialize)]
struct ReportDocument<'a> {
    algorithm: &'a str,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

pub struct JsonReportAdapter {
    pretty: bool,
}

impl JsonReportAdapter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render(
        &self,
        result: &BacktestResult,
        algorithm_name: &str,
    ) -> Result<String, EventTraderError> {
        let doc = ReportDocument {
            algorithm: algorithm_name,
            result,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        };
        Ok(json)
    }
}

impl Default for JsonReportAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        algorithm_name: &str,
        output_path: &str,
    ) -> Result<(), EventTraderError> {
        let json = self.render(result, algorithm_name)?;
        fs::write(output_path, json + "\n")?;
        Ok(())
    }
}
