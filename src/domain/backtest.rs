//! Backtest aggregator.
//!
//! Runs the output node of a definition over an event corpus and turns the
//! matches into trades, metrics and an equity curve. Each matched event is one
//! unit position held for a month and compounded sequentially.

use crate::domain::definition::AlgorithmDefinition;
use crate::domain::error::DefinitionError;
use crate::domain::event::{DateRange, EventRecord, Impacts};
use crate::domain::graph::GraphIndex;
use crate::domain::metrics::{EquityPoint, Metrics, build_equity_curve};
use crate::domain::node_eval::NodeEvaluator;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub event_id: String,
    pub ticker: String,
    pub scenario_id: String,
    pub headline: String,
    pub date: String,
    pub return_1d: f64,
    pub return_1w: f64,
    pub return_1m: f64,
}

impl Trade {
    fn from_event(event: &EventRecord, impacts: Impacts) -> Self {
        Trade {
            event_id: event.id.clone(),
            ticker: event.ticker.clone(),
            scenario_id: event.scenario_id.clone(),
            headline: event.headline.clone(),
            date: event.date.clone(),
            return_1d: impacts.return_1d,
            return_1w: impacts.return_1w,
            return_1m: impacts.return_1m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub metrics: Metrics,
    pub equity_curve: Vec<EquityPoint>,
}

/// Evaluate `definition` against `events`, optionally restricted to an
/// inclusive date window.
///
/// The definition is validated before any event is looked at. Events without
/// impacts are never traded. Trades are ordered by date; ties keep corpus
/// order.
pub fn evaluate(
    definition: &AlgorithmDefinition,
    events: &[EventRecord],
    date_range: Option<&DateRange>,
) -> Result<BacktestResult, DefinitionError> {
    definition.validate()?;

    let index = GraphIndex::new(definition);
    let output = index
        .position(&definition.output_node_id)
        .ok_or_else(|| DefinitionError::MissingOutputNode {
            id: definition.output_node_id.clone(),
        })?;
    let mut evaluator = NodeEvaluator::new(&index, date_range);

    let mut considered = 0usize;
    let mut trades = Vec::new();
    for event in events
        .iter()
        .filter(|e| date_range.is_none_or(|r| r.contains(&e.date)))
    {
        let Some(impacts) = event.impacts else {
            continue;
        };
        considered += 1;
        if evaluator.evaluate(event, output) {
            trades.push(Trade::from_event(event, impacts));
        }
    }

    trades.sort_by(|a, b| a.date.cmp(&b.date));

    debug!(
        corpus = events.len(),
        considered,
        trades = trades.len(),
        "backtest evaluated"
    );

    let metrics = Metrics::compute(&trades);
    let equity_curve = build_equity_curve(&trades);

    Ok(BacktestResult {
        trades,
        metrics,
        equity_curve,
    })
}
