#![allow(dead_code)]

use eventtrader::domain::backtest::BacktestResult;
use eventtrader::domain::definition::{
    AlgorithmDefinition, Edge, FilterKind, FilterValue, Node, Operator,
};
use eventtrader::domain::error::EventTraderError;
pub use eventtrader::domain::event::{DateRange, EventRecord, Impacts};
use eventtrader::ports::corpus_port::CorpusPort;
use eventtrader::ports::report_port::ReportPort;
use std::cell::RefCell;

pub struct MockCorpusPort {
    pub events: Vec<EventRecord>,
    pub error: Option<String>,
    pub loads: RefCell<usize>,
}

impl MockCorpusPort {
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self {
            events,
            error: None,
            loads: RefCell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            events: vec![],
            error: Some(reason.to_string()),
            loads: RefCell::new(0),
        }
    }
}

impl CorpusPort for MockCorpusPort {
    fn load_events(&self) -> Result<Vec<EventRecord>, EventTraderError> {
        *self.loads.borrow_mut() += 1;
        if let Some(reason) = &self.error {
            return Err(EventTraderError::Corpus {
                reason: reason.clone(),
            });
        }
        Ok(self.events.clone())
    }
}

pub struct MockReportPort {
    pub calls: RefCell<Vec<(BacktestResult, String, String)>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        algorithm_name: &str,
        output_path: &str,
    ) -> Result<(), EventTraderError> {
        self.calls.borrow_mut().push((
            result.clone(),
            algorithm_name.to_string(),
            output_path.to_string(),
        ));
        Ok(())
    }
}

pub fn make_event(id: &str, scenario: &str, date: &str, r1d: f64, r1w: f64, r1m: f64) -> EventRecord {
    EventRecord {
        id: id.to_string(),
        ticker: format!("T{id}"),
        scenario_id: scenario.to_string(),
        headline: format!("{scenario} event {id}"),
        date: date.to_string(),
        sector: None,
        impacts: Some(Impacts {
            return_1d: r1d,
            return_1w: r1w,
            return_1m: r1m,
        }),
    }
}

pub fn with_sector(mut event: EventRecord, sector: &str) -> EventRecord {
    event.sector = Some(sector.to_string());
    event
}

pub fn without_impacts(mut event: EventRecord) -> EventRecord {
    event.impacts = None;
    event
}

pub fn scenario(id: &str, scenario_id: &str) -> Node {
    Node::scenario(id, scenario_id)
}

pub fn min_return(id: &str, threshold: f64) -> Node {
    Node::filter(id, FilterKind::MinReturn, Some(FilterValue::Number(threshold)))
}

pub fn sector(id: &str, value: &str) -> Node {
    Node::filter(id, FilterKind::Sector, Some(FilterValue::Text(value.to_string())))
}

pub fn date_filter(id: &str) -> Node {
    Node::filter(id, FilterKind::DateRange, None)
}

pub fn op(id: &str, op: Operator) -> Node {
    Node::operator(id, op)
}

/// Definition whose output is `output_op` fed by `inputs` in order.
pub fn combine(output_op: Operator, inputs: Vec<Node>) -> AlgorithmDefinition {
    let edges = inputs.iter().map(|n| Edge::new(n.id(), "out")).collect();
    let mut nodes = inputs;
    nodes.push(Node::operator("out", output_op));
    AlgorithmDefinition::new(nodes, edges, "out")
}

pub fn trade_ids(result: &BacktestResult) -> Vec<&str> {
    result.trades.iter().map(|t| t.event_id.as_str()).collect()
}
