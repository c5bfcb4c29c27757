//! Node evaluation engine.
//!
//! Decides whether one event satisfies one node of a definition.
//!
//! # Evaluation Semantics
//!
//! - Scenario: event scenario id equals the node's scenario id
//! - `minReturn`: one-month return `>=` threshold
//! - `sector`: any listed sector equals the event sector, case-insensitively
//! - `dateRange`: passes when no window was supplied, else window membership
//! - Unknown filter types never match
//! - `AND`: all inputs true; zero inputs is `true`
//! - `OR`: any input true; zero inputs is `false`
//! - `NOT`: negates its first input; zero inputs is `true`
//!
//! Results are memoized per node for the event being evaluated, so shared
//! upstream nodes are visited once per event.

use crate::domain::definition::{AlgorithmDefinition, FilterKind, FilterValue, Node, Operator};
use crate::domain::error::DefinitionError;
use crate::domain::event::{DateRange, EventRecord};
use crate::domain::graph::GraphIndex;

pub struct NodeEvaluator<'g, 'a> {
    index: &'g GraphIndex<'a>,
    date_range: Option<&'g DateRange>,
    memo: Vec<Option<bool>>,
}

impl<'g, 'a> NodeEvaluator<'g, 'a> {
    /// The index must come from a definition that passed
    /// [`AlgorithmDefinition::validate`]; cycles are not guarded here.
    pub fn new(index: &'g GraphIndex<'a>, date_range: Option<&'g DateRange>) -> Self {
        NodeEvaluator {
            index,
            date_range,
            memo: vec![None; index.len()],
        }
    }

    /// Evaluate the node at `position` for `event`, starting a fresh memo.
    pub fn evaluate(&mut self, event: &EventRecord, position: usize) -> bool {
        self.memo.fill(None);
        self.eval_at(event, position)
    }

    /// Post-order walk over `(node, next input)` frames. Operator frames stop
    /// early once their result is decided; every finished node lands in the memo.
    fn eval_at(&mut self, event: &EventRecord, root: usize) -> bool {
        let index = self.index;
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (position, cursor) = *frame;
            if self.memo[position].is_some() {
                stack.pop();
                continue;
            }

            let op = match index.node(position) {
                Node::Scenario { scenario_id, .. } => {
                    self.memo[position] = Some(event.scenario_id == *scenario_id);
                    stack.pop();
                    continue;
                }
                Node::Filter {
                    filter_type, value, ..
                } => {
                    self.memo[position] = Some(matches_filter(
                        *filter_type,
                        value.as_ref(),
                        event,
                        self.date_range,
                    ));
                    stack.pop();
                    continue;
                }
                Node::Operator { op, .. } => *op,
            };

            match index.input_positions(position).get(cursor) {
                Some(&input) => match self.memo[input] {
                    Some(value) => match decided_by(op, value) {
                        Some(result) => {
                            self.memo[position] = Some(result);
                            stack.pop();
                        }
                        None => frame.1 += 1,
                    },
                    None => stack.push((input, 0)),
                },
                None => {
                    self.memo[position] = Some(exhausted(op));
                    stack.pop();
                }
            }
        }

        self.memo[root].unwrap_or(false)
    }
}

/// Result of an operator fixed by one input value, if any.
fn decided_by(op: Operator, input: bool) -> Option<bool> {
    match op {
        Operator::And => (!input).then_some(false),
        Operator::Or => input.then_some(true),
        Operator::Not => Some(!input),
    }
}

/// Result of an operator once all inputs were seen without deciding it.
fn exhausted(op: Operator) -> bool {
    match op {
        Operator::And => true,
        Operator::Or => false,
        Operator::Not => true,
    }
}

fn matches_filter(
    kind: FilterKind,
    value: Option<&FilterValue>,
    event: &EventRecord,
    date_range: Option<&DateRange>,
) -> bool {
    match kind {
        FilterKind::Sector => {
            let Some(sector) = event.sector.as_deref() else {
                return false;
            };
            let sector = sector.to_lowercase();
            value
                .map(FilterValue::sectors)
                .unwrap_or_default()
                .iter()
                .any(|s| s.to_lowercase() == sector)
        }
        FilterKind::MinReturn => match value.and_then(FilterValue::threshold) {
            Some(min) => event.return_1m() >= min,
            None => false,
        },
        FilterKind::DateRange => date_range.is_none_or(|r| r.contains(&event.date)),
        FilterKind::Unknown => false,
    }
}

/// Evaluate a single node of `definition` against one event.
///
/// Fails if the node id is unknown or the node sits on a cycle.
pub fn evaluate_node(
    definition: &AlgorithmDefinition,
    node_id: &str,
    event: &EventRecord,
    date_range: Option<&DateRange>,
) -> Result<bool, DefinitionError> {
    let index = GraphIndex::new(definition);
    let position = index
        .position(node_id)
        .ok_or_else(|| DefinitionError::UnknownNode {
            id: node_id.to_string(),
        })?;
    if let Some(node) = index.find_cycle(position) {
        return Err(DefinitionError::Cycle {
            node: index.node(node).id().to_string(),
        });
    }
    Ok(NodeEvaluator::new(&index, date_range).evaluate(event, position))
}
