//! Algorithm definition data model.
//!
//! A definition is a directed graph of nodes with one designated output node:
//! - `Node::Scenario`: matches events of one scenario
//! - `Node::Filter`: sector / minimum-return / date-range predicates
//! - `Node::Operator`: AND / OR / NOT over the node's inputs
//!
//! An `Edge { from, to }` makes `from` an input of `to`. Operator arity is not
//! enforced: AND/OR accept any number of inputs and NOT only looks at its first.

use crate::domain::error::DefinitionError;
use crate::domain::graph::GraphIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Node {
    Scenario {
        id: String,
        scenario_id: String,
    },
    Filter {
        id: String,
        filter_type: FilterKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<FilterValue>,
    },
    Operator {
        id: String,
        op: Operator,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    Sector,
    MinReturn,
    DateRange,
    /// Any filter type this build does not know; never matches.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
    Not,
}

/// Raw filter argument as authored in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
    /// Any other JSON shape (booleans, objects, mixed arrays). Never matches.
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmDefinition {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    pub output_node_id: String,
    /// Per-node weights stored by the editor. Not used by evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
}

impl Node {
    pub fn scenario(id: &str, scenario_id: &str) -> Self {
        Node::Scenario {
            id: id.to_string(),
            scenario_id: scenario_id.to_string(),
        }
    }

    pub fn filter(id: &str, filter_type: FilterKind, value: Option<FilterValue>) -> Self {
        Node::Filter {
            id: id.to_string(),
            filter_type,
            value,
        }
    }

    pub fn operator(id: &str, op: Operator) -> Self {
        Node::Operator {
            id: id.to_string(),
            op,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Scenario { id, .. } | Node::Filter { id, .. } | Node::Operator { id, .. } => id,
        }
    }
}

impl FilterValue {
    /// Numeric threshold for `minReturn`.
    ///
    /// Strings are trimmed and an empty string counts as zero. Lists, other
    /// shapes and unparsable strings have no threshold.
    pub fn threshold(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok()
                }
            }
            FilterValue::List(_) | FilterValue::Other(_) => None,
        }
    }

    /// Sector names for the `sector` filter.
    pub fn sectors(&self) -> Vec<String> {
        match self {
            FilterValue::List(items) => items.clone(),
            FilterValue::Text(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            FilterValue::Number(n) => vec![n.to_string()],
            FilterValue::Other(_) => Vec::new(),
        }
    }
}

impl Edge {
    pub fn new(from: &str, to: &str) -> Self {
        Edge {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl AlgorithmDefinition {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, output_node_id: &str) -> Self {
        AlgorithmDefinition {
            nodes,
            edges,
            output_node_id: output_node_id.to_string(),
            weights: None,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Check the structural invariants required before evaluation.
    ///
    /// Order of checks: output node, unique ids, edge endpoints, then a
    /// depth-first cycle search from the output node.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.node(&self.output_node_id).is_none() {
            return Err(DefinitionError::MissingOutputNode {
                id: self.output_node_id.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id()) {
                return Err(DefinitionError::DuplicateNode {
                    id: node.id().to_string(),
                });
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !seen.contains(endpoint.as_str()) {
                    return Err(DefinitionError::DanglingEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }

        let index = GraphIndex::new(self);
        if let Some(output) = index.position(&self.output_node_id) {
            if let Some(node) = index.find_cycle(output) {
                return Err(DefinitionError::Cycle {
                    node: index.node(node).id().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_of_scenario_and_min_return() -> AlgorithmDefinition {
        AlgorithmDefinition::new(
            vec![
                Node::scenario("s1", "X"),
                Node::filter("f1", FilterKind::MinReturn, Some(FilterValue::Number(10.0))),
                Node::operator("op1", Operator::And),
            ],
            vec![Edge::new("s1", "op1"), Edge::new("f1", "op1")],
            "op1",
        )
    }

    #[test]
    fn deserializes_node_shapes() {
        let json = r#"{
            "nodes": [
                { "id": "s1", "type": "scenario", "scenarioId": "dividend-increase" },
                { "id": "f1", "type": "filter", "filterType": "minReturn", "value": 10 },
                { "id": "f2", "type": "filter", "filterType": "sector", "value": ["Technology", "Energy"] },
                { "id": "f3", "type": "filter", "filterType": "dateRange" },
                { "id": "op1", "type": "operator", "op": "AND" }
            ],
            "edges": [ { "from": "s1", "to": "op1" } ],
            "outputNodeId": "op1"
        }"#;
        let def: AlgorithmDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(def.nodes.len(), 5);
        assert_eq!(def.nodes[0], Node::scenario("s1", "dividend-increase"));
        assert_eq!(
            def.nodes[1],
            Node::filter("f1", FilterKind::MinReturn, Some(FilterValue::Number(10.0)))
        );
        assert_eq!(
            def.nodes[2],
            Node::filter(
                "f2",
                FilterKind::Sector,
                Some(FilterValue::List(vec!["Technology".into(), "Energy".into()]))
            )
        );
        assert_eq!(def.nodes[3], Node::filter("f3", FilterKind::DateRange, None));
        assert_eq!(def.nodes[4], Node::operator("op1", Operator::And));
        assert_eq!(def.edges, vec![Edge::new("s1", "op1")]);
        assert_eq!(def.output_node_id, "op1");
        assert!(def.weights.is_none());
    }

    #[test]
    fn unknown_filter_type_deserializes() {
        let json = r#"{ "id": "f1", "type": "filter", "filterType": "volatility", "value": 3 }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert!(matches!(
            node,
            Node::Filter {
                filter_type: FilterKind::Unknown,
                ..
            }
        ));
    }

    #[test]
    fn odd_filter_values_still_deserialize() {
        let json = r#"{
            "nodes": [
                { "id": "f1", "type": "filter", "filterType": "minReturn", "value": true },
                { "id": "f2", "type": "filter", "filterType": "sector", "value": [10, 20] },
                { "id": "op1", "type": "operator", "op": "OR" }
            ],
            "edges": [ { "from": "f1", "to": "op1" }, { "from": "f2", "to": "op1" } ],
            "outputNodeId": "op1"
        }"#;
        let def: AlgorithmDefinition = serde_json::from_str(json).unwrap();
        let Node::Filter { value: Some(first), .. } = &def.nodes[0] else {
            panic!("expected filter node");
        };
        let Node::Filter { value: Some(second), .. } = &def.nodes[1] else {
            panic!("expected filter node");
        };
        assert_eq!(first, &FilterValue::Other(serde_json::json!(true)));
        assert_eq!(second, &FilterValue::Other(serde_json::json!([10, 20])));
        assert_eq!(first.threshold(), None);
        assert!(second.sectors().is_empty());
        assert_eq!(def.validate(), Ok(()));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let json = r#"{ "id": "op1", "type": "operator", "op": "XOR" }"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(and_of_scenario_and_min_return()).unwrap();
        assert_eq!(value["outputNodeId"], "op1");
        assert_eq!(value["nodes"][0]["type"], "scenario");
        assert_eq!(value["nodes"][0]["scenarioId"], "X");
        assert_eq!(value["nodes"][1]["filterType"], "minReturn");
        assert_eq!(value["nodes"][2]["op"], "AND");
        assert!(value.get("weights").is_none());
    }

    #[test]
    fn weights_round_trip() {
        let json = r#"{ "nodes": [], "edges": [], "outputNodeId": "x", "weights": { "s1": 0.5 } }"#;
        let def: AlgorithmDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.weights.as_ref().and_then(|w| w.get("s1")), Some(&0.5));
    }

    #[test]
    fn threshold_conversions() {
        assert_eq!(FilterValue::Number(-2.5).threshold(), Some(-2.5));
        assert_eq!(FilterValue::Text(" 12 ".into()).threshold(), Some(12.0));
        assert_eq!(FilterValue::Text("".into()).threshold(), Some(0.0));
        assert_eq!(FilterValue::Text("ten".into()).threshold(), None);
        assert_eq!(FilterValue::List(vec!["5".into()]).threshold(), None);
    }

    #[test]
    fn sector_normalization() {
        assert_eq!(
            FilterValue::Text("Technology, Energy ,,Utilities".into()).sectors(),
            vec!["Technology", "Energy", "Utilities"]
        );
        assert_eq!(
            FilterValue::List(vec!["Health Care".into()]).sectors(),
            vec!["Health Care"]
        );
        assert_eq!(FilterValue::Number(5.0).sectors(), vec!["5"]);
    }

    #[test]
    fn validate_accepts_well_formed_definition() {
        assert_eq!(and_of_scenario_and_min_return().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_missing_output() {
        let mut def = and_of_scenario_and_min_return();
        def.output_node_id = "nope".into();
        assert_eq!(
            def.validate(),
            Err(DefinitionError::MissingOutputNode { id: "nope".into() })
        );
    }

    #[test]
    fn validate_rejects_empty_definition() {
        let def = AlgorithmDefinition::new(vec![], vec![], "op1");
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::MissingOutputNode { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let mut def = and_of_scenario_and_min_return();
        def.nodes.push(Node::scenario("s1", "Y"));
        assert_eq!(
            def.validate(),
            Err(DefinitionError::DuplicateNode { id: "s1".into() })
        );
    }

    #[test]
    fn validate_rejects_dangling_edge() {
        let mut def = and_of_scenario_and_min_return();
        def.edges.push(Edge::new("ghost", "op1"));
        assert_eq!(
            def.validate(),
            Err(DefinitionError::DanglingEdge {
                from: "ghost".into(),
                to: "op1".into(),
                missing: "ghost".into(),
            })
        );
    }

    #[test]
    fn validate_rejects_cycle_reachable_from_output() {
        let def = AlgorithmDefinition::new(
            vec![
                Node::operator("a", Operator::And),
                Node::operator("b", Operator::Or),
                Node::scenario("s1", "X"),
            ],
            vec![Edge::new("s1", "a"), Edge::new("b", "a"), Edge::new("a", "b")],
            "a",
        );
        assert!(matches!(def.validate(), Err(DefinitionError::Cycle { .. })));
    }

    #[test]
    fn validate_rejects_self_loop() {
        let def = AlgorithmDefinition::new(
            vec![Node::operator("a", Operator::Not)],
            vec![Edge::new("a", "a")],
            "a",
        );
        assert_eq!(
            def.validate(),
            Err(DefinitionError::Cycle { node: "a".into() })
        );
    }

    #[test]
    fn validate_ignores_cycle_not_reachable_from_output() {
        let def = AlgorithmDefinition::new(
            vec![
                Node::scenario("s1", "X"),
                Node::operator("a", Operator::And),
                Node::operator("b", Operator::And),
            ],
            vec![Edge::new("a", "b"), Edge::new("b", "a")],
            "s1",
        );
        assert_eq!(def.validate(), Ok(()));
    }
}
