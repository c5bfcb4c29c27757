//! Reverse adjacency over an algorithm definition.
//!
//! Nodes are addressed by their position in `AlgorithmDefinition::nodes`.
//! For each node the index stores the positions of its inputs in edge order,
//! so "which nodes feed into N" is a slice lookup.

use crate::domain::definition::{AlgorithmDefinition, FilterKind, FilterValue, Node, Operator};
use std::collections::HashMap;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    Active,
    Done,
}

#[derive(Debug)]
pub struct GraphIndex<'a> {
    nodes: &'a [Node],
    positions: HashMap<&'a str, usize>,
    inputs: Vec<Vec<usize>>,
}

impl<'a> GraphIndex<'a> {
    /// Build the index. Edges with an unresolvable endpoint are skipped; on
    /// duplicate ids the first node wins.
    pub fn new(definition: &'a AlgorithmDefinition) -> Self {
        let nodes = definition.nodes.as_slice();
        let mut positions = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            positions.entry(node.id()).or_insert(i);
        }

        let mut inputs = vec![Vec::new(); nodes.len()];
        for edge in &definition.edges {
            let (Some(&from), Some(&to)) = (
                positions.get(edge.from.as_str()),
                positions.get(edge.to.as_str()),
            ) else {
                continue;
            };
            inputs[to].push(from);
        }

        GraphIndex {
            nodes,
            positions,
            inputs,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn node(&self, position: usize) -> &'a Node {
        &self.nodes[position]
    }

    pub fn input_positions(&self, position: usize) -> &[usize] {
        &self.inputs[position]
    }

    /// Upstream nodes of `id` in edge-insertion order. Empty when nothing
    /// feeds the node or the id is unknown.
    pub fn inputs_of(&self, id: &str) -> Vec<&'a Node> {
        match self.position(id) {
            Some(pos) => self.inputs[pos].iter().map(|&i| &self.nodes[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Depth-first search over inputs starting at `start`. Returns the node
    /// that was reached again while still on the stack, if any.
    pub fn find_cycle(&self, start: usize) -> Option<usize> {
        let mut state = vec![Visit::Unseen; self.nodes.len()];
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        state[start] = Visit::Active;

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            match self.inputs[node].get(cursor) {
                Some(&next) => {
                    frame.1 += 1;
                    match state[next] {
                        Visit::Active => return Some(next),
                        Visit::Unseen => {
                            state[next] = Visit::Active;
                            stack.push((next, 0));
                        }
                        Visit::Done => {}
                    }
                }
                None => {
                    state[node] = Visit::Done;
                    stack.pop();
                }
            }
        }
        None
    }

    /// Render the expression rooted at `position`, e.g.
    /// `AND(scenario(X), minReturn(10))`. The graph must be acyclic.
    pub fn render(&self, position: usize) -> String {
        let mut out = String::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();
        if self.open(position, &mut out) {
            stack.push((position, 0));
        }

        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            match self.inputs[node].get(cursor) {
                Some(&input) => {
                    frame.1 += 1;
                    if cursor > 0 {
                        out.push_str(", ");
                    }
                    if self.open(input, &mut out) {
                        stack.push((input, 0));
                    }
                }
                None => {
                    out.push(')');
                    stack.pop();
                }
            }
        }
        out
    }

    /// Write a leaf in full, or an operator's opening `NAME(`. Returns true
    /// when the node still needs its inputs and closing paren.
    fn open(&self, position: usize, out: &mut String) -> bool {
        match &self.nodes[position] {
            Node::Scenario { scenario_id, .. } => {
                let _ = write!(out, "scenario({scenario_id})");
                false
            }
            Node::Filter {
                filter_type, value, ..
            } => {
                let name = match filter_type {
                    FilterKind::Sector => "sector",
                    FilterKind::MinReturn => "minReturn",
                    FilterKind::DateRange => "dateRange",
                    FilterKind::Unknown => "unknownFilter",
                };
                let arg = match value {
                    Some(FilterValue::Number(n)) => n.to_string(),
                    Some(FilterValue::Text(s)) => s.clone(),
                    Some(FilterValue::List(items)) => items.join(", "),
                    Some(FilterValue::Other(raw)) => raw.to_string(),
                    None => String::new(),
                };
                let _ = write!(out, "{name}({arg})");
                false
            }
            Node::Operator { op, .. } => {
                let name = match op {
                    Operator::And => "AND",
                    Operator::Or => "OR",
                    Operator::Not => "NOT",
                };
                out.push_str(name);
                out.push('(');
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::definition::Edge;

    fn diamond() -> AlgorithmDefinition {
        AlgorithmDefinition::new(
            vec![
                Node::scenario("s1", "X"),
                Node::operator("left", Operator::Or),
                Node::operator("right", Operator::Not),
                Node::operator("out", Operator::And),
            ],
            vec![
                Edge::new("s1", "left"),
                Edge::new("s1", "right"),
                Edge::new("left", "out"),
                Edge::new("right", "out"),
            ],
            "out",
        )
    }

    #[test]
    fn inputs_in_edge_order() {
        let def = diamond();
        let index = GraphIndex::new(&def);
        let ids: Vec<&str> = index.inputs_of("out").iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["left", "right"]);
    }

    #[test]
    fn inputs_of_leaf_is_empty() {
        let def = diamond();
        let index = GraphIndex::new(&def);
        assert!(index.inputs_of("s1").is_empty());
        assert!(index.inputs_of("missing").is_empty());
    }

    #[test]
    fn dangling_edges_are_skipped() {
        let mut def = diamond();
        def.edges.insert(0, Edge::new("ghost", "out"));
        let index = GraphIndex::new(&def);
        assert_eq!(index.inputs_of("out").len(), 2);
    }

    #[test]
    fn diamond_has_no_cycle() {
        let def = diamond();
        let index = GraphIndex::new(&def);
        let out = index.position("out").unwrap();
        assert_eq!(index.find_cycle(out), None);
    }

    #[test]
    fn finds_cycle() {
        let mut def = diamond();
        def.edges.push(Edge::new("out", "s1"));
        let index = GraphIndex::new(&def);
        let out = index.position("out").unwrap();
        assert!(index.find_cycle(out).is_some());
    }

    #[test]
    fn renders_expression() {
        let def = diamond();
        let index = GraphIndex::new(&def);
        let out = index.position("out").unwrap();
        assert_eq!(
            index.render(out),
            "AND(OR(scenario(X)), NOT(scenario(X)))"
        );
    }

    #[test]
    fn renders_filters() {
        let def = AlgorithmDefinition::new(
            vec![
                Node::filter("f1", FilterKind::MinReturn, Some(FilterValue::Number(10.0))),
                Node::filter("f2", FilterKind::Sector, Some(FilterValue::Text("Energy".into()))),
                Node::operator("op", Operator::Or),
            ],
            vec![Edge::new("f1", "op"), Edge::new("f2", "op")],
            "op",
        );
        let index = GraphIndex::new(&def);
        assert_eq!(
            index.render(index.position("op").unwrap()),
            "OR(minReturn(10), sector(Energy))"
        );
    }

    #[test]
    fn renders_deep_chain() {
        let depth = 100_000;
        let mut nodes = vec![Node::scenario("n0", "X")];
        let mut edges = Vec::with_capacity(depth);
        for i in 1..=depth {
            nodes.push(Node::operator(&format!("n{i}"), Operator::Not));
            edges.push(Edge::new(&format!("n{}", i - 1), &format!("n{i}")));
        }
        let def = AlgorithmDefinition::new(nodes, edges, &format!("n{depth}"));
        let index = GraphIndex::new(&def);

        let rendered = index.render(index.position(&def.output_node_id).unwrap());
        assert!(rendered.starts_with("NOT(NOT("));
        assert!(rendered.contains("scenario(X)"));
        assert_eq!(rendered.matches('(').count(), depth + 1);
        assert_eq!(rendered.matches(')').count(), depth + 1);
        assert_eq!(index.find_cycle(depth), None);
    }
}
