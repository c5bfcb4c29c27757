//! Core domain types and logic: definition graph, evaluator, aggregator.

pub mod definition;
pub mod graph;
pub mod event;
pub mod node_eval;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
