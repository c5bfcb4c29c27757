//! Port traits for the external collaborators of the backtest core.

pub mod config_port;
pub mod corpus_port;
pub mod definition_port;
pub mod report_port;
