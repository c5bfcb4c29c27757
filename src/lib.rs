//! eventtrader: scenario algorithm backtester over historical market events.
//!
//! Hexagonal architecture: the evaluation core in [`domain`], port traits in
//! [`ports`], file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
