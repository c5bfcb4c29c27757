//! Concrete adapter implementations for ports.

pub mod csv_corpus_adapter;
pub mod file_config_adapter;
pub mod json_definition_store;
pub mod json_report_adapter;
