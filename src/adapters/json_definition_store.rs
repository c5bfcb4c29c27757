//! JSON file algorithm store.
//!
//! The store is a JSON array of algorithms in the preset seed format:
//!
//! ```json
//! [{ "id": "div-momentum", "name": "Dividend momentum", "description": "...",
//!    "isPreset": true, "definition": { "nodes": [], "edges": [], "outputNodeId": "op1" } }]
//! ```
//!
//! `id` defaults to a slug of the name, `isPreset` defaults to `true`, and
//! `definition` may also be a JSON-encoded string.

use crate::domain::definition::AlgorithmDefinition;
use crate::domain::error::EventTraderError;
use crate::ports::config_port::ConfigPort;
use crate::ports::definition_port::{DefinitionPort, StoredAlgorithm};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DefinitionSource {
    Inline(AlgorithmDefinition),
    Encoded(String),
}

impl DefinitionSource {
    fn into_definition(self) -> Result<AlgorithmDefinition, serde_json::Error> {
        match self {
            DefinitionSource::Inline(def) => Ok(def),
            DefinitionSource::Encoded(text) => serde_json::from_str(&text),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_preset")]
    is_preset: bool,
    definition: DefinitionSource,
}

fn default_preset() -> bool {
    true
}

pub struct JsonDefinitionStore {
    path: PathBuf,
}

impl JsonDefinitionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EventTraderError> {
        let path = config
            .get_string("algorithms", "store_path")
            .ok_or_else(|| EventTraderError::ConfigMissing {
                section: "algorithms".into(),
                key: "store_path".into(),
            })?;
        Ok(Self::new(PathBuf::from(path)))
    }
}

/// Lowercase, alphanumerics kept, every other run collapsed to one `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

impl DefinitionPort for JsonDefinitionStore {
    fn list(&self) -> Result<Vec<StoredAlgorithm>, EventTraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| EventTraderError::Store {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let records: Vec<StoredRecord> =
            serde_json::from_str(&content).map_err(|e| EventTraderError::Store {
                reason: format!("invalid store {}: {}", self.path.display(), e),
            })?;

        let mut seen = HashSet::new();
        let mut algorithms = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id.unwrap_or_else(|| slugify(&record.name));
            if !seen.insert(id.clone()) {
                return Err(EventTraderError::Store {
                    reason: format!("duplicate algorithm id {id:?}"),
                });
            }
            let definition =
                record
                    .definition
                    .into_definition()
                    .map_err(|e| EventTraderError::Store {
                        reason: format!("algorithm {id:?} has an invalid definition: {e}"),
                    })?;
            algorithms.push(StoredAlgorithm {
                id,
                name: record.name,
                description: record.description,
                is_preset: record.is_preset,
                definition,
            });
        }

        let (mut presets, user): (Vec<_>, Vec<_>) =
            algorithms.into_iter().partition(|a| a.is_preset);
        presets.sort_by(|a, b| a.name.cmp(&b.name));
        presets.extend(user);
        Ok(presets)
    }
}

/// Read a single definition from a file, either as an object or as a
/// JSON-encoded string.
pub fn read_definition_file(path: &Path) -> Result<AlgorithmDefinition, EventTraderError> {
    let content = fs::read_to_string(path)?;
    let source: DefinitionSource = serde_json::from_str(&content)?;
    Ok(source.into_definition()?)
}
