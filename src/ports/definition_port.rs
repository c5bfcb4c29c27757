//! Algorithm definition store port trait.

use crate::domain::definition::AlgorithmDefinition;
use crate::domain::error::EventTraderError;

/// A stored algorithm as listed by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAlgorithm {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_preset: bool,
    pub definition: AlgorithmDefinition,
}

pub trait DefinitionPort {
    /// Presets first (by name), then user algorithms in store order.
    fn list(&self) -> Result<Vec<StoredAlgorithm>, EventTraderError>;

    fn get(&self, id: &str) -> Result<Option<StoredAlgorithm>, EventTraderError> {
        Ok(self.list()?.into_iter().find(|a| a.id == id))
    }
}
