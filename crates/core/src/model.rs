//! Model descriptors and the capability registry.
//!
//! Capability is a static property of a model id, looked up here. It is
//! never guessed from the id string or from conversation state.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// What kind of content a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// String content only
    Text,
    /// Accepts image content parts
    Vision,
}

impl Capability {
    pub fn is_vision(self) -> bool {
        matches!(self, Self::Vision)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Text => "text",
            Self::Vision => "vision",
        })
    }
}

/// A selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Backend model id
    pub id: String,

    /// Display name
    pub label: String,

    pub capability: Capability,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>, capability: Capability) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            capability,
        }
    }
}

/// Registry mapping model id → descriptor, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. A later registration of the same id replaces the
    /// earlier one in place.
    pub fn register(&mut self, descriptor: ModelDescriptor) {
        match self.index.get(&descriptor.id) {
            Some(&i) => self.models[i] = descriptor,
            None => {
                self.index.insert(descriptor.id.clone(), self.models.len());
                self.models.push(descriptor);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.index.get(id).map(|&i| &self.models[i])
    }

    pub fn capability_of(&self, id: &str) -> Option<Capability> {
        self.get(id).map(|d| d.capability)
    }

    /// All registered models, in registration order.
    pub fn list(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<ModelDescriptor> for ModelRegistry {
    fn from_iter<I: IntoIterator<Item = ModelDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModelRegistry {
        [
            ModelDescriptor::new("deepseek-ai/DeepSeek-V3", "DeepSeek-V3", Capability::Text),
            ModelDescriptor::new("deepseek-ai/deepseek-vl2", "DeepSeek-VL2", Capability::Vision),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn lookup_by_id() {
        let reg = registry();
        assert_eq!(reg.capability_of("deepseek-ai/DeepSeek-V3"), Some(Capability::Text));
        assert_eq!(reg.capability_of("deepseek-ai/deepseek-vl2"), Some(Capability::Vision));
        assert_eq!(reg.capability_of("unknown/model-vl2"), None);
    }

    #[test]
    fn reregistering_replaces_in_place() {
        let mut reg = registry();
        reg.register(ModelDescriptor::new(
            "deepseek-ai/DeepSeek-V3",
            "V3 (vision build)",
            Capability::Vision,
        ));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.list()[0].label, "V3 (vision build)");
        assert!(reg.capability_of("deepseek-ai/DeepSeek-V3").unwrap().is_vision());
    }

    #[test]
    fn capability_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Capability::Vision).unwrap(), "\"vision\"");
        assert_eq!(Capability::Text.to_string(), "text");
    }
}
