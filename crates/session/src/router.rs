//! Model capability routing.
//!
//! Resolves the capability of the selected model and upgrades text-only
//! selections to the vision fallback when a scanned PDF is attached.

use edumind_core::attachment::ExtractedContent;
use edumind_core::model::{Capability, ModelRegistry};
use tracing::{info, warn};

/// The model a send will actually target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub model: String,
    pub capability: Capability,
    /// User-visible note when the model was switched automatically.
    pub notice: Option<String>,
}

impl RouteDecision {
    pub fn is_vision(&self) -> bool {
        self.capability.is_vision()
    }
}

pub struct ModelCapabilityRouter {
    registry: ModelRegistry,
    vision_fallback: String,
}

impl ModelCapabilityRouter {
    pub fn new(registry: ModelRegistry, vision_fallback: impl Into<String>) -> Self {
        Self {
            registry,
            vision_fallback: vision_fallback.into(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Static capability of `model`. Unknown ids are treated as text-only.
    pub fn capability_of(&self, model: &str) -> Capability {
        self.registry.capability_of(model).unwrap_or_else(|| {
            warn!(model = %model, "Model not in registry, assuming text-only");
            Capability::Text
        })
    }

    /// Decide the final model given the pre-scanned attachment contents.
    ///
    /// Vision models are never downgraded.
    pub fn route(&self, selected: &str, extracted: &[ExtractedContent]) -> RouteDecision {
        let capability = self.capability_of(selected);
        let has_scan = extracted.iter().any(ExtractedContent::is_scanned);

        if has_scan && !capability.is_vision() {
            info!(
                from = %selected,
                to = %self.vision_fallback,
                "Scanned PDF attached, switching to vision model"
            );
            return RouteDecision {
                model: self.vision_fallback.clone(),
                capability: Capability::Vision,
                notice: Some(format!(
                    "[scanned PDF detected, switched to vision model {}]",
                    self.vision_fallback
                )),
            };
        }

        RouteDecision {
            model: selected.to_string(),
            capability,
            notice: None,
        }
    }
}
