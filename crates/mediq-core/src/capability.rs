//! Capability registry — named helper functions an agent may exercise.
//!
//! Capabilities are pure `&str -> String` functions with a description. The
//! registry is built once at startup and shared; agents hold cloned handles,
//! never ownership. Whether a capability runs at all during an invocation is
//! up to the backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CoreError, Result};

type CapabilityFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A named capability with a description the backend can surface to the model.
#[derive(Clone)]
pub struct Capability {
    /// Capability ID (e.g., "safety-check")
    pub id: String,

    /// Display name
    pub name: String,

    /// What this capability does, phrased for the model
    pub description: String,

    handler: CapabilityFn,
}

impl Capability {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        handler: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            handler: Arc::new(handler),
        }
    }

    /// Run the capability on the given input.
    pub fn invoke(&self, input: &str) -> String {
        (self.handler)(input)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Process-wide capability lookup table.
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Registry pre-populated with the four medical capabilities.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Capability::new(
            "interview",
            "Medical Interview Tool",
            "Conducts a structured medical interview using the OPQRST framework. \
             Helps gather comprehensive patient information systematically.",
            |input| format!("Processing patient information: {}", input),
        ));
        registry.register(Capability::new(
            "differential-diagnosis",
            "Differential Diagnosis Generator",
            "Applies clinical reasoning frameworks to generate differential \
             diagnoses. Uses pattern recognition and Bayesian analysis.",
            |input| format!("Analyzing symptoms for differential diagnosis: {}", input),
        ));
        registry.register(Capability::new(
            "safety-check",
            "Safety Check Tool",
            "Identifies red flags and emergency warning signs in the patient \
             presentation. Checks for critical 'can't miss' diagnoses.",
            |input| format!("Performing safety check on: {}", input),
        ));
        registry.register(Capability::new(
            "literacy-check",
            "Health Literacy Checker",
            "Ensures patient communication stays at an appropriate reading level. \
             Checks for medical jargon and suggests plain language alternatives.",
            |input| format!("Checking health literacy of communication: {}", input),
        ));
        registry
    }

    pub fn register(&mut self, capability: Capability) {
        self.capabilities.insert(capability.id.clone(), capability);
    }

    /// Get a capability by ID.
    pub fn get(&self, id: &str) -> Option<&Capability> {
        self.capabilities.get(id)
    }

    /// Resolve a list of capability IDs, preserving order.
    pub fn select(&self, ids: &[String]) -> Result<Vec<Capability>> {
        ids.iter()
            .map(|id| {
                self.capabilities.get(id).cloned().ok_or_else(|| {
                    CoreError::NotFound(format!("Capability '{}' is not registered", id))
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = CapabilityRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for id in [
            "interview",
            "differential-diagnosis",
            "safety-check",
            "literacy-check",
        ] {
            assert!(registry.get(id).is_some(), "missing capability '{}'", id);
        }
    }

    #[test]
    fn test_invoke_echoes_input() {
        let registry = CapabilityRegistry::builtin();
        let interview = registry.get("interview").unwrap();
        assert_eq!(
            interview.invoke("chest pain"),
            "Processing patient information: chest pain"
        );
        let safety = registry.get("safety-check").unwrap();
        assert_eq!(
            safety.invoke("chest pain"),
            "Performing safety check on: chest pain"
        );
    }

    #[test]
    fn test_select_preserves_order() {
        let registry = CapabilityRegistry::builtin();
        let selected = registry
            .select(&[
                "differential-diagnosis".to_string(),
                "safety-check".to_string(),
            ])
            .unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, "differential-diagnosis");
        assert_eq!(selected[1].id, "safety-check");
    }

    #[test]
    fn test_select_unknown_is_not_found() {
        let registry = CapabilityRegistry::builtin();
        let err = registry.select(&["x-ray".to_string()]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(err.to_string().contains("x-ray"));
    }
}
