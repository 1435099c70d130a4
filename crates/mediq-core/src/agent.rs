//! Agents — a role bound to its capabilities for the duration of a run.
//!
//! Agents are cheap, short-lived values: the factory builds a fresh set for
//! every pipeline run, so nothing an agent sees in one run can leak into the
//! next. Delegation between agents is always off; task order alone decides
//! who works when.

use crate::backend::{InferenceBackend, InvocationRequest};
use crate::capability::Capability;
use crate::catalog::RoleDef;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct Agent {
    /// Agent name, same as the role ID
    pub name: String,

    /// The persona this agent speaks as
    pub identity: RoleDef,

    /// Capabilities available to the backend during invocations
    pub capabilities: Vec<Capability>,

    /// Whether invocations carry memory within the run
    pub memory: bool,

    /// Always false; agents never hand work to each other
    pub allow_delegation: bool,
}

impl Agent {
    pub fn new(identity: RoleDef, capabilities: Vec<Capability>, memory: bool) -> Self {
        Self {
            name: identity.id.clone(),
            identity,
            capabilities,
            memory,
            allow_delegation: false,
        }
    }

    /// Run one invocation through the backend.
    pub async fn execute(
        &self,
        backend: &dyn InferenceBackend,
        description: &str,
        expected_output: &str,
        context: &str,
    ) -> Result<String> {
        let request = InvocationRequest {
            role: self.identity.clone(),
            description: description.to_string(),
            expected_output: expected_output.to_string(),
            context: context.to_string(),
            capabilities: self.capabilities.clone(),
            memory: self.memory,
        };

        tracing::debug!(
            "[Agent] {} invoking backend (model: {})",
            self.name,
            backend.model_name()
        );
        backend.invoke(&request).await
    }
}
