//! Inference backend boundary — how agents reach a model.
//!
//! The pipeline never talks HTTP itself; it hands an [`InvocationRequest`] to
//! whatever implements [`InferenceBackend`]. Whether (and how often) the
//! request's capabilities run during the invocation is the backend's call.
//! [`HttpBackend`] is the production implementation, speaking the
//! OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;

use crate::capability::Capability;
use crate::catalog::RoleDef;
use crate::config::ServiceConfig;
use crate::error::{CoreError, Result};

/// Everything a backend needs for one agent invocation.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// The persona performing the work
    pub role: RoleDef,

    /// Task instructions, placeholders already resolved
    pub description: String,

    /// Description of the artifact the invocation should produce
    pub expected_output: String,

    /// Outputs of upstream tasks, already assembled in order. Empty for the
    /// first task in a pipeline.
    pub context: String,

    /// Capabilities the backend may exercise during the invocation
    pub capabilities: Vec<Capability>,

    /// Whether the agent carries memory within the run
    pub memory: bool,
}

impl InvocationRequest {
    /// Persona system prompt: identity, goal, and available capabilities.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}. {}\n\nYour goal: {}",
            self.role.name, self.role.backstory, self.role.goal
        );
        if !self.capabilities.is_empty() {
            prompt.push_str("\n\nYou may use these capabilities when helpful:");
            for capability in &self.capabilities {
                prompt.push_str(&format!("\n- {}: {}", capability.name, capability.description));
            }
        }
        prompt
    }

    /// User prompt: the task itself, upstream context, and the expected
    /// output criteria.
    pub fn user_prompt(&self) -> String {
        let mut prompt = self.description.clone();
        if !self.context.is_empty() {
            prompt.push_str("\n\nThis is the context you are working with:\n");
            prompt.push_str(&self.context);
        }
        prompt.push_str("\n\nExpected output: ");
        prompt.push_str(&self.expected_output);
        prompt
    }
}

/// The opaque inference boundary the pipeline depends on.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Perform one invocation and return the produced text.
    async fn invoke(&self, request: &InvocationRequest) -> Result<String>;

    /// Model identity, for logs and reports.
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat completions backend.
///
/// POST {base_url}/chat/completions
/// Headers:
///   Authorization: Bearer {api_key}
///   content-type: application/json
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            CoreError::Config(
                "No API key found. Set MEDIQ_API_KEY or OPENAI_API_KEY".to_string(),
            )
        })?;

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300)) // 5 min timeout
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl InferenceBackend for HttpBackend {
    async fn invoke(&self, request: &InvocationRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let messages = vec![
            serde_json::json!({
                "role": "system",
                "content": request.system_prompt()
            }),
            serde_json::json!({
                "role": "user",
                "content": request.user_prompt()
            }),
        ];

        let body = serde_json::json!({
            "model": self.model,
            "messages": messages
        });

        tracing::info!(
            "[HttpBackend] Calling {} (model: {}, role: {})",
            url,
            self.model,
            request.role.id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Backend(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| CoreError::Backend(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(CoreError::Backend(format!(
                "API returned {}: {}",
                status, response_text
            )));
        }

        let json: serde_json::Value = serde_json::from_str(&response_text)
            .map_err(|e| CoreError::Backend(format!("Failed to parse response JSON: {}", e)))?;

        json.get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                CoreError::Backend("Response contained no message content".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityRegistry;
    use crate::catalog::builtin_roles;

    fn request() -> InvocationRequest {
        let registry = CapabilityRegistry::builtin();
        InvocationRequest {
            role: builtin_roles().remove(1),
            description: "Build a differential diagnosis".to_string(),
            expected_output: "A ranked differential".to_string(),
            context: String::new(),
            capabilities: registry
                .select(&[
                    "differential-diagnosis".to_string(),
                    "safety-check".to_string(),
                ])
                .unwrap(),
            memory: true,
        }
    }

    #[test]
    fn test_system_prompt_lists_capabilities() {
        let prompt = request().system_prompt();
        assert!(prompt.contains("You are Diagnostic Physician."));
        assert!(prompt.contains("Differential Diagnosis Generator"));
        assert!(prompt.contains("Safety Check Tool"));
    }

    #[test]
    fn test_user_prompt_with_context() {
        let mut req = request();
        req.context = "## interview\nIntake summary".to_string();
        let prompt = req.user_prompt();
        assert!(prompt.starts_with("Build a differential diagnosis"));
        assert!(prompt.contains("This is the context you are working with:"));
        assert!(prompt.contains("Intake summary"));
        assert!(prompt.contains("Expected output: A ranked differential"));
    }

    #[test]
    fn test_user_prompt_without_context() {
        let prompt = request().user_prompt();
        assert!(!prompt.contains("context you are working with"));
        assert!(prompt.contains("Expected output:"));
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = ServiceConfig::default();
        let err = HttpBackend::from_config(&config).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));

        let with_key = ServiceConfig {
            api_key: Some("sk-test".to_string()),
            ..ServiceConfig::default()
        };
        let backend = HttpBackend::from_config(&with_key).unwrap();
        assert_eq!(backend.model_name(), "gpt-4o");
    }
}
