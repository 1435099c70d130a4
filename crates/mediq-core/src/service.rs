//! Diagnostic service facade.
//!
//! [`DiagnosticService`] is the one entry point callers use. Its contract:
//! `analyze` never returns an error — every outcome, including invalid input
//! and backend failures, is folded into a [`ResultEnvelope`] so transport
//! layers can serialize it without special cases.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::InferenceBackend;
use crate::capability::CapabilityRegistry;
use crate::catalog::PromptCatalog;
use crate::config::ServiceConfig;
use crate::error::{CoreError, Result};
use crate::pipeline::{PipelineFactory, PipelineResult};
use crate::rate_limit::RateLimiter;

/// Roles the diagnostic chain cannot run without.
pub const REQUIRED_ROLES: &[&str] = &[
    "intake_coordinator",
    "diagnostic_physician",
    "communication_specialist",
];

/// Tasks the diagnostic chain cannot run without.
pub const REQUIRED_TASKS: &[&str] = &["interview", "diagnosis", "communication"];

/// Outcome of one analysis, success or failure, with timing metadata.
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub metadata: EnvelopeMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub patient_input_length: usize,
}

/// Readiness report for the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Facade over the catalog, capability registry, rate limiter, and pipeline.
pub struct DiagnosticService {
    config: ServiceConfig,
    backend: Arc<dyn InferenceBackend>,
    catalog: Arc<PromptCatalog>,
    factory: PipelineFactory,
    limiter: Arc<RateLimiter>,
}

impl DiagnosticService {
    pub fn new(config: ServiceConfig, backend: Arc<dyn InferenceBackend>) -> Self {
        let catalog = Arc::new(PromptCatalog::new(
            config.catalog_dir.as_ref().map(PathBuf::from),
        ));
        let registry = Arc::new(CapabilityRegistry::builtin());
        let limiter = Arc::new(RateLimiter::per_minute(config.max_rpm));
        let factory = PipelineFactory::new(catalog.clone(), registry, config.clone());

        tracing::info!(
            "[DiagnosticService] Initialized (model: {}, rate ceiling: {}/min)",
            backend.model_name(),
            limiter.limit()
        );

        Self {
            config,
            backend,
            catalog,
            factory,
            limiter,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The catalog backing this service. Reloading it makes later analyses
    /// pick up edited definitions.
    pub fn catalog(&self) -> &Arc<PromptCatalog> {
        &self.catalog
    }

    /// Analyze the patient's description through the full diagnostic chain.
    ///
    /// Blank input fails fast without touching the backend. Whatever
    /// happens, the caller gets an envelope, never an `Err`.
    pub async fn analyze(&self, patient_input: &str) -> ResultEnvelope {
        let start_time = Utc::now();
        let started = Instant::now();
        tracing::info!("[DiagnosticService] Starting symptom analysis");

        let outcome = self.run_pipeline(patient_input).await;
        self.envelope(patient_input, start_time, started, outcome)
    }

    /// Like [`analyze`](Self::analyze), but abandons the run once `timeout`
    /// elapses and reports it as a failure envelope.
    pub async fn analyze_with_timeout(
        &self,
        patient_input: &str,
        timeout: Duration,
    ) -> ResultEnvelope {
        let start_time = Utc::now();
        let started = Instant::now();
        tracing::info!(
            "[DiagnosticService] Starting symptom analysis (timeout: {}s)",
            timeout.as_secs()
        );

        let outcome = match tokio::time::timeout(timeout, self.run_pipeline(patient_input)).await
        {
            Ok(inner) => inner,
            Err(_) => Err(CoreError::Timeout(format!(
                "Analysis did not finish within {}s",
                timeout.as_secs()
            ))),
        };
        self.envelope(patient_input, start_time, started, outcome)
    }

    /// Healthy iff the catalog loads and every required role and task
    /// resolves.
    pub fn health_check(&self) -> HealthStatus {
        match self.probe_catalog() {
            Ok(()) => HealthStatus {
                status: "healthy".to_string(),
                timestamp: Utc::now(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                error: None,
            },
            Err(e) => {
                tracing::error!("[DiagnosticService] Health check failed: {}", e);
                HealthStatus {
                    status: "unhealthy".to_string(),
                    timestamp: Utc::now(),
                    version: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn run_pipeline(&self, patient_input: &str) -> Result<PipelineResult> {
        if patient_input.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "Patient input cannot be empty".to_string(),
            ));
        }

        let mut pipeline = self.factory.diagnostic_pipeline(self.limiter.clone())?;
        let mut inputs = HashMap::new();
        inputs.insert("patient_input".to_string(), patient_input.to_string());
        pipeline.run(self.backend.as_ref(), &inputs).await
    }

    fn envelope(
        &self,
        patient_input: &str,
        start_time: DateTime<Utc>,
        started: Instant,
        outcome: Result<PipelineResult>,
    ) -> ResultEnvelope {
        let end_time = Utc::now();
        let duration_seconds = started.elapsed().as_secs_f64();
        let metadata = EnvelopeMetadata {
            start_time,
            end_time,
            duration_seconds,
            patient_input_length: patient_input.chars().count(),
        };

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "[DiagnosticService] Analysis completed in {:.2}s",
                    duration_seconds
                );
                ResultEnvelope {
                    success: true,
                    result: Some(result.final_output),
                    error: None,
                    metadata,
                }
            }
            Err(e) => {
                tracing::error!("[DiagnosticService] Analysis failed: {}", e);
                ResultEnvelope {
                    success: false,
                    result: None,
                    error: Some(e.to_string()),
                    metadata,
                }
            }
        }
    }

    fn probe_catalog(&self) -> Result<()> {
        let data = self.catalog.load()?;
        for role in REQUIRED_ROLES {
            if data.role(role).is_none() {
                return Err(CoreError::NotFound(format!(
                    "Role '{}' not found in catalog",
                    role
                )));
            }
        }
        for task in REQUIRED_TASKS {
            if data.task(task).is_none() {
                return Err(CoreError::NotFound(format!(
                    "Task '{}' not found in catalog",
                    task
                )));
            }
        }
        Ok(())
    }
}
