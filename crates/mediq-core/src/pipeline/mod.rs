//! Pipeline engine - sequential multi-agent task orchestration.
//!
//! Catalog definitions become runnable pipelines here, then execute one task
//! at a time with upstream outputs flowing downstream as context.
//!
//! # Architecture
//!
//! ```text
//! roles.yaml / tasks.yaml ──► PromptCatalog ──► PipelineFactory
//!                                                    │
//!                                               Pipeline (ordered Tasks)
//!                                                    │
//!                                          InferenceBackend (HTTP / mock)
//! ```

pub mod executor;
pub mod factory;
pub mod task;

pub use executor::{Pipeline, PipelineResult};
pub use factory::PipelineFactory;
pub use task::{Task, TaskReport, TaskState};
