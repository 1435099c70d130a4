//! Builds agents, tasks, and the diagnostic pipeline from the catalog.
//!
//! The factory is the only place catalog definitions turn into runnable
//! values. Everything it hands out is fresh: a new set of agents and tasks
//! per pipeline, so no state survives from one run to the next.

use std::sync::Arc;

use crate::agent::Agent;
use crate::capability::CapabilityRegistry;
use crate::catalog::PromptCatalog;
use crate::config::ServiceConfig;
use crate::error::{CoreError, Result};
use crate::pipeline::executor::Pipeline;
use crate::pipeline::task::Task;
use crate::rate_limit::RateLimiter;

pub struct PipelineFactory {
    catalog: Arc<PromptCatalog>,
    registry: Arc<CapabilityRegistry>,
    config: ServiceConfig,
}

impl PipelineFactory {
    pub fn new(
        catalog: Arc<PromptCatalog>,
        registry: Arc<CapabilityRegistry>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            catalog,
            registry,
            config,
        }
    }

    /// Build an agent for a role, wiring in the role's declared capabilities
    /// and the process-wide memory flag. Delegation stays off.
    pub fn build_agent(&self, role_id: &str) -> Result<Agent> {
        let role = self.catalog.get_role(role_id)?;
        let capabilities = self.registry.select(&role.capabilities)?;
        Ok(Agent::new(role, capabilities, self.config.memory))
    }

    /// Build a task together with the agent its definition names.
    pub fn build_task(&self, task_id: &str) -> Result<Task> {
        let definition = self.catalog.get_task(task_id)?;
        let agent = self.build_agent(&definition.role)?;
        Ok(Task::new(definition, agent))
    }

    /// Build the full diagnostic chain: every catalog task in declaration
    /// order, each bound to a freshly built agent.
    pub fn diagnostic_pipeline(&self, limiter: Arc<RateLimiter>) -> Result<Pipeline> {
        let data = self.catalog.load()?;
        if data.tasks.is_empty() {
            return Err(CoreError::Catalog("Catalog defines no tasks".to_string()));
        }

        let mut tasks = Vec::with_capacity(data.tasks.len());
        for definition in &data.tasks {
            let agent = self.build_agent(&definition.role)?;
            tasks.push(Task::new(definition.clone(), agent));
        }

        tracing::debug!("[PipelineFactory] Built pipeline with {} tasks", tasks.len());
        Pipeline::new(tasks, limiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::task::TaskState;

    fn factory(memory: bool) -> PipelineFactory {
        let config = ServiceConfig {
            memory,
            ..ServiceConfig::default()
        };
        PipelineFactory::new(
            Arc::new(PromptCatalog::new(None)),
            Arc::new(CapabilityRegistry::builtin()),
            config,
        )
    }

    #[test]
    fn test_build_agent_wires_role_and_capabilities() {
        let agent = factory(true).build_agent("diagnostic_physician").unwrap();
        assert_eq!(agent.name, "diagnostic_physician");
        assert!(agent.memory);
        assert!(!agent.allow_delegation);

        let ids: Vec<&str> = agent.capabilities.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["differential-diagnosis", "safety-check"]);
    }

    #[test]
    fn test_build_agent_respects_memory_flag() {
        let agent = factory(false).build_agent("intake_coordinator").unwrap();
        assert!(!agent.memory);
    }

    #[test]
    fn test_build_agent_unknown_role() {
        let err = factory(true).build_agent("surgeon").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_build_task_binds_the_declared_agent() {
        let task = factory(true).build_task("communication").unwrap();
        assert_eq!(task.name, "communication");
        assert_eq!(task.agent.name, "communication_specialist");
        assert_eq!(task.upstream, vec!["interview", "diagnosis"]);
        assert_eq!(task.state, TaskState::Pending);
    }

    #[test]
    fn test_build_task_unknown_task() {
        let err = factory(true).build_task("surgery").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_diagnostic_pipeline_builds_three_stages() {
        let limiter = Arc::new(RateLimiter::per_minute(0));
        let pipeline = factory(true).diagnostic_pipeline(limiter).unwrap();

        let names: Vec<&str> = pipeline.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["interview", "diagnosis", "communication"]);
        assert!(pipeline
            .tasks()
            .iter()
            .all(|t| t.state == TaskState::Pending));
    }
}
