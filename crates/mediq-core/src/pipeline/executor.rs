//! Sequential pipeline execution.
//!
//! A pipeline is an ordered list of tasks. Execution walks the list in
//! declaration order, feeding each task the outputs of the upstream tasks it
//! names. The first failure aborts the run: the failing task is marked
//! failed, everything after it stays pending, and the error propagates to
//! the caller. There is no retry and no parallelism here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::backend::InferenceBackend;
use crate::catalog::resolve_placeholders;
use crate::error::{CoreError, Result};
use crate::pipeline::task::{Task, TaskReport, TaskState};
use crate::rate_limit::RateLimiter;

/// An ordered chain of tasks sharing one rate limiter.
#[derive(Debug)]
pub struct Pipeline {
    tasks: Vec<Task>,
    limiter: Arc<RateLimiter>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Output of the last task in the chain
    pub final_output: String,

    /// Per-task reports, in execution order
    pub tasks: Vec<TaskReport>,

    /// Wall time for the whole run
    pub duration_ms: u64,
}

impl Pipeline {
    /// Build a pipeline, validating the task topology.
    ///
    /// Every upstream reference must name a task declared earlier in the
    /// list. A task naming itself or a later task is a cycle under
    /// sequential execution; a name that matches no task at all is a
    /// lookup failure.
    pub fn new(tasks: Vec<Task>, limiter: Arc<RateLimiter>) -> Result<Self> {
        let mut all_names: HashSet<&str> = HashSet::new();
        for task in &tasks {
            if !all_names.insert(task.name.as_str()) {
                return Err(CoreError::InvalidInput(format!(
                    "Duplicate task name '{}' in pipeline",
                    task.name
                )));
            }
        }

        let mut preceding: HashSet<&str> = HashSet::new();
        for task in &tasks {
            for upstream in &task.upstream {
                if preceding.contains(upstream.as_str()) {
                    continue;
                }
                if all_names.contains(upstream.as_str()) {
                    return Err(CoreError::Cyclic(format!(
                        "Task '{}' depends on '{}', which does not precede it",
                        task.name, upstream
                    )));
                }
                return Err(CoreError::NotFound(format!(
                    "Task '{}' depends on unknown task '{}'",
                    task.name, upstream
                )));
            }
            preceding.insert(task.name.as_str());
        }

        Ok(Self { tasks, limiter })
    }

    /// The tasks in declaration order, with their current states.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Execute every task in order.
    ///
    /// `inputs` feeds `${placeholder}` resolution in task descriptions.
    /// Intermediate outputs exist only for the duration of the run; the
    /// returned result carries them as per-task reports.
    pub async fn run(
        &mut self,
        backend: &dyn InferenceBackend,
        inputs: &HashMap<String, String>,
    ) -> Result<PipelineResult> {
        let run_start = Instant::now();
        let mut outputs: Vec<(String, String)> = Vec::new();
        let mut reports: Vec<TaskReport> = Vec::new();

        tracing::info!(
            "[Pipeline] Starting run: {} tasks, rate ceiling {}/min",
            self.tasks.len(),
            self.limiter.limit()
        );

        for index in 0..self.tasks.len() {
            let context = assemble_context(&self.tasks[index].upstream, &outputs);
            let description =
                resolve_placeholders(&self.tasks[index].definition.description, inputs);
            let expected_output = self.tasks[index].definition.expected_output.clone();

            self.tasks[index].state = TaskState::Running;
            let task_start = Instant::now();
            tracing::info!(
                "[Pipeline] Task '{}' running (agent: {})",
                self.tasks[index].name,
                self.tasks[index].agent.name
            );

            self.limiter.acquire().await;
            let result = self.tasks[index]
                .agent
                .execute(backend, &description, &expected_output, &context)
                .await;
            let duration_ms = task_start.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    self.tasks[index].state = TaskState::Completed;
                    tracing::info!(
                        "[Pipeline] Task '{}' completed in {}ms",
                        self.tasks[index].name,
                        duration_ms
                    );
                    reports.push(TaskReport {
                        task: self.tasks[index].name.clone(),
                        agent: self.tasks[index].agent.name.clone(),
                        state: TaskState::Completed,
                        output: Some(output.clone()),
                        duration_ms,
                    });
                    outputs.push((self.tasks[index].name.clone(), output));
                }
                Err(e) => {
                    self.tasks[index].state = TaskState::Failed;
                    tracing::error!(
                        "[Pipeline] Task '{}' failed after {}ms: {}",
                        self.tasks[index].name,
                        duration_ms,
                        e
                    );
                    return Err(e);
                }
            }
        }

        let final_output = outputs
            .last()
            .map(|(_, output)| output.clone())
            .unwrap_or_default();

        Ok(PipelineResult {
            final_output,
            tasks: reports,
            duration_ms: run_start.elapsed().as_millis() as u64,
        })
    }
}

/// Concatenate upstream outputs into one context block, section per task,
/// in the order the upstream names were declared. Outputs are included
/// verbatim.
fn assemble_context(upstream: &[String], outputs: &[(String, String)]) -> String {
    let sections: Vec<String> = upstream
        .iter()
        .filter_map(|name| {
            outputs
                .iter()
                .find(|(task, _)| task == name)
                .map(|(task, output)| format!("## Output from {}\n{}", task, output))
        })
        .collect();
    sections.join("\n\n")
}
