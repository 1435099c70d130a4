//! Task units and their lifecycle.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::catalog::TaskDef;

/// Lifecycle of a task within a single pipeline run.
///
/// A task moves `Pending -> Running` only once every upstream task has
/// completed, then `Running -> Completed` or `Running -> Failed`. `Failed`
/// and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether a task in this state may move to `next`.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Pending, TaskState::Running)
                | (TaskState::Running, TaskState::Completed)
                | (TaskState::Running, TaskState::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// One unit of work: a task definition bound to the agent performing it.
#[derive(Debug, Clone)]
pub struct Task {
    /// Task name, same as the definition ID
    pub name: String,

    /// The catalog definition this task was built from
    pub definition: TaskDef,

    /// The agent that performs this task
    pub agent: Agent,

    /// Names of earlier tasks whose outputs become this task's context
    pub upstream: Vec<String>,

    /// Current lifecycle state
    pub state: TaskState,
}

impl Task {
    pub fn new(definition: TaskDef, agent: Agent) -> Self {
        Self {
            name: definition.id.clone(),
            upstream: definition.upstream.clone(),
            definition,
            agent,
            state: TaskState::Pending,
        }
    }
}

/// Per-task record included in a pipeline result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    /// Task name
    pub task: String,

    /// Agent that performed the task
    pub agent: String,

    /// Final state of the task
    pub state: TaskState,

    /// The task's output, present when it completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Wall time spent on the task
    pub duration_ms: u64,
}
