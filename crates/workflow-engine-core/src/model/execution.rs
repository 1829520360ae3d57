use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::SkipReason;

/// Status of an [`Execution`] (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Submitted,
    Executing,
    Completed,
    Error,
    Cancelled,
}

/// Status of one node within an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Idle,
    Executing,
    Completed,
    Error,
    Skipped,
}

/// The per-node record appended to `Execution.data.nodeExecutions` in
/// topological order (spec.md §3, §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecution {
    pub node_id: String,
    pub status: NodeStatus,
    #[serde(default)]
    pub inputs: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub outputs: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub skip_reason: Option<SkipReason>,
    #[serde(default)]
    pub usage: Option<f64>,
}

impl NodeExecution {
    pub fn idle(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Idle,
            inputs: None,
            outputs: None,
            error: None,
            skip_reason: None,
            usage: None,
        }
    }

    pub fn completed(
        node_id: impl Into<String>,
        inputs: HashMap<String, Value>,
        outputs: HashMap<String, Value>,
        usage: Option<f64>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Completed,
            inputs: Some(inputs),
            outputs: Some(outputs),
            error: None,
            skip_reason: None,
            usage,
        }
    }

    pub fn error(
        node_id: impl Into<String>,
        inputs: Option<HashMap<String, Value>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Error,
            inputs,
            outputs: None,
            error: Some(message.into()),
            skip_reason: None,
            usage: None,
        }
    }

    pub fn skipped(node_id: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            node_id: node_id.into(),
            status: NodeStatus::Skipped,
            inputs: None,
            outputs: None,
            error: Some(reason.to_string()),
            skip_reason: Some(reason),
            usage: None,
        }
    }
}

/// One attempt to run a workflow (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub workflow_id: String,
    #[serde(default)]
    pub deployment_id: Option<String>,
    pub organization_id: String,
    pub user_id: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub error: Option<String>,
    /// Set when credit exhaustion truncated the run (spec.md §4.1 failure table).
    #[serde(default)]
    pub partial: bool,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub usage: f64,
    pub node_executions: Vec<NodeExecution>,
}

impl Execution {
    pub fn new(workflow_id: impl Into<String>, organization_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workflow_id: workflow_id.into(),
            deployment_id: None,
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            status: ExecutionStatus::Submitted,
            error: None,
            partial: false,
            started_at: Utc::now(),
            ended_at: None,
            usage: 0.0,
            node_executions: Vec::new(),
        }
    }
}
