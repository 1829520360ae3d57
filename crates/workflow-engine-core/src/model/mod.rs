//! # Workflow Data Model
//!
//! The types here are the wire/storage shape of a workflow graph (spec.md §3).
//! They are immutable for the duration of a run — the Executor treats its
//! received [`Workflow`] as a value, never mutating it in place.

mod execution;
mod parameter;

pub use execution::{Execution, ExecutionStatus, NodeExecution, NodeStatus};
pub use parameter::{Parameter, ParameterType, ParameterValue};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an execution of this workflow was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Manual,
    HttpWebhook,
    HttpRequest,
    EmailMessage,
    QueueMessage,
    Scheduled,
}

/// `worker` = fast single-shot; `workflow` = durable multi-step with retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeKind {
    Worker,
    Workflow,
}

/// Opaque canvas position. The core never interprets these values; they exist
/// only to make the topological tie-break in spec.md §4.1 deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single processing unit in a workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique within the owning workflow.
    pub id: String,
    /// Registry key selecting the implementation (see
    /// [`crate::nodes::registry::NodeRegistry`]).
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    pub position: Option<Position>,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
}

impl Node {
    pub fn input(&self, name: &str) -> Option<&Parameter> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Parameter> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

/// A directed, typed connection from one node's output to another's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub source_output: String,
    pub target: String,
    pub target_input: String,
}

/// A directed graph of typed nodes, immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    /// URL-safe identifier, unique within the organization.
    pub handle: String,
    pub trigger: TriggerKind,
    pub runtime: RuntimeKind,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub organization_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active_deployment_id: Option<String>,
}

impl Workflow {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose target is `node_id`, in the order they appear in
    /// `self.edges` — the order spec.md §4.1 pins for `repeated` fan-in.
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.target == node_id)
    }
}

/// Sentinel user id used for executions submitted by the MCP agent surface
/// rather than a human user (spec.md §3 `Execution.userId`).
pub const MCP_AGENT_USER_ID: &str = "mcp-agent";

/// Unique random identifier helper shared by the model and execution types.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
