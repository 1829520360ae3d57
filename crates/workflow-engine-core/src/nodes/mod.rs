//! # Node Contract
//!
//! The interface every node implementation satisfies (spec.md §4.5), plus the
//! context object the Executor builds for each invocation. See
//! [`registry`] for how node types are discovered and instantiated.
//!
//! ```no_run
//! use async_trait::async_trait;
//! use serde_json::json;
//! use workflow_engine_core::error::Result;
//! use workflow_engine_core::nodes::{ExecutableNode, NodeContext, NodeOutcome};
//!
//! struct Uppercase;
//!
//! #[async_trait]
//! impl ExecutableNode for Uppercase {
//!     async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
//!         let text = ctx.input_str("text")?;
//!         Ok(NodeOutcome::new().with_output("text", json!(text.to_uppercase())))
//!     }
//! }
//! ```

pub mod registry;

pub use registry::{NodeRegistry, NodeTypeDescriptor};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, WorkflowError};

/// `dev` relaxes capability gating so local iteration isn't blocked by
/// integrations that aren't configured yet; `prod` enforces it fully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Dev,
    Prod,
}

/// A configured external system a node may call out to (spec.md §4.5
/// `NodeContext.getIntegration`). Opaque beyond id + config to the core —
/// hosts own the actual credential material.
#[derive(Debug, Clone)]
pub struct Integration {
    pub id: String,
    pub config: Value,
}

/// Names a node-as-tool invocation target, reused by both the tool registry
/// lookup and the recursion-cycle key (spec.md §9: bounded tool-call recursion).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolReference {
    pub workflow_id: String,
    pub node_id: String,
}

/// Invokes a node as a callable tool, recursing back into the Executor's own
/// validate/plan/dispatch machinery on a child context. Implemented by
/// [`crate::workflow::executor::Executor`]; nodes only see the trait.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, tool_ref: &ToolReference, input: Value) -> Result<Value>;
}

/// No-op invoker for nodes and tests that never call tools.
pub struct NoopToolInvoker;

#[async_trait]
impl ToolInvoker for NoopToolInvoker {
    async fn invoke(&self, tool_ref: &ToolReference, _input: Value) -> Result<Value> {
        Err(WorkflowError::NodeExecutionFailed {
            node_id: tool_ref.node_id.clone(),
            message: "tool calls are not available in this context".into(),
        })
    }
}

/// Everything a node needs to do its job for one invocation, built fresh by
/// the Executor for every `node:<id>` step (spec.md §4.1, §4.5).
pub struct NodeContext {
    pub node_id: String,
    pub workflow_id: String,
    pub organization_id: String,
    pub mode: ExecutionMode,
    pub inputs: HashMap<String, Value>,
    integrations: HashMap<String, Integration>,
    tool_invoker: Arc<dyn ToolInvoker>,
}

impl NodeContext {
    pub fn new(
        node_id: impl Into<String>,
        workflow_id: impl Into<String>,
        organization_id: impl Into<String>,
        mode: ExecutionMode,
        inputs: HashMap<String, Value>,
        integrations: HashMap<String, Integration>,
        tool_invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            workflow_id: workflow_id.into(),
            organization_id: organization_id.into(),
            mode,
            inputs,
            integrations,
            tool_invoker,
        }
    }

    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    pub fn input_str(&self, name: &str) -> Result<&str> {
        self.input(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| WorkflowError::MissingRequiredInput {
                node_id: self.node_id.clone(),
                input: name.to_string(),
            })
    }

    pub fn input_repeated(&self, name: &str) -> Result<&[Value]> {
        match self.input(name) {
            Some(Value::Array(values)) => Ok(values.as_slice()),
            _ => Err(WorkflowError::MissingRequiredInput {
                node_id: self.node_id.clone(),
                input: name.to_string(),
            }),
        }
    }

    pub fn get_integration(&self, id: &str) -> Result<&Integration> {
        self.integrations
            .get(id)
            .ok_or_else(|| WorkflowError::IntegrationMissing {
                integration_id: id.to_string(),
            })
    }

    pub async fn call_tool(&self, tool_ref: &ToolReference, input: Value) -> Result<Value> {
        self.tool_invoker.invoke(tool_ref, input).await
    }
}

/// The outputs produced by a single node invocation plus the compute credits
/// it consumed, before the Parameter Codec converts them back to wire form.
#[derive(Debug, Clone, Default)]
pub struct NodeOutcome {
    pub outputs: HashMap<String, Value>,
    pub usage: Option<f64>,
}

impl NodeOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, name: impl Into<String>, value: Value) -> Self {
        self.outputs.insert(name.into(), value);
        self
    }

    pub fn with_usage(mut self, usage: f64) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// The contract every node type implements (spec.md §4.5). Implementations
/// are expected to be stateless and safe to run concurrently across
/// unrelated invocations — the Executor may construct and run many at once.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome>;
}

/// Constructs a fresh, boxed node instance for a registered type. Kept
/// separate from [`ExecutableNode`] so registration can be generic over
/// zero-sized marker types without requiring `Default`.
pub type NodeFactory = Arc<dyn Fn() -> Box<dyn ExecutableNode> + Send + Sync>;
