//! # Node Registry
//!
//! A string-keyed, thread-safe catalogue of node types (spec.md §4.3),
//! replacing the `TypeId`-keyed registry pattern with one addressable by the
//! type names that appear on the wire (`Node.type` in a workflow document).

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};
use crate::model::Parameter;

use super::NodeFactory;

/// Metadata describing a registered node type, surfaced to workflow editors
/// and to the MCP-style "list available tools" surface (spec.md §4.3, §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTypeDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    /// Cheap enough to run inline without a queued worker hop.
    #[serde(default)]
    pub inlinable: bool,
    /// Callable as a tool from an agent node (spec.md §9 tool-call recursion).
    #[serde(default)]
    pub as_tool: bool,
    /// Exposes a function-calling schema derived from `inputs`.
    #[serde(default)]
    pub function_calling: bool,
    /// Relative compute credits charged per invocation; `None` means
    /// metered by the node itself via `NodeOutcome::usage`.
    #[serde(default)]
    pub compute_cost: Option<f64>,
    /// Capabilities (e.g. `"network"`, `"filesystem"`) required of the
    /// hosting environment; registration fails in environments lacking them.
    #[serde(default)]
    pub required_capabilities: Vec<String>,
}

impl NodeTypeDescriptor {
    pub fn new(node_type: impl Into<String>, name: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            id: node_type.clone(),
            node_type,
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            icon: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            inlinable: true,
            as_tool: false,
            function_calling: false,
            compute_cost: None,
            required_capabilities: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn inputs(mut self, inputs: Vec<Parameter>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn outputs(mut self, outputs: Vec<Parameter>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn as_tool(mut self, as_tool: bool) -> Self {
        self.as_tool = as_tool;
        self
    }

    pub fn requires_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.required_capabilities = capabilities;
        self
    }
}

struct Registration {
    descriptor: NodeTypeDescriptor,
    factory: NodeFactory,
}

/// Catalogue of node types available to the Executor, guarded by an
/// `RwLock` so registration (rare, usually at startup) doesn't block the
/// many concurrent lookups a running workflow performs.
#[derive(Default)]
pub struct NodeRegistry {
    entries: RwLock<HashMap<String, Registration>>,
    environment_capabilities: Vec<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            environment_capabilities: Vec::new(),
        }
    }

    /// Creates a registry that will refuse to register node types requiring
    /// capabilities not present in `capabilities` (spec.md §4.3 environment
    /// gating — e.g. a sandboxed worker with no outbound network).
    pub fn with_environment_capabilities(capabilities: Vec<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            environment_capabilities: capabilities,
        }
    }

    pub fn register(&self, descriptor: NodeTypeDescriptor, factory: NodeFactory) -> Result<()> {
        for capability in &descriptor.required_capabilities {
            if !self.environment_capabilities.contains(capability) {
                return Err(WorkflowError::NodeTypeMissing {
                    node_type: format!(
                        "{} (requires capability '{}' not available in this environment)",
                        descriptor.node_type, capability
                    ),
                });
            }
        }

        let mut entries = self.entries.write().map_err(|_| WorkflowError::StoreFailure {
            operation: "register node type".into(),
            cause: "registry lock poisoned".into(),
        })?;

        if entries.contains_key(&descriptor.node_type) {
            return Err(WorkflowError::DuplicateNodeType {
                node_type: descriptor.node_type.clone(),
            });
        }

        entries.insert(descriptor.node_type.clone(), Registration { descriptor, factory });
        Ok(())
    }

    pub fn create(&self, node_type: &str) -> Result<Box<dyn super::ExecutableNode>> {
        let entries = self.entries.read().map_err(|_| WorkflowError::StoreFailure {
            operation: "create node".into(),
            cause: "registry lock poisoned".into(),
        })?;
        let registration = entries
            .get(node_type)
            .ok_or_else(|| WorkflowError::NodeTypeMissing {
                node_type: node_type.to_string(),
            })?;
        Ok((registration.factory)())
    }

    pub fn get_node_type(&self, node_type: &str) -> Result<NodeTypeDescriptor> {
        let entries = self.entries.read().map_err(|_| WorkflowError::StoreFailure {
            operation: "get node type".into(),
            cause: "registry lock poisoned".into(),
        })?;
        entries
            .get(node_type)
            .map(|r| r.descriptor.clone())
            .ok_or_else(|| WorkflowError::NodeTypeMissing {
                node_type: node_type.to_string(),
            })
    }

    /// All registered descriptors, sorted by type name for deterministic
    /// discovery snapshots (spec.md §9 supplemental node-discovery listing).
    pub fn node_types(&self) -> Vec<NodeTypeDescriptor> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut descriptors: Vec<NodeTypeDescriptor> =
            entries.values().map(|r| r.descriptor.clone()).collect();
        descriptors.sort_by(|a, b| a.node_type.cmp(&b.node_type));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ExecutableNode, NodeContext, NodeOutcome};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl ExecutableNode for Echo {
        async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutcome> {
            Ok(NodeOutcome::new())
        }
    }

    #[test]
    fn registers_and_creates_by_type_name() {
        let registry = NodeRegistry::new();
        registry
            .register(
                NodeTypeDescriptor::new("echo", "Echo"),
                Arc::new(|| Box::new(Echo)),
            )
            .unwrap();

        assert!(registry.create("echo").is_ok());
        assert!(matches!(
            registry.create("missing"),
            Err(WorkflowError::NodeTypeMissing { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_registration() {
        let registry = NodeRegistry::new();
        registry
            .register(NodeTypeDescriptor::new("echo", "Echo"), Arc::new(|| Box::new(Echo)))
            .unwrap();
        let result = registry.register(
            NodeTypeDescriptor::new("echo", "Echo"),
            Arc::new(|| Box::new(Echo)),
        );
        assert!(matches!(result, Err(WorkflowError::DuplicateNodeType { .. })));
    }

    #[test]
    fn gates_registration_on_environment_capabilities() {
        let registry = NodeRegistry::with_environment_capabilities(vec![]);
        let result = registry.register(
            NodeTypeDescriptor::new("http-call", "HTTP Call")
                .requires_capabilities(vec!["network".into()]),
            Arc::new(|| Box::new(Echo)),
        );
        assert!(matches!(result, Err(WorkflowError::NodeTypeMissing { .. })));
    }

    #[test]
    fn node_types_are_sorted_by_type_name() {
        let registry = NodeRegistry::new();
        registry
            .register(NodeTypeDescriptor::new("zeta", "Zeta"), Arc::new(|| Box::new(Echo)))
            .unwrap();
        registry
            .register(NodeTypeDescriptor::new("alpha", "Alpha"), Arc::new(|| Box::new(Echo)))
            .unwrap();

        let types: Vec<String> = registry.node_types().into_iter().map(|d| d.node_type).collect();
        assert_eq!(types, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
