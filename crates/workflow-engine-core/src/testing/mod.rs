//! # Test Fixtures
//!
//! In-memory reference implementations of the opaque store traits, plus a
//! handful of canned workflows matching the scenarios in spec.md §8. Real
//! hosts back these traits with a real database; tests just need something
//! that behaves correctly.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::model::{Edge, Execution, Node, Parameter, ParameterType, Position, RuntimeKind, TriggerKind, Workflow};
use crate::store::{DeploymentStore, WorkflowStore};
use crate::workflow::executor::ExecutionStore;

/// Keeps every persisted `Execution` snapshot in memory, keyed by execution id.
#[derive(Default)]
pub struct InMemoryExecutionStore {
    executions: Mutex<HashMap<String, Execution>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Execution> {
        self.executions.lock().expect("lock poisoned").get(id).cloned()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn persist(&self, execution: &Execution) -> Result<()> {
        self.executions
            .lock()
            .expect("lock poisoned")
            .insert(execution.id.clone(), execution.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryWorkflowStore {
    workflows: Mutex<HashMap<String, Workflow>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn get(&self, workflow_id: &str) -> Result<Option<Workflow>> {
        Ok(self
            .workflows
            .lock()
            .expect("lock poisoned")
            .get(workflow_id)
            .cloned())
    }

    async fn put(&self, workflow: Workflow) -> Result<()> {
        self.workflows
            .lock()
            .expect("lock poisoned")
            .insert(workflow.id.clone(), workflow);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDeploymentStore {
    snapshots: Mutex<HashMap<String, Workflow>>,
}

impl InMemoryDeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeploymentStore for InMemoryDeploymentStore {
    async fn snapshot(&self, deployment_id: &str) -> Result<Option<Workflow>> {
        Ok(self
            .snapshots
            .lock()
            .expect("lock poisoned")
            .get(deployment_id)
            .cloned())
    }

    async fn publish(&self, deployment_id: &str, workflow: Workflow) -> Result<()> {
        self.snapshots
            .lock()
            .expect("lock poisoned")
            .insert(deployment_id.to_string(), workflow);
        Ok(())
    }
}

fn node(id: &str, node_type: &str, inputs: Vec<Parameter>, outputs: Vec<Parameter>, x: f64, y: f64) -> Node {
    Node {
        id: id.to_string(),
        node_type: node_type.to_string(),
        name: id.to_string(),
        position: Some(Position { x, y }),
        inputs,
        outputs,
    }
}

fn base(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
    Workflow {
        id: format!("wf-{}", crate::model::new_id()),
        name: "fixture".into(),
        handle: "fixture".into(),
        trigger: TriggerKind::Manual,
        runtime: RuntimeKind::Workflow,
        nodes,
        edges,
        organization_id: "org-fixture".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        active_deployment_id: None,
    }
}

/// A two-node linear chain: `string-concat` feeding `string-upper`
/// (spec.md §8 scenario 1).
pub fn linear_pass_through_workflow() -> Workflow {
    base(
        vec![
            node(
                "concat",
                "string-concat",
                vec![
                    Parameter::new("a", ParameterType::String).with_default(json!("hello ")),
                    Parameter::new("b", ParameterType::String).with_default(json!("world")),
                ],
                vec![Parameter::new("text", ParameterType::String)],
                0.0,
                0.0,
            ),
            node(
                "upper",
                "string-upper",
                vec![Parameter::new("text", ParameterType::String).required()],
                vec![Parameter::new("text", ParameterType::String)],
                0.0,
                1.0,
            ),
        ],
        vec![Edge {
            source: "concat".into(),
            source_output: "text".into(),
            target: "upper".into(),
            target_input: "text".into(),
        }],
    )
}

/// Two independent producers fan into one `repeated` input (spec.md §8
/// scenario 2) — declared in this order so edge-declaration order is
/// observable in tests.
pub fn fan_in_repeated_input_workflow() -> Workflow {
    base(
        vec![
            node(
                "first",
                "string-concat",
                vec![Parameter::new("a", ParameterType::String).with_default(json!("first"))],
                vec![Parameter::new("text", ParameterType::String)],
                0.0,
                0.0,
            ),
            node(
                "second",
                "string-concat",
                vec![Parameter::new("a", ParameterType::String).with_default(json!("second"))],
                vec![Parameter::new("text", ParameterType::String)],
                1.0,
                0.0,
            ),
            node(
                "collector",
                "string-join",
                vec![Parameter::new("items", ParameterType::String).repeated()],
                vec![Parameter::new("joined", ParameterType::String)],
                0.0,
                1.0,
            ),
        ],
        vec![
            Edge {
                source: "first".into(),
                source_output: "text".into(),
                target: "collector".into(),
                target_input: "items".into(),
            },
            Edge {
                source: "second".into(),
                source_output: "text".into(),
                target: "collector".into(),
                target_input: "items".into(),
            },
        ],
    )
}
