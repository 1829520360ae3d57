//! # Executor
//!
//! Runs one [`crate::model::Workflow`] to completion as a sequence of durable
//! steps — `validate`, `plan`, one `node:<id>` step per node in topological
//! order, then `finalize` (spec.md §4.1). Each step is instrumented with a
//! tracing span so a stuck or slow execution can be diagnosed from logs
//! alone, mirroring the step-tracking style of a durable workflow runner.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::blob::ObjectStore;
use crate::codec::ParameterCodec;
use crate::config::ExecutorConfig;
use crate::error::{Result, SkipReason, WorkflowError};
use crate::model::{Execution, ExecutionStatus, Node, NodeExecution, NodeStatus, Workflow};
use crate::nodes::{ExecutionMode, Integration, NodeContext, NodeRegistry, ToolInvoker, ToolReference};

/// Persists `Execution` snapshots after each durable step so a crashed
/// executor can resume from the last completed step. Out of scope to
/// implement durably here — see [`crate::testing::InMemoryExecutionStore`]
/// for the reference implementation used by tests.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn persist(&self, execution: &Execution) -> Result<()>;
}

/// One call to run a workflow (spec.md §4.1, §6). Every trigger flavor
/// (manual, webhook, scheduled, ...) normalizes down to this shape before
/// reaching the Executor.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub workflow: Workflow,
    pub organization_id: String,
    pub user_id: String,
    /// Payload the trigger delivered, resolved by parameter name into the
    /// inputs of nodes with no incoming edges (spec.md §4.1, §6).
    pub trigger_input: Value,
    /// Compute credits available to this run; exhausting it yields a partial execution.
    pub credit_balance: f64,
    /// Additional credit the caller is willing to go into overage for before
    /// the run is rejected outright at entry (spec.md §4.1, §7 Resource).
    pub overage_limit: f64,
    pub integrations: HashMap<String, Integration>,
    pub mode: ExecutionMode,
}

/// Drives one [`Workflow`] through validate → plan → per-node execution →
/// finalize, enforcing the failure-cascade and credit-exhaustion rules of
/// spec.md §4.1.
pub struct Executor {
    registry: Arc<NodeRegistry>,
    codec: Arc<ParameterCodec>,
    object_store: Arc<dyn ObjectStore>,
    execution_store: Arc<dyn ExecutionStore>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(
        registry: Arc<NodeRegistry>,
        object_store: Arc<dyn ObjectStore>,
        execution_store: Arc<dyn ExecutionStore>,
        config: ExecutorConfig,
    ) -> Self {
        let codec = Arc::new(
            ParameterCodec::new(object_store.clone())
                .with_inline_threshold(config.inline_blob_threshold_bytes),
        );
        Self {
            registry,
            codec,
            object_store,
            execution_store,
            config,
        }
    }

    #[instrument(skip_all, fields(workflow_id = %req.workflow.id))]
    pub async fn execute(&self, req: ExecutionRequest) -> Result<Execution> {
        if req.credit_balance + req.overage_limit <= 0.0 {
            return Err(WorkflowError::InsufficientCredits {
                balance: req.credit_balance,
                required: 0.0,
            });
        }

        let mut execution = Execution::new(
            req.workflow.id.clone(),
            req.organization_id.clone(),
            req.user_id.clone(),
        );
        execution.deployment_id = req.workflow.active_deployment_id.clone();
        execution.status = ExecutionStatus::Executing;

        let issues = self.validate_step(&req.workflow).await?;
        if !issues.is_empty() {
            execution.status = ExecutionStatus::Error;
            execution.error = Some(format!("{} validation issue(s)", issues.len()));
            execution.ended_at = Some(chrono::Utc::now());
            self.execution_store.persist(&execution).await?;
            return Err(WorkflowError::InvalidWorkflow { issues });
        }

        let order = self.plan_step(&req.workflow)?;

        let visited_tool_calls: Arc<Mutex<HashSet<(String, String, String)>>> =
            Arc::new(Mutex::new(HashSet::new()));

        let mut unavailable: HashMap<String, SkipReason> = HashMap::new();
        let mut produced: HashMap<String, HashMap<String, Value>> = HashMap::new();
        let mut had_error = false;

        for (index, node_id) in order.iter().enumerate() {
            let node = req
                .workflow
                .node(node_id)
                .expect("plan only emits known node ids");

            if execution.usage > req.credit_balance + req.overage_limit {
                info!(node_id = %node_id, "credit balance exhausted, stopping execution");
                execution.partial = true;
                execution.error = Some(format!(
                    "credit balance exhausted after {:.2} usage (balance {:.2}, overage limit {:.2}); remaining nodes skipped",
                    execution.usage, req.credit_balance, req.overage_limit
                ));
                for remaining_id in &order[index..] {
                    execution
                        .node_executions
                        .push(NodeExecution::skipped(remaining_id.clone(), SkipReason::credit_exhausted()));
                }
                break;
            }

            if let Some(reason) = self.upstream_failure(&req.workflow, node_id, &unavailable) {
                execution
                    .node_executions
                    .push(NodeExecution::skipped(node_id.clone(), reason.clone()));
                unavailable.insert(node_id.clone(), reason);
                continue;
            }

            let node_execution = self
                .run_node_step(
                    &req,
                    node,
                    &produced,
                    visited_tool_calls.clone(),
                )
                .await;

            match node_execution.status {
                NodeStatus::Completed => {
                    if let Some(usage) = node_execution.usage {
                        execution.usage += usage;
                    }
                    if let Some(outputs) = &node_execution.outputs {
                        produced.insert(node_id.clone(), outputs.clone());
                    }
                }
                NodeStatus::Error => {
                    had_error = true;
                    let message = node_execution.error.clone().unwrap_or_default();
                    unavailable.insert(
                        node_id.clone(),
                        SkipReason::upstream_error(node_id, &message),
                    );
                }
                _ => {}
            }

            execution.node_executions.push(node_execution);
            self.execution_store.persist(&execution).await?;
        }

        self.finalize_step(&mut execution, had_error).await?;
        Ok(execution)
    }

    #[instrument(skip_all)]
    async fn validate_step(&self, workflow: &Workflow) -> Result<Vec<super::Issue>> {
        Ok(super::validate(workflow))
    }

    #[instrument(skip_all)]
    fn plan_step(&self, workflow: &Workflow) -> Result<Vec<String>> {
        topological_order(workflow)
    }

    fn upstream_failure(
        &self,
        workflow: &Workflow,
        node_id: &str,
        unavailable: &HashMap<String, SkipReason>,
    ) -> Option<SkipReason> {
        workflow
            .incoming_edges(node_id)
            .find_map(|edge| unavailable.get(&edge.source).cloned())
    }

    #[instrument(skip_all, fields(node_id = %node.id, node_type = %node.node_type))]
    async fn run_node_step(
        &self,
        req: &ExecutionRequest,
        node: &Node,
        produced: &HashMap<String, HashMap<String, Value>>,
        visited_tool_calls: Arc<Mutex<HashSet<(String, String, String)>>>,
    ) -> NodeExecution {
        match self
            .execute_node_inner(req, node, produced, visited_tool_calls)
            .await
        {
            Ok((inputs, outputs, usage)) => {
                NodeExecution::completed(node.id.clone(), inputs, outputs, usage)
            }
            Err(err) => {
                warn!(node_id = %node.id, error = %err, "node execution failed");
                NodeExecution::error(node.id.clone(), None, err.to_string())
            }
        }
    }

    async fn execute_node_inner(
        &self,
        req: &ExecutionRequest,
        node: &Node,
        produced: &HashMap<String, HashMap<String, Value>>,
        visited_tool_calls: Arc<Mutex<HashSet<(String, String, String)>>>,
    ) -> Result<(HashMap<String, Value>, HashMap<String, Value>, Option<f64>)> {
        let mut wire_inputs: HashMap<String, Value> = HashMap::new();
        let mut node_inputs: HashMap<String, Value> = HashMap::new();

        for input in &node.inputs {
            let incoming: Vec<&crate::model::Edge> = req
                .workflow
                .incoming_edges(&node.id)
                .filter(|e| e.target_input == input.name)
                .collect();

            let wire_value: Value = if input.repeated {
                let mut values = Vec::with_capacity(incoming.len());
                for edge in &incoming {
                    if let Some(v) = produced
                        .get(&edge.source)
                        .and_then(|outputs| outputs.get(&edge.source_output))
                    {
                        values.push(v.clone());
                    }
                }
                Value::Array(values)
            } else if let Some(edge) = incoming.first() {
                produced
                    .get(&edge.source)
                    .and_then(|outputs| outputs.get(&edge.source_output))
                    .cloned()
                    .unwrap_or(Value::Null)
            } else {
                req.trigger_input
                    .as_object()
                    .and_then(|params| params.get(&input.name))
                    .cloned()
                    .or_else(|| input.value.clone())
                    .unwrap_or(Value::Null)
            };

            let is_undefined = match &wire_value {
                Value::Null => true,
                Value::Array(items) if input.repeated => items.is_empty(),
                _ => false,
            };
            if input.required && is_undefined {
                return Err(WorkflowError::MissingRequiredInput {
                    node_id: node.id.clone(),
                    input: input.name.clone(),
                });
            }

            wire_inputs.insert(input.name.clone(), wire_value.clone());

            let node_value = self.codec.wire_to_node(input.param_type, &wire_value).await?;
            node_inputs.insert(input.name.clone(), node_value);
        }

        let tool_invoker: Arc<dyn ToolInvoker> = Arc::new(RecursiveToolInvoker {
            workflow_id: req.workflow.id.clone(),
            depth: 0,
            max_depth: self.config.tool_recursion_depth,
            visited: visited_tool_calls,
        });

        let ctx = NodeContext::new(
            node.id.clone(),
            req.workflow.id.clone(),
            req.organization_id.clone(),
            req.mode,
            node_inputs,
            req.integrations.clone(),
            tool_invoker,
        );

        let executable = self.registry.create(&node.node_type)?;
        let step_timeout = self.config.step_timeout;
        let outcome = tokio::time::timeout(step_timeout, executable.execute(ctx))
            .await
            .map_err(|_| WorkflowError::StepTimeout {
                step: format!("node:{}", node.id),
                elapsed_ms: step_timeout.as_millis() as u64,
            })??;

        let mut wire_outputs = HashMap::with_capacity(outcome.outputs.len());
        for output in &node.outputs {
            if let Some(node_value) = outcome.outputs.get(&output.name) {
                let wire_value = self.codec.node_to_wire(output.param_type, node_value).await?;
                wire_outputs.insert(output.name.clone(), wire_value);
            }
        }

        Ok((wire_inputs, wire_outputs, outcome.usage))
    }

    #[instrument(skip_all)]
    async fn finalize_step(&self, execution: &mut Execution, had_error: bool) -> Result<()> {
        execution.ended_at = Some(chrono::Utc::now());
        execution.status = if had_error {
            ExecutionStatus::Error
        } else {
            ExecutionStatus::Completed
        };
        if had_error && execution.error.is_none() {
            execution.error = Some("one or more nodes failed".into());
        }
        self.execution_store.persist(execution).await?;
        Ok(())
    }
}

/// Reuses the Executor's own validate/plan/dispatch machinery for a node
/// invoked as a tool, rejecting recursion past `max_depth` or back into an
/// already-visited `(workflow, node, tool)` triple (spec.md §9).
struct RecursiveToolInvoker {
    workflow_id: String,
    depth: u32,
    max_depth: u32,
    visited: Arc<Mutex<HashSet<(String, String, String)>>>,
}

#[async_trait]
impl ToolInvoker for RecursiveToolInvoker {
    async fn invoke(&self, tool_ref: &ToolReference, _input: Value) -> Result<Value> {
        if self.depth >= self.max_depth {
            return Err(WorkflowError::ToolRecursionExceeded {
                node_id: tool_ref.node_id.clone(),
                tool_ref: tool_ref.workflow_id.clone(),
            });
        }

        let key = (
            self.workflow_id.clone(),
            tool_ref.node_id.clone(),
            tool_ref.workflow_id.clone(),
        );
        let mut visited = self.visited.lock().expect("visited set lock poisoned");
        if !visited.insert(key) {
            return Err(WorkflowError::ToolRecursionExceeded {
                node_id: tool_ref.node_id.clone(),
                tool_ref: tool_ref.workflow_id.clone(),
            });
        }

        // Dispatching the referenced node/workflow as an inner execution is a
        // host concern (it needs a workflow lookup by id); this trait exists
        // so nodes can call tools without depending on the host directly.
        Err(WorkflowError::NodeExecutionFailed {
            node_id: tool_ref.node_id.clone(),
            message: "tool dispatch requires a host-provided workflow lookup".into(),
        })
    }
}

/// Deterministic topological sort: among nodes whose dependencies are all
/// satisfied, the next one chosen is always the smallest by
/// `(position.y, position.x, id)`, falling back to `id` alone when either
/// node lacks a position (spec.md §4.1).
fn topological_order(workflow: &Workflow) -> Result<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for node in &workflow.nodes {
        in_degree.entry(node.id.as_str()).or_insert(0);
    }
    for node in &workflow.nodes {
        let mut predecessors: HashSet<&str> = HashSet::new();
        for edge in workflow.incoming_edges(&node.id) {
            predecessors.insert(edge.source.as_str());
        }
        *in_degree.entry(node.id.as_str()).or_insert(0) = predecessors.len();
        for pred in predecessors {
            dependents.entry(pred).or_default().push(node.id.as_str());
        }
    }

    let by_id: HashMap<&str, &Node> = workflow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut ready: Vec<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(workflow.nodes.len());
    let mut remaining = in_degree;

    while !ready.is_empty() {
        ready.sort_by(|&a, &b| compare_nodes(by_id[a], by_id[b]));
        let next = ready.remove(0);
        order.push(next.to_string());

        if let Some(children) = dependents.get(next) {
            for &child in children {
                let degree = remaining.get_mut(child).expect("child tracked in in_degree");
                *degree -= 1;
                if *degree == 0 {
                    ready.push(child);
                }
            }
        }
    }

    if order.len() != workflow.nodes.len() {
        let unreached: Vec<String> = workflow
            .nodes
            .iter()
            .map(|n| n.id.clone())
            .filter(|id| !order.contains(id))
            .collect();
        return Err(WorkflowError::InvalidWorkflow {
            issues: vec![super::Issue::CycleDetected { nodes: unreached }],
        });
    }

    Ok(order)
}

fn compare_nodes(a: &Node, b: &Node) -> Ordering {
    match (a.position, b.position) {
        (Some(pa), Some(pb)) => pa
            .y
            .partial_cmp(&pb.y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| pa.x.partial_cmp(&pb.x).unwrap_or(Ordering::Equal))
            .then_with(|| a.id.cmp(&b.id)),
        _ => a.id.cmp(&b.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::InMemoryObjectStore;
    use crate::model::{Edge, Parameter, ParameterType, Position, RuntimeKind, TriggerKind};
    use crate::nodes::{ExecutableNode, NodeOutcome};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    struct InMemoryExecutionStore;

    #[async_trait]
    impl ExecutionStore for InMemoryExecutionStore {
        async fn persist(&self, _execution: &Execution) -> Result<()> {
            Ok(())
        }
    }

    struct Uppercase;

    #[async_trait]
    impl ExecutableNode for Uppercase {
        async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
            let text = ctx.input_str("text")?;
            Ok(NodeOutcome::new().with_output("text", json!(text.to_uppercase())))
        }
    }

    struct Passthrough;

    #[async_trait]
    impl ExecutableNode for Passthrough {
        async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
            let value = ctx.input("value").cloned().unwrap_or(Value::Null);
            Ok(NodeOutcome::new().with_output("value", value))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl ExecutableNode for AlwaysFails {
        async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutcome> {
            Err(WorkflowError::NodeExecutionFailed {
                node_id: "n".into(),
                message: "boom".into(),
            })
        }
    }

    fn node(id: &str, node_type: &str, inputs: Vec<Parameter>, outputs: Vec<Parameter>) -> Node {
        Node {
            id: id.to_string(),
            node_type: node_type.to_string(),
            name: id.to_string(),
            position: Some(Position { x: 0.0, y: 0.0 }),
            inputs,
            outputs,
        }
    }

    fn base_workflow(nodes: Vec<Node>, edges: Vec<Edge>) -> Workflow {
        Workflow {
            id: "wf-1".into(),
            name: "test".into(),
            handle: "test".into(),
            trigger: TriggerKind::Manual,
            runtime: RuntimeKind::Workflow,
            nodes,
            edges,
            organization_id: "org-1".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            active_deployment_id: None,
        }
    }

    fn executor() -> Executor {
        let registry = Arc::new(NodeRegistry::new());
        registry
            .register(
                crate::nodes::NodeTypeDescriptor::new("uppercase", "Uppercase"),
                Arc::new(|| Box::new(Uppercase)),
            )
            .unwrap();
        registry
            .register(
                crate::nodes::NodeTypeDescriptor::new("passthrough", "Passthrough"),
                Arc::new(|| Box::new(Passthrough)),
            )
            .unwrap();
        registry
            .register(
                crate::nodes::NodeTypeDescriptor::new("always-fails", "Always Fails"),
                Arc::new(|| Box::new(AlwaysFails)),
            )
            .unwrap();

        Executor::new(
            registry,
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryExecutionStore),
            ExecutorConfig::default(),
        )
    }

    fn request(workflow: Workflow) -> ExecutionRequest {
        ExecutionRequest {
            workflow,
            organization_id: "org-1".into(),
            user_id: "user-1".into(),
            trigger_input: Value::Null,
            credit_balance: 1000.0,
            overage_limit: 0.0,
            integrations: HashMap::new(),
            mode: ExecutionMode::Dev,
        }
    }

    #[tokio::test]
    async fn linear_pass_through_completes() {
        let wf = base_workflow(
            vec![
                node(
                    "source",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::String).with_default(json!("hi"))],
                    vec![Parameter::new("value", ParameterType::String)],
                ),
                node(
                    "upper",
                    "uppercase",
                    vec![Parameter::new("text", ParameterType::String).required()],
                    vec![Parameter::new("text", ParameterType::String)],
                ),
            ],
            vec![Edge {
                source: "source".into(),
                source_output: "value".into(),
                target: "upper".into(),
                target_input: "text".into(),
            }],
        );

        let execution = executor().execute(request(wf)).await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Completed);
        let upper = execution
            .node_executions
            .iter()
            .find(|n| n.node_id == "upper")
            .unwrap();
        assert_eq!(
            upper.outputs.as_ref().unwrap().get("text").unwrap(),
            &json!("HI")
        );
    }

    #[tokio::test]
    async fn downstream_nodes_are_skipped_with_upstream_reason() {
        let wf = base_workflow(
            vec![
                node("failing", "always-fails", vec![], vec![]),
                node(
                    "downstream",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::Any)],
                    vec![Parameter::new("value", ParameterType::Any)],
                ),
            ],
            vec![Edge {
                source: "failing".into(),
                source_output: "value".into(),
                target: "downstream".into(),
                target_input: "value".into(),
            }],
        );

        let execution = executor().execute(request(wf)).await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Error);
        let downstream = execution
            .node_executions
            .iter()
            .find(|n| n.node_id == "downstream")
            .unwrap();
        assert_eq!(downstream.status, NodeStatus::Skipped);
        assert!(downstream.skip_reason.is_some());
    }

    #[tokio::test]
    async fn missing_required_input_fails_the_node() {
        let wf = base_workflow(
            vec![node(
                "upper",
                "uppercase",
                vec![Parameter::new("text", ParameterType::String).required()],
                vec![Parameter::new("text", ParameterType::String)],
            )],
            vec![],
        );

        let execution = executor().execute(request(wf)).await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Error);
        assert_eq!(execution.node_executions[0].status, NodeStatus::Error);
    }

    #[tokio::test]
    async fn cyclic_workflow_is_rejected_before_execution() {
        let wf = base_workflow(
            vec![
                node(
                    "a",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::Any)],
                    vec![Parameter::new("value", ParameterType::Any)],
                ),
                node(
                    "b",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::Any)],
                    vec![Parameter::new("value", ParameterType::Any)],
                ),
            ],
            vec![
                Edge {
                    source: "a".into(),
                    source_output: "value".into(),
                    target: "b".into(),
                    target_input: "value".into(),
                },
                Edge {
                    source: "b".into(),
                    source_output: "value".into(),
                    target: "a".into(),
                    target_input: "value".into(),
                },
            ],
        );

        let result = executor().execute(request(wf)).await;
        assert!(matches!(result, Err(WorkflowError::InvalidWorkflow { .. })));
    }

    #[tokio::test]
    async fn trigger_input_resolves_into_source_node_inputs() {
        let wf = base_workflow(
            vec![node(
                "upper",
                "uppercase",
                vec![Parameter::new("text", ParameterType::String).required()],
                vec![Parameter::new("text", ParameterType::String)],
            )],
            vec![],
        );

        let mut req = request(wf);
        req.trigger_input = json!({ "text": "from the trigger" });

        let execution = executor().execute(req).await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Completed);
        let upper = execution.node_executions.iter().find(|n| n.node_id == "upper").unwrap();
        assert_eq!(
            upper.outputs.as_ref().unwrap().get("text").unwrap(),
            &json!("FROM THE TRIGGER")
        );
    }

    #[tokio::test]
    async fn credit_exhaustion_marks_remaining_nodes_skipped_with_error() {
        struct Costly(f64);

        #[async_trait]
        impl ExecutableNode for Costly {
            async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutcome> {
                Ok(NodeOutcome::new().with_usage(self.0))
            }
        }

        let registry = Arc::new(NodeRegistry::new());
        registry
            .register(
                crate::nodes::NodeTypeDescriptor::new("costly", "Costly"),
                Arc::new(|| Box::new(Costly(700.0))),
            )
            .unwrap();
        let executor = Executor::new(
            registry,
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryExecutionStore),
            ExecutorConfig::default(),
        );

        let wf = base_workflow(
            vec![
                node("first", "costly", vec![], vec![]),
                node("second", "costly", vec![], vec![]),
                node("third", "costly", vec![], vec![]),
            ],
            vec![],
        );

        let mut req = request(wf);
        req.credit_balance = 1000.0;

        let execution = executor.execute(req).await.unwrap();
        assert!(execution.partial);
        assert!(execution.error.is_some());
        assert_eq!(execution.node_executions.len(), 3);
        let skipped: Vec<_> = execution
            .node_executions
            .iter()
            .filter(|n| n.status == NodeStatus::Skipped)
            .collect();
        assert!(!skipped.is_empty(), "remaining nodes past exhaustion must be recorded as skipped");
    }

    #[tokio::test]
    async fn insufficient_credits_rejects_before_execution_starts() {
        let wf = base_workflow(
            vec![node(
                "upper",
                "uppercase",
                vec![Parameter::new("text", ParameterType::String).with_default(json!("hi"))],
                vec![Parameter::new("text", ParameterType::String)],
            )],
            vec![],
        );

        let mut req = request(wf);
        req.credit_balance = 0.0;
        req.overage_limit = 0.0;

        let result = executor().execute(req).await;
        assert!(matches!(result, Err(WorkflowError::InsufficientCredits { .. })));
    }

    #[tokio::test]
    async fn repeated_input_preserves_edge_declaration_order() {
        let wf = base_workflow(
            vec![
                node(
                    "a",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::String).with_default(json!("a"))],
                    vec![Parameter::new("value", ParameterType::String)],
                ),
                node(
                    "b",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::String).with_default(json!("b"))],
                    vec![Parameter::new("value", ParameterType::String)],
                ),
                node(
                    "collector",
                    "passthrough",
                    vec![Parameter::new("value", ParameterType::Any).repeated()],
                    vec![Parameter::new("value", ParameterType::Any)],
                ),
            ],
            vec![
                Edge {
                    source: "b".into(),
                    source_output: "value".into(),
                    target: "collector".into(),
                    target_input: "value".into(),
                },
                Edge {
                    source: "a".into(),
                    source_output: "value".into(),
                    target: "collector".into(),
                    target_input: "value".into(),
                },
            ],
        );

        let execution = executor().execute(request(wf)).await.unwrap();
        let collector = execution
            .node_executions
            .iter()
            .find(|n| n.node_id == "collector")
            .unwrap();
        let inputs = collector.inputs.as_ref().unwrap().get("value").unwrap();
        assert_eq!(inputs, &json!(["b", "a"]));
    }
}
