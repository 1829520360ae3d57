//! A small library of node implementations used to exercise the executor in
//! tests and demos. None of these talk to a real external system; each is a
//! minimal, deterministic example of the [`ExecutableNode`] contract.
//!
//! ```no_run
//! use std::sync::Arc;
//! use workflow_engine_core::nodes::NodeRegistry;
//! use workflow_engine_nodes::register_all;
//!
//! let registry = Arc::new(NodeRegistry::new());
//! register_all(&registry).expect("illustrative node types never collide");
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use workflow_engine_core::error::{Result, WorkflowError};
use workflow_engine_core::model::{Parameter, ParameterType};
use workflow_engine_core::nodes::{ExecutableNode, NodeContext, NodeOutcome, NodeRegistry, NodeTypeDescriptor};

/// Concatenates its `a` and `b` string inputs.
pub struct StringConcat;

#[async_trait]
impl ExecutableNode for StringConcat {
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
        let a = ctx.input("a").and_then(|v| v.as_str()).unwrap_or_default();
        let b = ctx.input("b").and_then(|v| v.as_str()).unwrap_or_default();
        Ok(NodeOutcome::new().with_output("text", json!(format!("{a}{b}"))))
    }
}

/// Upper-cases its `text` input.
pub struct StringUpper;

#[async_trait]
impl ExecutableNode for StringUpper {
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
        let text = ctx.input_str("text")?;
        Ok(NodeOutcome::new().with_output("text", json!(text.to_uppercase())))
    }
}

/// Joins a `repeated` string input with a separator, in the order the
/// upstream edges were declared.
pub struct StringJoin;

#[async_trait]
impl ExecutableNode for StringJoin {
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
        let items = ctx.input_repeated("items")?;
        let joined = items
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(NodeOutcome::new().with_output("joined", json!(joined)))
    }
}

/// Echoes its `value` input unchanged. Useful as a no-op placeholder or as
/// a source node carrying only a literal default value.
pub struct Passthrough;

#[async_trait]
impl ExecutableNode for Passthrough {
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
        let value = ctx
            .input("value")
            .cloned()
            .ok_or_else(|| WorkflowError::MissingRequiredInput {
                node_id: ctx.node_id.clone(),
                input: "value".into(),
            })?;
        Ok(NodeOutcome::new().with_output("value", value))
    }
}

/// Always fails with the given `message` input, or a fixed message if none
/// is supplied. Used to exercise the failure-cascade path in tests.
pub struct AlwaysFail;

#[async_trait]
impl ExecutableNode for AlwaysFail {
    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutcome> {
        let message = ctx
            .input("message")
            .and_then(|v| v.as_str())
            .unwrap_or("node configured to always fail")
            .to_string();
        Err(WorkflowError::NodeExecutionFailed {
            node_id: ctx.node_id.clone(),
            message,
        })
    }
}

/// Registers every node type in this crate with `registry`.
pub fn register_all(registry: &NodeRegistry) -> Result<()> {
    registry.register(
        NodeTypeDescriptor::new("string-concat", "Concatenate Strings")
            .description("Joins two string inputs end to end.")
            .inputs(vec![
                Parameter::new("a", ParameterType::String),
                Parameter::new("b", ParameterType::String),
            ])
            .outputs(vec![Parameter::new("text", ParameterType::String)]),
        Arc::new(|| Box::new(StringConcat)),
    )?;

    registry.register(
        NodeTypeDescriptor::new("string-upper", "Uppercase")
            .description("Converts its input string to upper case.")
            .inputs(vec![Parameter::new("text", ParameterType::String).required()])
            .outputs(vec![Parameter::new("text", ParameterType::String)]),
        Arc::new(|| Box::new(StringUpper)),
    )?;

    registry.register(
        NodeTypeDescriptor::new("string-join", "Join Strings")
            .description("Joins a repeated string input with a comma separator.")
            .inputs(vec![Parameter::new("items", ParameterType::String).repeated()])
            .outputs(vec![Parameter::new("joined", ParameterType::String)]),
        Arc::new(|| Box::new(StringJoin)),
    )?;

    registry.register(
        NodeTypeDescriptor::new("passthrough", "Passthrough")
            .description("Echoes its input value unchanged.")
            .inputs(vec![Parameter::new("value", ParameterType::Any)])
            .outputs(vec![Parameter::new("value", ParameterType::Any)]),
        Arc::new(|| Box::new(Passthrough)),
    )?;

    registry.register(
        NodeTypeDescriptor::new("always-fail", "Always Fail")
            .description("Fails unconditionally; used to exercise the failure cascade.")
            .inputs(vec![Parameter::new("message", ParameterType::String)])
            .outputs(vec![]),
        Arc::new(|| Box::new(AlwaysFail)),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_has_no_duplicate_type_names() {
        let registry = NodeRegistry::new();
        register_all(&registry).unwrap();
        assert_eq!(registry.len(), 5);
    }
}
