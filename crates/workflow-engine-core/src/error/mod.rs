//! # Error Handling
//!
//! All fallible operations in this crate return [`WorkflowError`]. Errors are
//! categorized ([`ErrorCategory`]) so the step-retry policy in
//! [`crate::workflow::executor`] can decide whether a failure is worth retrying
//! without matching on every variant.

mod retry;

pub use retry::{retry_with_backoff, RetryPolicy};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error categories used to decide retry eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// May succeed if retried (store I/O hiccups, transient network errors).
    Transient,
    /// Will not succeed on retry (bad graph, missing registration).
    Permanent,
    /// Caused by the caller's input.
    User,
    /// Infrastructure/dependency failure.
    System,
}

/// Top-level error type for every fallible operation in the workflow core.
///
/// Variants map directly onto the failure taxonomy in the specification:
/// Structural (`Invalid*`, `CycleDetected`, ...), Resource
/// (`InsufficientCredits`, `DeploymentNotFound`, ...), Type
/// (`InputConversionFailed`, `OutputConversionFailed`), Execution
/// (`NodeExecutionFailed`), Infrastructure (`StoreFailure`, `BlobStoreFailure`),
/// and Timeout/Cancellation (`ExecutionTimeout`, `StepTimeout`, `Cancelled`).
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The workflow graph failed static validation. Carries every issue found;
    /// the Validator never short-circuits on the first problem.
    #[error("workflow failed validation: {issues:?}")]
    InvalidWorkflow {
        issues: Vec<crate::workflow::validator::Issue>,
    },

    /// No implementation is registered under this node type.
    #[error("node type not registered: {node_type}")]
    NodeTypeMissing { node_type: String },

    /// The trigger's balance and overage limit are both exhausted before the
    /// first node runs.
    #[error("insufficient compute credits: balance {balance}, required at least {required}")]
    InsufficientCredits { balance: f64, required: f64 },

    /// `activeDeploymentId` was set but the deployment store has no matching
    /// snapshot.
    #[error("deployment not found: {deployment_id}")]
    DeploymentNotFound { deployment_id: String },

    /// `getIntegration` found no credentials for the requested id.
    #[error("integration not configured: {integration_id}")]
    IntegrationMissing { integration_id: String },

    /// A required input had no default, no incoming edge, and no trigger-supplied
    /// value when a node's inputs were resolved.
    #[error("node {node_id} missing required input '{input}'")]
    MissingRequiredInput { node_id: String, input: String },

    /// Converting a wire value to node form (or back) failed for the named
    /// parameter.
    #[error("input conversion failed for node {node_id} parameter '{parameter}': {cause}")]
    InputConversionFailed {
        node_id: String,
        parameter: String,
        cause: String,
    },

    /// Converting a node's declared output back to wire form failed.
    #[error("output conversion failed for node {node_id} parameter '{parameter}': {cause}")]
    OutputConversionFailed {
        node_id: String,
        parameter: String,
        cause: String,
    },

    /// A node returned `NodeExecution::Error`; this is recorded on the node and
    /// never unwinds past the Executor.
    #[error("node {node_id} reported an error: {message}")]
    NodeExecutionFailed { node_id: String, message: String },

    /// A durable step exhausted its retry budget against a store or blob
    /// backend.
    #[error("store operation failed after retry: {operation}: {cause}")]
    StoreFailure { operation: String, cause: String },

    /// The object store reported a failure reading or writing a blob.
    #[error("object store operation failed: {operation}: {cause}")]
    BlobStoreFailure { operation: String, cause: String },

    /// A blob reference did not resolve to any stored content.
    #[error("blob not found: {blob_ref}")]
    BlobNotFound { blob_ref: String },

    /// A blob's stored bytes failed an integrity check on read.
    #[error("blob corrupt: {blob_ref}")]
    BlobCorrupt { blob_ref: String },

    /// The per-execution timeout elapsed.
    #[error("execution timed out after {elapsed_ms}ms")]
    ExecutionTimeout { elapsed_ms: u64 },

    /// A single step exceeded its timeout.
    #[error("step '{step}' timed out after {elapsed_ms}ms")]
    StepTimeout { step: String, elapsed_ms: u64 },

    /// The trigger layer set the cancellation flag between steps.
    #[error("execution cancelled")]
    Cancelled,

    /// Tool-call recursion exceeded the configured depth, or revisited a
    /// `(workflow, node, tool)` triple already on the call stack.
    #[error("tool call recursion bound exceeded calling '{tool_ref}' from node {node_id}")]
    ToolRecursionExceeded { node_id: String, tool_ref: String },

    /// Duplicate registration of a node type; a fatal configuration error.
    #[error("duplicate node type registration: {node_type}")]
    DuplicateNodeType { node_type: String },

    /// A declared parameter type has no codec entry. This is an init-time
    /// configuration bug, never a runtime surprise.
    #[error("no parameter codec registered for type '{param_type}'")]
    CodecMissing { param_type: String },
}

impl WorkflowError {
    pub fn category(&self) -> ErrorCategory {
        use WorkflowError::*;
        match self {
            InvalidWorkflow { .. }
            | NodeTypeMissing { .. }
            | MissingRequiredInput { .. }
            | DuplicateNodeType { .. }
            | CodecMissing { .. }
            | ToolRecursionExceeded { .. } => ErrorCategory::Permanent,

            InsufficientCredits { .. } | DeploymentNotFound { .. } | IntegrationMissing { .. } => {
                ErrorCategory::User
            }

            InputConversionFailed { .. }
            | OutputConversionFailed { .. }
            | NodeExecutionFailed { .. } => ErrorCategory::Permanent,

            StoreFailure { .. } | BlobStoreFailure { .. } => ErrorCategory::Transient,

            BlobNotFound { .. } | BlobCorrupt { .. } => ErrorCategory::System,

            ExecutionTimeout { .. } | StepTimeout { .. } | Cancelled => ErrorCategory::System,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transient)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WorkflowError>;

impl From<serde_json::Error> for WorkflowError {
    fn from(err: serde_json::Error) -> Self {
        WorkflowError::InputConversionFailed {
            node_id: String::new(),
            parameter: String::new(),
            cause: err.to_string(),
        }
    }
}

/// Reason a node was skipped; stored verbatim on the `NodeExecution` and
/// surfaced as the error string pinned by the cascade scenario in spec.md §8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason(pub String);

impl SkipReason {
    pub fn upstream_error(upstream_node: &str, message: &str) -> Self {
        SkipReason(format!(
            "upstream error from node '{upstream_node}': {message}"
        ))
    }

    pub fn credit_exhausted() -> Self {
        SkipReason("compute credit balance exhausted before this node could run".into())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
