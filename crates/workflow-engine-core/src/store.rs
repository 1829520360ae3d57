//! # Opaque Persistent Stores
//!
//! Trait boundaries for the persistent stores spec.md §1 places out of
//! scope: the core only needs to read and write through these interfaces,
//! never to know what's behind them. [`crate::testing`] carries in-memory
//! implementations for tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Workflow;

/// Live, editable workflow documents (spec.md §6). A deployment freezes one
/// snapshot of a workflow; this store holds the mutable original.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn get(&self, workflow_id: &str) -> Result<Option<Workflow>>;
    async fn put(&self, workflow: Workflow) -> Result<()>;
}

/// Frozen workflow snapshots executions actually run against, decoupled
/// from later edits to the live document (spec.md §6
/// `ReadWorkflowSnapshot(deploymentId)`).
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    async fn snapshot(&self, deployment_id: &str) -> Result<Option<Workflow>>;
    async fn publish(&self, deployment_id: &str, workflow: Workflow) -> Result<()>;
}
