//! Host-facing surface for the workflow executor: trigger normalization and
//! deployment dispatch. An actual HTTP/webhook/queue listener lives outside
//! this crate; this is the seam it calls into.

pub mod dispatcher;
pub mod triggers;

pub use dispatcher::{DispatchError, Dispatcher};
pub use triggers::TriggerEvent;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use workflow_engine_core::blob::InMemoryObjectStore;
    use workflow_engine_core::config::ExecutorConfig;
    use workflow_engine_core::nodes::{ExecutionMode, NodeRegistry};
    use workflow_engine_core::store::DeploymentStore;
    use workflow_engine_core::testing::{InMemoryDeploymentStore, InMemoryExecutionStore};
    use workflow_engine_core::workflow::Executor;

    use super::*;

    #[tokio::test]
    async fn dispatch_runs_the_deployed_snapshot() {
        let registry = Arc::new(NodeRegistry::new());
        workflow_engine_nodes::register_all(&registry).unwrap();

        let executor = Arc::new(Executor::new(
            registry,
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryExecutionStore::new()),
            ExecutorConfig::default(),
        ));

        let deployments = Arc::new(InMemoryDeploymentStore::new());
        let workflow = workflow_engine_core::testing::linear_pass_through_workflow();
        deployments.publish("deploy-1", workflow).await.unwrap();

        let dispatcher = Dispatcher::new(executor, deployments, 1000.0, 0.0, ExecutionMode::Dev);

        let execution = dispatcher
            .dispatch(
                "deploy-1",
                "org-fixture",
                TriggerEvent::Manual {
                    user_id: "user-1".into(),
                    input: serde_json::json!({}),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            execution.status,
            workflow_engine_core::model::ExecutionStatus::Completed
        );
    }

    #[tokio::test]
    async fn dispatch_fails_for_unknown_deployment() {
        let registry = Arc::new(NodeRegistry::new());
        let executor = Arc::new(Executor::new(
            registry,
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryExecutionStore::new()),
            ExecutorConfig::default(),
        ));
        let deployments = Arc::new(InMemoryDeploymentStore::new());
        let dispatcher = Dispatcher::new(executor, deployments, 1000.0, 0.0, ExecutionMode::Dev);

        let result = dispatcher
            .dispatch(
                "missing",
                "org-fixture",
                TriggerEvent::Manual {
                    user_id: "user-1".into(),
                    input: serde_json::json!({}),
                },
            )
            .await;

        assert!(matches!(result, Err(DispatchError::DeploymentNotFound { .. })));
    }
}
