//! # Dispatcher
//!
//! Resolves a deployment to its frozen workflow snapshot and runs it,
//! wiring a [`TriggerEvent`] through to an
//! [`workflow_engine_core::workflow::ExecutionRequest`] (spec.md §6).

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use workflow_engine_core::error::WorkflowError;
use workflow_engine_core::model::Execution;
use workflow_engine_core::nodes::ExecutionMode;
use workflow_engine_core::store::DeploymentStore;
use workflow_engine_core::workflow::{ExecutionRequest, Executor};

use crate::triggers::TriggerEvent;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("deployment not found: {deployment_id}")]
    DeploymentNotFound { deployment_id: String },
    #[error(transparent)]
    Execution(#[from] WorkflowError),
}

/// Runs deployments by id, using a frozen workflow snapshot rather than the
/// live editable document (spec.md §6 deployment-mode execution).
pub struct Dispatcher {
    executor: Arc<Executor>,
    deployments: Arc<dyn DeploymentStore>,
    credit_balance_per_execution: f64,
    overage_limit_per_execution: f64,
    mode: ExecutionMode,
}

impl Dispatcher {
    pub fn new(
        executor: Arc<Executor>,
        deployments: Arc<dyn DeploymentStore>,
        credit_balance_per_execution: f64,
        overage_limit_per_execution: f64,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            executor,
            deployments,
            credit_balance_per_execution,
            overage_limit_per_execution,
            mode,
        }
    }

    #[instrument(skip_all, fields(deployment_id = %deployment_id))]
    pub async fn dispatch(
        &self,
        deployment_id: &str,
        organization_id: &str,
        event: TriggerEvent,
    ) -> Result<Execution, DispatchError> {
        let workflow = self
            .deployments
            .snapshot(deployment_id)
            .await?
            .ok_or_else(|| DispatchError::DeploymentNotFound {
                deployment_id: deployment_id.to_string(),
            })?;

        let request = ExecutionRequest {
            workflow,
            organization_id: organization_id.to_string(),
            user_id: event.user_id(),
            trigger_input: event.to_trigger_input(),
            credit_balance: self.credit_balance_per_execution,
            overage_limit: self.overage_limit_per_execution,
            integrations: HashMap::new(),
            mode: self.mode,
        };

        Ok(self.executor.execute(request).await?)
    }
}
