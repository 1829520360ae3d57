//! # Trigger Adapters
//!
//! Normalizes every way a workflow can be started — an operator clicking
//! "run", an inbound webhook, a direct HTTP request, an email, a queue
//! message, or a schedule firing — into the single [`ExecutionRequest`]
//! shape the Executor understands (spec.md §6).

use serde_json::{json, Value};

/// The six ways an execution can be started (spec.md §3 `Workflow.trigger`).
#[derive(Debug, Clone)]
pub enum TriggerEvent {
    Manual {
        user_id: String,
        input: Value,
    },
    HttpWebhook {
        headers: Value,
        body: Value,
    },
    HttpRequest {
        method: String,
        path: String,
        headers: Value,
        body: Value,
    },
    EmailMessage {
        from: String,
        subject: String,
        body: String,
    },
    QueueMessage {
        queue: String,
        payload: Value,
    },
    Scheduled {
        cron_expression: String,
        fired_at: chrono::DateTime<chrono::Utc>,
    },
}

impl TriggerEvent {
    /// Flattens this event into the single `trigger_input` value an
    /// [`workflow_engine_core::workflow::ExecutionRequest`] carries, available to
    /// any node with no incoming edges.
    pub fn to_trigger_input(&self) -> Value {
        match self {
            TriggerEvent::Manual { input, .. } => input.clone(),
            TriggerEvent::HttpWebhook { headers, body } => json!({
                "headers": headers,
                "body": body,
            }),
            TriggerEvent::HttpRequest {
                method,
                path,
                headers,
                body,
            } => json!({
                "method": method,
                "path": path,
                "headers": headers,
                "body": body,
            }),
            TriggerEvent::EmailMessage { from, subject, body } => json!({
                "from": from,
                "subject": subject,
                "body": body,
            }),
            TriggerEvent::QueueMessage { queue, payload } => json!({
                "queue": queue,
                "payload": payload,
            }),
            TriggerEvent::Scheduled {
                cron_expression,
                fired_at,
            } => json!({
                "cronExpression": cron_expression,
                "firedAt": fired_at.to_rfc3339(),
            }),
        }
    }

    /// The user id attributed to executions started by this event. Non-human
    /// triggers run as the same sentinel agent user as the MCP surface.
    pub fn user_id(&self) -> String {
        match self {
            TriggerEvent::Manual { user_id, .. } => user_id.clone(),
            _ => workflow_engine_core::model::MCP_AGENT_USER_ID.to_string(),
        }
    }
}
