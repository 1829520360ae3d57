//! # Parameter Codec
//!
//! Converts values between their wire form (what a workflow document or an
//! upstream node's output carries) and their node form (what
//! [`crate::nodes::NodeContext`] hands to an [`crate::nodes::ExecutableNode`]),
//! per the per-type rules in spec.md §4.4. Conversion is idempotent: encoding
//! a value already on the wire, or decoding a value already node-side, is a
//! no-op.
//!
//! Binary types (`image`/`audio`/`document`) always travel as an envelope
//! `{data, mimeType}` (spec.md §3, §4.4): on the wire, `data` is either an
//! inline base64 string or a `{blobRef}` reference; node-side, `data` is
//! always the inline byte sequence (base64), with `mimeType` carried through
//! unchanged either way.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use crate::blob::{BlobRef, ObjectStore};
use crate::error::{Result, WorkflowError};
use crate::model::ParameterType;

/// Large binary payloads above this size move to the object store instead of
/// travelling inline as base64 (spec.md §6, default 128 KiB).
pub const DEFAULT_INLINE_THRESHOLD_BYTES: usize = 128 * 1024;

/// Per-type wire⇄node conversion. Holds the object store binary payloads are
/// spilled to and fetched from.
pub struct ParameterCodec {
    object_store: Arc<dyn ObjectStore>,
    inline_threshold_bytes: usize,
}

impl ParameterCodec {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        Self {
            object_store,
            inline_threshold_bytes: DEFAULT_INLINE_THRESHOLD_BYTES,
        }
    }

    pub fn with_inline_threshold(mut self, bytes: usize) -> Self {
        self.inline_threshold_bytes = bytes;
        self
    }

    /// Converts a value arriving over the wire (a literal, or an upstream
    /// node's wire-form output) into the value a node's `NodeContext` sees.
    pub async fn wire_to_node(&self, param_type: ParameterType, wire_value: &Value) -> Result<Value> {
        match param_type {
            ParameterType::String
            | ParameterType::Number
            | ParameterType::Boolean
            | ParameterType::Json
            | ParameterType::Any => Ok(wire_value.clone()),
            ParameterType::GeoJson => {
                if wire_value.is_object() {
                    Ok(wire_value.clone())
                } else {
                    Err(WorkflowError::InputConversionFailed {
                        node_id: String::new(),
                        parameter: String::new(),
                        cause: "geojson value must be a JSON object".into(),
                    })
                }
            }
            ParameterType::Image | ParameterType::Audio | ParameterType::Document => {
                self.binary_wire_to_node(wire_value).await
            }
        }
    }

    /// Converts a node's produced value back into wire form, spilling large
    /// binary payloads to the object store (spec.md §6, egress threshold).
    pub async fn node_to_wire(&self, param_type: ParameterType, node_value: &Value) -> Result<Value> {
        match param_type {
            ParameterType::String
            | ParameterType::Number
            | ParameterType::Boolean
            | ParameterType::Json
            | ParameterType::Any => Ok(node_value.clone()),
            ParameterType::GeoJson => {
                if node_value.is_object() {
                    Ok(node_value.clone())
                } else {
                    Err(WorkflowError::OutputConversionFailed {
                        node_id: String::new(),
                        parameter: String::new(),
                        cause: "geojson value must be a JSON object".into(),
                    })
                }
            }
            ParameterType::Image | ParameterType::Audio | ParameterType::Document => {
                self.binary_node_to_wire(node_value).await
            }
        }
    }

    /// Node-side binary values are always `{data: <inline base64>, mimeType}`;
    /// a wire value whose `data` is already inline passes through unchanged
    /// (idempotence), while a `{blobRef}` `data` is resolved to inline bytes.
    async fn binary_wire_to_node(&self, wire_value: &Value) -> Result<Value> {
        let envelope = wire_value.as_object().ok_or_else(|| WorkflowError::InputConversionFailed {
            node_id: String::new(),
            parameter: String::new(),
            cause: format!("expected {{data, mimeType}} envelope, got {wire_value}"),
        })?;
        let mime_type = envelope.get("mimeType").cloned().unwrap_or(Value::Null);
        let data = envelope.get("data").ok_or_else(|| WorkflowError::InputConversionFailed {
            node_id: String::new(),
            parameter: String::new(),
            cause: "binary envelope missing 'data'".into(),
        })?;

        let inline_data = if let Some(blob_ref) = data.get("blobRef").and_then(|v| v.as_str()) {
            let bytes = self.object_store.get(&BlobRef(blob_ref.to_string())).await?;
            json!(BASE64.encode(bytes))
        } else {
            match data {
                Value::String(_) => data.clone(),
                other => {
                    return Err(WorkflowError::InputConversionFailed {
                        node_id: String::new(),
                        parameter: String::new(),
                        cause: format!("expected inline base64 string or {{blobRef}} for 'data', got {other}"),
                    })
                }
            }
        };

        Ok(json!({ "data": inline_data, "mimeType": mime_type }))
    }

    /// A node-side binary value is always `{data: <inline base64>, mimeType}`.
    /// If `data` is small it stays inline on the wire; otherwise it's spilled
    /// to the object store (tagged with `mimeType`) and `data` is replaced
    /// with a `{blobRef}` reference.
    async fn binary_node_to_wire(&self, node_value: &Value) -> Result<Value> {
        let envelope = node_value.as_object().ok_or_else(|| WorkflowError::OutputConversionFailed {
            node_id: String::new(),
            parameter: String::new(),
            cause: format!("expected {{data, mimeType}} envelope, got {node_value}"),
        })?;
        let mime_type = envelope.get("mimeType").cloned().unwrap_or(Value::Null);
        let encoded = envelope
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| WorkflowError::OutputConversionFailed {
                node_id: String::new(),
                parameter: String::new(),
                cause: "expected inline base64 string for 'data'".into(),
            })?;
        let bytes = BASE64.decode(encoded).map_err(|e| WorkflowError::OutputConversionFailed {
            node_id: String::new(),
            parameter: String::new(),
            cause: format!("invalid base64: {e}"),
        })?;

        let data = if bytes.len() <= self.inline_threshold_bytes {
            json!(encoded)
        } else {
            let mime_type_str = mime_type.as_str().map(|s| s.to_string());
            let blob_ref = self.object_store.put(bytes, mime_type_str).await?;
            json!({ "blobRef": blob_ref.0 })
        };

        Ok(json!({ "data": data, "mimeType": mime_type }))
    }
}
