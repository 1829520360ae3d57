use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declared type names from spec.md §4.3/§4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Json,
    Any,
    GeoJson,
    Image,
    Audio,
    Document,
}

impl ParameterType {
    pub fn name(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Boolean => "boolean",
            ParameterType::Json => "json",
            ParameterType::Any => "any",
            ParameterType::GeoJson => "geojson",
            ParameterType::Image => "image",
            ParameterType::Audio => "audio",
            ParameterType::Document => "document",
        }
    }

    /// Type compatibility rule from spec.md §4.2: exact equality; `any`/`json`
    /// are compatible with everything; `image`/`audio`/`document` only with
    /// themselves; `geojson` is bidirectionally compatible with `json`.
    pub fn compatible_with(&self, other: ParameterType) -> bool {
        if *self == other {
            return true;
        }
        match (*self, other) {
            (ParameterType::Any, _) | (_, ParameterType::Any) => true,
            (ParameterType::Json, _) | (_, ParameterType::Json) => true,
            (ParameterType::GeoJson, ParameterType::Json)
            | (ParameterType::Json, ParameterType::GeoJson) => true,
            _ => false,
        }
    }
}

/// A named, typed input or output of a node (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique within the node's input or output list.
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    /// If true, this input may receive many fan-in values, accumulated in
    /// edge-declaration order (spec.md §4.1).
    #[serde(default)]
    pub repeated: bool,
    /// Default or literal wire-form value.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            hidden: false,
            repeated: false,
            value: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// A resolved wire-form value bound to one input name, distinguishing a
/// single scalar from an accumulated `repeated` fan-in list so the codec and
/// node-context builder don't have to re-derive it from `Parameter::repeated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParameterValue {
    Scalar(Value),
    Repeated(Vec<Value>),
}

impl ParameterValue {
    pub fn is_undefined(&self) -> bool {
        match self {
            ParameterValue::Scalar(v) => v.is_null(),
            ParameterValue::Repeated(v) => v.is_empty(),
        }
    }
}
