use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::error::{Error, Result};
use crate::core::value::{StateValue, ValueKind};

/// A state as held by the host's state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub val: StateValue,
    pub ack: bool,
    /// Epoch milliseconds of the last write.
    #[serde(default)]
    pub ts: i64,
    /// Origin of the last write, `system.adapter.<name>.<instance>` for adapters.
    #[serde(default)]
    pub from: String,
}

impl State {
    pub fn new(val: impl Into<StateValue>, ack: bool) -> Self {
        State {
            val: val.into(),
            ack,
            ts: Utc::now().timestamp_millis(),
            from: String::new(),
        }
    }

    pub fn from_origin(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }
}

/// An object of the host's object store (states, channels, configs, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostObject {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub object_type: String,
    #[serde(default)]
    pub common: Map<String, Value>,
    #[serde(default)]
    pub native: Map<String, Value>,
}

impl HostObject {
    pub fn new(id: impl Into<String>, object_type: impl Into<String>) -> Self {
        HostObject {
            id: id.into(),
            object_type: object_type.into(),
            ..Default::default()
        }
    }

    pub fn with_common(mut self, common: Map<String, Value>) -> Self {
        self.common = common;
        self
    }

    pub fn common_str(&self, key: &str) -> Option<&str> {
        self.common.get(key).and_then(Value::as_str)
    }

    /// Reads a numeric `common` field, accepting numbers and numeric strings.
    pub fn common_f64(&self, key: &str) -> Option<f64> {
        match self.common.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Shallow merge of `other` into `self`: `common` and `native` keys are
    /// overwritten one by one, a non-empty type replaces the current one.
    pub fn extend(&mut self, other: HostObject) {
        if !other.object_type.is_empty() {
            self.object_type = other.object_type;
        }
        self.common.extend(other.common);
        self.native.extend(other.native);
    }
}

/// Metadata declared for a state object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateCommon {
    pub name: String,
    pub read: bool,
    pub write: bool,
    pub role: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// `"state"` for regular states; anything else skips the initial value write.
    pub state: String,
}

impl StateCommon {
    /// Default read-only value metadata for `id`, typed after `value`.
    pub fn for_value(id: impl Into<String>, value: &StateValue) -> Self {
        StateCommon {
            name: id.into(),
            read: true,
            write: false,
            role: "value".to_string(),
            kind: ValueKind::of(value),
            unit: None,
            state: "state".to_string(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn into_map(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name));
        map.insert("read".to_string(), Value::Bool(self.read));
        map.insert("write".to_string(), Value::Bool(self.write));
        map.insert("role".to_string(), Value::String(self.role));
        map.insert("type".to_string(), Value::String(self.kind.as_str().to_string()));
        if let Some(unit) = self.unit {
            map.insert("unit".to_string(), Value::String(unit));
        }
        map.insert("state".to_string(), Value::String(self.state));
        map
    }
}

/// What to create with [`Adapter::make_state`](crate::Adapter::make_state):
/// a bare id, or an id plus metadata overrides.
#[derive(Debug, Clone, PartialEq)]
pub enum StateSpec {
    Id(String),
    Descriptor {
        id: String,
        common: Map<String, Value>,
    },
}

impl StateSpec {
    pub fn descriptor(id: impl Into<String>, common: Map<String, Value>) -> Self {
        StateSpec::Descriptor {
            id: id.into(),
            common,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            StateSpec::Id(id) | StateSpec::Descriptor { id, .. } => id,
        }
    }
}

impl From<&str> for StateSpec {
    fn from(id: &str) -> Self {
        StateSpec::Id(id.to_string())
    }
}

impl From<String> for StateSpec {
    fn from(id: String) -> Self {
        StateSpec::Id(id)
    }
}

impl TryFrom<Value> for StateSpec {
    type Error = Error;

    /// Accepts a JSON string id or an object with a string `id` field; the
    /// object's remaining fields become metadata overrides.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(id) => Ok(StateSpec::Id(id)),
            Value::Object(mut map) => match map.remove("id") {
                Some(Value::String(id)) => Ok(StateSpec::Descriptor { id, common: map }),
                _ => Err(Error::InvalidArgument(format!(
                    "Invalid makeState id: {}",
                    Value::Object(map)
                ))),
            },
            other => Err(Error::InvalidArgument(format!(
                "Invalid makeState id: {}",
                other
            ))),
        }
    }
}

/// An inbound message from the host's message bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub callback: Option<Value>,
}

impl Message {
    pub fn new(command: impl Into<String>, message: impl Into<Value>) -> Self {
        Message {
            command: Some(command.into()),
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Query parameters for [`Host::get_object_list`](crate::Host::get_object_list).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startkey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endkey: Option<String>,
    #[serde(default)]
    pub include_docs: bool,
}

impl ObjectListParams {
    /// Every object whose id lies in `[start, end]`.
    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        ObjectListParams {
            startkey: Some(start.into()),
            endkey: Some(end.into()),
            include_docs: false,
        }
    }

    /// Every object, including its document.
    pub fn all_with_docs() -> Self {
        ObjectListParams {
            include_docs: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectList {
    pub rows: Vec<ObjectRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<HostObject>,
}
