//! Wire data model shared by the editor, the store, and the simulation engine.
//!
//! Everything here round-trips whatever the editor sends: unknown keys are kept
//! in `extra` so a saved chain comes back exactly as it was written.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{DripError, DripResult};
use crate::node::NodeKind;

/// A drip campaign graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chain {
    /// Validates the `{ nodes: [], edges: [] }` shape and decodes the chain.
    pub fn from_value(value: Value, message: &str) -> DripResult<Self> {
        let well_formed = value
            .as_object()
            .map(|obj| {
                obj.get("nodes").is_some_and(Value::is_array)
                    && obj.get("edges").is_some_and(Value::is_array)
            })
            .unwrap_or(false);
        if !well_formed {
            return Err(DripError::Validation(message.to_string()));
        }
        serde_json::from_value(value).map_err(|_| DripError::Validation(message.to_string()))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Event nodes in declaration order.
    pub fn event_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| n.node_type.as_deref() == Some("event"))
    }
}

/// A node as stored by the editor. Use [`Node::kind`] for the typed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: &str, data: Value) -> Self {
        Self {
            id: id.into(),
            node_type: Some(node_type.to_string()),
            data: match data {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_node(self)
    }

    /// Non-empty string attribute from `data`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    /// Half-drawn edges may lack an end; they never match a node.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(
        default,
        deserialize_with = "object_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        let mut data = Map::new();
        data.insert("path".to_string(), Value::String(path.to_string()));
        self.data = Some(data);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(Value::String(label.to_string()));
        self
    }

    /// Branch this edge belongs to: `data.path`, else the lower-cased label.
    pub fn path_label(&self) -> Option<String> {
        let explicit = self
            .data
            .as_ref()
            .and_then(|d| d.get("path"))
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty());
        if let Some(path) = explicit {
            return Some(path.to_string());
        }
        self.label
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_lowercase)
    }
}

/// The external stimulus that selects a start node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type", default)]
    pub trigger_type: String,
    #[serde(default)]
    pub payload: TriggerPayload,
}

impl Trigger {
    pub fn new(trigger_type: impl Into<String>) -> Self {
        Self {
            trigger_type: trigger_type.into(),
            payload: TriggerPayload::default(),
        }
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new("contact_added")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Simulated clock and email-interaction ledger carried through one walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationContext {
    #[serde(default)]
    pub now: String,
    #[serde(default)]
    pub emails: HashMap<String, EmailRecord>,
    /// Legacy global override: id of an email to treat as opened, or `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_opened: Option<Value>,
    /// Legacy global override: id of an email to treat as clicked, or `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_clicked: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SimulationContext {
    pub fn at(now: impl Into<String>) -> Self {
        Self {
            now: now.into(),
            ..Default::default()
        }
    }

    /// Context used when the caller supplies none: real time, no overrides.
    pub fn starting_now() -> Self {
        Self {
            now: crate::time::format_instant(&chrono::Utc::now()),
            email_opened: Some(Value::Bool(false)),
            email_clicked: Some(Value::Bool(false)),
            ..Default::default()
        }
    }

    pub fn opened_override(&self) -> Option<String> {
        self.email_opened.as_ref().and_then(override_ref)
    }

    pub fn clicked_override(&self) -> Option<String> {
        self.email_clicked.as_ref().and_then(override_ref)
    }
}

/// Email id carried by a legacy override; `false`, `null`, `0` and `""` mean none.
fn override_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Interaction state of one simulated email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub opened: bool,
    #[serde(default)]
    pub clicked: bool,
}

/// `data` as the editor sends it: anything that is not an object reads as empty.
fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(object_or_none(deserializer)?.unwrap_or_default())
}

fn object_or_none<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}
