// JSON:API structural types
//
// The registry treats entities as pass-through JSON: a resource is an
// id, a type, and an open attribute map. Anything else the backend
// sends (`relationships`, `links`, `meta`, ...) is captured via
// `#[serde(flatten)]` so unanticipated members survive a round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Resources and documents ──────────────────────────────────────────

/// A single JSON:API resource: `{ "id", "type", "attributes", ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Look up a string attribute by name. Non-string values (including
    /// null) return `None`.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Navigate `relationships.{name}.data.id` for a to-one
    /// relationship.
    pub fn related_id(&self, name: &str) -> Option<&str> {
        self.extra
            .get("relationships")?
            .get(name)?
            .get("data")?
            .get("id")?
            .as_str()
    }
}

/// A collection response: `{ "data": [Resource, ...], ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument {
    #[serde(default)]
    pub data: Vec<Resource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single-resource response: `{ "data": Resource, ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDocument {
    pub data: Resource,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Request envelope ─────────────────────────────────────────────────

/// Request body for create/update calls:
/// `{"data": {"type": ..., "id"?: ..., "attributes": {...}}}`.
///
/// The `id` member is present only for updates.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    data: EnvelopeData<'a>,
}

#[derive(Debug, Serialize)]
struct EnvelopeData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'a str,
    attributes: &'a Map<String, Value>,
}

impl<'a> Envelope<'a> {
    /// Envelope for a POST (create): no id.
    pub fn create(kind: &'a str, attributes: &'a Map<String, Value>) -> Self {
        Self {
            data: EnvelopeData {
                id: None,
                kind,
                attributes,
            },
        }
    }

    /// Envelope for a PATCH (update): id included.
    pub fn update(kind: &'a str, id: &'a str, attributes: &'a Map<String, Value>) -> Self {
        Self {
            data: EnvelopeData {
                id: Some(id),
                kind,
                attributes,
            },
        }
    }
}

// ── Lookup selector ──────────────────────────────────────────────────

/// Identifies an entity for helpers that accept an id, a name, or both.
///
/// When both are supplied the entity is fetched by id and its name
/// field compared against the supplied name; a disagreement fails with
/// [`Error::IdentifierMismatch`](crate::Error::IdentifierMismatch)
/// rather than silently preferring one identifier.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Id(&'a str),
    Name(&'a str),
    IdAndName { id: &'a str, name: &'a str },
}
