//! The metadata contract stored entities implement, plus the filter and
//! patch types every backend understands.
//!
//! Backends move records around as JSON documents (field name → value), which
//! is what lets one store implementation per backend serve every entity: the
//! in-memory and JSON-file backends hold documents directly, and the SQLite
//! backend maps document fields onto one TEXT column each.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, models::Timestamp};

/// A JSON object representation of a record.
pub type Document = serde_json::Map<String, Value>;

/// A stored entity.
///
/// `FIELDS` lists the entity's data fields (excluding `id` and `createdAt`)
/// using their wire names; the names double as the relational backend's
/// column names. `Draft` is the caller-supplied subset of the entity; the
/// store assigns `id` and `createdAt` on create.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Serialize + DeserializeOwned + Send;

    const COLLECTION: &'static str;
    const FIELDS: &'static [&'static str];

    fn id(&self) -> &str;

    fn created_at(&self) -> Timestamp;
}

/// An exact-match filter over record fields.
///
/// All filterable fields (ids, foreign keys, months, years, categories,
/// emails) are strings on the wire, so values are plain strings compared for
/// equality. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(&'static str, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a filter on the `id` field.
    pub fn by_id(id: &str) -> Self {
        Self::new().field("id", id)
    }

    /// Add an equality condition on `name`.
    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Whether `doc` satisfies every condition.
    pub fn matches(&self, doc: &Document) -> bool {
        self.fields.iter().all(|(name, want)| {
            doc.get(*name).and_then(Value::as_str) == Some(want.as_str())
        })
    }
}

/// A partial update: the fields to merge into an existing record.
///
/// Fields absent from the patch are left unchanged. Values are strings, the
/// wire representation shared by every patchable field.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    fields: Vec<(&'static str, String)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`.
    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Merge the patch into `doc`.
    pub fn apply_to(&self, doc: &mut Document) {
        for (name, value) in &self.fields {
            doc.insert((*name).to_string(), Value::String(value.clone()));
        }
    }
}

/// Serialize a draft or record into its document form.
///
/// # Errors
/// Returns [Error::Serde] if `value` does not serialize to a JSON object.
pub fn to_document<S: Serialize>(value: &S) -> Result<Document, Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Serde(format!(
            "expected record to serialize to an object, got {other}"
        ))),
    }
}

/// Deserialize a document back into a typed record or draft.
///
/// # Errors
/// Returns [Error::Serde] if the document is missing fields or holds values
/// of the wrong shape.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, Error> {
    serde_json::from_value(Value::Object(doc)).map_err(Error::from)
}

/// The `createdAt` value of a document, or zero if missing.
pub(crate) fn doc_created_at(doc: &Document) -> Timestamp {
    doc.get("createdAt").and_then(Value::as_i64).unwrap_or(0)
}

/// Stamp a draft document with a fresh id and creation timestamp.
pub(crate) fn assign_identity(doc: &mut Document) -> String {
    let id = Uuid::new_v4().to_string();
    doc.insert("id".to_string(), Value::String(id.clone()));
    doc.insert(
        "createdAt".to_string(),
        Value::Number(next_timestamp().into()),
    );

    id
}

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// The current time in epoch milliseconds, strictly increasing per process.
///
/// Two records created in the same millisecond still get distinct
/// timestamps, so ordering by `createdAt` reproduces creation order exactly
/// on every backend.
pub(crate) fn next_timestamp() -> Timestamp {
    let now = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;

    let previous = LAST_TIMESTAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(last.max(now - 1) + 1)
        })
        .unwrap_or(now);

    previous.max(now - 1) + 1
}
