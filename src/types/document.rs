//! The generic, read-only document wrapper.
//!
//! A [`Document`] owns one JSON object exactly as the Bot API sent it. It
//! never mutates that object; every accessor hands out clones wrapped in a
//! [`Resolved`] value. Nested objects are re-wrapped on each call rather
//! than memoized, since update payloads are small.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::{
    envelope::unwrap_result,
    error::DocumentError,
    options::ResolveOptions,
    relation::{self, Resolved},
    util::is_absent,
};

/// Read-only wrapper over a JSON object with string keys.
///
/// Field order is the order the fields appeared in the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    raw: Map<String, Value>,
    options: ResolveOptions,
}

impl Document {
    /// Wrap a parsed payload.
    ///
    /// An envelope of the form `{"ok": .., "result": {..}}` is unwrapped and
    /// only the `result` is kept. Fails if what remains is not an object.
    pub fn new(value: Value) -> Result<Self, DocumentError> {
        match unwrap_result(value) {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(DocumentError::NOT_A_MAPPING),
        }
    }

    /// Wrap an object without looking for an envelope.
    pub fn from_map(raw: Map<String, Value>) -> Self {
        Self {
            raw,
            options: ResolveOptions::default(),
        }
    }

    /// Replace the resolution options for this document and every document
    /// derived from it.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The options used when resolving fields of this document.
    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// A nested document sharing this document's options.
    pub(crate) fn child(&self, raw: Map<String, Value>) -> Document {
        Document {
            raw,
            options: self.options,
        }
    }

    /// Wrap a raw value: objects become documents, everything else is a
    /// scalar.
    pub(crate) fn wrap(&self, value: &Value) -> Resolved {
        match value {
            Value::Object(map) => Resolved::Raw(self.child(map.clone())),
            other => Resolved::Scalar(other.clone()),
        }
    }

    /// The underlying JSON object.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Consume the document, returning the underlying JSON object.
    pub fn into_raw(self) -> Map<String, Value> {
        self.raw
    }

    /// A copy of the document as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.raw.clone())
    }

    /// Number of top-level fields, `null` ones included.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the document has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Top-level field names in payload order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.raw.keys().map(String::as_str)
    }

    /// Whether `key` is present. A present `null` counts as present.
    pub fn has(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    /// The value at `key`, with nested objects wrapped as documents.
    ///
    /// `null` is treated as absent.
    pub fn get(&self, key: &str) -> Option<Resolved> {
        let value = self.raw.get(key);
        if is_absent(value) {
            return None;
        }
        value.map(|v| self.wrap(v))
    }

    /// Like [`get`](Self::get), falling back to `default`.
    ///
    /// A document default takes on this document's options.
    pub fn get_or(&self, key: &str, default: impl Into<Resolved>) -> Resolved {
        self.get(key).unwrap_or_else(|| self.adopt(default.into()))
    }

    /// Like [`get`](Self::get), computing the fallback only when needed.
    pub fn get_or_else<F>(&self, key: &str, default: F) -> Resolved
    where
        F: FnOnce() -> Resolved,
    {
        self.get(key).unwrap_or_else(|| self.adopt(default()))
    }

    fn adopt(&self, resolved: Resolved) -> Resolved {
        match resolved {
            Resolved::Raw(document) => Resolved::Raw(document.with_options(self.options)),
            other => other,
        }
    }

    /// Field access by accessor name (`replyToMessage` or
    /// `reply_to_message`).
    ///
    /// A generic document declares no relations, so nested objects are
    /// typed only when their field name matches an
    /// [`ObjectKind`](crate::types::ObjectKind).
    pub fn field(&self, accessor: &str) -> Result<Option<Resolved>, DocumentError> {
        relation::resolve_field(self, &[], accessor)
    }

    /// Dynamic accessor call: `getChat` behaves as `field("chat")`.
    pub fn call(&self, method: &str) -> Result<Option<Resolved>, DocumentError> {
        relation::call(self, &[], method)
    }

    /// The nested object at `key` as a document, if it is one.
    pub fn nested(&self, key: &str) -> Option<Document> {
        match self.raw.get(key)? {
            Value::Object(map) => Some(self.child(map.clone())),
            _ => None,
        }
    }

    /// The string at `key`, if it is one.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    /// The integer at `key`, if it fits an `i64`.
    pub fn i64(&self, key: &str) -> Option<i64> {
        self.raw.get(key).and_then(Value::as_i64)
    }

    /// The boolean at `key`, if it is one.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.raw.get(key).and_then(Value::as_bool)
    }

    /// The sequence at `key`, or an empty slice when absent or not a
    /// sequence.
    pub fn sequence(&self, key: &str) -> &[Value] {
        match self.raw.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }

    /// The `ok` flag, if it survived among the stored fields.
    ///
    /// [`Document::new`] drops the envelope, so this only finds a flag on
    /// documents built from a payload that had `ok` but no `result`. Use
    /// [`ApiResponse`](crate::types::ApiResponse) to keep `ok` reliably.
    pub fn raw_ok(&self) -> Option<bool> {
        self.bool("ok")
    }
}

impl From<Map<String, Value>> for Document {
    fn from(raw: Map<String, Value>) -> Self {
        Self::from_map(raw)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}
