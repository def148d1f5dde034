//! Relation resolution.
//!
//! Field access goes through [`resolve_field`], which picks one of four
//! tiers in priority order:
//!
//! 1. absent or `null` field: `None`
//! 2. field declared in the wrapper's relation table: typed object or
//!    collection of typed objects
//! 3. field named after an [`ObjectKind`] holding an object: typed object
//! 4. anything else: generic [`Document`] for objects, the raw value
//!    otherwise
//!
//! Nothing is cached. Resolving the same field twice allocates twice and
//! yields equal values.

use serde_json::Value;
use tracing::warn;

use crate::types::{
    document::Document,
    error::DocumentError,
    object::{Object, ObjectKind},
    options::{CallPolicy, ShapePolicy},
    util::{shape_of, strip_getter, to_snake_case},
};

/// How a declared field maps onto typed wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// The field holds one object of this kind.
    One(ObjectKind),
    /// The field holds a sequence; every element is an object of this kind.
    Many(ObjectKind),
}

impl Relation {
    pub fn kind(self) -> ObjectKind {
        match self {
            Relation::One(kind) | Relation::Many(kind) => kind,
        }
    }
}

/// A wrapper's declared relations, keyed by wire name.
pub type RelationTable = &'static [(&'static str, Relation)];

/// The declared relation for `field` in `table`.
pub fn lookup(table: RelationTable, field: &str) -> Option<Relation> {
    table
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, relation)| *relation)
}

// ---------------------------------------------------------------------------
// Resolved values
// ---------------------------------------------------------------------------

/// The result of resolving a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// One typed object.
    Single(Object),
    /// An ordered collection of typed objects.
    Many(Collection),
    /// A nested object with no known type.
    Raw(Document),
    /// A scalar, or a sequence that is not a declared relation.
    Scalar(Value),
}

impl Resolved {
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Resolved::Single(object) => Some(object),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Object> {
        match self {
            Resolved::Single(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Resolved::Many(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<Collection> {
        match self {
            Resolved::Many(collection) => Some(collection),
            _ => None,
        }
    }

    /// The underlying document of a typed or generic object.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Resolved::Single(object) => Some(object.document()),
            Resolved::Raw(document) => Some(document),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Resolved::Single(object) => Some(object.into_document()),
            Resolved::Raw(document) => Some(document),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Resolved::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }
}

/// Objects become [`Resolved::Raw`] with default options. Defaults handed
/// to [`Document::get_or`] take on the parent document's options instead.
impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Resolved::Raw(Document::from_map(map)),
            other => Resolved::Scalar(other),
        }
    }
}

impl From<Document> for Resolved {
    fn from(document: Document) -> Self {
        Resolved::Raw(document)
    }
}

impl From<Object> for Resolved {
    fn from(object: Object) -> Self {
        Resolved::Single(object)
    }
}

impl From<Collection> for Resolved {
    fn from(collection: Collection) -> Self {
        Resolved::Many(collection)
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Ordered sequence of typed objects produced by a list relation.
///
/// The collection itself is a generic container, not a typed wrapper.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection(Vec<Object>);

impl Collection {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Object> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Object> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Object> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Object] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Object> {
        self.0
    }
}

impl From<Vec<Object>> for Collection {
    fn from(objects: Vec<Object>) -> Self {
        Self(objects)
    }
}

impl FromIterator<Object> for Collection {
    fn from_iter<I: IntoIterator<Item = Object>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Collection {
    type Item = Object;
    type IntoIter = std::vec::IntoIter<Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Object;
    type IntoIter = std::slice::Iter<'a, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve an accessor against `document`, consulting `table` first.
pub(crate) fn resolve_field(
    document: &Document,
    table: RelationTable,
    accessor: &str,
) -> Result<Option<Resolved>, DocumentError> {
    let field = to_snake_case(accessor);
    let value = match document.raw().get(&field) {
        Some(value) if !value.is_null() => value,
        _ => return Ok(None),
    };

    if let Some(relation) = lookup(table, &field) {
        return resolve(document, &field, relation, value).map(Some);
    }

    if let Value::Object(map) = value {
        if let Some(kind) = ObjectKind::from_wire_name(&field) {
            return Ok(Some(Resolved::Single(Object::new(
                kind,
                document.child(map.clone()),
            ))));
        }
    }

    Ok(Some(document.wrap(value)))
}

/// Resolve a field that must be declared in `table`.
pub(crate) fn resolve_declared(
    document: &Document,
    table: RelationTable,
    field: &str,
) -> Result<Option<Resolved>, DocumentError> {
    let relation = lookup(table, field).ok_or_else(|| DocumentError::configuration(field))?;
    match document.raw().get(field) {
        Some(value) if !value.is_null() => resolve(document, field, relation, value).map(Some),
        _ => Ok(None),
    }
}

/// Dispatch a `getX` style method name.
pub(crate) fn call(
    document: &Document,
    table: RelationTable,
    method: &str,
) -> Result<Option<Resolved>, DocumentError> {
    if let Some(accessor) = strip_getter(method) {
        return resolve_field(document, table, accessor);
    }

    match document.options().calls {
        CallPolicy::Error => Err(DocumentError::unsupported(method)),
        CallPolicy::Legacy => {
            warn!(method, "unsupported accessor call, returning none");
            Ok(None)
        }
    }
}

/// Wrap `value` according to `relation`.
pub(crate) fn resolve(
    parent: &Document,
    field: &str,
    relation: Relation,
    value: &Value,
) -> Result<Resolved, DocumentError> {
    let shape = parent.options().shape;

    match (relation, value) {
        (Relation::One(kind), Value::Object(map)) => Ok(Resolved::Single(Object::new(
            kind,
            parent.child(map.clone()),
        ))),
        (Relation::One(_), other) => match shape {
            ShapePolicy::Strict => Err(DocumentError::malformed(field, "an object")),
            ShapePolicy::Lenient => {
                warn!(field, found = shape_of(other), "expected an object, keeping raw value");
                Ok(Resolved::Scalar(other.clone()))
            }
        },
        (Relation::Many(kind), Value::Array(items)) => {
            let mut objects = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Object(map) => objects.push(Object::new(kind, parent.child(map.clone()))),
                    other => match shape {
                        ShapePolicy::Strict => {
                            return Err(DocumentError::malformed(field, "a sequence of objects"))
                        }
                        ShapePolicy::Lenient => warn!(
                            field,
                            index,
                            found = shape_of(other),
                            "skipping non-object element"
                        ),
                    },
                }
            }
            Ok(Resolved::Many(Collection(objects)))
        }
        (Relation::Many(_), other) => match shape {
            ShapePolicy::Strict => Err(DocumentError::malformed(field, "a sequence of objects")),
            ShapePolicy::Lenient => {
                warn!(field, found = shape_of(other), "expected a sequence, using empty collection");
                Ok(Resolved::Many(Collection::default()))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentErrorType, ResolveOptions};
    use serde_json::json;

    const TABLE: RelationTable = &[
        ("from", Relation::One(ObjectKind::User)),
        ("entities", Relation::Many(ObjectKind::MessageEntity)),
        ("chat_member", Relation::One(ObjectKind::ChatMemberUpdated)),
    ];

    fn doc(value: Value) -> Document {
        Document::new(value).unwrap()
    }

    fn lenient(value: Value) -> Document {
        doc(value).with_options(ResolveOptions::new().shape(ShapePolicy::Lenient))
    }

    #[test]
    fn declared_relation_beats_name_match() {
        let d = doc(json!({"chat_member": {"chat": {"id": 1}}}));
        let resolved = resolve_field(&d, TABLE, "chatMember").unwrap().unwrap();
        assert_eq!(
            resolved.as_object().map(Object::kind),
            Some(ObjectKind::ChatMemberUpdated)
        );

        // Without a table the field name alone decides.
        let resolved = resolve_field(&d, &[], "chatMember").unwrap().unwrap();
        assert_eq!(resolved.as_object().map(Object::kind), Some(ObjectKind::ChatMember));
    }

    #[test]
    fn null_relation_is_absent() {
        let d = doc(json!({"from": null}));
        assert_eq!(resolve_field(&d, TABLE, "from").unwrap(), None);
        assert_eq!(resolve_declared(&d, TABLE, "from").unwrap(), None);
    }

    #[test]
    fn strict_shape_rejects_scalar_for_object() {
        let d = doc(json!({"from": 5}));
        let err = resolve_field(&d, TABLE, "from").unwrap_err();
        assert_eq!(
            err.kind(),
            &DocumentErrorType::MalformedRelation {
                field: "from".to_string(),
                expected: "an object"
            }
        );
    }

    #[test]
    fn strict_shape_rejects_scalar_elements() {
        let d = doc(json!({"entities": [{"type": "bold"}, 3]}));
        assert!(resolve_field(&d, TABLE, "entities").is_err());
    }

    #[test]
    fn lenient_shape_coerces() {
        let d = lenient(json!({"from": 5, "entities": "oops"}));
        assert_eq!(
            resolve_field(&d, TABLE, "from").unwrap(),
            Some(Resolved::Scalar(json!(5)))
        );
        assert_eq!(
            resolve_field(&d, TABLE, "entities").unwrap(),
            Some(Resolved::Many(Collection::default()))
        );
    }

    #[test]
    fn lenient_shape_skips_bad_elements() {
        let d = lenient(json!({"entities": [1, {"type": "url"}, null]}));
        let resolved = resolve_field(&d, TABLE, "entities").unwrap().unwrap();
        let collection = resolved.into_collection().unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.first().and_then(|e| e.str("type")), Some("url"));
    }

    #[test]
    fn undeclared_sequence_stays_raw() {
        let d = doc(json!({"tags": [{"a": 1}]}));
        let resolved = resolve_field(&d, TABLE, "tags").unwrap().unwrap();
        assert_eq!(resolved, Resolved::Scalar(json!([{"a": 1}])));
    }

    #[test]
    fn lookup_and_relation_kind() {
        assert_eq!(lookup(TABLE, "entities").map(Relation::kind), Some(ObjectKind::MessageEntity));
        assert_eq!(lookup(TABLE, "text"), None);
    }

    #[test]
    fn collection_iterates_in_order() {
        let objects: Collection = (0..3)
            .map(|i| Object::new(ObjectKind::PhotoSize, doc(json!({ "width": i }))))
            .collect();
        let widths: Vec<_> = objects.iter().map(|p| p.i64("width")).collect();
        assert_eq!(widths, [Some(0), Some(1), Some(2)]);
        assert_eq!(objects.last().and_then(|p| p.i64("width")), Some(2));
        assert_eq!(objects.into_iter().count(), 3);
    }
}
