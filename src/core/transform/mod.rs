//! Record transformation
//!
//! Converts raw source documents into typed records. Every entity kind has
//! its own decoder; all of them read fields through [`Fields`], which turns a
//! missing or mistyped value into [`TransformError::MalformedField`] carrying
//! the full field path (for example `promo[1].code`).
//!
//! Transformation is pure: no store is touched, so a malformed document is
//! rejected before a transaction is opened for it.

pub mod offer;
pub mod product;
pub mod shop;
pub mod shop_review;

use crate::adapters::source::RawDocument;
use crate::domain::{EntityKind, ExternalId, TransformError, TypedRecord};
use serde_json::Value;

type FieldResult<T> = std::result::Result<T, TransformError>;

/// Transform a raw document into the typed record for `kind`
///
/// # Errors
///
/// Returns `TransformError::MalformedField` for the first field that is
/// missing or has an unexpected type.
///
/// # Examples
///
/// ```
/// use catalog_sync::core::transform::transform;
/// use catalog_sync::domain::{EntityKind, TypedRecord};
/// use serde_json::json;
///
/// let doc = json!({"_id": "s1", "name": "Acme"});
/// let record = transform(EntityKind::Shop, doc.as_object().unwrap()).unwrap();
///
/// assert_eq!(record.id().as_str(), "s1");
/// assert!(matches!(record, TypedRecord::Shop(_)));
/// ```
pub fn transform(
    kind: EntityKind,
    document: &RawDocument,
) -> std::result::Result<TypedRecord, TransformError> {
    let fields = Fields::root(document);
    match kind {
        EntityKind::Offer => offer::decode(&fields).map(TypedRecord::Offer),
        EntityKind::Product => product::decode(&fields).map(TypedRecord::Product),
        EntityKind::Shop => shop::decode(&fields).map(TypedRecord::Shop),
        EntityKind::ShopReview => shop_review::decode(&fields).map(TypedRecord::ShopReview),
    }
}

/// Typed, path-aware view over one JSON object
pub(crate) struct Fields<'a> {
    map: &'a RawDocument,
    path: String,
}

impl<'a> Fields<'a> {
    pub(crate) fn root(map: &'a RawDocument) -> Self {
        Self {
            map,
            path: String::new(),
        }
    }

    fn child(map: &'a RawDocument, path: String) -> Self {
        Self { map, path }
    }

    fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn malformed(&self, key: &str, expected: &'static str) -> TransformError {
        TransformError::malformed(self.path_of(key), expected)
    }

    /// Value for `key`, treating explicit `null` as absent
    fn value(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    /// The document identifier, `_id`
    pub(crate) fn external_id(&self) -> FieldResult<ExternalId> {
        let raw = self.req_text("_id")?;
        ExternalId::new(raw).map_err(|_| self.malformed("_id", "non-empty string"))
    }

    pub(crate) fn opt_text(&self, key: &str) -> FieldResult<Option<String>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.malformed(key, "string")),
        }
    }

    pub(crate) fn req_text(&self, key: &str) -> FieldResult<String> {
        self.opt_text(key)?
            .ok_or_else(|| self.malformed(key, "string"))
    }

    /// A string member that must be present but may be `null`
    pub(crate) fn present_text(&self, key: &str) -> FieldResult<Option<String>> {
        if !self.map.contains_key(key) {
            return Err(self.malformed(key, "string"));
        }
        self.opt_text(key)
    }

    pub(crate) fn opt_float(&self, key: &str) -> FieldResult<Option<f64>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.malformed(key, "number")),
            Some(_) => Err(self.malformed(key, "number")),
        }
    }

    /// An integer column; integral floats such as `12.0` are accepted
    pub(crate) fn opt_int(&self, key: &str) -> FieldResult<Option<i64>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Some(i));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Some(f as i64))
                    }
                    _ => Err(self.malformed(key, "integer")),
                }
            }
            Some(_) => Err(self.malformed(key, "integer")),
        }
    }

    /// A required number stored in an integer column, fractional part dropped
    pub(crate) fn truncated_int(&self, key: &str) -> FieldResult<i64> {
        match self.value(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or_else(|| self.malformed(key, "number")),
            _ => Err(self.malformed(key, "number")),
        }
    }

    pub(crate) fn opt_bool(&self, key: &str) -> FieldResult<Option<bool>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.malformed(key, "boolean")),
        }
    }

    pub(crate) fn req_bool(&self, key: &str) -> FieldResult<bool> {
        self.opt_bool(key)?
            .ok_or_else(|| self.malformed(key, "boolean"))
    }

    /// A required array whose every element is a string
    pub(crate) fn string_list(&self, key: &str) -> FieldResult<Vec<String>> {
        let items = match self.value(key) {
            Some(Value::Array(items)) => items,
            _ => return Err(self.malformed(key, "array of strings")),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(TransformError::malformed(
                    format!("{}[{}]", self.path_of(key), i),
                    "string",
                )),
            })
            .collect()
    }

    pub(crate) fn opt_object(&self, key: &str) -> FieldResult<Option<Fields<'a>>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Fields::child(map, self.path_of(key)))),
            Some(_) => Err(self.malformed(key, "object")),
        }
    }

    /// An optional array of objects; absent reads as empty
    pub(crate) fn opt_object_list(&self, key: &str) -> FieldResult<Vec<Fields<'a>>> {
        let items = match self.value(key) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(self.malformed(key, "array of objects")),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("{}[{}]", self.path_of(key), i);
                match item {
                    Value::Object(map) => Ok(Fields::child(map, path)),
                    _ => Err(TransformError::malformed(path, "object")),
                }
            })
            .collect()
    }
}
