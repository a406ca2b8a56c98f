//! BSON to JSON normalisation
//!
//! Source documents are handed to the transformer as plain JSON so it never
//! sees driver types. Object ids become their hex string, timestamps become
//! RFC 3339 strings, and every numeric width becomes a JSON number.

use crate::adapters::source::RawDocument;
use mongodb::bson::{Bson, Document};
use serde_json::{Number, Value};

/// Converts a BSON document into a raw document
pub fn document_to_raw(document: Document) -> RawDocument {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Converts a single BSON value into JSON
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        // NaN and infinities have no JSON representation
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(document_to_raw(doc)),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId, DateTime};
    use serde_json::json;

    #[test]
    fn test_object_id_becomes_hex() {
        let oid = ObjectId::parse_str("64b7f0c2a1e4b5d6c7e8f901").unwrap();
        let raw = document_to_raw(doc! { "_id": oid, "name": "Acme" });
        assert_eq!(raw["_id"], json!("64b7f0c2a1e4b5d6c7e8f901"));
        assert_eq!(raw["name"], json!("Acme"));
    }

    #[test]
    fn test_numbers_and_nesting() {
        let raw = document_to_raw(doc! {
            "reviewsQuantity": 12_i32,
            "big": 9_000_000_000_i64,
            "price": 1999.5,
            "promo": [ { "code": "X", "priority": 2.0 } ],
            "monthlyInstallment": { "installment": true },
        });

        assert_eq!(raw["reviewsQuantity"], json!(12));
        assert_eq!(raw["big"], json!(9_000_000_000_i64));
        assert_eq!(raw["price"], json!(1999.5));
        assert_eq!(raw["promo"], json!([{ "code": "X", "priority": 2.0 }]));
        assert_eq!(raw["monthlyInstallment"]["installment"], json!(true));
    }

    #[test]
    fn test_datetime_becomes_rfc3339() {
        let dt = DateTime::from_millis(0);
        assert_eq!(
            bson_to_json(Bson::DateTime(dt)),
            json!("1970-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(bson_to_json(Bson::Double(f64::NAN)), Value::Null);
        assert_eq!(bson_to_json(Bson::Null), Value::Null);
    }
}
