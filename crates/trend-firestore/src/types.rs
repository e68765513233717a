//! Firestore REST API types and JSON conversion.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FirestoreError, FirestoreResult};

/// Firestore document value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Decode the fields into `T` through their JSON form.
    pub fn decode<T: DeserializeOwned>(&self) -> FirestoreResult<T> {
        let fields = self.fields.clone().unwrap_or_default();
        from_fields(fields)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Option<Vec<Document>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ============================================================================
// Structured queries
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// One line of the streamed `runQuery` reply; lines without a document
/// carry only progress information.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub read_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

impl StructuredQuery {
    /// Query over a single collection.
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
            }],
            filter: None,
            limit: None,
        }
    }

    /// Restrict to documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filter = Some(Filter {
            field_filter: FieldFilter {
                field: FieldReference {
                    field_path: field.into(),
                },
                op: FieldOperator::Equal,
                value,
            },
        });
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_filter: FieldFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: FieldOperator,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldOperator {
    Equal,
}

// ============================================================================
// JSON <-> Firestore conversion
// ============================================================================

/// Convert a JSON value into its Firestore representation.
pub fn json_to_value(json: serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::NullValue(()),
        Json::Bool(b) => Value::BooleanValue(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::IntegerValue(i.to_string()),
            None => Value::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        Json::String(s) => Value::StringValue(s),
        Json::Array(items) => Value::ArrayValue(ArrayValue {
            values: Some(items.into_iter().map(json_to_value).collect()),
        }),
        Json::Object(map) => Value::MapValue(MapValue {
            fields: Some(map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect()),
        }),
    }
}

/// Convert a Firestore value back to JSON. Timestamps become RFC 3339 strings.
pub fn value_to_json(value: Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::NullValue(()) => Json::Null,
        Value::BooleanValue(b) => Json::Bool(b),
        Value::IntegerValue(s) => s
            .parse::<i64>()
            .map(Json::from)
            .unwrap_or(Json::String(s)),
        Value::DoubleValue(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::TimestampValue(s) | Value::StringValue(s) => Json::String(s),
        Value::ArrayValue(array) => Json::Array(
            array
                .values
                .unwrap_or_default()
                .into_iter()
                .map(value_to_json)
                .collect(),
        ),
        Value::MapValue(map) => Json::Object(
            map.fields
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Serialize `value` into document fields. `value` must serialize to an object.
pub fn to_fields<T: Serialize>(value: &T) -> FirestoreResult<HashMap<String, Value>> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, json_to_value(v)))
            .collect()),
        other => Err(FirestoreError::invalid_document(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize document fields into `T`.
pub fn from_fields<T: DeserializeOwned>(fields: HashMap<String, Value>) -> FirestoreResult<T> {
    let object: serde_json::Map<String, serde_json::Value> = fields
        .into_iter()
        .map(|(k, v)| (k, value_to_json(v)))
        .collect();
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| FirestoreError::invalid_document(e.to_string()))
}

/// Re-tag an RFC 3339 string field as a native Firestore timestamp.
pub fn mark_timestamp(fields: &mut HashMap<String, Value>, key: &str) {
    if let Some(Value::StringValue(s)) = fields.remove(key) {
        fields.insert(key.to_string(), Value::TimestampValue(s));
    }
}
