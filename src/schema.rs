use serde::{Deserialize, Deserializer, Serialize, de::Error};
use serde_json::Value;

/// The `__schema` payload of an introspection result.
///
/// This is handed around as an opaque JSON tree; nothing here looks inside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntrospectionSchema(Value);

impl IntrospectionSchema {
    /// Wraps a JSON value
    pub const fn new(value: Value) -> IntrospectionSchema {
        IntrospectionSchema(value)
    }

    /// Borrows the underlying JSON
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the schema, producing the underlying JSON
    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// A `{ "__schema": ... }` object whose `__schema` is anything but `null`
#[derive(Debug, Deserialize)]
pub(crate) struct SchemaEnvelope {
    #[serde(rename = "__schema", deserialize_with = "non_null")]
    schema: Value,
}

fn non_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Err(D::Error::custom("`__schema` is null")),
        value => Ok(value),
    }
}

/// The JSON shapes an introspection dump is found in on disk.
///
/// Variants are tried in declaration order, so a full response wins over a bare envelope,
/// and anything else is taken to be the schema itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IntrospectionDump {
    /// `{ "data": { "__schema": { ... } } }`, as returned by a server
    Response { data: SchemaEnvelope },
    /// `{ "__schema": { ... } }`
    Envelope(SchemaEnvelope),
    /// The schema object itself
    Raw(Value),
}

impl From<IntrospectionDump> for IntrospectionSchema {
    fn from(dump: IntrospectionDump) -> Self {
        match dump {
            IntrospectionDump::Response { data } => IntrospectionSchema(data.schema),
            IntrospectionDump::Envelope(envelope) => IntrospectionSchema(envelope.schema),
            IntrospectionDump::Raw(value) => IntrospectionSchema(value),
        }
    }
}
