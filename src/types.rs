// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Logic handling the intermediate representation of Avro values.

use crate::{
    AvroResult,
    error::Details,
    schema::{EnumSchema, FixedSchema, Name, Namespace, RecordSchema, Schema},
};
use log::error;
use serde_json::Value as JsonValue;
use std::borrow::Borrow;
use std::collections::HashMap;
use strum::EnumDiscriminants;

/// Represents any valid Avro value.
///
/// More information about Avro values can be found in the
/// [Avro Specification](https://avro.apache.org/docs/1.7.7/spec.html#schemas)
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind))]
pub enum Value {
    /// A `null` Avro value.
    Null,
    /// A `boolean` Avro value.
    Boolean(bool),
    /// An `int` Avro value.
    Int(i32),
    /// A `long` Avro value.
    Long(i64),
    /// A `float` Avro value.
    Float(f32),
    /// A `double` Avro value.
    Double(f64),
    /// A `bytes` Avro value.
    Bytes(Vec<u8>),
    /// A `string` Avro value.
    String(String),
    /// A `fixed` Avro value, carrying its declared size.
    /// This represents the fixed-length buffers Avro calls `fixed`.
    Fixed(usize, Vec<u8>),
    /// An `enum` Avro value: the zero-based symbol index and the symbol
    /// itself.
    Enum(u32, String),
    /// A `union` Avro value: the zero-based branch index and the value of
    /// that branch.
    Union(u32, Box<Value>),
    /// An `array` Avro value.
    Array(Vec<Value>),
    /// A `map` Avro value.
    Map(HashMap<String, Value>),
    /// A `record` Avro value: field name and value pairs in field order.
    ///
    /// See [`Record`] for a way to construct these against a schema.
    Record(Vec<(String, Value)>),
}

/// Utility interface to build `Value::Record` objects conforming to a record
/// schema.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    /// List of fields contained in the record.
    /// Ordered according to the fields in the schema given to create this
    /// `Record` object. Any unset field defaults to `Value::Null`.
    pub fields: Vec<(String, Value)>,
    schema_lookup: &'a std::collections::BTreeMap<String, usize>,
}

impl<'a> Record<'a> {
    /// Create a `Record` given a `Schema`.
    ///
    /// If the `Schema` is not a `Schema::Record` variant, `None` will be
    /// returned.
    pub fn new(schema: &Schema) -> Option<Record<'_>> {
        match *schema {
            Schema::Record(RecordSchema {
                ref fields,
                ref lookup,
                ..
            }) => {
                let mut record_fields = Vec::with_capacity(fields.len());
                for field in fields {
                    record_fields.push((field.name.clone(), Value::Null));
                }
                Some(Record {
                    fields: record_fields,
                    schema_lookup: lookup,
                })
            }
            _ => None,
        }
    }

    /// Put a compatible value (implementing the `ToAvro` trait) in the
    /// `Record` for a given `field` name.
    ///
    /// **NOTE** Only ensure that the field name is present in the `Schema`
    /// given when creating this `Record`. Does not perform any schema
    /// validation.
    pub fn put<V>(&mut self, field: &str, value: V)
    where
        V: Into<Value>,
    {
        if let Some(&position) = self.schema_lookup.get(field) {
            self.fields[position].1 = value.into()
        }
    }
}

impl<'a> From<Record<'a>> for Value {
    fn from(value: Record<'a>) -> Self {
        Self::Record(value.fields)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_owned())
    }
}

/// `None` maps to a union's first branch, `Some(v)` to its second: the
/// layout of the ubiquitous `["null", T]` option-like union.
impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            None => Self::Union(0, Box::new(Self::Null)),
            Some(v) => Self::Union(1, Box::new(v.into())),
        }
    }
}

impl<K, V> From<HashMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(value: HashMap<K, V>) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl TryFrom<JsonValue> for Value {
    type Error = crate::Error;

    fn try_from(value: JsonValue) -> AvroResult<Self> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Boolean(b)),
            JsonValue::Number(ref n) if n.is_i64() => Ok(Self::Long(n.as_i64().unwrap())),
            JsonValue::Number(ref n) if n.is_f64() => Ok(Self::Double(n.as_f64().unwrap())),
            JsonValue::Number(n) => Err(Details::ConvertJsonNumber(n).into()),
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(items) => Ok(Self::Array(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<AvroResult<_>>()?,
            )),
            JsonValue::Object(items) => Ok(Self::Map(
                items
                    .into_iter()
                    .map(|(key, value)| Self::try_from(value).map(|v| (key, v)))
                    .collect::<AvroResult<_>>()?,
            )),
        }
    }
}

impl Value {
    /// Validate the value against the given [`Schema`].
    ///
    /// See the [Avro specification](https://avro.apache.org/docs/1.7.7/spec.html)
    /// for the full set of rules of schema validation.
    pub fn validate(&self, schema: &Schema) -> bool {
        let rs = match crate::schema::ResolvedSchema::try_from(schema) {
            Ok(rs) => rs,
            Err(e) => {
                error!("Could not resolve schema names: {e}");
                return false;
            }
        };
        let enclosing_namespace = schema.namespace();

        match self.validate_internal(schema, rs.get_names(), &enclosing_namespace) {
            Some(reason) => {
                error!("Invalid value: {self:?} for schema: {schema:?}. Reason: {reason}");
                false
            }
            None => true,
        }
    }

    /// Validate the value against the given [`Schema`], resolving any
    /// `Schema::Ref` through `names`. Returns a reason when invalid.
    pub fn validate_internal<S: Borrow<Schema>>(
        &self,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
    ) -> Option<String> {
        match (self, schema) {
            (_, Schema::Ref { name }) => {
                let name = name.fully_qualified_name(enclosing_namespace);
                match names.get(&name) {
                    Some(resolved) => {
                        self.validate_internal(resolved.borrow(), names, enclosing_namespace)
                    }
                    None => Some(format!("Unresolved schema reference: {name}")),
                }
            }
            (Value::Null, Schema::Null) => None,
            (Value::Boolean(_), Schema::Boolean) => None,
            (Value::Int(_), Schema::Int) => None,
            (Value::Long(_), Schema::Long) => None,
            (Value::Float(_), Schema::Float) => None,
            (Value::Double(_), Schema::Double) => None,
            (Value::Bytes(_), Schema::Bytes) => None,
            (Value::String(_), Schema::String) => None,
            (Value::Fixed(n, bytes), Schema::Fixed(FixedSchema { size, .. })) => {
                if n != size || bytes.len() != *size {
                    Some(format!(
                        "The value's size ({n}) is different than the schema's size ({size})"
                    ))
                } else {
                    None
                }
            }
            (Value::String(s), Schema::Enum(EnumSchema { symbols, .. })) => {
                if symbols.contains(s) {
                    None
                } else {
                    Some(format!("'{s}' is not a member of the possible symbols"))
                }
            }
            (Value::Enum(i, s), Schema::Enum(EnumSchema { symbols, .. })) => {
                match symbols.get(*i as usize) {
                    Some(symbol) if symbol == s => None,
                    Some(symbol) => Some(format!(
                        "Symbol '{s}' does not match the symbol '{symbol}' at position '{i}'"
                    )),
                    None => Some(format!("No symbol at position '{i}'")),
                }
            }
            (Value::Union(i, value), Schema::Union(inner)) => inner
                .variants()
                .get(*i as usize)
                .map(|schema| value.validate_internal(schema, names, enclosing_namespace))
                .unwrap_or_else(|| Some(format!("No schema in the union at position '{i}'"))),
            (Value::Null, Schema::Union(inner)) => {
                if inner.is_nullable() {
                    None
                } else {
                    Some("Null value for a union with no null branch".to_string())
                }
            }
            (v @ Value::Record(_), Schema::Union(inner)) => {
                if inner.variants().iter().any(|schema| {
                    v.validate_internal(schema, names, enclosing_namespace)
                        .is_none()
                }) {
                    None
                } else {
                    Some("No branch of the union matches the record".to_string())
                }
            }
            (Value::Array(items), Schema::Array(inner)) => items.iter().find_map(|item| {
                item.validate_internal(&inner.items, names, enclosing_namespace)
            }),
            (Value::Map(items), Schema::Map(inner)) => items.values().find_map(|value| {
                value.validate_internal(&inner.values, names, enclosing_namespace)
            }),
            (Value::Record(record_fields), Schema::Record(RecordSchema { name, fields, lookup, .. })) => {
                let record_namespace = name.fully_qualified_name(enclosing_namespace).namespace;

                for (field_name, _) in record_fields {
                    if !lookup.contains_key(field_name) {
                        return Some(format!(
                            "There is no schema field for field '{field_name}'"
                        ));
                    }
                }

                fields.iter().find_map(|field| {
                    let value = record_fields
                        .iter()
                        .find(|(name, _)| name == &field.name)
                        .map(|(_, value)| value);
                    match value {
                        Some(value) => {
                            value.validate_internal(&field.schema, names, &record_namespace)
                        }
                        None if field.default.is_some() => None,
                        None => Some(format!(
                            "Field with name '{:?}' is not a member of the map items",
                            field.name
                        )),
                    }
                })
            }
            (v, s) => Some(format!(
                "Unsupported value-schema combination! Value: {v:?}, schema: {s:?}"
            )),
        }
    }

    /// Convert a JSON value into a `Value` guided by `schema`, following the
    /// rules for schema defaults: numbers take the numeric type of the
    /// schema, `bytes` and `fixed` defaults are strings whose code points
    /// 0-255 map to bytes, and a union default targets its first branch.
    pub(crate) fn from_json_with_schema<S: Borrow<Schema>>(
        json: &JsonValue,
        schema: &Schema,
        names: &HashMap<Name, S>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Value> {
        let mismatch =
            || crate::Error::from(Details::GetDefaultFromJson(json.clone(), schema.into()));
        match schema {
            Schema::Ref { name } => {
                let name = name.fully_qualified_name(enclosing_namespace);
                match names.get(&name) {
                    Some(resolved) => Self::from_json_with_schema(
                        json,
                        resolved.borrow(),
                        names,
                        enclosing_namespace,
                    ),
                    None => Err(Details::SchemaResolutionError(name).into()),
                }
            }
            Schema::Null => match json {
                JsonValue::Null => Ok(Value::Null),
                _ => Err(mismatch()),
            },
            Schema::Boolean => match json {
                JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
                _ => Err(mismatch()),
            },
            Schema::Int => json
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int)
                .ok_or_else(mismatch),
            Schema::Long => json.as_i64().map(Value::Long).ok_or_else(mismatch),
            Schema::Float => json
                .as_f64()
                .map(|n| Value::Float(n as f32))
                .ok_or_else(mismatch),
            Schema::Double => json.as_f64().map(Value::Double).ok_or_else(mismatch),
            Schema::Bytes => match json {
                JsonValue::String(s) => Ok(Value::Bytes(string_to_raw_bytes(s)?)),
                _ => Err(mismatch()),
            },
            Schema::String => match json {
                JsonValue::String(s) => Ok(Value::String(s.clone())),
                _ => Err(mismatch()),
            },
            Schema::Fixed(FixedSchema { size, .. }) => match json {
                JsonValue::String(s) => {
                    let bytes = string_to_raw_bytes(s)?;
                    if bytes.len() != *size {
                        Err(Details::CompareFixedSizes {
                            size: *size,
                            n: bytes.len(),
                        }
                        .into())
                    } else {
                        Ok(Value::Fixed(*size, bytes))
                    }
                }
                _ => Err(mismatch()),
            },
            Schema::Enum(EnumSchema { symbols, .. }) => match json {
                JsonValue::String(s) => symbols
                    .iter()
                    .position(|symbol| symbol == s)
                    .map(|i| Value::Enum(i as u32, s.clone()))
                    .ok_or_else(|| Details::GetEnumSymbol(s.clone()).into()),
                _ => Err(mismatch()),
            },
            Schema::Array(inner) => match json {
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| {
                        Self::from_json_with_schema(item, &inner.items, names, enclosing_namespace)
                    })
                    .collect::<AvroResult<Vec<_>>>()
                    .map(Value::Array),
                _ => Err(mismatch()),
            },
            Schema::Map(inner) => match json {
                JsonValue::Object(items) => items
                    .iter()
                    .map(|(key, value)| {
                        Self::from_json_with_schema(
                            value,
                            &inner.values,
                            names,
                            enclosing_namespace,
                        )
                        .map(|v| (key.clone(), v))
                    })
                    .collect::<AvroResult<HashMap<_, _>>>()
                    .map(Value::Map),
                _ => Err(mismatch()),
            },
            // The default of a union conforms to its first branch.
            Schema::Union(inner) => {
                let first = inner.variants().first().ok_or(Details::EmptyUnion)?;
                Self::from_json_with_schema(json, first, names, enclosing_namespace)
                    .map(|value| Value::Union(0, Box::new(value)))
            }
            Schema::Record(RecordSchema { name, fields, .. }) => match json {
                JsonValue::Object(items) => {
                    let record_namespace =
                        name.fully_qualified_name(enclosing_namespace).namespace;
                    let mut record_fields = Vec::with_capacity(fields.len());
                    for field in fields {
                        let field_json = match items.get(&field.name) {
                            Some(value) => value,
                            None => field.default.as_ref().ok_or_else(mismatch)?,
                        };
                        let value = Self::from_json_with_schema(
                            field_json,
                            &field.schema,
                            names,
                            &record_namespace,
                        )?;
                        record_fields.push((field.name.clone(), value));
                    }
                    Ok(Value::Record(record_fields))
                }
                _ => Err(mismatch()),
            },
        }
    }
}

/// Avro encodes `bytes` and `fixed` defaults as JSON strings whose code
/// points 0-255 each denote one byte.
fn string_to_raw_bytes(s: &str) -> AvroResult<Vec<u8>> {
    s.chars()
        .map(|c| {
            u8::try_from(c as u32).map_err(|_| {
                crate::Error::from(Details::GetDefaultFromJson(
                    JsonValue::String(s.to_owned()),
                    crate::schema::SchemaKind::Bytes,
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Schema;
    use crate::schema::Names;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn validate_primitives() -> TestResult {
        let value_schema_valid = vec![
            (Value::Int(42), Schema::Int, true),
            (Value::Int(43), Schema::Long, false),
            (Value::Long(44), Schema::Long, true),
            (Value::Boolean(true), Schema::Boolean, true),
            (Value::Boolean(true), Schema::Double, false),
            (Value::Double(1.5), Schema::Double, true),
            (Value::Float(1.5), Schema::Float, true),
            (Value::String("foo".into()), Schema::String, true),
            (Value::Bytes(vec![1, 2]), Schema::Bytes, true),
            (Value::Null, Schema::Null, true),
        ];
        for (value, schema, valid) in value_schema_valid {
            assert_eq!(valid, value.validate(&schema));
        }
        Ok(())
    }

    #[test]
    fn validate_fixed() -> TestResult {
        let schema = Schema::parse_str(r#"{"type": "fixed", "name": "f", "size": 4}"#)?;
        assert!(Value::Fixed(4, vec![0; 4]).validate(&schema));
        assert!(!Value::Fixed(3, vec![0; 3]).validate(&schema));
        assert!(!Value::Bytes(vec![0; 4]).validate(&schema));
        Ok(())
    }

    #[test]
    fn validate_enum() -> TestResult {
        let schema = Schema::parse_str(
            r#"{"type": "enum", "name": "Suit", "symbols": ["diamonds", "spades"]}"#,
        )?;
        assert!(Value::Enum(0, "diamonds".to_owned()).validate(&schema));
        assert!(Value::String("spades".to_owned()).validate(&schema));
        assert!(!Value::Enum(1, "diamonds".to_owned()).validate(&schema));
        assert!(!Value::Enum(7, "spades".to_owned()).validate(&schema));
        assert!(!Value::String("clubs".to_owned()).validate(&schema));
        Ok(())
    }

    #[test]
    fn validate_union() -> TestResult {
        let schema = Schema::parse_str(r#"["null", "int"]"#)?;
        assert!(Value::Union(0, Box::new(Value::Null)).validate(&schema));
        assert!(Value::Union(1, Box::new(Value::Int(42))).validate(&schema));
        assert!(!Value::Union(1, Box::new(Value::Null)).validate(&schema));
        assert!(!Value::Union(5, Box::new(Value::Int(42))).validate(&schema));
        // A bare null validates against a nullable union.
        assert!(Value::Null.validate(&schema));
        Ok(())
    }

    #[test]
    fn validate_record() -> TestResult {
        // {"type": "record", "fields": [
        //   {"type": "long", "name": "a"},
        //   {"type": "string", "name": "b"}
        // ]}
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": "string"},
                    {"name": "c", "type": "int", "default": 42}
                ]
            }
        "#,
        )?;

        assert!(
            Value::Record(vec![
                ("a".to_string(), Value::Long(42i64)),
                ("b".to_string(), Value::String("foo".to_string())),
            ])
            .validate(&schema)
        );

        // Wrongly typed field.
        assert!(
            !Value::Record(vec![
                ("a".to_string(), Value::Boolean(false)),
                ("b".to_string(), Value::String("foo".to_string())),
            ])
            .validate(&schema)
        );

        // Field not present in the schema.
        assert!(
            !Value::Record(vec![
                ("a".to_string(), Value::Long(42i64)),
                ("unknown".to_string(), Value::String("foo".to_string())),
            ])
            .validate(&schema)
        );

        // Missing field without a default.
        assert!(
            !Value::Record(vec![("a".to_string(), Value::Long(42i64)),]).validate(&schema)
        );

        Ok(())
    }

    #[test]
    fn validate_recursive_record() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "LongList",
                "fields": [
                    {"name": "value", "type": "long"},
                    {"name": "next", "type": ["null", "LongList"]}
                ]
            }
        "#,
        )?;

        let value = Value::Record(vec![
            ("value".to_string(), Value::Long(1)),
            (
                "next".to_string(),
                Value::Union(
                    1,
                    Box::new(Value::Record(vec![
                        ("value".to_string(), Value::Long(2)),
                        ("next".to_string(), Value::Union(0, Box::new(Value::Null))),
                    ])),
                ),
            ),
        ]);
        assert!(value.validate(&schema));
        Ok(())
    }

    #[test]
    fn record_builder_puts_fields_in_schema_order() -> TestResult {
        let schema = Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": "string"}
                ]
            }
        "#,
        )?;

        let mut record = Record::new(&schema).unwrap();
        record.put("b", "foo");
        record.put("a", 27i64);

        assert_eq!(
            Value::from(record),
            Value::Record(vec![
                ("a".to_string(), Value::Long(27)),
                ("b".to_string(), Value::String("foo".to_string())),
            ])
        );
        Ok(())
    }

    #[test]
    fn json_defaults_follow_the_schema() -> TestResult {
        let names: Names = HashMap::new();

        let value =
            Value::from_json_with_schema(&json!(42), &Schema::Int, &names, &None)?;
        assert_eq!(value, Value::Int(42));

        let value =
            Value::from_json_with_schema(&json!(42), &Schema::Long, &names, &None)?;
        assert_eq!(value, Value::Long(42));

        let value =
            Value::from_json_with_schema(&json!(42), &Schema::Double, &names, &None)?;
        assert_eq!(value, Value::Double(42.0));

        let value = Value::from_json_with_schema(&json!("\u{0}\u{ff}"), &Schema::Bytes, &names, &None)?;
        assert_eq!(value, Value::Bytes(vec![0u8, 255u8]));

        assert!(
            Value::from_json_with_schema(&json!("x"), &Schema::Int, &names, &None).is_err()
        );

        Ok(())
    }

    #[test]
    fn json_union_default_targets_first_branch() -> TestResult {
        let schema = Schema::parse_str(r#"["null", "string"]"#)?;
        let names: Names = HashMap::new();
        let value = Value::from_json_with_schema(&json!(null), &schema, &names, &None)?;
        assert_eq!(value, Value::Union(0, Box::new(Value::Null)));

        assert!(
            Value::from_json_with_schema(&json!("str"), &schema, &names, &None).is_err()
        );
        Ok(())
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(42i64), Value::Long(42));
        assert_eq!(Value::from("foo"), Value::String("foo".to_owned()));
        assert_eq!(
            Value::from(None::<i32>),
            Value::Union(0, Box::new(Value::Null))
        );
        assert_eq!(
            Value::from(Some(42i32)),
            Value::Union(1, Box::new(Value::Int(42)))
        );
    }
}
