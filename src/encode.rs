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

use crate::{
    AvroResult,
    error::Details,
    schema::{
        EnumSchema, FixedSchema, Name, Namespace, RecordSchema, ResolvedSchema, Schema, SchemaKind,
    },
    types::{Value, ValueKind},
    util::{zig_i32, zig_i64},
};
use log::error;
use std::{borrow::Borrow, collections::HashMap, io::Write};

/// Encode a `Value` into binary Avro format.
///
/// **NOTE** This will not perform schema validation. The value is assumed to
/// be valid with regards to the schema. Schemas are needed only to guide the
/// encoding for complex type values.
pub fn encode<W: Write>(value: &Value, schema: &Schema, writer: &mut W) -> AvroResult<usize> {
    let rs = ResolvedSchema::try_from(schema)?;
    encode_internal(value, schema, rs.get_names(), &None, writer)
}

pub(crate) fn encode_bytes<B: AsRef<[u8]> + ?Sized, W: Write>(
    s: &B,
    mut writer: W,
) -> AvroResult<usize> {
    let bytes = s.as_ref();
    encode_long(bytes.len() as i64, &mut writer)?;
    writer
        .write(bytes)
        .map_err(|e| Details::WriteBytes(e).into())
}

pub(crate) fn encode_long<W: Write>(i: i64, writer: W) -> AvroResult<usize> {
    zig_i64(i, writer)
}

pub(crate) fn encode_int<W: Write>(i: i32, writer: W) -> AvroResult<usize> {
    zig_i32(i, writer)
}

pub(crate) fn encode_internal<W: Write, S: Borrow<Schema>>(
    value: &Value,
    schema: &Schema,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    writer: &mut W,
) -> AvroResult<usize> {
    if let Schema::Ref { name } = schema {
        let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
        let resolved = names
            .get(&fully_qualified_name)
            .ok_or(Details::SchemaResolutionError(fully_qualified_name))?;
        return encode_internal(value, resolved.borrow(), names, enclosing_namespace, writer);
    }

    match value {
        Value::Null => {
            if let Schema::Union(union) = schema {
                match union.find_by_kind(SchemaKind::Null) {
                    None => Err(Details::EncodeValueAsSchemaError {
                        value_kind: ValueKind::Null,
                        supported_schema: vec![SchemaKind::Null, SchemaKind::Union],
                    }
                    .into()),
                    Some(p) => encode_long(p as i64, writer),
                }
            } else {
                Ok(0)
            }
        }
        Value::Boolean(b) => writer
            .write(&[u8::from(*b)])
            .map_err(|e| Details::WriteBytes(e).into()),
        Value::Int(i) => encode_int(*i, writer),
        Value::Long(i) => encode_long(*i, writer),
        Value::Float(x) => writer
            .write(&x.to_le_bytes())
            .map_err(|e| Details::WriteBytes(e).into()),
        Value::Double(x) => writer
            .write(&x.to_le_bytes())
            .map_err(|e| Details::WriteBytes(e).into()),
        Value::Bytes(bytes) => match *schema {
            Schema::Bytes => encode_bytes(bytes, writer),
            Schema::Fixed(FixedSchema { size, .. }) => {
                if bytes.len() != size {
                    return Err(Details::CompareFixedSizes {
                        size,
                        n: bytes.len(),
                    }
                    .into());
                }
                writer
                    .write(bytes.as_slice())
                    .map_err(|e| Details::WriteBytes(e).into())
            }
            _ => Err(Details::EncodeValueAsSchemaError {
                value_kind: ValueKind::Bytes,
                supported_schema: vec![SchemaKind::Bytes, SchemaKind::Fixed],
            }
            .into()),
        },
        Value::String(s) => match *schema {
            Schema::String => encode_bytes(s, writer),
            Schema::Enum(EnumSchema { ref symbols, .. }) => {
                if let Some(index) = symbols.iter().position(|item| item == s) {
                    encode_int(index as i32, writer)
                } else {
                    error!("Invalid symbol string {:?}.", &s[..]);
                    Err(Details::GetEnumSymbol(s.clone()).into())
                }
            }
            _ => Err(Details::EncodeValueAsSchemaError {
                value_kind: ValueKind::String,
                supported_schema: vec![SchemaKind::String, SchemaKind::Enum],
            }
            .into()),
        },
        Value::Fixed(n, bytes) => {
            if let Schema::Fixed(FixedSchema { size, .. }) = *schema {
                if *n != size || bytes.len() != size {
                    return Err(Details::CompareFixedSizes {
                        size,
                        n: bytes.len(),
                    }
                    .into());
                }
            }
            writer
                .write(bytes.as_slice())
                .map_err(|e| Details::WriteBytes(e).into())
        }
        Value::Enum(i, _) => encode_int(*i as i32, writer),
        Value::Union(idx, item) => {
            if let Schema::Union(ref inner) = *schema {
                let inner_schema =
                    inner
                        .variants()
                        .get(*idx as usize)
                        .ok_or(Details::GetUnionVariant {
                            index: *idx as i64,
                            num_variants: inner.variants().len(),
                        })?;
                encode_long(*idx as i64, &mut *writer)?;
                encode_internal(item, inner_schema, names, enclosing_namespace, &mut *writer)
            } else {
                error!("invalid schema type for Union: {schema:?}");
                Err(Details::EncodeValueAsSchemaError {
                    value_kind: ValueKind::Union,
                    supported_schema: vec![SchemaKind::Union],
                }
                .into())
            }
        }
        Value::Array(items) => {
            if let Schema::Array(ref inner) = *schema {
                if !items.is_empty() {
                    encode_long(items.len() as i64, &mut *writer)?;
                    for item in items.iter() {
                        encode_internal(
                            item,
                            &inner.items,
                            names,
                            enclosing_namespace,
                            &mut *writer,
                        )?;
                    }
                }
                writer
                    .write(&[0u8])
                    .map_err(|e| Details::WriteBytes(e).into())
            } else {
                error!("invalid schema type for Array: {schema:?}");
                Err(Details::EncodeValueAsSchemaError {
                    value_kind: ValueKind::Array,
                    supported_schema: vec![SchemaKind::Array],
                }
                .into())
            }
        }
        Value::Map(items) => {
            if let Schema::Map(ref inner) = *schema {
                if !items.is_empty() {
                    encode_long(items.len() as i64, &mut *writer)?;
                    for (key, value) in items {
                        encode_bytes(key, &mut *writer)?;
                        encode_internal(
                            value,
                            &inner.values,
                            names,
                            enclosing_namespace,
                            &mut *writer,
                        )?;
                    }
                }
                writer
                    .write(&[0u8])
                    .map_err(|e| Details::WriteBytes(e).into())
            } else {
                error!("invalid schema type for Map: {schema:?}");
                Err(Details::EncodeValueAsSchemaError {
                    value_kind: ValueKind::Map,
                    supported_schema: vec![SchemaKind::Map],
                }
                .into())
            }
        }
        Value::Record(value_fields) => {
            if let Schema::Record(RecordSchema {
                ref name,
                fields: ref schema_fields,
                ..
            }) = *schema
            {
                let record_namespace = name.fully_qualified_name(enclosing_namespace).namespace;

                let mut lookup = HashMap::new();
                value_fields.iter().for_each(|(name, field)| {
                    lookup.insert(name, field);
                });

                let mut written_bytes = 0;
                for schema_field in schema_fields.iter() {
                    let field_name = &schema_field.name;

                    written_bytes += match lookup.get(field_name) {
                        Some(value) => encode_internal(
                            value,
                            &schema_field.schema,
                            names,
                            &record_namespace,
                            writer,
                        )?,
                        // A field the caller did not supply takes its
                        // declared default.
                        None => match &schema_field.default {
                            Some(default_json) => {
                                let default_value = Value::from_json_with_schema(
                                    default_json,
                                    &schema_field.schema,
                                    names,
                                    &record_namespace,
                                )?;
                                encode_internal(
                                    &default_value,
                                    &schema_field.schema,
                                    names,
                                    &record_namespace,
                                    writer,
                                )?
                            }
                            None => {
                                return Err(Details::GetField(field_name.clone()).into());
                            }
                        },
                    };
                }
                Ok(written_bytes)
            } else if let Schema::Union(inner) = schema {
                // A bare record against a union is matched by trial encoding.
                let mut union_buffer: Vec<u8> = Vec::new();
                for (index, branch) in inner.variants().iter().enumerate() {
                    encode_long(index as i64, &mut union_buffer)?;
                    let encode_res = encode_internal(
                        value,
                        branch,
                        names,
                        enclosing_namespace,
                        &mut union_buffer,
                    );
                    match encode_res {
                        Ok(_) => {
                            return writer
                                .write(union_buffer.as_slice())
                                .map_err(|e| Details::WriteBytes(e).into());
                        }
                        Err(_) => {
                            union_buffer.clear(); //undo any partial encoding
                        }
                    }
                }
                Err(Details::EncodeValueAsSchemaError {
                    value_kind: ValueKind::Record,
                    supported_schema: vec![SchemaKind::Record, SchemaKind::Union],
                }
                .into())
            } else {
                error!("invalid schema type for Record: {schema:?}");
                Err(Details::EncodeValueAsSchemaError {
                    value_kind: ValueKind::Record,
                    supported_schema: vec![SchemaKind::Record, SchemaKind::Union],
                }
                .into())
            }
        }
    }
}

pub fn encode_to_vec(value: &Value, schema: &Schema) -> AvroResult<Vec<u8>> {
    let mut buffer = Vec::new();
    encode(value, schema, &mut buffer)?;
    Ok(buffer)
}
