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
        EnumSchema, FixedSchema, Name, Namespace, RecordSchema, ResolvedSchema, Schema,
    },
    types::Value,
    util::{safe_len, zag_i32, zag_i64},
};
use std::{borrow::Borrow, cmp::Ordering, collections::HashMap, io::Read};

#[inline]
fn decode_long<R: Read>(reader: &mut R) -> AvroResult<Value> {
    zag_i64(reader).map(Value::Long)
}

#[inline]
fn decode_int<R: Read>(reader: &mut R) -> AvroResult<Value> {
    zag_i32(reader).map(Value::Int)
}

#[inline]
fn decode_len<R: Read>(reader: &mut R) -> AvroResult<usize> {
    let len = zag_i64(reader)?;
    let len = usize::try_from(len).map_err(|_| Details::IntegerOverflow)?;
    safe_len(len)
}

/// Decode the length of a sequence block.
///
/// Maps and arrays are 0-terminated sequences of blocks. Each block carries a
/// count of items. A negative count is followed by a byte size of the block,
/// which lets skippers jump the block without decoding it; the size is read
/// and discarded here.
fn decode_seq_len<R: Read>(reader: &mut R) -> AvroResult<usize> {
    let raw_len = zag_i64(reader)?;
    let len = match raw_len.cmp(&0) {
        Ordering::Equal => return Ok(0),
        Ordering::Less => {
            let _size = zag_i64(reader)?;
            raw_len
                .checked_neg()
                .and_then(|len| usize::try_from(len).ok())
                .ok_or(Details::IntegerOverflow)?
        }
        Ordering::Greater => usize::try_from(raw_len).map_err(|_| Details::IntegerOverflow)?,
    };
    safe_len(len)
}

/// Decode one datum from `reader` using the given `schema`.
///
/// Exactly the bytes of one datum are consumed; no read-ahead happens, so
/// consecutive datums can be decoded from the same stream.
pub fn decode<R: Read>(schema: &Schema, reader: &mut R) -> AvroResult<Value> {
    let rs = ResolvedSchema::try_from(schema)?;
    decode_internal(schema, rs.get_names(), &None, reader)
}

pub(crate) fn decode_internal<R: Read, S: Borrow<Schema>>(
    schema: &Schema,
    names: &HashMap<Name, S>,
    enclosing_namespace: &Namespace,
    reader: &mut R,
) -> AvroResult<Value> {
    match schema {
        Schema::Null => Ok(Value::Null),
        Schema::Boolean => {
            let mut buf = [0u8; 1];
            match reader.read_exact(&mut buf[..]) {
                Ok(_) => match buf[0] {
                    0u8 => Ok(Value::Boolean(false)),
                    1u8 => Ok(Value::Boolean(true)),
                    _ => Err(Details::BoolValue(buf[0]).into()),
                },
                Err(io_err) => Err(Details::ReadBoolean(io_err).into()),
            }
        }
        Schema::Int => decode_int(reader),
        Schema::Long => decode_long(reader),
        Schema::Float => {
            let mut buf = [0u8; std::mem::size_of::<f32>()];
            reader
                .read_exact(&mut buf[..])
                .map_err(Details::ReadFloat)?;
            Ok(Value::Float(f32::from_le_bytes(buf)))
        }
        Schema::Double => {
            let mut buf = [0u8; std::mem::size_of::<f64>()];
            reader
                .read_exact(&mut buf[..])
                .map_err(Details::ReadDouble)?;
            Ok(Value::Double(f64::from_le_bytes(buf)))
        }
        Schema::Bytes => {
            let len = decode_len(reader)?;
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf).map_err(Details::ReadBytes)?;
            Ok(Value::Bytes(buf))
        }
        Schema::String => {
            let len = decode_len(reader)?;
            let mut buf = vec![0u8; len];
            match reader.read_exact(&mut buf) {
                Ok(_) => Ok(()),
                Err(io_err) => Err(Details::ReadString(io_err)),
            }?;

            Ok(Value::String(
                String::from_utf8(buf).map_err(Details::ConvertToUtf8)?,
            ))
        }
        Schema::Fixed(FixedSchema { size, .. }) => {
            let mut buf = vec![0u8; *size];
            reader
                .read_exact(&mut buf)
                .map_err(|e| Details::ReadFixed(e, *size))?;
            Ok(Value::Fixed(*size, buf))
        }
        Schema::Array(inner) => {
            let mut items = Vec::new();

            loop {
                let len = decode_seq_len(reader)?;
                if len == 0 {
                    break;
                }

                items.reserve(len);
                for _ in 0..len {
                    items.push(decode_internal(
                        &inner.items,
                        names,
                        enclosing_namespace,
                        reader,
                    )?);
                }
            }

            Ok(Value::Array(items))
        }
        Schema::Map(inner) => {
            let mut items = HashMap::new();

            loop {
                let len = decode_seq_len(reader)?;
                if len == 0 {
                    break;
                }

                items.reserve(len);
                for _ in 0..len {
                    match decode_internal(&Schema::String, names, enclosing_namespace, reader)? {
                        Value::String(key) => {
                            let value = decode_internal(
                                &inner.values,
                                names,
                                enclosing_namespace,
                                reader,
                            )?;
                            // Duplicate keys: the last occurrence wins.
                            items.insert(key, value);
                        }
                        value => {
                            unreachable!("Schema::String decoded to {value:?}")
                        }
                    }
                }
            }

            Ok(Value::Map(items))
        }
        Schema::Union(inner) => {
            let index = zag_i64(reader)?;
            let variants = inner.variants();
            let variant = usize::try_from(index)
                .ok()
                .and_then(|i| variants.get(i))
                .ok_or(Details::GetUnionVariant {
                    index,
                    num_variants: variants.len(),
                })?;
            let value = decode_internal(variant, names, enclosing_namespace, reader)?;
            Ok(Value::Union(index as u32, Box::new(value)))
        }
        Schema::Record(RecordSchema { name, fields, .. }) => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            let mut items = Vec::with_capacity(fields.len());
            for field in fields {
                let value = decode_internal(
                    &field.schema,
                    names,
                    &fully_qualified_name.namespace,
                    reader,
                )?;
                items.push((field.name.clone(), value));
            }
            Ok(Value::Record(items))
        }
        Schema::Enum(EnumSchema { symbols, .. }) => {
            let raw_index = zag_i32(reader)?;
            let index = usize::try_from(raw_index)
                .ok()
                .filter(|i| *i < symbols.len())
                .ok_or(Details::GetEnumIndex {
                    index: raw_index as i64,
                    nsymbols: symbols.len(),
                })?;
            Ok(Value::Enum(raw_index as u32, symbols[index].clone()))
        }
        Schema::Ref { name } => {
            let fully_qualified_name = name.fully_qualified_name(enclosing_namespace);
            match names.get(&fully_qualified_name) {
                Some(resolved) => {
                    decode_internal(resolved.borrow(), names, enclosing_namespace, reader)
                }
                None => Err(Details::SchemaResolutionError(fully_qualified_name).into()),
            }
        }
    }
}
