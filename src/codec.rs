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

//! The compiled-codec façade: one schema, two operations.

use crate::{
    AvroResult,
    decode::decode_internal,
    encode::encode_internal,
    error::Details,
    schema::{ResolvedOwnedSchema, ResolvedSchema, Schema},
    types::Value,
};
use std::io::{Read, Write};

/// A compiled schema bound to its decode and encode entry points.
///
/// A `Codec` is built once per schema. Construction parses and resolves the
/// schema eagerly, so `decode` and `encode` never raise a schema-level
/// error. The codec holds no per-stream state: the same instance may be
/// used from multiple threads simultaneously, provided each caller supplies
/// its own reader or writer.
///
/// ```
/// use avro_datum::{Codec, types::Value};
///
/// let codec = Codec::new(r#"{"type": "array", "items": "long"}"#)?;
///
/// let mut buffer = Vec::new();
/// codec.encode(
///     &Value::Array(vec![Value::Long(3), Value::Long(27)]),
///     &mut buffer,
/// )?;
/// assert_eq!(buffer, [0x04, 0x06, 0x36, 0x00]);
///
/// let decoded = codec.decode(&mut buffer.as_slice())?;
/// assert_eq!(
///     decoded,
///     Value::Array(vec![Value::Long(3), Value::Long(27)])
/// );
/// # Ok::<(), avro_datum::Error>(())
/// ```
pub struct Codec {
    resolved: ResolvedOwnedSchema,
}

impl Codec {
    /// Compile a codec from the JSON text of an Avro schema.
    pub fn new(schema: &str) -> AvroResult<Self> {
        let schema = Schema::parse_str(schema)?;
        Self::from_schema(schema)
    }

    /// Compile a codec from an already parsed [`Schema`].
    pub fn from_schema(schema: Schema) -> AvroResult<Self> {
        Ok(Self {
            resolved: ResolvedOwnedSchema::try_from(schema)?,
        })
    }

    /// The schema this codec was compiled from.
    pub fn schema(&self) -> &Schema {
        self.resolved.get_root_schema()
    }

    /// Read one datum from `reader`.
    ///
    /// Exactly the bytes of one datum are consumed. Duplicate keys within a
    /// decoded map are resolved as last-writer-wins.
    pub fn decode<R: Read>(&self, reader: &mut R) -> AvroResult<Value> {
        decode_internal(
            self.resolved.get_root_schema(),
            self.resolved.get_names(),
            &None,
            reader,
        )
    }

    /// Validate `value` against the schema and write one datum to `writer`.
    ///
    /// Returns the number of bytes written. On failure the writer may hold a
    /// prefix of the intended output; the stream must be discarded.
    pub fn encode<W: Write>(&self, value: &Value, writer: &mut W) -> AvroResult<usize> {
        let root_schema = self.resolved.get_root_schema();
        let names = self.resolved.get_names();
        if let Some(reason) =
            value.validate_internal(root_schema, names, &root_schema.namespace())
        {
            return Err(Details::ValidationWithReason {
                value: Box::new(value.clone()),
                schema: Box::new(root_schema.clone()),
                reason,
            }
            .into());
        }
        encode_internal(value, root_schema, names, &None, writer)
    }

    /// [`encode`](Self::encode) into a freshly allocated buffer.
    pub fn encode_to_vec(&self, value: &Value) -> AvroResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.encode(value, &mut buffer)?;
        Ok(buffer)
    }
}

/// Encode a value into raw Avro data, also performing schema validation.
///
/// **NOTE** The output carries no framing, no magic bytes and no checksums;
/// it is exactly one binary-encoded datum.
pub fn to_avro_datum<T: Into<Value>>(schema: &Schema, value: T) -> AvroResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_avro_datum(schema, value, &mut buffer)?;
    Ok(buffer)
}

/// Decode one raw Avro datum from `reader` using the provided [`Schema`].
pub fn from_avro_datum<R: Read>(schema: &Schema, reader: &mut R) -> AvroResult<Value> {
    let rs = ResolvedSchema::try_from(schema)?;
    decode_internal(schema, rs.get_names(), &None, reader)
}

fn write_avro_datum<T: Into<Value>, W: Write>(
    schema: &Schema,
    value: T,
    writer: &mut W,
) -> AvroResult<()> {
    let avro = value.into();
    if !avro.validate(schema) {
        return Err(Details::Validation.into());
    }
    crate::encode::encode(&avro, schema, writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    type TestResult = anyhow::Result<()>;

    static PAIR_SCHEMA: &str = r#"
    {
        "type": "record",
        "name": "Pair",
        "fields": [
            {"name": "a", "type": "int"},
            {"name": "b", "type": "string"}
        ]
    }
    "#;

    #[test]
    fn test_codec_round_trip() -> TestResult {
        let codec = Codec::new(PAIR_SCHEMA)?;
        let value = Value::Record(vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::String("x".to_string())),
        ]);

        let encoded = codec.encode_to_vec(&value)?;
        assert_eq!(encoded, vec![0x02, 0x02, 0x78]);

        let decoded = codec.decode(&mut encoded.as_slice())?;
        assert_eq!(decoded, value);
        Ok(())
    }

    #[test]
    fn test_codec_construction_rejects_bad_schemas_eagerly() {
        assert!(Codec::new("not json").is_err());
        assert!(Codec::new(r#"{"type": "unknown_type"}"#).is_err());
        assert!(
            Codec::new(
                r#"
                {
                    "type": "record",
                    "name": "R",
                    "fields": [{"name": "f", "type": "Missing"}]
                }
                "#
            )
            .is_err()
        );
    }

    #[test]
    fn test_codec_encode_validates() -> TestResult {
        let codec = Codec::new(PAIR_SCHEMA)?;
        let bad = Value::Record(vec![
            ("a".to_string(), Value::String("not an int".to_string())),
            ("b".to_string(), Value::String("x".to_string())),
        ]);
        let mut buffer = Vec::new();
        assert!(codec.encode(&bad, &mut buffer).is_err());
        Ok(())
    }

    #[test]
    fn test_codec_is_reusable_across_streams() -> TestResult {
        let codec = Codec::new(r#""long""#)?;

        let one = codec.encode_to_vec(&Value::Long(3))?;
        let two = codec.encode_to_vec(&Value::Long(27))?;

        assert_eq!(codec.decode(&mut one.as_slice())?, Value::Long(3));
        assert_eq!(codec.decode(&mut two.as_slice())?, Value::Long(27));
        Ok(())
    }

    #[test]
    fn test_codec_shared_across_threads() -> TestResult {
        let codec = Arc::new(Codec::new(r#""int""#)?);
        let mut handles = Vec::new();
        for i in 0..4 {
            let codec = Arc::clone(&codec);
            handles.push(std::thread::spawn(move || {
                let encoded = codec.encode_to_vec(&Value::Int(i)).unwrap();
                codec.decode(&mut encoded.as_slice()).unwrap()
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Value::Int(i as i32));
        }
        Ok(())
    }

    #[test]
    fn test_datum_free_functions() -> TestResult {
        let schema = Schema::parse_str(r#""string""#)?;
        let encoded = to_avro_datum(&schema, Value::String("foo".into()))?;
        assert_eq!(encoded, vec![0x06, 0x66, 0x6F, 0x6F]);

        let decoded = from_avro_datum(&schema, &mut encoded.as_slice())?;
        assert_eq!(decoded, Value::String("foo".into()));
        Ok(())
    }

    #[test]
    fn test_datum_validation_failure() -> TestResult {
        let schema = Schema::parse_str(r#""string""#)?;
        assert!(to_avro_datum(&schema, Value::Int(5)).is_err());
        Ok(())
    }
}
