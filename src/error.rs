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
    schema::{Name, Schema, SchemaKind},
    types::{Value, ValueKind},
};

/// Errors encountered while compiling a schema or while encoding or
/// decoding a datum.
///
/// To inspect the precise failure use [`details`](Self::details) or
/// [`into_details`](Self::into_details) to get a [`Details`].
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// All the ways schema compilation or datum encoding/decoding can fail.
///
/// The first group of variants is reported while a schema document is parsed
/// and resolved; the rest surface at encode or decode time.
#[derive(thiserror::Error, Debug)]
pub enum Details {
    #[error("Failed to parse schema from JSON")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Failed to read schema")]
    ReadSchemaFromReader(#[source] std::io::Error),

    #[error("Must be a JSON string, object or array")]
    ParseSchemaFromValidJson,

    #[error("Unknown type: {0}")]
    ParsePrimitive(String),

    #[error("Unknown type: {0}. Did you mean \"{1}\"?")]
    ParsePrimitiveSimilar(String, &'static str),

    #[error(
        "Invalid schema: There is no type called '{0}'. A named complex type \
         must be defined inside a `type` attribute"
    )]
    InvalidSchemaRecord(String),

    #[error("No `name` field")]
    GetNameField,

    #[error("No `name` field in a record field")]
    GetNameFieldFromRecord,

    #[error("Invalid name: {0}. It must match the regex {1}")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace: {0}. It must match the regex {1}")]
    InvalidNamespace(String, &'static str),

    #[error("Invalid enum symbol name {0}")]
    EnumSymbolName(String),

    #[error("Invalid field name {0}")]
    FieldName(String),

    #[error("Duplicate field name {0}")]
    FieldNameDuplicate(String),

    #[error("Duplicate enum symbol {0}")]
    EnumSymbolDuplicate(String),

    #[error("No `symbols` field in an enum")]
    GetEnumSymbolsField,

    #[error("The `symbols` field of an enum must be an array of strings")]
    GetEnumSymbols,

    #[error("The `default` of an enum must be a string, got: {0:?}")]
    EnumDefaultWrongType(serde_json::Value),

    #[error("Enum default {symbol:?} is not among the symbols: {symbols:?}")]
    GetEnumDefault {
        symbol: String,
        symbols: Vec<String>,
    },

    #[error("No `items` field in an array")]
    GetArrayItemsField,

    #[error("No `values` field in a map")]
    GetMapValuesField,

    #[error("No `size` field in a fixed")]
    GetFixedSizeField,

    #[error("The `size` of a fixed must be a non-negative integer, got: {0:?}")]
    GetFixedSizeFieldPositive(serde_json::Value),

    #[error("The `fields` of a record must be an array")]
    GetRecordFieldsJson,

    #[error("No `type` field in a record field")]
    GetRecordFieldTypeField,

    #[error("Unknown complex type: {0}")]
    GetComplexType(serde_json::Value),

    #[error("No `type` field in a complex schema")]
    GetComplexTypeField,

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Unions cannot contain duplicate types")]
    GetUnionDuplicate,

    #[error("Unions cannot contain two named types with the same fullname: {0}")]
    GetUnionDuplicateName(String),

    #[error("Union cannot be empty")]
    EmptyUnion,

    #[error("Two schemas with the same fullname were given: {0:?}")]
    NameCollision(String),

    #[error("Two named schemas with the same fullname: {0}")]
    AmbiguousSchemaDefinition(Name),

    #[error("Failed to resolve schema reference: {0}")]
    SchemaResolutionError(Name),

    #[error(
        "Default value of field {0:?} of record {1:?} does not match the \
         field schema {2}: {3:?}"
    )]
    GetDefaultRecordField(String, String, String, serde_json::Value),

    #[error("Default value {0:?} does not match the schema kind {1:?}")]
    GetDefaultFromJson(serde_json::Value, SchemaKind),

    #[error("JSON number {0} cannot be converted to a value")]
    ConvertJsonNumber(serde_json::Number),

    #[error("Failed to read a variable-length integer")]
    ReadVariableIntegerBytes(#[source] std::io::Error),

    #[error("Variable-length integer does not fit in 64 bits")]
    IntegerOverflow,

    #[error("Value {1} cannot be converted to a 32-bit integer")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("Invalid boolean byte: {0:#04x}")]
    BoolValue(u8),

    #[error("Failed to read a boolean")]
    ReadBoolean(#[source] std::io::Error),

    #[error("Failed to read bytes")]
    ReadBytes(#[source] std::io::Error),

    #[error("Failed to read a string")]
    ReadString(#[source] std::io::Error),

    #[error("Failed to read a float")]
    ReadFloat(#[source] std::io::Error),

    #[error("Failed to read a double")]
    ReadDouble(#[source] std::io::Error),

    #[error("Failed to read {1} bytes of a fixed")]
    ReadFixed(#[source] std::io::Error, usize),

    #[error("Decoded string is not valid UTF-8")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Union index {index} out of range: there are {num_variants} variants")]
    GetUnionVariant { index: i64, num_variants: usize },

    #[error("Enum index {index} out of range: there are {nsymbols} symbols")]
    GetEnumIndex { index: i64, nsymbols: usize },

    #[error("Enum symbol {0} not found in the schema symbols")]
    GetEnumSymbol(String),

    #[error("Missing field {0:?} in record (and the field declares no default)")]
    GetField(String),

    #[error("Fixed size mismatch: schema declares {size} bytes, value has {n}")]
    CompareFixedSizes { size: usize, n: usize },

    #[error("Failed to write bytes")]
    WriteBytes(#[source] std::io::Error),

    #[error(
        "Cannot encode a value of kind {value_kind:?} with a schema of one \
         of the kinds {supported_schema:?}"
    )]
    EncodeValueAsSchemaError {
        value_kind: ValueKind,
        supported_schema: Vec<SchemaKind>,
    },

    #[error("Value does not match its schema")]
    Validation,

    #[error("Value {value:?} does not match schema {schema:?}: {reason}")]
    ValidationWithReason {
        value: Box<Value>,
        schema: Box<Schema>,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_one_pointer_wide() {
        assert_eq!(std::mem::size_of::<Error>(), std::mem::size_of::<usize>());
    }

    #[test]
    fn details_round_trip_through_error() {
        let err = Error::from(Details::BoolValue(5));
        match err.into_details() {
            Details::BoolValue(5) => {}
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn display_uses_details_message() {
        let err = Error::from(Details::GetField("color".to_owned()));
        assert!(err.to_string().contains("color"));
    }
}
