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

//! Syntax checks for schema names, namespaces, enum symbols and record field
//! names, following the grammar in the
//! [Avro specification](https://avro.apache.org/docs/1.7.7/spec.html#Names).

use crate::{AvroResult, error::Details};
use regex_lite::Regex;
use std::sync::OnceLock;

// An optional namespace (with optional dots) followed by a name without any dots in it.
const SCHEMA_NAME_PATTERN: &str = r"^((?P<namespace>([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)$";
const NAMESPACE_PATTERN: &str = r"^([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?$";
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

fn schema_name_regex() -> &'static Regex {
    static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SCHEMA_NAME_ONCE.get_or_init(|| Regex::new(SCHEMA_NAME_PATTERN).unwrap())
}

fn namespace_regex() -> &'static Regex {
    static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
    NAMESPACE_ONCE.get_or_init(|| Regex::new(NAMESPACE_PATTERN).unwrap())
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER_ONCE: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER_ONCE.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).unwrap())
}

/// Validates a (possibly dotted) schema name and returns the start byte of
/// the name part within it.
pub(crate) fn validate_schema_name(schema_name: &str) -> AvroResult<usize> {
    let caps = schema_name_regex()
        .captures(schema_name)
        .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), SCHEMA_NAME_PATTERN))?;
    Ok(caps
        .name("name")
        .expect("Regex has a group named `name`")
        .start())
}

pub(crate) fn validate_namespace(ns: &str) -> AvroResult<()> {
    if !namespace_regex().is_match(ns) {
        return Err(Details::InvalidNamespace(ns.to_string(), NAMESPACE_PATTERN).into());
    }
    Ok(())
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    if !identifier_regex().is_match(symbol) {
        return Err(Details::EnumSymbolName(symbol.to_string()).into());
    }
    Ok(())
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    if !identifier_regex().is_match(field_name) {
        return Err(Details::FieldName(field_name.to_string()).into());
    }
    Ok(())
}
