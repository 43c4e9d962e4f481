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

use crate::AvroResult;
use crate::error::Details;
use crate::schema::{Documentation, Name, Names, Namespace, Parser, Schema};
use crate::types;
use crate::util::MapHelper;
use crate::validator::validate_record_field_name;
use log::warn;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Represents the sort order of a `record` field.
///
/// The order is parsed and stored; it only matters when comparing encoded
/// data, which this crate does not do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordFieldOrder {
    Ascending,
    Descending,
    Ignore,
}

impl RecordFieldOrder {
    fn as_str(&self) -> &'static str {
        match self {
            RecordFieldOrder::Ascending => "ascending",
            RecordFieldOrder::Descending => "descending",
            RecordFieldOrder::Ignore => "ignore",
        }
    }
}

/// Represents a `field` in a `record` schema.
#[derive(bon::Builder, Clone, PartialEq)]
pub struct RecordField {
    /// Name of the field.
    #[builder(into)]
    pub name: String,
    /// Documentation of the field.
    #[builder(default)]
    pub doc: Documentation,
    /// Aliases of the field's name. They have no namespace.
    #[builder(default)]
    pub aliases: Vec<String>,
    /// Default value of the field, as it appears in the schema document.
    /// It is substituted when a record value supplied to the encoder has no
    /// entry for this field.
    pub default: Option<Value>,
    /// Schema of the field.
    pub schema: Schema,
    /// Sort order of the field.
    #[builder(default = RecordFieldOrder::Ascending)]
    pub order: RecordFieldOrder,
    /// A collection of all unknown attributes in the record field.
    #[builder(default = BTreeMap::new())]
    pub custom_attributes: BTreeMap<String, Value>,
}

impl fmt::Debug for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("RecordField");
        debug.field("name", &self.name);
        if let Some(doc) = &self.doc {
            debug.field("doc", &doc);
        }
        if !self.aliases.is_empty() {
            debug.field("aliases", &self.aliases);
        }
        if let Some(default) = &self.default {
            debug.field("default", &default);
        }
        debug.field("schema", &self.schema);
        debug.field("order", &self.order);
        if !self.custom_attributes.is_empty() {
            debug.field("custom_attributes", &self.custom_attributes);
        }
        debug.finish_non_exhaustive()
    }
}

impl RecordField {
    /// Parse a `serde_json::Value` into a `RecordField`.
    pub(crate) fn parse(
        field: &Map<String, Value>,
        parser: &mut Parser,
        enclosing_record: &Name,
    ) -> AvroResult<Self> {
        let name = field.name().ok_or(Details::GetNameFieldFromRecord)?;

        validate_record_field_name(&name)?;

        let ty = field.get("type").ok_or(Details::GetRecordFieldTypeField)?;
        let schema = parser.parse(ty, &enclosing_record.namespace)?;

        if let Some(logical_type) = field.get("logicalType") {
            warn!(
                "Ignoring the {enclosing_record}.{name} `logicalType` attribute (`{logical_type}`). \
                 It should be nested inside the `type` of the field"
            );
        }

        let default = field.get("default").cloned();
        Self::resolve_default_value(
            &schema,
            &name,
            &enclosing_record.fullname(None),
            parser.get_parsed_schemas(),
            &default,
        )?;

        let order = field
            .get("order")
            .and_then(|order| order.as_str())
            .map(|order| match order {
                "descending" => RecordFieldOrder::Descending,
                "ignore" => RecordFieldOrder::Ignore,
                _ => RecordFieldOrder::Ascending,
            })
            .unwrap_or(RecordFieldOrder::Ascending);

        let aliases = field
            .get("aliases")
            .and_then(|aliases| {
                aliases.as_array().map(|aliases| {
                    aliases
                        .iter()
                        .flat_map(|alias| alias.as_str())
                        .map(|alias| alias.to_string())
                        .collect::<Vec<String>>()
                })
            })
            .unwrap_or_default();

        Ok(RecordField {
            name,
            doc: field.doc(),
            default,
            aliases,
            schema,
            order,
            custom_attributes: RecordField::get_field_custom_attributes(field),
        })
    }

    /// Check that a declared `default` can be turned into a value of the
    /// field's schema. References to named types that are still being parsed
    /// cannot be checked here; they are re-checked when the default is used.
    fn resolve_default_value(
        field_schema: &Schema,
        field_name: &str,
        record_name: &str,
        names: &Names,
        default: &Option<Value>,
    ) -> AvroResult<()> {
        if let Some(value) = default {
            let enclosing_namespace: Namespace = None;
            match types::Value::from_json_with_schema(
                value,
                field_schema,
                names,
                &enclosing_namespace,
            ) {
                Ok(_) => Ok(()),
                Err(e) => match e.details() {
                    Details::SchemaResolutionError(_) => Ok(()),
                    _ => Err(Details::GetDefaultRecordField(
                        field_name.to_string(),
                        record_name.to_string(),
                        field_schema.canonical_form(),
                        value.clone(),
                    )
                    .into()),
                },
            }
        } else {
            Ok(())
        }
    }

    fn get_field_custom_attributes(field: &Map<String, Value>) -> BTreeMap<String, Value> {
        let mut custom_attributes: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in field {
            match key.as_str() {
                "type" | "name" | "doc" | "default" | "order" | "aliases" => continue,
                _ => custom_attributes.insert(key.clone(), value.clone()),
            };
        }
        custom_attributes
    }

    /// Returns true if this `RecordField` is nullable: the schema is a union
    /// with a null variant.
    pub fn is_nullable(&self) -> bool {
        match self.schema {
            Schema::Union(ref inner) => inner.is_nullable(),
            _ => false,
        }
    }
}

impl Serialize for RecordField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", &self.schema)?;

        if let Some(default) = &self.default {
            map.serialize_entry("default", default)?;
        }

        if self.order != RecordFieldOrder::Ascending {
            map.serialize_entry("order", self.order.as_str())?;
        }

        if let Some(doc) = &self.doc {
            map.serialize_entry("doc", doc)?;
        }

        if !self.aliases.is_empty() {
            map.serialize_entry("aliases", &self.aliases)?;
        }

        for attr in &self.custom_attributes {
            map.serialize_entry(attr.0, attr.1)?;
        }

        map.end()
    }
}
