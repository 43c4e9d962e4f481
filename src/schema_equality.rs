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

//! Structural comparison of schemas, backing `PartialEq for Schema`.
//!
//! Two schemas are considered equal when they describe the same wire format:
//! documentation, aliases and custom attributes do not participate in the
//! comparison. Named types compare by fullname plus structure; a `Ref`
//! compares equal to another `Ref` with the same fullname, which keeps the
//! comparison finite on recursive schemas.

use crate::schema::{ArraySchema, MapSchema, RecordSchema, Schema, UnionSchema};

pub(crate) fn compare_schemata(one: &Schema, two: &Schema) -> bool {
    match (one, two) {
        (Schema::Null, Schema::Null)
        | (Schema::Boolean, Schema::Boolean)
        | (Schema::Int, Schema::Int)
        | (Schema::Long, Schema::Long)
        | (Schema::Float, Schema::Float)
        | (Schema::Double, Schema::Double)
        | (Schema::Bytes, Schema::Bytes)
        | (Schema::String, Schema::String) => true,
        (Schema::Array(ArraySchema { items: one, .. }), Schema::Array(ArraySchema { items: two, .. })) => {
            compare_schemata(one, two)
        }
        (Schema::Map(MapSchema { values: one, .. }), Schema::Map(MapSchema { values: two, .. })) => {
            compare_schemata(one, two)
        }
        (Schema::Union(one), Schema::Union(two)) => compare_unions(one, two),
        (Schema::Record(one), Schema::Record(two)) => compare_records(one, two),
        (Schema::Enum(one), Schema::Enum(two)) => {
            one.name == two.name && one.symbols == two.symbols
        }
        (Schema::Fixed(one), Schema::Fixed(two)) => one.name == two.name && one.size == two.size,
        (Schema::Ref { name: one }, Schema::Ref { name: two }) => one == two,
        _ => false,
    }
}

fn compare_unions(one: &UnionSchema, two: &UnionSchema) -> bool {
    one.variants().len() == two.variants().len()
        && one
            .variants()
            .iter()
            .zip(two.variants().iter())
            .all(|(one, two)| compare_schemata(one, two))
}

fn compare_records(one: &RecordSchema, two: &RecordSchema) -> bool {
    one.name == two.name
        && one.fields.len() == two.fields.len()
        && one
            .fields
            .iter()
            .zip(two.fields.iter())
            .all(|(one, two)| {
                one.name == two.name
                    && one.order == two.order
                    && one.default == two.default
                    && compare_schemata(&one.schema, &two.schema)
            })
}
