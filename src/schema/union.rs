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
use crate::schema::{Schema, SchemaKind};
use std::collections::{BTreeMap, HashSet};

/// A description of a union schema.
///
/// Branch order is significant: the zero-based position of a branch is its
/// wire discriminant.
#[derive(Debug, Clone)]
pub struct UnionSchema {
    /// The schemas that make up this union.
    pub(crate) schemas: Vec<Schema>,
    // Used to ensure uniqueness of unnamed schema inputs, and provide
    // constant time finding of the branch index given a value. Named types
    // are kept out of this index and disambiguated by fullname instead.
    variant_index: BTreeMap<SchemaKind, usize>,
}

impl UnionSchema {
    /// Creates a new `UnionSchema` from a vector of schemas.
    ///
    /// # Errors
    /// Will return an error if `schemas` contains a union, two unnamed
    /// branches of the same kind, or two named branches with the same
    /// fullname.
    pub fn new(schemas: Vec<Schema>) -> AvroResult<Self> {
        let mut vindex = BTreeMap::new();
        let mut named_fullnames = HashSet::new();
        for (i, schema) in schemas.iter().enumerate() {
            if let Schema::Union(_) = schema {
                return Err(Details::GetNestedUnion.into());
            }
            match schema.name() {
                Some(name) => {
                    let fullname = name.fullname(None);
                    if !named_fullnames.insert(fullname.clone()) {
                        return Err(Details::GetUnionDuplicateName(fullname).into());
                    }
                }
                None => {
                    if vindex.insert(SchemaKind::from(schema), i).is_some() {
                        return Err(Details::GetUnionDuplicate.into());
                    }
                }
            }
        }
        Ok(UnionSchema {
            schemas,
            variant_index: vindex,
        })
    }

    /// Returns a slice of all variants of this schema.
    pub fn variants(&self) -> &[Schema] {
        &self.schemas
    }

    /// Returns true if any of the variants of this `UnionSchema` is `Null`.
    pub fn is_nullable(&self) -> bool {
        self.schemas.iter().any(|x| matches!(x, Schema::Null))
    }

    /// Constant-time lookup of the branch index for an unnamed schema kind.
    pub(crate) fn find_by_kind(&self, kind: SchemaKind) -> Option<usize> {
        self.variant_index.get(&kind).copied()
    }
}

// No need to compare variant_index, it is derivative of schemas.
impl PartialEq for UnionSchema {
    fn eq(&self, other: &UnionSchema) -> bool {
        self.schemas.eq(&other.schemas)
    }
}
