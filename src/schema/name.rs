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

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{
    AvroResult, Error, Schema,
    error::Details,
    util::MapHelper,
    validator::{validate_namespace, validate_schema_name},
};

/// Represents names for `record`, `enum` and `fixed` schemas.
///
/// Each of these schemas has a `fullname` composed of two parts:
///   * a name
///   * a namespace
///
/// `aliases` can also be defined to facilitate schema evolution; they are
/// parsed and stored but never applied.
///
/// More information about schema names can be found in the
/// [Avro specification](https://avro.apache.org/docs/1.7.7/spec.html#Names)
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Name {
    /// The name part, without any dots in it.
    pub name: String,
    /// The optional namespace. An empty namespace is normalized to `None`.
    pub namespace: Namespace,
}

/// Represents the aliases for a named schema.
pub type Aliases = Option<Vec<Alias>>;
/// Represents documentation for complex schemas.
pub type Documentation = Option<String>;
/// Represents a schema lookup (the symbol table) within a schema env.
pub type Names = HashMap<Name, Schema>;
/// Represents a borrowed schema lookup within a schema.
pub type NamesRef<'a> = HashMap<Name, &'a Schema>;
/// Represents the namespace of a named schema.
pub type Namespace = Option<String>;

impl Name {
    /// Create a new `Name`, parsing the optional namespace from the `name`
    /// string if it is dotted.
    pub fn new(name: &str) -> AvroResult<Self> {
        let (name, namespace) = Name::get_name_and_namespace(name)?;
        Ok(Self {
            name,
            namespace: namespace.filter(|ns| !ns.is_empty()),
        })
    }

    fn get_name_and_namespace(name: &str) -> AvroResult<(String, Namespace)> {
        let index_of_name = validate_schema_name(name)?;
        if index_of_name == 0 {
            Ok((name.to_string(), None))
        } else {
            // `index_of_name` points right after the final dot.
            let namespace = &name[..index_of_name - 1];
            Ok((name[index_of_name..].to_string(), Some(namespace.to_string())))
        }
    }

    /// Parse a `serde_json::Value` into a `Name`, inheriting the enclosing
    /// namespace when the JSON declares neither a dotted name nor a
    /// `namespace` attribute.
    pub(crate) fn parse(
        complex: &Map<String, Value>,
        enclosing_namespace: &Namespace,
    ) -> AvroResult<Self> {
        let (name, namespace_from_name) = complex
            .name()
            .map(|name| Name::get_name_and_namespace(name.as_str()))
            .ok_or(Details::GetNameField)??;

        let namespace = namespace_from_name
            .or_else(|| complex.string("namespace"))
            .or_else(|| enclosing_namespace.clone());

        if let Some(ref ns) = namespace {
            validate_namespace(ns)?;
        }

        Ok(Self {
            name,
            namespace: namespace.filter(|ns| !ns.is_empty()),
        })
    }

    /// Return the `fullname` of this `Name`.
    ///
    /// More information about fullnames can be found in the
    /// [Avro specification](https://avro.apache.org/docs/1.7.7/spec.html#Names)
    pub fn fullname(&self, default_namespace: Namespace) -> String {
        if self.name.contains('.') {
            self.name.clone()
        } else {
            let namespace = self.namespace.clone().or(default_namespace);

            match namespace {
                Some(ref namespace) if !namespace.is_empty() => {
                    format!("{}.{}", namespace, self.name)
                }
                _ => self.name.clone(),
            }
        }
    }

    /// Construct the fully qualified name, falling back to the enclosing
    /// namespace when this name does not carry one of its own.
    ///
    /// ```
    /// # use avro_datum::{Error, schema::Name};
    /// assert_eq!(
    ///     Name::new("some_name")?.fully_qualified_name(&Some("some_namespace".into())),
    ///     Name::new("some_namespace.some_name")?
    /// );
    /// # Ok::<(), Error>(())
    /// ```
    pub fn fully_qualified_name(&self, enclosing_namespace: &Namespace) -> Name {
        Name {
            name: self.name.clone(),
            namespace: self
                .namespace
                .clone()
                .or_else(|| enclosing_namespace.clone().filter(|ns| !ns.is_empty())),
        }
    }
}

impl TryFrom<&str> for Name {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname(None)[..])
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.fullname(None))
    }
}

/// Newtype over [`Name`] so that aliases serialize as plain strings in the
/// JSON representation.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Alias(Name);

impl Alias {
    pub fn new(name: &str) -> AvroResult<Self> {
        Name::new(name).map(Self)
    }

    pub fn name(&self) -> String {
        self.0.name.clone()
    }

    pub fn namespace(&self) -> Namespace {
        self.0.namespace.clone()
    }

    pub fn fullname(&self, default_namespace: Namespace) -> String {
        self.0.fullname(default_namespace)
    }

    pub fn fully_qualified_name(&self, default_namespace: &Namespace) -> Name {
        self.0.fully_qualified_name(default_namespace)
    }
}

impl TryFrom<&str> for Alias {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Alias {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.fullname(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Details;
    use pretty_assertions::assert_eq;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn test_name_and_namespace_from_dotted_name() -> TestResult {
        let name = Name::new("com.example.Thing")?;
        assert_eq!(name.name, "Thing");
        assert_eq!(name.namespace, Some("com.example".to_string()));
        assert_eq!(name.fullname(None), "com.example.Thing");
        Ok(())
    }

    /// A zero-length namespace is considered as no-namespace.
    #[test]
    fn test_namespace_from_name_with_empty_value() -> TestResult {
        let name = Name::new(".name")?;
        assert_eq!(name.name, "name");
        assert_eq!(name.namespace, None);
        Ok(())
    }

    /// Whitespace is not allowed in the name.
    #[test]
    fn test_name_with_whitespace_value() {
        match Name::new(" ").map_err(Error::into_details) {
            Err(Details::InvalidSchemaName(_, _)) => {}
            other => panic!("Expected Details::InvalidSchemaName, got {other:?}"),
        }
    }

    /// The name must be non-empty.
    #[test]
    fn test_name_with_no_name_part() {
        match Name::new("space.").map_err(Error::into_details) {
            Err(Details::InvalidSchemaName(_, _)) => {}
            other => panic!("Expected Details::InvalidSchemaName, got {other:?}"),
        }
    }

    #[test]
    fn test_fully_qualified_name_keeps_own_namespace() -> TestResult {
        let qualified = Name::new("a.b")?.fully_qualified_name(&Some("o".into()));
        assert_eq!(qualified, Name::new("a.b")?);
        Ok(())
    }

    #[test]
    fn test_fullname_with_default_namespace() -> TestResult {
        let name = Name::new("record1")?;
        assert_eq!(name.fullname(Some("space".into())), "space.record1");
        assert_eq!(name.fullname(None), "record1");
        Ok(())
    }

    #[test]
    fn test_alias_serializes_as_string() -> TestResult {
        let alias = Alias::new("ns.OldName")?;
        assert_eq!(serde_json::to_string(&alias)?, r#""ns.OldName""#);
        Ok(())
    }
}
