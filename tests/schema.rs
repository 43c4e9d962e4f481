//! Schema-compiler tests: parsing, fullname resolution, invariant checks,
//! canonical form and fingerprints.

use avro_datum::{
    Codec, Schema,
    schema::{Name, ResolvedSchema, SchemaKind},
};
use md5::Md5;
use pretty_assertions::assert_eq;
use sha2::Sha256;

type TestResult = anyhow::Result<()>;

#[test]
fn top_level_forms() -> TestResult {
    // A primitive-name string.
    assert_eq!(Schema::parse_str(r#""long""#)?, Schema::Long);
    // A type object.
    assert_eq!(
        Schema::parse_str(r#"{"type": "long"}"#)?,
        Schema::Long
    );
    // A union array.
    assert_eq!(
        SchemaKind::from(&Schema::parse_str(r#"["null", "long"]"#)?),
        SchemaKind::Union
    );
    Ok(())
}

#[test]
fn field_level_type_object_short_form() -> TestResult {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "R",
            "fields": [
                {"name": "a", "type": {"type": "string"}}
            ]
        }
    "#,
    )?;
    assert_eq!(SchemaKind::from(&schema), SchemaKind::Record);
    Ok(())
}

#[test]
fn dotted_name_carries_its_own_namespace() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "fixed", "name": "space.Four", "namespace": "ignored", "size": 4}"#,
    )?;
    assert_eq!(schema.name(), Some(&Name::new("space.Four")?));
    assert_eq!(schema.namespace(), Some("space".to_string()));
    Ok(())
}

#[test]
fn namespace_attribute_applies_to_undotted_name() -> TestResult {
    let schema = Schema::parse_str(
        r#"{"type": "fixed", "name": "Four", "namespace": "space", "size": 4}"#,
    )?;
    assert_eq!(schema.name(), Some(&Name::new("space.Four")?));
    Ok(())
}

#[test]
fn inner_named_type_inherits_enclosing_namespace() -> TestResult {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "Outer",
            "namespace": "space",
            "fields": [
                {"name": "f", "type": {"type": "fixed", "name": "Inner", "size": 1}},
                {"name": "g", "type": "space.Inner"}
            ]
        }
    "#,
    )?;
    let rs = ResolvedSchema::try_from(&schema)?;
    assert!(rs.get_names().contains_key(&Name::new("space.Inner")?));
    Ok(())
}

#[test]
fn unqualified_reference_resolves_in_enclosing_namespace() -> TestResult {
    let codec = Codec::new(
        r#"
        {
            "type": "record",
            "name": "Outer",
            "namespace": "space",
            "fields": [
                {"name": "f", "type": {"type": "fixed", "name": "Inner", "size": 1}},
                {"name": "g", "type": "Inner"}
            ]
        }
    "#,
    );
    assert!(codec.is_ok());
    Ok(())
}

#[test]
fn unknown_type_name_is_a_parse_error() {
    assert!(Schema::parse_str(r#""not_a_type""#).is_err());
    assert!(Schema::parse_str(r#"{"type": "not_a_type"}"#).is_err());
}

#[test]
fn unknown_reference_in_record_is_an_error() {
    let result = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "R",
            "fields": [{"name": "f", "type": "Missing"}]
        }
    "#,
    );
    assert!(result.is_err());
}

#[test]
fn union_invariants() -> TestResult {
    // Unions may not contain unions.
    assert!(Schema::parse_str(r#"["null", ["int", "string"]]"#).is_err());
    // At most one branch of each unnamed kind.
    assert!(Schema::parse_str(r#"["int", "int"]"#).is_err());
    assert!(
        Schema::parse_str(
            r#"[{"type": "array", "items": "int"}, {"type": "array", "items": "string"}]"#
        )
        .is_err()
    );
    assert!(
        Schema::parse_str(
            r#"[{"type": "map", "values": "int"}, {"type": "map", "values": "string"}]"#
        )
        .is_err()
    );
    // Named branches are distinguished by fullname.
    assert!(
        Schema::parse_str(
            r#"[{"type": "fixed", "name": "A", "size": 1}, {"type": "fixed", "name": "B", "size": 1}]"#
        )
        .is_ok()
    );
    Ok(())
}

#[test]
fn enum_symbol_invariants() {
    assert!(
        Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": ["A", "A"]}"#).is_err()
    );
    assert!(
        Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": ["not-valid"]}"#).is_err()
    );
    assert!(
        Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": [""]}"#).is_err()
    );
    assert!(
        Schema::parse_str(r#"{"type": "enum", "name": "E", "symbols": ["_ok_1"]}"#).is_ok()
    );
}

#[test]
fn enum_default_must_be_a_symbol() {
    assert!(
        Schema::parse_str(
            r#"{"type": "enum", "name": "E", "symbols": ["A", "B"], "default": "A"}"#
        )
        .is_ok()
    );
    assert!(
        Schema::parse_str(
            r#"{"type": "enum", "name": "E", "symbols": ["A", "B"], "default": "C"}"#
        )
        .is_err()
    );
}

#[test]
fn fixed_size_must_be_non_negative() {
    assert!(Schema::parse_str(r#"{"type": "fixed", "name": "F", "size": -1}"#).is_err());
    assert!(Schema::parse_str(r#"{"type": "fixed", "name": "F", "size": 0}"#).is_ok());
}

#[test]
fn record_field_default_must_match_field_schema() {
    assert!(
        Schema::parse_str(
            r#"
            {
                "type": "record",
                "name": "R",
                "fields": [{"name": "a", "type": "int", "default": "oops"}]
            }
        "#
        )
        .is_err()
    );
}

#[test]
fn aliases_are_parsed_but_not_indexed() -> TestResult {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "fixed",
            "name": "New",
            "aliases": ["Old"],
            "size": 2
        }
    "#,
    )?;
    assert_eq!(schema.aliases().map(|a| a.len()), Some(1));

    // Referencing the alias does not resolve.
    let referencing = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "R",
            "fields": [
                {"name": "a", "type": {"type": "fixed", "name": "New", "aliases": ["Old"], "size": 2}},
                {"name": "b", "type": "Old"}
            ]
        }
    "#,
    );
    assert!(referencing.is_err());
    Ok(())
}

#[test]
fn field_order_is_parsed_and_kept() -> TestResult {
    use avro_datum::schema::{RecordFieldOrder, RecordSchema};

    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "R",
            "fields": [
                {"name": "a", "type": "int", "order": "descending"},
                {"name": "b", "type": "int", "order": "ignore"},
                {"name": "c", "type": "int"}
            ]
        }
    "#,
    )?;
    if let Schema::Record(RecordSchema { fields, .. }) = schema {
        assert_eq!(fields[0].order, RecordFieldOrder::Descending);
        assert_eq!(fields[1].order, RecordFieldOrder::Ignore);
        assert_eq!(fields[2].order, RecordFieldOrder::Ascending);
    } else {
        panic!("expected a record schema");
    }
    Ok(())
}

#[test]
fn canonical_form_qualifies_names_and_strips_extras() -> TestResult {
    let schema = Schema::parse_str(
        r#"
        {
            "type": "record",
            "name": "Interop",
            "namespace": "org.apache.avro",
            "doc": "some doc",
            "custom": "attribute",
            "fields": [
                {"name": "intField", "type": "int", "doc": "int field"},
                {"name": "fixedField", "type": {"type": "fixed", "name": "MD5", "size": 16}}
            ]
        }
    "#,
    )?;
    assert_eq!(
        schema.canonical_form(),
        r#"{"name":"org.apache.avro.Interop","type":"record","fields":[{"name":"intField","type":"int"},{"name":"fixedField","type":{"name":"org.apache.avro.MD5","type":"fixed","size":16}}]}"#
    );
    Ok(())
}

#[test]
fn fingerprints_are_deterministic_per_schema() -> TestResult {
    let one = Schema::parse_str(r#"{"type": "array", "items": "long"}"#)?;
    let same = Schema::parse_str(r#"{"type": "array", "items": {"type": "long"}}"#)?;
    let other = Schema::parse_str(r#"{"type": "array", "items": "int"}"#)?;

    assert_eq!(
        one.fingerprint::<Sha256>().to_string(),
        same.fingerprint::<Sha256>().to_string()
    );
    assert_ne!(
        one.fingerprint::<Sha256>().to_string(),
        other.fingerprint::<Sha256>().to_string()
    );

    assert_eq!(one.fingerprint::<Md5>().bytes.len(), 16);
    assert_eq!(one.fingerprint::<Sha256>().bytes.len(), 32);
    Ok(())
}

#[test]
fn parse_list_resolves_cross_references_in_any_order() -> TestResult {
    let schema_b = r#"{"type": "record", "name": "B", "fields": [{"name": "a", "type": "A"}]}"#;
    let schema_a = r#"{"type": "record", "name": "A", "fields": [{"name": "x", "type": "int"}]}"#;

    let parsed = Schema::parse_list([schema_b, schema_a])?;
    assert_eq!(parsed.len(), 2);

    // The same fullname twice is rejected.
    assert!(Schema::parse_list([schema_a, schema_a]).is_err());
    Ok(())
}

#[test]
fn parse_str_with_list_allows_named_root() -> TestResult {
    let list = [
        r#"{"type": "record", "name": "N", "fields": [{"name": "x", "type": "int"}]}"#,
    ];
    let (root, schemata) = Schema::parse_str_with_list(r#""N""#, list)?;
    assert_eq!(root, Schema::Ref { name: Name::new("N")? });
    assert_eq!(schemata.len(), 1);
    Ok(())
}

#[test]
fn schema_json_serialization_round_trips() -> TestResult {
    let raw = r#"
        {
            "type": "record",
            "name": "LongList",
            "fields": [
                {"name": "value", "type": "long"},
                {"name": "next", "type": ["null", "LongList"]}
            ]
        }
    "#;
    let schema = Schema::parse_str(raw)?;
    let json = serde_json::to_string(&schema)?;
    assert_eq!(Schema::parse_str(&json)?, schema);
    Ok(())
}
