//! Documents rejected before generation

mod support;

use serde_json::{json, Value as JsonValue};
use starmap_yarrrml::{MappingBuilder, MappingError, MappingResult, MappingSpecification};
use support::*;

fn try_build(doc: JsonValue) -> MappingResult<MappingSpecification> {
    MappingBuilder::from_document(doc).build()
}

fn with_mappings(mappings: JsonValue) -> JsonValue {
    json!({"prefixes": prefixes(), "mappings": mappings})
}

fn person(po: JsonValue) -> JsonValue {
    with_mappings(json!({
        "person": {"sources": ["people.csv~csv"], "s": "ex:p/$(id)", "po": po}
    }))
}

#[test]
fn test_datatype_with_language() {
    let err = try_build(person(json!([{
        "p": "ex:name",
        "o": {"value": "$(name)", "datatype": "xsd:string", "language": "en"}
    }])))
    .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("both a datatype and a language"));
}

#[test]
fn test_lang_suffix_on_object() {
    let err = try_build(person(json!([["ex:name", "$(name)~lang"]]))).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_tilde_modifier_rejected() {
    let err = try_build(person(json!([["ex:home", "$(home)", "~iri"]]))).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("'~iri'"));
}

#[test]
fn test_alias_conflict() {
    let err = try_build(with_mappings(json!({
        "person": {
            "sources": ["people.csv~csv"],
            "s": "ex:p/$(id)",
            "subjects": "ex:q/$(id)"
        }
    })))
    .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("name the same field"));
}

#[test]
fn test_mutually_exclusive_object_fields() {
    let err = try_build(person(json!([{
        "p": "ex:knows",
        "o": {"value": "ex:p/$(friend)", "mapping": "person"}
    }])))
    .unwrap_err();
    assert!(err.to_string().contains("cannot be combined"));
}

#[test]
fn test_inverse_count_mismatch() {
    let err = try_build(person(json!([{
        "p": ["ex:a", "ex:b", "ex:c"],
        "i": ["ex:x", "ex:y"],
        "o": "ex:p/$(friend)~iri"
    }])))
    .unwrap_err();
    assert!(err.is_validation());

    let literal = try_build(person(json!([{"p": "ex:name", "i": "ex:nameOf", "o": "$(name)"}])));
    assert!(literal.unwrap_err().is_validation());
}

#[test]
fn test_unknown_source_and_target() {
    let err = try_build(with_mappings(json!({
        "person": {"sources": "people", "s": "ex:p/$(id)"}
    })))
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnknownSource { ref mapping, ref source_name }
            if mapping == "person" && source_name == "people"
    ));

    let err = try_build(with_mappings(json!({
        "person": {"sources": ["people.csv~csv"], "targets": ["dump"], "s": "ex:p/$(id)"}
    })))
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnknownTarget { ref target_name, .. } if target_name == "dump"
    ));
}

#[test]
fn test_unknown_quoted_mapping() {
    let err = try_build(with_mappings(json!({
        "note": {"sources": ["notes.csv~csv"], "s": {"quoted": "person"}, "po": [["ex:p", "$(v)"]]}
    })))
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnknownTriplesMap { ref mapping, ref reference }
            if mapping == "note" && reference == "person"
    ));
}

#[test]
fn test_quoting_cycle() {
    let condition = json!({
        "function": "equal",
        "parameters": [["str1", "$(id)"], ["str2", "$(id)"]]
    });
    let err = try_build(with_mappings(json!({
        "a": {"sources": ["a.csv~csv"], "s": {"quoted": "c", "condition": condition}, "po": [["ex:p", "$(v)"]]},
        "b": {"sources": ["b.csv~csv"], "s": {"quoted": "a", "condition": condition}, "po": [["ex:p", "$(v)"]]},
        "c": {"sources": ["c.csv~csv"], "s": {"quoted": "b", "condition": condition}, "po": [["ex:p", "$(v)"]]}
    })))
    .unwrap_err();
    match err {
        MappingError::ReferenceCycle(names) => {
            for name in ["a", "b", "c"] {
                assert!(names.iter().any(|n| n == name));
            }
        }
        other => panic!("expected a cycle, got {other}"),
    }
}

#[test]
fn test_join_conditions() {
    let quoted = |condition: JsonValue| {
        with_mappings(json!({
            "dataset": {"sources": ["datasets.csv~csv"], "s": "ex:d/$(id)", "po": [["ex:p", "$(v)"]]},
            "lineage": {
                "sources": ["lineage.csv~csv"],
                "s": {"quoted": "dataset", "condition": condition},
                "po": [["ex:q", "$(w)"]]
            }
        }))
    };

    let prefixed = try_build(quoted(json!({
        "function": "idlab-fn:equal",
        "parameters": [["str1", "$(ref)"], ["str2", "$(id)"]]
    })));
    assert!(prefixed.is_ok());

    let other = try_build(quoted(json!({
        "function": "grel:string_contains",
        "parameters": [["str1", "$(ref)"], ["str2", "$(id)"]]
    })))
    .unwrap_err();
    assert!(other.to_string().contains("must use 'equal'"));

    let not_a_column = try_build(quoted(json!({
        "function": "equal",
        "parameters": [["str1", "id-$(ref)"], ["str2", "$(id)"]]
    })))
    .unwrap_err();
    assert!(not_a_column.is_validation());

    // different sources and no condition
    let mut doc = quoted(JsonValue::Null);
    doc["mappings"]["lineage"]["s"] = json!({"quoted": "dataset"});
    let unconditioned = try_build(doc).unwrap_err();
    assert!(unconditioned.to_string().contains("same sources"));
}

#[test]
fn test_document_shape() {
    assert!(matches!(
        try_build(json!("mappings")),
        Err(MappingError::Document(_))
    ));
    assert!(matches!(
        try_build(json!({"prefixes": prefixes()})),
        Err(MappingError::Document(_))
    ));
    assert!(matches!(
        MappingBuilder::from_json_str("{\"mappings\": "),
        Err(MappingError::Document(_))
    ));

    let no_subject =
        try_build(with_mappings(json!({"m": {"sources": ["a.csv~csv"]}}))).unwrap_err();
    assert!(no_subject.to_string().contains("no subject"));
}

#[test]
fn test_accepted_document_sections() {
    let spec = try_build(json!({
        "prefixes": prefixes(),
        "base": EX,
        "authors": ["Jane Doe <jane@doe.com> (https://doe.com)", "http://john.example/#me"],
        "external": {"tenant": "acme"},
        "sources": {"people": {"access": "people.json", "referenceFormulation": "jsonpath", "iterator": "$.people[*]"}},
        "targets": {"dump": {"access": "out/dump.nq", "serialization": "nquads"}},
        "mappings": {
            "person": {
                "sources": "people",
                "targets": "dump",
                "s": "ex:$(_tenant)/p/$(id)",
                "po": [["ex:name", "$(name)"]]
            }
        }
    }))
    .unwrap();

    assert_eq!(spec.authors.len(), 2);
    assert_eq!(
        spec.authors[1].webid.as_deref(),
        Some("http://john.example/#me")
    );
    let person = spec.get("person").unwrap();
    assert_eq!(person.sources[0].iterator.as_deref(), Some("$.people[*]"));
    assert_eq!(person.targets[0].serialization.as_deref(), Some("nquads"));
    assert_eq!(person.subject.templates[0].as_str(), "ex:acme/p/$(id)");
}
