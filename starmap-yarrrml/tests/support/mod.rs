//! Shared fixtures for the integration tests

#![allow(dead_code)]

pub mod span_capture;

use serde_json::Value as JsonValue;
use starmap_graph_ir::{Quad, QuotedTriple, Term};
use starmap_tabular::SourceTable;
use starmap_yarrrml::{
    Engine, Generation, GenerationOptions, MappingBuilder, MappingSpecification, TableSet,
};

pub const EX: &str = "http://example.org/";
pub const DCAT: &str = "http://www.w3.org/ns/dcat#";
pub const PROV: &str = "http://www.w3.org/ns/prov#";

/// The `ex`, `dcat` and `prov` prefixes most documents declare
pub fn prefixes() -> JsonValue {
    serde_json::json!({"ex": EX, "dcat": DCAT, "prov": PROV})
}

pub fn table(rows: JsonValue) -> SourceTable {
    SourceTable::from_json(&rows).unwrap()
}

pub fn build(doc: JsonValue) -> MappingSpecification {
    MappingBuilder::from_document(doc).build().unwrap()
}

pub fn run(spec: &MappingSpecification, tables: &TableSet) -> Generation {
    Engine::new(spec).run(tables).unwrap()
}

pub fn run_with(
    spec: &MappingSpecification,
    tables: &TableSet,
    options: GenerationOptions,
) -> Generation {
    Engine::new(spec).with_options(options).run(tables).unwrap()
}

pub fn ex(local: &str) -> Term {
    Term::iri(format!("{}{}", EX, local))
}

pub fn quoted(subject: Term, predicate: Term, object: Term) -> Term {
    Term::quoted(QuotedTriple::new(subject, predicate, object).unwrap())
}

pub fn quad(subject: Term, predicate: Term, object: Term) -> Quad {
    Quad::new(subject, predicate, object, None)
}

/// Quads with the given predicate
pub fn with_predicate<'a>(quads: &'a [Quad], predicate: &Term) -> Vec<&'a Quad> {
    quads.iter().filter(|q| &q.predicate == predicate).collect()
}
