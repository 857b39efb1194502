//! YARRRML-star mapping compiler
//!
//! This crate turns tabular records into RDF-star quads according to a
//! YARRRML mapping document. Mappings may annotate the statements another
//! mapping generates: the subject of such an annotation is a quoted triple,
//! matched to the base row by an equality join.
//!
//! # Key Features
//!
//! - **Alias-free model**: every shortcut key, compact `[p, o, modifier]`
//!   entry and inline `join(...)` call is normalized once by the
//!   [`MappingBuilder`]
//! - **Column-wise materialization**: templates are parsed once per mapping
//!   and resolved for a whole table at a time
//! - **RDF-star joins**: quoted subjects and objects, plus plain `mapping:`
//!   interlinks, probe hash indexes built once per referenced mapping
//! - **Two error channels**: malformed documents fail with a
//!   [`MappingError`] before any output; row problems become diagnostics and
//!   never abort a run
//!
//! # Usage
//!
//! Build a [`MappingSpecification`] with [`MappingBuilder`], hand the
//! materialized source tables to an [`Engine`] through a
//! [`engine::TableProvider`], and collect the quads of the returned
//! [`engine::Generation`]. Reading sources and serializing quads stay with
//! the caller.

pub mod builder;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod materialize;
pub mod vocab;

pub use builder::{BuildOptions, MappingBuilder};
pub use engine::{
    DatasetMetadata, DiagnosticKind, DiagnosticSink, Diagnostics, Engine, Generation,
    GenerationOptions, GenerationStats, RowDiagnostic, TableProvider, TableSet,
};
pub use error::{MappingError, MappingResult};
pub use mapping::{
    ExecutionPlan, MappingSpecification, ObjectSpec, PredicateObjectSpec, QuotedRef, SubjectSpec,
    Template, TriplesMap,
};
pub use materialize::{CompiledTerm, IriEncoding, TermResolver};
pub use vocab::YARRRML;
