//! RDF-star term and quad model
//!
//! These are the values the mapping engine produces and hands to external
//! serializers or store loaders.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form. Compaction
//!    is handled by whoever serializes the output.
//!
//! 2. **Single-level quoting** - A [`QuotedTriple`] holds three non-quoted
//!    terms. Constructors enforce this, so a nested quote is unrepresentable
//!    in a well-formed [`Term`].
//!
//! 3. **Bag semantics** - Quads are plain values in a `Vec`; nothing here
//!    deduplicates.
//!
//! # Example
//!
//! ```
//! use starmap_graph_ir::{Quad, QuotedTriple, Term};
//!
//! let base = QuotedTriple::new(
//!     Term::iri("http://example.org/dataset/1"),
//!     Term::iri("http://www.w3.org/ns/dcat#theme"),
//!     Term::iri("http://example.org/Finance"),
//! )
//! .unwrap();
//!
//! let quad = Quad::new(
//!     Term::quoted(base),
//!     Term::iri("http://www.w3.org/ns/prov#wasDerivedFrom"),
//!     Term::iri("http://example.org/Sys"),
//!     None,
//! );
//! assert!(quad.subject.is_quoted());
//! ```

mod error;
mod quad;
mod term;

pub use error::{IrError, Result};
pub use quad::Quad;
pub use term::{Literal, QuotedTriple, Term};
