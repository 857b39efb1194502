//! Term materialization
//!
//! Builds RDF terms from source rows according to compiled templates.
//!
//! Two entry points are provided:
//!
//! - **Row API**: [`CompiledTerm::resolve`] over anything implementing
//!   [`RowValues`], e.g. a `HashMap<String, Option<String>>`. For tests and
//!   single lookups.
//!
//! - **Table API**: [`CompiledTerm::materialize_column`] resolves one term for
//!   every row of a [`starmap_tabular::SourceTable`] at once. This is what
//!   the engine uses.

mod resolver;
mod row;
mod term;

pub use resolver::{IriEncoding, TermResolver};
pub use row::{Lookup, RowValues, TableRow};
pub use term::{CompiledTerm, TermFailure};
