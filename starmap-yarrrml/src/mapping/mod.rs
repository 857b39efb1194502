//! Normalized mapping model
//!
//! Everything here is alias-free: the builder maps every shortcut onto these
//! types, and the engine only ever reads them.

mod author;
mod condition;
mod expr;
mod plan;
mod predicate_object;
mod source;
mod spec;
mod template;
mod triples_map;

pub use author::Author;
pub use condition::{JoinCondition, JoinKey, MappingRef, QuoteFilter, QuotedRef};
pub use expr::{canonicalize_keys, ExprKind, InlineCall, UnevaluatedExpr};
pub use plan::ExecutionPlan;
pub use predicate_object::{ObjectSpec, ObjectTerm, PredicateObjectSpec, TermKind};
pub use source::{SourceFormat, SourceRef, TargetRef};
pub use spec::MappingSpecification;
pub use template::{Segment, Template};
pub use triples_map::{SubjectSpec, TriplesMap};
