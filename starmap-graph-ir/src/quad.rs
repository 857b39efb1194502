//! Quads: a triple plus an optional named graph

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::term::{QuotedTriple, Term};

/// One generated statement
///
/// `graph` is `None` for the default graph. Quads are appended, never
/// mutated; duplicates are legal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Option<Arc<str>>,
}

impl Quad {
    pub fn new(subject: Term, predicate: Term, object: Term, graph: Option<Arc<str>>) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Quote this quad's triple, dropping the graph.
    ///
    /// Fails when the quad already carries a quoted term, since quoting
    /// is single-level.
    pub fn to_quoted(&self) -> Result<QuotedTriple> {
        QuotedTriple::new(
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        )
    }

    /// Whether any position holds a quoted triple
    pub fn has_quoted_term(&self) -> bool {
        self.subject.is_quoted() || self.object.is_quoted()
    }
}

/// N-Quads-star line without the trailing newline
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(g) = &self.graph {
            write!(f, " <{}>", g)?;
        }
        f.write_str(" .")
    }
}
