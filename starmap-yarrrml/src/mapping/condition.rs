//! Cross-mapping references and their join conditions
//!
//! Both RDF-star quoting (`quoted:`) and interlinking objects (`mapping:`)
//! align rows of two mappings on equality of column values.

use serde::{Deserialize, Serialize};
use starmap_graph_ir::Quad;

/// One equality pair of a join
///
/// `child` is a column of the referencing mapping's source, `parent` a
/// column of the referenced mapping's source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinKey {
    pub child: String,
    pub parent: String,
}

impl JoinKey {
    pub fn new(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
        }
    }
}

/// Equality join between two mappings (composite when several keys)
///
/// Keys are kept sorted and free of duplicates so that two references with
/// the same keys share one join index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCondition {
    keys: Vec<JoinKey>,
}

impl JoinCondition {
    /// Returns `None` for an empty key list: a join without keys would pair
    /// every row with every row.
    pub fn new(mut keys: Vec<JoinKey>) -> Option<Self> {
        if keys.is_empty() {
            return None;
        }
        keys.sort();
        keys.dedup();
        Some(Self { keys })
    }

    pub fn single(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            keys: vec![JoinKey::new(child, parent)],
        }
    }

    pub fn keys(&self) -> &[JoinKey] {
        &self.keys
    }

    pub fn child_columns(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.child.as_str()).collect()
    }

    pub fn parent_columns(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.parent.as_str()).collect()
    }
}

/// Restricts which quads of a matched base row get quoted
///
/// Empty lists mean "no restriction". Entries are expanded IRIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graphs: Vec<String>,
}

impl QuoteFilter {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.graphs.is_empty()
    }

    /// Whether a base quad passes the filter
    pub fn accepts(&self, quad: &Quad) -> bool {
        let predicate_ok = self.predicates.is_empty()
            || quad
                .predicate
                .as_iri()
                .map_or(false, |p| self.predicates.iter().any(|f| f == p));
        let graph_ok = self.graphs.is_empty()
            || quad
                .graph
                .as_deref()
                .map_or(false, |g| self.graphs.iter().any(|f| f == g));
        predicate_ok && graph_ok
    }
}

/// Reference to the triples another mapping generates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedRef {
    /// Name of the quoted (base) mapping
    pub mapping: String,
    /// `false` for `quotedNonAsserted`: the quoted triple should not also
    /// stand as a plain triple. Advisory only, the base mapping still runs.
    pub asserted: bool,
    /// Without a condition, rows are paired by position over a shared source.
    pub condition: Option<JoinCondition>,
    #[serde(default)]
    pub filter: QuoteFilter,
}

impl QuotedRef {
    pub fn new(mapping: impl Into<String>) -> Self {
        Self {
            mapping: mapping.into(),
            asserted: true,
            condition: None,
            filter: QuoteFilter::default(),
        }
    }

    pub fn non_asserted(mut self) -> Self {
        self.asserted = false;
        self
    }

    pub fn with_condition(mut self, condition: JoinCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_filter(mut self, filter: QuoteFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Interlinking object: the subjects of another mapping used as IRI objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRef {
    pub mapping: String,
    pub condition: Option<JoinCondition>,
}
