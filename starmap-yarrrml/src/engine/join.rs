//! RDF-star join resolution
//!
//! Quoting and interlinking both align a child row with parent rows on
//! equality of column values. Indexes are built from the parent's source
//! tables once per (parent map, parent columns) and shared by every child
//! that needs them, so a join costs one hash probe per child row.
//!
//! Positions are `(table, row)` pairs: a map with several sources reads
//! several tables.

use std::collections::HashMap;
use std::ops::Range;

use starmap_graph_ir::{Quad, Term};
use starmap_tabular::{Column, SourceTable};
use tracing::warn;

use super::generate::MapOutput;
use crate::mapping::{JoinCondition, QuoteFilter};
use crate::materialize::{CompiledTerm, TermFailure, TermResolver};

/// Row position within a map's tables
pub type RowPosition = (usize, usize);

/// Identifies a shared index: parent map name and parent key columns.
/// An empty column list means positional alignment.
pub(crate) type IndexKey = (String, Vec<String>);

pub(crate) fn index_key(parent: &str, condition: Option<&JoinCondition>) -> IndexKey {
    (
        parent.to_string(),
        condition
            .map(|c| c.parent_columns().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
    )
}

/// Join columns of one table, bound once
pub(crate) struct KeyColumns<'a> {
    columns: Vec<&'a Column>,
}

impl<'a> KeyColumns<'a> {
    /// Fails with the first column the table lacks.
    pub(crate) fn bind(table: &'a SourceTable, names: &[&str]) -> Result<Self, TermFailure> {
        let columns = names
            .iter()
            .map(|&name| {
                table
                    .column_by_name(name)
                    .ok_or_else(|| TermFailure::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    /// Key tuple of a row, `None` when any key value is null.
    pub(crate) fn key(&self, row: usize) -> Option<Vec<String>> {
        self.columns
            .iter()
            .map(|c| c.value_str(row).map(|v| v.into_owned()))
            .collect()
    }
}

/// Parent key tuple → parent row positions
#[derive(Debug, Clone, Default)]
pub struct QuoteIndex {
    positions: HashMap<Vec<String>, Vec<RowPosition>>,
}

impl QuoteIndex {
    /// Index every parent row by its key. Rows with a null key are left
    /// out, so they never match.
    pub fn build(tables: &[&SourceTable], columns: &[&str]) -> Self {
        let mut positions: HashMap<Vec<String>, Vec<RowPosition>> = HashMap::new();
        for (t, table) in tables.iter().enumerate() {
            let keys = match KeyColumns::bind(table, columns) {
                Ok(keys) => keys,
                Err(failure) => {
                    warn!(%failure, "join index built without rows of a table");
                    continue;
                }
            };
            for row in table.row_indices() {
                if let Some(key) = keys.key(row) {
                    positions.entry(key).or_default().push((t, row));
                }
            }
        }
        Self { positions }
    }

    /// Parent rows with this key, in table and row order
    pub fn lookup(&self, key: &[String]) -> &[RowPosition] {
        self.positions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Subject terms of a parent map, for `mapping:` objects
#[derive(Debug, Clone, Default)]
pub struct SubjectIndex {
    /// table → row → subjects (one per subject template that resolved)
    subjects: Vec<Vec<Vec<Term>>>,
    /// `None` for positional alignment
    keys: Option<QuoteIndex>,
}

impl SubjectIndex {
    pub fn build(
        tables: &[&SourceTable],
        subject_terms: &[CompiledTerm],
        resolver: &TermResolver,
        parent_columns: Option<&[&str]>,
    ) -> Self {
        let subjects = tables
            .iter()
            .map(|table| {
                let columns: Vec<Vec<Result<Term, TermFailure>>> = subject_terms
                    .iter()
                    .map(|t| t.materialize_column(resolver, table))
                    .collect();
                table
                    .row_indices()
                    .map(|row| {
                        columns
                            .iter()
                            .filter_map(|col| col[row].as_ref().ok().cloned())
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self {
            subjects,
            keys: parent_columns.map(|cols| QuoteIndex::build(tables, cols)),
        }
    }

    /// Subjects of the parent row at the same position
    pub fn at(&self, position: RowPosition) -> &[Term] {
        self.subjects
            .get(position.0)
            .and_then(|rows| rows.get(position.1))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Subjects of every parent row with this key
    pub fn by_key(&self, key: &[String]) -> Vec<Term> {
        match &self.keys {
            Some(index) => index
                .lookup(key)
                .iter()
                .flat_map(|&pos| self.at(pos).iter().cloned())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Quads a base map emitted for one of its rows
pub(crate) fn row_quads(output: &MapOutput, position: RowPosition) -> &[Quad] {
    let range: Range<usize> = output
        .spans
        .get(position.0)
        .and_then(|rows| rows.get(position.1))
        .cloned()
        .unwrap_or(0..0);
    &output.quads[range]
}

/// Quote the base quads of the matched rows.
///
/// Every accepted quad becomes one quoted triple, so a statement emitted into
/// several graphs is quoted once per graph. Quads that already hold a quoted
/// term are skipped.
pub(crate) fn quote_rows(
    output: &MapOutput,
    positions: &[RowPosition],
    filter: &QuoteFilter,
) -> Vec<Term> {
    let mut quoted = Vec::new();
    for &pos in positions {
        for quad in row_quads(output, pos) {
            if quad.has_quoted_term() || !filter.accepts(quad) {
                continue;
            }
            if let Ok(triple) = quad.to_quoted() {
                quoted.push(Term::quoted(triple));
            }
        }
    }
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Template;
    use std::sync::Arc;

    fn table(rows: serde_json::Value) -> SourceTable {
        SourceTable::from_json(&rows).unwrap()
    }

    #[test]
    fn test_quote_index_lookup() {
        let base = table(serde_json::json!([
            {"id": "1", "kind": "a"},
            {"id": "2", "kind": "b"},
            {"id": "1", "kind": "c"},
            {"id": null, "kind": "d"},
        ]));
        let index = QuoteIndex::build(&[&base], &["id"]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&["1".to_string()]), &[(0, 0), (0, 2)]);
        assert_eq!(index.lookup(&["2".to_string()]), &[(0, 1)]);
        assert!(index.lookup(&["3".to_string()]).is_empty());
    }

    #[test]
    fn test_quote_index_composite_and_missing_column() {
        let base = table(serde_json::json!([{"a": "x", "b": "y"}]));
        let composite = QuoteIndex::build(&[&base], &["a", "b"]);
        assert_eq!(
            composite.lookup(&["x".to_string(), "y".to_string()]),
            &[(0, 0)]
        );

        let missing = QuoteIndex::build(&[&base], &["nope"]);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_subject_index() {
        let people = table(serde_json::json!([
            {"ID": "10", "name": "Ann"},
            {"ID": "11", "name": "Bob"},
        ]));
        let resolver = TermResolver::default();
        let subject = CompiledTerm::iri(
            &Template::parse("http://example.org/p/$(ID)").unwrap(),
            &resolver,
        )
        .unwrap();

        let index = SubjectIndex::build(&[&people], &[subject], &resolver, Some(&["ID"]));
        assert_eq!(
            index.by_key(&["11".to_string()]),
            vec![Term::iri("http://example.org/p/11")]
        );
        assert_eq!(index.at((0, 0)), &[Term::iri("http://example.org/p/10")]);
        assert!(index.by_key(&["12".to_string()]).is_empty());
    }

    #[test]
    fn test_quote_rows_keeps_repeated_triples() {
        let s = Term::iri("http://example.org/s");
        let p = Term::iri("http://example.org/p");
        let q = Term::iri("http://example.org/q");
        let g1: Option<Arc<str>> = Some(Arc::from("http://example.org/g1"));
        let g2: Option<Arc<str>> = Some(Arc::from("http://example.org/g2"));
        let output = MapOutput {
            quads: vec![
                Quad::new(s.clone(), p.clone(), Term::string("a"), g1.clone()),
                Quad::new(s.clone(), p.clone(), Term::string("a"), g2),
                Quad::new(s.clone(), q.clone(), Term::string("b"), g1),
            ],
            spans: vec![vec![0..3]],
            ..Default::default()
        };

        let all = quote_rows(&output, &[(0, 0)], &QuoteFilter::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], all[1]);

        let only_g1 = QuoteFilter {
            predicates: vec![],
            graphs: vec!["http://example.org/g1".to_string()],
        };
        assert_eq!(quote_rows(&output, &[(0, 0)], &only_g1).len(), 2);

        let only_q = QuoteFilter {
            predicates: vec!["http://example.org/q".to_string()],
            graphs: vec![],
        };
        let narrowed = quote_rows(&output, &[(0, 0)], &only_q);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(
            narrowed[0].as_quoted().unwrap().predicate(),
            &Term::iri("http://example.org/q")
        );

        assert!(quote_rows(&output, &[(0, 5)], &QuoteFilter::default()).is_empty());
    }
}
