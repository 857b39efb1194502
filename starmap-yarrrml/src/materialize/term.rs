//! Compiled term templates
//!
//! A [`CompiledTerm`] is built once per template and mapping. Constant parts
//! are prefix-expanded up front and placeholders become numbered slots, so
//! per-row work is only value lookup, encoding and string assembly.

use std::borrow::Cow;

use starmap_graph_ir::{Literal, Term};
use starmap_tabular::SourceTable;
use thiserror::Error;

use super::resolver::TermResolver;
use super::row::{Lookup, RowValues};
use crate::error::{MappingError, MappingResult};
use crate::mapping::{ObjectTerm, Segment, Template, TermKind};

/// Why a term could not be built for one row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermFailure {
    #[error("column '{0}' is not present in the row")]
    MissingColumn(String),

    #[error("column '{0}' is null")]
    NullValue(String),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Slot(usize),
}

/// Template segments with column names replaced by slot numbers
#[derive(Debug, Clone, PartialEq)]
struct Pattern {
    pieces: Vec<Piece>,
}

impl Pattern {
    fn compile(segments: &[Segment], columns: &mut Vec<String>) -> Self {
        let pieces = segments
            .iter()
            .map(|seg| match seg {
                Segment::Literal(text) => Piece::Text(text.clone()),
                Segment::Column(name) => {
                    let slot = match columns.iter().position(|c| c == name) {
                        Some(i) => i,
                        None => {
                            columns.push(name.clone());
                            columns.len() - 1
                        }
                    };
                    Piece::Slot(slot)
                }
            })
            .collect();
        Self { pieces }
    }

    /// Fill the slots. `encode` applies to slot values only.
    fn render(
        &self,
        columns: &[String],
        values: &[Lookup<'_>],
        encode: Option<&TermResolver>,
    ) -> Result<String, TermFailure> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Slot(slot) => {
                    let value = slot_value(columns, values, *slot)?;
                    match encode {
                        Some(resolver) => out.push_str(&resolver.encoding().encode(value)),
                        None => out.push_str(value),
                    }
                }
            }
        }
        Ok(out)
    }
}

fn slot_value<'v>(
    columns: &[String],
    values: &'v [Lookup<'_>],
    slot: usize,
) -> Result<&'v str, TermFailure> {
    match &values[slot] {
        Lookup::Value(v) => Ok(v.as_ref()),
        Lookup::Null => Err(TermFailure::NullValue(columns[slot].clone())),
        Lookup::Missing => Err(TermFailure::MissingColumn(columns[slot].clone())),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum IriShape {
    /// `$(col)`: the value is an IRI reference on its own
    WholeValue(usize),
    /// Fixed, already expanded start followed by encoded placeholders
    Headed { head: String, rest: Pattern },
    /// Starts with a placeholder: render, then expand
    Open(Pattern),
}

#[derive(Debug, Clone, PartialEq)]
enum Annotation {
    Fixed(String),
    /// Per-row template, rendered verbatim
    Row(Pattern),
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Constant(Term),
    Iri(IriShape),
    Literal {
        value: Pattern,
        datatype: Option<Annotation>,
        language: Option<Annotation>,
    },
}

/// A template compiled against a [`TermResolver`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTerm {
    shape: Shape,
    /// Column name per slot
    columns: Vec<String>,
}

fn compile_failure(template: &Template, failure: TermFailure) -> MappingError {
    MappingError::InvalidTemplate {
        template: template.to_string(),
        message: failure.to_string(),
    }
}

impl CompiledTerm {
    /// Compile a template producing IRIs (subjects, predicates, graphs and
    /// IRI objects).
    pub fn iri(template: &Template, resolver: &TermResolver) -> MappingResult<Self> {
        let mut columns = Vec::new();

        if let Some(constant) = template.as_constant() {
            let iri = resolver
                .expand_iri(&constant)
                .map_err(|f| compile_failure(template, f))?;
            return Ok(Self {
                shape: Shape::Constant(Term::iri(iri)),
                columns,
            });
        }

        let shape = match template.segments() {
            [Segment::Column(name)] => {
                columns.push(name.clone());
                IriShape::WholeValue(0)
            }
            [Segment::Literal(head), rest @ ..] => IriShape::Headed {
                head: resolver.expand_head(head),
                rest: Pattern::compile(rest, &mut columns),
            },
            segments => IriShape::Open(Pattern::compile(segments, &mut columns)),
        };
        Ok(Self {
            shape: Shape::Iri(shape),
            columns,
        })
    }

    /// Compile a literal template with optional datatype or language.
    ///
    /// The datatype is prefix-expanded, the language used as written.
    pub fn literal(
        template: &Template,
        datatype: Option<&Template>,
        language: Option<&Template>,
        resolver: &TermResolver,
    ) -> MappingResult<Self> {
        let mut columns = Vec::new();

        let datatype = match datatype {
            None => None,
            Some(dt) => Some(match dt.as_constant() {
                Some(c) => {
                    let iri = resolver.expand_iri(&c).map_err(|f| compile_failure(dt, f))?;
                    Annotation::Fixed(iri)
                }
                None => Annotation::Row(Pattern::compile(dt.segments(), &mut columns)),
            }),
        };
        let language = language.map(|lang| match lang.as_constant() {
            Some(c) => Annotation::Fixed(c),
            None => Annotation::Row(Pattern::compile(lang.segments(), &mut columns)),
        });

        if let Some(value) = template.as_constant() {
            match (&datatype, &language) {
                (None | Some(Annotation::Fixed(_)), None | Some(Annotation::Fixed(_))) => {
                    let fixed = |a: &Option<Annotation>| match a {
                        Some(Annotation::Fixed(s)) => Some(s.clone()),
                        _ => None,
                    };
                    let literal = make_literal(&value, fixed(&datatype), fixed(&language))
                        .map_err(|f| compile_failure(template, f))?;
                    return Ok(Self {
                        shape: Shape::Constant(Term::Literal(literal)),
                        columns,
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            shape: Shape::Literal {
                value: Pattern::compile(template.segments(), &mut columns),
                datatype,
                language,
            },
            columns,
        })
    }

    /// Compile an object term according to its kind.
    pub fn object(term: &ObjectTerm, resolver: &TermResolver) -> MappingResult<Self> {
        match term.kind {
            TermKind::Iri => Self::iri(&term.template, resolver),
            TermKind::Literal => Self::literal(
                &term.template,
                term.datatype.as_ref(),
                term.language.as_ref(),
                resolver,
            ),
        }
    }

    /// Columns this term reads, in slot order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.shape, Shape::Constant(_))
    }

    /// Build the term for one row.
    pub fn resolve<R: RowValues + ?Sized>(
        &self,
        resolver: &TermResolver,
        row: &R,
    ) -> Result<Term, TermFailure> {
        if let Shape::Constant(term) = &self.shape {
            return Ok(term.clone());
        }
        let values: Vec<Lookup<'_>> = self.columns.iter().map(|c| row.lookup(c)).collect();
        self.build(resolver, &values)
    }

    /// Build the term for every row of a table.
    ///
    /// Column names are bound to table columns once; a column the table
    /// lacks fails every row with [`TermFailure::MissingColumn`].
    pub fn materialize_column(
        &self,
        resolver: &TermResolver,
        table: &SourceTable,
    ) -> Vec<Result<Term, TermFailure>> {
        if let Shape::Constant(term) = &self.shape {
            return vec![Ok(term.clone()); table.num_rows];
        }

        let bound: Vec<_> = self
            .columns
            .iter()
            .map(|c| table.column_by_name(c))
            .collect();

        let mut values: Vec<Lookup<'_>> = Vec::with_capacity(bound.len());
        table
            .row_indices()
            .map(|row| {
                values.clear();
                values.extend(bound.iter().map(|col| match col {
                    Some(col) => col.value_str(row).map_or(Lookup::Null, Lookup::Value),
                    None => Lookup::Missing,
                }));
                self.build(resolver, &values)
            })
            .collect()
    }

    fn build(&self, resolver: &TermResolver, values: &[Lookup<'_>]) -> Result<Term, TermFailure> {
        match &self.shape {
            Shape::Constant(term) => Ok(term.clone()),
            Shape::Iri(IriShape::WholeValue(slot)) => {
                let value = slot_value(&self.columns, values, *slot)?;
                Ok(Term::iri(resolver.resolve_reference(value)?))
            }
            Shape::Iri(IriShape::Headed { head, rest }) => {
                let tail = rest.render(&self.columns, values, Some(resolver))?;
                let mut iri = String::with_capacity(head.len() + tail.len());
                iri.push_str(head);
                iri.push_str(&tail);
                Ok(Term::iri(iri))
            }
            Shape::Iri(IriShape::Open(pattern)) => {
                let rendered = pattern.render(&self.columns, values, Some(resolver))?;
                Ok(Term::iri(resolver.expand_iri(&rendered)?))
            }
            Shape::Literal {
                value,
                datatype,
                language,
            } => {
                let lexical = value.render(&self.columns, values, None)?;
                let datatype = match datatype {
                    None => None,
                    Some(Annotation::Fixed(dt)) => Some(Cow::Borrowed(dt.as_str())),
                    Some(Annotation::Row(p)) => Some(Cow::Owned(
                        resolver.expand_iri(&p.render(&self.columns, values, None)?)?,
                    )),
                };
                let language = match language {
                    None => None,
                    Some(Annotation::Fixed(lang)) => Some(Cow::Borrowed(lang.as_str())),
                    Some(Annotation::Row(p)) => {
                        Some(Cow::Owned(p.render(&self.columns, values, None)?))
                    }
                };
                make_literal(&lexical, datatype, language).map(Term::Literal)
            }
        }
    }
}

fn make_literal<D, L>(
    value: &str,
    datatype: Option<D>,
    language: Option<L>,
) -> Result<Literal, TermFailure>
where
    D: AsRef<str>,
    L: AsRef<str>,
{
    let datatype: Option<&str> = datatype.as_ref().map(|d| d.as_ref());
    let language: Option<&str> = language.as_ref().map(|l| l.as_ref());
    if language == Some("") {
        return Err(TermFailure::Invalid("empty language tag".to_string()));
    }
    Literal::new(value, datatype, language).map_err(|e| TermFailure::Invalid(e.to_string()))
}
