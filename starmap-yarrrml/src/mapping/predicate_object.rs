//! Predicate-object specifications
//!
//! After building, every entry holds exactly one predicate and one object:
//! the builder has already expanded `m` predicates × `n` objects.

use serde::{Deserialize, Serialize};

use super::{MappingRef, QuotedRef, Template, UnevaluatedExpr};

/// Term kind of a generated object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Iri,
    #[default]
    Literal,
}

impl TermKind {
    pub fn is_iri(&self) -> bool {
        matches!(self, TermKind::Iri)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, TermKind::Literal)
    }
}

/// A template-built object term
///
/// `datatype` and `language` are never both set, and neither is set on an
/// IRI object. Either may itself be a per-row template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTerm {
    pub template: Template,
    pub kind: TermKind,
    pub datatype: Option<Template>,
    pub language: Option<Template>,
}

impl ObjectTerm {
    pub fn literal(template: Template) -> Self {
        Self {
            template,
            kind: TermKind::Literal,
            datatype: None,
            language: None,
        }
    }

    pub fn iri(template: Template) -> Self {
        Self {
            template,
            kind: TermKind::Iri,
            datatype: None,
            language: None,
        }
    }
}

/// What the object position of a predicate-object entry produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectSpec {
    Term(ObjectTerm),
    /// Subjects of another mapping (`mapping:`)
    Reference(MappingRef),
    /// Triples of another mapping (`quoted:` in object position)
    Quoted(QuotedRef),
    /// Function-valued object, not evaluated by this engine
    Function(UnevaluatedExpr),
}

impl ObjectSpec {
    /// Whether the object is usable in subject position (for inverse predicates)
    pub fn is_resource(&self) -> bool {
        match self {
            ObjectSpec::Term(t) => t.kind.is_iri(),
            ObjectSpec::Reference(_) | ObjectSpec::Quoted(_) => true,
            ObjectSpec::Function(_) => false,
        }
    }

    /// Name of the mapping this object draws from, if any
    pub fn referenced_mapping(&self) -> Option<&str> {
        match self {
            ObjectSpec::Reference(r) => Some(&r.mapping),
            ObjectSpec::Quoted(q) => Some(&q.mapping),
            _ => None,
        }
    }

    pub fn as_term(&self) -> Option<&ObjectTerm> {
        match self {
            ObjectSpec::Term(t) => Some(t),
            _ => None,
        }
    }
}

/// One (predicate, object) pair with its per-entry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateObjectSpec {
    pub predicate: Template,
    pub object: ObjectSpec,
    /// Emits the mirrored `(object, inverse, subject)` quad as well
    pub inverse_predicate: Option<Template>,
    /// Overrides subject- and mapping-level graphs when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graphs: Vec<Template>,
    pub condition: Option<UnevaluatedExpr>,
}

impl PredicateObjectSpec {
    pub fn new(predicate: Template, object: ObjectSpec) -> Self {
        Self {
            predicate,
            object,
            inverse_predicate: None,
            graphs: Vec::new(),
            condition: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_is_resource() {
        let lit = ObjectSpec::Term(ObjectTerm::literal(Template::parse("$(name)").unwrap()));
        let iri = ObjectSpec::Term(ObjectTerm::iri(Template::parse("$(homepage)").unwrap()));
        let quoted = ObjectSpec::Quoted(QuotedRef::new("student"));

        assert!(!lit.is_resource());
        assert!(iri.is_resource());
        assert!(quoted.is_resource());
        assert_eq!(quoted.referenced_mapping(), Some("student"));
        assert_eq!(iri.referenced_mapping(), None);
    }
}
