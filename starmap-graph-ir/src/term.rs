//! RDF-star terms: IRI, literal, and quoted triple
//!
//! A term can be:
//! - An IRI (always expanded, never prefixed)
//! - A literal (lexical form + optional datatype *or* optional language tag)
//! - A quoted triple, used in subject or object position only

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use starmap_vocab::{rdf, xsd};

use crate::error::{IrError, Result};

/// An RDF literal
///
/// `datatype` and `language` are mutually exclusive. A literal with neither
/// is a plain `xsd:string`; one with a language is an `rdf:langString`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    value: Arc<str>,
    datatype: Option<Arc<str>>,
    language: Option<Arc<str>>,
}

impl Literal {
    /// Create a literal, rejecting a datatype and language given together.
    pub fn new(
        value: impl AsRef<str>,
        datatype: Option<&str>,
        language: Option<&str>,
    ) -> Result<Self> {
        if let (Some(dt), Some(lang)) = (datatype, language) {
            return Err(IrError::DatatypeAndLanguage {
                value: value.as_ref().to_string(),
                datatype: dt.to_string(),
                language: lang.to_string(),
            });
        }
        Ok(Self {
            value: Arc::from(value.as_ref()),
            datatype: datatype.map(Arc::from),
            language: language.map(Arc::from),
        })
    }

    /// Plain string literal
    pub fn plain(value: impl AsRef<str>) -> Self {
        Self {
            value: Arc::from(value.as_ref()),
            datatype: None,
            language: None,
        }
    }

    /// Typed literal with an expanded datatype IRI
    pub fn typed(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Self {
            value: Arc::from(value.as_ref()),
            datatype: Some(Arc::from(datatype.as_ref())),
            language: None,
        }
    }

    /// Language-tagged literal
    pub fn lang(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            value: Arc::from(value.as_ref()),
            datatype: None,
            language: Some(Arc::from(language.as_ref())),
        }
    }

    /// Lexical form
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Explicit datatype, if one was given
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The datatype this literal has in RDF 1.1 terms
    pub fn effective_datatype(&self) -> &str {
        match (&self.datatype, &self.language) {
            (Some(dt), _) => dt,
            (None, Some(_)) => rdf::LANG_STRING,
            (None, None) => xsd::STRING,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.value.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{}", c)?,
            }
        }
        f.write_str("\"")?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{}>", dt)
        } else {
            Ok(())
        }
    }
}

/// A triple used as a term
///
/// # Invariants
///
/// - No component is itself a quoted triple.
/// - The subject is an IRI and the predicate is an IRI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuotedTriple {
    subject: Term,
    predicate: Term,
    object: Term,
}

impl QuotedTriple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Result<Self> {
        for term in [&subject, &predicate, &object] {
            if term.is_quoted() {
                return Err(IrError::NestedQuote(term.to_string()));
            }
        }
        if !subject.is_iri() {
            return Err(IrError::InvalidSubject(subject.to_string()));
        }
        if !predicate.is_iri() {
            return Err(IrError::InvalidPredicate(predicate.to_string()));
        }
        Ok(Self {
            subject,
            predicate,
            object,
        })
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn predicate(&self) -> &Term {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }
}

impl fmt::Display for QuotedTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<< {} {} {} >>", self.subject, self.predicate, self.object)
    }
}

/// An RDF-star term
///
/// # Invariants
///
/// - `Term::Iri` always contains an **expanded** IRI, never a prefixed form.
/// - The predicate position of a quad can only be `Term::Iri`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// Full expanded IRI (e.g., "http://schema.org/Person")
    Iri(Arc<str>),
    Literal(Literal),
    /// Quoted triple (RDF-star)
    Quoted(Arc<QuotedTriple>),
}

impl Term {
    /// Create an IRI term from an expanded IRI string
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    /// Create a plain string literal
    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::plain(value))
    }

    pub fn typed(value: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Term::Literal(Literal::typed(value, datatype))
    }

    pub fn lang_string(value: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Term::Literal(Literal::lang(value, language))
    }

    pub fn quoted(triple: QuotedTriple) -> Self {
        Term::Quoted(Arc::new(triple))
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self, Term::Quoted(_))
    }

    /// Try to get as IRI string
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_quoted(&self) -> Option<&QuotedTriple> {
        match self {
            Term::Quoted(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(lit) => write!(f, "{}", lit),
            Term::Quoted(t) => write!(f, "{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rejects_datatype_and_language() {
        let err = Literal::new("Brussels", Some(xsd::STRING), Some("en")).unwrap_err();
        assert!(matches!(err, IrError::DatatypeAndLanguage { .. }));

        let ok = Literal::new("Brussels", None, Some("en")).unwrap();
        assert_eq!(ok.language(), Some("en"));
        assert_eq!(ok.effective_datatype(), rdf::LANG_STRING);
    }

    #[test]
    fn test_effective_datatype() {
        assert_eq!(Literal::plain("x").effective_datatype(), xsd::STRING);
        assert_eq!(
            Literal::typed("1", xsd::INTEGER).effective_datatype(),
            xsd::INTEGER
        );
    }

    #[test]
    fn test_literal_display_escapes() {
        let lit = Literal::plain("say \"hi\"\n");
        assert_eq!(lit.to_string(), r#""say \"hi\"\n""#);
        assert_eq!(
            Term::typed("42", xsd::INTEGER).to_string(),
            format!("\"42\"^^<{}>", xsd::INTEGER)
        );
        assert_eq!(Term::lang_string("chat", "fr").to_string(), "\"chat\"@fr");
    }

    #[test]
    fn test_quoted_triple_invariants() {
        let s = Term::iri("http://example.org/s");
        let p = Term::iri("http://example.org/p");
        let o = Term::string("o");

        let inner = QuotedTriple::new(s.clone(), p.clone(), o.clone()).unwrap();
        assert_eq!(
            inner.to_string(),
            "<< <http://example.org/s> <http://example.org/p> \"o\" >>"
        );

        let nested = QuotedTriple::new(Term::quoted(inner), p.clone(), o.clone());
        assert!(matches!(nested, Err(IrError::NestedQuote(_))));

        let literal_subject = QuotedTriple::new(o.clone(), p.clone(), s.clone());
        assert!(matches!(literal_subject, Err(IrError::InvalidSubject(_))));

        let literal_predicate = QuotedTriple::new(s, o.clone(), o);
        assert!(matches!(literal_predicate, Err(IrError::InvalidPredicate(_))));
    }

    #[test]
    fn test_term_serde() {
        let term = Term::quoted(
            QuotedTriple::new(
                Term::iri("http://example.org/s"),
                Term::iri("http://example.org/p"),
                Term::lang_string("v", "en"),
            )
            .unwrap(),
        );
        let json = serde_json::to_string(&term).unwrap();
        let back: Term = serde_json::from_str(&json).unwrap();
        assert_eq!(term, back);
    }
}
