use thiserror::Error;

/// Errors raised when a term or quad would violate the RDF-star model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("literal \"{value}\" cannot carry both datatype <{datatype}> and language '{language}'")]
    DatatypeAndLanguage {
        value: String,
        datatype: String,
        language: String,
    },

    #[error("quoted triples cannot be nested: {0}")]
    NestedQuote(String),

    #[error("invalid subject term {0}: must be an IRI or quoted triple")]
    InvalidSubject(String),

    #[error("invalid predicate term {0}: must be an IRI")]
    InvalidPredicate(String),
}

pub type Result<T> = std::result::Result<T, IrError>;
