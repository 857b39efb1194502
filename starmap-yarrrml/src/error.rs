//! Mapping error types
//!
//! Everything here is fatal and raised before any quad is emitted. Row-level
//! problems are reported as [`crate::engine::RowDiagnostic`] instead.

use thiserror::Error;

/// Build-phase and run-setup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Structural problem in a mapping: missing subject, conflicting
    /// shortcut and long-form fields, unsupported construct
    #[error("Invalid mapping '{mapping}': {message}")]
    Validation { mapping: String, message: String },

    /// A mapping names a source that the document does not define
    #[error("Mapping '{mapping}' references unknown source '{source_name}'")]
    UnknownSource {
        mapping: String,
        source_name: String,
    },

    /// A mapping names a target that the document does not define
    #[error("Mapping '{mapping}' references unknown target '{target_name}'")]
    UnknownTarget {
        mapping: String,
        target_name: String,
    },

    /// Template syntax error
    #[error("Invalid template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    /// Reference to a mapping that does not exist
    #[error("Mapping '{mapping}' references unknown mapping '{reference}'")]
    UnknownTriplesMap { mapping: String, reference: String },

    /// Quoted references loop back on themselves
    #[error("Quoted mapping references form a cycle: {}", .0.join(" -> "))]
    ReferenceCycle(Vec<String>),

    /// The table provider has nothing for one of a mapping's sources
    #[error("No table provided for source '{source_key}' of mapping '{mapping}'")]
    MissingTable { mapping: String, source_key: String },

    /// Generation stopped by the caller
    #[error("Generation cancelled")]
    Cancelled,

    /// The document is not shaped like a mapping document at all
    #[error("Invalid mapping document: {0}")]
    Document(String),
}

impl MappingError {
    pub fn validation(mapping: impl Into<String>, message: impl Into<String>) -> Self {
        MappingError::Validation {
            mapping: mapping.into(),
            message: message.into(),
        }
    }

    /// Whether this error describes a malformed mapping specification
    /// (as opposed to a missing collaborator or a cancelled run).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MappingError::Validation { .. }
                | MappingError::InvalidTemplate { .. }
                | MappingError::UnknownTriplesMap { .. }
                | MappingError::ReferenceCycle(_)
                | MappingError::Document(_)
        )
    }
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
