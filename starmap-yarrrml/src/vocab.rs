//! YARRRML document keywords
//!
//! Each concept has one canonical key followed by the shortcut spellings the
//! builder accepts for it. The canonical key is always the first entry.
//!
//! # Usage
//!
//! ```
//! use starmap_yarrrml::YARRRML;
//!
//! assert_eq!(YARRRML::SUBJECTS[0], "subjects");
//! assert!(YARRRML::PREDICATE_OBJECTS.contains(&"po"));
//! ```

/// YARRRML keywords and their aliases
pub struct YARRRML;

impl YARRRML {
    // ==========================================================================
    // Document sections
    // ==========================================================================

    pub const MAPPINGS: &'static [&'static str] = &["mappings", "mapping"];
    pub const PREFIXES: &'static [&'static str] = &["prefixes"];
    pub const BASE: &'static [&'static str] = &["base"];
    pub const AUTHORS: &'static [&'static str] = &["authors", "author"];
    pub const EXTERNAL: &'static [&'static str] = &["external"];

    // ==========================================================================
    // Mapping sections
    // ==========================================================================

    pub const SOURCES: &'static [&'static str] = &["sources", "source"];
    pub const TARGETS: &'static [&'static str] = &["targets", "target"];
    pub const SUBJECTS: &'static [&'static str] = &["subjects", "subject", "s"];
    pub const PREDICATE_OBJECTS: &'static [&'static str] =
        &["predicateobjects", "predicateobject", "po"];
    pub const GRAPHS: &'static [&'static str] = &["graphs", "graph", "g"];
    pub const CONDITION: &'static [&'static str] = &["condition", "conditions"];

    // ==========================================================================
    // Predicate-object entries
    // ==========================================================================

    pub const PREDICATES: &'static [&'static str] = &["predicates", "predicate", "p"];
    pub const OBJECTS: &'static [&'static str] = &["objects", "object", "o"];
    pub const INVERSE_PREDICATES: &'static [&'static str] =
        &["inversepredicates", "inversepredicate", "i"];

    // ==========================================================================
    // Object and subject entries
    // ==========================================================================

    pub const VALUE: &'static [&'static str] = &["value", "v"];
    pub const TYPE: &'static [&'static str] = &["type"];
    pub const DATATYPE: &'static [&'static str] = &["datatype"];
    pub const LANGUAGE: &'static [&'static str] = &["language"];
    pub const MAPPING: &'static [&'static str] = &["mapping"];
    pub const QUOTED: &'static [&'static str] = &["quoted"];
    pub const QUOTED_NON_ASSERTED: &'static [&'static str] = &["quotedNonAsserted"];

    // ==========================================================================
    // Functions and conditions
    // ==========================================================================

    pub const FUNCTION: &'static [&'static str] = &["function", "fn", "f"];
    pub const PARAMETERS: &'static [&'static str] = &["parameters", "pms"];
    pub const PARAMETER: &'static [&'static str] = &["parameter", "pm"];
    pub const FROM: &'static [&'static str] = &["from"];

    // ==========================================================================
    // Source and target descriptors
    // ==========================================================================

    pub const ACCESS: &'static [&'static str] = &["access"];
    pub const REFERENCE_FORMULATION: &'static [&'static str] = &["referenceFormulation"];
    pub const ITERATOR: &'static [&'static str] = &["iterator"];
    pub const QUERY: &'static [&'static str] = &["query"];
    pub const DELIMITER: &'static [&'static str] = &["delimiter"];
    pub const SERIALIZATION: &'static [&'static str] = &["serialization"];
    pub const COMPRESSION: &'static [&'static str] = &["compression"];

    // ==========================================================================
    // Authors
    // ==========================================================================

    pub const NAME: &'static [&'static str] = &["name"];
    pub const EMAIL: &'static [&'static str] = &["email"];
    pub const WEBSITE: &'static [&'static str] = &["website"];
    pub const WEBID: &'static [&'static str] = &["webid"];

    // ==========================================================================
    // Values
    // ==========================================================================

    /// Shortcut predicate for `rdf:type`
    pub const A: &'static str = "a";

    /// Object suffix marking an IRI
    pub const IRI_SUFFIX: &'static str = "~iri";

    /// Modifier suffix marking a language tag
    pub const LANG_SUFFIX: &'static str = "~lang";

    /// The only join function the engine evaluates
    pub const EQUAL: &'static str = "equal";

    /// Inline subject function that quotes another mapping
    pub const JOIN: &'static str = "join";

    /// Prefix marking an external reference inside `$(...)`
    pub const EXTERNAL_MARKER: char = '_';
}
