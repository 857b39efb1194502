//! RDF vocabulary constants for the starmap crates
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `dcat` / `dct` - dataset description vocabularies used for run metadata
//! - `prov` - provenance terms common in statement annotations
//! - `namespaces` - prefix/namespace pairs seeded into every mapping

/// RDF vocabulary constants
pub mod rdf {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// XSD vocabulary constants
pub mod xsd {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:decimal IRI
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    /// xsd:double IRI
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:date IRI
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// DCAT vocabulary constants
pub mod dcat {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/dcat#";

    /// dcat:Dataset class IRI
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
}

/// Dublin Core terms
pub mod dct {
    /// Namespace IRI
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
}

/// PROV-O terms commonly used in statement annotations
pub mod prov {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/prov#";

    pub const WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";
    pub const WAS_ATTRIBUTED_TO: &str = "http://www.w3.org/ns/prov#wasAttributedTo";
}

/// Prefixes that every mapping document sees, whether or not it declares them.
pub mod namespaces {
    /// (prefix, namespace) pairs in declaration order.
    pub const STANDARD: &[(&str, &str)] = &[
        ("rdf", super::rdf::NS),
        ("rdfs", super::rdfs::NS),
        ("xsd", super::xsd::NS),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_live_in_their_namespace() {
        assert!(rdf::TYPE.starts_with(rdf::NS));
        assert!(xsd::DATE_TIME.starts_with(xsd::NS));
        assert!(dcat::DATASET.starts_with(dcat::NS));
        assert!(dct::CREATOR.starts_with(dct::NS));
    }

    #[test]
    fn test_standard_prefixes() {
        let names: Vec<_> = namespaces::STANDARD.iter().map(|(p, _)| *p).collect();
        assert_eq!(names, vec!["rdf", "rdfs", "xsd"]);
    }
}
