//! Dataset description quads

use starmap_graph_ir::{Quad, Term};
use starmap_vocab::{dcat, dct, rdf};

use super::options::DatasetMetadata;
use crate::error::{MappingError, MappingResult};
use crate::mapping::Author;
use crate::materialize::TermResolver;

/// Describe the dataset as a `dcat:Dataset` with its title and creators.
///
/// Each author becomes one `dct:creator`: the WebID when given, else the
/// name as a literal, else a `mailto:` IRI, else the website.
pub(crate) fn dataset_quads(
    metadata: &DatasetMetadata,
    authors: &[Author],
    resolver: &TermResolver,
) -> MappingResult<Vec<Quad>> {
    let iri = resolver
        .expand_iri(&metadata.iri)
        .map_err(|f| MappingError::Document(format!("dataset IRI: {}", f)))?;
    let dataset = Term::iri(iri);

    let mut quads = vec![Quad::new(
        dataset.clone(),
        Term::iri(rdf::TYPE),
        Term::iri(dcat::DATASET),
        None,
    )];

    if let Some(title) = &metadata.title {
        quads.push(Quad::new(
            dataset.clone(),
            Term::iri(dct::TITLE),
            Term::string(title),
            None,
        ));
    }

    for author in authors {
        let creator = if let Some(webid) = &author.webid {
            Term::iri(webid)
        } else if let Some(name) = &author.name {
            Term::string(name)
        } else if let Some(email) = &author.email {
            Term::iri(format!("mailto:{}", email))
        } else if let Some(website) = &author.website {
            Term::iri(website)
        } else {
            continue;
        };
        quads.push(Quad::new(dataset.clone(), Term::iri(dct::CREATOR), creator, None));
    }

    Ok(quads)
}
