//! Generation configuration

use serde::{Deserialize, Serialize};

use crate::materialize::IriEncoding;

/// Default cap on diagnostics kept in memory (all are still counted).
pub const DEFAULT_MAX_RECORDED_DIAGNOSTICS: usize = 1000;

/// Describes the generated dataset as a `dcat:Dataset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// IRI of the dataset resource (prefixed names are expanded)
    pub iri: String,
    pub title: Option<String>,
}

impl DatasetMetadata {
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Options for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Encoding of column values embedded in IRI templates
    ///
    /// Default: `Percent`
    pub iri_encoding: IriEncoding,

    /// Run independent triples maps of one plan level on the rayon pool.
    ///
    /// Output order is the same either way.
    /// Default: false
    pub parallel: bool,

    /// How many row diagnostics [`super::Diagnostics`] keeps verbatim.
    ///
    /// Default: 1000
    pub max_recorded_diagnostics: usize,

    /// Emit a dataset description before the mapped quads.
    ///
    /// Default: None
    pub dataset_metadata: Option<DatasetMetadata>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            iri_encoding: IriEncoding::default(),
            parallel: false,
            max_recorded_diagnostics: DEFAULT_MAX_RECORDED_DIAGNOSTICS,
            dataset_metadata: None,
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iri_encoding(mut self, encoding: IriEncoding) -> Self {
        self.iri_encoding = encoding;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_max_recorded_diagnostics(mut self, max: usize) -> Self {
        self.max_recorded_diagnostics = max;
        self
    }

    pub fn with_dataset_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.dataset_metadata = Some(metadata);
        self
    }
}
