//! Error types for the `faultline-manifest` crate.

use faultline_core::TaxonomyError;

/// Errors that can occur when loading or installing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the manifest file from disk.
    #[error("failed to read manifest file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse manifest YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A base or parent names a type that is not declared (yet).
    #[error("unknown reference `{reference}` in {context}")]
    UnknownReference {
        /// The reference as written.
        reference: String,
        /// Where the reference appeared.
        context: String,
    },

    /// The registry rejected a declaration.
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

impl From<serde_yml::Error> for ManifestError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
