//! YAML manifests for Faultline taxonomies.
//!
//! A manifest describes externals and taxonomy nodes as data, so a
//! hierarchy can live in a file next to the service that raises it and be
//! installed into a [`Registry`](faultline_core::Registry) at startup.
//!
//! # Modules
//!
//! - [`manifest`] -- [`TaxonomyManifest`] and its entries, YAML loading.
//! - [`install`] -- Reference resolution and [`TaxonomyManifest::install`].
//! - [`error`] -- [`ManifestError`].
//!
//! # Usage
//!
//! ```
//! use faultline_core::Registry;
//! use faultline_manifest::{ManifestError, TaxonomyManifest};
//!
//! # fn main() -> Result<(), ManifestError> {
//! let manifest = TaxonomyManifest::parse(
//!     "module: billing\ntaxonomies:\n  - name: PaymentError\n    kinds:\n      declined:\n",
//! )?;
//! let mut registry = Registry::new();
//! let installed = manifest.install(&mut registry)?;
//!
//! let declined = installed
//!     .get("PaymentError")
//!     .and_then(|id| registry.get(id))
//!     .and_then(|ty| ty.kind("declined"));
//! assert_eq!(declined.map(|k| k.value().to_owned()).as_deref(), Some("declined"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod install;
pub mod manifest;

// Re-export primary types at crate root.
pub use error::ManifestError;
pub use install::{InstalledManifest, resolve_reference};
pub use manifest::{ExternalEntry, KindEntry, KindTable, TaxonomyEntry, TaxonomyManifest};
