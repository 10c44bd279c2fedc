//! Declarative error taxonomies with multi-parent ancestry.
//!
//! A taxonomy node is an error type that declares named kinds. Declaring a
//! node resolves its kinds against the already-built kinds of its bases and
//! materializes exactly one kind type per `(node, kind name)` pair. Every
//! kind type knows its identity (name, value, full path) and its ancestors,
//! and can be raised as an [`ErrorValue`] that handlers match by ancestry.
//!
//! # Modules
//!
//! - [`registry`] -- The [`Registry`]: arena of built types, built-in
//!   markers, externals, idempotent declaration.
//! - [`declaration`] -- [`NodeDecl`], [`KindSpec`] and the three
//!   [`Annotation`] forms.
//! - `builder` -- The two-pass collect/resolve merge run at declaration
//!   time.
//! - [`kind`] -- [`ErrorType`], the borrowed lookup and constructor view.
//! - [`value`] -- [`ErrorValue`] and [`ErrorArgs`]: display and equality.
//! - [`matching`] -- Cached ancestry closures and the `is-a` predicate.
//! - [`guard`] -- [`Raises`], the allow-list wrapper.
//! - [`introspect`] -- Queries and [`TaxonomySnapshot`] for tooling.
//! - [`error`] -- [`TaxonomyError`].
//!
//! # Usage
//!
//! ```
//! use faultline_core::{ErrorArgs, KindSpec, NodeDecl, Registry, TaxonomyError};
//!
//! # fn main() -> Result<(), TaxonomyError> {
//! let mut registry = Registry::new();
//! let base = registry.declare(NodeDecl::new("app", "Base").kind("k", KindSpec::valued("b")))?;
//! let derived = registry.declare(NodeDecl::new("app", "Derived").base(base).kind("k", KindSpec::bare()))?;
//!
//! let base_k = registry.kind(base, "k").ok_or(TaxonomyError::UnknownNode(base))?;
//! let derived_k = registry.get(derived).and_then(|t| t.kind("k")).ok_or(TaxonomyError::UnknownNode(derived))?;
//!
//! assert_eq!(derived_k.full_path(), "Derived@k");
//! assert_eq!(derived_k.value(), "b");
//!
//! let err = derived_k.error_with(ErrorArgs::new().arg("a").named("x", 1));
//! assert!(registry.is_a(&err, base_k));
//! assert!(registry.is_a(&err, base));
//! assert_eq!(err.to_string(), "b");
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod declaration;
pub mod error;
pub mod guard;
pub mod introspect;
pub mod kind;
pub mod matching;
pub mod node;
pub mod registry;
pub mod value;

// Re-export primary types at crate root.
pub use declaration::{Annotation, KindSpec, NodeDecl};
pub use error::TaxonomyError;
pub use guard::{Raises, RaisesError};
pub use introspect::{NodeSnapshot, TaxonomySnapshot};
pub use kind::ErrorType;
pub use node::{NodeId, NodeOrigin, TypeIdentity};
pub use registry::{BUILTIN_MODULE, ERROR_ROOT, EXCEPTION_MARKER, Registry};
pub use value::{ErrorArgs, ErrorValue};
