//! Allow-list guard for callables that may only raise certain kinds.
//!
//! [`Raises`] wraps a fallible call. Successful results and allowed errors
//! pass through untouched; an error outside the allow-list is a contract
//! violation and comes back as [`TaxonomyError::UnmatchedRaise`] with the
//! original error attached as its source.
//!
//! ```
//! use faultline_core::{KindSpec, NodeDecl, Raises, RaisesError, Registry};
//!
//! let mut registry = Registry::new();
//! let Ok(node) = registry.declare(NodeDecl::new("app", "MyError").kind("k", KindSpec::bare()))
//! else {
//!     return;
//! };
//! let Some(k) = registry.get(node).and_then(|t| t.kind("k")) else {
//!     return;
//! };
//!
//! let guard = Raises::new(&registry, "charge", [node]);
//! let outcome: Result<(), RaisesError> = guard.call(|| Err(k.error()));
//! assert!(matches!(outcome, Err(RaisesError::Raised(_))));
//! ```

use crate::error::TaxonomyError;
use crate::node::NodeId;
use crate::registry::Registry;
use crate::value::ErrorValue;

/// Outcome of a guarded call that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RaisesError {
    /// The callable raised an allowed error; it is passed through as-is.
    #[error("{0}")]
    Raised(ErrorValue),

    /// The callable raised outside its allow-list.
    #[error(transparent)]
    Violation(#[from] TaxonomyError),
}

impl RaisesError {
    /// The error the callable raised, whether allowed or not.
    pub fn raised(&self) -> Option<&ErrorValue> {
        match self {
            Self::Raised(err) => Some(err),
            Self::Violation(TaxonomyError::UnmatchedRaise { source, .. }) => Some(source.as_ref()),
            Self::Violation(_) => None,
        }
    }
}

/// A callable's declared allow-list.
#[derive(Debug, Clone)]
pub struct Raises<'r> {
    registry: &'r Registry,
    label: String,
    allowed: Vec<NodeId>,
}

impl<'r> Raises<'r> {
    /// Guard a callable identified by `label`, allowing errors that are-a
    /// any entry in `allowed`.
    pub fn new(
        registry: &'r Registry,
        label: impl Into<String>,
        allowed: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        Self {
            registry,
            label: label.into(),
            allowed: allowed.into_iter().collect(),
        }
    }

    /// The allow-list, in declaration order.
    pub fn allowed(&self) -> &[NodeId] {
        &self.allowed
    }

    /// Run `f`, enforcing the allow-list on its error.
    ///
    /// # Errors
    ///
    /// Returns [`RaisesError::Raised`] for an allowed error, or
    /// [`RaisesError::Violation`] wrapping
    /// [`TaxonomyError::UnmatchedRaise`] otherwise.
    pub fn call<T, F>(&self, f: F) -> Result<T, RaisesError>
    where
        F: FnOnce() -> Result<T, ErrorValue>,
    {
        f().map_err(|err| self.check(err))
    }

    /// Classify an error against the allow-list.
    pub fn check(&self, err: ErrorValue) -> RaisesError {
        if self.registry.matches_any(&err, &self.allowed) {
            return RaisesError::Raised(err);
        }

        let allowed: Vec<String> = self
            .allowed
            .iter()
            .map(|id| {
                self.registry
                    .get(*id)
                    .map_or_else(|| id.to_string(), |ty| ty.full_path().to_owned())
            })
            .collect();
        tracing::warn!(
            callable = self.label,
            raised = err.full_path(),
            allowed = ?allowed,
            "callable raised outside its allow-list"
        );
        RaisesError::Violation(TaxonomyError::UnmatchedRaise {
            callable: self.label.clone(),
            raised: err.full_path().to_owned(),
            allowed,
            source: Box::new(err),
        })
    }
}
