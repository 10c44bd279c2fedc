//! Error types for the `faultline-core` crate.
//!
//! Taxonomy failures are themselves a small taxonomy: definition-time
//! failures ([`TaxonomyError::InvalidKindAnnotation`],
//! [`TaxonomyError::DuplicateNode`]) are reported synchronously while a node
//! is being declared, and [`TaxonomyError::UnmatchedRaise`] is produced by
//! the allow-list [`guard`](crate::guard) when a callable raises outside its
//! contract.

use crate::node::NodeId;
use crate::value::ErrorValue;

/// Errors that can occur while building or guarding a taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// A declared kind carries an annotation that is not an error type, a
    /// union of error types, or the placeholder marker.
    #[error("invalid annotation for `{kind}` in `{node}`: {reason}")]
    InvalidKindAnnotation {
        /// The node whose declaration is rejected.
        node: String,
        /// The offending kind name.
        kind: String,
        /// What is wrong with the annotation.
        reason: String,
    },

    /// A node with the same module and name already exists with a
    /// different declaration.
    #[error("`{module}.{name}` is already declared with a different shape")]
    DuplicateNode {
        /// Module of the conflicting node.
        module: String,
        /// Name of the conflicting node.
        name: String,
    },

    /// A node id does not belong to the registry it was used with.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The registry cannot address any more nodes.
    #[error("registry capacity exceeded")]
    CapacityExceeded,

    /// A guarded callable raised an error outside its allow-list.
    #[error("{callable} raised `{raised}` which is not within allowed list [{}]", allowed.join(", "))]
    UnmatchedRaise {
        /// Label of the guarded callable.
        callable: String,
        /// Full path of the raised kind.
        raised: String,
        /// Full paths of the allowed entries.
        allowed: Vec<String>,
        /// The original error, preserved unmodified.
        #[source]
        source: Box<ErrorValue>,
    },
}
