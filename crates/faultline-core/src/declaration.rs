//! Declaration surface: what a programmer writes before a node is built.
//!
//! A [`NodeDecl`] names a taxonomy node, its ordered bases and the kinds it
//! declares. Each kind is a [`KindSpec`] whose [`Annotation`] is one of
//! exactly three forms. Declarations are consumed by
//! [`Registry::declare`](crate::Registry::declare); nothing here touches the
//! registry.
//!
//! ```
//! use faultline_core::{KindSpec, NodeDecl, Registry};
//!
//! let mut registry = Registry::new();
//! let timeout = registry.define_external("io", "TimeoutError", &[]).ok();
//!
//! let mut decl = NodeDecl::new("billing", "PaymentError")
//!     .kind("declined", KindSpec::bare())
//!     .kind("expired", KindSpec::valued("card expired"));
//! if let Some(timeout) = timeout {
//!     decl = decl.kind("timeout", KindSpec::bare().ancestor(timeout));
//! }
//!
//! assert!(registry.declare(decl).is_ok());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::node::NodeId;

/// The typed slot attached to a declared kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Annotation {
    /// A plain named kind with no extra ancestors.
    #[default]
    Bare,
    /// The kind must also be an instance of every listed type. One entry is
    /// a single foreign ancestor; several entries are a union.
    WithAncestors(BTreeSet<NodeId>),
    /// The "not yet specialized" placeholder. Adds no ancestors.
    Unspecialized,
}

/// A single declared kind before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindSpec {
    /// Display text. Falls back to a base's value, then to the kind name.
    pub explicit_value: Option<String>,
    /// Typed slot.
    pub annotation: Annotation,
    /// Kinds declared on this kind, resolved as a sub-taxonomy.
    pub nested: BTreeMap<String, KindSpec>,
}

impl KindSpec {
    /// A bare kind: no explicit value, no annotation.
    pub fn bare() -> Self {
        Self::default()
    }

    /// A kind with explicit display text.
    pub fn valued(value: impl Into<String>) -> Self {
        Self {
            explicit_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// A kind annotated with the placeholder marker.
    pub fn unspecialized() -> Self {
        Self {
            annotation: Annotation::Unspecialized,
            ..Self::default()
        }
    }

    /// Set the explicit display text.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.explicit_value = Some(value.into());
        self
    }

    /// Add one extra ancestor, turning the annotation into
    /// [`Annotation::WithAncestors`].
    #[must_use]
    pub fn ancestor(self, id: NodeId) -> Self {
        self.ancestors([id])
    }

    /// Add several extra ancestors (a union annotation).
    #[must_use]
    pub fn ancestors(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        let mut set = match self.annotation {
            Annotation::WithAncestors(set) => set,
            Annotation::Bare | Annotation::Unspecialized => BTreeSet::new(),
        };
        set.extend(ids);
        self.annotation = Annotation::WithAncestors(set);
        self
    }

    /// Replace the annotation wholesale.
    #[must_use]
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotation = annotation;
        self
    }

    /// Declare a kind nested under this one.
    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, spec: Self) -> Self {
        self.nested.insert(name.into(), spec);
        self
    }
}

/// Declaration of one taxonomy node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecl {
    pub(crate) module: String,
    pub(crate) name: String,
    pub(crate) bases: Vec<NodeId>,
    pub(crate) kinds: BTreeMap<String, KindSpec>,
}

impl NodeDecl {
    /// Start declaring `name` in `module`. With no bases the node derives
    /// from the registry's `Error` root.
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            bases: Vec::new(),
            kinds: BTreeMap::new(),
        }
    }

    /// Append a base. Order matters: earlier bases win value tie-breaks.
    #[must_use]
    pub fn base(mut self, id: NodeId) -> Self {
        if !self.bases.contains(&id) {
            self.bases.push(id);
        }
        self
    }

    /// Declare a kind. A second declaration of the same name replaces the
    /// first.
    #[must_use]
    pub fn kind(mut self, name: impl Into<String>, spec: KindSpec) -> Self {
        self.kinds.insert(name.into(), spec);
        self
    }

    /// Module the node is declared in.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered bases.
    pub fn bases(&self) -> &[NodeId] {
        &self.bases
    }

    /// Declared kinds.
    pub const fn kinds(&self) -> &BTreeMap<String, KindSpec> {
        &self.kinds
    }
}
