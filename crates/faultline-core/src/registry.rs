//! The registry: an explicit, injectable store of every built error type.
//!
//! A [`Registry`] owns an append-only arena of nodes. Built-in markers are
//! created up front, externals and taxonomy nodes are added by
//! [`define_external`](Registry::define_external) and
//! [`declare`](Registry::declare), and kinds are materialized by the builder
//! while a node is declared. Once a node is in the arena it never changes
//! again, so a `&Registry` can be shared freely across threads.
//!
//! # Design
//!
//! - **Write-once per key**: `(module, name)` identifies a declared node or
//!   external. Re-declaring it identically returns the cached id.
//! - **Atomic builds**: a failed declaration leaves no trace in the arena.
//! - **No globals**: tests build isolated registries.

use std::collections::{BTreeMap, BTreeSet};

use crate::builder;
use crate::declaration::NodeDecl;
use crate::error::TaxonomyError;
use crate::kind::ErrorType;
use crate::node::{Node, NodeId, NodeOrigin, TypeIdentity};

/// Module the built-in markers live in.
pub const BUILTIN_MODULE: &str = "faultline";

/// Name of the generic top-level error marker.
pub const EXCEPTION_MARKER: &str = "Exception";

/// Name of the taxonomy root marker.
pub const ERROR_ROOT: &str = "Error";

/// Store of every error type known to one taxonomy world.
#[derive(Debug)]
pub struct Registry {
    /// All nodes, indexed by [`NodeId`].
    nodes: Vec<Node>,
    /// Declared nodes and externals by `(module, name)`.
    index: BTreeMap<(String, String), NodeId>,
    exception: NodeId,
    root: NodeId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding only the `Exception` and `Error` markers.
    pub fn new() -> Self {
        let exception_id = NodeId::EXCEPTION;
        let root_id = NodeId::ROOT;
        let exception = marker(EXCEPTION_MARKER, Vec::new());
        let root = marker(ERROR_ROOT, vec![exception_id]);

        let mut index = BTreeMap::new();
        index.insert(key(BUILTIN_MODULE, EXCEPTION_MARKER), exception_id);
        index.insert(key(BUILTIN_MODULE, ERROR_ROOT), root_id);

        Self {
            nodes: vec![exception, root],
            index,
            exception: exception_id,
            root: root_id,
        }
    }

    /// The generic top-level error marker. Every error type is-a this.
    pub const fn exception(&self) -> NodeId {
        self.exception
    }

    /// The taxonomy root. Every declared node and kind is-a this.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` is one of the built-in markers.
    pub fn is_marker(&self, id: NodeId) -> bool {
        id == self.exception || id == self.root
    }

    /// Number of nodes, markers included.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a registry holds its markers from creation.
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` was issued by this registry.
    pub const fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Borrow a view of the error type behind `id`.
    pub fn get(&self, id: NodeId) -> Option<ErrorType<'_>> {
        self.node(id).map(|node| ErrorType::new(self, id, node))
    }

    /// Find a declared node or external by module and name.
    pub fn lookup(&self, module: &str, name: &str) -> Option<NodeId> {
        self.index.get(&key(module, name)).copied()
    }

    /// Resolve `node.name` to its kind type.
    pub fn kind(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.node(node).and_then(|n| n.kinds.get(name).copied())
    }

    /// Iterate over every id in the arena, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter_map(NodeId::from_index)
    }

    /// Register a foreign error type.
    ///
    /// With no parents the external derives from the `Exception` marker.
    /// Re-registering the same name with the same parents, in any order,
    /// returns the existing id.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::UnknownNode`] if a parent is not in this
    /// registry, or [`TaxonomyError::DuplicateNode`] if the name is taken
    /// with different parents.
    pub fn define_external(
        &mut self,
        module: &str,
        name: &str,
        parents: &[NodeId],
    ) -> Result<NodeId, TaxonomyError> {
        let mut effective = Vec::with_capacity(parents.len().max(1));
        for parent in parents {
            if !self.contains(*parent) {
                return Err(TaxonomyError::UnknownNode(*parent));
            }
            if !effective.contains(parent) {
                effective.push(*parent);
            }
        }
        if effective.is_empty() {
            effective.push(self.exception);
        }

        if let Some(existing) = self.lookup(module, name) {
            return match self.node(existing) {
                Some(node)
                    if node.origin == NodeOrigin::External
                        && same_parents(&node.ancestors, &effective) =>
                {
                    tracing::debug!(module, external = name, "external already registered");
                    Ok(existing)
                }
                _ => Err(TaxonomyError::DuplicateNode {
                    module: module.to_owned(),
                    name: name.to_owned(),
                }),
            };
        }

        let identity = TypeIdentity::new(
            module.to_owned(),
            name.to_owned(),
            name.to_owned(),
            name.to_owned(),
        );
        let id = self.push(Node::new(NodeOrigin::External, identity, effective))?;
        self.index.insert(key(module, name), id);
        tracing::debug!(module, external = name, %id, "external registered");
        Ok(id)
    }

    /// Build a taxonomy node and every kind it resolves.
    ///
    /// Runs the two-pass merge against the bases' already-resolved kind
    /// tables. Declaring the same node twice with an identical declaration
    /// returns the cached id without rebuilding.
    ///
    /// # Errors
    ///
    /// Returns [`TaxonomyError::InvalidKindAnnotation`] for a malformed
    /// annotation, [`TaxonomyError::UnknownNode`] for a foreign base,
    /// [`TaxonomyError::DuplicateNode`] for a conflicting re-declaration,
    /// or [`TaxonomyError::CapacityExceeded`] if the arena is full. On error
    /// the registry is left unchanged.
    pub fn declare(&mut self, decl: NodeDecl) -> Result<NodeId, TaxonomyError> {
        let decl = self.normalize(decl)?;

        if let Some(existing) = self.lookup(&decl.module, &decl.name) {
            return match self.node(existing).and_then(|n| n.declaration.as_ref()) {
                Some(previous) if *previous == decl => {
                    tracing::debug!(
                        module = decl.module,
                        node = decl.name,
                        "taxonomy node already built, reusing"
                    );
                    Ok(existing)
                }
                _ => Err(TaxonomyError::DuplicateNode {
                    module: decl.module,
                    name: decl.name,
                }),
            };
        }

        builder::validate(self, &decl.name, &decl.kinds)?;

        let checkpoint = self.nodes.len();
        match builder::build_node(self, &decl) {
            Ok(id) => {
                self.index.insert(key(&decl.module, &decl.name), id);
                if let Some(node) = self.node_mut(id) {
                    node.declaration = Some(decl);
                }
                Ok(id)
            }
            Err(err) => {
                self.nodes.truncate(checkpoint);
                Err(err)
            }
        }
    }

    /// Apply the default base and reject bases from another registry.
    fn normalize(&self, mut decl: NodeDecl) -> Result<NodeDecl, TaxonomyError> {
        if let Some(unknown) = decl.bases.iter().find(|b| !self.contains(**b)) {
            return Err(TaxonomyError::UnknownNode(*unknown));
        }
        if decl.bases.is_empty() {
            decl.bases.push(self.root);
        }
        Ok(decl)
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Append a node and return its id.
    pub(crate) fn push(&mut self, node: Node) -> Result<NodeId, TaxonomyError> {
        let id = NodeId::from_index(self.nodes.len()).ok_or(TaxonomyError::CapacityExceeded)?;
        self.nodes.push(node);
        Ok(id)
    }
}

/// Parent lists compare as sets: order is not part of an external's shape.
fn same_parents(existing: &[NodeId], requested: &[NodeId]) -> bool {
    existing.iter().collect::<BTreeSet<_>>() == requested.iter().collect::<BTreeSet<_>>()
}

fn key(module: &str, name: &str) -> (String, String) {
    (module.to_owned(), name.to_owned())
}

fn marker(name: &str, ancestors: Vec<NodeId>) -> Node {
    let identity = TypeIdentity::new(
        BUILTIN_MODULE.to_owned(),
        name.to_owned(),
        name.to_owned(),
        name.to_owned(),
    );
    Node::new(NodeOrigin::Marker, identity, ancestors)
}
