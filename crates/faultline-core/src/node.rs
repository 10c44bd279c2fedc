//! Arena records for every error type a [`Registry`](crate::Registry) knows.
//!
//! Built-in markers, external ancestors, declared taxonomy nodes and the
//! kinds they resolve all live in the same arena and are addressed by a
//! [`NodeId`]. A kind is itself a node, so it can carry nested kinds and can
//! serve as the base of a later declaration.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::declaration::NodeDecl;

/// Handle to one error type inside a registry.
///
/// Ids are only meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Slot of the built-in `Exception` marker.
    pub(crate) const EXCEPTION: Self = Self(0);

    /// Slot of the built-in `Error` root.
    pub(crate) const ROOT: Self = Self(1);

    /// Convert an arena index into an id, failing past `u32::MAX`.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Arena index of this id.
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the raw arena slot.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeOrigin {
    /// One of the registry's built-in markers (`Exception`, `Error`).
    Marker,
    /// A foreign error type defined outside the taxonomy system.
    External,
    /// A user-declared taxonomy node.
    Declared,
    /// A kind resolved on a taxonomy node.
    Kind,
}

/// Identity of an error type: module, type name, kind name and value.
///
/// Shared by reference with every [`ErrorValue`](crate::ErrorValue) raised
/// from the type, so constructing errors never copies these strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIdentity {
    module: String,
    type_name: String,
    name: String,
    value: String,
}

impl TypeIdentity {
    pub(crate) const fn new(module: String, type_name: String, name: String, value: String) -> Self {
        Self {
            module,
            type_name,
            name,
            value,
        }
    }

    /// Module (namespace) the type was declared in.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Simple type name: the node name, or `Declarer@kind` for kinds.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Key the type is reachable under (`k` for `MyError.k`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Qualified path. For kinds this is `Declarer@kind`, recomputed at
    /// every declaring level.
    pub fn full_path(&self) -> &str {
        &self.type_name
    }

    /// Shallow identity check used by error equality: same simple type
    /// name in the same module. Ancestry is not consulted.
    pub fn same_type(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.module == other.module
    }
}

/// One slot in the registry arena.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) origin: NodeOrigin,
    pub(crate) identity: Arc<TypeIdentity>,
    /// Node that declared this kind. `None` for everything but kinds.
    pub(crate) declarer: Option<NodeId>,
    /// Direct ancestors, in resolution order, without duplicates.
    pub(crate) ancestors: Vec<NodeId>,
    /// Kind names written on this node's own declaration.
    pub(crate) declared: BTreeSet<String>,
    /// Resolved kind table.
    pub(crate) kinds: BTreeMap<String, NodeId>,
    /// Effective declaration, kept to recognise idempotent re-declaration.
    pub(crate) declaration: Option<NodeDecl>,
    /// Lazily computed ancestry closure, including the node itself.
    pub(crate) closure: OnceLock<BTreeSet<NodeId>>,
}

impl Node {
    pub(crate) fn new(origin: NodeOrigin, identity: TypeIdentity, ancestors: Vec<NodeId>) -> Self {
        Self {
            origin,
            identity: Arc::new(identity),
            declarer: None,
            ancestors,
            declared: BTreeSet::new(),
            kinds: BTreeMap::new(),
            declaration: None,
            closure: OnceLock::new(),
        }
    }
}
