//! Static-analysis surface for external tooling.
//!
//! Tooling needs to answer two questions without raising anything: "is
//! this field a kind declaration?" and "what does this attribute access on
//! a taxonomy type yield?". The queries below answer both, and
//! [`TaxonomySnapshot`] exports the whole registry as plain data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeOrigin};
use crate::registry::Registry;

/// Serializable view of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Arena id.
    pub id: NodeId,
    /// How the node came to exist.
    pub origin: NodeOrigin,
    /// Declaring module.
    pub module: String,
    /// Key the node is reachable under.
    pub name: String,
    /// Display text.
    pub value: String,
    /// Qualified path.
    pub full_path: String,
    /// Full paths of the direct ancestors.
    pub ancestors: Vec<String>,
    /// Kind names written on this node's own declaration.
    pub declared: Vec<String>,
    /// Resolved kinds by name, as full paths.
    pub kinds: BTreeMap<String, String>,
}

/// Serializable view of a whole registry, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySnapshot {
    /// Every node, markers first.
    pub nodes: Vec<NodeSnapshot>,
}

impl TaxonomySnapshot {
    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Find a node by its full path.
    pub fn find(&self, full_path: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.full_path == full_path)
    }
}

impl Registry {
    /// Whether `id` derives from the taxonomy root.
    pub fn is_taxonomy_type(&self, id: NodeId) -> bool {
        self.is_subtype(id, self.root())
    }

    /// Whether `name` is written as a kind on `id`'s own declaration.
    pub fn declares_kind(&self, id: NodeId, name: &str) -> bool {
        self.node(id).is_some_and(|n| n.declared.contains(name))
    }

    /// The kind type an attribute access `id.name` yields, if any.
    pub fn attribute_kind(&self, id: NodeId, name: &str) -> Option<NodeId> {
        if !self.is_taxonomy_type(id) {
            return None;
        }
        self.kind(id, name)
    }

    /// Export every node as plain data.
    pub fn snapshot(&self) -> TaxonomySnapshot {
        let path_of = |id: &NodeId| {
            self.get(*id)
                .map_or_else(|| id.to_string(), |ty| ty.full_path().to_owned())
        };
        let nodes = self
            .ids()
            .filter_map(|id| self.node(id).map(|node| (id, node)))
            .map(|(id, node)| NodeSnapshot {
                id,
                origin: node.origin,
                module: node.identity.module().to_owned(),
                name: node.identity.name().to_owned(),
                value: node.identity.value().to_owned(),
                full_path: node.identity.full_path().to_owned(),
                ancestors: node.ancestors.iter().map(path_of).collect(),
                declared: node.declared.iter().cloned().collect(),
                kinds: node
                    .kinds
                    .iter()
                    .map(|(name, kind)| (name.clone(), path_of(kind)))
                    .collect(),
            })
            .collect();
        TaxonomySnapshot { nodes }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::declaration::{KindSpec, NodeDecl};

    fn sample() -> (Registry, NodeId, NodeId, NodeId) {
        let mut registry = Registry::new();
        let ext = registry.define_external("io", "TimeoutError", &[]).unwrap();
        let base = registry
            .declare(NodeDecl::new("app", "Base").kind("k", KindSpec::valued("b")))
            .unwrap();
        let derived = registry
            .declare(
                NodeDecl::new("app", "Derived")
                    .base(base)
                    .kind("t", KindSpec::bare().ancestor(ext)),
            )
            .unwrap();
        (registry, ext, base, derived)
    }

    #[test]
    fn externals_are_not_taxonomy_types() {
        let (registry, ext, base, _) = sample();
        assert!(!registry.is_taxonomy_type(ext));
        assert!(registry.is_taxonomy_type(base));
        assert_eq!(registry.attribute_kind(ext, "k"), None);
    }

    #[test]
    fn declares_kind_distinguishes_own_from_inherited() {
        let (registry, _, base, derived) = sample();
        assert!(registry.declares_kind(base, "k"));
        assert!(!registry.declares_kind(derived, "k"));
        assert!(registry.declares_kind(derived, "t"));
        assert_eq!(
            registry.attribute_kind(derived, "k"),
            registry.kind(derived, "k")
        );
        assert_eq!(registry.attribute_kind(derived, "missing"), None);
    }

    #[test]
    fn snapshot_lists_paths_and_ancestors() {
        let (registry, _, _, _) = sample();
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.nodes.len(), registry.len());

        let derived_k = snapshot.find("Derived@k").unwrap();
        assert_eq!(derived_k.origin, NodeOrigin::Kind);
        assert_eq!(derived_k.value, "b");
        assert_eq!(derived_k.ancestors, vec!["Derived", "Base@k"]);

        let derived_t = snapshot.find("Derived@t").unwrap();
        assert_eq!(derived_t.ancestors, vec!["Derived", "TimeoutError"]);

        let derived = snapshot.find("Derived").unwrap();
        assert_eq!(derived.declared, vec!["t"]);
        assert_eq!(derived.kinds.get("k").map(String::as_str), Some("Derived@k"));
    }

    #[test]
    fn snapshot_json_round_trips() {
        let (registry, _, _, _) = sample();
        let snapshot = registry.snapshot();
        let json = snapshot.to_json().unwrap();
        let parsed: TaxonomySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
        assert!(json.contains("\"full_path\": \"Derived@t\""));
    }
}
