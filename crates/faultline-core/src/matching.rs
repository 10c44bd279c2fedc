//! Catch-by-ancestry: the explicit `is-a` predicate.
//!
//! A handler for `X` catches an error iff `X` is in the transitive ancestor
//! closure of the error's kind. Closures are computed on first use and
//! cached per node; the ancestor graph never changes after a node is built,
//! so the cache never needs invalidating.

use std::collections::BTreeSet;

use crate::node::NodeId;
use crate::registry::Registry;
use crate::value::ErrorValue;

impl Registry {
    /// Transitive ancestor closure of `id`, including `id` itself.
    pub fn ancestry(&self, id: NodeId) -> Option<&BTreeSet<NodeId>> {
        let node = self.node(id)?;
        Some(node.closure.get_or_init(|| self.walk_ancestry(id)))
    }

    /// Worklist walk of the ancestor graph. Ancestors whose closure is
    /// already cached are merged whole instead of being walked again.
    fn walk_ancestry(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut closure = BTreeSet::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if !closure.insert(next) {
                continue;
            }
            let Some(node) = self.node(next) else {
                continue;
            };
            match node.closure.get() {
                Some(cached) if next != id => closure.extend(cached.iter().copied()),
                _ => pending.extend(node.ancestors.iter().copied()),
            }
        }
        closure
    }

    /// Whether type `ty` is-a `category`.
    pub fn is_subtype(&self, ty: NodeId, category: NodeId) -> bool {
        self.ancestry(ty)
            .is_some_and(|closure| closure.contains(&category))
    }

    /// Whether a handler for `category` catches `err`.
    pub fn is_a(&self, err: &ErrorValue, category: NodeId) -> bool {
        self.is_subtype(err.kind(), category)
    }

    /// Whether `err` is an instance of any entry in `allowed`.
    pub fn matches_any(&self, err: &ErrorValue, allowed: &[NodeId]) -> bool {
        self.first_match(err, allowed).is_some()
    }

    /// The first entry in `allowed` that catches `err`, in handler order.
    pub fn first_match(&self, err: &ErrorValue, allowed: &[NodeId]) -> Option<NodeId> {
        let closure = self.ancestry(err.kind())?;
        allowed.iter().copied().find(|id| closure.contains(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::declaration::{KindSpec, NodeDecl};

    #[test]
    fn closure_includes_self_and_markers() {
        let mut registry = Registry::new();
        let node = registry.declare(NodeDecl::new("app", "MyError")).unwrap();
        let closure = registry.ancestry(node).unwrap();
        assert!(closure.contains(&node));
        assert!(closure.contains(&registry.root()));
        assert!(closure.contains(&registry.exception()));
    }

    #[test]
    fn diamond_does_not_duplicate_common_ancestor() {
        let mut registry = Registry::new();
        let top = registry
            .declare(NodeDecl::new("app", "Top").kind("k", KindSpec::bare()))
            .unwrap();
        let left = registry
            .declare(NodeDecl::new("app", "Left").base(top))
            .unwrap();
        let right = registry
            .declare(NodeDecl::new("app", "Right").base(top))
            .unwrap();
        let bottom = registry
            .declare(NodeDecl::new("app", "Bottom").base(left).base(right))
            .unwrap();

        let top_k = registry.kind(top, "k").unwrap();
        let bottom_k = registry.kind(bottom, "k").unwrap();
        let closure = registry.ancestry(bottom_k).unwrap();
        let expected: BTreeSet<NodeId> = [
            bottom_k,
            bottom,
            registry.kind(left, "k").unwrap(),
            registry.kind(right, "k").unwrap(),
            left,
            right,
            top_k,
            top,
            registry.root(),
            registry.exception(),
        ]
        .into();
        assert_eq!(closure, &expected);
    }

    #[test]
    fn closure_is_cached() {
        let mut registry = Registry::new();
        let node = registry.declare(NodeDecl::new("app", "MyError")).unwrap();
        let first = registry.ancestry(node).unwrap();
        let second = registry.ancestry(node).unwrap();
        assert!(core::ptr::eq(first, second));
    }

    #[test]
    fn first_match_follows_handler_order() {
        let mut registry = Registry::new();
        let node = registry
            .declare(NodeDecl::new("app", "MyError").kind("k", KindSpec::bare()))
            .unwrap();
        let k = registry.kind(node, "k").unwrap();
        let err = registry.get(k).unwrap().error();
        let other = registry.declare(NodeDecl::new("app", "Other")).unwrap();

        assert_eq!(registry.first_match(&err, &[other, node, k]), Some(node));
        assert_eq!(registry.first_match(&err, &[k, node]), Some(k));
        assert_eq!(registry.first_match(&err, &[other]), None);
        assert!(!registry.matches_any(&err, &[]));
    }

    #[test]
    fn long_inheritance_chain_matches_without_recursion() {
        let mut registry = Registry::new();
        let first = registry
            .declare(NodeDecl::new("app", "N0").kind("k", KindSpec::bare()))
            .unwrap();
        let mut last = first;
        for level in 1..4000 {
            last = registry
                .declare(NodeDecl::new("app", format!("N{level}")).base(last))
                .unwrap();
        }

        let first_k = registry.kind(first, "k").unwrap();
        let err = registry.get(registry.kind(last, "k").unwrap()).unwrap().error();
        assert!(registry.is_a(&err, first_k));
        assert!(registry.matches_any(&err, &[first]));
        assert!(registry.is_subtype(last, registry.exception()));
    }

    #[test]
    fn closure_reuses_cached_ancestors() {
        let mut registry = Registry::new();
        let base = registry.declare(NodeDecl::new("app", "Base")).unwrap();
        let base_closure = registry.ancestry(base).unwrap().clone();
        let derived = registry
            .declare(NodeDecl::new("app", "Derived").base(base))
            .unwrap();

        let mut expected = base_closure;
        expected.insert(derived);
        assert_eq!(registry.ancestry(derived).unwrap(), &expected);
    }

    #[test]
    fn unknown_ids_never_match() {
        let registry = Registry::new();
        let bogus = NodeId::from_index(1000).unwrap();
        assert!(registry.ancestry(bogus).is_none());
        assert!(!registry.is_subtype(bogus, registry.root()));
    }
}
