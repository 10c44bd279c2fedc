//! Lookup surface: a borrowed view of one built error type.
//!
//! [`ErrorType`] is what `node.kind_name` resolves to. It exposes the
//! identity triple, the direct ancestors, nested kinds, and acts as a
//! constructor for [`ErrorValue`]s.

use crate::node::{Node, NodeId, NodeOrigin, TypeIdentity};
use crate::registry::Registry;
use crate::value::{ErrorArgs, ErrorValue};

/// A built error type, borrowed from its registry.
#[derive(Clone, Copy)]
pub struct ErrorType<'r> {
    registry: &'r Registry,
    id: NodeId,
    node: &'r Node,
}

impl<'r> ErrorType<'r> {
    pub(crate) const fn new(registry: &'r Registry, id: NodeId, node: &'r Node) -> Self {
        Self { registry, id, node }
    }

    /// Handle of this type.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Identity shared with raised errors.
    pub fn identity(&self) -> &'r TypeIdentity {
        &self.node.identity
    }

    /// Key this type is reachable under.
    pub fn name(&self) -> &'r str {
        self.node.identity.name()
    }

    /// Display text of errors raised from this type.
    pub fn value(&self) -> &'r str {
        self.node.identity.value()
    }

    /// Qualified path (`Declarer@kind` for kinds).
    pub fn full_path(&self) -> &'r str {
        self.node.identity.full_path()
    }

    /// Module the type belongs to.
    pub fn module(&self) -> &'r str {
        self.node.identity.module()
    }

    /// How the type came to exist.
    pub const fn origin(&self) -> NodeOrigin {
        self.node.origin
    }

    /// Whether this type is a resolved kind.
    pub fn is_kind(&self) -> bool {
        self.node.origin == NodeOrigin::Kind
    }

    /// The node that declared this kind.
    pub fn declarer(&self) -> Option<Self> {
        self.node.declarer.and_then(|id| self.registry.get(id))
    }

    /// Direct ancestors, in resolution order.
    pub fn ancestor_ids(&self) -> &'r [NodeId] {
        &self.node.ancestors
    }

    /// Direct ancestors as views.
    pub fn ancestors(&self) -> impl Iterator<Item = ErrorType<'r>> + 'r {
        let registry = self.registry;
        self.node
            .ancestors
            .iter()
            .filter_map(move |id| registry.get(*id))
    }

    /// Resolve a nested kind by name.
    pub fn kind(&self, name: &str) -> Option<Self> {
        self.node
            .kinds
            .get(name)
            .and_then(|id| self.registry.get(*id))
    }

    /// Every resolved kind on this type, by name.
    pub fn kinds(&self) -> impl Iterator<Item = (&'r str, ErrorType<'r>)> + 'r {
        let registry = self.registry;
        self.node
            .kinds
            .iter()
            .filter_map(move |(name, id)| registry.get(*id).map(|ty| (name.as_str(), ty)))
    }

    /// Whether this type is-a `category`.
    pub fn is_a(&self, category: NodeId) -> bool {
        self.registry.is_subtype(self.id, category)
    }

    /// Construct an error with no arguments.
    pub fn error(&self) -> ErrorValue {
        self.error_with(ErrorArgs::new())
    }

    /// Construct an error carrying `args` unmodified.
    pub fn error_with(&self, args: ErrorArgs) -> ErrorValue {
        ErrorValue::new(self.id, self.node.identity.clone(), args)
    }
}

impl core::fmt::Debug for ErrorType<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErrorType")
            .field("id", &self.id)
            .field("module", &self.module())
            .field("full_path", &self.full_path())
            .field("value", &self.value())
            .finish()
    }
}

impl PartialEq for ErrorType<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && core::ptr::eq(self.registry, other.registry)
    }
}

impl Eq for ErrorType<'_> {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::declaration::{KindSpec, NodeDecl};

    #[test]
    fn lookup_returns_the_same_kind_every_time() {
        let mut registry = Registry::new();
        let node = registry
            .declare(NodeDecl::new("app", "MyError").kind("k", KindSpec::bare()))
            .unwrap();
        let ty = registry.get(node).unwrap();
        let first = ty.kind("k").unwrap();
        let second = ty.kind("k").unwrap();
        assert_eq!(first, second);
        assert!(core::ptr::eq(first.identity(), second.identity()));
    }

    #[test]
    fn kind_view_exposes_identity_triple() {
        let mut registry = Registry::new();
        let node = registry
            .declare(NodeDecl::new("app", "MyError").kind("k", KindSpec::valued("custom")))
            .unwrap();
        let k = registry.get(node).unwrap().kind("k").unwrap();
        assert_eq!(k.name(), "k");
        assert_eq!(k.value(), "custom");
        assert_eq!(k.full_path(), "MyError@k");
        assert_eq!(k.module(), "app");
        assert!(k.is_kind());
        assert_eq!(k.declarer().map(|d| d.id()), Some(node));
    }

    #[test]
    fn kinds_iterates_in_name_order() {
        let mut registry = Registry::new();
        let node = registry
            .declare(
                NodeDecl::new("app", "MyError")
                    .kind("zeta", KindSpec::bare())
                    .kind("alpha", KindSpec::bare()),
            )
            .unwrap();
        let names: Vec<&str> = registry.get(node).unwrap().kinds().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn constructor_passes_arguments_through() {
        let mut registry = Registry::new();
        let node = registry
            .declare(NodeDecl::new("app", "MyError").kind("k", KindSpec::bare()))
            .unwrap();
        let k = registry.get(node).unwrap().kind("k").unwrap();
        let err = k.error_with(ErrorArgs::new().arg("a").arg("b").named("x", 1));
        assert_eq!(err.positional_args(), &[json!("a"), json!("b")]);
        assert_eq!(err.named_arg("x"), Some(&json!(1)));
        assert_eq!(err.kind(), k.id());
    }
}
