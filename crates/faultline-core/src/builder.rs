//! Two-pass kind resolution, run once per node at declaration time.
//!
//! 1. **Collect** -- walk the bases left to right and merge their resolved
//!    kind tables into one running table. For each kind name the table
//!    remembers the first base value seen and every base kind type, in base
//!    order. The node's own declarations are laid over the top.
//! 2. **Resolve** -- materialize one kind node per name. The value is the
//!    node's own explicit value, else the first base value, else the name.
//!    The full path is always `<Node>@<kind>`. Ancestors are the union of
//!    the declaring node, every base's kind of the same name, and the
//!    annotation's extra ancestors minus the built-in markers. Each kind is
//!    then resolved again as a sub-taxonomy, seeded from its ancestors.
//!
//! Every function here reads only nodes that are already built, so the
//! arena grows strictly forward and the ancestor graph cannot cycle.

use std::collections::BTreeMap;

use crate::declaration::{Annotation, KindSpec, NodeDecl};
use crate::error::TaxonomyError;
use crate::node::{Node, NodeId, NodeOrigin, TypeIdentity};
use crate::registry::Registry;

/// Running accumulator for one kind name during the collect pass.
#[derive(Debug, Default)]
struct Entry<'d> {
    value: Option<String>,
    base_kinds: Vec<NodeId>,
    spec: Option<&'d KindSpec>,
}

/// Check every annotation in a declaration tree before anything is built.
pub(crate) fn validate(
    registry: &Registry,
    owner: &str,
    kinds: &BTreeMap<String, KindSpec>,
) -> Result<(), TaxonomyError> {
    for (name, spec) in kinds {
        if let Annotation::WithAncestors(set) = &spec.annotation {
            if set.is_empty() {
                return Err(invalid(owner, name, "annotation names no error types".to_owned()));
            }
            if let Some(unknown) = set.iter().find(|id| !registry.contains(**id)) {
                return Err(invalid(
                    owner,
                    name,
                    format!("{unknown} is not an error type in this registry"),
                ));
            }
        }
        validate(registry, &format!("{owner}@{name}"), &spec.nested)?;
    }
    Ok(())
}

/// Insert the declared node and resolve its kind table.
pub(crate) fn build_node(registry: &mut Registry, decl: &NodeDecl) -> Result<NodeId, TaxonomyError> {
    let identity = TypeIdentity::new(
        decl.module.clone(),
        decl.name.clone(),
        decl.name.clone(),
        decl.name.clone(),
    );
    let mut node = Node::new(NodeOrigin::Declared, identity, decl.bases.clone());
    node.declared = decl.kinds.keys().cloned().collect();
    let id = registry.push(node)?;

    let kinds = resolve(registry, id, &decl.bases, &decl.kinds)?;
    tracing::debug!(
        module = decl.module,
        node = decl.name,
        %id,
        kinds = kinds.len(),
        "taxonomy node built"
    );
    attach_kinds(registry, id, kinds)?;
    Ok(id)
}

/// Resolve the kind table of `owner` from its bases and own declarations.
fn resolve(
    registry: &mut Registry,
    owner: NodeId,
    bases: &[NodeId],
    declared: &BTreeMap<String, KindSpec>,
) -> Result<BTreeMap<String, NodeId>, TaxonomyError> {
    let table = collect(registry, bases, declared);
    let mut resolved = BTreeMap::new();
    for (name, entry) in table {
        let id = resolve_kind(registry, owner, &name, entry)?;
        resolved.insert(name, id);
    }
    Ok(resolved)
}

/// Collect pass: merge base tables in order, then overlay own entries.
fn collect<'d>(
    registry: &Registry,
    bases: &[NodeId],
    declared: &'d BTreeMap<String, KindSpec>,
) -> BTreeMap<String, Entry<'d>> {
    let mut table: BTreeMap<String, Entry<'d>> = BTreeMap::new();

    for base in bases {
        let Some(base_node) = registry.node(*base) else {
            continue;
        };
        for (name, kind) in &base_node.kinds {
            let entry = table.entry(name.clone()).or_default();
            if !entry.base_kinds.contains(kind) {
                entry.base_kinds.push(*kind);
            }
            let Some(base_value) = registry.node(*kind).map(|n| n.identity.value()) else {
                continue;
            };
            match &entry.value {
                None => entry.value = Some(base_value.to_owned()),
                Some(kept) if kept != base_value => {
                    tracing::debug!(
                        kind = name,
                        kept,
                        ignored = base_value,
                        "bases disagree on kind value, first base wins"
                    );
                }
                Some(_) => {}
            }
        }
    }

    for (name, spec) in declared {
        let entry = table.entry(name.clone()).or_default();
        if let Some(value) = &spec.explicit_value {
            entry.value = Some(value.clone());
        }
        entry.spec = Some(spec);
    }

    table
}

/// Resolve pass for a single kind name declared or inherited by `owner`.
fn resolve_kind(
    registry: &mut Registry,
    owner: NodeId,
    name: &str,
    entry: Entry<'_>,
) -> Result<NodeId, TaxonomyError> {
    let owner_identity = registry
        .node(owner)
        .map(|n| n.identity.clone())
        .ok_or(TaxonomyError::UnknownNode(owner))?;
    let full_path = format!("{}@{name}", owner_identity.type_name());

    let mut ancestors = vec![owner];
    let extras = match entry.spec.map(|s| &s.annotation) {
        Some(Annotation::WithAncestors(set)) => set
            .iter()
            .copied()
            .filter(|id| !registry.is_marker(*id))
            .collect(),
        Some(Annotation::Bare | Annotation::Unspecialized) | None => Vec::new(),
    };
    for ancestor in entry.base_kinds.iter().chain(&extras) {
        if !ancestors.contains(ancestor) {
            ancestors.push(*ancestor);
        }
    }
    let seeds: Vec<NodeId> = ancestors.iter().copied().filter(|a| *a != owner).collect();

    let value = entry.value.unwrap_or_else(|| name.to_owned());
    tracing::trace!(
        kind = full_path,
        value,
        ancestors = ancestors.len(),
        "resolved kind"
    );

    let identity = TypeIdentity::new(
        owner_identity.module().to_owned(),
        full_path,
        name.to_owned(),
        value,
    );
    let mut node = Node::new(NodeOrigin::Kind, identity, ancestors);
    node.declarer = Some(owner);
    let empty = BTreeMap::new();
    let nested = entry.spec.map_or(&empty, |s| &s.nested);
    node.declared = nested.keys().cloned().collect();
    let id = registry.push(node)?;

    let kinds = resolve(registry, id, &seeds, nested)?;
    attach_kinds(registry, id, kinds)?;
    Ok(id)
}

fn attach_kinds(
    registry: &mut Registry,
    id: NodeId,
    kinds: BTreeMap<String, NodeId>,
) -> Result<(), TaxonomyError> {
    let node = registry.node_mut(id).ok_or(TaxonomyError::UnknownNode(id))?;
    node.kinds = kinds;
    Ok(())
}

fn invalid(node: &str, kind: &str, reason: String) -> TaxonomyError {
    TaxonomyError::InvalidKindAnnotation {
        node: node.to_owned(),
        kind: kind.to_owned(),
        reason,
    }
}
