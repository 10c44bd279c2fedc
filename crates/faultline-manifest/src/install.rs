//! Installing a manifest into a [`Registry`].
//!
//! Externals are registered first, then taxonomies in document order. A
//! reference is resolved against what is already built, so a base must
//! appear before the node deriving from it.
//!
//! References take the form `Name`, `Name.kind.sub`, or `module:Name.kind`.
//! An unqualified name is looked up in the manifest's module, then among
//! the built-in markers (`Exception`, `Error`).

use std::collections::{BTreeMap, BTreeSet};

use faultline_core::{
    Annotation, BUILTIN_MODULE, KindSpec, NodeDecl, NodeId, Registry, TaxonomyError,
};

use crate::error::ManifestError;
use crate::manifest::{KindEntry, TaxonomyManifest};

/// Ids of everything a manifest declared, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledManifest {
    module: String,
    types: BTreeMap<String, NodeId>,
}

impl InstalledManifest {
    /// Module the manifest was installed into.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Id of an external or taxonomy node declared by the manifest.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.types.get(name).copied()
    }

    /// Every declared name and its id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.types.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Number of declared externals and taxonomy nodes.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the manifest declared nothing.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TaxonomyManifest {
    /// Register every external and declare every taxonomy in `registry`.
    ///
    /// Installing the same manifest twice is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnknownReference`] for an unresolved base or
    /// parent, or [`ManifestError::Taxonomy`] when the registry rejects a
    /// declaration. An annotation naming an unknown type surfaces as
    /// [`TaxonomyError::InvalidKindAnnotation`]. Types declared before the
    /// failing entry stay registered.
    pub fn install(&self, registry: &mut Registry) -> Result<InstalledManifest, ManifestError> {
        let mut installed = InstalledManifest {
            module: self.module.clone(),
            types: BTreeMap::new(),
        };

        for external in &self.externals {
            let context = format!("parents of external `{}`", external.name);
            let parents = external
                .parents
                .iter()
                .map(|reference| self.require(registry, reference, &context))
                .collect::<Result<Vec<_>, _>>()?;
            let id = registry.define_external(&self.module, &external.name, &parents)?;
            installed.types.insert(external.name.clone(), id);
        }

        for taxonomy in &self.taxonomies {
            let context = format!("bases of `{}`", taxonomy.name);
            let mut decl = NodeDecl::new(self.module.clone(), taxonomy.name.clone());
            for reference in &taxonomy.bases {
                decl = decl.base(self.require(registry, reference, &context)?);
            }
            for (name, entry) in &taxonomy.kinds {
                let spec = self.kind_spec(registry, &taxonomy.name, name, entry.as_ref())?;
                decl = decl.kind(name.clone(), spec);
            }
            let id = registry.declare(decl)?;
            installed.types.insert(taxonomy.name.clone(), id);
        }

        tracing::debug!(
            module = %self.module,
            types = installed.len(),
            "manifest installed"
        );
        Ok(installed)
    }

    fn require(
        &self,
        registry: &Registry,
        reference: &str,
        context: &str,
    ) -> Result<NodeId, ManifestError> {
        resolve_reference(registry, &self.module, reference).ok_or_else(|| {
            ManifestError::UnknownReference {
                reference: reference.to_owned(),
                context: context.to_owned(),
            }
        })
    }

    fn kind_spec(
        &self,
        registry: &Registry,
        owner: &str,
        name: &str,
        entry: Option<&KindEntry>,
    ) -> Result<KindSpec, ManifestError> {
        let table = match entry {
            None => return Ok(KindSpec::bare()),
            Some(KindEntry::Value(value)) => return Ok(KindSpec::valued(value.clone())),
            Some(KindEntry::Table(table)) => table,
        };

        let annotation = match (&table.ancestors, table.placeholder) {
            (Some(_), true) => {
                return Err(invalid(
                    owner,
                    name,
                    "placeholder cannot also name ancestors".to_owned(),
                ));
            }
            (None, true) => Annotation::Unspecialized,
            (None, false) => Annotation::Bare,
            (Some(references), false) => {
                let mut set = BTreeSet::new();
                for reference in references {
                    let id = resolve_reference(registry, &self.module, reference).ok_or_else(
                        || invalid(owner, name, format!("`{reference}` is not a known error type")),
                    )?;
                    set.insert(id);
                }
                Annotation::WithAncestors(set)
            }
        };

        let mut spec = KindSpec::bare().annotated(annotation);
        spec.explicit_value.clone_from(&table.value);
        let nested_owner = format!("{owner}@{name}");
        for (sub, sub_entry) in &table.kinds {
            let sub_spec = self.kind_spec(registry, &nested_owner, sub, sub_entry.as_ref())?;
            spec = spec.nested(sub.clone(), sub_spec);
        }
        Ok(spec)
    }
}

/// Resolve `Name`, `Name.kind.sub` or `module:Name.kind` against `registry`.
pub fn resolve_reference(registry: &Registry, module: &str, reference: &str) -> Option<NodeId> {
    let (module, path) = reference.split_once(':').unwrap_or((module, reference));
    let mut segments = path.split('.');
    let head = segments.next()?;
    let mut id = registry
        .lookup(module, head)
        .or_else(|| registry.lookup(BUILTIN_MODULE, head))?;
    for segment in segments {
        id = registry.kind(id, segment)?;
    }
    Some(id)
}

fn invalid(node: &str, kind: &str, reason: String) -> ManifestError {
    ManifestError::Taxonomy(TaxonomyError::InvalidKindAnnotation {
        node: node.to_owned(),
        kind: kind.to_owned(),
        reason,
    })
}
