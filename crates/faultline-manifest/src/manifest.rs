//! Typed manifest structures and the YAML loader.
//!
//! A manifest mirrors what a programmer would otherwise write with
//! [`NodeDecl`](faultline_core::NodeDecl): externals first, then taxonomy
//! nodes in declaration order. Every section is optional.
//!
//! ```yaml
//! module: billing
//! externals:
//!   - name: TimeoutError
//! taxonomies:
//!   - name: PaymentError
//!     kinds:
//!       declined:
//!       expired: "card expired"
//!       timeout:
//!         value: "gateway timed out"
//!         ancestors: [TimeoutError]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::ManifestError;

/// Top-level manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyManifest {
    /// Module every declared type is placed in.
    #[serde(default = "default_module")]
    pub module: String,

    /// Foreign error types, registered before any taxonomy.
    #[serde(default)]
    pub externals: Vec<ExternalEntry>,

    /// Taxonomy nodes, declared in document order.
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyEntry>,
}

impl Default for TaxonomyManifest {
    fn default() -> Self {
        Self {
            module: default_module(),
            externals: Vec::new(),
            taxonomies: Vec::new(),
        }
    }
}

impl TaxonomyManifest {
    /// Load a manifest from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be read, or
    /// [`ManifestError::Yaml`] if the content is not a valid manifest.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)?;
        let manifest = Self::parse(&contents)?;
        tracing::debug!(
            path = %path.display(),
            module = %manifest.module,
            externals = manifest.externals.len(),
            taxonomies = manifest.taxonomies.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse a manifest from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Yaml`] if the string is not a valid manifest.
    pub fn parse(yaml: &str) -> Result<Self, ManifestError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// A foreign error type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalEntry {
    /// Type name.
    pub name: String,

    /// Parent types. Empty means the `Exception` marker.
    #[serde(default)]
    pub parents: Vec<String>,
}

/// A taxonomy node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyEntry {
    /// Node name.
    pub name: String,

    /// Ordered bases. Empty means the `Error` root.
    #[serde(default)]
    pub bases: Vec<String>,

    /// Declared kinds. A null entry is a bare kind.
    #[serde(default)]
    pub kinds: BTreeMap<String, Option<KindEntry>>,
}

/// One declared kind: either its display text, or a full table.
///
/// Any YAML scalar is accepted as display text, so `not_found: 404` reads
/// as the value `"404"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KindEntry {
    /// Shorthand for `{ value: ... }`.
    Value(#[serde(deserialize_with = "scalar_text")] String),
    /// Full form.
    Table(KindTable),
}

/// Full form of a declared kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindTable {
    /// Explicit display text. Any scalar is accepted.
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub value: Option<String>,

    /// Extra ancestors: one foreign type, or a union of several.
    #[serde(default)]
    pub ancestors: Option<Vec<String>>,

    /// Mark the kind with the "not yet specialized" placeholder.
    #[serde(default)]
    pub placeholder: bool,

    /// Kinds nested under this one.
    #[serde(default)]
    pub kinds: BTreeMap<String, Option<KindEntry>>,
}

fn default_module() -> String {
    "main".to_owned()
}

/// Render a YAML scalar (string, number or bool) as display text.
fn scalar(value: serde_yml::Value) -> Option<String> {
    match value {
        serde_yml::Value::String(text) => Some(text),
        serde_yml::Value::Number(number) => Some(number.to_string()),
        serde_yml::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    scalar(serde_yml::Value::deserialize(deserializer)?).ok_or_else(not_scalar::<D>)
}

fn optional_scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yml::Value::deserialize(deserializer)? {
        serde_yml::Value::Null => Ok(None),
        other => scalar(other).map(Some).ok_or_else(not_scalar::<D>),
    }
}

fn not_scalar<'de, D: Deserializer<'de>>() -> D::Error {
    <D::Error as serde::de::Error>::custom("kind value must be a string, number or bool")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let manifest = TaxonomyManifest::parse("{}").unwrap();
        assert_eq!(manifest, TaxonomyManifest::default());
        assert_eq!(manifest.module, "main");
    }

    #[test]
    fn kind_forms_parse() {
        let manifest = TaxonomyManifest::parse(
            r#"
taxonomies:
  - name: PaymentError
    kinds:
      declined:
      expired: "card expired"
      pending:
        placeholder: true
      timeout:
        value: "gateway timed out"
        ancestors: [TimeoutError]
"#,
        )
        .unwrap();

        let kinds = &manifest.taxonomies.first().unwrap().kinds;
        assert_eq!(kinds.get("declined"), Some(&None));
        assert_eq!(
            kinds.get("expired"),
            Some(&Some(KindEntry::Value("card expired".to_owned())))
        );
        assert_eq!(
            kinds.get("pending"),
            Some(&Some(KindEntry::Table(KindTable {
                placeholder: true,
                ..KindTable::default()
            })))
        );
        let Some(Some(KindEntry::Table(timeout))) = kinds.get("timeout") else {
            panic!("timeout should parse as a table");
        };
        assert_eq!(timeout.value.as_deref(), Some("gateway timed out"));
        assert_eq!(timeout.ancestors, Some(vec!["TimeoutError".to_owned()]));
    }

    #[test]
    fn nested_kinds_parse() {
        let manifest = TaxonomyManifest::parse(
            r"
taxonomies:
  - name: PaymentError
    kinds:
      gateway:
        kinds:
          refused: gateway refused
",
        )
        .unwrap();
        let kinds = &manifest.taxonomies.first().unwrap().kinds;
        let Some(Some(KindEntry::Table(gateway))) = kinds.get("gateway") else {
            panic!("gateway should parse as a table");
        };
        assert_eq!(
            gateway.kinds.get("refused"),
            Some(&Some(KindEntry::Value("gateway refused".to_owned())))
        );
    }

    #[test]
    fn scalar_kind_values_become_text() {
        let manifest = TaxonomyManifest::parse(
            r"
taxonomies:
  - name: HttpError
    kinds:
      not_found: 404
      retryable: true
      teapot:
        value: 418
",
        )
        .unwrap();
        let kinds = &manifest.taxonomies.first().unwrap().kinds;
        assert_eq!(
            kinds.get("not_found"),
            Some(&Some(KindEntry::Value("404".to_owned())))
        );
        assert_eq!(
            kinds.get("retryable"),
            Some(&Some(KindEntry::Value("true".to_owned())))
        );
        let Some(Some(KindEntry::Table(teapot))) = kinds.get("teapot") else {
            panic!("teapot should parse as a table");
        };
        assert_eq!(teapot.value.as_deref(), Some("418"));
    }

    #[test]
    fn sequence_kind_value_is_rejected() {
        let result = TaxonomyManifest::parse(
            r"
taxonomies:
  - name: HttpError
    kinds:
      not_found: [404]
",
        );
        assert!(matches!(result, Err(ManifestError::Yaml { .. })));
    }

    #[test]
    fn unknown_top_level_field_is_rejected() {
        let result = TaxonomyManifest::parse("modules: billing\n");
        assert!(matches!(result, Err(ManifestError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = TaxonomyManifest::from_file(Path::new("/nonexistent/faultline.yaml"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }
}
