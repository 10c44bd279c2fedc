//! Raised error values.
//!
//! An [`ErrorValue`] is what invoking a kind produces. It carries the kind
//! that produced it and the caller's arguments, untouched. Display and
//! equality are deliberately decoupled from ancestry:
//!
//! - **Display** renders the kind's value, never its path or name.
//! - **Equality** compares the simple type name and module only. Two kinds
//!   with colliding type names in one module compare equal even when they
//!   are unrelated; catch-style matching goes through
//!   [`Registry::is_a`](crate::Registry::is_a) instead.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::kind::ErrorType;
use crate::node::{NodeId, TypeIdentity};

/// Arguments handed to a kind constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorArgs {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl ErrorArgs {
    /// No arguments.
    pub const fn new() -> Self {
        Self {
            positional: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    /// Build from already-collected parts.
    pub const fn from_parts(positional: Vec<Value>, named: BTreeMap<String, Value>) -> Self {
        Self { positional, named }
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument, replacing any earlier value for `key`.
    #[must_use]
    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }
}

/// A raised error: the producing kind plus its arguments.
#[derive(Debug, Clone)]
pub struct ErrorValue {
    kind: NodeId,
    identity: Arc<TypeIdentity>,
    positional_args: Vec<Value>,
    named_args: BTreeMap<String, Value>,
}

impl ErrorValue {
    pub(crate) fn new(kind: NodeId, identity: Arc<TypeIdentity>, args: ErrorArgs) -> Self {
        Self {
            kind,
            identity,
            positional_args: args.positional,
            named_args: args.named,
        }
    }

    /// The kind that produced this error.
    pub const fn kind(&self) -> NodeId {
        self.kind
    }

    /// Identity of the producing kind.
    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    /// Kind name (`k` for `MyError.k`).
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Display text.
    pub fn value(&self) -> &str {
        self.identity.value()
    }

    /// Qualified path of the producing kind.
    pub fn full_path(&self) -> &str {
        self.identity.full_path()
    }

    /// Positional arguments, in call order.
    pub fn positional_args(&self) -> &[Value] {
        &self.positional_args
    }

    /// Positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional_args.get(index)
    }

    /// Named arguments.
    pub const fn named_args(&self) -> &BTreeMap<String, Value> {
        &self.named_args
    }

    /// Named argument `key`.
    pub fn named_arg(&self, key: &str) -> Option<&Value> {
        self.named_args.get(key)
    }
}

impl core::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.identity.value())
    }
}

impl std::error::Error for ErrorValue {}

// NOTE: name + module only. Widening this to ancestry would change which
// errors existing callers consider equal.
impl PartialEq for ErrorValue {
    fn eq(&self, other: &Self) -> bool {
        self.identity.same_type(&other.identity)
    }
}

impl Eq for ErrorValue {}

impl PartialEq<ErrorType<'_>> for ErrorValue {
    fn eq(&self, other: &ErrorType<'_>) -> bool {
        self.identity.same_type(other.identity())
    }
}

impl PartialEq<ErrorValue> for ErrorType<'_> {
    fn eq(&self, other: &ErrorValue) -> bool {
        other == self
    }
}
