//! Providers: named bags of resolvable properties
//!
//! A provider is one node in a chain: a unique string id, an optional parent
//! provider of the same kind, and named entries whose values are plain data
//! or callables. Chains are built leaf-outward with [`Provider::with_parent`].
//!
//! # Example
//!
//! ```rust
//! use trellis::{Eval, Provider};
//!
//! let base = Provider::new("base").value("greeting", "hello");
//! let site = Provider::new("site")
//!     .callable("main", |cap, _args| Ok(Eval::ready(cap.call("greeting", &[])?)))
//!     .with_parent(base);
//!
//! assert_eq!(site.id(), "site");
//! assert_eq!(site.parent().unwrap().id(), "base");
//! ```

use std::collections::HashMap;

use crate::error::ResolveError;
use crate::resolver::Capability;
use crate::value::{Callable, Eval, Value};

/// One node in a template or context chain.
#[derive(Debug, Clone)]
pub struct Provider {
    id: String,
    parent: Option<Box<Provider>>,
    entries: HashMap<String, Value>,
}

impl Provider {
    /// Create a provider with the given id and no entries.
    ///
    /// An empty id is accepted here and rejected when the chain is merged,
    /// so a malformed chain fails as a whole with a message naming the
    /// offending position.
    pub fn new(id: impl Into<String>) -> Self {
        Provider {
            id: id.into(),
            parent: None,
            entries: HashMap::new(),
        }
    }

    /// Attach the parent provider this one inherits from.
    pub fn with_parent(mut self, parent: Provider) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Add a plain data entry.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Add a callable entry.
    pub fn callable<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Capability<'_>, &[Value]) -> Result<Eval, ResolveError> + 'static,
    {
        self.entries
            .insert(name.into(), Value::Callable(Callable::new(f)));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<&Provider> {
        self.parent.as_deref()
    }

    /// Look up one of this provider's own entries (parents not consulted).
    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub(crate) fn entries(&self) -> &HashMap<String, Value> {
        &self.entries
    }
}
