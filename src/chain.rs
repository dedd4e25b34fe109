//! Merged layered lookup over a template chain and a context chain
//!
//! [`ChainProvider`] flattens the two parent-linked provider chains into one
//! ordered list of layers and answers property queries against it. The layer
//! order, root-most first, is: template root to template leaf, then context
//! root to context leaf. Lookups walk from the most specific layer toward the
//! root and stop at the first hit, so context providers shadow template
//! providers as a group, and within each chain the leaf shadows its parents.
//!
//! Layers are explicit; there is no reliance on any prototype mechanism.
//! Each layer records which provider contributed it, so every resolved value
//! reports the id that produced it.

use std::collections::HashMap;
use std::fmt;

use crate::error::ChainError;
use crate::provider::Provider;
use crate::value::Value;

/// Entry names the resolver claims for itself; providers may not define them.
pub const RESERVED_LOCATIONS: [&str; 3] = ["debug", "iterate", "parent"];

/// Which of the two chains a provider belongs to, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Template,
    Context,
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainKind::Template => f.write_str("template"),
            ChainKind::Context => f.write_str("context"),
        }
    }
}

/// The merged-lookup contribution of a single provider.
#[derive(Debug)]
struct Layer {
    id: String,
    entries: HashMap<String, Value>,
}

/// Queryable merge of a template chain and an optional context chain.
#[derive(Debug)]
pub struct ChainProvider {
    /// Root-most layer first; the last layer is the leaf of the whole merge.
    layers: Vec<Layer>,
    /// Provider id to position in `layers`.
    by_id: HashMap<String, usize>,
}

impl ChainProvider {
    /// Validate both chains and fold them into the layered lookup.
    ///
    /// Validation walks each chain from its head up through the parent links
    /// and fails on the first provider without an id, phrasing the failure
    /// through the previously visited provider (or `Root` for the head).
    /// Folding rejects a provider whose id is already present in the merge.
    pub fn build(template: &Provider, context: Option<&Provider>) -> Result<Self, ChainError> {
        validate_chain(template, ChainKind::Template)?;
        if let Some(context) = context {
            validate_chain(context, ChainKind::Context)?;
        }

        // Push each chain head-to-root, context first; popping then folds the
        // template chain root-to-leaf followed by the context chain
        // root-to-leaf, leaving context layers closest to the merged leaf.
        let mut pending: Vec<&Provider> = Vec::new();
        if let Some(context) = context {
            let mut cursor = Some(context);
            while let Some(provider) = cursor {
                pending.push(provider);
                cursor = provider.parent();
            }
        }
        let mut cursor = Some(template);
        while let Some(provider) = cursor {
            pending.push(provider);
            cursor = provider.parent();
        }

        let mut layers = Vec::with_capacity(pending.len());
        let mut by_id = HashMap::new();
        while let Some(provider) = pending.pop() {
            if by_id.contains_key(provider.id()) {
                return Err(ChainError::DuplicateId {
                    id: provider.id().to_string(),
                });
            }
            let mut entries = provider.entries().clone();
            // The id itself resolves as a property; the parent link never does.
            entries.insert("id".to_string(), Value::String(provider.id().to_string()));
            by_id.insert(provider.id().to_string(), layers.len());
            layers.push(Layer {
                id: provider.id().to_string(),
                entries,
            });
        }

        Ok(ChainProvider { layers, by_id })
    }

    /// Resolve `name` to `(producing provider id, value)`.
    ///
    /// With `from = None` the search starts at the leaf of the whole merge;
    /// with `from = Some(id)` it starts at that provider's layer. Either way
    /// it walks rootward and returns the first layer that defines the name,
    /// or `None` when no layer does (including an unknown `from` id).
    pub fn get(&self, name: &str, from: Option<&str>) -> Option<(&str, &Value)> {
        let start = match from {
            Some(id) => *self.by_id.get(id)?,
            None => self.layers.len().checked_sub(1)?,
        };
        self.layers[..=start]
            .iter()
            .rev()
            .find_map(|layer| layer.entries.get(name).map(|value| (layer.id.as_str(), value)))
    }

    /// The id one layer rootward of `id` in the combined ordering, or `None`
    /// when `id` is the combined root (or unknown).
    pub fn next_id(&self, id: &str) -> Option<&str> {
        let position = *self.by_id.get(id)?;
        let previous = position.checked_sub(1)?;
        Some(self.layers[previous].id.as_str())
    }

    /// Number of layers in the merge.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn validate_chain(head: &Provider, kind: ChainKind) -> Result<(), ChainError> {
    let mut child = "Root".to_string();
    let mut cursor = Some(head);
    while let Some(provider) = cursor {
        if provider.id().is_empty() {
            return Err(ChainError::MissingId { kind, child });
        }
        for name in RESERVED_LOCATIONS {
            if provider.entry(name).is_some() {
                return Err(ChainError::ReservedEntry {
                    kind,
                    id: provider.id().to_string(),
                    name: name.to_string(),
                });
            }
        }
        child = provider.id().to_string();
        cursor = provider.parent();
    }
    Ok(())
}
