//! Trellis - layered template resolution over provider chains
//!
//! A template chain and an optional context chain (each a parent-linked
//! sequence of named property bags) are merged into one layered lookup.
//! Resolving a property searches the context chain first and falls back to
//! the template chain; a resolved callable is invoked with a capability
//! handle that lets it resolve further properties, walk to ancestor
//! providers (`parent`), or map over sequences (`iterate`). Misses and
//! errors redirect to user-overridable `404`/`500` properties.
//!
//! # Example
//!
//! ```rust
//! use trellis::{resolve, Eval, Provider, Value};
//!
//! let template = Provider::new("site")
//!     .value("name", "trellis")
//!     .callable("main", |cap, _args| {
//!         let name = cap.call("name", &[])?;
//!         Ok(Eval::ready(format!("hello from {}", name)))
//!     });
//!
//! let value = resolve(template).unwrap();
//! assert_eq!(value, Value::from("hello from trellis"));
//! ```

pub mod chain;
pub mod chainfile;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod value;

pub use chain::{ChainKind, ChainProvider, RESERVED_LOCATIONS};
pub use chainfile::{ChainFile, ChainFileError};
pub use error::{ChainError, ResolveError};
pub use provider::Provider;
pub use resolver::{CallFrame, Capability, DebugView};
pub use value::{Callable, Deferred, Eval, Value};

use std::cell::Cell;
use std::rc::Rc;

use resolver::{DebugRecord, Resolver};

/// Configuration for a top-level resolution
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Context chain layered over the template chain
    pub context: Option<Provider>,
    /// Property rendered first
    pub entrypoint: String,
    /// Wrap string output in provenance comment markers
    pub debug_marks: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            context: None,
            entrypoint: "main".to_string(),
            debug_marks: false,
        }
    }
}

impl ResolveConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the context chain
    pub fn with_context(mut self, context: Provider) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the entrypoint property (defaults to `main`)
    pub fn with_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.entrypoint = entrypoint.into();
        self
    }

    /// Enable or disable debug marks
    pub fn with_debug_marks(mut self, on: bool) -> Self {
        self.debug_marks = on;
        self
    }
}

/// Resolve the `main` property of a template chain with default configuration
///
/// This is the main entry point for the library. The chain is validated and
/// merged, then the entrypoint is rendered with an empty call stack.
pub fn resolve(template: Provider) -> Result<Value, ResolveError> {
    resolve_with_config(template, ResolveConfig::default())
}

/// Resolve a template chain with custom configuration
///
/// # Example
///
/// ```rust
/// use trellis::{resolve_with_config, Provider, ResolveConfig, Value};
///
/// let template = Provider::new("site").value("main", "fallback");
/// let context = Provider::new("request").value("main", "from context");
///
/// let config = ResolveConfig::new().with_context(context);
/// let value = resolve_with_config(template, config).unwrap();
/// assert_eq!(value, Value::from("from context"));
/// ```
pub fn resolve_with_config(
    template: Provider,
    config: ResolveConfig,
) -> Result<Value, ResolveError> {
    let chain = ChainProvider::build(&template, config.context.as_ref())?;

    let entrypoint = config.entrypoint;
    let debug = Rc::new(DebugRecord {
        template,
        context: config.context,
        entrypoint: entrypoint.clone(),
        marks: Cell::new(config.debug_marks),
    });
    let resolver = Resolver::new(chain, debug);

    // A terminal error wrapping an original error surfaces as the original,
    // with the terminal message appended.
    match resolver.render(Vec::new(), &entrypoint, &[]) {
        Err(ResolveError::Fatal {
            message,
            source: Some(source),
        }) => Err(ResolveError::Message(format!("{} --> {}", source, message))),
        outcome => outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_plain_entrypoint() {
        let template = Provider::new("root").value("main", "hello");
        assert_eq!(resolve(template).unwrap(), Value::from("hello"));
    }

    #[test]
    fn test_resolve_callable_entrypoint() {
        let template = Provider::new("root")
            .value("greeting", "hi")
            .callable("main", |cap, _| Ok(Eval::ready(cap.call("greeting", &[])?)));
        assert_eq!(resolve(template).unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_resolve_custom_entrypoint() {
        let template = Provider::new("root").value("other", 7);
        let config = ResolveConfig::new().with_entrypoint("other");
        assert_eq!(
            resolve_with_config(template, config).unwrap(),
            Value::from(7)
        );
    }

    #[test]
    fn test_context_wins_over_template() {
        let template = Provider::new("site").value("main", "template");
        let context = Provider::new("request").value("main", "context");
        let config = ResolveConfig::new().with_context(context);
        assert_eq!(
            resolve_with_config(template, config).unwrap(),
            Value::from("context")
        );
    }

    #[test]
    fn test_missing_entrypoint_is_error() {
        let err = resolve(Provider::new("root")).unwrap_err();
        assert!(err.to_string().contains("'main' not found"));
    }

    #[test]
    fn test_invalid_chain_fails_before_rendering() {
        let template = Provider::new("").value("main", "never");
        let err = resolve(template).unwrap_err();
        assert!(matches!(err, ResolveError::Chain(_)));
    }
}
