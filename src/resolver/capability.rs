//! The dispatch handle passed to every callable

use crate::error::ResolveError;
use crate::value::Value;

use super::engine::Resolver;
use super::{CallStack, DebugView};

/// The capability handle (`cap`) a callable receives as its first argument.
///
/// It is the only way user code re-enters resolution: [`call`](Self::call)
/// renders any property by name against a copy of the current call stack, so
/// nothing a callable does can corrupt a sibling branch's stack. The
/// remaining methods are sugar over the reserved meta-locations.
pub struct Capability<'r> {
    resolver: &'r Resolver,
    stack: CallStack,
}

impl<'r> Capability<'r> {
    pub(crate) fn new(resolver: &'r Resolver, stack: CallStack) -> Self {
        Capability { resolver, stack }
    }

    /// Resolve `location` with the given positional parameters.
    pub fn call(&self, location: &str, params: &[Value]) -> Result<Value, ResolveError> {
        self.resolver.render(self.stack.clone(), location, params)
    }

    /// Render `target` once per element of `over` (which must be an array),
    /// passing `(element, index, whole array, ...extra)` each time. Answers
    /// with the array of results in element order.
    pub fn iterate(
        &self,
        target: &str,
        over: impl Into<Value>,
        extra: &[Value],
    ) -> Result<Value, ResolveError> {
        let mut params = vec![Value::from(target), over.into()];
        params.extend_from_slice(extra);
        self.call("iterate", &params)
    }

    /// Re-resolve the current frame's property starting above its provider.
    /// A leading string parameter names the ancestor id to jump to.
    pub fn parent(&self, params: &[Value]) -> Result<Value, ResolveError> {
        self.call("parent", params)
    }

    /// The debug view over this render, bound to the current stack.
    pub fn debug(&self) -> DebugView {
        DebugView::new(self.resolver.debug_record(), self.stack.clone())
    }
}
