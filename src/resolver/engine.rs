//! Property lookup, dispatch, and error redirection

use std::rc::Rc;

use crate::chain::ChainProvider;
use crate::error::ResolveError;
use crate::value::{Eval, Value};

use super::capability::Capability;
use super::debug::{DebugRecord, DebugView};
use super::{format_stack, CallFrame, CallStack};

/// Drives one top-level render over a built [`ChainProvider`].
pub(crate) struct Resolver {
    chain: ChainProvider,
    debug: Rc<DebugRecord>,
}

impl Resolver {
    pub(crate) fn new(chain: ChainProvider, debug: Rc<DebugRecord>) -> Self {
        Resolver { chain, debug }
    }

    pub(crate) fn debug_record(&self) -> Rc<DebugRecord> {
        self.debug.clone()
    }

    /// Render `location` against its own copy of the call stack.
    ///
    /// Ordinary errors escaping the body are redirected once to the `500`
    /// property with `(location, error, ...params)`. Terminal errors, and any
    /// error raised while already rendering `500`, propagate unchanged.
    pub(crate) fn render(
        &self,
        mut stack: CallStack,
        location: &str,
        params: &[Value],
    ) -> Result<Value, ResolveError> {
        match self.dispatch(&mut stack, location, params) {
            Err(error) if !error.is_terminal() && location != "500" => {
                let mut redirected = Vec::with_capacity(params.len() + 2);
                redirected.push(Value::String(location.to_string()));
                redirected.push(Value::Error(Rc::new(error)));
                redirected.extend_from_slice(params);
                self.render(stack, "500", &redirected)
            }
            outcome => outcome,
        }
    }

    fn dispatch(
        &self,
        stack: &mut CallStack,
        location: &str,
        params: &[Value],
    ) -> Result<Value, ResolveError> {
        match location {
            "debug" => Ok(Value::Debug(DebugView::new(
                self.debug.clone(),
                stack.clone(),
            ))),
            "iterate" => self.iterate(stack, params),
            "parent" => self.parent(stack, params),
            _ => self.lookup(stack, location, None, params),
        }
    }

    /// Render `target` once per element of the sequence parameter, each
    /// element against a fresh copy of the stack. The element renders run in
    /// order; a failing element propagates out of the whole iteration after
    /// its own render has finished handling it.
    fn iterate(&self, stack: &mut CallStack, params: &[Value]) -> Result<Value, ResolveError> {
        let target = match params.first() {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(ResolveError::message(format!(
                    "iterate needs a property name, got {}",
                    other.type_name()
                )))
            }
            None => {
                return Err(ResolveError::message(
                    "iterate needs a property name and a sequence",
                ))
            }
        };
        let items = match params.get(1) {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                return Err(ResolveError::message(format!(
                    "cannot iterate over {}",
                    other.type_name()
                )))
            }
            None => {
                return Err(ResolveError::message(
                    "iterate needs a sequence to iterate over",
                ))
            }
        };
        let extra = params.get(2..).unwrap_or(&[]);

        let whole = Value::Array(items.clone());
        let mut results = Vec::with_capacity(items.len());
        for (index, element) in items.into_iter().enumerate() {
            let mut element_params = Vec::with_capacity(extra.len() + 3);
            element_params.push(element);
            element_params.push(Value::from(index));
            element_params.push(whole.clone());
            element_params.extend_from_slice(extra);
            results.push(self.render(stack.clone(), &target, &element_params)?);
        }
        Ok(Value::Array(results))
    }

    /// Re-resolve the head frame's property name, starting one layer above
    /// the provider that defined it. A leading string parameter names a
    /// target ancestor id: the walk repeats `next_id` until it reaches the
    /// target, or runs off the root and proceeds as not-found.
    fn parent(&self, stack: &mut CallStack, params: &[Value]) -> Result<Value, ResolveError> {
        let Some(head) = stack.last().cloned() else {
            return Err(ResolveError::message(
                "parent requires an active call frame",
            ));
        };
        let (target, forwarded) = match params.first() {
            Some(Value::String(id)) => (Some(id.clone()), &params[1..]),
            _ => (None, params),
        };

        let mut ancestor = self.chain.next_id(&head.provider).map(str::to_string);
        if let Some(target) = target {
            while let Some(id) = ancestor.clone() {
                if id == target {
                    break;
                }
                ancestor = self.chain.next_id(&id).map(str::to_string);
            }
        }

        match ancestor {
            Some(id) => self.lookup(stack, &head.location, Some(id.as_str()), forwarded),
            None => self.not_found(stack, &head.location, None, forwarded),
        }
    }

    fn lookup(
        &self,
        stack: &mut CallStack,
        name: &str,
        start: Option<&str>,
        params: &[Value],
    ) -> Result<Value, ResolveError> {
        let Some((provider, value)) = self.chain.get(name, start) else {
            return self.not_found(stack, name, start, params);
        };
        let provider = provider.to_string();
        match value {
            Value::Callable(callable) => {
                let callable = callable.clone();
                stack.push(CallFrame {
                    location: name.to_string(),
                    provider: provider.clone(),
                });
                let capability = Capability::new(self, stack.clone());
                let mut step = callable.invoke(&capability, params)?;
                // The single continue-when-ready point: force deferred steps
                // until a value appears. A frame left on the stack here means
                // the callable failed, and the `500` render sees that frame.
                let value = loop {
                    match step {
                        Eval::Ready(value) => break value,
                        Eval::Deferred(deferred) => step = deferred.run()?,
                    }
                };
                stack.pop();
                Ok(self.marked(name, &provider, value))
            }
            plain => {
                let plain = plain.clone();
                Ok(self.marked(name, &provider, plain))
            }
        }
    }

    /// Miss handling. A miss while rendering `500` with an error parameter
    /// turns terminal, chaining that error; a miss while rendering `404`
    /// turns terminal naming the resource that started the redirection.
    /// Every other miss re-renders `404` with
    /// `(location, start id or null, ...params)`.
    fn not_found(
        &self,
        stack: &mut CallStack,
        name: &str,
        start: Option<&str>,
        params: &[Value],
    ) -> Result<Value, ResolveError> {
        if name == "500" {
            if let Some(Value::Error(original)) = params.get(1) {
                return Err(ResolveError::fatal(
                    format!("trellis stack: {}", format_stack(stack)),
                    Some((**original).clone()),
                ));
            }
        }
        if name == "404" {
            let missing = params
                .first()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            return Err(ResolveError::fatal(
                format!(
                    "'{}' not found, trellis stack: {}",
                    missing,
                    format_stack(stack)
                ),
                None,
            ));
        }

        let mut redirected = Vec::with_capacity(params.len() + 2);
        redirected.push(Value::String(name.to_string()));
        redirected.push(match start {
            Some(id) => Value::String(id.to_string()),
            None => Value::Null,
        });
        redirected.extend_from_slice(params);
        self.render(stack.clone(), "404", &redirected)
    }

    /// Wrap string output in provenance markers when debug marks are on.
    /// Non-string values pass through untouched.
    fn marked(&self, location: &str, provider: &str, value: Value) -> Value {
        if !self.debug.marks.get() {
            return value;
        }
        match value {
            Value::String(s) => Value::String(format!(
                "<!--{}@{}-->{}<!--\\{}@{}-->",
                location, provider, s, location, provider
            )),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::provider::Provider;

    fn resolver(template: Provider, marks: bool) -> Resolver {
        let chain = ChainProvider::build(&template, None).unwrap();
        let debug = Rc::new(DebugRecord {
            template,
            context: None,
            entrypoint: "main".to_string(),
            marks: Cell::new(marks),
        });
        Resolver::new(chain, debug)
    }

    #[test]
    fn test_marked_wraps_strings_only() {
        let r = resolver(Provider::new("root"), true);
        assert_eq!(
            r.marked("main", "root", Value::from("hi")),
            Value::from("<!--main@root-->hi<!--\\main@root-->")
        );
        assert_eq!(r.marked("main", "root", Value::from(2)), Value::from(2));
    }

    #[test]
    fn test_marked_off_by_default() {
        let r = resolver(Provider::new("root"), false);
        assert_eq!(r.marked("main", "root", Value::from("hi")), Value::from("hi"));
    }

    #[test]
    fn test_plain_value_leaves_no_frame() {
        let r = resolver(Provider::new("root").value("x", 1), false);
        let mut stack = Vec::new();
        let value = r.lookup(&mut stack, "x", None, &[]).unwrap();
        assert_eq!(value, Value::from(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_missing_location_without_handlers_is_terminal() {
        let r = resolver(Provider::new("root"), false);
        let err = r.render(Vec::new(), "missing", &[]).unwrap_err();
        assert!(err.is_terminal());
        assert!(err.to_string().contains("'missing' not found"));
    }
}
