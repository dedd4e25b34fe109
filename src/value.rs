//! Property values: plain data, callables, and evaluation results
//!
//! Provider entries hold [`Value`]s. Most are plain data (strings, numbers,
//! arrays, ...); a [`Value::Callable`] is invoked by the resolver with a
//! [`Capability`] handle and the caller's parameters. Two further variants
//! only ever travel through the engine itself: [`Value::Error`] carries a
//! render error into a `500` handler, and [`Value::Debug`] is the view
//! returned for the `debug` meta-location.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::ResolveError;
use crate::resolver::{Capability, DebugView};

/// A single resolvable value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A function entry, invoked when the property resolves.
    Callable(Callable),
    /// A render error in flight to a `500` handler.
    Error(Rc<ResolveError>),
    /// The read-mostly debug view.
    Debug(DebugView),
}

impl Value {
    /// Human-readable name for the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Callable(_) => "callable",
            Value::Error(_) => "error",
            Value::Debug(_) => "debug view",
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(map) => f.debug_tuple("Object").field(map).finish(),
            Value::Callable(_) => f.write_str("Callable(..)"),
            Value::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            Value::Debug(_) => f.write_str("Debug(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Callable(_) => f.write_str("<callable>"),
            Value::Error(e) => write!(f, "{}", e),
            Value::Debug(_) => f.write_str("<debug>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Value::Error(a), Value::Error(b)) => a.to_string() == b.to_string(),
            (Value::Debug(a), Value::Debug(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

/// A reference-counted function entry.
///
/// Callables receive the capability handle bound to the current call frame
/// and the caller's positional parameters; they answer with an [`Eval`] so a
/// result may be produced immediately or deferred.
#[derive(Clone)]
pub struct Callable(Rc<dyn Fn(&Capability<'_>, &[Value]) -> Result<Eval, ResolveError>>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Capability<'_>, &[Value]) -> Result<Eval, ResolveError> + 'static,
    {
        Callable(Rc::new(f))
    }

    pub(crate) fn invoke(
        &self,
        capability: &Capability<'_>,
        params: &[Value],
    ) -> Result<Eval, ResolveError> {
        (self.0)(capability, params)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// The result of one evaluation step: a finished value, or a computation the
/// resolver must run before the value exists.
///
/// This is the crate's sync/async seam. The render loop forces deferred
/// steps, one after another, at a single continue-when-ready point; a call
/// tree in which every callable answers [`Eval::Ready`] completes without a
/// deferred step ever being built.
pub enum Eval {
    Ready(Value),
    Deferred(Deferred),
}

impl Eval {
    /// Wrap a finished value.
    pub fn ready(value: impl Into<Value>) -> Self {
        Eval::Ready(value.into())
    }

    /// Defer the rest of the computation.
    pub fn deferred<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Eval, ResolveError> + 'static,
    {
        Eval::Deferred(Deferred::new(f))
    }
}

impl From<Value> for Eval {
    fn from(value: Value) -> Self {
        Eval::Ready(value)
    }
}

/// A boxed one-shot computation producing the next [`Eval`] step.
pub struct Deferred(Box<dyn FnOnce() -> Result<Eval, ResolveError>>);

impl Deferred {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Eval, ResolveError> + 'static,
    {
        Deferred(Box::new(f))
    }

    /// Run the computation. Consumes the step; a deferred computation runs
    /// at most once.
    pub fn run(self) -> Result<Eval, ResolveError> {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}
