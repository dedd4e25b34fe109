//! Per-render debug record and the view handed to user code

use std::cell::Cell;
use std::rc::Rc;

use crate::error::ResolveError;
use crate::provider::Provider;
use crate::value::Value;

use super::{format_stack, CallStack};

/// State shared by every branch of one top-level render: the original
/// chains, the entrypoint, and the mutable debug-marks flag. Rebuilt per
/// invocation, so nothing carries over between renders.
///
/// The marks flag is deliberately shared rather than copied per branch:
/// a handler that toggles it affects every branch still rendering. Callers
/// that interleave deferred branches and toggle the flag will observe that
/// race.
#[derive(Debug)]
pub(crate) struct DebugRecord {
    pub(crate) template: Provider,
    pub(crate) context: Option<Provider>,
    pub(crate) entrypoint: String,
    pub(crate) marks: Cell<bool>,
}

/// Read-mostly view over the debug record.
///
/// Resolving the `debug` meta-location yields one of these (as
/// [`Value::Debug`]); [`Capability::debug`](super::Capability::debug) is the
/// direct route. Everything is readable; only the debug-marks flag is
/// writable, and writing any other field is a terminal error that no
/// `404`/`500` handler intercepts.
#[derive(Clone)]
pub struct DebugView {
    record: Rc<DebugRecord>,
    stack: CallStack,
}

impl DebugView {
    pub(crate) fn new(record: Rc<DebugRecord>, stack: CallStack) -> Self {
        DebugView { record, stack }
    }

    /// The template chain head the render was started with.
    pub fn template_chain(&self) -> &Provider {
        &self.record.template
    }

    /// The context chain head, when one was supplied.
    pub fn context_chain(&self) -> Option<&Provider> {
        self.record.context.as_ref()
    }

    /// The entrypoint property name of this render.
    pub fn entrypoint(&self) -> &str {
        &self.record.entrypoint
    }

    /// Current state of the debug-marks flag.
    pub fn debug_marks(&self) -> bool {
        self.record.marks.get()
    }

    /// Toggle debug marks for the rest of this render.
    pub fn set_debug_marks(&self, on: bool) {
        self.record.marks.set(on);
    }

    /// The call-stack trace as seen from the frame that obtained this view,
    /// most recent frame first.
    pub fn print_stack(&self) -> String {
        format_stack(&self.stack)
    }

    /// Write a field by name. Only `debug_marks` accepts writes; every other
    /// field answers with a terminal error.
    pub fn set(&self, field: &str, value: Value) -> Result<(), ResolveError> {
        match (field, value) {
            ("debug_marks", Value::Bool(on)) => {
                self.record.marks.set(on);
                Ok(())
            }
            ("debug_marks", other) => Err(ResolveError::message(format!(
                "debug_marks expects a boolean, got {}",
                other.type_name()
            ))),
            (other, _) => Err(ResolveError::fatal(
                format!("debug field '{}' is read-only", other),
                None,
            )),
        }
    }
}

impl PartialEq for DebugView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.record, &other.record)
    }
}
