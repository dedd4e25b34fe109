//! The render loop and its supporting pieces
//!
//! This module drives resolution: the engine walks the merged chain and
//! dispatches plain values, callables, and the reserved meta-locations
//! (`debug`, `iterate`, `parent`); [`Capability`] is the handle callables
//! use to re-enter resolution; [`DebugView`] is the read-mostly window over
//! the per-render debug record.

mod capability;
mod debug;
mod engine;

pub use capability::Capability;
pub use debug::DebugView;

pub(crate) use debug::DebugRecord;
pub(crate) use engine::Resolver;

/// One active callable invocation: the property being rendered and the id of
/// the provider that defined it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    pub location: String,
    pub provider: String,
}

/// The active invocation chain, most recent frame last. Every recursive
/// render receives its own copy, so sibling branches never observe each
/// other's frames.
pub(crate) type CallStack = Vec<CallFrame>;

/// Render the stack as `location@provider, ...`, most recent frame first.
pub(crate) fn format_stack(stack: &[CallFrame]) -> String {
    stack
        .iter()
        .rev()
        .map(|frame| format!("{}@{}", frame.location, frame.provider))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_stack_most_recent_first() {
        let stack = vec![
            CallFrame {
                location: "main".to_string(),
                provider: "root".to_string(),
            },
            CallFrame {
                location: "header".to_string(),
                provider: "site".to_string(),
            },
        ];
        assert_eq!(format_stack(&stack), "header@site, main@root");
    }

    #[test]
    fn test_format_empty_stack() {
        assert_eq!(format_stack(&[]), "");
    }
}
