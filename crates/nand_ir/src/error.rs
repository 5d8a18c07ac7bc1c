//! Construction-time error types.
//!
//! Every variant describes a wiring bug in the circuit being built. None of
//! them is recoverable: a builder that returned one of these refuses to
//! produce a [`ChipGraph`](crate::graph::ChipGraph).

use crate::ids::{DeferredId, NodeId};
use crate::schema::SchemaError;

/// Errors raised while building a chip graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A chip instance was given fewer inputs than its schema declares.
    #[error("chip `{chip}` is missing a binding for input `{slot}`")]
    MissingInput {
        /// Label of the chip kind.
        chip: String,
        /// First input slot left without a binding.
        slot: String,
    },

    /// A chip instance was given more inputs than its schema declares.
    #[error("chip `{chip}` takes {expected} inputs, got {actual}")]
    UnexpectedInput {
        /// Label of the chip kind.
        chip: String,
        /// Number of declared input slots.
        expected: usize,
        /// Number of inputs supplied.
        actual: usize,
    },

    /// An output was requested by a name the node does not declare.
    #[error("node {node} (`{kind}`) has no output named `{name}`")]
    UnknownOutput {
        /// The node that was queried.
        node: NodeId,
        /// The node's kind identifier.
        kind: String,
        /// The requested output name.
        name: String,
    },

    /// An input references an output slot index the node does not have.
    #[error("node {node} has no output slot {slot}")]
    UnknownSlot {
        /// The referenced node.
        node: NodeId,
        /// The out-of-range slot index.
        slot: u32,
    },

    /// An input references a node that this builder never allocated.
    #[error("reference to node {0} which does not belong to this graph")]
    DanglingNode(NodeId),

    /// A terminal reference points at a node that is not a terminal.
    #[error("node {0} is not an input terminal")]
    NotATerminal(NodeId),

    /// A deferred handle was bound a second time.
    #[error("deferred handle {0} is already bound")]
    AlreadyBound(DeferredId),

    /// A deferred handle was still unbound when its scope or the build ended.
    #[error("deferred handle {handle} in group `{group}` was never bound")]
    UnboundDeferred {
        /// The unbound handle.
        handle: DeferredId,
        /// Label of the scope that issued it, or `unscoped` for raw handles.
        group: String,
    },

    /// A deferred handle resolves, directly or through other handles, to itself.
    #[error("deferred handle {0} is bound to itself")]
    DeferredLoop(DeferredId),

    /// A chip declared in one builder's cyclic scope was built in another's.
    #[error("chip `{chip}` was declared by a different builder than scope `{group}`")]
    ForeignPending {
        /// Label of the declared chip kind.
        chip: String,
        /// Label of the scope that tried to build it.
        group: String,
    },

    /// A flat slot vector did not match a chip's record shape.
    #[error("schema mismatch in `{chip}`: {source}")]
    Schema {
        /// Label of the chip kind.
        chip: String,
        /// The underlying shape error.
        #[source]
        source: SchemaError,
    },

    /// The builder already reported an error and will not finish.
    #[error("construction was aborted by an earlier error: {0}")]
    Poisoned(String),
}

impl BuildError {
    /// Wraps a [`SchemaError`] raised while converting records of `chip`.
    pub fn schema(chip: impl Into<String>, source: SchemaError) -> Self {
        BuildError::Schema {
            chip: chip.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_display() {
        let e = BuildError::MissingInput {
            chip: "And".into(),
            slot: "b".into(),
        };
        assert_eq!(e.to_string(), "chip `And` is missing a binding for input `b`");
    }

    #[test]
    fn unexpected_input_display() {
        let e = BuildError::UnexpectedInput {
            chip: "Not".into(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(e.to_string(), "chip `Not` takes 1 inputs, got 2");
    }

    #[test]
    fn unknown_output_display() {
        let e = BuildError::UnknownOutput {
            node: NodeId::from_raw(4),
            kind: "SrLatch".into(),
            name: "z".into(),
        };
        assert_eq!(e.to_string(), "node n4 (`SrLatch`) has no output named `z`");
    }

    #[test]
    fn unbound_deferred_display() {
        let e = BuildError::UnboundDeferred {
            handle: DeferredId::from_raw(2),
            group: "latch".into(),
        };
        assert_eq!(
            e.to_string(),
            "deferred handle d2 in group `latch` was never bound"
        );
    }

    #[test]
    fn schema_error_keeps_source() {
        use std::error::Error;
        let e = BuildError::schema(
            "Mux",
            SchemaError::WidthMismatch {
                expected: 3,
                actual: 1,
            },
        );
        assert!(e.source().is_some());
        assert_eq!(
            e.to_string(),
            "schema mismatch in `Mux`: expected 3 slot values, got 1"
        );
    }

    #[test]
    fn foreign_pending_display() {
        let e = BuildError::ForeignPending {
            chip: "Nand".into(),
            group: "latch".into(),
        };
        assert_eq!(
            e.to_string(),
            "chip `Nand` was declared by a different builder than scope `latch`"
        );
    }

    #[test]
    fn poisoned_display() {
        let e = BuildError::Poisoned("boom".into());
        assert_eq!(
            e.to_string(),
            "construction was aborted by an earlier error: boom"
        );
    }
}
