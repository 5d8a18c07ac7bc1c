//! Arena-backed chip graphs built from a single NAND primitive.
//!
//! This crate defines the construction side of the toolkit: typed I/O records
//! ([`Schema`], [`schema!`]), the [`Chip`] trait that every composite kind
//! implements, the single-owner [`Builder`] that allocates nodes, and the
//! deferred-output machinery that lets chips form feedback loops. A finished
//! [`ChipGraph`] is immutable and is what evaluators and renderers consume.

#![warn(missing_docs)]

pub mod arena;
pub mod builder;
pub mod chip;
pub mod cyclic;
pub mod deferred;
pub mod error;
pub mod graph;
pub mod ids;
pub mod mermaid;
pub mod node;
pub mod schema;

pub use arena::{Arena, ArenaId};
pub use builder::Builder;
pub use chip::Chip;
pub use cyclic::{CyclicScope, Pending};
pub use deferred::DeferredOutput;
pub use error::BuildError;
pub use graph::{ChipGraph, Edge, GroupInfo, Port, StateCheck};
pub use ids::{DeferredId, GroupId, NodeId, NodeRange};
pub use node::{Input, Node, NodeKind, Pin};
pub use schema::{Schema, SchemaError};
