//! A standard library of chips built from the NAND primitive.
//!
//! [`gates`] holds the combinational basics, [`arith`] the adders, and
//! [`latch`] the storage cells whose feedback is closed through cyclic
//! construction scopes. [`registry`] exposes all of them by name.

pub mod arith;
pub mod gates;
pub mod latch;
pub mod registry;

pub use arith::{Add4, FullAdder, HalfAdder};
pub use gates::{And, Demux, Mux, Nand, Not, Or, Xor};
pub use latch::{DFlipFlop, DLatch, SrLatch};
pub use registry::{lookup, ChipEntry};
