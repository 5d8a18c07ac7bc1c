//! Name-based access to the chip library, for callers that pick a chip at
//! runtime.

use crate::arith::{Add4, FullAdder, HalfAdder};
use crate::gates::{And, Demux, Mux, Nand, Not, Or, Xor};
use crate::latch::{DFlipFlop, DLatch, SrLatch};
use nand_ir::{BuildError, Builder, Chip, ChipGraph, Input, Schema};
use nand_sim::{Evaluator, SimConfig, SimError};

/// One library chip, erased to its name and shape.
#[derive(Debug, Clone, Copy)]
pub struct ChipEntry {
    /// Lookup name, lowercase.
    pub name: &'static str,
    /// The chip kind's label.
    pub label: &'static str,
    /// One-line description.
    pub summary: &'static str,
    /// Whether the chip contains storage.
    pub sequential: bool,
    input_names: fn() -> Vec<String>,
    output_names: fn() -> Vec<String>,
    graph: fn() -> Result<ChipGraph, BuildError>,
    instantiate: fn(&mut Builder, Vec<Input>) -> Result<Vec<Input>, BuildError>,
}

impl ChipEntry {
    fn of<C: Chip>(name: &'static str, summary: &'static str, sequential: bool) -> Self {
        Self {
            name,
            label: C::LABEL,
            summary,
            sequential,
            input_names: C::input_names,
            output_names: C::output_names,
            graph: ChipGraph::of::<C>,
            instantiate: instantiate_flat::<C>,
        }
    }

    /// Input slot names in flattening order.
    pub fn input_names(&self) -> Vec<String> {
        (self.input_names)()
    }

    /// Output slot names in flattening order.
    pub fn output_names(&self) -> Vec<String> {
        (self.output_names)()
    }

    /// Builds a top-level graph of the chip.
    pub fn graph(&self) -> Result<ChipGraph, BuildError> {
        (self.graph)()
    }

    /// Builds one instance inside `builder` from inputs in slot order and
    /// returns its outputs in slot order.
    pub fn instantiate(
        &self,
        builder: &mut Builder,
        inputs: Vec<Input>,
    ) -> Result<Vec<Input>, BuildError> {
        (self.instantiate)(builder, inputs)
    }

    /// Builds and compiles a fresh evaluator for the chip.
    pub fn evaluator(&self, config: SimConfig) -> Result<Evaluator, SimError> {
        Evaluator::with_config(self.graph()?, config)
    }
}

fn instantiate_flat<C: Chip>(
    builder: &mut Builder,
    inputs: Vec<Input>,
) -> Result<Vec<Input>, BuildError> {
    builder
        .instantiate_flat::<C>(inputs)
        .map(|outputs| outputs.into_flat())
}

/// Every library chip, combinational first.
pub fn all() -> Vec<ChipEntry> {
    vec![
        ChipEntry::of::<Nand>("nand", "primitive two-input NAND", false),
        ChipEntry::of::<Not>("not", "inverter", false),
        ChipEntry::of::<And>("and", "two-input AND", false),
        ChipEntry::of::<Or>("or", "two-input OR", false),
        ChipEntry::of::<Xor>("xor", "two-input exclusive OR", false),
        ChipEntry::of::<Mux>("mux", "two-way multiplexer", false),
        ChipEntry::of::<Demux>("demux", "two-way demultiplexer", false),
        ChipEntry::of::<HalfAdder>("half_adder", "one-bit adder without carry in", false),
        ChipEntry::of::<FullAdder>("full_adder", "one-bit adder with carry in", false),
        ChipEntry::of::<Add4>("add4", "four-bit ripple-carry adder", false),
        ChipEntry::of::<SrLatch>("sr_latch", "active-low set/reset latch", true),
        ChipEntry::of::<DLatch>("d_latch", "level-sensitive D latch", true),
        ChipEntry::of::<DFlipFlop>("dff", "rising-edge D flip-flop", true),
    ]
}

/// Finds a chip by name. Matching ignores case, `-` and `_`.
pub fn lookup(name: &str) -> Option<ChipEntry> {
    let wanted = normalize(name);
    all().into_iter().find(|entry| {
        normalize(entry.name) == wanted || normalize(entry.label) == wanted
    })
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
