//! Sequential chips. Each storage cell is a pair of cross-coupled NAND gates
//! closed through a cyclic construction scope.
//!
//! Before its first write a cell holding its state starts from the all-false
//! seed, which is not a valid latch state; the evaluator reports it unstable
//! until the cell is written once.

use crate::gates::{Binary, Nand, Not, Unary};
use nand_ir::{BuildError, Builder, Chip, Input, StateCheck};

nand_ir::schema! {
    /// Active-low set and reset.
    pub struct SrIn { set_n, reset_n }
}

nand_ir::schema! {
    /// Stored bit and its complement.
    pub struct LatchOut { q, q_n }
}

nand_ir::schema! {
    /// Data and a level-sensitive enable.
    pub struct DLatchIn { d, enable }
}

nand_ir::schema! {
    /// Data and clock.
    pub struct DffIn { d, clk }
}

/// Cross-coupled NAND latch.
///
/// Pulling `set_n` low stores 1, pulling `reset_n` low stores 0, and holding
/// both high keeps the stored bit. Both low drives `q` and `q_n` high; the
/// cell requires complementary outputs, so that call is reported unstable
/// and the stored bit survives it.
pub struct SrLatch;

impl Chip for SrLatch {
    const LABEL: &'static str = "SrLatch";
    type Inputs<T> = SrIn<T>;
    type Outputs<T> = LatchOut<T>;

    fn build(builder: &mut Builder, inputs: SrIn<Input>) -> Result<LatchOut<Input>, BuildError> {
        builder.cyclic(Self::LABEL, |scope| {
            let top = scope.declare::<Nand>()?;
            let bottom = scope.declare::<Nand>()?;
            let feedback = bottom.outputs().out;
            let q = scope.build(top, |_| {
                Ok(Binary {
                    a: inputs.set_n,
                    b: feedback,
                })
            })?;
            let q_n = scope.build(bottom, |_| {
                Ok(Binary {
                    a: inputs.reset_n,
                    b: q.out,
                })
            })?;
            scope.require(StateCheck::Complementary(q.out, q_n.out));
            Ok(LatchOut {
                q: q.out,
                q_n: q_n.out,
            })
        })
    }
}

/// Gated D latch: transparent while `enable` is high.
pub struct DLatch;

impl Chip for DLatch {
    const LABEL: &'static str = "DLatch";
    type Inputs<T> = DLatchIn<T>;
    type Outputs<T> = LatchOut<T>;

    fn build(builder: &mut Builder, inputs: DLatchIn<Input>) -> Result<LatchOut<Input>, BuildError> {
        let not_d = builder.instantiate::<Not>(Unary { a: inputs.d })?;
        let set_n = builder.instantiate::<Nand>(Binary {
            a: inputs.d,
            b: inputs.enable,
        })?;
        let reset_n = builder.instantiate::<Nand>(Binary {
            a: not_d.out,
            b: inputs.enable,
        })?;
        builder.instantiate::<SrLatch>(SrIn {
            set_n: set_n.out,
            reset_n: reset_n.out,
        })
    }
}

/// Master-slave D flip-flop capturing `d` on the rising edge of `clk`.
pub struct DFlipFlop;

impl Chip for DFlipFlop {
    const LABEL: &'static str = "DFlipFlop";
    type Inputs<T> = DffIn<T>;
    type Outputs<T> = LatchOut<T>;

    fn build(builder: &mut Builder, inputs: DffIn<Input>) -> Result<LatchOut<Input>, BuildError> {
        let clk_n = builder.instantiate::<Not>(Unary { a: inputs.clk })?;
        let master = builder.instantiate::<DLatch>(DLatchIn {
            d: inputs.d,
            enable: clk_n.out,
        })?;
        builder.instantiate::<DLatch>(DLatchIn {
            d: master.q,
            enable: inputs.clk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nand_ir::ChipGraph;

    #[test]
    fn sr_latch_declares_one_group() {
        let graph = ChipGraph::of::<SrLatch>().unwrap();
        assert_eq!(graph.groups.len(), 1);
        assert_eq!(graph.gate_count(), 2);
        let group = graph.groups.values().next().unwrap();
        assert_eq!(group.label, "SrLatch");
        assert_eq!(group.checks.len(), 1);
    }

    #[test]
    fn flip_flop_has_two_storage_cells() {
        let graph = ChipGraph::of::<DFlipFlop>().unwrap();
        assert_eq!(graph.groups.len(), 2);
        // Inverter, then two latches of inverter + 2 gating + 2 storage gates.
        assert_eq!(graph.gate_count(), 11);
    }
}
