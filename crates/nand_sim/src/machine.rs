//! Typed evaluation of a top-level chip kind.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::evaluator::{Evaluator, Step};
use nand_ir::{Chip, ChipGraph, Schema};
use std::marker::PhantomData;

/// A built and compiled instance of chip kind `C`.
///
/// Inputs and outputs use `C`'s own records, so callers never index into
/// positional vectors.
pub struct Machine<C: Chip> {
    evaluator: Evaluator,
    _chip: PhantomData<fn() -> C>,
}

impl<C: Chip> Machine<C> {
    /// Builds `C` with one terminal per input slot and compiles it.
    pub fn new() -> Result<Self, SimError> {
        Self::with_config(SimConfig::default())
    }

    /// Like [`new`](Self::new) with explicit settling parameters.
    pub fn with_config(config: SimConfig) -> Result<Self, SimError> {
        let graph = ChipGraph::of::<C>()?;
        Ok(Self {
            evaluator: Evaluator::with_config(graph, config)?,
            _chip: PhantomData,
        })
    }

    /// Evaluates one step.
    pub fn process(
        &mut self,
        inputs: C::Inputs<bool>,
    ) -> Result<Step<C::Outputs<bool>>, SimError> {
        let step = self.evaluator.process(&inputs.into_flat())?;
        let outputs = <C::Outputs<bool> as Schema<bool>>::from_flat(step.outputs)?;
        Ok(Step {
            outputs,
            unstable: step.unstable,
        })
    }

    /// The underlying untyped evaluator.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Mutable access to the untyped evaluator, e.g. for [`Evaluator::reset`].
    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    /// The graph being evaluated.
    pub fn graph(&self) -> &ChipGraph {
        self.evaluator.graph()
    }
}

impl<C: Chip> std::fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("chip", &C::LABEL)
            .field("cycle", &self.evaluator.cycle())
            .finish()
    }
}
