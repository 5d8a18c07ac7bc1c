//! The untyped evaluator: one compiled plan plus the latched state of every
//! cyclic group.
//!
//! Each [`Evaluator::process`] call runs the plan's stages in order. Acyclic
//! gates are computed once. A cyclic group is seeded from its latched values
//! and iterated with simultaneous updates until no member changes (settled:
//! the values become the new latch) or the iteration bound runs out
//! (unstable: the values at the bound are used for this call only and the
//! latch is kept). A group that converges to a state failing one of its
//! [`StateCheck`](nand_ir::StateCheck)s is unstable in the same way.

use crate::config::{SimConfig, UnstablePolicy};
use crate::error::SimError;
use crate::plan::{CyclicGroup, Plan, PlanGate, Source, Stage};
use nand_ir::{ChipGraph, GroupId};
use serde::Serialize;
use std::collections::BTreeSet;

/// The result of one `process` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step<T> {
    /// Output values in declaration order (or as a typed record).
    pub outputs: T,
    /// Groups that failed to settle during this call.
    pub unstable: BTreeSet<GroupId>,
}

impl<T> Step<T> {
    /// Returns `true` if every cyclic group settled.
    pub fn is_stable(&self) -> bool {
        self.unstable.is_empty()
    }

    /// Converts the outputs, keeping the instability report.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        Step {
            outputs: f(self.outputs),
            unstable: self.unstable,
        }
    }
}

/// Summary of one cyclic group, as listed by [`Evaluator::groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    /// Identity used in [`Step::unstable`].
    pub id: GroupId,
    /// Label of the declaring scope or a synthetic `feedback#k`.
    pub label: String,
    /// Number of gates in the group.
    pub size: usize,
}

enum Outcome {
    Settled(usize),
    Unstable,
}

/// Runs a [`ChipGraph`] one discrete step at a time.
#[derive(Debug, Clone)]
pub struct Evaluator {
    graph: ChipGraph,
    plan: Plan,
    config: SimConfig,
    values: Vec<bool>,
    latched: Vec<Vec<bool>>,
    last_inputs: Vec<bool>,
    cycle: u64,
}

impl Evaluator {
    /// Compiles `graph` with default settings.
    pub fn new(graph: ChipGraph) -> Result<Self, SimError> {
        Self::with_config(graph, SimConfig::default())
    }

    /// Compiles `graph` with explicit settling parameters.
    pub fn with_config(graph: ChipGraph, config: SimConfig) -> Result<Self, SimError> {
        let plan = Plan::compile(&graph)?;
        let terminals = plan.terminals;
        let values = vec![false; plan.gates.len()];
        let latched = plan
            .groups
            .iter()
            .map(|group| vec![false; group.gates.len()])
            .collect();
        Ok(Self {
            graph,
            plan,
            config,
            values,
            last_inputs: vec![false; terminals],
            latched,
            cycle: 0,
        })
    }

    /// The graph being evaluated.
    pub fn graph(&self) -> &ChipGraph {
        &self.graph
    }

    /// The settling parameters in use.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of completed `process` calls.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Every cyclic group, in evaluation order.
    pub fn groups(&self) -> Vec<GroupSummary> {
        self.plan
            .groups
            .iter()
            .map(|group| GroupSummary {
                id: group.id,
                label: group.label.clone(),
                size: group.gates.len(),
            })
            .collect()
    }

    /// Values the group will be seeded with on the next call, one per member
    /// gate in ascending gate order. Empty for an unknown group.
    pub fn latched(&self, group: GroupId) -> &[bool] {
        self.latched
            .get(group.as_raw() as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns every group to the all-false power-up seed.
    pub fn reset(&mut self) {
        self.values.fill(false);
        self.last_inputs.fill(false);
        for latch in &mut self.latched {
            latch.fill(false);
        }
        self.cycle = 0;
    }

    /// Evaluates one step.
    ///
    /// `inputs` holds one value per external terminal, in declaration order.
    pub fn process(&mut self, inputs: &[bool]) -> Result<Step<Vec<bool>>, SimError> {
        if inputs.len() != self.plan.terminals {
            return Err(SimError::InputArity {
                expected: self.plan.terminals,
                actual: inputs.len(),
            });
        }

        let mut unstable = BTreeSet::new();
        for i in 0..self.plan.stages.len() {
            let stage = self.plan.stages[i];
            match stage {
                Stage::Gate(g) => {
                    self.values[g] = compute(&self.plan.gates[g], inputs, &self.values);
                }
                Stage::Group(k) => match self.settle(k, inputs) {
                    Outcome::Settled(iterations) => tracing::trace!(
                        "group `{}` settled after {iterations} iterations",
                        self.plan.groups[k].label
                    ),
                    Outcome::Unstable => {
                        unstable.insert(self.plan.groups[k].id);
                    }
                },
            }
        }
        self.last_inputs.clear();
        self.last_inputs.extend_from_slice(inputs);

        let outputs = self
            .plan
            .outputs
            .iter()
            .map(|&source| read(source, inputs, &self.values))
            .collect();
        self.cycle += 1;
        tracing::debug!(
            "cycle {} of `{}`: {} unstable groups",
            self.cycle,
            self.graph.label,
            unstable.len()
        );

        if !unstable.is_empty() && self.config.on_unstable == UnstablePolicy::Error {
            let groups = unstable
                .iter()
                .map(|id| self.plan.groups[id.as_raw() as usize].label.clone())
                .collect();
            return Err(SimError::Unstable {
                cycle: self.cycle,
                groups,
            });
        }
        Ok(Step { outputs, unstable })
    }

    /// Checks that one more iteration from the latched values of `group`,
    /// under the inputs and values of the last call, changes nothing.
    ///
    /// Nothing is committed. Always `true` for an unknown group.
    pub fn is_fixed_point(&self, group: GroupId) -> bool {
        let Some(plan_group) = self.plan.groups.get(group.as_raw() as usize) else {
            return true;
        };
        let mut values = self.values.clone();
        seed(&mut values, plan_group, self.latched(group));
        iterate(&self.plan.gates, plan_group, &self.last_inputs, &values)
            .iter()
            .zip(self.latched(group))
            .all(|(next, latched)| next == latched)
    }

    fn settle(&mut self, k: usize, inputs: &[bool]) -> Outcome {
        let group = &self.plan.groups[k];
        let bound = self.config.iteration_bound(group.gates.len());
        seed(&mut self.values, group, &self.latched[k]);

        for iteration in 1..=bound {
            let next = iterate(&self.plan.gates, group, inputs, &self.values);
            let changed = group
                .gates
                .iter()
                .zip(&next)
                .any(|(&g, &value)| self.values[g] != value);
            tracing::trace!("group `{}` iteration {iteration}: {next:?}", group.label);
            for (&g, &value) in group.gates.iter().zip(&next) {
                self.values[g] = value;
            }
            if !changed {
                let valid = group.checks.iter().all(|c| {
                    let [a, b] = c.sources;
                    c.check
                        .holds([read(a, inputs, &self.values), read(b, inputs, &self.values)])
                });
                if !valid {
                    tracing::warn!(
                        "group `{}` settled to a forbidden state; keeping latched state",
                        group.label
                    );
                    return Outcome::Unstable;
                }
                self.latched[k] = next;
                return Outcome::Settled(iteration);
            }
        }

        tracing::warn!(
            "group `{}` did not settle within {bound} iterations; keeping latched state",
            group.label
        );
        Outcome::Unstable
    }
}

fn seed(values: &mut [bool], group: &CyclicGroup, latched: &[bool]) {
    for (&g, &value) in group.gates.iter().zip(latched) {
        values[g] = value;
    }
}

/// One simultaneous update: every member computed from the current values.
fn iterate(gates: &[PlanGate], group: &CyclicGroup, inputs: &[bool], values: &[bool]) -> Vec<bool> {
    group
        .gates
        .iter()
        .map(|&g| compute(&gates[g], inputs, values))
        .collect()
}

fn compute(gate: &PlanGate, inputs: &[bool], values: &[bool]) -> bool {
    !(read(gate.a, inputs, values) && read(gate.b, inputs, values))
}

fn read(source: Source, inputs: &[bool], values: &[bool]) -> bool {
    match source {
        Source::Const(level) => level,
        Source::Terminal(i) => inputs[i],
        Source::Gate(g) => values[g],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nand_ir::{BuildError, Builder, Chip, Input, Pin, StateCheck};

    nand_ir::schema! {
        struct PairIn { a, b }
    }

    nand_ir::schema! {
        struct Out { out }
    }

    struct Gate;

    impl Chip for Gate {
        const LABEL: &'static str = "Gate";
        type Inputs<T> = PairIn<T>;
        type Outputs<T> = Out<T>;

        fn build(builder: &mut Builder, inputs: PairIn<Input>) -> Result<Out<Input>, BuildError> {
            Ok(Out {
                out: builder.nand(inputs.a, inputs.b),
            })
        }
    }

    fn nand_gate() -> Evaluator {
        Evaluator::new(ChipGraph::of::<Gate>().unwrap()).unwrap()
    }

    /// Cross-coupled NAND latch with active-low set and reset.
    fn sr_latch() -> Evaluator {
        let mut b = Builder::new();
        let s = b.terminal("s_n");
        let r = b.terminal("r_n");
        let (q, qn) = b
            .cyclic("latch", |scope| {
                let top = scope.declare::<Gate>()?;
                let bottom = scope.declare::<Gate>()?;
                let fb = bottom.outputs().out;
                let q = scope.build(top, |_| Ok(PairIn { a: s, b: fb }))?;
                let qn = scope.build(bottom, |_| Ok(PairIn { a: r, b: q.out }))?;
                scope.require(StateCheck::Complementary(q.out, qn.out));
                Ok((q, qn))
            })
            .unwrap();
        let graph = b
            .finish("sr", vec![Pin::new("q", q.out), Pin::new("qn", qn.out)])
            .unwrap();
        Evaluator::new(graph).unwrap()
    }

    /// Three inverters in a ring, gated by `en`.
    fn ring(config: SimConfig) -> Evaluator {
        let mut b = Builder::new();
        let en = b.terminal("en");
        let ring = b
            .cycle_n::<Gate, 3>("ring", |_, i, peers| {
                Ok(PairIn {
                    a: en,
                    b: peers[(i + 2) % 3].out,
                })
            })
            .unwrap();
        let graph = b.finish("ring", vec![Pin::new("out", ring[2].out)]).unwrap();
        Evaluator::with_config(graph, config).unwrap()
    }

    const LATCH: GroupId = GroupId::from_raw(0);

    #[test]
    fn nand_truth_table() {
        let mut m = nand_gate();
        assert_eq!(m.process(&[true, true]).unwrap().outputs, vec![false]);
        assert_eq!(m.process(&[false, false]).unwrap().outputs, vec![true]);
        assert_eq!(m.process(&[true, false]).unwrap().outputs, vec![true]);
        assert_eq!(m.cycle(), 3);
    }

    #[test]
    fn acyclic_evaluation_is_repeatable() {
        let mut m = nand_gate();
        let first = m.process(&[true, false]).unwrap();
        let second = m.process(&[true, false]).unwrap();
        assert_eq!(first, second);
        assert!(first.is_stable());
    }

    #[test]
    fn input_arity_is_checked() {
        let mut m = nand_gate();
        let err = m.process(&[true]).unwrap_err();
        assert_eq!(
            err,
            SimError::InputArity {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(m.cycle(), 0);
    }

    #[test]
    fn latch_remembers_until_reset() {
        let mut m = sr_latch();
        // Set.
        let step = m.process(&[false, true]).unwrap();
        assert_eq!(step.outputs, vec![true, false]);
        assert!(step.is_stable());
        assert_eq!(m.latched(LATCH), &[true, false]);

        // Hold.
        for _ in 0..3 {
            let step = m.process(&[true, true]).unwrap();
            assert_eq!(step.outputs, vec![true, false]);
            assert!(step.is_stable());
        }

        // Reset.
        let step = m.process(&[true, false]).unwrap();
        assert_eq!(step.outputs, vec![false, true]);
        let step = m.process(&[true, true]).unwrap();
        assert_eq!(step.outputs, vec![false, true]);
    }

    #[test]
    fn contention_is_unstable_and_keeps_latch() {
        let mut m = sr_latch();
        m.process(&[false, true]).unwrap();

        // Both asserted converges to q = q_n = 1, which the latch forbids.
        let step = m.process(&[false, false]).unwrap();
        assert_eq!(step.outputs, vec![true, true]);
        assert_eq!(step.unstable, BTreeSet::from([LATCH]));
        assert_eq!(m.latched(LATCH), &[true, false]);

        // Repeating the same inputs does not drift.
        let again = m.process(&[false, false]).unwrap();
        assert_eq!(again, step);
        assert_eq!(m.latched(LATCH), &[true, false]);

        // Releasing reseeds from the kept state.
        let step = m.process(&[true, true]).unwrap();
        assert!(step.is_stable());
        assert_eq!(step.outputs, vec![true, false]);
    }

    #[test]
    fn unchecked_latch_accepts_contention() {
        let mut b = Builder::new();
        let s = b.terminal("s_n");
        let r = b.terminal("r_n");
        let (q, qn) = b
            .cycle2::<Gate, Gate>(
                "latch",
                |_, qn| Ok(PairIn { a: s, b: qn.out }),
                |_, q| Ok(PairIn { a: r, b: q.out }),
            )
            .unwrap();
        let graph = b
            .finish("sr", vec![Pin::new("q", q.out), Pin::new("qn", qn.out)])
            .unwrap();
        let mut m = Evaluator::new(graph).unwrap();
        let step = m.process(&[false, false]).unwrap();
        assert!(step.is_stable());
        assert_eq!(m.latched(LATCH), &[true, true]);
    }

    #[test]
    fn unstable_policy_error_fails_the_call() {
        let mut m = ring(SimConfig {
            on_unstable: UnstablePolicy::Error,
            ..SimConfig::default()
        });
        // Disabled ring is held high and settles.
        assert!(m.process(&[false]).unwrap().is_stable());
        let err = m.process(&[true]).unwrap_err();
        assert_eq!(
            err,
            SimError::Unstable {
                cycle: 2,
                groups: vec!["ring".into()]
            }
        );
    }

    #[test]
    fn enabled_ring_oscillator_never_settles() {
        let mut m = ring(SimConfig::default());
        assert_eq!(m.groups()[0].size, 3);
        assert_eq!(m.groups()[0].label, "ring");
        for _ in 0..4 {
            assert!(!m.process(&[true]).unwrap().is_stable());
        }
        assert_eq!(m.latched(LATCH), &[false, false, false]);
    }

    #[test]
    fn settled_group_is_a_fixed_point() {
        let mut m = sr_latch();
        m.process(&[false, true]).unwrap();
        assert!(m.is_fixed_point(LATCH));
        m.process(&[true, true]).unwrap();
        assert!(m.is_fixed_point(LATCH));
    }

    #[test]
    fn unsettled_group_is_not_a_fixed_point() {
        let mut m = ring(SimConfig::default());
        m.process(&[true]).unwrap();
        assert!(!m.is_fixed_point(LATCH));
    }

    #[test]
    fn reset_restores_power_up_seed() {
        let mut m = sr_latch();
        m.process(&[false, true]).unwrap();
        m.reset();
        assert_eq!(m.cycle(), 0);
        assert_eq!(m.latched(LATCH), &[false, false]);
    }

    #[test]
    fn unknown_group_has_no_latch() {
        let m = nand_gate();
        assert!(m.latched(GroupId::from_raw(9)).is_empty());
        assert!(m.groups().is_empty());
    }
}
