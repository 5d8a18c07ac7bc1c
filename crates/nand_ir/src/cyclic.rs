//! Scoped construction of mutually dependent chips.
//!
//! A cyclic scope issues deferred outputs for every chip in a group before
//! any of them exists, lets each chip be built from inputs that mention its
//! not-yet-built siblings, and binds each deferred output the moment the real
//! chip is built. On scope exit every issued handle must be bound; otherwise
//! the scope fails and the builder is poisoned.
//!
//! [`Builder::cycle2`] and [`Builder::cycle_n`] wrap the protocol for the
//! common shapes so that completing construction is the only way out.

use crate::builder::Builder;
use crate::chip::Chip;
use crate::error::BuildError;
use crate::graph::{GroupInfo, StateCheck};
use crate::ids::{DeferredId, GroupId, NodeRange};
use crate::node::Input;
use crate::schema::{Schema, SchemaError};

/// A chip declared in a cyclic scope but not built yet.
///
/// Must be handed back to [`CyclicScope::build`]; a pending chip that is
/// dropped leaves its handles unbound and fails the scope.
#[must_use = "a declared chip must be built before its cyclic scope ends"]
pub struct Pending<C: Chip> {
    builder: u64,
    handles: Vec<DeferredId>,
    outputs: C::Outputs<Input>,
}

impl<C: Chip> Pending<C> {
    /// The chip's outputs as deferred inputs, usable by its siblings.
    pub fn outputs(&self) -> &C::Outputs<Input> {
        &self.outputs
    }
}

/// An open construction scope for one cyclic group.
pub struct CyclicScope<'b> {
    builder: &'b mut Builder,
    group: GroupId,
    issued: Vec<DeferredId>,
}

impl CyclicScope<'_> {
    /// The group this scope registers.
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// The underlying builder, for acyclic helper logic inside the group.
    pub fn builder(&mut self) -> &mut Builder {
        self.builder
    }

    /// Issues one deferred output per output slot of `C`.
    pub fn declare<C: Chip>(&mut self) -> Result<Pending<C>, BuildError> {
        self.builder.check_live()?;
        let width = <C::Outputs<Input> as Schema<Input>>::WIDTH;
        let handles: Vec<DeferredId> = (0..width)
            .map(|_| self.builder.issue_deferred(Some(self.group)).id())
            .collect();
        self.issued.extend(&handles);
        let outputs = deferred_record::<C>(&handles)
            .map_err(|e| self.builder.poison(BuildError::schema(C::LABEL, e)))?;
        Ok(Pending {
            builder: self.builder.id,
            handles,
            outputs,
        })
    }

    /// Adds a condition the group's settled state must meet to be stored.
    ///
    /// Signals may be deferred outputs of pending chips; they are resolved
    /// when the builder finishes.
    pub fn require(&mut self, check: StateCheck) {
        self.builder.groups[self.group].checks.push(check);
    }

    /// Builds a declared chip and binds its deferred outputs.
    ///
    /// `resolve` produces the chip's inputs; it may read external inputs,
    /// built siblings, and the deferred outputs of pending siblings.
    pub fn build<C: Chip>(
        &mut self,
        pending: Pending<C>,
        resolve: impl FnOnce(&mut Builder) -> Result<C::Inputs<Input>, BuildError>,
    ) -> Result<C::Outputs<Input>, BuildError> {
        self.builder.check_live()?;
        if pending.builder != self.builder.id {
            let err = BuildError::ForeignPending {
                chip: C::LABEL.into(),
                group: self.builder.groups[self.group].label.clone(),
            };
            return Err(self.builder.poison(err));
        }
        let inputs = match resolve(self.builder) {
            Ok(inputs) => inputs,
            Err(e) => return Err(self.builder.poison(e)),
        };
        let outputs = self.builder.instantiate::<C>(inputs)?;
        let real = outputs.into_flat();
        for (&handle, &target) in pending.handles.iter().zip(&real) {
            self.builder
                .bind(crate::deferred::DeferredOutput::new(handle), target)?;
        }
        <C::Outputs<Input> as Schema<Input>>::from_flat(real)
            .map_err(|e| self.builder.poison(BuildError::schema(C::LABEL, e)))
    }
}

impl Builder {
    /// Opens a cyclic construction scope named `label`.
    ///
    /// Every handle issued inside `f` must be bound by the time it returns.
    /// The group's node range covers everything allocated inside the scope.
    pub fn cyclic<R>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut CyclicScope<'_>) -> Result<R, BuildError>,
    ) -> Result<R, BuildError> {
        self.check_live()?;
        let start = self.nodes.next_id();
        let group = self.groups.alloc(GroupInfo {
            label: label.into(),
            nodes: NodeRange::new(start, start),
            checks: Vec::new(),
        });

        let mut scope = CyclicScope {
            builder: self,
            group,
            issued: Vec::new(),
        };
        let result = f(&mut scope);
        let issued = scope.issued;

        let end = self.nodes.next_id();
        self.groups[group].nodes = NodeRange::new(start, end);

        let value = match result {
            Ok(value) => value,
            Err(e) => return Err(self.poison(e)),
        };
        if let Some(&handle) = issued
            .iter()
            .find(|&&id| self.deferred[id].bound.is_none())
        {
            let err = BuildError::UnboundDeferred {
                handle,
                group: self.groups[group].label.clone(),
            };
            return Err(self.poison(err));
        }
        Ok(value)
    }

    /// Builds two mutually dependent chips.
    ///
    /// `resolve_a` sees `B`'s deferred outputs; `resolve_b` runs after `A`
    /// exists and sees its real outputs.
    pub fn cycle2<A: Chip, B: Chip>(
        &mut self,
        label: impl Into<String>,
        resolve_a: impl FnOnce(&mut Builder, &B::Outputs<Input>) -> Result<A::Inputs<Input>, BuildError>,
        resolve_b: impl FnOnce(&mut Builder, &A::Outputs<Input>) -> Result<B::Inputs<Input>, BuildError>,
    ) -> Result<(A::Outputs<Input>, B::Outputs<Input>), BuildError> {
        self.cyclic(label, |scope| {
            let pending_a = scope.declare::<A>()?;
            let pending_b = scope.declare::<B>()?;
            let a = scope.build(pending_a, |b| resolve_a(b, pending_b.outputs()))?;
            let b = scope.build(pending_b, |builder| resolve_b(builder, &a))?;
            Ok((a, b))
        })
    }

    /// Builds `N` mutually dependent instances of `C` in index order.
    ///
    /// `resolve(builder, i, peers)` produces the inputs of instance `i`;
    /// `peers` holds every instance's outputs as deferred inputs.
    pub fn cycle_n<C: Chip, const N: usize>(
        &mut self,
        label: impl Into<String>,
        mut resolve: impl FnMut(
            &mut Builder,
            usize,
            &[C::Outputs<Input>; N],
        ) -> Result<C::Inputs<Input>, BuildError>,
    ) -> Result<[C::Outputs<Input>; N], BuildError> {
        self.cyclic(label, |scope| {
            let mut pending = Vec::with_capacity(N);
            for _ in 0..N {
                pending.push(scope.declare::<C>()?);
            }
            let peers = pending
                .iter()
                .map(|p| deferred_record::<C>(&p.handles))
                .collect::<Result<Vec<_>, _>>()
                .and_then(into_array::<_, N>)
                .map_err(|e| BuildError::schema(C::LABEL, e))?;

            let mut built = Vec::with_capacity(N);
            for (i, p) in pending.into_iter().enumerate() {
                built.push(scope.build(p, |b| resolve(b, i, &peers))?);
            }
            into_array::<_, N>(built).map_err(|e| BuildError::schema(C::LABEL, e))
        })
    }
}

fn deferred_record<C: Chip>(handles: &[DeferredId]) -> Result<C::Outputs<Input>, SchemaError> {
    let inputs = handles.iter().map(|&id| Input::Deferred(id)).collect();
    <C::Outputs<Input> as Schema<Input>>::from_flat(inputs)
}

fn into_array<T, const N: usize>(items: Vec<T>) -> Result<[T; N], SchemaError> {
    let actual = items.len();
    <[T; N]>::try_from(items).map_err(|_| SchemaError::WidthMismatch {
        expected: N,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, Pin};

    crate::schema! {
        struct PairIn { a, b }
    }

    crate::schema! {
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

    #[test]
    fn cycle2_closes_the_loop() {
        let mut b = Builder::new();
        let s = b.terminal("s");
        let r = b.terminal("r");
        let (q, qn) = b
            .cycle2::<Gate, Gate>(
                "latch",
                |_, qn| Ok(PairIn { a: s, b: qn.out }),
                |_, q| Ok(PairIn { a: r, b: q.out }),
            )
            .unwrap();
        let graph = b
            .finish("top", vec![Pin::new("q", q.out), Pin::new("qn", qn.out)])
            .unwrap();

        assert_eq!(graph.groups.len(), 1);
        let group = &graph.groups[GroupId::from_raw(0)];
        assert_eq!(group.label, "latch");
        // Two gates and two chip instances.
        assert_eq!(group.nodes.len(), 4);

        let first_gate = group
            .nodes
            .iter()
            .find(|&id| matches!(graph.nodes[id].kind, NodeKind::Nand { .. }))
            .unwrap();
        match graph.nodes[first_gate].kind {
            NodeKind::Nand { b: feedback, .. } => assert_eq!(feedback, qn.out),
            _ => unreachable!(),
        }
    }

    #[test]
    fn scope_with_unbuilt_chip_fails() {
        let mut b = Builder::new();
        let err = b
            .cyclic("half", |scope| {
                let a = scope.declare::<Gate>()?;
                let forgotten = scope.declare::<Gate>()?;
                let fb = forgotten.outputs().out;
                scope.build(a, |_| Ok(PairIn { a: Input::HIGH, b: fb }))?;
                drop(forgotten);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::UnboundDeferred { ref group, .. } if group == "half"));
        assert!(b.is_poisoned());
        assert!(matches!(
            b.finish("top", Vec::new()),
            Err(BuildError::Poisoned(_))
        ));
    }

    #[test]
    fn error_inside_resolver_poisons() {
        let mut b = Builder::new();
        let err = b
            .cycle2::<Gate, Gate>(
                "bad",
                |builder, _| {
                    builder.instantiate_flat::<Gate>(vec![Input::HIGH])?;
                    unreachable!()
                },
                |_, q| Ok(PairIn { a: q.out, b: q.out }),
            )
            .unwrap_err();
        assert!(matches!(err, BuildError::MissingInput { .. }));
        assert!(b.is_poisoned());
    }

    #[test]
    fn cycle_n_builds_a_ring() {
        let mut b = Builder::new();
        let enable = b.terminal("en");
        let ring = b
            .cycle_n::<Gate, 3>("ring", |_, i, peers| {
                Ok(PairIn {
                    a: enable,
                    b: peers[(i + 2) % 3].out,
                })
            })
            .unwrap();
        let graph = b.finish("ring", vec![Pin::new("out", ring[2].out)]).unwrap();
        assert_eq!(graph.groups[GroupId::from_raw(0)].nodes.len(), 6);

        // Instance 0 reads instance 2 through what used to be a deferred handle.
        let chip0 = ring[0].out.node().unwrap();
        let NodeKind::Chip { body, .. } = &graph.nodes[chip0].kind else {
            panic!("expected chip");
        };
        let gate0 = body.start;
        match graph.nodes[gate0].kind {
            NodeKind::Nand { b: feedback, .. } => assert_eq!(feedback, ring[2].out),
            _ => panic!("expected nand"),
        }
    }

    #[test]
    fn pending_from_another_builder_is_rejected() {
        let mut first = Builder::new();
        let mut stash = None;
        let _ = first.cyclic("origin", |scope| {
            stash = Some(scope.declare::<Gate>()?);
            Ok(())
        });

        let mut second = Builder::new();
        let err = second
            .cyclic("elsewhere", |scope| {
                let pending = stash.take().expect("declared in the first builder");
                scope.build(pending, |_| Ok(PairIn { a: Input::HIGH, b: Input::HIGH }))?;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::ForeignPending {
                chip: "Gate".into(),
                group: "elsewhere".into(),
            }
        );
        assert!(second.is_poisoned());
        assert_eq!(second.deferred.len(), 0);
    }

    #[test]
    fn required_checks_follow_deferred_handles() {
        let mut b = Builder::new();
        let s = b.terminal("s");
        let r = b.terminal("r");
        let (q, qn) = b
            .cyclic("checked", |scope| {
                let top = scope.declare::<Gate>()?;
                let bottom = scope.declare::<Gate>()?;
                scope.require(StateCheck::Complementary(top.outputs().out, bottom.outputs().out));
                let fb = bottom.outputs().out;
                let q = scope.build(top, |_| Ok(PairIn { a: s, b: fb }))?;
                let qn = scope.build(bottom, |_| Ok(PairIn { a: r, b: q.out }))?;
                Ok((q, qn))
            })
            .unwrap();
        let graph = b
            .finish("top", vec![Pin::new("q", q.out), Pin::new("qn", qn.out)])
            .unwrap();
        assert_eq!(
            graph.groups[GroupId::from_raw(0)].checks,
            vec![StateCheck::Complementary(q.out, qn.out)]
        );
    }

    #[test]
    fn scope_group_range_covers_helpers() {
        let mut b = Builder::new();
        let d = b.terminal("d");
        b.cyclic("with-helper", |scope| {
            let p = scope.declare::<Gate>()?;
            let fb = p.outputs().out;
            let inverted = scope.builder().nand(d, d);
            scope.build(p, |_| Ok(PairIn { a: inverted, b: fb }))?;
            Ok(())
        })
        .unwrap();
        assert_eq!(b.groups[GroupId::from_raw(0)].nodes.len(), 3);
    }
}
