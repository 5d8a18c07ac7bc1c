//! Raw deferred output handles.
//!
//! A deferred handle stands in for an output that does not exist yet, so that
//! two chips can each consume the other's output. This module is the raw
//! primitive: nothing here forces a handle to be bound, and a forgotten
//! binding only surfaces when [`Builder::finish`] rejects the graph. Prefer
//! [`Builder::cyclic`], [`Builder::cycle2`] or [`Builder::cycle_n`], which
//! bind every handle they issue.

use crate::arena::Arena;
use crate::builder::Builder;
use crate::error::BuildError;
use crate::ids::{DeferredId, GroupId};
use crate::node::Input;
use serde::{Deserialize, Serialize};

/// Arena record behind a [`DeferredId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredSlot {
    /// The input this handle stands for, once bound.
    pub bound: Option<Input>,
    /// The cyclic scope that issued the handle, if any.
    pub group: Option<GroupId>,
}

/// A placeholder for an output that will be bound later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeferredOutput {
    id: DeferredId,
}

impl DeferredOutput {
    pub(crate) fn new(id: DeferredId) -> Self {
        Self { id }
    }

    /// The handle's ID.
    pub fn id(self) -> DeferredId {
        self.id
    }

    /// The handle as an input binding for other nodes.
    pub fn input(self) -> Input {
        Input::Deferred(self.id)
    }
}

impl From<DeferredOutput> for Input {
    fn from(handle: DeferredOutput) -> Self {
        handle.input()
    }
}

impl Builder {
    /// Issues an unscoped deferred output handle.
    ///
    /// The caller is responsible for calling [`bind`](Self::bind) before
    /// [`finish`](Self::finish); nothing else checks it.
    pub fn defer(&mut self) -> DeferredOutput {
        self.issue_deferred(None)
    }

    pub(crate) fn issue_deferred(&mut self, group: Option<GroupId>) -> DeferredOutput {
        DeferredOutput::new(self.deferred.alloc(DeferredSlot { bound: None, group }))
    }

    /// Binds `handle` to the real signal `target`.
    pub fn bind(&mut self, handle: DeferredOutput, target: Input) -> Result<(), BuildError> {
        let id = handle.id();
        let Some(slot) = self.deferred.try_get(id) else {
            return Err(self.poison(BuildError::UnboundDeferred {
                handle: id,
                group: "foreign".into(),
            }));
        };
        if slot.bound.is_some() {
            return Err(self.poison(BuildError::AlreadyBound(id)));
        }
        if target == Input::Deferred(id) {
            return Err(self.poison(BuildError::DeferredLoop(id)));
        }
        self.deferred[id].bound = Some(target);
        Ok(())
    }

    /// Returns `true` once `handle` has been bound.
    pub fn is_bound(&self, handle: DeferredOutput) -> bool {
        self.deferred
            .try_get(handle.id())
            .is_some_and(|slot| slot.bound.is_some())
    }

    /// Label used in errors for a handle's issuing scope.
    pub(crate) fn deferred_group_label(&self, id: DeferredId) -> String {
        match self.deferred.try_get(id).and_then(|slot| slot.group) {
            Some(group) => self.groups[group].label.clone(),
            None => "unscoped".into(),
        }
    }
}

/// Follows bound handles until a non-deferred input is reached.
///
/// Chains longer than the number of handles can only be loops.
pub(crate) fn resolve(
    deferred: &Arena<DeferredId, DeferredSlot>,
    start: DeferredId,
) -> Result<Input, BuildError> {
    let mut current = start;
    for _ in 0..=deferred.len() {
        let slot = deferred
            .try_get(current)
            .ok_or(BuildError::UnboundDeferred {
                handle: current,
                group: "foreign".into(),
            })?;
        match slot.bound {
            Some(Input::Deferred(next)) => current = next,
            Some(input) => return Ok(input),
            None => {
                return Err(BuildError::UnboundDeferred {
                    handle: current,
                    group: "unscoped".into(),
                })
            }
        }
    }
    Err(BuildError::DeferredLoop(start))
}
