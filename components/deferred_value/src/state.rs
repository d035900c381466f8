//! Settlement state machine for deferred values.
//!
//! This module provides the owned settlement record behind every deferred
//! value: its lifecycle state, the queue of registered reactions, and the
//! transition functions that are the only mutation points. Dispatch is a
//! one-time drain; the queue is never read again after the state leaves
//! Pending.

use core_types::{SettleFn, Value};

/// The lifecycle state of a deferred value.
///
/// The settled payload lives inside the variant, so a settled state always
/// carries exactly one value or reason. The transition happens exactly
/// once, Pending to Fulfilled or Pending to Rejected; no other transition
/// is legal and [`DeferredCell`] refuses every further attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredState {
    /// The initial state; neither a value nor a reason has arrived.
    Pending,
    /// Settled successfully with a terminal value.
    Fulfilled(Value),
    /// Settled as failed with a reason.
    Rejected(Value),
}

impl DeferredState {
    /// Returns whether the state is still Pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, DeferredState::Pending)
    }

    /// Returns whether the state has settled either way.
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Returns whether the state settled successfully.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, DeferredState::Fulfilled(_))
    }

    /// Returns whether the state settled as failed.
    pub fn is_rejected(&self) -> bool {
        matches!(self, DeferredState::Rejected(_))
    }
}

/// A pair of optional continuations registered against a deferred value.
///
/// On settlement the continuation matching the outcome runs with the
/// settled payload; a reaction lacking the applicable continuation is
/// simply not invoked at this layer. Passthrough for absent handlers is a
/// chaining concern, one layer up.
pub struct Reaction {
    on_fulfilled: Option<SettleFn>,
    on_rejected: Option<SettleFn>,
}

impl Reaction {
    /// Creates a reaction from optional success and failure continuations.
    pub fn new(on_fulfilled: Option<SettleFn>, on_rejected: Option<SettleFn>) -> Self {
        Self {
            on_fulfilled,
            on_rejected,
        }
    }

    /// Consumes the reaction, invoking its success continuation with the
    /// settled value if one was supplied.
    pub fn dispatch_fulfilled(self, value: Value) {
        if let Some(mut continuation) = self.on_fulfilled {
            continuation(value);
        }
    }

    /// Consumes the reaction, invoking its failure continuation with the
    /// settled reason if one was supplied.
    pub fn dispatch_rejected(self, reason: Value) {
        if let Some(mut continuation) = self.on_rejected {
            continuation(reason);
        }
    }
}

impl std::fmt::Debug for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reaction {{ on_fulfilled: {}, on_rejected: {} }}",
            if self.on_fulfilled.is_some() {
                "Some(...)"
            } else {
                "None"
            },
            if self.on_rejected.is_some() {
                "Some(...)"
            } else {
                "None"
            },
        )
    }
}

/// Outcome of registering a reaction against a [`DeferredCell`].
///
/// The cell never runs continuations itself; when registration hits an
/// already settled cell it hands the reaction back, together with a
/// snapshot of the outcome, so the caller can dispatch after releasing
/// whatever lock guards the cell.
#[derive(Debug)]
pub enum Registered {
    /// The cell is Pending; the reaction was appended to the queue.
    Queued,
    /// The cell is Fulfilled; dispatch the reaction's success arm now.
    DispatchFulfilled(Reaction, Value),
    /// The cell is Rejected; dispatch the reaction's failure arm now.
    DispatchRejected(Reaction, Value),
}

/// Owned settlement record: state plus the reactions waiting on it.
///
/// The record holds the whole mutable core of one deferred value. Its
/// transition functions enforce settle-once directly, so the invariant can
/// be tested here without any handle or closure machinery around it.
///
/// # Examples
///
/// ```
/// use deferred_value::{DeferredCell, DeferredState};
/// use core_types::Value;
///
/// let mut cell = DeferredCell::new();
/// assert!(cell.state().is_pending());
///
/// let drained = cell.fulfill(Value::Smi(42));
/// assert_eq!(drained.map(|d| d.len()), Some(0));
/// assert!(cell.state().is_fulfilled());
///
/// // A second settlement attempt is ignored.
/// assert!(cell.reject(Value::String("late".to_string())).is_none());
/// assert_eq!(cell.state(), &DeferredState::Fulfilled(Value::Smi(42)));
/// ```
#[derive(Debug)]
pub struct DeferredCell {
    state: DeferredState,
    reactions: Vec<Reaction>,
}

impl DeferredCell {
    /// Creates a fresh Pending cell with an empty reaction queue.
    pub fn new() -> Self {
        Self {
            state: DeferredState::Pending,
            reactions: Vec::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &DeferredState {
        &self.state
    }

    /// Returns whether reactions are queued waiting for settlement.
    pub fn has_pending_reactions(&self) -> bool {
        !self.reactions.is_empty()
    }

    /// Transitions Pending to Fulfilled and drains the reaction queue.
    ///
    /// # Returns
    ///
    /// The reactions to dispatch, in registration order, or `None` if the
    /// cell was already settled and the call was ignored.
    pub fn fulfill(&mut self, value: Value) -> Option<Vec<Reaction>> {
        if !self.state.is_pending() {
            return None;
        }
        self.state = DeferredState::Fulfilled(value);
        Some(std::mem::take(&mut self.reactions))
    }

    /// Transitions Pending to Rejected and drains the reaction queue.
    ///
    /// # Returns
    ///
    /// The reactions to dispatch, in registration order, or `None` if the
    /// cell was already settled and the call was ignored.
    pub fn reject(&mut self, reason: Value) -> Option<Vec<Reaction>> {
        if !self.state.is_pending() {
            return None;
        }
        self.state = DeferredState::Rejected(reason);
        Some(std::mem::take(&mut self.reactions))
    }

    /// Registers a reaction: queued while Pending, handed back for
    /// immediate dispatch once settled.
    pub fn register(&mut self, reaction: Reaction) -> Registered {
        match &self.state {
            DeferredState::Pending => {
                self.reactions.push(reaction);
                Registered::Queued
            }
            DeferredState::Fulfilled(value) => {
                Registered::DispatchFulfilled(reaction, value.clone())
            }
            DeferredState::Rejected(reason) => Registered::DispatchRejected(reaction, reason.clone()),
        }
    }
}

impl Default for DeferredCell {
    fn default() -> Self {
        Self::new()
    }
}
