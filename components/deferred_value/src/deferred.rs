//! The deferred-value handle: construction, resolution, and chaining.
//!
//! A [`Deferred`] is a cheap cloneable handle to one settlement record.
//! The producer settles it through the capability pair handed to the
//! executor; consumers observe it through reactions. Dispatch is always
//! synchronous, on whichever call stack triggers it.
//!
//! Lock hygiene: no continuation ever runs while the record's lock is
//! held. Settlement drains the queue under the lock and dispatches after
//! release; registration against a settled record snapshots the outcome
//! under the lock and dispatches after release. At most one record lock is
//! held at any instant, so reentrant call patterns cannot deadlock.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use core_types::{SettleFn, Thenable, Value};

use crate::callback::{Callback, Completion};
use crate::state::{DeferredCell, DeferredState, Reaction, Registered};

/// A deferred value: the eventual result of an operation that may complete
/// successfully, fail, or still be pending.
///
/// Handles are `Clone`; every clone observes the same settlement. A
/// producer reports the result exactly once through the executor's
/// capability pair, and any number of consumers register reactions before
/// or after that happens.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use deferred_value::Deferred;
///
/// let deferred = Deferred::new(|mut settle_success, _settle_failure| {
///     settle_success(Value::Smi(42));
///     Ok(())
/// });
///
/// assert!(deferred.is_fulfilled());
/// assert_eq!(deferred.value(), Some(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Deferred {
    cell: Arc<Mutex<DeferredCell>>,
}

impl Deferred {
    /// Creates a deferred value and synchronously runs `executor` with its
    /// two settle capabilities.
    ///
    /// The capabilities share one first-call-wins guard: among every call
    /// to either one, only the first has any effect. They are `Send` and
    /// may be stored and invoked later from any thread. Never invoking
    /// either leaves the instance Pending for good.
    ///
    /// # Arguments
    ///
    /// * `executor` - Producer invoked once with (settle-as-success,
    ///   settle-as-failure); an `Err` return rejects the instance unless
    ///   an outcome was already delivered.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use deferred_value::Deferred;
    ///
    /// let failed = Deferred::new(|_settle_success, _settle_failure| {
    ///     Err(Value::String("went wrong".to_string()))
    /// });
    ///
    /// assert_eq!(failed.reason(), Some(Value::String("went wrong".to_string())));
    /// ```
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(SettleFn, SettleFn) -> Result<(), Value>,
    {
        let deferred = Deferred::pending();
        deferred.run_guarded(executor);
        deferred
    }

    /// Creates a bare Pending instance with no producer attached.
    pub(crate) fn pending() -> Self {
        Self {
            cell: Arc::new(Mutex::new(DeferredCell::new())),
        }
    }

    /// Returns a snapshot of the current state, including the settled
    /// payload if any.
    pub fn state(&self) -> DeferredState {
        self.cell.lock().state().clone()
    }

    /// Returns whether this instance has not settled yet.
    pub fn is_pending(&self) -> bool {
        self.cell.lock().state().is_pending()
    }

    /// Returns whether this instance has settled either way.
    pub fn is_settled(&self) -> bool {
        self.cell.lock().state().is_settled()
    }

    /// Returns whether this instance settled successfully.
    pub fn is_fulfilled(&self) -> bool {
        self.cell.lock().state().is_fulfilled()
    }

    /// Returns whether this instance settled as failed.
    pub fn is_rejected(&self) -> bool {
        self.cell.lock().state().is_rejected()
    }

    /// Returns the success value, if fulfilled.
    pub fn value(&self) -> Option<Value> {
        match self.cell.lock().state() {
            DeferredState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns the failure reason, if rejected.
    pub fn reason(&self) -> Option<Value> {
        match self.cell.lock().state() {
            DeferredState::Rejected(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Registers a raw reaction on this instance.
    ///
    /// While Pending the reaction is queued; once settled it is dispatched
    /// immediately and synchronously, before this call returns. This is
    /// the low-level hook [`then`](Deferred::then) is built from; most
    /// callers want `then` and its passthrough rules instead.
    pub fn register_reaction(&self, reaction: Reaction) {
        let outcome = self.cell.lock().register(reaction);
        match outcome {
            Registered::Queued => {}
            Registered::DispatchFulfilled(reaction, value) => reaction.dispatch_fulfilled(value),
            Registered::DispatchRejected(reaction, reason) => reaction.dispatch_rejected(reason),
        }
    }

    /// Adds handlers for this instance's outcome and returns the derived
    /// deferred value.
    ///
    /// A present success handler is invoked with the settled value; its
    /// `Ok` feeds the derived value's resolution (a returned thenable is
    /// adopted) and its `Err` becomes the derived value's rejection. An
    /// absent success handler passes the original value through. Failure
    /// dispatch is symmetric: a present failure handler may recover by
    /// returning `Ok`, while an absent one propagates the original reason.
    ///
    /// # Arguments
    ///
    /// * `on_fulfilled` - Optional handler for the success path
    /// * `on_rejected` - Optional handler for the failure path
    ///
    /// # Returns
    ///
    /// The derived deferred value fed by the handlers' outcomes.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use deferred_value::{Callback, Deferred};
    ///
    /// let chained = Deferred::resolve(Value::Smi(2)).then(
    ///     Some(Callback::new(|value| {
    ///         Ok(Value::Smi(value.as_smi().unwrap_or(0) + 1))
    ///     })),
    ///     None,
    /// );
    ///
    /// assert_eq!(chained.value(), Some(Value::Smi(3)));
    /// ```
    pub fn then(&self, on_fulfilled: Option<Callback>, on_rejected: Option<Callback>) -> Deferred {
        let chained = Deferred::pending();
        self.register_reaction(Reaction::new(
            Some(fulfill_link(on_fulfilled, chained.clone())),
            Some(reject_link(on_rejected, chained.clone())),
        ));
        chained
    }

    /// Adds a failure handler. Sugar for `then(None, Some(on_rejected))`.
    pub fn catch(&self, on_rejected: Callback) -> Deferred {
        self.then(None, Some(on_rejected))
    }

    /// Runs `side_effect` once this instance settles, on either path, then
    /// re-delivers the original outcome verbatim.
    ///
    /// The side effect takes no arguments. Its produced value is routed
    /// through resolution, so returning a thenable delays re-delivery
    /// until that side computation settles; the produced value itself is
    /// never substituted into the chain. A side effect that fails takes
    /// over the chain with its own failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use deferred_value::Deferred;
    ///
    /// let settled = Deferred::resolve(Value::Smi(7))
    ///     .finally(|| Ok(Value::String("cleanup ran".to_string())));
    ///
    /// // The original value survives, not the side effect's.
    /// assert_eq!(settled.value(), Some(Value::Smi(7)));
    /// ```
    pub fn finally<F>(&self, side_effect: F) -> Deferred
    where
        F: FnMut() -> Completion + Send + 'static,
    {
        let side_effect = Arc::new(Mutex::new(side_effect));

        let on_fulfilled = {
            let side_effect = side_effect.clone();
            Callback::new(move |value: Value| {
                let completion = {
                    let mut run = side_effect.lock();
                    (*run)()
                };
                let after = match completion {
                    Ok(produced) => Deferred::resolve(produced),
                    Err(reason) => Deferred::reject(reason),
                };
                let restored = after.then(Some(Callback::new(move |_| Ok(value.clone()))), None);
                Ok(Value::from(restored))
            })
        };

        let on_rejected = {
            let side_effect = side_effect.clone();
            Callback::new(move |reason: Value| {
                let completion = {
                    let mut run = side_effect.lock();
                    (*run)()
                };
                let after = match completion {
                    Ok(produced) => Deferred::resolve(produced),
                    Err(inner) => Deferred::reject(inner),
                };
                let raised = after.then(Some(Callback::new(move |_| Err(reason.clone()))), None);
                Ok(Value::from(raised))
            })
        };

        self.then(Some(on_fulfilled), Some(on_rejected))
    }

    /// Resolution procedure: adopt a thenable result, fulfill a plain one.
    ///
    /// Adoption subscribes to the thenable once, under a fresh guard whose
    /// success path re-enters this procedure so nested thenables keep
    /// flattening, and whose failure path rejects this instance.
    pub(crate) fn resolve_value(&self, result: Value) {
        match result.as_thenable() {
            Some(pending) => {
                self.run_guarded(move |on_fulfilled, on_rejected| {
                    pending.subscribe(on_fulfilled, on_rejected)
                });
            }
            None => self.settle_fulfilled(result),
        }
    }

    /// Rejection entry point: a direct transition, never adoption. A
    /// thenable passed as a reason is stored verbatim.
    pub(crate) fn settle_rejected(&self, reason: Value) {
        let drained = self.cell.lock().reject(reason.clone());
        if let Some(reactions) = drained {
            for reaction in reactions {
                reaction.dispatch_rejected(reason.clone());
            }
        }
    }

    /// Fulfillment transition plus the one-time dispatch drain.
    fn settle_fulfilled(&self, value: Value) {
        let drained = self.cell.lock().fulfill(value.clone());
        if let Some(reactions) = drained {
            for reaction in reactions {
                reaction.dispatch_fulfilled(value.clone());
            }
        }
    }

    /// Guarded invocation shared by construction and adoption.
    ///
    /// Wraps a fresh first-call-wins flag around a success capability
    /// (feeding resolution) and a failure capability (feeding rejection),
    /// hands the pair to `executor`, and routes an `Err` return to
    /// rejection unless the flag already fired. This guard is what makes
    /// settle-exactly-once hold against a producer that calls both
    /// capabilities, calls one twice, or fails after settling.
    fn run_guarded<F>(&self, executor: F)
    where
        F: FnOnce(SettleFn, SettleFn) -> Result<(), Value>,
    {
        let done = Arc::new(AtomicBool::new(false));

        let on_fulfilled: SettleFn = {
            let target = self.clone();
            let done = done.clone();
            Box::new(move |value| {
                if !done.swap(true, Ordering::AcqRel) {
                    target.resolve_value(value);
                }
            })
        };

        let on_rejected: SettleFn = {
            let target = self.clone();
            let done = done.clone();
            Box::new(move |reason| {
                if !done.swap(true, Ordering::AcqRel) {
                    target.settle_rejected(reason);
                }
            })
        };

        if let Err(reason) = executor(on_fulfilled, on_rejected) {
            if !done.swap(true, Ordering::AcqRel) {
                self.settle_rejected(reason);
            }
        }
    }
}

/// Builds the success arm of a chaining reaction: run the handler and feed
/// its completion into the derived value, or pass the original through.
fn fulfill_link(handler: Option<Callback>, chained: Deferred) -> SettleFn {
    match handler {
        Some(mut callback) => Box::new(move |value| match callback.call(value) {
            Ok(produced) => chained.resolve_value(produced),
            Err(reason) => chained.settle_rejected(reason),
        }),
        None => Box::new(move |value| chained.resolve_value(value)),
    }
}

/// Builds the failure arm of a chaining reaction: a handler may recover
/// with `Ok`; an absent handler propagates the original reason.
fn reject_link(handler: Option<Callback>, chained: Deferred) -> SettleFn {
    match handler {
        Some(mut callback) => Box::new(move |reason| match callback.call(reason) {
            Ok(produced) => chained.resolve_value(produced),
            Err(reason) => chained.settle_rejected(reason),
        }),
        None => Box::new(move |reason| chained.settle_rejected(reason)),
    }
}

impl Thenable for Deferred {
    fn subscribe(&self, on_fulfilled: SettleFn, on_rejected: SettleFn) -> Result<(), Value> {
        self.register_reaction(Reaction::new(Some(on_fulfilled), Some(on_rejected)));
        Ok(())
    }
}

/// Wraps a handle as an adoptable value, so a deferred value can settle
/// with (and flatten through) another deferred value.
impl From<Deferred> for Value {
    fn from(deferred: Deferred) -> Self {
        Value::Thenable(Arc::new(deferred))
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_lock() {
            Some(cell) => write!(f, "Deferred {{ state: {:?} }}", cell.state()),
            None => write!(f, "Deferred {{ state: <settling> }}"),
        }
    }
}
