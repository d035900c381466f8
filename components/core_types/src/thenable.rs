//! The adoption capability for pending computations.
//!
//! A value that wants its eventual outcome adopted by a deferred value
//! implements [`Thenable`]. Adoption never probes for a conveniently named
//! method; it checks for this capability explicitly, so unrelated types
//! cannot be mistaken for pending computations.

use crate::value::Value;

/// A settle continuation handed out during adoption.
///
/// Continuations are boxed so they can be stored in reaction queues and
/// moved across threads; they are `FnMut` because a misbehaving
/// implementation may invoke one repeatedly, and the caller's first-call
/// guard is what discards the repeats.
pub type SettleFn = Box<dyn FnMut(Value) + Send>;

/// Capability implemented by values whose eventual outcome can be adopted.
///
/// An adopting deferred value calls [`subscribe`](Thenable::subscribe) once,
/// passing a success continuation and a failure continuation. The
/// implementation should eventually invoke one of them with the outcome.
/// The adopting side guards the pair so that only the first invocation,
/// across both continuations, has any effect; calling both, or calling one
/// twice, is tolerated and ignored.
///
/// # Examples
///
/// ```
/// use core_types::{SettleFn, Thenable, Value};
///
/// /// A computation whose result is already known.
/// struct Immediate(i32);
///
/// impl Thenable for Immediate {
///     fn subscribe(
///         &self,
///         mut on_fulfilled: SettleFn,
///         _on_rejected: SettleFn,
///     ) -> Result<(), Value> {
///         on_fulfilled(Value::Smi(self.0));
///         Ok(())
///     }
/// }
/// ```
pub trait Thenable: Send + Sync {
    /// Registers continuations for this computation's eventual outcome.
    ///
    /// # Arguments
    ///
    /// * `on_fulfilled` - Invoked with the success value
    /// * `on_rejected` - Invoked with the failure reason
    ///
    /// # Returns
    ///
    /// `Err(reason)` reports a failure raised synchronously while
    /// subscribing; the caller routes it to its rejection path unless an
    /// outcome was already delivered through one of the continuations.
    fn subscribe(&self, on_fulfilled: SettleFn, on_rejected: SettleFn) -> Result<(), Value>;
}
