//! User-handler wrapper and the explicit completion result.
//!
//! Handlers never unwind to signal failure; they return a [`Completion`]
//! whose `Err` branch carries the failure reason, and the dispatch layer
//! converts that branch into a rejection.

use core_types::Value;

/// Outcome of invoking a user handler: a produced value, or an abrupt
/// failure carrying the reason.
pub type Completion = Result<Value, Value>;

/// A callable handler attached to a deferred value via chaining.
///
/// # Examples
///
/// ```
/// use core_types::Value;
/// use deferred_value::Callback;
///
/// let mut double = Callback::new(|value| match value.as_smi() {
///     Some(n) => Ok(Value::Smi(n * 2)),
///     None => Err(Value::String("not a number".to_string())),
/// });
///
/// assert_eq!(double.call(Value::Smi(21)), Ok(Value::Smi(42)));
/// ```
pub struct Callback {
    callback: Box<dyn FnMut(Value) -> Completion + Send>,
}

impl Callback {
    /// Creates a new Callback from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(Value) -> Completion + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Calls the handler with the settled payload.
    pub fn call(&mut self, value: Value) -> Completion {
        (self.callback)(value)
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback {{ ... }}")
    }
}
