//! Static constructors: immediate resolve, immediate reject, and the
//! all-of aggregator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use core_types::{SettleFn, Value};

use crate::deferred::Deferred;
use crate::state::Reaction;

impl Deferred {
    /// Creates a deferred value settled through resolution with `value`.
    ///
    /// Adoption applies: a thenable flattens to its eventual outcome
    /// instead of becoming the settled value.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use deferred_value::Deferred;
    ///
    /// let plain = Deferred::resolve(Value::Smi(5));
    /// assert_eq!(plain.value(), Some(Value::Smi(5)));
    ///
    /// let nested = Deferred::resolve(Value::from(plain));
    /// assert_eq!(nested.value(), Some(Value::Smi(5)));
    /// ```
    pub fn resolve(value: Value) -> Deferred {
        Deferred::new(move |mut on_fulfilled, _on_rejected| {
            on_fulfilled(value);
            Ok(())
        })
    }

    /// Creates a deferred value rejected with `reason`. No adoption: even
    /// a thenable reason is stored verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use deferred_value::Deferred;
    ///
    /// let failed = Deferred::reject(Value::String("boom".to_string()));
    /// assert!(failed.is_rejected());
    /// ```
    pub fn reject(reason: Value) -> Deferred {
        Deferred::new(move |_on_fulfilled, mut on_rejected| {
            on_rejected(reason);
            Ok(())
        })
    }

    /// Aggregates a fixed collection of items, each a plain value or a
    /// thenable, into one deferred value.
    ///
    /// Succeeds with a [`Value::List`] index-aligned with the input once
    /// every item has settled successfully; fails with the first failure
    /// reason encountered. Later settlements of other items are ignored
    /// after a failure; nothing is cancelled. An empty input succeeds
    /// immediately with an empty list.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    /// use deferred_value::Deferred;
    ///
    /// let combined = Deferred::all(vec![
    ///     Value::from(Deferred::resolve(Value::Smi(1))),
    ///     Value::Smi(2),
    ///     Value::from(Deferred::resolve(Value::Smi(3))),
    /// ]);
    ///
    /// assert_eq!(
    ///     combined.value(),
    ///     Some(Value::List(vec![Value::Smi(1), Value::Smi(2), Value::Smi(3)]))
    /// );
    /// ```
    pub fn all(items: Vec<Value>) -> Deferred {
        let aggregate = Deferred::pending();
        if items.is_empty() {
            aggregate.resolve_value(Value::List(Vec::new()));
            return aggregate;
        }

        let remaining = Arc::new(AtomicUsize::new(items.len()));
        let slots: Arc<Mutex<Vec<Option<Value>>>> = Arc::new(Mutex::new(vec![None; items.len()]));

        for (index, item) in items.into_iter().enumerate() {
            // Resolution handles plain values and thenables uniformly, and
            // keeps flattening nested thenables down to a terminal value.
            let entry = Deferred::resolve(item);

            let on_fulfilled: SettleFn = {
                let aggregate = aggregate.clone();
                let remaining = remaining.clone();
                let slots = slots.clone();
                Box::new(move |value| {
                    slots.lock()[index] = Some(value);
                    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                        let collected: Vec<Value> = slots
                            .lock()
                            .iter_mut()
                            .map(|slot| slot.take().unwrap_or(Value::Undefined))
                            .collect();
                        aggregate.resolve_value(Value::List(collected));
                    }
                })
            };

            let on_rejected: SettleFn = {
                let aggregate = aggregate.clone();
                Box::new(move |reason| aggregate.settle_rejected(reason))
            };

            entry.register_reaction(Reaction::new(Some(on_fulfilled), Some(on_rejected)));
        }

        aggregate
    }
}
