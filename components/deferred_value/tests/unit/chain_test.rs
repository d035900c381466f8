//! Unit tests for chaining: then, catch, finally, and passthrough rules

use core_types::{SettleFn, Value};
use deferred_value::{Callback, Deferred};
use std::sync::{Arc, Mutex};

/// Stashes the success capability so a test can settle later.
fn pending_with_stashed_success() -> (Deferred, SettleFn) {
    let stash: Arc<Mutex<Option<SettleFn>>> = Arc::new(Mutex::new(None));
    let sink = stash.clone();
    let deferred = Deferred::new(move |settle_success, _settle_failure| {
        *sink.lock().unwrap() = Some(settle_success);
        Ok(())
    });
    let capability = stash.lock().unwrap().take().expect("executor ran");
    (deferred, capability)
}

#[test]
fn then_applies_the_success_handler_to_the_value() {
    let chained = Deferred::resolve(Value::Smi(2)).then(
        Some(Callback::new(|value| {
            Ok(Value::Smi(value.as_smi().unwrap_or(0) * 10))
        })),
        None,
    );
    assert_eq!(chained.value(), Some(Value::Smi(20)));
}

#[test]
fn then_handler_error_rejects_the_derived_value() {
    let chained = Deferred::resolve(Value::Smi(2)).then(
        Some(Callback::new(|_| Err(Value::String("broke".to_string())))),
        None,
    );
    assert_eq!(chained.reason(), Some(Value::String("broke".to_string())));
}

#[test]
fn absent_handlers_pass_the_outcome_through_unchanged() {
    let passed = Deferred::resolve(Value::Smi(1)).then(None, None);
    assert_eq!(passed.value(), Some(Value::Smi(1)));

    let propagated = Deferred::reject(Value::String("e".to_string())).then(None, None);
    assert_eq!(propagated.reason(), Some(Value::String("e".to_string())));
}

#[test]
fn rejection_propagates_past_a_success_only_link() {
    let skipped = Arc::new(Mutex::new(false));
    let sink = skipped.clone();

    let chained = Deferred::reject(Value::String("e".to_string())).then(
        Some(Callback::new(move |value| {
            *sink.lock().unwrap() = true;
            Ok(value)
        })),
        None,
    );

    assert_eq!(chained.reason(), Some(Value::String("e".to_string())));
    assert!(!*skipped.lock().unwrap());
}

#[test]
fn fulfillment_passes_through_a_failure_only_link() {
    let skipped = Arc::new(Mutex::new(false));
    let sink = skipped.clone();

    let chained = Deferred::resolve(Value::Smi(7)).then(
        None,
        Some(Callback::new(move |reason| {
            *sink.lock().unwrap() = true;
            Ok(reason)
        })),
    );

    assert_eq!(chained.value(), Some(Value::Smi(7)));
    assert!(!*skipped.lock().unwrap());
}

#[test]
fn catch_recovers_from_a_rejection() {
    let recovered = Deferred::reject(Value::String("oops".to_string())).catch(Callback::new(
        |reason| Ok(Value::String(format!("handled:{}", reason))),
    ));
    assert_eq!(
        recovered.value(),
        Some(Value::String("handled:oops".to_string()))
    );
}

#[test]
fn catch_handler_error_keeps_the_chain_rejected() {
    let chained = Deferred::reject(Value::String("a".to_string()))
        .catch(Callback::new(|_| Err(Value::String("b".to_string()))));
    assert_eq!(chained.reason(), Some(Value::String("b".to_string())));
}

#[test]
fn catch_is_skipped_on_the_success_path() {
    let chained = Deferred::resolve(Value::Smi(3))
        .catch(Callback::new(|_| Ok(Value::String("never".to_string()))));
    assert_eq!(chained.value(), Some(Value::Smi(3)));
}

#[test]
fn handler_returning_a_deferred_is_adopted() {
    let chained = Deferred::resolve(Value::Smi(1)).then(
        Some(Callback::new(|_| {
            Ok(Value::from(Deferred::resolve(Value::Smi(5))))
        })),
        None,
    );
    // The adopted outcome lands, not the handle itself.
    assert_eq!(chained.value(), Some(Value::Smi(5)));
}

#[test]
fn handler_returning_a_rejected_deferred_rejects_the_chain() {
    let chained = Deferred::resolve(Value::Smi(1)).then(
        Some(Callback::new(|_| {
            Ok(Value::from(Deferred::reject(Value::String(
                "inner".to_string(),
            ))))
        })),
        None,
    );
    assert_eq!(chained.reason(), Some(Value::String("inner".to_string())));
}

#[test]
fn handler_returning_a_pending_deferred_delays_the_chain() {
    let (inner, mut settle_inner) = pending_with_stashed_success();

    let chained = Deferred::resolve(Value::Smi(1)).then(
        Some(Callback::new(move |_| Ok(Value::from(inner.clone())))),
        None,
    );

    assert!(chained.is_pending());
    settle_inner(Value::Smi(99));
    assert_eq!(chained.value(), Some(Value::Smi(99)));
}

#[test]
fn handlers_on_a_settled_value_run_during_then() {
    let deferred = Deferred::resolve(Value::Smi(1));
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    log.lock().unwrap().push("before");
    let sink = log.clone();
    deferred.then(
        Some(Callback::new(move |value| {
            sink.lock().unwrap().push("handler");
            Ok(value)
        })),
        None,
    );
    log.lock().unwrap().push("after");

    assert_eq!(*log.lock().unwrap(), vec!["before", "handler", "after"]);
}

#[test]
fn handlers_on_a_pending_value_run_during_settlement() {
    let (deferred, mut settle) = pending_with_stashed_success();
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = log.clone();
    deferred.then(
        Some(Callback::new(move |value| {
            sink.lock().unwrap().push("handler");
            Ok(value)
        })),
        None,
    );

    log.lock().unwrap().push("before-settle");
    settle(Value::Smi(1));
    log.lock().unwrap().push("after-settle");

    assert_eq!(
        *log.lock().unwrap(),
        vec!["before-settle", "handler", "after-settle"]
    );
}

#[test]
fn a_chain_of_links_threads_each_result_forward() {
    let chained = Deferred::resolve(Value::Smi(1))
        .then(
            Some(Callback::new(|value| {
                Ok(Value::Smi(value.as_smi().unwrap_or(0) + 1))
            })),
            None,
        )
        .then(
            Some(Callback::new(|value| {
                Ok(Value::Smi(value.as_smi().unwrap_or(0) * 10))
            })),
            None,
        );
    assert_eq!(chained.value(), Some(Value::Smi(20)));
}

#[test]
fn a_rejection_mid_chain_skips_to_the_next_failure_handler() {
    let skipped = Arc::new(Mutex::new(false));
    let sink = skipped.clone();

    let chained = Deferred::resolve(Value::Smi(1))
        .then(
            Some(Callback::new(|_| Err(Value::String("mid".to_string())))),
            None,
        )
        .then(
            Some(Callback::new(move |value| {
                *sink.lock().unwrap() = true;
                Ok(value)
            })),
            None,
        )
        .catch(Callback::new(|reason| {
            Ok(Value::String(format!("caught:{}", reason)))
        }));

    assert_eq!(
        chained.value(),
        Some(Value::String("caught:mid".to_string()))
    );
    assert!(!*skipped.lock().unwrap());
}

#[test]
fn finally_preserves_a_fulfilled_outcome() {
    let runs = Arc::new(Mutex::new(0));
    let counter = runs.clone();

    let settled = Deferred::resolve(Value::Smi(6)).finally(move || {
        *counter.lock().unwrap() += 1;
        // The side effect's value must not replace the original.
        Ok(Value::Smi(99))
    });

    assert_eq!(settled.value(), Some(Value::Smi(6)));
    assert_eq!(*runs.lock().unwrap(), 1);
}

#[test]
fn finally_preserves_a_rejected_outcome() {
    let runs = Arc::new(Mutex::new(0));
    let counter = runs.clone();

    let settled = Deferred::reject(Value::String("e".to_string())).finally(move || {
        *counter.lock().unwrap() += 1;
        Ok(Value::Smi(99))
    });

    assert_eq!(settled.reason(), Some(Value::String("e".to_string())));
    assert_eq!(*runs.lock().unwrap(), 1);
}

#[test]
fn finally_side_effect_waits_for_settlement() {
    let (deferred, mut settle) = pending_with_stashed_success();
    let runs = Arc::new(Mutex::new(0));
    let counter = runs.clone();

    let settled = deferred.finally(move || {
        *counter.lock().unwrap() += 1;
        Ok(Value::Undefined)
    });

    assert_eq!(*runs.lock().unwrap(), 0);
    settle(Value::Smi(2));
    assert_eq!(*runs.lock().unwrap(), 1);
    assert_eq!(settled.value(), Some(Value::Smi(2)));
}

#[test]
fn finally_returning_a_pending_value_delays_redelivery() {
    let (gate, mut open_gate) = pending_with_stashed_success();

    let settled =
        Deferred::resolve(Value::Smi(4)).finally(move || Ok(Value::from(gate.clone())));

    // Re-delivery waits on the side computation.
    assert!(settled.is_pending());
    open_gate(Value::String("ignored".to_string()));
    assert_eq!(settled.value(), Some(Value::Smi(4)));
}

#[test]
fn finally_failure_takes_over_a_success_path() {
    let settled = Deferred::resolve(Value::Smi(6))
        .finally(|| Err(Value::String("cleanup failed".to_string())));
    assert_eq!(
        settled.reason(),
        Some(Value::String("cleanup failed".to_string()))
    );
}

#[test]
fn finally_failure_replaces_an_original_rejection() {
    let settled = Deferred::reject(Value::String("original".to_string()))
        .finally(|| Err(Value::String("cleanup failed".to_string())));
    assert_eq!(
        settled.reason(),
        Some(Value::String("cleanup failed".to_string()))
    );
}
