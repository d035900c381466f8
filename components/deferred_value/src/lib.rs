//! Deferred-value primitive with synchronous dispatch.
//!
//! This crate provides a container for the eventual result of an operation
//! that may complete successfully, fail, or still be pending:
//! - One-time settlement guarded against misbehaving producers
//! - Adoption of other pending computations, flattening arbitrarily deep
//! - Chaining with passthrough, plus catch and finally sugar
//! - An all-of aggregator over mixed plain values and thenables
//!
//! # Overview
//!
//! - [`Deferred`] - Cloneable handle to one deferred value
//! - [`DeferredCell`] / [`DeferredState`] - The owned settlement record
//! - [`Reaction`] - Success/failure continuation pair
//! - [`Callback`] / [`Completion`] - User handlers and their explicit
//!   result channel
//!
//! Reactions run synchronously at the point of settlement, or at the point
//! of registration if the value already settled; nothing is deferred to a
//! queue. Waiting is expressed only by registering reactions, never by
//! blocking.
//!
//! # Examples
//!
//! ```
//! use core_types::Value;
//! use deferred_value::{Callback, Deferred};
//!
//! let greeting = Deferred::resolve(Value::String("hello".to_string()));
//! let shouted = greeting.then(
//!     Some(Callback::new(|value| {
//!         Ok(Value::String(format!("{}!", value)))
//!     })),
//!     None,
//! );
//!
//! assert_eq!(shouted.value(), Some(Value::String("hello!".to_string())));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod callback;
mod combinators;
pub mod deferred;
pub mod state;

// Re-export main types at crate root
pub use callback::{Callback, Completion};
pub use deferred::Deferred;
pub use state::{DeferredCell, DeferredState, Reaction, Registered};
