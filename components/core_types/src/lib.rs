//! Core value types for the deferred-value runtime.
//!
//! This crate provides the foundational types shared by every layer of the
//! primitive: the value representation a deferred computation settles with
//! and the capability trait through which pending computations get adopted.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of settleable values
//! - [`Thenable`] - Capability implemented by adoptable pending computations
//! - [`SettleFn`] - Boxed settle continuation handed out during adoption
//!
//! # Examples
//!
//! ```
//! use core_types::Value;
//!
//! // Values a computation can settle with
//! let num = Value::Smi(42);
//! let reason = Value::String("boom".to_string());
//!
//! assert_eq!(num.as_smi(), Some(42));
//! assert_eq!(reason.to_string(), "boom");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod thenable;
mod value;

pub use thenable::{SettleFn, Thenable};
pub use value::Value;
