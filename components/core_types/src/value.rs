//! Settled-value representation for the deferred-value runtime.
//!
//! This module provides the core `Value` enum covering every shape a
//! deferred value can settle with: inline primitives, aggregate result
//! lists, and adoptable pending computations.

use num_bigint::BigInt;
use std::fmt;
use std::sync::Arc;

use crate::thenable::Thenable;

/// Represents any value a deferred computation can produce or fail with.
///
/// Primitive values are stored inline. Aggregation results are held as an
/// ordered [`List`](Value::List), and a pending computation travels as a
/// [`Thenable`](Value::Thenable) capability so resolution can adopt it
/// instead of treating it as a terminal value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// let number = Value::Smi(42);
/// let results = Value::List(vec![Value::Smi(1), Value::Smi(2)]);
///
/// assert!(!number.is_thenable());
/// assert_eq!(results.as_list().map(<[Value]>::len), Some(2));
/// ```
#[derive(Clone)]
pub enum Value {
    /// Absent value
    Undefined,
    /// Explicit null value
    Null,
    /// Boolean (true or false)
    Boolean(bool),
    /// Small integer (fits in 32 bits)
    Smi(i32),
    /// IEEE 754 double-precision floating point
    Double(f64),
    /// String value
    String(std::string::String),
    /// Arbitrary precision integer
    BigInt(BigInt),
    /// Ordered collection of values, as produced by aggregation
    List(Vec<Value>),
    /// Adoptable pending computation (shared, thread-safe)
    Thenable(Arc<dyn Thenable>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Smi(n) => f.debug_tuple("Smi").field(n).finish(),
            Value::Double(n) => f.debug_tuple("Double").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::BigInt(n) => f.debug_tuple("BigInt").field(n).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Thenable(_) => write!(f, "Thenable(...)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Smi(a), Value::Smi(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Thenable(a), Value::Thenable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Returns whether this value carries the adoption capability.
    ///
    /// Resolution treats a thenable as a pending computation to adopt
    /// rather than a terminal value; everything else settles as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// assert!(!Value::Smi(5).is_thenable());
    /// assert!(!Value::List(vec![]).is_thenable());
    /// ```
    pub fn is_thenable(&self) -> bool {
        matches!(self, Value::Thenable(_))
    }

    /// Returns a shared handle to the pending computation, if this value
    /// carries one.
    pub fn as_thenable(&self) -> Option<Arc<dyn Thenable>> {
        match self {
            Value::Thenable(inner) => Some(inner.clone()),
            _ => None,
        }
    }

    /// Returns the items of an ordered collection, if this value is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::Value;
    ///
    /// let results = Value::List(vec![Value::Smi(1)]);
    /// assert_eq!(results.as_list(), Some(&[Value::Smi(1)][..]));
    /// assert_eq!(Value::Null.as_list(), None);
    /// ```
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the small-integer payload, if this value is one.
    pub fn as_smi(&self) -> Option<i32> {
        match self {
            Value::Smi(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}


/// Implementation of Display trait for host-style string conversion.
///
/// - undefined → "undefined"
/// - null → "null"
/// - boolean → "true" or "false"
/// - number → decimal representation
/// - list → comma-joined items
/// - thenable → "[object Thenable]"
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert_eq!(Value::Boolean(true).to_string(), "true");
/// assert_eq!(Value::Smi(42).to_string(), "42");
/// assert_eq!(
///     Value::List(vec![Value::Smi(1), Value::Smi(2)]).to_string(),
///     "1,2"
/// );
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Smi(n) => write!(f, "{}", n),
            Value::Double(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    if n.is_sign_positive() {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued doubles display without decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Thenable(_) => write!(f, "[object Thenable]"),
        }
    }
}
