//! Sort-key values.
//!
//! `Value` is what a `SortDescriptor` extracts from a record. Comparison is
//! total so sections never face a fallible ordering:
//!
//! - kinds sort as Null < Boolean < number < String < DateTime
//! - Int64 and Float64 are one numeric kind, compared exactly
//! - NaN is greater than every other number and equal to itself
//!
//! Equality and hashing agree with the ordering, so `Int64(2)` and
//! `Float64(2.0)` are the same key.

use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

/// A totally ordered value extracted from a record for sorting.
#[derive(Clone, Debug)]
pub enum Value {
    /// Missing value, sorts before everything else
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    /// Unix timestamp in milliseconds
    DateTime(i64),
}

// 2^63 as f64; every f64 in [-2^63, 2^63) truncates into i64 exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float64(v) => Some(v),
            Value::Int64(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<i64> {
        match *self {
            Value::DateTime(v) => Some(v),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int64(_) | Value::Float64(_) => 2,
            Value::String(_) => 3,
            Value::DateTime(_) => 4,
        }
    }
}

/// Returns the integer a float is exactly equal to, if any.
fn exact_int(f: f64) -> Option<i64> {
    if !(-I64_BOUND..I64_BOUND).contains(&f) {
        return None;
    }
    let truncated = f as i64;
    (truncated as f64 == f).then_some(truncated)
}

fn cmp_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Compares an integer with a float without rounding the integer.
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() || f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }
    let truncated = f as i64;
    match i.cmp(&truncated) {
        Ordering::Equal => cmp_floats(0.0, f - truncated as f64),
        ord => ord,
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Int64(a), Value::Float64(b)) => cmp_int_float(*a, *b),
            (Value::Float64(a), Value::Int64(b)) => cmp_int_float(*b, *a).reverse(),
            (Value::Float64(a), Value::Float64(b)) => cmp_floats(*a, *b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) if f.is_nan() => u64::MAX.hash(state),
            Value::Float64(f) => match exact_int(*f) {
                Some(i) => i.hash(state),
                None => f.to_bits().hash(state),
            },
            Value::String(s) => s.hash(state),
            Value::DateTime(d) => d.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn test_kind_order() {
        let ascending = [
            Value::Null,
            Value::Boolean(true),
            Value::Int64(i64::MAX),
            Value::String(String::new()),
            Value::DateTime(i64::MIN),
        ];
        for pair in ascending.windows(2) {
            assert!(pair[0] < pair[1], "{:?} < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_mixed_numbers_compare_exactly() {
        assert!(Value::Int64(2) < Value::Float64(2.5));
        assert!(Value::Float64(-0.5) < Value::Int64(0));
        assert_eq!(Value::Int64(2), Value::Float64(2.0));
        assert_eq!(Value::Int64(0), Value::Float64(-0.0));

        // 2^53 + 1 has no f64 representation; rounding would make these equal
        let big = (1i64 << 53) + 1;
        assert!(Value::Int64(big) > Value::Float64((1i64 << 53) as f64));

        assert!(Value::Int64(i64::MAX) < Value::Float64(I64_BOUND));
        assert!(Value::Int64(i64::MIN) > Value::Float64(f64::NEG_INFINITY));
    }

    #[test]
    fn test_nan_sorts_last() {
        assert!(Value::Float64(f64::INFINITY) < Value::Float64(f64::NAN));
        assert!(Value::Int64(i64::MAX) < Value::Float64(f64::NAN));
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let mut keys = HashSet::new();
        keys.insert(Value::Int64(3));
        assert!(keys.contains(&Value::Float64(3.0)));
        assert!(!keys.contains(&Value::Float64(3.5)));
        assert!(!keys.contains(&Value::DateTime(3)));

        keys.insert(Value::Float64(f64::NAN));
        assert!(keys.contains(&Value::Float64(-f64::NAN)));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Int64(7).as_f64(), Some(7.0));
        assert_eq!(Value::from("Seated").as_str(), Some("Seated"));
        assert_eq!(Value::DateTime(1_700_000_000_000).as_datetime(), Some(1_700_000_000_000));
        assert_eq!(Value::Int64(1).as_str(), None);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(4i64)), Value::Int64(4));
        assert!(Value::from(None::<&str>).is_null());
    }
}
