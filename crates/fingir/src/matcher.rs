//! Argument matchers.
//!
//! A matcher is a pure, stateless predicate over one candidate argument.
//! Matching the same value twice always yields the same answer; matchers
//! never mutate anything, so a setup can be re-evaluated for every call.

use crate::error::{MockError, MockResult};
use regex::Regex;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Whether a range's bounds are part of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// Bounds accepted: `lo <= x <= hi`
    Inclusive,
    /// Bounds rejected: `lo < x < hi`
    Exclusive,
}

/// Predicate deciding whether a setup applies to one call argument.
#[derive(Clone)]
pub enum ArgMatcher {
    /// Exact value (numbers compare numerically across int/float)
    Eq(Value),
    /// Any value, including null
    Any,
    /// Any non-null value
    NotNull,
    /// Caller-supplied predicate
    Is(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
    /// Ordered range over numbers or strings
    InRange {
        /// Lower bound
        lo: Value,
        /// Upper bound
        hi: Value,
        /// Bound treatment
        kind: RangeKind,
    },
    /// Membership in a fixed set
    In(Vec<Value>),
    /// Non-membership in a fixed set
    NotIn(Vec<Value>),
    /// Regular-expression match over string arguments
    Pattern(Regex),
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(v) => write!(f, "eq({v})"),
            Self::Any => write!(f, "any"),
            Self::NotNull => write!(f, "not_null"),
            Self::Is(_) => write!(f, "is(<predicate>)"),
            Self::InRange { lo, hi, kind } => write!(f, "in_range({lo}, {hi}, {kind:?})"),
            Self::In(values) => write!(f, "is_in({values:?})"),
            Self::NotIn(values) => write!(f, "is_not_in({values:?})"),
            Self::Pattern(re) => write!(f, "matches_pattern({:?})", re.as_str()),
        }
    }
}

impl ArgMatcher {
    /// Match an exact value.
    #[must_use]
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Eq(value.into())
    }

    /// Match any value, including null.
    #[must_use]
    pub fn any() -> Self {
        Self::Any
    }

    /// Match any non-null value.
    #[must_use]
    pub fn not_null() -> Self {
        Self::NotNull
    }

    /// Match values accepted by a predicate.
    ///
    /// The predicate must be pure: no side effects, same answer for the same
    /// value every time it is asked.
    #[must_use]
    pub fn is<F>(pred: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Is(Arc::new(pred))
    }

    /// Match values inside a range. Numbers compare numerically, strings
    /// lexicographically; everything else never matches.
    #[must_use]
    pub fn in_range(lo: impl Into<Value>, hi: impl Into<Value>, kind: RangeKind) -> Self {
        Self::InRange {
            lo: lo.into(),
            hi: hi.into(),
            kind,
        }
    }

    /// Match values present in the given set.
    #[must_use]
    pub fn is_in<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    /// Match values absent from the given set.
    #[must_use]
    pub fn is_not_in<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::NotIn(values.into_iter().map(Into::into).collect())
    }

    /// Match string arguments against a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::InvalidPattern`] if the pattern does not parse.
    pub fn matches_pattern(pattern: &str) -> MockResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| MockError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::Pattern(regex))
    }

    /// Decide whether a candidate argument is accepted.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Eq(expected) => values_equal(expected, value),
            Self::Any => true,
            Self::NotNull => !value.is_null(),
            Self::Is(pred) => pred(value),
            Self::InRange { lo, hi, kind } => {
                let (Some(lower), Some(upper)) = (compare(lo, value), compare(value, hi)) else {
                    return false;
                };
                match kind {
                    RangeKind::Inclusive => lower != Ordering::Greater && upper != Ordering::Greater,
                    RangeKind::Exclusive => lower == Ordering::Less && upper == Ordering::Less,
                }
            }
            Self::In(values) => values.iter().any(|v| values_equal(v, value)),
            Self::NotIn(values) => !values.iter().any(|v| values_equal(v, value)),
            Self::Pattern(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
        }
    }
}

/// Equality where `1` and `1.0` are the same argument. Integer pairs
/// compare exactly; only genuinely mixed int/float pairs widen through
/// `f64`, so integers beyond 2^53 keep their identity.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Ordering over homogeneous comparable values: numbers numerically,
/// strings lexicographically. Mixed or unordered kinds do not compare.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return compare_numbers(x, y);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Some(x.cmp(y));
    }
    None
}

/// Same widening policy as [`numbers_equal`]: exact on integer pairs,
/// `f64` only across the int/float boundary.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}
