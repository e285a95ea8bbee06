//! Post-hoc verification of invocation counts.
//!
//! Verification reads the append-only invocation log. Each `verify*` call
//! marks the records it accounted for; [`Mock::verify_no_other_calls`] then
//! fails on anything left unaccounted, which pins down incidental
//! interactions a test did not explicitly check.

use crate::error::{MockError, MockResult};
use crate::matcher::ArgMatcher;
use crate::mock::{render_args, Mock};
use std::fmt;

/// Expected invocation count for [`Mock::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    /// Exactly `n` calls
    Exactly(u64),
    /// `n` or more calls
    AtLeast(u64),
    /// `n` or fewer calls
    AtMost(u64),
    /// Between `lo` and `hi` calls, inclusive
    Between(u64, u64),
    /// No calls at all
    Never,
}

impl Times {
    /// Exactly `n` calls.
    #[must_use]
    pub fn exactly(n: u64) -> Self {
        Self::Exactly(n)
    }

    /// Exactly one call.
    #[must_use]
    pub fn once() -> Self {
        Self::Exactly(1)
    }

    /// No calls at all.
    #[must_use]
    pub fn never() -> Self {
        Self::Never
    }

    /// `n` or more calls.
    #[must_use]
    pub fn at_least(n: u64) -> Self {
        Self::AtLeast(n)
    }

    /// One or more calls.
    #[must_use]
    pub fn at_least_once() -> Self {
        Self::AtLeast(1)
    }

    /// `n` or fewer calls.
    #[must_use]
    pub fn at_most(n: u64) -> Self {
        Self::AtMost(n)
    }

    /// Zero or one call.
    #[must_use]
    pub fn at_most_once() -> Self {
        Self::AtMost(1)
    }

    /// Between `lo` and `hi` calls, inclusive.
    #[must_use]
    pub fn between(lo: u64, hi: u64) -> Self {
        Self::Between(lo, hi)
    }

    /// Whether an observed count satisfies the expectation.
    #[must_use]
    pub fn check(&self, count: u64) -> bool {
        match *self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::AtMost(n) => count <= n,
            Self::Between(lo, hi) => count >= lo && count <= hi,
            Self::Never => count == 0,
        }
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exactly(n) => write!(f, "exactly {n} call(s)"),
            Self::AtLeast(n) => write!(f, "at least {n} call(s)"),
            Self::AtMost(n) => write!(f, "at most {n} call(s)"),
            Self::Between(lo, hi) => write!(f, "between {lo} and {hi} call(s)"),
            Self::Never => write!(f, "no calls"),
        }
    }
}

impl Mock {
    /// Assert how many recorded calls to `operation` satisfy the matchers.
    ///
    /// An empty matcher list counts every call to the operation regardless
    /// of arity. Records counted here are marked verified for
    /// [`Mock::verify_no_other_calls`], even when the count check then
    /// fails. A previous setup is not required.
    ///
    /// # Errors
    ///
    /// [`MockError::UnknownOperation`] or [`MockError::ArityMismatch`] for
    /// queries the contract does not admit; [`MockError::VerificationFailed`]
    /// when the count does not satisfy `times`.
    pub fn verify(
        &self,
        operation: &str,
        matchers: &[ArgMatcher],
        times: Times,
    ) -> MockResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let arity = state
            .contract
            .operation(operation)
            .ok_or_else(|| MockError::UnknownOperation {
                contract: state.contract.name().to_string(),
                operation: operation.to_string(),
            })?
            .arity();
        if !matchers.is_empty() && matchers.len() != arity {
            return Err(MockError::ArityMismatch {
                operation: operation.to_string(),
                expected: arity,
                actual: matchers.len(),
            });
        }

        let mut count = 0u64;
        for record in &mut state.log {
            if record.operation() != operation {
                continue;
            }
            let accepted = matchers.is_empty()
                || matchers
                    .iter()
                    .zip(record.args())
                    .all(|(m, a)| m.accepts(a));
            if accepted {
                count += 1;
                record.verified = true;
            }
        }

        tracing::debug!(operation, count, expected = %times, "verify");
        if times.check(count) {
            Ok(())
        } else {
            Err(MockError::VerificationFailed {
                operation: operation.to_string(),
                expected: times.to_string(),
                actual: format!("{count} call(s)"),
            })
        }
    }

    /// Assert that every `verifiable` setup matched at least once.
    ///
    /// Records matched by a verifiable setup are marked verified.
    ///
    /// # Errors
    ///
    /// [`MockError::VerificationFailed`] listing the operations of every
    /// verifiable setup that never matched.
    pub fn verify_all(&self) -> MockResult<()> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let verifiable: Vec<usize> = state
            .setups
            .iter()
            .enumerate()
            .filter(|(_, s)| s.verifiable)
            .map(|(i, _)| i)
            .collect();

        for record in &mut state.log {
            if record
                .matched_setup
                .is_some_and(|i| verifiable.contains(&i))
            {
                record.verified = true;
            }
        }

        let unmatched: Vec<&str> = verifiable
            .iter()
            .filter(|&&i| state.setups[i].matched == 0)
            .map(|&i| state.setups[i].operation.as_str())
            .collect();

        if unmatched.is_empty() {
            Ok(())
        } else {
            Err(MockError::VerificationFailed {
                operation: unmatched.join(", "),
                expected: "at least one matching call per verifiable setup".to_string(),
                actual: format!("{} verifiable setup(s) never matched", unmatched.len()),
            })
        }
    }

    /// Assert that every recorded invocation has been accounted for by a
    /// previous [`Mock::verify`] or [`Mock::verify_all`] call.
    ///
    /// # Errors
    ///
    /// [`MockError::VerificationFailed`] listing the unaccounted calls.
    pub fn verify_no_other_calls(&self) -> MockResult<()> {
        let guard = self.lock();

        let unverified: Vec<String> = guard
            .log
            .iter()
            .filter(|r| !r.is_verified())
            .map(|r| format!("{}({})", r.operation(), render_args(r.args())))
            .collect();

        if unverified.is_empty() {
            Ok(())
        } else {
            Err(MockError::VerificationFailed {
                operation: unverified.join(", "),
                expected: "no unaccounted invocations".to_string(),
                actual: format!("{} unaccounted call(s)", unverified.len()),
            })
        }
    }
}
