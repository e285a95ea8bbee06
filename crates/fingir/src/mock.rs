//! The mock engine: dispatch, invocation recording, and lifecycle.
//!
//! A [`Mock`] binds a [`CapabilityContract`] to an ordered setup list and an
//! append-only invocation log. Dispatch executes matching, behavior
//! consumption, and logging as one atomic unit behind a mutex, so a mock
//! shared across threads keeps exactly-once sequence consumption and
//! accurate call counts. Cloning a mock shares the same underlying state,
//! which lets a typed proxy and the test body hold handles to one engine.

use crate::contract::{CapabilityContract, ValueKind};
use crate::error::{MockError, MockResult};
use crate::setup::{BehaviorStep, Setup, SetupHandle};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// How one observed call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// A matched setup produced a value
    Returned,
    /// A `throws` behavior raised an injected fault
    Raised,
    /// No setup matched: loose mocks answered with the not-configured
    /// outcome, strict mocks failed the call
    Unmatched,
}

/// One observed call: operation, cloned arguments, sequence index, outcome.
///
/// Records are append-only and owned by the mock; `verify*` reads them and
/// marks the ones it has accounted for.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    operation: String,
    args: Vec<Value>,
    index: u64,
    outcome: CallOutcome,
    pub(crate) verified: bool,
    pub(crate) matched_setup: Option<usize>,
}

impl InvocationRecord {
    /// Operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Actual argument values.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Zero-based sequence index of the call.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// How the call ended.
    #[must_use]
    pub fn outcome(&self) -> CallOutcome {
        self.outcome
    }

    /// Whether a `verify*` call has accounted for this record.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

#[derive(Debug)]
pub(crate) struct MockState {
    pub(crate) contract: CapabilityContract,
    pub(crate) strict: bool,
    pub(crate) setups: Vec<Setup>,
    pub(crate) log: Vec<InvocationRecord>,
    next_setup_id: u64,
}

/// A mock bound to a capability contract.
///
/// # Example
///
/// ```
/// use fingir::{ArgMatcher, CapabilityContract, Mock, ValueKind};
/// use serde_json::json;
///
/// let contract = CapabilityContract::builder("student_service")
///     .operation("get_student", &[ValueKind::Int], ValueKind::Object)
///     .build()
///     .unwrap();
/// let mock = Mock::new(contract);
///
/// mock.setup("get_student", vec![ArgMatcher::eq(1)])
///     .unwrap()
///     .returns(json!({"id": 1, "name": "John", "age": 25}));
///
/// let student = mock.dispatch("get_student", &[json!(1)]).unwrap();
/// assert_eq!(student["name"], "John");
///
/// // No setup for id 2: a loose mock answers with the declared default
/// assert!(mock.dispatch("get_student", &[json!(2)]).unwrap().is_null());
/// ```
#[derive(Clone)]
pub struct Mock {
    pub(crate) state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Mock")
            .field("contract", &state.contract.name())
            .field("strict", &state.strict)
            .field("setup_count", &state.setups.len())
            .field("invocation_count", &state.log.len())
            .finish()
    }
}

impl Mock {
    /// Create a loose mock: unmatched calls produce the operation's
    /// not-configured outcome.
    #[must_use]
    pub fn new(contract: CapabilityContract) -> Self {
        Self::with_strictness(contract, false)
    }

    /// Create a strict mock: unmatched calls fail with
    /// [`MockError::UnexpectedInvocation`].
    #[must_use]
    pub fn strict(contract: CapabilityContract) -> Self {
        Self::with_strictness(contract, true)
    }

    fn with_strictness(contract: CapabilityContract, strict: bool) -> Self {
        tracing::debug!(contract = contract.name(), strict, "mock created");
        Self {
            state: Arc::new(Mutex::new(MockState {
                contract,
                strict,
                setups: Vec::new(),
                log: Vec::new(),
                next_setup_id: 0,
            })),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock poisoned")
    }

    /// Name of the bound contract.
    #[must_use]
    pub fn contract_name(&self) -> String {
        self.lock().contract.name().to_string()
    }

    /// Whether unmatched calls fail instead of returning the default.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.lock().strict
    }

    /// Register a setup for an operation.
    ///
    /// Setups are matched in reverse registration order: the most recently
    /// added matching setup wins, so a later setup overrides an earlier
    /// overlapping one.
    ///
    /// # Errors
    ///
    /// [`MockError::UnknownOperation`] if the contract does not declare the
    /// operation; [`MockError::ArityMismatch`] if the matcher count differs
    /// from the declared parameter count.
    pub fn setup(
        &self,
        operation: &str,
        matchers: Vec<crate::ArgMatcher>,
    ) -> MockResult<SetupHandle> {
        let id = {
            let mut state = self.lock();
            let arity = state
                .contract
                .operation(operation)
                .ok_or_else(|| MockError::UnknownOperation {
                    contract: state.contract.name().to_string(),
                    operation: operation.to_string(),
                })?
                .arity();
            if matchers.len() != arity {
                return Err(MockError::ArityMismatch {
                    operation: operation.to_string(),
                    expected: arity,
                    actual: matchers.len(),
                });
            }
            tracing::debug!(
                contract = state.contract.name(),
                operation,
                matchers = ?matchers,
                "setup registered"
            );
            let id = state.next_setup_id;
            state.next_setup_id += 1;
            state.setups.push(Setup::new(id, operation, matchers));
            id
        };
        Ok(SetupHandle {
            state: Arc::clone(&self.state),
            id,
        })
    }

    /// Route an observed call through setup matching.
    ///
    /// The call is recorded unconditionally, before any behavior executes.
    /// Setups for the operation are scanned most-recent-first; the first one
    /// whose matchers all accept (and that still has behavior to offer)
    /// consumes its next step. Injected faults surface as
    /// [`MockError::Fault`] and propagate unmodified.
    ///
    /// # Errors
    ///
    /// [`MockError::UnknownOperation`], [`MockError::ArityMismatch`], or
    /// [`MockError::KindMismatch`] for calls the contract does not admit;
    /// [`MockError::UnexpectedInvocation`] for unmatched calls on a strict
    /// mock; [`MockError::Fault`] for `throws` behavior.
    pub fn dispatch(&self, operation: &str, args: &[Value]) -> MockResult<Value> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let (arity, params, default) = {
            let op = state
                .contract
                .operation(operation)
                .ok_or_else(|| MockError::UnknownOperation {
                    contract: state.contract.name().to_string(),
                    operation: operation.to_string(),
                })?;
            (op.arity(), op.params().to_vec(), op.default_value().clone())
        };
        if args.len() != arity {
            return Err(MockError::ArityMismatch {
                operation: operation.to_string(),
                expected: arity,
                actual: args.len(),
            });
        }
        for (i, (kind, arg)) in params.iter().zip(args).enumerate() {
            if !kind.admits(arg) {
                return Err(MockError::KindMismatch {
                    operation: operation.to_string(),
                    index: i,
                    expected: *kind,
                    actual: ValueKind::of(arg),
                });
            }
        }

        // Record before behavior executes, matched or not.
        let record_index = state.log.len();
        state.log.push(InvocationRecord {
            operation: operation.to_string(),
            args: args.to_vec(),
            index: record_index as u64,
            outcome: CallOutcome::Unmatched,
            verified: false,
            matched_setup: None,
        });

        let found = state
            .setups
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.operation == operation && s.has_remaining() && s.accepts(args))
            .map(|(i, _)| i);

        let Some(setup_index) = found else {
            tracing::trace!(operation, matched = false, "dispatch");
            if state.strict {
                return Err(MockError::UnexpectedInvocation {
                    operation: operation.to_string(),
                    args: render_args(args),
                });
            }
            return Ok(default);
        };

        let setup = &mut state.setups[setup_index];
        setup.matched += 1;
        let step = setup.next_step();
        state.log[record_index].matched_setup = Some(setup_index);
        tracing::trace!(operation, matched = true, setup = setup_index, "dispatch");

        if let Some(f) = setup.before.as_mut() {
            f(args);
        }

        match step {
            Some(BehaviorStep::Raise(fault)) => {
                state.log[record_index].outcome = CallOutcome::Raised;
                Err(MockError::Fault(fault))
            }
            step => {
                // A setup with no attached behavior still matches and
                // produces the not-configured outcome.
                let value = match step {
                    Some(BehaviorStep::Return(v)) => v,
                    _ => default,
                };
                if let Some(f) = setup.after.as_mut() {
                    f(args);
                }
                state.log[record_index].outcome = CallOutcome::Returned;
                Ok(value)
            }
        }
    }

    /// Snapshot of the invocation log.
    #[must_use]
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.lock().log.clone()
    }

    /// Number of recorded calls to one operation.
    #[must_use]
    pub fn invocation_count(&self, operation: &str) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }

    /// Total number of recorded calls.
    #[must_use]
    pub fn total_invocations(&self) -> usize {
        self.lock().log.len()
    }

    /// Clear the invocation log and rewind sequence cursors, keeping setups.
    ///
    /// A fixture-scoped mock shared across a test collection accumulates
    /// state; this is the explicit reset for suites that must not carry
    /// calls over between tests.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.log.clear();
        for setup in &mut state.setups {
            setup.rewind();
        }
        tracing::debug!(contract = state.contract.name(), "mock reset");
    }

    /// Drop all setups in addition to [`Mock::reset`].
    pub fn clear_setups(&self) {
        let mut state = self.lock();
        state.setups.clear();
        state.log.clear();
    }
}

pub(crate) fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
