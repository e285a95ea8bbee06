//! Registered expectations and behavior attachment.
//!
//! A [`Setup`] maps a call pattern (operation + matchers) to an ordered list
//! of behavior steps. Sticky setups (`returns`/`throws`) replay their last
//! step forever; sequence setups consume one step per matching call and then
//! fall out of candidacy, so later calls flow to the next candidate or the
//! contract's not-configured outcome.

use crate::error::Fault;
use crate::matcher::ArgMatcher;
use crate::mock::MockState;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};

/// One behavior step, consumed when its setup matches a call.
#[derive(Debug, Clone)]
pub(crate) enum BehaviorStep {
    /// Produce a value
    Return(Value),
    /// Raise an injected fault
    Raise(Fault),
}

/// Replay policy for a setup's step list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Last step replays forever
    Sticky,
    /// Each step consumed once; exhausted setups stop matching
    Sequence,
}

type Callback = Box<dyn FnMut(&[Value]) + Send>;

/// A registered expectation owned by one [`Mock`](crate::Mock).
pub(crate) struct Setup {
    pub(crate) id: u64,
    pub(crate) operation: String,
    pub(crate) matchers: Vec<ArgMatcher>,
    pub(crate) steps: Vec<BehaviorStep>,
    pub(crate) replay: Replay,
    pub(crate) cursor: usize,
    pub(crate) before: Option<Callback>,
    pub(crate) after: Option<Callback>,
    pub(crate) verifiable: bool,
    pub(crate) matched: u64,
}

impl fmt::Debug for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setup")
            .field("id", &self.id)
            .field("operation", &self.operation)
            .field("matchers", &self.matchers)
            .field("steps", &self.steps.len())
            .field("replay", &self.replay)
            .field("cursor", &self.cursor)
            .field("verifiable", &self.verifiable)
            .field("matched", &self.matched)
            .finish()
    }
}

impl Setup {
    pub(crate) fn new(id: u64, operation: impl Into<String>, matchers: Vec<ArgMatcher>) -> Self {
        Self {
            id,
            operation: operation.into(),
            matchers,
            steps: Vec::new(),
            replay: Replay::Sticky,
            cursor: 0,
            before: None,
            after: None,
            verifiable: false,
            matched: 0,
        }
    }

    /// Whether every matcher accepts the corresponding argument.
    pub(crate) fn accepts(&self, args: &[Value]) -> bool {
        self.matchers.len() == args.len()
            && self.matchers.iter().zip(args).all(|(m, a)| m.accepts(a))
    }

    /// Whether the setup is still a candidate: sticky setups always are,
    /// sequence setups only until drained.
    pub(crate) fn has_remaining(&self) -> bool {
        match self.replay {
            Replay::Sticky => true,
            Replay::Sequence => self.cursor < self.steps.len(),
        }
    }

    /// Consume the next behavior step. `None` means the setup has no
    /// attached behavior and the caller should produce the operation's
    /// not-configured outcome.
    pub(crate) fn next_step(&mut self) -> Option<BehaviorStep> {
        match self.replay {
            Replay::Sticky => self.steps.last().cloned(),
            Replay::Sequence => {
                let step = self.steps.get(self.cursor).cloned();
                if step.is_some() {
                    self.cursor += 1;
                }
                step
            }
        }
    }

    /// Rewind consumption state without touching attached behavior.
    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
        self.matched = 0;
    }
}

/// Handle for attaching behavior to a freshly registered setup.
///
/// Returned by [`Mock::setup`](crate::Mock::setup); methods chain in the
/// builder style:
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
///     .returns(json!({"id": 1, "name": "John", "age": 25}))
///     .verifiable();
/// ```
///
/// A handle addresses its setup by a stable id. If the setup has since been
/// dropped by [`Mock::clear_setups`](crate::Mock::clear_setups), chained
/// methods are no-ops.
#[derive(Debug)]
pub struct SetupHandle {
    pub(crate) state: Arc<Mutex<MockState>>,
    pub(crate) id: u64,
}

impl SetupHandle {
    fn with_setup(self, f: impl FnOnce(&mut Setup)) -> Self {
        {
            let mut state = self.state.lock().expect("mock state lock poisoned");
            let id = self.id;
            if let Some(setup) = state.setups.iter_mut().find(|s| s.id == id) {
                f(setup);
            }
        }
        self
    }

    /// Attach a fixed return value, replayed for every matching call.
    ///
    /// On a sequence setup this appends one more step instead.
    pub fn returns(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.with_setup(|setup| setup.steps.push(BehaviorStep::Return(value)))
    }

    /// Attach a sequence of return values, consumed one per matching call.
    ///
    /// Once drained the setup stops matching and later calls fall through.
    pub fn returns_sequence<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with_setup(|setup| {
            setup.replay = Replay::Sequence;
            setup
                .steps
                .extend(values.into_iter().map(|v| BehaviorStep::Return(v.into())));
        })
    }

    /// Attach an injected fault, raised on every matching call.
    pub fn throws(self, fault: Fault) -> Self {
        self.with_setup(|setup| setup.steps.push(BehaviorStep::Raise(fault)))
    }

    /// Run a callback synchronously immediately before the result is
    /// produced.
    ///
    /// The callback runs inside the dispatch critical section and must not
    /// call back into the same mock.
    pub fn before<F>(self, f: F) -> Self
    where
        F: FnMut(&[Value]) + Send + 'static,
    {
        self.with_setup(|setup| setup.before = Some(Box::new(f)))
    }

    /// Run a callback after the call, only if it completed without raising.
    ///
    /// Same critical-section constraint as [`SetupHandle::before`].
    pub fn after<F>(self, f: F) -> Self
    where
        F: FnMut(&[Value]) + Send + 'static,
    {
        self.with_setup(|setup| setup.after = Some(Box::new(f)))
    }

    /// Mark the setup as required: [`Mock::verify_all`](crate::Mock::verify_all)
    /// fails if it never matched.
    pub fn verifiable(self) -> Self {
        self.with_setup(|setup| setup.verifiable = true)
    }
}
