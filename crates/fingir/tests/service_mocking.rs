//! End-to-end mocking scenarios against a small student-directory service.
//!
//! Exercises the full surface: loose fakes, configured returns and faults,
//! sequences, matcher precedence, callbacks, the verify family, strict mode,
//! a protected-style hook routed through a typed proxy, and fixture-style
//! reset of a shared mock.

use fingir::{
    to_value, ArgMatcher, CallOutcome, CapabilityContract, Fault, Mock, MockError, MockResult,
    Mockable, RangeKind, Times, ValueKind,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Student {
    id: u32,
    name: String,
    age: u32,
}

impl Student {
    fn new(id: u32, name: &str, age: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
        }
    }
}

fn student_contract() -> CapabilityContract {
    CapabilityContract::builder("student_service")
        .operation("get_student", &[ValueKind::Int], ValueKind::Object)
        .operation_with_default("process", &[], ValueKind::Int, 0)
        .hook("process_core", &[], ValueKind::Int)
        .build()
        .expect("contract should build")
}

/// The trait production code programs against.
trait StudentService {
    fn get_student(&self, id: u32) -> MockResult<Option<Student>>;
    fn process(&self) -> MockResult<i64>;
}

/// Typed proxy forwarding every method to the mock engine.
///
/// `process` is implemented in terms of the `process_core` hook, the way a
/// base class would call a protected overridable member.
struct StudentServiceProxy {
    mock: Mock,
}

impl StudentServiceProxy {
    fn new(mock: Mock) -> Self {
        Self { mock }
    }
}

impl Mockable for StudentServiceProxy {
    fn mock(&self) -> &Mock {
        &self.mock
    }
}

impl StudentService for StudentServiceProxy {
    fn get_student(&self, id: u32) -> MockResult<Option<Student>> {
        let value = self.mock.dispatch("get_student", &[json!(id)])?;
        Ok(serde_json::from_value(value).ok())
    }

    fn process(&self) -> MockResult<i64> {
        let core = self.mock.dispatch("process_core", &[])?;
        Ok(core.as_i64().unwrap_or(0) + 1)
    }
}

#[test]
fn fake_object_does_nothing_by_default() {
    let proxy = StudentServiceProxy::new(Mock::new(student_contract()));

    // No setups: the fake answers with the declared defaults
    assert_eq!(proxy.get_student(1).expect("loose mock never fails"), None);
}

#[test]
fn configured_returns_and_faults_coexist() {
    let mock = Mock::new(student_contract());
    mock.setup("get_student", vec![ArgMatcher::eq(1)])
        .unwrap()
        .returns(to_value(&Student::new(1, "John", 25)));
    mock.setup("get_student", vec![ArgMatcher::eq(2)])
        .unwrap()
        .throws(Fault::new("index_out_of_range", "no student with id 2"));

    let proxy = StudentServiceProxy::new(mock);

    let student = proxy.get_student(1).unwrap().expect("configured");
    assert_eq!(student.name, "John");

    let err = proxy.get_student(2).unwrap_err();
    assert!(matches!(err, MockError::Fault(f) if f.kind == "index_out_of_range"));
}

#[test]
fn sequence_simulates_successive_calls() {
    let mock = Mock::new(student_contract());
    mock.setup("get_student", vec![ArgMatcher::eq(1)])
        .unwrap()
        .returns_sequence([
            to_value(&Student::new(1, "John", 25)),
            to_value(&Student::new(2, "Jane", 24)),
        ]);

    let proxy = StudentServiceProxy::new(mock);

    assert_eq!(proxy.get_student(1).unwrap().unwrap().name, "John");
    assert_eq!(proxy.get_student(1).unwrap().unwrap().name, "Jane");
    // Drained: back to the fake's default
    assert_eq!(proxy.get_student(1).unwrap(), None);
}

#[test]
fn later_setup_wins_for_overlapping_matchers() {
    let mock = Mock::new(student_contract());
    mock.setup("get_student", vec![ArgMatcher::any()])
        .unwrap()
        .returns(to_value(&Student::new(1, "John", 25)));
    mock.setup("get_student", vec![ArgMatcher::is_in([1, 2, 3])])
        .unwrap()
        .returns(to_value(&Student::new(2, "Jane", 25)));

    let proxy = StudentServiceProxy::new(mock);

    // In the overlap the later registration takes precedence
    assert_eq!(proxy.get_student(2).unwrap().unwrap().name, "Jane");
    // Outside it the wildcard still answers
    assert_eq!(proxy.get_student(12345).unwrap().unwrap().name, "John");
}

#[test]
fn matcher_variants_route_calls() {
    let mock = Mock::new(student_contract());
    mock.setup(
        "get_student",
        vec![ArgMatcher::in_range(100, 199, RangeKind::Inclusive)],
    )
    .unwrap()
    .returns(to_value(&Student::new(100, "Centenary", 30)));
    mock.setup(
        "get_student",
        vec![ArgMatcher::is(|v| v.as_i64().is_some_and(|n| n < 0))],
    )
    .unwrap()
    .throws(Fault::new("invalid_id", "ids are positive"));

    let proxy = StudentServiceProxy::new(mock);

    assert_eq!(
        proxy.get_student(150).unwrap().unwrap().name,
        "Centenary"
    );
    assert_eq!(proxy.get_student(200).unwrap(), None);

    // Negative ids travel through the raw engine; the typed proxy only
    // exposes unsigned ones
    let err = proxy
        .mock()
        .dispatch("get_student", &[json!(-5)])
        .unwrap_err();
    assert!(matches!(err, MockError::Fault(f) if f.kind == "invalid_id"));
}

#[test]
fn callbacks_fire_around_each_matching_call() {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    let before = Arc::new(AtomicU32::new(0));
    let after = Arc::new(AtomicU32::new(0));
    let (b, a) = (before.clone(), after.clone());

    let mock = Mock::new(student_contract());
    mock.setup("process", vec![])
        .unwrap()
        .before(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        })
        .returns(1)
        .after(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        });

    for _ in 0..3 {
        let _ = mock.dispatch("process", &[]).unwrap();
    }

    assert_eq!(before.load(Ordering::SeqCst), 3);
    assert_eq!(after.load(Ordering::SeqCst), 3);
}

#[test]
fn verify_counts_without_prior_setup() {
    let mock = Mock::new(student_contract());
    let proxy = StudentServiceProxy::new(mock);

    let _ = proxy.get_student(1).unwrap();

    // A previous setup is not required to verify a call
    proxy
        .mock()
        .verify("get_student", &[ArgMatcher::eq(1)], Times::once())
        .expect("called once with 1");
    proxy
        .mock()
        .verify("get_student", &[ArgMatcher::eq(2)], Times::never())
        .expect("never called with 2");
    proxy
        .verify_no_other_calls()
        .expect("the single call was accounted for");
}

#[test]
fn verify_all_requires_verifiable_setups_to_match() {
    let mock = Mock::new(student_contract());
    mock.setup("get_student", vec![ArgMatcher::eq(99)])
        .unwrap()
        .returns(to_value(&Student::new(99, "John", 25)))
        .verifiable();

    let proxy = StudentServiceProxy::new(mock);

    assert!(proxy.verify_all().is_err(), "setup not matched yet");

    let _ = proxy.get_student(99).unwrap();
    proxy.verify_all().expect("verifiable setup matched");
}

#[test]
fn get_value_scenario_end_to_end() {
    let contract = CapabilityContract::builder("value_service")
        .operation_with_default("get_value", &[ValueKind::Int], ValueKind::Int, 0)
        .build()
        .unwrap();
    let mock = Mock::new(contract);

    mock.setup("get_value", vec![ArgMatcher::eq(1)])
        .unwrap()
        .returns(10);

    assert_eq!(mock.dispatch("get_value", &[json!(1)]).unwrap(), json!(10));
    assert_eq!(mock.dispatch("get_value", &[json!(1)]).unwrap(), json!(10));
    assert_eq!(mock.dispatch("get_value", &[json!(2)]).unwrap(), json!(0));

    mock.verify("get_value", &[ArgMatcher::eq(1)], Times::exactly(2))
        .unwrap();
    mock.verify("get_value", &[ArgMatcher::eq(2)], Times::exactly(1))
        .unwrap();
    // Both argument shapes verified: nothing is left unaccounted
    mock.verify_no_other_calls().unwrap();
}

#[test]
fn protected_hook_is_mocked_through_the_contract() {
    let mock = Mock::new(student_contract());
    assert!(mock
        .invocations()
        .is_empty());

    mock.setup("process_core", vec![]).unwrap().returns(1);

    let proxy = StudentServiceProxy::new(mock);

    // The public operation is built on the hook, like a base class calling
    // a protected overridable member
    assert_eq!(proxy.process().unwrap(), 2);

    proxy
        .mock()
        .verify("process_core", &[], Times::once())
        .expect("hook invoked exactly once");
}

#[test]
fn strict_mock_fails_fast_on_unexpected_calls() {
    let mock = Mock::strict(student_contract());
    mock.setup("get_student", vec![ArgMatcher::eq(1)])
        .unwrap()
        .returns(to_value(&Student::new(1, "John", 25)));

    let proxy = StudentServiceProxy::new(mock);

    assert!(proxy.get_student(1).is_ok());

    let err = proxy.get_student(7).unwrap_err();
    assert!(matches!(err, MockError::UnexpectedInvocation { .. }));

    // The rejected call is still on the record
    proxy
        .mock()
        .verify("get_student", &[ArgMatcher::eq(7)], Times::once())
        .expect("unexpected call was recorded");
}

#[test]
fn raised_calls_keep_their_outcome_in_the_log() {
    let mock = Mock::new(student_contract());
    mock.setup("get_student", vec![ArgMatcher::eq(2)])
        .unwrap()
        .throws(Fault::new("index_out_of_range", "no student with id 2"));

    let _ = mock.dispatch("get_student", &[json!(2)]).unwrap_err();
    let _ = mock.dispatch("get_student", &[json!(1)]).unwrap();

    let log = mock.invocations();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].outcome(), CallOutcome::Raised);
    assert_eq!(log[1].outcome(), CallOutcome::Unmatched);
    assert_eq!(log[0].index(), 0);
    assert_eq!(log[1].index(), 1);
}

#[test]
fn shared_mock_resets_between_collection_tests() {
    // A collection-scoped fixture shares one mock across several test
    // bodies; state accumulates unless the fixture resets it explicitly.
    let shared = Mock::new(student_contract());
    shared
        .setup("get_student", vec![ArgMatcher::any()])
        .unwrap()
        .returns_sequence([
            to_value(&Student::new(1, "John", 25)),
            to_value(&Student::new(2, "Jane", 24)),
        ]);

    // First test body consumes one sequence step
    let first = StudentServiceProxy::new(shared.clone());
    assert_eq!(first.get_student(1).unwrap().unwrap().name, "John");
    assert_eq!(shared.total_invocations(), 1);

    // Without a reset the second body observes the carried-over cursor
    let second = StudentServiceProxy::new(shared.clone());
    assert_eq!(second.get_student(5).unwrap().unwrap().name, "Jane");

    // Explicit reset: log cleared, sequences rewound, setups kept
    shared.reset();
    assert_eq!(shared.total_invocations(), 0);
    let third = StudentServiceProxy::new(shared.clone());
    assert_eq!(third.get_student(1).unwrap().unwrap().name, "John");
}

#[test]
fn setup_mistakes_surface_immediately() {
    let mock = Mock::new(student_contract());

    let err = mock
        .setup("get_student", vec![ArgMatcher::eq(1), ArgMatcher::any()])
        .unwrap_err();
    assert!(matches!(
        err,
        MockError::ArityMismatch { expected: 1, actual: 2, .. }
    ));

    let err = mock.setup("enroll", vec![]).unwrap_err();
    assert!(matches!(
        err,
        MockError::UnknownOperation { operation, .. } if operation == "enroll"
    ));
}
