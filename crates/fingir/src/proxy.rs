//! Typed fronting for mocks.
//!
//! The engine is dynamically typed; type safety lives at the seam. Domain
//! code defines an ordinary trait, and a thin proxy struct implements it by
//! forwarding each method to [`Mock::dispatch`] and decoding the returned
//! value. [`Mockable`] ties the proxy back to its engine so a test can reach
//! the `verify*` family through either handle.
//!
//! ```
//! use fingir::{
//!     to_value, ArgMatcher, CapabilityContract, Mock, MockResult, Mockable, ValueKind,
//! };
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Serialize, Deserialize, PartialEq)]
//! struct Student {
//!     id: u32,
//!     name: String,
//!     age: u32,
//! }
//!
//! trait StudentService {
//!     fn get_student(&self, id: u32) -> MockResult<Option<Student>>;
//! }
//!
//! struct StudentServiceProxy {
//!     mock: Mock,
//! }
//!
//! impl Mockable for StudentServiceProxy {
//!     fn mock(&self) -> &Mock {
//!         &self.mock
//!     }
//! }
//!
//! impl StudentService for StudentServiceProxy {
//!     fn get_student(&self, id: u32) -> MockResult<Option<Student>> {
//!         let value = self.mock.dispatch("get_student", &[json!(id)])?;
//!         Ok(serde_json::from_value(value).ok())
//!     }
//! }
//!
//! let contract = CapabilityContract::builder("student_service")
//!     .operation("get_student", &[ValueKind::Int], ValueKind::Object)
//!     .build()
//!     .unwrap();
//! let proxy = StudentServiceProxy {
//!     mock: Mock::new(contract),
//! };
//!
//! let john = Student { id: 1, name: "John".into(), age: 25 };
//! proxy
//!     .mock()
//!     .setup("get_student", vec![ArgMatcher::eq(1)])
//!     .unwrap()
//!     .returns(to_value(&john));
//!
//! assert_eq!(proxy.get_student(1).unwrap(), Some(john));
//! assert_eq!(proxy.get_student(2).unwrap(), None);
//! ```

use crate::error::MockResult;
use crate::mock::Mock;

/// A typed facade over a mock engine.
///
/// Implementors expose their underlying [`Mock`] so tests can configure
/// setups and run verification through the same object they inject into the
/// code under test.
pub trait Mockable {
    /// The engine this facade forwards to.
    fn mock(&self) -> &Mock;

    /// Convenience forwarder for [`Mock::verify_all`].
    ///
    /// # Errors
    ///
    /// See [`Mock::verify_all`].
    fn verify_all(&self) -> MockResult<()> {
        self.mock().verify_all()
    }

    /// Convenience forwarder for [`Mock::verify_no_other_calls`].
    ///
    /// # Errors
    ///
    /// See [`Mock::verify_no_other_calls`].
    fn verify_no_other_calls(&self) -> MockResult<()> {
        self.mock().verify_no_other_calls()
    }
}
