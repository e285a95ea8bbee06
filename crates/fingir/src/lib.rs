//! Fingir: synchronous mock engine for Rust tests.
//!
//! Fingir (Spanish: "to feign") lets a test declare a *capability contract*
//! (the abstract operations of a collaborator), build a [`Mock`] against it,
//! register setups with argument matchers and sequenced behaviors, exercise
//! the mock through [`Mock::dispatch`], and verify invocation counts
//! afterwards.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      FINGIR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐    ┌───────────┐    ┌──────────┐    ┌──────────┐  │
//! │  │ Contract │───►│   Mock    │───►│ dispatch │───►│ verify*  │  │
//! │  │ (ops)    │    │ + Setups  │    │ + log    │    │ (Times)  │  │
//! │  └──────────┘    └───────────┘    └──────────┘    └──────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dispatch records every call before its behavior executes, scans setups in
//! reverse registration order (most recently added wins), and answers
//! unmatched calls with the operation's declared default — or fails them,
//! for strict mocks. Test discovery, fixture injection, and reporting belong
//! to the hosting test runner; this crate is only the engine it plugs in.
//!
//! # Example
//!
//! ```
//! use fingir::{ArgMatcher, CapabilityContract, Mock, Times, ValueKind};
//! use serde_json::json;
//!
//! let contract = CapabilityContract::builder("value_service")
//!     .operation_with_default("get_value", &[ValueKind::Int], ValueKind::Int, 0)
//!     .build()
//!     .unwrap();
//! let mock = Mock::new(contract);
//!
//! mock.setup("get_value", vec![ArgMatcher::eq(1)])
//!     .unwrap()
//!     .returns(10);
//!
//! assert_eq!(mock.dispatch("get_value", &[json!(1)]).unwrap(), json!(10));
//! assert_eq!(mock.dispatch("get_value", &[json!(1)]).unwrap(), json!(10));
//! assert_eq!(mock.dispatch("get_value", &[json!(2)]).unwrap(), json!(0));
//!
//! mock.verify("get_value", &[ArgMatcher::eq(1)], Times::exactly(2)).unwrap();
//! mock.verify("get_value", &[ArgMatcher::eq(2)], Times::once()).unwrap();
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod contract;
mod error;
mod matcher;
mod mock;
mod proxy;
mod setup;
mod verify;

pub use contract::{to_value, CapabilityContract, ContractBuilder, OperationSpec, ValueKind};
pub use error::{Fault, MockError, MockResult};
pub use matcher::{ArgMatcher, RangeKind};
pub use mock::{CallOutcome, InvocationRecord, Mock};
pub use proxy::Mockable;
pub use setup::SetupHandle;
pub use verify::Times;
