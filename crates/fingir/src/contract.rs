//! Capability contract declaration.
//!
//! A contract is the abstract set of operations a mock can proxy: each
//! operation has a name, ordered parameter kinds, a return kind, and the
//! *not-configured outcome* a loose mock produces when no setup matches.
//! Contracts are immutable once built; the caller supplies one per mocked
//! collaborator at mock-creation time.

use crate::error::{MockError, MockResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Dynamic type tags for parameters and return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// JSON null
    Null,
    /// Boolean
    Bool,
    /// Integer number
    Int,
    /// Any number, including integers
    Float,
    /// String
    Str,
    /// Array
    Array,
    /// Object (records, maps)
    Object,
    /// Any value, including null
    Any,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl ValueKind {
    /// Check whether a candidate value is admitted by this kind.
    ///
    /// `Null` is admitted everywhere except `Bool`/`Int`/`Float`/`Str`
    /// scalars, so optional record returns (`Object` declared, `null`
    /// produced) behave like the nullable references they model.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Null => value.is_null(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Str => value.is_string(),
            Self::Array => value.is_array() || value.is_null(),
            Self::Object => value.is_object() || value.is_null(),
        }
    }

    /// Classify a value into its kind.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Self::Int
                } else {
                    Self::Float
                }
            }
            Value::String(_) => Self::Str,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// One mockable operation: name, ordered parameter kinds, return kind, and
/// the default value a loose mock answers with when no setup matches.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    name: String,
    params: Vec<ValueKind>,
    returns: ValueKind,
    default: Value,
    hook: bool,
}

impl OperationSpec {
    /// Create an operation with a `null` not-configured outcome.
    #[must_use]
    pub fn new(name: impl Into<String>, params: &[ValueKind], returns: ValueKind) -> Self {
        Self {
            name: name.into(),
            params: params.to_vec(),
            returns,
            default: Value::Null,
            hook: false,
        }
    }

    /// Override the not-configured outcome.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Mark the operation as an internal extension point.
    ///
    /// Hooks model non-public overridable members: operations a proxy routes
    /// through the mock even though they are not part of the public call
    /// surface. Setup, dispatch, and verification treat them identically.
    #[must_use]
    pub fn as_hook(mut self) -> Self {
        self.hook = true;
        self
    }

    /// Operation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered parameter kinds.
    #[must_use]
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared return kind.
    #[must_use]
    pub fn returns(&self) -> ValueKind {
        self.returns
    }

    /// The not-configured outcome.
    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Whether this operation is an internal extension point.
    #[must_use]
    pub fn is_hook(&self) -> bool {
        self.hook
    }
}

/// Named, immutable set of mockable operations.
///
/// # Example
///
/// ```
/// use fingir::{CapabilityContract, ValueKind};
///
/// let contract = CapabilityContract::builder("student_service")
///     .operation("get_student", &[ValueKind::Int], ValueKind::Object)
///     .operation("process", &[], ValueKind::Int)
///     .build()
///     .unwrap();
///
/// assert_eq!(contract.operation("get_student").unwrap().arity(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CapabilityContract {
    name: String,
    operations: Vec<OperationSpec>,
    index: HashMap<String, usize>,
}

impl CapabilityContract {
    /// Start building a contract with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Contract name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an operation by name.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationSpec> {
        self.index.get(name).map(|i| &self.operations[*i])
    }

    /// Number of declared operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the contract declares no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate over operations in declaration order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationSpec> {
        self.operations.iter()
    }
}

/// Builder for [`CapabilityContract`].
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    operations: Vec<OperationSpec>,
}

impl ContractBuilder {
    /// Declare a public operation with a `null` not-configured outcome.
    #[must_use]
    pub fn operation(
        self,
        name: impl Into<String>,
        params: &[ValueKind],
        returns: ValueKind,
    ) -> Self {
        self.push(OperationSpec::new(name, params, returns))
    }

    /// Declare an operation with an explicit not-configured outcome.
    #[must_use]
    pub fn operation_with_default(
        self,
        name: impl Into<String>,
        params: &[ValueKind],
        returns: ValueKind,
        default: impl Into<Value>,
    ) -> Self {
        self.push(OperationSpec::new(name, params, returns).with_default(default))
    }

    /// Declare an internal extension point (see [`OperationSpec::as_hook`]).
    #[must_use]
    pub fn hook(self, name: impl Into<String>, params: &[ValueKind], returns: ValueKind) -> Self {
        self.push(OperationSpec::new(name, params, returns).as_hook())
    }

    /// Add a fully configured operation.
    #[must_use]
    pub fn push(mut self, op: OperationSpec) -> Self {
        self.operations.push(op);
        self
    }

    /// Build the contract.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::DuplicateOperation`] if two operations share a
    /// name.
    pub fn build(self) -> MockResult<CapabilityContract> {
        let mut index = HashMap::with_capacity(self.operations.len());
        for (i, op) in self.operations.iter().enumerate() {
            if index.insert(op.name().to_string(), i).is_some() {
                return Err(MockError::DuplicateOperation {
                    contract: self.name,
                    operation: op.name().to_string(),
                });
            }
        }
        Ok(CapabilityContract {
            name: self.name,
            operations: self.operations,
            index,
        })
    }
}

/// Convert any serializable domain value into a dynamic [`Value`].
///
/// # Panics
///
/// Panics if the value cannot be serialized (e.g. a map with non-string
/// keys). This intentionally mirrors how non-representable arguments would
/// fail at the proxy seam.
#[must_use]
pub fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("domain value not representable as a dynamic value")
}
