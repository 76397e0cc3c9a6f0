//! Error types for the ferry object model and bridge

use crate::exception::Exception;

/// Result type for bridge and model operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures of the translation machinery.
///
/// These are never produced by a delegate's own logic; domain failures travel
/// as [`Exception`]s inside [`Fault::Thrown`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// Qualified name not found in the target context
    #[error("Type '{name}' not found in context '{context}'")]
    TypeResolution {
        /// Qualified type name
        name: String,
        /// Name of the context that was searched
        context: String,
    },

    /// No forwardable method matches the call
    #[error("No method '{method}' on '{type_name}' matches the call")]
    MethodResolution {
        /// Method name
        method: String,
        /// Type that was searched
        type_name: String,
    },

    /// A method of that name exists but never with the given parameter count
    #[error("Method '{method}' on '{type_name}' takes {expected:?} args, but {got} provided")]
    ArityMismatch {
        /// Method name
        method: String,
        /// Type that was searched
        type_name: String,
        /// Parameter counts of every candidate
        expected: Vec<usize>,
        /// Number of arguments supplied
        got: usize,
    },

    /// Collection kind other than a sequence or a set
    #[error("Cannot translate collection of kind '{0}'")]
    UnsupportedCollectionKind(String),

    /// Enum member absent from the target enum type
    #[error("Wrong value provided to the enum '{enum_type}': '{name}'")]
    UnknownEnumValue {
        /// Qualified enum type name
        enum_type: String,
        /// Member name that was looked up
        name: String,
    },

    /// Object exposes zero or more than one non-core interface
    #[error("Type '{type_name}' must implement exactly one non-core interface, found {found:?}")]
    AmbiguousCapability {
        /// Runtime type of the object
        type_name: String,
        /// Non-core interfaces that were found
        found: Vec<String>,
    },

    /// Proxy target type is not an interface
    #[error("Type '{0}' is not an interface")]
    UnsupportedCapability(String),

    /// Delegate does not live in the context it was declared in
    #[error("Object of '{type_name}' lives in context '{found}', not '{expected}'")]
    ContextMismatch {
        /// Runtime type of the delegate
        type_name: String,
        /// Context the caller claimed
        expected: String,
        /// Context the object belongs to
        found: String,
    },

    /// Maximum translation depth exceeded
    #[error("Maximum translation depth of {0} exceeded")]
    MaxDepthExceeded(usize),

    /// Field not declared on the object's class
    #[error("No field '{field}' on '{type_name}'")]
    NoSuchField {
        /// Runtime type of the object
        type_name: String,
        /// Field name
        field: String,
    },

    /// Value or type of an unexpected shape
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Invalid argument
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Malformed type or context definition
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

impl BridgeError {
    /// Shorthand for a [`BridgeError::TypeMismatch`]
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        BridgeError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }
}

/// Outcome of a failed method call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Fault {
    /// Exception raised by the called code
    #[error("{0}")]
    Thrown(Exception),

    /// Translation machinery failure
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl Fault {
    /// The thrown exception, if this is a domain failure
    pub fn exception(&self) -> Option<&Exception> {
        match self {
            Fault::Thrown(e) => Some(e),
            Fault::Bridge(_) => None,
        }
    }

    /// The bridge error, if this is a machinery failure
    pub fn bridge_error(&self) -> Option<&BridgeError> {
        match self {
            Fault::Thrown(_) => None,
            Fault::Bridge(e) => Some(e),
        }
    }
}

impl From<Exception> for Fault {
    fn from(e: Exception) -> Self {
        Fault::Thrown(e)
    }
}
