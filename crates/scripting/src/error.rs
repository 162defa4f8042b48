//! Error types for the scripting crate

use asbridge_core::BridgeError;

/// Errors raised inside the script engine while a call is running
///
/// These surface at the script call site; the host is never affected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// Error raised by a bound host function
    #[error("Runtime error: {0}")]
    RuntimeError(String),

    /// Value cannot be represented in the target type system
    #[error("Conversion error: cannot convert {from} to {to}")]
    Conversion { from: String, to: String },

    /// Function, property or type not registered
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// No overload accepts the given arguments
    #[error("No matching signature for {name}: {reason}")]
    NoMatchingSignature { name: String, reason: String },

    /// Argument missing or of the wrong shape
    #[error("Invalid argument {index}: {message}")]
    InvalidArgument { index: usize, message: String },

    /// Value type does not match the expected script type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Access through a null handle
    #[error("Null handle access")]
    NullHandle,

    /// The host destroyed the object behind a handle
    #[error("Invalid handle: {0} no longer exists")]
    InvalidHandle(String),

    /// Assignment to a property without setter
    #[error("Property {0} is read-only")]
    ReadOnlyProperty(String),
}

/// Errors raised while installing symbols at module load
///
/// Any of these aborts the module load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Malformed declaration '{decl}': {message}")]
    MalformedDeclaration { decl: String, message: String },

    #[error("Unknown type '{ty}' in declaration '{decl}'")]
    UnknownType { decl: String, ty: String },

    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("Unknown enum: {0}")]
    UnknownEnum(String),
}

impl RegistrationError {
    pub(crate) fn malformed(decl: &str, message: impl Into<String>) -> Self {
        Self::MalformedDeclaration {
            decl: decl.to_string(),
            message: message.into(),
        }
    }
}

impl From<ScriptError> for BridgeError {
    fn from(err: ScriptError) -> Self {
        BridgeError::Script(err.to_string())
    }
}

impl From<RegistrationError> for BridgeError {
    fn from(err: RegistrationError) -> Self {
        BridgeError::Registration(err.to_string())
    }
}

/// Result type for script calls
pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// Result type for registration
pub type Result<T> = std::result::Result<T, RegistrationError>;
