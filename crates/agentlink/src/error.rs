//! Error types for environment construction and cross-environment dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing environments, agent objects, or proxies.
///
/// Construction failures are fatal to the operation that raised them: no
/// partially built environment escapes and no cache entry is populated.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A library location could not be read.
    #[error("cannot read library location {}: {}", path.display(), source)]
    UnreadableLocation {
        /// Location that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A library manifest was not valid JSON or did not match the schema.
    #[error("malformed library manifest {}: {}", path.display(), source)]
    MalformedManifest {
        /// Location of the offending manifest.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A type name in a manifest or signature could not be parsed.
    #[error("invalid type name `{spec}`")]
    InvalidTypeName {
        /// The offending type spec as written.
        spec: String,
    },

    /// Two libraries in one environment declare the same type name.
    #[error("duplicate definition of type `{name}`")]
    DuplicateType {
        /// The doubly-declared type name.
        name: String,
    },

    /// A method with the same name and parameter types was declared twice.
    #[error("duplicate method `{method}` on `{owner}`")]
    DuplicateMethod {
        /// Interface or class carrying the duplicate.
        owner: String,
        /// The doubly-declared method name.
        method: String,
    },

    /// The requested interface is not defined in the environment.
    #[error("interface `{name}` is not defined in this environment")]
    UnknownInterface {
        /// The missing interface name.
        name: String,
    },

    /// The requested class is not declared in the environment.
    #[error("class `{name}` is not declared in this environment")]
    UnknownClass {
        /// The missing class name.
        name: String,
    },

    /// No caller environment could be resolved for proxy creation.
    #[error("no caller environment is active on this thread")]
    NoCallerEnvironment,
}

/// Errors raised by a single cross-environment call.
///
/// Every variant is contained to the call that produced it; the bridge itself
/// stays usable. [`Proxy::invoke`](crate::Proxy::invoke) surfaces these
/// directly, [`Proxy::invoke_lenient`](crate::Proxy::invoke_lenient) flattens
/// them to a null value plus a log entry.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// An interface type could not be loaded in the destination environment.
    #[error("interface `{name}` is not loadable in the destination environment")]
    TypeNotFound {
        /// Name of the interface that failed to load.
        name: String,
    },

    /// No method on the target's runtime type matched the mirrored signature.
    #[error("no method `{method}({params})` on `{type_name}`")]
    MethodNotFound {
        /// Runtime type of the target object.
        type_name: String,
        /// The requested method name.
        method: String,
        /// Rendered parameter types the resolution was attempted with.
        params: String,
    },

    /// Two overloads with the same name and arity matched a by-name call.
    #[error("ambiguous overloads for `{method}` with {arity} arguments on `{type_name}`")]
    AmbiguousMethod {
        /// Runtime type of the target object.
        type_name: String,
        /// The requested method name.
        method: String,
        /// Number of arguments supplied.
        arity: usize,
    },

    /// The argument count does not match the method's declared parameters.
    #[error("method `{method}` expects {expected} arguments, got {actual}")]
    ArityMismatch {
        /// The requested method name.
        method: String,
        /// Declared parameter count.
        expected: usize,
        /// Supplied argument count.
        actual: usize,
    },

    /// A direct (non-bridged) call hit a method that is not public.
    #[error("method `{method}` on `{type_name}` is not public")]
    NotAccessible {
        /// Runtime type of the target object.
        type_name: String,
        /// The inaccessible method name.
        method: String,
    },

    /// A runtime value cannot inhabit its declared type.
    #[error("value of kind `{actual}` does not fit declared type `{expected}`")]
    ValueShape {
        /// Rendered declared type.
        expected: String,
        /// Kind of the offending value.
        actual: &'static str,
    },

    /// The invoked method raised a fault.
    #[error("method `{method}` raised a fault")]
    Fault {
        /// The faulting method name.
        method: String,
        /// The fault the handler raised.
        #[source]
        fault: AgentFault,
    },

    /// The invoked method panicked; the panic was contained by the bridge.
    #[error("method `{method}` panicked: {message}")]
    Panicked {
        /// The panicking method name.
        method: String,
        /// Panic payload rendered as text.
        message: String,
    },
}

/// A fault raised by an agent method handler.
///
/// Handlers return `Result<Value, AgentFault>`; the bridge carries the fault
/// to the caller as the source of [`DispatchError::Fault`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AgentFault {
    message: String,
}

impl AgentFault {
    /// Create a fault with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The fault message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for AgentFault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for AgentFault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
