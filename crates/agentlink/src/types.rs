//! Structural type descriptions used by the mirroring machinery.
//!
//! Every declared parameter and return type is classified into one of three
//! shapes, and mirroring checks them in this priority order: array types
//! recurse element-wise, interface types are re-loaded in the destination
//! environment and proxied, everything else passes through opaquely. The
//! ordering matters: an array of interfaces must recurse, not proxy the
//! array itself.

use std::fmt;
use std::sync::Arc;

use crate::env::EnvironmentId;
use crate::error::DispatchError;

/// Structural classification of a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDesc {
    /// An array of a component type.
    Array(Box<TypeDesc>),
    /// An interface declared in a specific environment.
    Interface(InterfaceRef),
    /// A primitive or opaque concrete class, passed through unchanged.
    Opaque(OpaqueType),
}

impl TypeDesc {
    /// Whether this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, TypeDesc::Array(_))
    }

    /// Whether this is an interface type.
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeDesc::Interface(_))
    }

    /// The component type of an array, if this is one.
    pub fn component(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Array(component) => Some(component),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Array(component) => write!(f, "{component}[]"),
            TypeDesc::Interface(reference) => f.write_str(reference.name()),
            TypeDesc::Opaque(opaque) => match opaque {
                OpaqueType::Unit => f.write_str("void"),
                OpaqueType::Bool => f.write_str("bool"),
                OpaqueType::Int => f.write_str("int"),
                OpaqueType::Float => f.write_str("float"),
                OpaqueType::Str => f.write_str("string"),
                OpaqueType::Class(name) => f.write_str(name),
            },
        }
    }
}

/// Reference to an interface as declared in one environment.
///
/// Equality includes the environment id: same-named interfaces from two
/// environments are distinct types and never assignment-compatible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRef {
    environment: EnvironmentId,
    name: Arc<str>,
}

impl InterfaceRef {
    pub(crate) fn new(environment: EnvironmentId, name: Arc<str>) -> Self {
        Self { environment, name }
    }

    /// The environment the interface is declared in.
    pub fn environment(&self) -> EnvironmentId {
        self.environment
    }

    /// The fully qualified interface name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Non-array, non-interface types: passed through mirroring unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpaqueType {
    /// The `void` return type.
    Unit,
    /// The `bool` primitive.
    Bool,
    /// The `int` primitive.
    Int,
    /// The `float` primitive.
    Float,
    /// The `string` primitive.
    Str,
    /// A named concrete class, assumed mutually visible across environments.
    Class(Arc<str>),
}

/// A method signature: name, declared parameter types, declared return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    name: Arc<str>,
    params: Vec<TypeDesc>,
    returns: TypeDesc,
}

impl MethodSig {
    pub(crate) fn new(name: impl Into<Arc<str>>, params: Vec<TypeDesc>, returns: TypeDesc) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter types.
    pub fn params(&self) -> &[TypeDesc] {
        &self.params
    }

    /// The declared return type.
    pub fn returns(&self) -> &TypeDesc {
        &self.returns
    }

    /// Render the signature, e.g. `greet(string) -> string`.
    pub fn signature(&self) -> String {
        format!("{}({}) -> {}", self.name, render_params(&self.params), self.returns)
    }
}

/// An interface definition loaded into an environment.
#[derive(Debug)]
pub struct InterfaceDef {
    environment: EnvironmentId,
    name: Arc<str>,
    methods: Vec<MethodSig>,
}

impl InterfaceDef {
    pub(crate) fn new(environment: EnvironmentId, name: Arc<str>, methods: Vec<MethodSig>) -> Self {
        Self {
            environment,
            name,
            methods,
        }
    }

    /// The environment this definition belongs to.
    pub fn environment(&self) -> EnvironmentId {
        self.environment
    }

    /// The fully qualified interface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared methods.
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    /// Find a method by name and exact parameter types.
    pub fn find(&self, name: &str, params: &[TypeDesc]) -> Option<&MethodSig> {
        self.methods
            .iter()
            .find(|sig| sig.name() == name && sig.params() == params)
    }

    pub(crate) fn reference(&self) -> InterfaceRef {
        InterfaceRef::new(self.environment, self.name.clone())
    }

    /// Resolve a by-name call: match on name and argument count.
    pub(crate) fn resolve_by_arity(
        &self,
        method: &str,
        arity: usize,
    ) -> Result<&MethodSig, DispatchError> {
        let mut found: Option<&MethodSig> = None;
        let mut name_seen: Option<&MethodSig> = None;
        for sig in &self.methods {
            if sig.name() != method {
                continue;
            }
            name_seen = Some(sig);
            if sig.params().len() == arity {
                if found.is_some() {
                    return Err(DispatchError::AmbiguousMethod {
                        type_name: self.name.to_string(),
                        method: method.to_string(),
                        arity,
                    });
                }
                found = Some(sig);
            }
        }
        match (found, name_seen) {
            (Some(sig), _) => Ok(sig),
            (None, Some(sig)) => Err(DispatchError::ArityMismatch {
                method: method.to_string(),
                expected: sig.params().len(),
                actual: arity,
            }),
            (None, None) => Err(DispatchError::MethodNotFound {
                type_name: self.name.to_string(),
                method: method.to_string(),
                params: "…".to_string(),
            }),
        }
    }
}

pub(crate) fn render_params(params: &[TypeDesc]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
