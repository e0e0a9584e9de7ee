//! Agent objects and the dynamic invocation surface.
//!
//! Anything that can stand on the target side of the bridge implements
//! [`Invocable`]: concrete agent objects built with [`ObjectBuilder`], and
//! proxies themselves (which is what makes nested bridging compose).
//!
//! An [`AgentObject`] is instantiated *inside* an environment: its class name
//! must be declared there and every method signature is resolved against it.
//! Method handlers are plain closures in the host program; the bridge treats
//! them as the method bodies of the agent's runtime type.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::env::Environment;
use crate::error::{AgentFault, BridgeError, DispatchError};
use crate::types::{render_params, MethodSig, TypeDesc};
use crate::value::Value;

/// A method body bound to an agent object.
pub type MethodHandler =
    Arc<dyn Fn(&CallContext<'_>, &[Value]) -> Result<Value, AgentFault> + Send + Sync>;

/// Context handed to a method handler for one invocation.
///
/// Exposes the environment the object lives in explicitly; handlers that
/// prefer the implicit route can consult [`crate::ambient::current`], which
/// the dispatcher points at the same environment for the duration of a
/// bridged call.
pub struct CallContext<'a> {
    environment: &'a Arc<Environment>,
    method: &'a MethodSig,
}

impl<'a> CallContext<'a> {
    /// The environment the invoked object lives in.
    pub fn environment(&self) -> &Arc<Environment> {
        self.environment
    }

    /// The signature of the method being invoked.
    pub fn method(&self) -> &MethodSig {
        self.method
    }
}

/// An object that can be invoked dynamically by method name and signature.
pub trait Invocable: Send + Sync {
    /// The object's runtime type name.
    fn runtime_type(&self) -> &str;

    /// Find a method by name and exact parameter types.
    fn find_method(&self, name: &str, params: &[TypeDesc]) -> Option<&MethodSig>;

    /// Invoke an already-resolved method, bypassing visibility.
    ///
    /// This is the bridge's entry point: the dispatcher resolves against the
    /// mirrored parameter types first and then calls through here, public or
    /// not.
    fn invoke_resolved(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError>;

    /// Invoke by name, resolving on name and argument count.
    ///
    /// This is the direct surface: visibility is respected.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, DispatchError>;
}

struct BoundMethod {
    sig: MethodSig,
    public: bool,
    handler: MethodHandler,
}

/// A concrete agent object living inside one environment.
pub struct AgentObject {
    class_name: Arc<str>,
    environment: Arc<Environment>,
    methods: Vec<BoundMethod>,
}

impl AgentObject {
    /// The environment this object was instantiated in.
    pub fn environment(&self) -> &Arc<Environment> {
        &self.environment
    }

    /// The object's class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    fn bound(&self, sig: &MethodSig) -> Option<&BoundMethod> {
        self.methods
            .iter()
            .find(|bound| bound.sig.name() == sig.name() && bound.sig.params() == sig.params())
    }

    fn resolve_direct(&self, method: &str, arity: usize) -> Result<&BoundMethod, DispatchError> {
        let mut found: Option<&BoundMethod> = None;
        let mut name_seen: Option<&BoundMethod> = None;
        for bound in &self.methods {
            if bound.sig.name() != method {
                continue;
            }
            name_seen = Some(bound);
            if bound.sig.params().len() == arity {
                if found.is_some() {
                    return Err(DispatchError::AmbiguousMethod {
                        type_name: self.class_name.to_string(),
                        method: method.to_string(),
                        arity,
                    });
                }
                found = Some(bound);
            }
        }
        match (found, name_seen) {
            (Some(bound), _) => Ok(bound),
            (None, Some(bound)) => Err(DispatchError::ArityMismatch {
                method: method.to_string(),
                expected: bound.sig.params().len(),
                actual: arity,
            }),
            (None, None) => Err(DispatchError::MethodNotFound {
                type_name: self.class_name.to_string(),
                method: method.to_string(),
                params: "…".to_string(),
            }),
        }
    }

    fn invoke_bound(&self, bound: &BoundMethod, args: &[Value]) -> Result<Value, DispatchError> {
        let context = CallContext {
            environment: &self.environment,
            method: &bound.sig,
        };
        match catch_unwind(AssertUnwindSafe(|| (bound.handler)(&context, args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => Err(DispatchError::Fault {
                method: bound.sig.name().to_string(),
                fault,
            }),
            Err(payload) => Err(DispatchError::Panicked {
                method: bound.sig.name().to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

impl Invocable for AgentObject {
    fn runtime_type(&self) -> &str {
        &self.class_name
    }

    fn find_method(&self, name: &str, params: &[TypeDesc]) -> Option<&MethodSig> {
        self.methods
            .iter()
            .map(|bound| &bound.sig)
            .find(|sig| sig.name() == name && sig.params() == params)
    }

    fn invoke_resolved(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError> {
        let bound = self.bound(sig).ok_or_else(|| DispatchError::MethodNotFound {
            type_name: self.class_name.to_string(),
            method: sig.name().to_string(),
            params: render_params(sig.params()),
        })?;
        self.invoke_bound(bound, args)
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, DispatchError> {
        let bound = self.resolve_direct(method, args.len())?;
        if !bound.public {
            return Err(DispatchError::NotAccessible {
                type_name: self.class_name.to_string(),
                method: method.to_string(),
            });
        }
        self.invoke_bound(bound, args)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// Builder for [`AgentObject`].
///
/// Signatures are given as type specs (`"string"`, `"demo.Listener[]"`) and
/// resolved against the object's environment at bind time, so a mistyped
/// signature fails construction, not the first call.
pub struct ObjectBuilder {
    environment: Arc<Environment>,
    class_name: Arc<str>,
    methods: Vec<BoundMethod>,
}

impl fmt::Debug for ObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBuilder")
            .field("class_name", &self.class_name)
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl ObjectBuilder {
    /// Start building an instance of `class_name` inside `environment`.
    ///
    /// The class must be declared by one of the environment's libraries.
    pub fn new(environment: &Arc<Environment>, class_name: &str) -> Result<Self, BridgeError> {
        if !environment.class_declared(class_name) {
            return Err(BridgeError::UnknownClass {
                name: class_name.to_string(),
            });
        }
        Ok(Self {
            environment: environment.clone(),
            class_name: Arc::from(class_name),
            methods: Vec::new(),
        })
    }

    /// Bind a public method.
    pub fn method<F>(
        self,
        name: &str,
        params: &[&str],
        returns: &str,
        handler: F,
    ) -> Result<Self, BridgeError>
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value, AgentFault> + Send + Sync + 'static,
    {
        self.bind(name, params, returns, true, handler)
    }

    /// Bind a non-public method.
    ///
    /// Direct invocation rejects it; the bridge's dispatcher does not.
    pub fn internal_method<F>(
        self,
        name: &str,
        params: &[&str],
        returns: &str,
        handler: F,
    ) -> Result<Self, BridgeError>
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value, AgentFault> + Send + Sync + 'static,
    {
        self.bind(name, params, returns, false, handler)
    }

    fn bind<F>(
        mut self,
        name: &str,
        params: &[&str],
        returns: &str,
        public: bool,
        handler: F,
    ) -> Result<Self, BridgeError>
    where
        F: Fn(&CallContext<'_>, &[Value]) -> Result<Value, AgentFault> + Send + Sync + 'static,
    {
        let mut sig_params = Vec::with_capacity(params.len());
        for param in params {
            sig_params.push(self.environment.resolve_type(param)?);
        }
        let returns = self.environment.resolve_type(returns)?;
        let sig = MethodSig::new(name, sig_params, returns);
        if self
            .methods
            .iter()
            .any(|bound| bound.sig.name() == sig.name() && bound.sig.params() == sig.params())
        {
            return Err(BridgeError::DuplicateMethod {
                owner: self.class_name.to_string(),
                method: name.to_string(),
            });
        }
        self.methods.push(BoundMethod {
            sig,
            public,
            handler: Arc::new(handler),
        });
        Ok(self)
    }

    /// Finish the object.
    pub fn build(self) -> Arc<AgentObject> {
        Arc::new(AgentObject {
            class_name: self.class_name,
            environment: self.environment,
            methods: self.methods,
        })
    }
}
