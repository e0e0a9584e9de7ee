//! Caller-side proxies.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::env::Environment;
use crate::error::DispatchError;
use crate::object::Invocable;
use crate::types::{InterfaceDef, MethodSig, TypeDesc};
use crate::value::Value;

/// A stand-in for a target object living in a different environment.
///
/// The proxy implements exactly one interface, looked up in the environment
/// it is visible in; every method call routes through the mirroring
/// dispatcher to the real target. Proxies are themselves [`Invocable`], which
/// is how interface values bridge to arbitrary depth: a proxy handed across
/// the boundary is simply wrapped in another proxy traveling the other way.
pub struct Proxy {
    interface: Arc<InterfaceDef>,
    dispatcher: Dispatcher,
}

impl Proxy {
    pub(crate) fn new(
        interface: Arc<InterfaceDef>,
        target: Arc<dyn Invocable>,
        target_env: Arc<Environment>,
        source_env: Arc<Environment>,
    ) -> Self {
        Self {
            interface,
            dispatcher: Dispatcher::new(target, target_env, source_env),
        }
    }

    /// The interface this proxy implements.
    pub fn interface(&self) -> &Arc<InterfaceDef> {
        &self.interface
    }

    /// The environment the target object lives in.
    pub fn target_environment(&self) -> &Arc<Environment> {
        self.dispatcher.target_environment()
    }

    /// The environment this proxy is visible in.
    pub fn source_environment(&self) -> &Arc<Environment> {
        self.dispatcher.source_environment()
    }

    /// Invoke an interface method, surfacing any dispatch failure.
    ///
    /// Resolution on this surface is by name and argument count; the
    /// mirrored parameter types then select the exact method on the target's
    /// runtime type.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, DispatchError> {
        let sig = self.interface.resolve_by_arity(method, args.len())?;
        self.dispatcher.dispatch(sig, args)
    }

    /// Invoke an interface method, flattening failures to [`Value::Null`].
    ///
    /// Any dispatch error is logged once and swallowed — the historical
    /// contract for callers that treat a failed cross-environment call as
    /// non-fatal. Prefer [`Proxy::invoke`] when the distinction matters.
    pub fn invoke_lenient(&self, method: &str, args: &[Value]) -> Value {
        match self.invoke(method, args) {
            Ok(value) => value,
            Err(error) => {
                log::error!(
                    "call to `{}.{}` failed: {}",
                    self.interface.name(),
                    method,
                    error
                );
                Value::Null
            }
        }
    }
}

impl Invocable for Proxy {
    fn runtime_type(&self) -> &str {
        self.interface.name()
    }

    fn find_method(&self, name: &str, params: &[TypeDesc]) -> Option<&MethodSig> {
        self.interface.find(name, params)
    }

    fn invoke_resolved(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError> {
        self.dispatcher.dispatch(sig, args)
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, DispatchError> {
        Proxy::invoke(self, method, args)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("interface", &self.interface.name())
            .field("target_env", &self.target_environment().id())
            .field("source_env", &self.source_environment().id())
            .finish()
    }
}
