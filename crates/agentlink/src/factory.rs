//! The proxy factory: the runtime surface callers build bridges with.
//!
//! A factory is configured once with a strategy for resolving the caller's
//! own environment and, optionally, a shared [`EnvironmentCache`]. Each
//! `create_proxy` call then obtains the agent's environment for a set of
//! library locations and wraps a target object behind a proxy implementing
//! an interface from the caller's environment.
//!
//! When a bridged interface mentions further interface types, configure a
//! cache and build the target via [`ProxyFactory::agent_environment`]: the
//! target's signatures and the proxy's mirrored types must then agree on one
//! environment instance.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::env::{ambient, Environment, EnvironmentCache};
use crate::error::BridgeError;
use crate::object::Invocable;
use crate::proxy::Proxy;

/// Strategy resolving the caller's own environment when the factory runs.
pub trait CallerEnvironmentProvider: Send + Sync {
    /// The environment proxies built by this factory are visible in.
    fn caller_environment(&self) -> Result<Arc<Environment>, BridgeError>;
}

/// Provider pinned to one environment.
pub struct FixedCallerEnvironment {
    environment: Arc<Environment>,
}

impl FixedCallerEnvironment {
    /// Pin the provider to `environment`.
    pub fn new(environment: Arc<Environment>) -> Self {
        Self { environment }
    }
}

impl CallerEnvironmentProvider for FixedCallerEnvironment {
    fn caller_environment(&self) -> Result<Arc<Environment>, BridgeError> {
        Ok(self.environment.clone())
    }
}

/// Provider reading the thread's ambient environment at factory-call time.
pub struct AmbientCallerEnvironment;

impl CallerEnvironmentProvider for AmbientCallerEnvironment {
    fn caller_environment(&self) -> Result<Arc<Environment>, BridgeError> {
        ambient::current().ok_or(BridgeError::NoCallerEnvironment)
    }
}

/// Builds caller-side proxies for targets in isolated environments.
pub struct ProxyFactory {
    caller_provider: Box<dyn CallerEnvironmentProvider>,
    cache: Option<Arc<EnvironmentCache>>,
}

impl ProxyFactory {
    /// Create a factory with the given caller-environment strategy.
    pub fn new(provider: impl CallerEnvironmentProvider + 'static) -> Self {
        Self {
            caller_provider: Box::new(provider),
            cache: None,
        }
    }

    /// Share an environment cache across this factory's calls.
    ///
    /// Repeated calls for the same location set then reuse one environment
    /// instance instead of creating a new one per call.
    pub fn with_cache(mut self, cache: Arc<EnvironmentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Obtain the agent environment for a set of library locations.
    ///
    /// Goes through the cache when one is configured (keyed by the location
    /// *set*, not its order), otherwise loads a fresh environment bounded to
    /// exactly these locations.
    pub fn agent_environment(
        &self,
        locations: &[PathBuf],
    ) -> Result<Arc<Environment>, BridgeError> {
        let locations: BTreeSet<PathBuf> = locations.iter().cloned().collect();
        match &self.cache {
            Some(cache) => cache.get_or_create(&locations),
            None => Environment::load(locations),
        }
    }

    /// Build a proxy of `interface` backed by `target`.
    ///
    /// `interface` is looked up in the caller's environment; `locations`
    /// identify the target's dependency closure. Environment construction
    /// failures surface here and produce no proxy.
    pub fn create_proxy(
        &self,
        locations: &[PathBuf],
        interface: &str,
        target: Arc<dyn Invocable>,
    ) -> Result<Proxy, BridgeError> {
        let target_env = self.agent_environment(locations)?;
        let caller_env = self.caller_provider.caller_environment()?;
        let definition =
            caller_env
                .interface(interface)
                .ok_or_else(|| BridgeError::UnknownInterface {
                    name: interface.to_string(),
                })?;
        log::debug!(
            "proxying `{}` for target `{}` in {}",
            interface,
            target.runtime_type(),
            target_env.id(),
        );
        Ok(Proxy::new(definition, target, target_env, caller_env))
    }
}
