//! agentlink — cross-environment invocation bridge for isolated agent plugins.
//!
//! An *agent* is a piece of behavior whose dependency closure is loaded into
//! its own isolated [`Environment`]: a bounded namespace of types built from a
//! set of library manifests. Two environments never share type identity, even
//! when they load identically-named types from the same files.
//!
//! The bridge makes a call across that boundary transparent. A caller holds a
//! [`Proxy`] implementing an interface from its *own* environment; every
//! invocation mirrors the arguments into the target's environment, resolves
//! and invokes the matching method on the real target object, and mirrors the
//! result back:
//!
//! - array-typed values recurse element-wise into a freshly allocated array,
//! - interface-typed values are never copied — they are wrapped in a new
//!   proxy traveling in the opposite direction,
//! - everything else (primitives, opaque concrete classes) passes through
//!   unchanged, by reference.
//!
//! # Example
//!
//! ```rust,ignore
//! use agentlink::{
//!     Environment, EnvironmentCache, FixedCallerEnvironment, ObjectBuilder,
//!     ProxyFactory, Value,
//! };
//! use std::sync::Arc;
//!
//! let caller_env = Environment::load([api_manifest.clone()])?;
//! let factory = ProxyFactory::new(FixedCallerEnvironment::new(caller_env))
//!     .with_cache(Arc::new(EnvironmentCache::new()));
//!
//! // Build the agent inside its own environment...
//! let agent_env = factory.agent_environment(&[api_manifest.clone()])?;
//! let greeter = ObjectBuilder::new(&agent_env, "demo.GreeterImpl")?
//!     .method("greet", &["string"], "string", |_ctx, args| {
//!         let name = args[0].as_str().unwrap_or_default();
//!         Ok(Value::string(format!("Hello, {name}")))
//!     })?
//!     .build();
//!
//! // ...and call it through a proxy shaped by the caller's environment.
//! let proxy = factory.create_proxy(&[api_manifest], "demo.Greeter", greeter)?;
//! let greeting = proxy.invoke("greet", &[Value::string("Ann")])?;
//! ```

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod factory;
pub mod object;
pub mod proxy;
pub mod types;
pub mod value;

mod dispatch;
mod manifest;
mod mirror;

pub use env::{ambient, Environment, EnvironmentCache, EnvironmentId, LibraryInfo};
pub use error::{AgentFault, BridgeError, DispatchError};
pub use factory::{
    AmbientCallerEnvironment, CallerEnvironmentProvider, FixedCallerEnvironment, ProxyFactory,
};
pub use object::{AgentObject, CallContext, Invocable, MethodHandler, ObjectBuilder};
pub use proxy::Proxy;
pub use types::{InterfaceDef, InterfaceRef, MethodSig, OpaqueType, TypeDesc};
pub use value::{ArrayValue, OpaqueValue, Value};
