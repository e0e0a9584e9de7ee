//! The per-call dispatch sequence.

use std::sync::Arc;

use crate::env::{ambient, Environment};
use crate::error::DispatchError;
use crate::mirror::Mirror;
use crate::object::Invocable;
use crate::types::{render_params, MethodSig};
use crate::value::Value;

/// Routes calls from a source environment to a target object in another.
///
/// One dispatch runs strictly sequentially on the calling thread: switch the
/// ambient environment in, mirror the arguments left to right, resolve the
/// method on the target's runtime type against the mirrored parameter types,
/// invoke, mirror the result back, switch the ambient environment out.
pub(crate) struct Dispatcher {
    target: Arc<dyn Invocable>,
    target_env: Arc<Environment>,
    source_env: Arc<Environment>,
}

impl Dispatcher {
    pub(crate) fn new(
        target: Arc<dyn Invocable>,
        target_env: Arc<Environment>,
        source_env: Arc<Environment>,
    ) -> Self {
        Self {
            target,
            target_env,
            source_env,
        }
    }

    pub(crate) fn target_environment(&self) -> &Arc<Environment> {
        &self.target_env
    }

    pub(crate) fn source_environment(&self) -> &Arc<Environment> {
        &self.source_env
    }

    pub(crate) fn dispatch(
        &self,
        declared: &MethodSig,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        if args.len() != declared.params().len() {
            return Err(DispatchError::ArityMismatch {
                method: declared.name().to_string(),
                expected: declared.params().len(),
                actual: args.len(),
            });
        }

        log::trace!(
            "dispatching {}::{} from {} to {}",
            self.target.runtime_type(),
            declared.name(),
            self.source_env.id(),
            self.target_env.id(),
        );

        // The guard restores the caller's ambient environment on every exit
        // path, including unwinds out of the handler.
        let _context = ambient::enter(self.target_env.clone());

        let mut mirrored_types = Vec::with_capacity(args.len());
        let mut mirrored_args = Vec::with_capacity(args.len());
        for (declared_ty, value) in declared.params().iter().zip(args) {
            let (ty, value) =
                Mirror::reflect(declared_ty, value, &self.source_env, &self.target_env)?
                    .into_parts();
            mirrored_types.push(ty);
            mirrored_args.push(value);
        }

        let resolved = self
            .target
            .find_method(declared.name(), &mirrored_types)
            .ok_or_else(|| DispatchError::MethodNotFound {
                type_name: self.target.runtime_type().to_string(),
                method: declared.name().to_string(),
                params: render_params(&mirrored_types),
            })?;

        let result = self.target.invoke_resolved(resolved, &mirrored_args)?;

        Ok(
            Mirror::reflect(resolved.returns(), &result, &self.target_env, &self.source_env)?
                .into_value(),
        )
    }
}
