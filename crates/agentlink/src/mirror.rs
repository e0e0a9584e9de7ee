//! Recursive type/value mirroring between environments.

use std::sync::Arc;

use crate::env::Environment;
use crate::error::DispatchError;
use crate::proxy::Proxy;
use crate::types::TypeDesc;
use crate::value::{ArrayValue, Value};

/// One computed translation: the equivalent type and value in the
/// destination environment. Transient — recomputed on every call.
pub(crate) struct Mirror {
    ty: TypeDesc,
    value: Value,
}

impl Mirror {
    /// Mirror `value`, declared as `declared` in `from`, into `to`.
    pub(crate) fn reflect(
        declared: &TypeDesc,
        value: &Value,
        from: &Arc<Environment>,
        to: &Arc<Environment>,
    ) -> Result<Self, DispatchError> {
        match declared {
            // Checked before the interface arm: an array of interfaces must
            // recurse element-wise, not be proxied as a whole.
            TypeDesc::Array(component) => {
                // The component type is mirrored even for a null array, so
                // the destination-side signature is still correct.
                let (component_ty, _) =
                    Self::reflect(component, &Value::Null, from, to)?.into_parts();
                let mirrored = match value {
                    Value::Null => Value::Null,
                    Value::Array(source) => {
                        let mut items = Vec::with_capacity(source.len());
                        for item in source.items() {
                            items.push(Self::reflect(component, item, from, to)?.into_value());
                        }
                        Value::Array(ArrayValue::new(component_ty.clone(), items))
                    }
                    other => {
                        return Err(DispatchError::ValueShape {
                            expected: declared.to_string(),
                            actual: other.kind(),
                        })
                    }
                };
                Ok(Mirror {
                    ty: TypeDesc::Array(Box::new(component_ty)),
                    value: mirrored,
                })
            }
            TypeDesc::Interface(reference) => {
                let definition =
                    to.interface(reference.name())
                        .ok_or_else(|| DispatchError::TypeNotFound {
                            name: reference.name().to_string(),
                        })?;
                let mirrored = match value {
                    Value::Null => Value::Null,
                    // Never copied: the value is wrapped in a new proxy whose
                    // dispatcher travels in the opposite direction.
                    Value::Object(target) => Value::Object(Arc::new(Proxy::new(
                        definition.clone(),
                        target.clone(),
                        from.clone(),
                        to.clone(),
                    ))),
                    other => {
                        return Err(DispatchError::ValueShape {
                            expected: declared.to_string(),
                            actual: other.kind(),
                        })
                    }
                };
                Ok(Mirror {
                    ty: TypeDesc::Interface(definition.reference()),
                    value: mirrored,
                })
            }
            TypeDesc::Opaque(_) => Ok(Mirror {
                ty: declared.clone(),
                value: value.clone(),
            }),
        }
    }

    pub(crate) fn into_parts(self) -> (TypeDesc, Value) {
        (self.ty, self.value)
    }

    pub(crate) fn into_value(self) -> Value {
        self.value
    }
}
