//! Isolated type environments.
//!
//! An [`Environment`] is a bounded namespace of types built from a set of
//! library manifest locations — the dependency closure of one agent. It is
//! immutable once loaded and shared by reference counting: every proxy and
//! mirrored value holds an `Arc` to the environments it bridges, so an
//! environment lives at least as long as anything referencing it.
//!
//! Two environments never share type identity. Loading the same manifests
//! twice yields two distinct environments whose same-named interfaces are
//! *not* assignment-compatible; [`EnvironmentId`] is part of interface type
//! equality for exactly this reason.

pub mod ambient;
mod cache;

pub use cache::EnvironmentCache;

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::BridgeError;
use crate::manifest::{self, LibraryManifest};
use crate::types::{InterfaceDef, InterfaceRef, MethodSig, OpaqueType, TypeDesc};

/// Process-unique identity of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentId(u64);

impl EnvironmentId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        EnvironmentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn next_for_tests() -> Self {
        Self::next()
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env#{}", self.0)
    }
}

/// Name and version of one library loaded into an environment.
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    name: String,
    version: Option<String>,
}

impl LibraryInfo {
    /// The library name from its manifest.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The library version, when the manifest declares one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// An isolated namespace of types built from a set of library locations.
#[derive(Debug)]
pub struct Environment {
    id: EnvironmentId,
    locations: BTreeSet<PathBuf>,
    interfaces: FxHashMap<Arc<str>, Arc<InterfaceDef>>,
    classes: FxHashSet<Arc<str>>,
    libraries: Vec<LibraryInfo>,
}

impl Environment {
    /// Load an environment from a set of library manifest locations.
    ///
    /// The locations are treated as a set: duplicates collapse and iteration
    /// order does not matter. Any unreadable or malformed location fails the
    /// whole load; no partially built environment is returned. Lookup is
    /// bounded strictly to the given locations — there is no delegation to
    /// any broader namespace.
    pub fn load(locations: impl IntoIterator<Item = PathBuf>) -> Result<Arc<Self>, BridgeError> {
        let locations: BTreeSet<PathBuf> = locations.into_iter().collect();
        let id = EnvironmentId::next();

        let mut manifests: Vec<LibraryManifest> = Vec::with_capacity(locations.len());
        for location in &locations {
            manifests.push(manifest::parse_manifest(location)?);
        }

        // Pass 1: collect declared names so signatures can classify them.
        let mut interface_names: FxHashSet<Arc<str>> = FxHashSet::default();
        let mut libraries = Vec::with_capacity(manifests.len());
        for parsed in &manifests {
            libraries.push(LibraryInfo {
                name: parsed.library.clone(),
                version: parsed.version.clone(),
            });
            for decl in &parsed.interfaces {
                if !interface_names.insert(Arc::from(decl.name.as_str())) {
                    return Err(BridgeError::DuplicateType {
                        name: decl.name.clone(),
                    });
                }
            }
        }
        let mut classes: FxHashSet<Arc<str>> = FxHashSet::default();
        for parsed in &manifests {
            for class in &parsed.classes {
                if interface_names.contains(class.as_str())
                    || !classes.insert(Arc::from(class.as_str()))
                {
                    return Err(BridgeError::DuplicateType {
                        name: class.clone(),
                    });
                }
            }
        }

        // Pass 2: resolve method signatures against the declared names.
        let mut interfaces: FxHashMap<Arc<str>, Arc<InterfaceDef>> = FxHashMap::default();
        for parsed in manifests {
            for decl in parsed.interfaces {
                let mut methods: Vec<MethodSig> = Vec::with_capacity(decl.methods.len());
                for method in &decl.methods {
                    let mut params = Vec::with_capacity(method.params.len());
                    for param in &method.params {
                        params.push(resolve_spec(param, id, &interface_names)?);
                    }
                    let returns = resolve_spec(&method.returns, id, &interface_names)?;
                    let sig = MethodSig::new(method.name.as_str(), params, returns);
                    if methods
                        .iter()
                        .any(|existing| existing.name() == sig.name() && existing.params() == sig.params())
                    {
                        return Err(BridgeError::DuplicateMethod {
                            owner: decl.name.clone(),
                            method: method.name.clone(),
                        });
                    }
                    methods.push(sig);
                }
                let name: Arc<str> = Arc::from(decl.name.as_str());
                interfaces.insert(name.clone(), Arc::new(InterfaceDef::new(id, name, methods)));
            }
        }

        Ok(Arc::new(Environment {
            id,
            locations,
            interfaces,
            classes,
            libraries,
        }))
    }

    /// This environment's process-unique id.
    pub fn id(&self) -> EnvironmentId {
        self.id
    }

    /// The location set this environment was built from.
    pub fn locations(&self) -> &BTreeSet<PathBuf> {
        &self.locations
    }

    /// Metadata of the libraries loaded into this environment.
    pub fn libraries(&self) -> &[LibraryInfo] {
        &self.libraries
    }

    /// Look up an interface definition by fully qualified name.
    pub fn interface(&self, name: &str) -> Option<Arc<InterfaceDef>> {
        self.interfaces.get(name).cloned()
    }

    /// Whether a concrete class of this name is declared here.
    pub fn class_declared(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// Resolve a type spec against this environment.
    ///
    /// Named types declared as interfaces here resolve to interface types
    /// bound to this environment; any other name is an opaque concrete class.
    pub fn resolve_type(&self, spec: &str) -> Result<TypeDesc, BridgeError> {
        let parsed =
            manifest::parse_type_name(spec).ok_or_else(|| BridgeError::InvalidTypeName {
                spec: spec.to_string(),
            })?;
        let mut ty = match primitive_base(&parsed.base) {
            Some(primitive) => TypeDesc::Opaque(primitive),
            None => match self.interfaces.get_key_value(parsed.base.as_str()) {
                Some((name, _)) => TypeDesc::Interface(InterfaceRef::new(self.id, name.clone())),
                None => TypeDesc::Opaque(OpaqueType::Class(Arc::from(parsed.base.as_str()))),
            },
        };
        for _ in 0..parsed.dims {
            ty = TypeDesc::Array(Box::new(ty));
        }
        Ok(ty)
    }
}

fn primitive_base(base: &str) -> Option<OpaqueType> {
    match base {
        "void" => Some(OpaqueType::Unit),
        "bool" => Some(OpaqueType::Bool),
        "int" => Some(OpaqueType::Int),
        "float" => Some(OpaqueType::Float),
        "string" => Some(OpaqueType::Str),
        _ => None,
    }
}

fn resolve_spec(
    spec: &str,
    environment: EnvironmentId,
    interfaces: &FxHashSet<Arc<str>>,
) -> Result<TypeDesc, BridgeError> {
    let parsed = manifest::parse_type_name(spec).ok_or_else(|| BridgeError::InvalidTypeName {
        spec: spec.to_string(),
    })?;
    let mut ty = match primitive_base(&parsed.base) {
        Some(primitive) => TypeDesc::Opaque(primitive),
        None => match interfaces.get(parsed.base.as_str()) {
            Some(name) => TypeDesc::Interface(InterfaceRef::new(environment, name.clone())),
            None => TypeDesc::Opaque(OpaqueType::Class(Arc::from(parsed.base.as_str()))),
        },
    };
    for _ in 0..parsed.dims {
        ty = TypeDesc::Array(Box::new(ty));
    }
    Ok(ty)
}
