//! Shared environment cache.
//!
//! Building an environment reads and resolves every manifest in its location
//! set; callers that repeatedly bridge into the same agent share one
//! environment instead of paying that cost per proxy. The cache key is the
//! *set* of locations — insertion order never matters.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::Environment;
use crate::error::BridgeError;

/// A concurrency-safe get-or-create cache of environments keyed by location set.
#[derive(Default)]
pub struct EnvironmentCache {
    environments: Mutex<FxHashMap<BTreeSet<PathBuf>, Arc<Environment>>>,
}

impl EnvironmentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached environment for `locations`, loading it on a miss.
    ///
    /// Loading happens inside the critical section: racing callers for the
    /// same set observe exactly one environment instance. A failed load
    /// leaves the cache unpopulated.
    pub fn get_or_create(
        &self,
        locations: &BTreeSet<PathBuf>,
    ) -> Result<Arc<Environment>, BridgeError> {
        let mut environments = self.environments.lock();
        if let Some(environment) = environments.get(locations) {
            return Ok(environment.clone());
        }
        let environment = Environment::load(locations.iter().cloned())?;
        environments.insert(locations.clone(), environment.clone());
        Ok(environment)
    }

    /// Return the cached environment for `locations` without creating one.
    pub fn get(&self, locations: &BTreeSet<PathBuf>) -> Option<Arc<Environment>> {
        self.environments.lock().get(locations).cloned()
    }

    /// Number of cached environments.
    pub fn len(&self) -> usize {
        self.environments.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.environments.lock().is_empty()
    }
}
