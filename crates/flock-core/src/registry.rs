//! In-memory view of cluster membership.
//!
//! The registry caches the units the engine considers part of the cluster: running
//! units created through the engine or observed on the last listing. It is refreshed
//! from the runtime on every listing and is never persisted.
use std::collections::BTreeMap;

use flock_model::{Unit, UnitName};
use parking_lot::RwLock;
use tracing::trace;

#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: RwLock<BTreeMap<UnitName, Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached membership with the running subset of `observed`.
    pub fn refresh<I>(&self, observed: I)
    where
        I: IntoIterator<Item = Unit>,
    {
        let fresh: BTreeMap<_, _> = observed
            .into_iter()
            .filter(|u| u.status.is_running())
            .map(|u| (u.name.clone(), u))
            .collect();
        trace!(units = fresh.len(), "registry refreshed");
        *self.units.write() = fresh;
    }

    /// Track a unit. Units that are not running are ignored.
    pub fn add(&self, unit: Unit) {
        if !unit.status.is_running() {
            trace!(unit = %unit.name, status = %unit.status, "ignoring non-running unit");
            return;
        }
        self.units.write().insert(unit.name.clone(), unit);
    }

    /// Stop tracking a unit, returning its cached record.
    pub fn remove(&self, name: &str) -> Option<Unit> {
        self.units.write().remove(name)
    }

    /// Keep only the units matching `keep`.
    ///
    /// The surviving membership is built as a new map and swapped in.
    pub fn retain_where<F>(&self, mut keep: F)
    where
        F: FnMut(&Unit) -> bool,
    {
        let mut guard = self.units.write();
        let survivors: BTreeMap<_, _> = guard
            .values()
            .filter(|u| keep(u))
            .map(|u| (u.name.clone(), u.clone()))
            .collect();
        *guard = survivors;
    }

    pub fn get(&self, name: &str) -> Option<Unit> {
        self.units.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.read().contains_key(name)
    }

    /// Cached units ordered by name.
    pub fn snapshot(&self) -> Vec<Unit> {
        self.units.read().values().cloned().collect()
    }

    pub fn names(&self) -> Vec<UnitName> {
        self.units.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }
}
