//! In-process runtime simulation.
//!
//! [`MemoryRuntime`] keeps units, images and files in memory and answers command
//! executions through a pluggable handler. It backs the agent's `memory` runtime
//! mode and the engine test suites.
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use async_trait::async_trait;
use flock_core::{RuntimeClient, RuntimeError};
use flock_model::{ExecOutput, ImageRef, PartitionStats, Unit, UnitName, UnitStatus};
use parking_lot::Mutex;
use tracing::trace;

use crate::RUNTIME_MEMORY;

/// Computes the result of a command run inside a unit.
pub type ExecHandler = Arc<dyn Fn(&Unit, &str) -> ExecOutput + Send + Sync>;

/// Workload command template understood by [`stats_handler`].
pub const STATS_COMMAND: &str = "stats {offset} {len}";

/// Deterministic dataset element at `index`, in `[1, 99]`.
pub fn dataset_value(index: u64) -> f64 {
    (index.wrapping_mul(2_654_435_761) % 99 + 1) as f64
}

/// Handler answering `stats <offset> <len>` with the statistics of
/// [`dataset_value`] over `[offset, offset + len)`. Other commands are echoed.
pub fn stats_handler() -> ExecHandler {
    Arc::new(|_: &Unit, command: &str| {
        let mut parts = command.split_whitespace();
        if parts.next() != Some("stats") {
            return ExecOutput::ok(format!("{command}\n"));
        }
        let bounds = (
            parts.next().and_then(|v| v.parse::<u64>().ok()),
            parts.next().and_then(|v| v.parse::<u64>().ok()),
        );
        let (Some(offset), Some(len)) = bounds else {
            return ExecOutput::new(2, "usage: stats <offset> <len>\n");
        };
        let values: Vec<f64> = (offset..offset + len).map(dataset_value).collect();
        match PartitionStats::from_values(&values) {
            Some(stats) => ExecOutput::ok(format!("{stats}\n")),
            None => ExecOutput::new(1, "empty partition\n"),
        }
    })
}

#[derive(Default)]
struct State {
    images: BTreeSet<String>,
    units: BTreeMap<UnitName, Unit>,
    /// Files present in every unit, keyed by absolute path.
    files: BTreeMap<String, Vec<u8>>,
    /// Name suffixes whose creation fails as if the runtime dropped the request.
    broken: BTreeSet<String>,
    /// Units whose stop request is refused.
    stuck_on_stop: BTreeSet<String>,
    /// Units whose removal is refused.
    stuck_on_remove: BTreeSet<String>,
    unavailable: bool,
    next_id: u64,
}

/// Simulated container runtime.
pub struct MemoryRuntime {
    state: Mutex<State>,
    handler: ExecHandler,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryRuntime")
            .field("images", &state.images)
            .field("units", &state.units.len())
            .field("unavailable", &state.unavailable)
            .finish()
    }
}

impl MemoryRuntime {
    /// Empty runtime whose commands echo themselves back.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            handler: Arc::new(|_: &Unit, command: &str| ExecOutput::ok(format!("{command}\n"))),
        }
    }

    pub fn with_images<I, S>(self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .images
            .extend(images.into_iter().map(Into::into));
        self
    }

    pub fn with_exec_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&Unit, &str) -> ExecOutput + Send + Sync + 'static,
    {
        self.with_handler(Arc::new(handler))
    }

    pub fn with_handler(mut self, handler: ExecHandler) -> Self {
        self.handler = handler;
        self
    }

    /// Make `path` readable from every unit.
    pub fn with_file(self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.state.lock().files.insert(path.into(), bytes.into());
        self
    }

    /// Make the creation of any unit whose name ends with `suffix` fail with
    /// [`RuntimeError::Unavailable`].
    pub fn fail_create(&self, suffix: impl Into<String>) {
        self.state.lock().broken.insert(suffix.into());
    }

    /// Make every stop request for the unit `name` fail with
    /// [`RuntimeError::Unavailable`].
    pub fn fail_stop(&self, name: impl Into<String>) {
        self.state.lock().stuck_on_stop.insert(name.into());
    }

    /// Make every removal of the unit `name` fail with [`RuntimeError::Unavailable`].
    pub fn fail_remove(&self, name: impl Into<String>) {
        self.state.lock().stuck_on_remove.insert(name.into());
    }

    /// Simulate a lost connection: every call fails until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// All units the runtime holds, ordered by name.
    pub fn units(&self) -> Vec<Unit> {
        self.state.lock().units.values().cloned().collect()
    }

    pub fn status_of(&self, name: &str) -> Option<UnitStatus> {
        self.state.lock().units.get(name).map(|u| u.status)
    }

    fn guard(&self) -> Result<parking_lot::MutexGuard<'_, State>, RuntimeError> {
        let state = self.state.lock();
        if state.unavailable {
            return Err(RuntimeError::Unavailable("memory runtime is offline".into()));
        }
        Ok(state)
    }
}

fn lookup<'a>(state: &'a mut State, name: &UnitName) -> Result<&'a mut Unit, RuntimeError> {
    state
        .units
        .get_mut(name.as_str())
        .ok_or_else(|| RuntimeError::UnitNotFound(name.to_string()))
}

#[async_trait]
impl RuntimeClient for MemoryRuntime {
    fn name(&self) -> &'static str {
        RUNTIME_MEMORY
    }

    async fn list_units(&self, all: bool) -> Result<Vec<Unit>, RuntimeError> {
        let state = self.guard()?;
        Ok(state
            .units
            .values()
            .filter(|u| all || u.status.is_running())
            .cloned()
            .collect())
    }

    async fn list_images(&self) -> Result<Vec<String>, RuntimeError> {
        Ok(self.guard()?.images.iter().cloned().collect())
    }

    async fn create_unit(&self, image: &ImageRef, name: &UnitName) -> Result<Unit, RuntimeError> {
        let mut state = self.guard()?;
        if !state.images.contains(image.as_str()) {
            return Err(RuntimeError::ImageNotFound(image.to_string()));
        }
        if state.broken.iter().any(|s| name.as_str().ends_with(s.as_str())) {
            return Err(RuntimeError::Unavailable(format!(
                "lost connection while creating {name}"
            )));
        }
        if state.units.contains_key(name.as_str()) {
            return Err(RuntimeError::UnitExists(name.to_string()));
        }

        state.next_id += 1;
        let unit = Unit::new(name.clone(), image.clone(), UnitStatus::Running)
            .with_id(format!("{:012x}", state.next_id));
        state.units.insert(name.clone(), unit.clone());
        trace!(unit = %name, image = %image, "memory unit created");
        Ok(unit)
    }

    async fn get_unit(&self, name: &UnitName) -> Result<Unit, RuntimeError> {
        let mut state = self.guard()?;
        lookup(&mut state, name).map(|u| u.clone())
    }

    async fn stop_unit(&self, unit: &Unit) -> Result<(), RuntimeError> {
        let mut state = self.guard()?;
        if state.stuck_on_stop.contains(unit.name.as_str()) {
            return Err(RuntimeError::Unavailable(format!(
                "timed out stopping {}",
                unit.name
            )));
        }
        lookup(&mut state, &unit.name)?.status = UnitStatus::Stopped;
        Ok(())
    }

    async fn remove_unit(&self, unit: &Unit, force: bool) -> Result<(), RuntimeError> {
        let mut state = self.guard()?;
        if state.stuck_on_remove.contains(unit.name.as_str()) {
            return Err(RuntimeError::Unavailable(format!(
                "device busy while removing {}",
                unit.name
            )));
        }
        let current = lookup(&mut state, &unit.name)?;
        if current.status.is_running() && !force {
            return Err(RuntimeError::Unavailable(format!(
                "unit {} is running; stop it or force removal",
                unit.name
            )));
        }
        state.units.remove(unit.name.as_str());
        Ok(())
    }

    async fn exec(&self, unit: &Unit, command: &str) -> Result<ExecOutput, RuntimeError> {
        let current = {
            let mut state = self.guard()?;
            lookup(&mut state, &unit.name)?.clone()
        };
        if !current.status.is_running() {
            return Err(RuntimeError::UnitNotFound(unit.name.to_string()));
        }
        Ok((self.handler)(&current, command))
    }

    async fn get_file(&self, unit: &Unit, path: &str) -> Result<Vec<u8>, RuntimeError> {
        let mut state = self.guard()?;
        lookup(&mut state, &unit.name)?;
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound {
                unit: unit.name.to_string(),
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests;
