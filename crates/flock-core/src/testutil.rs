//! Scripted runtime double for engine tests.
use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use flock_model::{ExecOutput, ImageRef, Unit, UnitName, UnitStatus};
use parking_lot::Mutex;

use crate::{
    Engine, EngineConfig, EngineContext, MemoryActivityLog, RuntimeClient, RuntimeError,
    noop_metrics,
};

pub(crate) struct StubRuntime {
    pub images: Vec<String>,
    pub units: Mutex<BTreeMap<String, Unit>>,
    pub files: Mutex<BTreeMap<String, Vec<u8>>>,
    pub reply: Mutex<ExecOutput>,
    /// Unit names whose creation fails with `Unavailable`.
    pub broken: Mutex<Vec<String>>,
    pub delay: Option<Duration>,
}

impl StubRuntime {
    pub fn new(images: &[&str]) -> Self {
        Self {
            images: images.iter().map(|s| s.to_string()).collect(),
            units: Mutex::new(BTreeMap::new()),
            files: Mutex::new(BTreeMap::new()),
            reply: Mutex::new(ExecOutput::ok("sum:10 mean:2.5 max:4 min:1 std:1.118\n")),
            broken: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn status_of(&self, name: &str) -> Option<UnitStatus> {
        self.units.lock().get(name).map(|u| u.status)
    }

    async fn pause(&self) {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
    }

    fn find(&self, name: &str) -> Result<Unit, RuntimeError> {
        self.units
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnitNotFound(name.to_string()))
    }
}

#[async_trait]
impl RuntimeClient for StubRuntime {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn list_units(&self, all: bool) -> Result<Vec<Unit>, RuntimeError> {
        self.pause().await;
        Ok(self
            .units
            .lock()
            .values()
            .filter(|u| all || u.status.is_running())
            .cloned()
            .collect())
    }

    async fn list_images(&self) -> Result<Vec<String>, RuntimeError> {
        Ok(self.images.clone())
    }

    async fn create_unit(&self, image: &ImageRef, name: &UnitName) -> Result<Unit, RuntimeError> {
        self.pause().await;
        if !self.images.iter().any(|i| i == image.as_str()) {
            return Err(RuntimeError::ImageNotFound(image.to_string()));
        }
        if self.broken.lock().iter().any(|b| b == name.as_str()) {
            return Err(RuntimeError::Unavailable("connection reset".into()));
        }
        let mut units = self.units.lock();
        if units.contains_key(name.as_str()) {
            return Err(RuntimeError::UnitExists(name.to_string()));
        }
        let unit = Unit::new(name.clone(), image.clone(), UnitStatus::Running);
        units.insert(name.to_string(), unit.clone());
        Ok(unit)
    }

    async fn get_unit(&self, name: &UnitName) -> Result<Unit, RuntimeError> {
        self.find(name.as_str())
    }

    async fn stop_unit(&self, unit: &Unit) -> Result<(), RuntimeError> {
        let mut units = self.units.lock();
        let entry = units
            .get_mut(unit.name.as_str())
            .ok_or_else(|| RuntimeError::UnitNotFound(unit.name.to_string()))?;
        entry.status = UnitStatus::Stopped;
        Ok(())
    }

    async fn remove_unit(&self, unit: &Unit, _force: bool) -> Result<(), RuntimeError> {
        self.units
            .lock()
            .remove(unit.name.as_str())
            .map(|_| ())
            .ok_or_else(|| RuntimeError::UnitNotFound(unit.name.to_string()))
    }

    async fn exec(&self, unit: &Unit, _command: &str) -> Result<ExecOutput, RuntimeError> {
        self.pause().await;
        self.find(unit.name.as_str())?;
        Ok(self.reply.lock().clone())
    }

    async fn get_file(&self, unit: &Unit, path: &str) -> Result<Vec<u8>, RuntimeError> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound {
                unit: unit.name.to_string(),
                path: path.to_string(),
            })
    }
}

pub(crate) struct Harness {
    pub engine: Engine,
    pub runtime: Arc<StubRuntime>,
    pub activity: Arc<MemoryActivityLog>,
}

pub(crate) fn harness(runtime: StubRuntime) -> Harness {
    harness_with(runtime, EngineConfig::default())
}

pub(crate) fn harness_with(runtime: StubRuntime, config: EngineConfig) -> Harness {
    let runtime = Arc::new(runtime);
    let activity = Arc::new(MemoryActivityLog::new());
    let engine = Engine::new(runtime.clone(), activity.clone())
        .with_context(EngineContext::new(config, noop_metrics()));
    Harness {
        engine,
        runtime,
        activity,
    }
}

pub(crate) fn name(s: &str) -> UnitName {
    UnitName::new(s).unwrap()
}

pub(crate) fn image(s: &str) -> ImageRef {
    ImageRef::new(s).unwrap()
}
