use flock_model::{ImageRef, ListScope, Unit, UnitName, UnitStatus};
use tracing::{debug, info, instrument};

use super::{BatchAction, BatchReport, Engine, UnitFailure, name_list};
use crate::error::CoreError;

impl Engine {
    /// List units and refresh the registry from the runtime.
    ///
    /// [`ListScope::Active`] returns running units only; [`ListScope::All`] includes
    /// stopped ones. The registry always caches the running subset.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_units(&self, scope: ListScope) -> Result<Vec<Unit>, CoreError> {
        self.track(
            "list_units",
            async {
                let observed = self
                    .call("list_units", self.runtime.list_units(scope.include_stopped()))
                    .await?;
                self.registry.refresh(observed.iter().cloned());

                let units: Vec<Unit> = match scope {
                    ListScope::Active => observed
                        .into_iter()
                        .filter(|u| u.status.is_running())
                        .collect(),
                    ListScope::All => observed,
                };
                debug!(units = units.len(), "units listed");
                Ok(units)
            },
            |res| match res {
                Ok(units) if units.is_empty() => "No units in the cluster".to_string(),
                Ok(units) => format!("Listed units: {}", name_list(units)),
                Err(e) => format!("Listing units failed: {e}"),
            },
        )
        .await
    }

    /// Image identifiers known to the runtime.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_images(&self) -> Result<Vec<String>, CoreError> {
        self.track(
            "list_images",
            self.call("list_images", self.runtime.list_images()),
            |res| match res {
                Ok(images) if images.is_empty() => "No images available".to_string(),
                Ok(images) => format!("Listed images: {}", name_list(images)),
                Err(e) => format!("Listing images failed: {e}"),
            },
        )
        .await
    }

    /// Provision a running unit from `image` and track it.
    #[instrument(level = "debug", skip(self), fields(image = %image, unit = %name))]
    pub async fn create_unit(&self, image: ImageRef, name: UnitName) -> Result<Unit, CoreError> {
        self.track(
            "create_unit",
            self.provision(&image, &name),
            |res| match res {
                Ok(unit) => format!("Unit {} started from image {}", unit.name, unit.image),
                Err(e) => format!("Starting unit {name} failed: {e}"),
            },
        )
        .await
    }

    /// Stop a running unit and drop it from the active membership.
    ///
    /// Stopping a unit that is not running reports [`CoreError::UnitNotFound`].
    #[instrument(level = "debug", skip(self), fields(unit = %name))]
    pub async fn stop_unit(&self, name: &UnitName) -> Result<Unit, CoreError> {
        self.track(
            "stop_unit",
            self.stop_one(name),
            |res| match res {
                Ok(unit) => format!("Unit {} stopped", unit.name),
                Err(e) => format!("Stopping unit {name} failed: {e}"),
            },
        )
        .await
    }

    /// Force-remove a unit whatever its status.
    #[instrument(level = "debug", skip(self), fields(unit = %name))]
    pub async fn remove_unit(&self, name: &UnitName) -> Result<Unit, CoreError> {
        self.track(
            "remove_unit",
            self.remove_one(name),
            |res| match res {
                Ok(unit) => format!("Unit {} removed", unit.name),
                Err(e) => format!("Removing unit {name} failed: {e}"),
            },
        )
        .await
    }

    /// Stop every running unit, best-effort.
    ///
    /// Fails only when the running set cannot be listed.
    #[instrument(level = "debug", skip(self))]
    pub async fn stop_all(&self) -> Result<BatchReport, CoreError> {
        self.track(
            "stop_all",
            async {
                let running = self.call("list_units", self.runtime.list_units(false)).await?;
                self.registry.refresh(running.iter().cloned());

                let mut report = BatchReport {
                    action: BatchAction::Stop,
                    affected: Vec::new(),
                    failures: Vec::new(),
                };
                for unit in running.into_iter().filter(|u| u.status.is_running()) {
                    match self.call("stop_unit", self.runtime.stop_unit(&unit)).await {
                        Ok(()) => report.affected.push(unit.name),
                        Err(e) => {
                            debug!(unit = %unit.name, error = %e, "stop failed; continuing");
                            report.failures.push(UnitFailure::new(unit.name, &e));
                        }
                    }
                }
                self.registry
                    .retain_where(|u| !report.affected.contains(&u.name));

                info!(
                    stopped = report.affected.len(),
                    failed = report.failures.len(),
                    "stop_all finished"
                );
                Ok(report)
            },
            |res| batch_record("stopped", res),
        )
        .await
    }

    /// Force-remove every unit the runtime knows about, best-effort.
    ///
    /// An empty cluster yields an empty report.
    #[instrument(level = "debug", skip(self))]
    pub async fn remove_all(&self) -> Result<BatchReport, CoreError> {
        self.track(
            "remove_all",
            async {
                let units = self.call("list_units", self.runtime.list_units(true)).await?;

                let mut report = BatchReport {
                    action: BatchAction::Remove,
                    affected: Vec::new(),
                    failures: Vec::new(),
                };
                for unit in units {
                    match self
                        .call("remove_unit", self.runtime.remove_unit(&unit, true))
                        .await
                    {
                        Ok(()) => report.affected.push(unit.name),
                        Err(e) => {
                            debug!(unit = %unit.name, error = %e, "remove failed; continuing");
                            report.failures.push(UnitFailure::new(unit.name, &e));
                        }
                    }
                }
                self.registry
                    .retain_where(|u| !report.affected.contains(&u.name));

                info!(
                    removed = report.affected.len(),
                    failed = report.failures.len(),
                    "remove_all finished"
                );
                Ok(report)
            },
            |res| batch_record("removed", res),
        )
        .await
    }

    /// Create and register one unit. Shared with the workload runners.
    pub(super) async fn provision(
        &self,
        image: &ImageRef,
        name: &UnitName,
    ) -> Result<Unit, CoreError> {
        if self.registry.contains(name.as_str()) {
            return Err(CoreError::UnitExists(name.to_string()));
        }
        let unit = self
            .call("create_unit", self.runtime.create_unit(image, name))
            .await?;
        self.registry.add(unit.clone());
        debug!(unit = %unit.name, "unit provisioned");
        Ok(unit)
    }

    /// Look up a unit that must be running; stale registry entries are dropped.
    pub(super) async fn running_unit(&self, name: &UnitName) -> Result<Unit, CoreError> {
        let unit = match self.call("get_unit", self.runtime.get_unit(name)).await {
            Ok(unit) => unit,
            Err(e @ CoreError::UnitNotFound(_)) => {
                self.registry.remove(name.as_str());
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        if !unit.status.is_running() {
            self.registry.remove(name.as_str());
            return Err(CoreError::UnitNotFound(name.to_string()));
        }
        Ok(unit)
    }

    async fn stop_one(&self, name: &UnitName) -> Result<Unit, CoreError> {
        let unit = self.running_unit(name).await?;
        self.call("stop_unit", self.runtime.stop_unit(&unit)).await?;
        self.registry.remove(name.as_str());
        Ok(unit.with_status(UnitStatus::Stopped))
    }

    async fn remove_one(&self, name: &UnitName) -> Result<Unit, CoreError> {
        let unit = match self.call("get_unit", self.runtime.get_unit(name)).await {
            Ok(unit) => unit,
            Err(e) => {
                if matches!(e, CoreError::UnitNotFound(_)) {
                    self.registry.remove(name.as_str());
                }
                return Err(e);
            }
        };
        self.call("remove_unit", self.runtime.remove_unit(&unit, true))
            .await?;
        self.registry.remove(name.as_str());
        Ok(unit.with_status(UnitStatus::Removed))
    }
}

fn batch_record(verb: &str, res: &Result<BatchReport, CoreError>) -> String {
    match res {
        Ok(report) if report.is_empty() => format!("No units {verb}: cluster is empty"),
        Ok(report) if report.failures.is_empty() => {
            format!("All units {verb}: {}", name_list(&report.affected))
        }
        Ok(report) => {
            let failed: Vec<_> = report.failures.iter().map(|f| &f.unit).collect();
            format!(
                "Units {verb}: {}; failed: {}",
                name_list(&report.affected),
                name_list(&failed)
            )
        }
        Err(e) => format!("Batch operation failed: {e}"),
    }
}
