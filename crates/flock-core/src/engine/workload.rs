use std::collections::BTreeMap;

use flock_model::{ImageRef, ModelError, Partition, PartitionPlan, PartitionStats, UnitName};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::{
    Engine, PartitionOutcome, PartitionReport, PartitionRequest, ProvisionFailure, name_list,
};
use crate::{error::CoreError, runtime::make_run_id};

/// Where a single partition task ended up.
enum Step {
    Provisioned(UnitName, PartitionOutcome),
    NotProvisioned(ProvisionFailure),
}

impl Engine {
    /// Split a dataset, provision one unit per partition and collect per-unit statistics.
    ///
    /// Invalid partitioning is rejected before any unit is provisioned. Past that
    /// point the run is best-effort: a partition that fails to provision or compute
    /// is reported and the others proceed. Returns once every partition task has
    /// finished.
    #[instrument(level = "debug", skip(self, req), fields(size = req.dataset_size, count = req.partition_count))]
    pub async fn run_partitioned(&self, req: PartitionRequest) -> Result<PartitionReport, CoreError> {
        self.track("run_partitioned", self.dispatch(req), |res| match res {
            Ok(report) => format!(
                "Partitioned run {} started in units: {}; {} of {} partitions completed",
                report.run_id,
                name_list(&report.units),
                report.completed(),
                report.partition_count
            ),
            Err(e) => format!("Partitioned run rejected: {e}"),
        })
        .await
    }

    async fn dispatch(&self, req: PartitionRequest) -> Result<PartitionReport, CoreError> {
        let cfg = self.ctx.config();
        if req.partition_count > cfg.max_partitions {
            return Err(CoreError::Validation(format!(
                "partition count {} exceeds the limit of {}",
                req.partition_count, cfg.max_partitions
            )));
        }
        let plan = PartitionPlan::new(req.dataset_size, req.partition_count, cfg.remainder)?;
        let image = match req.image {
            Some(image) => image,
            None => ImageRef::new(cfg.workload.image.clone())?,
        };

        let run_id = make_run_id(&cfg.workload.unit_prefix);
        let base = UnitName::new(run_id.clone())?;
        let assignments = plan
            .iter()
            .map(|p| Ok((*p, base.suffixed(p.index)?)))
            .collect::<Result<Vec<(Partition, UnitName)>, ModelError>>()?;

        info!(run_id = %run_id, image = %image, partitions = plan.len(), "dispatching partitions");

        let mut set = JoinSet::new();
        for (partition, name) in assignments.iter().cloned() {
            let engine = self.clone();
            let image = image.clone();
            let command = cfg.workload.render(&partition);
            set.spawn(async move {
                let step = engine.run_partition(partition, name, &image, &command).await;
                (partition.index, step)
            });
        }

        let mut pending: BTreeMap<usize, (Partition, UnitName)> = assignments
            .iter()
            .map(|(p, n)| (p.index, (*p, n.clone())))
            .collect();
        let mut results = BTreeMap::new();
        let mut provision_failures = Vec::new();

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, step)) => {
                    pending.remove(&index);
                    match step {
                        Step::Provisioned(name, outcome) => {
                            results.insert(name, outcome);
                        }
                        Step::NotProvisioned(failure) => provision_failures.push(failure),
                    }
                }
                Err(e) => warn!(run_id = %run_id, error = %e, "partition task aborted"),
            }
        }

        // Tasks that died without reporting back.
        for (partition, name) in pending.into_values() {
            let message = "partition task aborted".to_string();
            if self.registry.contains(name.as_str()) {
                results.insert(
                    name,
                    PartitionOutcome::Failed {
                        partition,
                        kind: "aborted".into(),
                        message,
                    },
                );
            } else {
                provision_failures.push(ProvisionFailure {
                    partition,
                    unit: name,
                    kind: "aborted".into(),
                    message,
                });
            }
        }
        provision_failures.sort_by_key(|f| f.partition.index);

        let units = assignments
            .into_iter()
            .map(|(_, name)| name)
            .filter(|name| results.contains_key(name))
            .collect();

        let report = PartitionReport {
            run_id,
            dataset_size: plan.dataset_size(),
            partition_count: plan.len(),
            units,
            results,
            provision_failures,
        };
        info!(
            run_id = %report.run_id,
            completed = report.completed(),
            provisioned = report.units.len(),
            "partitioned run finished"
        );
        Ok(report)
    }

    async fn run_partition(
        &self,
        partition: Partition,
        name: UnitName,
        image: &ImageRef,
        command: &str,
    ) -> Step {
        let unit = match self.provision(image, &name).await {
            Ok(unit) => unit,
            Err(e) => {
                debug!(unit = %name, error = %e, "partition unit not provisioned");
                return Step::NotProvisioned(ProvisionFailure {
                    partition,
                    unit: name,
                    kind: e.kind().into(),
                    message: e.to_string(),
                });
            }
        };

        let outcome = match self.call("exec", self.runtime.exec(&unit, command)).await {
            Ok(out) if out.success() => {
                let output = out.normalized();
                let stats = output.parse::<PartitionStats>().ok();
                if stats.is_none() {
                    debug!(unit = %unit.name, output = %output, "unparsable statistics line");
                }
                PartitionOutcome::Completed {
                    partition,
                    output,
                    stats,
                }
            }
            Ok(out) => PartitionOutcome::Failed {
                partition,
                kind: "command_failed".into(),
                message: format!("exit code {}: {}", out.exit_code, out.normalized()),
            },
            Err(e) => PartitionOutcome::Failed {
                partition,
                kind: e.kind().into(),
                message: e.to_string(),
            },
        };
        Step::Provisioned(unit.name, outcome)
    }
}
