use std::sync::Arc;

use flock_core::{
    BatchAction, CoreError, Engine, EngineConfig, EngineContext, MemoryActivityLog,
    PartitionOutcome, PartitionRequest, noop_metrics,
};
use flock_model::{ListScope, PartitionStats};

use super::*;

fn name(s: &str) -> UnitName {
    UnitName::new(s).unwrap()
}

fn image(s: &str) -> ImageRef {
    ImageRef::new(s).unwrap()
}

fn engine(runtime: Arc<MemoryRuntime>) -> (Engine, Arc<MemoryActivityLog>) {
    let mut config = EngineConfig::default();
    config.workload.command = STATS_COMMAND.into();
    let activity = Arc::new(MemoryActivityLog::new());
    let engine = Engine::new(runtime, activity.clone())
        .with_context(EngineContext::new(config, noop_metrics()));
    (engine, activity)
}

fn runtime() -> Arc<MemoryRuntime> {
    Arc::new(
        MemoryRuntime::new()
            .with_images(["alpine", "python:3.8", "tensorflow:my"])
            .with_handler(stats_handler()),
    )
}

#[tokio::test]
async fn unit_lifecycle_round() {
    let rt = runtime();
    let (engine, _) = engine(rt.clone());

    engine.create_unit(image("alpine"), name("web")).await.unwrap();
    let active = engine.list_units(ListScope::Active).await.unwrap();
    assert!(active.iter().any(|u| u.name.as_str() == "web" && u.status.is_running()));

    engine.stop_unit(&name("web")).await.unwrap();
    assert!(engine.list_units(ListScope::Active).await.unwrap().is_empty());
    let all = engine.list_units(ListScope::All).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, UnitStatus::Stopped);

    engine.remove_unit(&name("web")).await.unwrap();
    assert!(engine.list_units(ListScope::All).await.unwrap().is_empty());
    assert!(rt.units().is_empty());
}

#[tokio::test]
async fn partitioned_statistics_match_direct_computation() {
    let (engine, _) = engine(runtime());
    let report = engine
        .run_partitioned(PartitionRequest {
            dataset_size: 100_000,
            partition_count: 4,
            image: None,
        })
        .await
        .unwrap();

    assert_eq!(report.completed(), 4);
    let mut covered = 0;
    let mut total = 0.0;
    for unit in &report.units {
        let PartitionOutcome::Completed {
            partition, stats, ..
        } = &report.results[unit]
        else {
            panic!("partition on {unit} did not complete");
        };
        assert_eq!(partition.offset, covered);
        assert_eq!(partition.len, 25_000);
        covered = partition.end();
        total += stats.unwrap().sum;
    }
    assert_eq!(covered, 100_000);

    let all: Vec<f64> = (0..100_000).map(dataset_value).collect();
    let expected = PartitionStats::from_values(&all).unwrap();
    assert_eq!(total, expected.sum);
}

#[tokio::test]
async fn one_failed_provision_does_not_abort_the_run() {
    let rt = runtime();
    let (engine, _) = engine(rt.clone());

    // partition units are named `<run id>-<index>`
    rt.fail_create("-1");

    let report = engine
        .run_partitioned(PartitionRequest {
            dataset_size: 30,
            partition_count: 3,
            image: None,
        })
        .await
        .unwrap();

    assert_eq!(report.units.len(), 2);
    assert_eq!(report.completed(), 2);
    assert_eq!(report.provision_failures.len(), 1);
    assert_eq!(report.provision_failures[0].partition.index, 1);
    assert_eq!(report.provision_failures[0].kind, "runtime_unavailable");
    assert_eq!(engine.registry().len(), 2);
}

#[tokio::test]
async fn batch_operations_are_best_effort() {
    let rt = runtime();
    let (engine, _) = engine(rt.clone());
    for n in ["a", "b", "c"] {
        engine.create_unit(image("alpine"), name(n)).await.unwrap();
    }
    rt.fail_stop("b");
    rt.fail_remove("b");

    let stopped = engine.stop_all().await.unwrap();
    assert_eq!(stopped.action, BatchAction::Stop);
    assert_eq!(stopped.affected, vec![name("a"), name("c")]);
    assert_eq!(stopped.failures.len(), 1);
    assert_eq!(stopped.failures[0].unit, name("b"));
    assert_eq!(stopped.failures[0].kind, "runtime_unavailable");
    assert_eq!(rt.status_of("a"), Some(UnitStatus::Stopped));
    assert_eq!(rt.status_of("b"), Some(UnitStatus::Running));
    assert_eq!(engine.registry().names(), vec![name("b")]);

    let removed = engine.remove_all().await.unwrap();
    assert_eq!(removed.action, BatchAction::Remove);
    assert_eq!(removed.affected, vec![name("a"), name("c")]);
    assert_eq!(removed.failures.len(), 1);
    assert_eq!(removed.failures[0].unit, name("b"));
    assert!(engine.registry().contains("b"));
    assert_eq!(rt.units().len(), 1);
}

#[tokio::test]
async fn batch_operations_on_healthy_cluster() {
    let rt = runtime();
    let (engine, _) = engine(rt.clone());
    for n in ["a", "b"] {
        engine.create_unit(image("alpine"), name(n)).await.unwrap();
    }

    let stopped = engine.stop_all().await.unwrap();
    assert_eq!(stopped.affected.len(), 2);
    assert!(stopped.failures.is_empty());

    let removed = engine.remove_all().await.unwrap();
    assert_eq!(removed.affected.len(), 2);
    assert!(removed.failures.is_empty());

    let again = engine.remove_all().await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn leftover_units_of_an_earlier_agent_do_not_block_a_run() {
    let rt = runtime();
    let alpine = image("alpine");
    for seq in 1..=40u64 {
        for index in 0..4 {
            for leftover in [
                format!("partition-{seq:x}-{index}"),
                format!("partition-18f0a1b2c3d41f2-{seq:x}-{index}"),
            ] {
                rt.create_unit(&alpine, &name(&leftover)).await.unwrap();
            }
        }
    }
    let leftovers = rt.units().len();

    let (engine, _) = engine(rt.clone());
    let report = engine
        .run_partitioned(PartitionRequest {
            dataset_size: 100,
            partition_count: 4,
            image: None,
        })
        .await
        .unwrap();

    assert!(report.provision_failures.is_empty(), "{:?}", report.provision_failures);
    assert_eq!(report.units.len(), 4);
    assert_eq!(report.completed(), 4);
    assert_eq!(rt.units().len(), leftovers + 4);
}

#[tokio::test]
async fn exec_on_missing_unit_keeps_registry() {
    let (engine, _) = engine(runtime());
    engine.create_unit(image("alpine"), name("web")).await.unwrap();

    let err = engine.execute(&name("ghost"), "ls").await.unwrap_err();
    assert!(matches!(err, CoreError::UnitNotFound(_)));
    assert_eq!(engine.registry().names(), vec![name("web")]);

    let report = engine.execute(&name("web"), "echo hi").await.unwrap();
    assert_eq!(report.output, "echo hi");
}

#[tokio::test]
async fn offline_runtime_surfaces_as_unavailable() {
    let rt = runtime();
    let (engine, activity) = engine(rt.clone());
    rt.set_unavailable(true);

    let err = engine.list_units(ListScope::Active).await.unwrap_err();
    assert_eq!(err.kind(), "runtime_unavailable");
    assert!(activity.entries()[0].contains("Listing units failed"));

    rt.set_unavailable(false);
    assert!(engine.list_units(ListScope::Active).await.unwrap().is_empty());
}

#[tokio::test]
async fn artifact_task_copies_file_out() {
    let dir = tempfile::tempdir().unwrap();
    let rt = Arc::new(
        MemoryRuntime::new()
            .with_images(["tensorflow:my"])
            .with_file("/app/fig.png", b"\x89PNG".to_vec()),
    );
    let (engine, _) = engine(rt);

    let dest = dir.path().join("fig.png");
    let report = engine
        .run_artifact_task(flock_core::ArtifactRequest {
            destination: Some(dest.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(report.output, "python /app/lreg.py");
    assert_eq!(std::fs::read(&dest).unwrap(), b"\x89PNG");
}

#[tokio::test]
async fn non_forced_remove_of_running_unit_is_refused() {
    let rt = runtime();
    let unit = rt.create_unit(&image("alpine"), &name("web")).await.unwrap();
    assert!(rt.remove_unit(&unit, false).await.is_err());
    rt.remove_unit(&unit, true).await.unwrap();
    assert_eq!(rt.status_of("web"), None);
}

#[test]
fn stats_handler_rejects_bad_arguments() {
    let handler = stats_handler();
    let unit = Unit::new(name("u"), image("alpine"), UnitStatus::Running);
    assert_eq!(handler(&unit, "stats x").exit_code, 2);
    assert!(handler(&unit, "stats 0 4").text().starts_with("sum:"));
}
