//! End-to-end scenario tests, one per literal scenario named in spec.md §8.

mod support;

use std::sync::Arc;

use node_monitor::config::{Config, PolicyKind};
use node_monitor::domain::ids::{AppId, RequestId, TaskId, UserId};
use node_monitor::domain::reservation::{FullTaskId, TaskLaunchSpec};
use node_monitor::domain::resources::ResourceVector;
use node_monitor::error::Error;
use node_monitor::NodeMonitor;
use support::{wait_until, MockBackendClient, MockSchedulerClient};

fn config(policy: PolicyKind, capacity_mem: u64, capacity_cpu: u64) -> Config {
    Config {
        cpu_cores: Some(2),
        capacity_mem,
        capacity_cpu,
        policy,
        port: 0,
        get_task_port: 0,
        runnable_queue_capacity: 16,
        bind_address: "127.0.0.1".into(),
    }
}

async fn monitor_with_launchers(cfg: Config, launcher_count: usize) -> Arc<NodeMonitor> {
    let monitor = NodeMonitor::new(cfg).unwrap();
    // Dropping the handle does not stop the worker threads; they keep
    // draining the runnable queue for the life of the test process.
    let _launchers = monitor.spawn_launchers(launcher_count);
    monitor
}

/// Scenario 1: single reservation, task returned, normal completion.
#[tokio::test]
async fn single_reservation_task_returned() {
    let monitor = monitor_with_launchers(config(PolicyKind::Fifo, 4096, 4), 1).await;

    monitor.preload_scheduler_client("S1:9001", MockSchedulerClient::with_responses(vec![Ok(vec![TaskLaunchSpec { task_id: TaskId::new("t1"), message: b"payload".to_vec() }])]));
    let backend = MockBackendClient::new();
    monitor.preload_backend_client("B1", backend.clone());

    monitor
        .enqueue_task_reservations(RequestId::new("r1"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(1024, 1), "S1:9001".into(), "B1".into(), 1)
        .await
        .unwrap();

    wait_until(|| !backend.launched().is_empty()).await;
    let launched = backend.launched();
    assert_eq!(launched.len(), 1);
    assert_eq!(launched[0].task_id, TaskId::new("t1"));
    assert_eq!(launched[0].request_id, RequestId::new("r1"));
    assert_eq!(launched[0].originating_scheduler, "S1:9001");

    monitor.tasks_finished(vec![launched[0].clone()]).await;
    wait_until(|| !monitor.job_is_known(&RequestId::new("r1"))).await;

    assert_eq!(monitor.get_resource_usage(&AppId::new("app")).0, ResourceVector::ZERO);
}

/// Scenario 2: no task returned; completion pathway runs with empty ids,
/// no `launchTask` call ever happens.
#[tokio::test]
async fn no_task_returned() {
    let monitor = monitor_with_launchers(config(PolicyKind::Fifo, 4096, 4), 1).await;

    monitor.preload_scheduler_client("S1:9001", MockSchedulerClient::with_responses(vec![Ok(Vec::new())]));
    let backend = MockBackendClient::new();
    monitor.preload_backend_client("B1", backend.clone());

    monitor
        .enqueue_task_reservations(RequestId::new("r1"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(1024, 1), "S1:9001".into(), "B1".into(), 1)
        .await
        .unwrap();

    wait_until(|| !monitor.job_is_known(&RequestId::new("r1"))).await;
    assert!(backend.launched().is_empty());
}

/// Scenario 3: slot reuse under the bounded policy. Capacity admits exactly
/// one reservation at a time; the second is released only once the first
/// completes, stamped with the first's ids.
#[tokio::test]
async fn slot_reuse_under_bounded_policy() {
    let monitor = monitor_with_launchers(config(PolicyKind::Bounded, 4096, 2), 1).await;

    monitor.preload_scheduler_client("S2:9002", MockSchedulerClient::with_responses(vec![Ok(vec![TaskLaunchSpec { task_id: TaskId::new("t1"), message: Vec::new() }])]));
    let backend = MockBackendClient::new();
    monitor.preload_backend_client("B2", backend.clone());

    monitor
        .enqueue_task_reservations(RequestId::new("r2"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(4096, 2), "S2:9002".into(), "B2".into(), 2)
        .await
        .unwrap();

    assert_eq!(monitor.queue_depth(), 1);

    wait_until(|| !backend.launched().is_empty()).await;
    let first_launch = backend.launched()[0].clone();
    assert_eq!(first_launch.task_id, TaskId::new("t1"));

    // The retained second reservation's puller is spawned only after
    // completion releases it, so its getTask response must be preloaded
    // before completion fires.
    monitor.preload_scheduler_client("S2:9002", MockSchedulerClient::with_responses(vec![Ok(vec![TaskLaunchSpec { task_id: TaskId::new("t2"), message: Vec::new() }])]));

    monitor.tasks_finished(vec![first_launch]).await;

    wait_until(|| backend.launched().len() == 2).await;
    let second_launch = backend.launched()[1].clone();
    assert_eq!(second_launch.task_id, TaskId::new("t2"));

    wait_until(|| !monitor.job_is_known(&RequestId::new("r2"))).await;
    assert_eq!(monitor.queue_depth(), 0);
}

/// Scenario 4: the RPC to the scheduler fails outright; the pooled client
/// is dropped and a subsequent reservation reconnects from scratch.
#[tokio::test]
async fn scheduler_failure_during_get_task() {
    let monitor = monitor_with_launchers(config(PolicyKind::Fifo, 4096, 4), 1).await;

    let transport_error = Error::Transport { address: "S1:9001".into(), source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "simulated failure") };
    monitor.preload_scheduler_client("S1:9001", MockSchedulerClient::with_responses(vec![Err(transport_error)]));
    let backend = MockBackendClient::new();
    monitor.preload_backend_client("B1", backend.clone());

    monitor
        .enqueue_task_reservations(RequestId::new("r1"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(1024, 1), "S1:9001".into(), "B1".into(), 1)
        .await
        .unwrap();

    wait_until(|| !monitor.job_is_known(&RequestId::new("r1"))).await;
    assert!(backend.launched().is_empty());

    // A fresh reservation against S1 must not reuse the dropped client; a
    // production `SchedulerPool` would reconnect, which (absent a preload)
    // this double cannot satisfy, but intake itself must still succeed.
    monitor
        .enqueue_task_reservations(RequestId::new("r1b"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(1024, 1), "S1:9001".into(), "B1".into(), 1)
        .await
        .unwrap();
    // The fresh client attempt also fails ("S1:9001" is not a dialable address in
    // this test), resolving the same way the first one did.
    wait_until(|| !monitor.job_is_known(&RequestId::new("r1b"))).await;
}

/// Scenario 5: concurrent submits from two schedulers never over-subscribe
/// node capacity.
#[tokio::test]
async fn concurrent_submits_never_oversubscribe_capacity() {
    let monitor = monitor_with_launchers(config(PolicyKind::Bounded, 4096, 2), 2).await;

    monitor.preload_scheduler_client("S1:9001", MockSchedulerClient::with_responses(vec![Ok(vec![TaskLaunchSpec { task_id: TaskId::new("t3"), message: Vec::new() }])]));
    monitor.preload_scheduler_client("S2:9002", MockSchedulerClient::with_responses(vec![Ok(vec![TaskLaunchSpec { task_id: TaskId::new("t4"), message: Vec::new() }])]));
    let backend = MockBackendClient::new();
    monitor.preload_backend_client("B1", backend.clone());

    let first = monitor.enqueue_task_reservations(RequestId::new("r3"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(2048, 1), "S1:9001".into(), "B1".into(), 1);
    let second = monitor.enqueue_task_reservations(RequestId::new("r4"), AppId::new("app"), UserId::new("u1"), ResourceVector::new(2048, 1), "S2:9002".into(), "B1".into(), 1);
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    wait_until(|| backend.launched().len() == 2).await;

    let in_use = monitor.get_resource_usage(&AppId::new("app")).0;
    assert!(in_use.fits_within(ResourceVector::new(4096, 2)));
}
