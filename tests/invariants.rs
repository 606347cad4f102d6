//! Property-style tests driving the node monitor through randomized
//! admit/complete sequences, asserting the invariants of spec.md §8:
//! `remainingTasks > 0` for every known job, absence of completed jobs from
//! the accounting map, and component-wise non-negative `inUse`.

mod support;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use node_monitor::config::{Config, PolicyKind};
use node_monitor::domain::ids::{AppId, RequestId, TaskId, UserId};
use node_monitor::domain::reservation::TaskLaunchSpec;
use node_monitor::domain::resources::ResourceVector;
use node_monitor::NodeMonitor;
use support::{wait_until, MockBackendClient, MockSchedulerClient};

/// Submits `job_count` independent single-task jobs (each on its own
/// scheduler address so a canned response can be preloaded per job),
/// completes them in a randomly shuffled order, and checks that the
/// accounting map always returns to empty with non-negative `inUse`.
#[tokio::test]
async fn random_admit_complete_sequences_preserve_invariants() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    for trial in 0..8 {
        let job_count = rng.random_range(1..=6);
        let capacity = ResourceVector::new(8192, 8);

        let monitor = NodeMonitor::new(Config {
            cpu_cores: Some(2),
            capacity_mem: capacity.mem_bytes,
            capacity_cpu: capacity.cpu_millis,
            policy: PolicyKind::Bounded,
            port: 0,
            get_task_port: 0,
            runnable_queue_capacity: 32,
            bind_address: "127.0.0.1".into(),
        })
        .unwrap();
        let _launchers = monitor.spawn_launchers(2);
        let backend = MockBackendClient::new();

        let mut request_ids = Vec::new();
        for job_index in 0..job_count {
            // Real request/task ids are scheduler-assigned opaque strings; a fresh
            // UUID per job keeps addresses from colliding across trials without
            // tying the test to the seeded rng used for resource amounts.
            let request_id = RequestId::new(uuid::Uuid::new_v4().to_string());
            let scheduler_address = format!("scheduler-{trial}-{job_index}:9000");
            let backend_address = format!("backend-{trial}-{job_index}");
            let task_id = TaskId::new(uuid::Uuid::new_v4().to_string());

            monitor.preload_scheduler_client(&scheduler_address, MockSchedulerClient::with_responses(vec![Ok(vec![TaskLaunchSpec { task_id, message: Vec::new() }])]));
            monitor.preload_backend_client(&backend_address, backend.clone());

            let mem = rng.random_range(1..=512);
            let cpu = rng.random_range(1..=1);
            monitor
                .enqueue_task_reservations(request_id.clone(), AppId::new("app"), UserId::new("u"), ResourceVector::new(mem, cpu), scheduler_address, backend_address, 1)
                .await
                .unwrap();
            request_ids.push(request_id);
        }

        wait_until(|| backend.launched().len() == job_count).await;

        let mut launched = backend.launched();
        launched.shuffle(&mut rng);
        for full_task_id in launched {
            monitor.tasks_finished(vec![full_task_id]).await;

            let (in_use, _) = monitor.get_resource_usage(&AppId::new("app"));
            assert!(in_use.mem_bytes <= capacity.mem_bytes, "inUse.mem_bytes went negative or over capacity mid-sequence");
            assert!(in_use.cpu_millis <= capacity.cpu_millis, "inUse.cpu_millis went negative or over capacity mid-sequence");
        }

        wait_until(|| monitor.jobs_empty()).await;
        for request_id in &request_ids {
            assert!(!monitor.job_is_known(request_id));
        }
        assert_eq!(monitor.get_resource_usage(&AppId::new("app")).0, ResourceVector::ZERO);
        assert_eq!(monitor.queue_depth(), 0);
    }
}

/// *Completion idempotence on unknown id* (spec.md §8 Laws): repeated
/// `tasksFinished` calls referencing a task id the node monitor never
/// launched are no-ops; they never panic and never drive accounting
/// negative.
#[tokio::test]
async fn tasks_finished_for_unknown_task_id_is_a_noop() {
    let monitor = NodeMonitor::new(Config {
        cpu_cores: Some(1),
        capacity_mem: 1024,
        capacity_cpu: 1,
        policy: PolicyKind::Fifo,
        port: 0,
        get_task_port: 0,
        runnable_queue_capacity: 4,
        bind_address: "127.0.0.1".into(),
    })
    .unwrap();

    let ghost = node_monitor::domain::reservation::FullTaskId {
        task_id: TaskId::new("ghost-task"),
        request_id: RequestId::new("ghost-request"),
        app_id: AppId::new("app"),
        originating_scheduler: "nowhere".into(),
    };

    monitor.tasks_finished(vec![ghost.clone()]).await;
    monitor.tasks_finished(vec![ghost]).await;

    assert!(monitor.jobs_empty());
    assert_eq!(monitor.get_resource_usage(&AppId::new("app")).0, ResourceVector::ZERO);
}
