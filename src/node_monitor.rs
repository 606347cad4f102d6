//! The composition root: wires `intake`, `policy`, `puller`, `launcher` and
//! the connection pools together behind one process (spec §2).
//!
//! No single reference file maps onto this module — the reference repo
//! wires its components together informally inside `main.rs`. This module
//! exists so that shape has a name and a home.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use slotmap::SlotMap;

use crate::config::{Config, PolicyKind};
use crate::domain::ids::{AppId, RequestId, TaskId, UserId};
use crate::domain::job::JobTable;
use crate::domain::reservation::{FullTaskId, Reservation, ReservationId};
use crate::domain::resources::{NodeResources, ResourceVector};
use crate::error::Result;
use crate::intake;
use crate::launcher::LauncherPool;
use crate::policy::bounded::BoundedPolicy;
use crate::policy::fifo::FifoPolicy;
use crate::policy::AdmissionPolicy;
use crate::pool::backend_pool::BackendClient;
use crate::pool::{BackendPool, SchedulerPool};
use crate::puller;
use crate::rpc;
use crate::rpc::scheduler_client::SchedulerClient;
use crate::runnable::RunnableQueue;

/// Everything mutated under the node monitor's single logical mutex (spec
/// §5 "a single logical mutex", §9 "Global mutable accounting"): the
/// admission policy's internal state, the job accounting table, node
/// resource usage, and the id allocator for freshly-submitted reservations.
///
/// Deliberately a plain [`std::sync::Mutex`], never held across an
/// `.await`: every lock/mutate/unlock sequence that touches it is
/// synchronous, so it is safe to take from both the async puller/intake
/// path and the launcher pool's blocking worker threads.
pub struct PolicyState {
    pub policy: Box<dyn AdmissionPolicy>,
    pub jobs: JobTable,
    pub resources: NodeResources,
    reservation_ids: SlotMap<ReservationId, ()>,
}

impl PolicyState {
    pub(crate) fn next_reservation_id(&mut self) -> ReservationId {
        self.reservation_ids.insert(())
    }
}

pub struct NodeMonitor {
    pub(crate) state: Mutex<PolicyState>,
    pub(crate) runnable: RunnableQueue,
    pub(crate) scheduler_pool: SchedulerPool,
    pub(crate) backend_pool: BackendPool,
    /// Resources debited at runnable-queue dequeue time, keyed by the
    /// scheduler-assigned `taskId`, so `tasksFinished` can credit the exact
    /// amount back without the wire-level `FullTaskId` needing to carry it
    /// (spec §5, §6).
    pub(crate) in_flight: DashMap<TaskId, ResourceVector>,
    pub(crate) self_address: String,
    pub(crate) config: Config,
}

impl NodeMonitor {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        config.validate()?;

        let capacity = ResourceVector::new(config.capacity_mem, config.capacity_cpu);
        let policy: Box<dyn AdmissionPolicy> = match config.policy {
            PolicyKind::Fifo => Box::new(FifoPolicy::new()),
            PolicyKind::Bounded => Box::new(BoundedPolicy::new(capacity)),
        };

        let state = PolicyState {
            policy,
            jobs: JobTable::new(),
            resources: NodeResources::new(capacity),
            reservation_ids: SlotMap::with_key(),
        };

        let self_address = format!("{}:{}", config.bind_address, config.port);

        Ok(Arc::new(NodeMonitor {
            state: Mutex::new(state),
            runnable: RunnableQueue::new(config.runnable_queue_capacity),
            scheduler_pool: SchedulerPool::new(),
            backend_pool: BackendPool::new(config.launcher_count()),
            in_flight: DashMap::new(),
            self_address,
            config,
        }))
    }

    /// Locks the policy state. Callers must never hold the returned guard
    /// across an `.await` point.
    pub(crate) fn lock_state(&self) -> std::sync::MutexGuard<'_, PolicyState> {
        self.state.lock().expect("policy lock poisoned")
    }

    /// Spawns the task puller for a just-released reservation (spec §4.3).
    pub(crate) fn spawn_puller(self: &Arc<Self>, reservation: Reservation) {
        let monitor = self.clone();
        tokio::spawn(async move {
            puller::make_runnable(monitor, reservation).await;
        });
    }

    /// Binds the RPC listener, starts the launcher pool, and runs until the
    /// listener fails (spec §2, §4.4).
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let launcher_count = self.config.launcher_count();
        let _launchers = LauncherPool::spawn(launcher_count, self.clone());

        let bind_address = format!("{}:{}", self.config.bind_address, self.config.port);
        rpc::server::serve(self.clone(), &bind_address).await
    }

    /// Starts the launcher pool without binding a listening socket. Exposed
    /// separately from [`Self::run`] so tests can drive intake/completion
    /// directly, without a real TCP/HTTP transport, while still exercising
    /// real launcher threads.
    pub fn spawn_launchers(self: &Arc<Self>, count: usize) -> LauncherPool {
        LauncherPool::spawn(count, self.clone())
    }

    /// Preloads a scheduler client for `address`, bypassing a real TCP
    /// connect. Test-only seam, mirroring the reference repo's preference
    /// for hand-written fakes implementing the production trait over
    /// network mocks.
    pub fn preload_scheduler_client(&self, address: &str, client: Box<dyn SchedulerClient>) {
        self.scheduler_pool.insert(address, client);
    }

    /// Preloads a backend client for `address`, bypassing a real HTTP
    /// client. Test-only seam; see [`Self::preload_scheduler_client`].
    pub fn preload_backend_client(&self, address: &str, client: Arc<dyn BackendClient>) {
        self.backend_pool.insert(address, client);
    }

    /// Handles one `enqueueTaskReservations` call without going through the
    /// wire protocol (spec §4.1).
    #[allow(clippy::too_many_arguments)]
    pub async fn enqueue_task_reservations(
        self: &Arc<Self>,
        request_id: RequestId,
        app_id: AppId,
        user: UserId,
        estimated_resources: ResourceVector,
        scheduler_address: String,
        app_backend_address: String,
        num_tasks: u32,
    ) -> Result<()> {
        intake::enqueue_task_reservations(self, request_id, app_id, user, estimated_resources, scheduler_address, app_backend_address, num_tasks).await
    }

    /// Handles one `tasksFinished` call without going through the wire
    /// protocol (spec §4.4 point 4, §6).
    pub async fn tasks_finished(self: &Arc<Self>, tasks: Vec<FullTaskId>) {
        for full_task_id in tasks {
            match self.in_flight.remove(&full_task_id.task_id) {
                Some((_, debited)) => {
                    crate::completion::finish_after_launch(self, full_task_id.request_id, full_task_id.task_id.to_string(), debited).await;
                }
                None => {
                    tracing::warn!(task_id = %full_task_id.task_id, "tasksFinished reported an unknown task id");
                }
            }
        }
    }

    /// Answers one `getResourceUsage` call without going through the wire
    /// protocol (spec §4.2). The wire/RPC contract is the `(inUse,
    /// queueLengthForApp)` pair; `getFreeResources` (spec §3) is logged
    /// alongside for operators rather than returned, since no caller of
    /// `getResourceUsage` asks for it.
    pub fn get_resource_usage(&self, app_id: &AppId) -> (ResourceVector, usize) {
        let state = self.lock_state();
        let in_use = state.resources.in_use();
        let queue_length = state.policy.queue_length_for_app(app_id);
        let free = state.resources.free_resources(self.runnable.queued_resources());
        tracing::debug!(app_id = %app_id, in_use_mem = in_use.mem_bytes, in_use_cpu = in_use.cpu_millis, free_mem = free.mem_bytes, free_cpu = free.cpu_millis, queue_length, "getResourceUsage");
        (in_use, queue_length)
    }

    /// Whether `request_id` still has an accounting record (spec §3, §8
    /// invariant "absent from the accounting map once its final reservation
    /// reaches a terminal state"). Test/audit-only.
    pub fn job_is_known(&self, request_id: &RequestId) -> bool {
        self.lock_state().jobs.get(request_id).is_some()
    }

    /// Whether the accounting map holds no records at all. Test/audit-only.
    pub fn jobs_empty(&self) -> bool {
        self.lock_state().jobs.is_empty()
    }

    /// Total retained (queued) reservations across all apps (spec §4.2).
    /// Test/audit-only.
    pub fn queue_depth(&self) -> usize {
        self.lock_state().policy.queue_depth()
    }
}
