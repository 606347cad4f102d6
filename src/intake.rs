//! Reservation intake: `enqueueTaskReservations` (spec §4.1).
//!
//! Grounded on the reference repo's
//! `vrm_component_registry::registry_client::RegistryClient::spawn_component`,
//! which accepts a request, performs accounting under a lock, and hands the
//! work off to a worker rather than doing it inline.

use std::sync::Arc;

use crate::audit;
use crate::domain::ids::{AppId, RequestId, UserId};
use crate::domain::reservation::Reservation;
use crate::domain::resources::ResourceVector;
use crate::error::{Error, Result};
use crate::node_monitor::NodeMonitor;
use crate::policy::SubmitOutcome;

/// Handles one `enqueueTaskReservations` call (spec §4.1 steps 1-3):
///
/// 1. Upserts `JobResourceInfo` for `request_id` (overwriting a prior
///    record per the resolved Open Question #1).
/// 2. Submits `num_tasks` fresh reservations to the admission policy.
/// 3. Spawns a puller for every reservation the policy releases
///    immediately.
pub async fn enqueue_task_reservations(
    monitor: &Arc<NodeMonitor>,
    request_id: RequestId,
    app_id: AppId,
    user: UserId,
    estimated_resources: ResourceVector,
    scheduler_address: String,
    app_backend_address: String,
    num_tasks: u32,
) -> Result<()> {
    if num_tasks == 0 {
        return Err(Error::MalformedRequest("numTasks must be greater than zero".into()));
    }
    if app_backend_address.is_empty() {
        return Err(Error::MalformedRequest("appBackendAddress must not be empty".into()));
    }

    let queued = monitor.runnable.queued_resources();
    let mut released = Vec::new();
    {
        let mut state = monitor.lock_state();
        state.jobs.upsert(request_id.clone(), num_tasks, estimated_resources);
        let has_capacity = state.resources.has_capacity_for(estimated_resources, queued);

        for _ in 0..num_tasks {
            let id = state.next_reservation_id();
            let reservation = Reservation::new(
                id,
                request_id.clone(),
                app_id.clone(),
                user.clone(),
                estimated_resources,
                scheduler_address.clone(),
                app_backend_address.clone(),
            );
            match state.policy.handle_submit(reservation) {
                SubmitOutcome::Release { reservation, queue_depth } => {
                    audit::reservation_submitted(&request_id, &app_id, queue_depth, has_capacity);
                    released.push(reservation);
                }
                SubmitOutcome::Retained { queue_depth } => {
                    audit::reservation_submitted(&request_id, &app_id, queue_depth, has_capacity);
                }
            }
        }
    }

    for reservation in released {
        monitor.spawn_puller(reservation);
    }
    Ok(())
}
