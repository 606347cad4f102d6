//! The shared "reservation reached a terminal state" pathway (spec §4.2
//! `handleTaskCompleted`, §4.5).
//!
//! Grounded on the reference repo's `reservation::reservation_sync_gate::
//! ReservationSyncGate`, the single place that resolves a reservation's
//! outcome and notifies the owning policy, here generalized to the two ways
//! a reservation in this crate can end: no task was ever handed out
//! ([`finish_with_no_task`]), or a launched task was reported finished
//! ([`finish_after_launch`]).

use std::sync::Arc;

use crate::audit;
use crate::domain::ids::RequestId;
use crate::domain::reservation::{Reservation, ReservationState};
use crate::domain::resources::ResourceVector;
use crate::node_monitor::NodeMonitor;

/// Updates the job table, asks the policy to release any newly-admitted
/// reservations, and re-spawns a puller for each of them.
fn complete(monitor: &Arc<NodeMonitor>, request_id: &RequestId, policy_resources: ResourceVector, last_request_id: String, last_task_id: String) -> Vec<Reservation> {
    let mut state = monitor.lock_state();
    let was_known = state.jobs.decrement(request_id);
    if !was_known {
        audit::invariant_violation(&format!("completion for unknown job {request_id}"));
    }
    state.policy.handle_task_completed(request_id, policy_resources, last_request_id, last_task_id)
}

/// A reservation that never got a `taskSpec` back from `getTask` (spec
/// §4.3, §7): the RPC failed, or the scheduler had nothing to hand out.
/// `NodeResources::in_use` was never debited for it, so only the policy's
/// internal claim on capacity is released.
pub async fn finish_with_no_task(monitor: &Arc<NodeMonitor>, mut reservation: Reservation) {
    reservation.state = ReservationState::NoTask;
    let request_id = reservation.request_id.clone();
    let resources = reservation.estimated_resources;

    let released = complete(monitor, &request_id, resources, String::new(), String::new());
    audit::reservation_completed(&request_id, "", "");
    for released_reservation in released {
        monitor.spawn_puller(released_reservation);
    }
}

/// A task that was launched and later reported finished via `tasksFinished`
/// (spec §4.4 point 4, §6). Credits back the capacity debited at runnable-
/// queue dequeue time, then releases the policy's claim.
pub async fn finish_after_launch(monitor: &Arc<NodeMonitor>, request_id: RequestId, finished_task_id: String, debited: ResourceVector) {
    {
        let mut state = monitor.lock_state();
        state.resources.credit(debited);
    }

    let last_request_id = request_id.to_string();
    let released = complete(monitor, &request_id, debited, last_request_id.clone(), finished_task_id.clone());
    audit::reservation_completed(&request_id, &last_request_id, &finished_task_id);
    for released_reservation in released {
        monitor.spawn_puller(released_reservation);
    }
}
