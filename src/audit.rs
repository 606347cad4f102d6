//! Structured audit events with stable names (spec §4.1 point 3, §4.4 point
//! 5, §7 "All operational errors are surfaced via structured audit log
//! events with stable event names").
//!
//! Emitted as `tracing::info!`/`tracing::error!` records carrying an
//! `event` field, the `tracing` equivalent of the reference repo's
//! `log::info!` call sites in `registry_client.rs` and `reservation.rs`.

use crate::domain::ids::{AppId, RequestId, TaskId};

/// `has_capacity` reflects `NodeResources::has_capacity_for` (spec §3
/// `getFreeResources`) measured at submit time; it is diagnostic only and
/// does not gate admission, which stays the admission policy's call.
pub fn reservation_submitted(request_id: &RequestId, app_id: &AppId, queue_depth: usize, has_capacity: bool) {
    tracing::info!(event = "node_monitor_reservation_submitted", request_id = %request_id, app_id = %app_id, queue_depth, has_capacity, "reservation submitted");
}

pub fn reservation_completed(request_id: &RequestId, last_request_id: &str, last_task_id: &str) {
    tracing::info!(
        event = "node_monitor_reservation_completed",
        request_id = %request_id,
        last_request_id,
        last_task_id,
        "reservation reached a terminal state"
    );
}

pub fn task_launch(request_id: &RequestId, task_id: &TaskId, worker_host: &str, previous_request_id: &str, previous_task_id: &str) {
    tracing::info!(
        event = "node_monitor_task_launch",
        request_id = %request_id,
        task_id = %task_id,
        worker_host,
        previous_request_id,
        previous_task_id,
        "launched task"
    );
}

pub fn invariant_violation(message: &str) {
    tracing::error!(event = "node_monitor_invariant_violation", message, "internal invariant violation");
}
