//! The task puller: fetches a concrete `taskSpec` for a released
//! reservation via `getTask` and hands it to the runnable queue (spec
//! §4.3).
//!
//! Grounded on the reference repo's actix `TcpSession` read path
//! (`StreamHandler` driving state transitions off asynchronous I/O),
//! reworked as a plain tokio async function per the decision (DESIGN.md) to
//! drop `actix` in favor of tasks and channels.

use std::sync::Arc;

use crate::completion;
use crate::domain::reservation::{Reservation, ReservationState};
use crate::node_monitor::NodeMonitor;

/// Runs to completion for exactly one reservation: either it becomes
/// runnable and is handed to [`crate::runnable::RunnableQueue`], or it
/// terminates as `NoTask` through [`completion::finish_with_no_task`].
pub async fn make_runnable(monitor: Arc<NodeMonitor>, mut reservation: Reservation) {
    reservation.state = ReservationState::Fetching;

    // `reservation.scheduler_address` travels with the reservation verbatim
    // (it is also `FullTaskId::originating_scheduler`'s source); the address
    // actually dialed gets the well-known `get_task.port` appended when the
    // scheduler didn't supply one of its own (spec §6 `get_task.port`).
    let dial_address = monitor.config.resolve_scheduler_address(&reservation.scheduler_address);

    let client = match monitor.scheduler_pool.borrow(&dial_address).await {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(scheduler_address = %dial_address, %error, "failed to borrow scheduler client");
            monitor.scheduler_pool.drop_client(&dial_address);
            completion::finish_with_no_task(&monitor, reservation).await;
            return;
        }
    };

    let outcome = {
        let mut guard = client.lock().await;
        guard.get_task(&reservation.request_id, &monitor.self_address).await
    };

    match outcome {
        Ok(mut specs) if !specs.is_empty() => {
            if specs.len() > 1 {
                tracing::warn!(request_id = %reservation.request_id, count = specs.len(), "getTask returned more than one spec; using the first and discarding the rest");
            }
            reservation.task_spec = Some(specs.remove(0));
            reservation.state = ReservationState::Runnable;
            if monitor.runnable.push(reservation).await.is_err() {
                tracing::error!("runnable queue receiver dropped; node monitor is shutting down");
            }
        }
        Ok(_) => {
            completion::finish_with_no_task(&monitor, reservation).await;
        }
        Err(error) => {
            tracing::warn!(scheduler_address = %dial_address, %error, "getTask failed");
            monitor.scheduler_pool.drop_client(&dial_address);
            completion::finish_with_no_task(&monitor, reservation).await;
        }
    }
}
