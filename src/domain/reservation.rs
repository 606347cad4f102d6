use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::domain::ids::{AppId, RequestId, TaskId, UserId};
use crate::domain::resources::ResourceVector;

new_key_type! {
    /// Internal bookkeeping key for a [`Reservation`], never sent on the
    /// wire (spec §3 only names the fields that travel between components).
    pub struct ReservationId;
}

/// The lifecycle states of a single reservation (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationState {
    Submitted,
    Queued,
    Fetching,
    Runnable,
    Launching,
    Done,
    NoTask,
    Error,
}

impl ReservationState {
    /// Whether this is one of the three terminal-adjacent states that feed
    /// the completion pathway.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationState::Done | ReservationState::NoTask | ReservationState::Error)
    }
}

/// The task specification fetched from the scheduler via `getTask`
/// (spec §3 `taskSpec`, §6 `TaskLaunchSpec`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskLaunchSpec {
    pub task_id: TaskId,
    pub message: Vec<u8>,
}

/// The unit of admission (spec §3 `Reservation`).
#[derive(Debug, Clone)]
pub struct Reservation {
    pub request_id: RequestId,
    pub app_id: AppId,
    pub user: UserId,
    pub estimated_resources: ResourceVector,
    pub scheduler_address: String,
    pub app_backend_address: String,

    /// Identifiers of the last task actually launched in the slot this
    /// reservation will occupy; empty strings if launched from an empty
    /// slot (spec §3). Set by the admission policy on release
    /// (spec §4.2 `handleTaskCompleted`).
    pub previous_request_id: String,
    pub previous_task_id: String,

    pub task_spec: Option<TaskLaunchSpec>,

    pub state: ReservationState,

    /// Internal-only correlation key, assigned by the reservation table on
    /// submit; not part of the wire protocol.
    pub id: ReservationId,
}

impl Reservation {
    pub fn new(
        id: ReservationId,
        request_id: RequestId,
        app_id: AppId,
        user: UserId,
        estimated_resources: ResourceVector,
        scheduler_address: String,
        app_backend_address: String,
    ) -> Self {
        Reservation {
            request_id,
            app_id,
            user,
            estimated_resources,
            scheduler_address,
            app_backend_address,
            previous_request_id: String::new(),
            previous_task_id: String::new(),
            task_spec: None,
            state: ReservationState::Submitted,
            id,
        }
    }

    /// Stamps the slot-reuse instrumentation fields set by
    /// `AdmissionPolicy::handle_task_completed` on release (spec §4.2).
    pub fn set_previous_task(&mut self, previous_request_id: impl Into<String>, previous_task_id: impl Into<String>) {
        self.previous_request_id = previous_request_id.into();
        self.previous_task_id = previous_task_id.into();
    }
}

/// Identity of a launched task, passed to `launchTask` and carried on
/// `tasksFinished` (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTaskId {
    pub task_id: TaskId,
    pub request_id: RequestId,
    pub app_id: AppId,
    pub originating_scheduler: String,
}
