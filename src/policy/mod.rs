pub mod bounded;
pub mod fifo;

use std::fmt;

use crate::domain::ids::{AppId, RequestId};
use crate::domain::reservation::Reservation;
use crate::domain::resources::ResourceVector;

/// Outcome of [`AdmissionPolicy::handle_submit`] (spec §4.2).
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The reservation may immediately begin fetching its task spec. The
    /// caller hands it to the Task Puller's `make_runnable`.
    Release { reservation: Reservation, queue_depth: usize },
    /// The reservation is retained internally by the policy.
    Retained { queue_depth: usize },
}

impl SubmitOutcome {
    pub fn queue_depth(&self) -> usize {
        match self {
            SubmitOutcome::Release { queue_depth, .. } => *queue_depth,
            SubmitOutcome::Retained { queue_depth } => *queue_depth,
        }
    }
}

/// The pluggable admission decision rule (spec §4.2).
///
/// Implementations are selected by a type tag at construction time
/// (`config::PolicyKind`) rather than an inheritance chain, per spec §9
/// "Dynamic dispatch over scheduling policy." All methods here are called
/// while the caller holds the node monitor's single policy lock
/// (`node_monitor::PolicyLock`); none of them may block or perform I/O.
pub trait AdmissionPolicy: Send + Sync + fmt::Debug {
    /// Submits a freshly-intaken reservation. Returns whether it was
    /// released immediately or retained, plus the resulting queue depth for
    /// audit (spec §4.1 step 2, §4.2).
    fn handle_submit(&mut self, reservation: Reservation) -> SubmitOutcome;

    /// Notifies the policy that a reservation belonging to `completed_job`
    /// has reached a terminal state, freeing `resources` it had claimed.
    /// Returns zero or more newly-released reservations, each stamped with
    /// `last_request_id`/`last_task_id` (spec §4.2).
    fn handle_task_completed(
        &mut self,
        completed_job: &RequestId,
        resources: ResourceVector,
        last_request_id: String,
        last_task_id: String,
    ) -> Vec<Reservation>;

    /// Number of retained reservations for `app_id` (spec §4.2
    /// `getResourceUsage`'s `queueLengthForApp`). Called outside the policy
    /// lock for load reporting (spec §4.2).
    fn queue_length_for_app(&self, app_id: &AppId) -> usize;

    /// Total number of retained reservations, for audit.
    fn queue_depth(&self) -> usize;
}
