use crate::domain::ids::{AppId, RequestId};
use crate::domain::reservation::Reservation;
use crate::domain::resources::ResourceVector;
use crate::policy::{AdmissionPolicy, SubmitOutcome};

/// Unbounded FIFO admission: always releases on submit, never retains
/// (spec §4.2 "Concrete policies — Unbounded FIFO"). Accounting is still
/// maintained by the caller (`JobTable`), independent of this policy.
#[derive(Debug, Default)]
pub struct FifoPolicy;

impl FifoPolicy {
    pub fn new() -> Self {
        FifoPolicy
    }
}

impl AdmissionPolicy for FifoPolicy {
    fn handle_submit(&mut self, reservation: Reservation) -> SubmitOutcome {
        SubmitOutcome::Release { reservation, queue_depth: 0 }
    }

    fn handle_task_completed(
        &mut self,
        _completed_job: &RequestId,
        _resources: ResourceVector,
        _last_request_id: String,
        _last_task_id: String,
    ) -> Vec<Reservation> {
        Vec::new()
    }

    fn queue_length_for_app(&self, _app_id: &AppId) -> usize {
        0
    }

    fn queue_depth(&self) -> usize {
        0
    }
}
