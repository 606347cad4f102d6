use std::collections::VecDeque;

use crate::domain::ids::{AppId, RequestId};
use crate::domain::reservation::Reservation;
use crate::domain::resources::ResourceVector;
use crate::policy::{AdmissionPolicy, SubmitOutcome};

/// Bounded-concurrency admission: releases while `committed + reservation
/// <= capacity`, otherwise retains FIFO; on completion, drains the head
/// while capacity allows, ties broken by submit order (spec §4.2 "Concrete
/// policies — Bounded concurrent tasks").
///
/// `committed` is this policy's own view of outstanding claims on capacity
/// — every released-but-not-yet-completed reservation's resources — kept
/// independent of `NodeResources::in_use`, which is only debited once a
/// reservation is actually dequeued from the runnable queue (spec §5, §9
/// "Global mutable accounting"). Tracking it here is what lets the bounded
/// policy enforce capacity at release time, before a reservation has even
/// reached the puller.
#[derive(Debug)]
pub struct BoundedPolicy {
    capacity: ResourceVector,
    committed: ResourceVector,
    queue: VecDeque<Reservation>,
}

impl BoundedPolicy {
    pub fn new(capacity: ResourceVector) -> Self {
        BoundedPolicy { capacity, committed: ResourceVector::ZERO, queue: VecDeque::new() }
    }

    fn fits(&self, additional: ResourceVector) -> bool {
        (self.committed + additional).fits_within(self.capacity)
    }
}

impl AdmissionPolicy for BoundedPolicy {
    fn handle_submit(&mut self, reservation: Reservation) -> SubmitOutcome {
        if self.fits(reservation.estimated_resources) {
            self.committed = self.committed + reservation.estimated_resources;
            SubmitOutcome::Release { reservation, queue_depth: self.queue.len() }
        } else {
            self.queue.push_back(reservation);
            SubmitOutcome::Retained { queue_depth: self.queue.len() }
        }
    }

    fn handle_task_completed(
        &mut self,
        _completed_job: &RequestId,
        resources: ResourceVector,
        last_request_id: String,
        last_task_id: String,
    ) -> Vec<Reservation> {
        self.committed = self.committed.saturating_sub(resources);

        let mut released = Vec::new();
        while let Some(head) = self.queue.front() {
            if !self.fits(head.estimated_resources) {
                break;
            }
            let mut reservation = self.queue.pop_front().expect("front just checked Some");
            self.committed = self.committed + reservation.estimated_resources;
            reservation.set_previous_task(last_request_id.clone(), last_task_id.clone());
            released.push(reservation);
        }
        released
    }

    fn queue_length_for_app(&self, app_id: &AppId) -> usize {
        self.queue.iter().filter(|r| &r.app_id == app_id).count()
    }

    fn queue_depth(&self) -> usize {
        self.queue.len()
    }
}
