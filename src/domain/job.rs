use std::collections::HashMap;

use crate::domain::ids::RequestId;
use crate::domain::resources::ResourceVector;

/// Per-`requestId` accounting (spec §3 `JobResourceInfo`).
#[derive(Debug, Clone)]
pub struct JobResourceInfo {
    pub remaining_tasks: u32,
    pub resources: ResourceVector,
}

/// The `requestId -> JobResourceInfo` accounting map.
///
/// Mutated only while holding the node monitor's policy lock
/// (`node_monitor::PolicyLock`); see spec §5, §9 "Global mutable
/// accounting." Grounded on the reference repo's
/// `reservation::reservation_store::ReservationStore`, which applies the
/// same single-lock-protected-map shape to a different payload.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: HashMap<RequestId, JobResourceInfo>,
}

impl JobTable {
    pub fn new() -> Self {
        JobTable { jobs: HashMap::new() }
    }

    /// Upserts the accounting record for `request_id` with `num_tasks`.
    ///
    /// Per spec §4.1 step 1 and §9 Open Question #1: a second intake call
    /// for the same `request_id` overwrites `remaining_tasks` rather than
    /// accumulating it. This matches the documented reference behavior.
    pub fn upsert(&mut self, request_id: RequestId, num_tasks: u32, resources: ResourceVector) {
        self.jobs.insert(request_id, JobResourceInfo { remaining_tasks: num_tasks, resources });
    }

    /// Decrements `remainingTasks` for `request_id` by one terminal
    /// reservation. Removes the entry once it reaches zero (spec §3).
    ///
    /// If `request_id` is absent, synthesizes a one-shot `JobResourceInfo`
    /// with `remaining_tasks = 1` and zero resources so the decrement still
    /// removes it immediately, matching spec §7's "internal invariant
    /// violation" recovery: accounting precision is lost but the map never
    /// accumulates zombie/negative entries.
    pub fn decrement(&mut self, request_id: &RequestId) -> bool {
        let was_known = self.jobs.contains_key(request_id);
        let info = self.jobs.entry(request_id.clone()).or_insert(JobResourceInfo { remaining_tasks: 1, resources: ResourceVector::ZERO });

        info.remaining_tasks = info.remaining_tasks.saturating_sub(1);
        if info.remaining_tasks == 0 {
            self.jobs.remove(request_id);
        }
        was_known
    }

    pub fn get(&self, request_id: &RequestId) -> Option<&JobResourceInfo> {
        self.jobs.get(request_id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Invariant check (spec §8): every entry has `remaining_tasks > 0`.
    #[cfg(debug_assertions)]
    pub fn assert_invariants(&self) {
        for (id, info) in &self.jobs {
            debug_assert!(info.remaining_tasks > 0, "job {id:?} has remaining_tasks == 0 but was not removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_existing_record() {
        let mut table = JobTable::new();
        let rid = RequestId::new("r1");
        table.upsert(rid.clone(), 5, ResourceVector::new(1, 1));
        table.upsert(rid.clone(), 2, ResourceVector::new(1, 1));
        assert_eq!(table.get(&rid).unwrap().remaining_tasks, 2);
    }

    #[test]
    fn decrement_removes_job_once_remaining_reaches_zero() {
        let mut table = JobTable::new();
        let rid = RequestId::new("r1");
        table.upsert(rid.clone(), 2, ResourceVector::new(1, 1));
        assert!(table.decrement(&rid));
        assert!(table.get(&rid).is_some());
        assert!(table.decrement(&rid));
        assert!(table.get(&rid).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn decrement_on_unknown_job_is_a_one_shot_noop() {
        let mut table = JobTable::new();
        let rid = RequestId::new("ghost");
        let was_known = table.decrement(&rid);
        assert!(!was_known);
        assert!(table.get(&rid).is_none());
        // Repeated calls never drive counters negative or leave entries behind.
        assert!(!table.decrement(&rid));
        assert!(table.is_empty());
    }
}
