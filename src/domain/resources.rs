use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A resource claim or capacity vector. Extensible: adding a field here
/// (e.g. `gpu_count`) is the documented extension point from spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceVector {
    pub mem_bytes: u64,
    pub cpu_millis: u64,
}

impl ResourceVector {
    pub const ZERO: ResourceVector = ResourceVector { mem_bytes: 0, cpu_millis: 0 };

    pub fn new(mem_bytes: u64, cpu_millis: u64) -> Self {
        ResourceVector { mem_bytes, cpu_millis }
    }

    /// Component-wise `self + other <= capacity`.
    pub fn fits_within(&self, capacity: ResourceVector) -> bool {
        self.mem_bytes <= capacity.mem_bytes && self.cpu_millis <= capacity.cpu_millis
    }

    pub fn saturating_sub(&self, other: ResourceVector) -> ResourceVector {
        ResourceVector { mem_bytes: self.mem_bytes.saturating_sub(other.mem_bytes), cpu_millis: self.cpu_millis.saturating_sub(other.cpu_millis) }
    }
}

impl Add for ResourceVector {
    type Output = ResourceVector;
    fn add(self, rhs: ResourceVector) -> ResourceVector {
        ResourceVector { mem_bytes: self.mem_bytes + rhs.mem_bytes, cpu_millis: self.cpu_millis + rhs.cpu_millis }
    }
}

impl Sub for ResourceVector {
    type Output = ResourceVector;
    fn sub(self, rhs: ResourceVector) -> ResourceVector {
        self.saturating_sub(rhs)
    }
}

/// Per-host resource accounting (spec §3 `NodeResources`).
///
/// `in_use` is mutated only while holding the node monitor's policy lock
/// (see `node_monitor::PolicyLock`); reads outside the lock are for
/// instrumentation only (spec §5).
#[derive(Debug, Clone)]
pub struct NodeResources {
    capacity: ResourceVector,
    in_use: ResourceVector,
}

impl NodeResources {
    pub fn new(capacity: ResourceVector) -> Self {
        NodeResources { capacity, in_use: ResourceVector::ZERO }
    }

    pub fn capacity(&self) -> ResourceVector {
        self.capacity
    }

    pub fn in_use(&self) -> ResourceVector {
        self.in_use
    }

    pub fn debit(&mut self, amount: ResourceVector) {
        self.in_use = self.in_use + amount;
    }

    pub fn credit(&mut self, amount: ResourceVector) {
        self.in_use = self.in_use.saturating_sub(amount);
    }

    /// `getFreeResources() = capacity - inUse - sum(estimatedResources of
    /// reservations on the runnable queue)` (spec §3).
    pub fn free_resources(&self, queued: ResourceVector) -> ResourceVector {
        self.capacity.saturating_sub(self.in_use).saturating_sub(queued)
    }

    pub fn has_capacity_for(&self, amount: ResourceVector, queued: ResourceVector) -> bool {
        let in_use_and_queued = self.in_use + queued;
        (in_use_and_queued + amount).fits_within(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_resources_subtracts_queued_and_in_use() {
        let mut nr = NodeResources::new(ResourceVector::new(4096, 4000));
        nr.debit(ResourceVector::new(1024, 1000));
        let free = nr.free_resources(ResourceVector::new(512, 500));
        assert_eq!(free, ResourceVector::new(4096 - 1024 - 512, 4000 - 1000 - 500));
    }

    #[test]
    fn has_capacity_for_respects_queued_reservations() {
        let nr = NodeResources::new(ResourceVector::new(2048, 2000));
        assert!(nr.has_capacity_for(ResourceVector::new(1024, 1000), ResourceVector::new(1024, 1000)));
        assert!(!nr.has_capacity_for(ResourceVector::new(1024, 1000), ResourceVector::new(1025, 1000)));
    }

    #[test]
    fn in_use_never_goes_negative() {
        let mut nr = NodeResources::new(ResourceVector::new(1024, 1000));
        nr.credit(ResourceVector::new(2048, 2000));
        assert_eq!(nr.in_use(), ResourceVector::ZERO);
    }
}
