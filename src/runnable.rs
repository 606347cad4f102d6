//! The bounded runnable queue: reservations that have a `taskSpec` in hand
//! and are waiting for a launcher worker (spec §4.3 "make_runnable", §9
//! REDESIGN FLAGS — bounded rather than unbounded).
//!
//! Grounded on the same registry/proxy channel shape used throughout the
//! reference repo's `vrm_component_registry` (a cheap cloneable handle onto
//! a channel owned by a worker loop), here realized as a bounded
//! `tokio::sync::mpsc` channel because the producer side (the puller) is
//! async while the reference's was synchronous.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::domain::reservation::Reservation;
use crate::domain::resources::ResourceVector;

#[derive(Debug)]
pub struct RunnableQueue {
    sender: mpsc::Sender<Reservation>,
    receiver: Arc<Mutex<mpsc::Receiver<Reservation>>>,
    /// Running sum of `estimatedResources` for reservations currently sitting
    /// in the channel buffer, i.e. spec §3's "reservations on the runnable
    /// queue" term in `getFreeResources`. Maintained by [`Self::push`]/
    /// [`Self::recv`] rather than the channel itself, which only tracks slot
    /// counts.
    queued_mem: AtomicU64,
    queued_cpu: AtomicU64,
}

impl RunnableQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        RunnableQueue { sender, receiver: Arc::new(Mutex::new(receiver)), queued_mem: AtomicU64::new(0), queued_cpu: AtomicU64::new(0) }
    }

    /// A cloneable handle onto the send half, for callers that need raw
    /// channel semantics (e.g. capacity inspection). Does not update
    /// [`Self::queued_resources`]; production code pushing a reservation
    /// should use [`Self::push`] instead.
    pub fn sender(&self) -> mpsc::Sender<Reservation> {
        self.sender.clone()
    }

    /// Pushes a runnable reservation (spec §4.3 "make_runnable"), backpressuring
    /// the puller when the queue is at capacity (spec §9 REDESIGN FLAGS), and
    /// accounts its resources into [`Self::queued_resources`] until a launcher
    /// worker dequeues it.
    pub async fn push(&self, reservation: Reservation) -> Result<(), mpsc::error::SendError<Reservation>> {
        let resources = reservation.estimated_resources;
        self.sender.send(reservation).await?;
        self.queued_mem.fetch_add(resources.mem_bytes, Ordering::Relaxed);
        self.queued_cpu.fetch_add(resources.cpu_millis, Ordering::Relaxed);
        Ok(())
    }

    /// Blocks until a reservation is runnable. Safe to call concurrently
    /// from every launcher worker; only one call returns per reservation.
    pub async fn recv(&self) -> Option<Reservation> {
        let reservation = self.receiver.lock().await.recv().await?;
        let resources = reservation.estimated_resources;
        self.queued_mem.fetch_sub(resources.mem_bytes, Ordering::Relaxed);
        self.queued_cpu.fetch_sub(resources.cpu_millis, Ordering::Relaxed);
        Some(reservation)
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Sum of `estimatedResources` for reservations currently buffered here,
    /// the `queued` term `NodeResources::free_resources` subtracts (spec §3
    /// `getFreeResources`).
    pub fn queued_resources(&self) -> ResourceVector {
        ResourceVector::new(self.queued_mem.load(Ordering::Relaxed), self.queued_cpu.load(Ordering::Relaxed))
    }
}
