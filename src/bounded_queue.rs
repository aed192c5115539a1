use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{job::Job, semaphore::Semaphore};

/// Fixed-capacity ring of jobs.
///
/// The ring does no blocking and no graceful capacity handling of its own:
/// callers reserve a slot or an item through [`SharedQueue`] first.
pub struct BoundedQueue {
    slots: Box<[Option<Job>]>,
    front: usize,
    back: usize,
    count: usize,
}

impl BoundedQueue {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded queue needs at least one slot");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            front: 0,
            back: 0,
            count: 0,
        }
    }

    /// Stores `job` at the back and returns the 1-based slot label it was given.
    ///
    /// Panics if the ring is full: that means a producer skipped its slot reservation.
    pub fn enqueue(&mut self, mut job: Job) -> usize {
        assert!(
            self.count < self.capacity(),
            "enqueue without a reserved slot (count {} of {})",
            self.count,
            self.capacity()
        );
        let label = self.back + 1;
        job.id = label;
        self.slots[self.back] = Some(job);
        self.back = (self.back + 1) % self.capacity();
        self.count += 1;
        label
    }

    /// Takes the oldest job. `None` only happens when called on an empty ring.
    ///
    /// Draining the ring rewinds both ends to the first slot, so the next job
    /// enqueued into an empty queue is always labelled 1.
    pub fn dequeue(&mut self) -> Option<Job> {
        let job = self.slots[self.front].take()?;
        self.count -= 1;
        if self.count == 0 {
            self.front = 0;
            self.back = 0;
        } else {
            self.front = (self.front + 1) % self.capacity();
        }
        Some(job)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[cfg(test)]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }
}

/// The ring plus the three primitives guarding it: the ring mutex, an
/// `items` count for consumers and a `free_slots` count for producers.
pub struct SharedQueue {
    queue: Mutex<BoundedQueue>,
    items: Semaphore,
    free_slots: Semaphore,
}

impl SharedQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(BoundedQueue::new(capacity)),
            items: Semaphore::new(0),
            free_slots: Semaphore::new(capacity),
        }
    }

    // Ring mutations never panic while the lock is held, so a poisoned lock
    // still guards a consistent ring.
    fn ring(&self) -> MutexGuard<'_, BoundedQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserves a free slot (waiting up to `deadline`) and enqueues `job`.
    ///
    /// Returns the slot label on success. If no slot frees up in time the job
    /// is handed back untouched and nothing stays reserved.
    pub fn push_timeout(&self, job: Job, deadline: Duration) -> Result<usize, Job> {
        if !self.free_slots.acquire_timeout(deadline) {
            return Err(job);
        }
        let label = {
            let mut ring = self.ring();
            let label = ring.enqueue(job);
            tracing::debug!(
                slot = label,
                len = ring.len(),
                capacity = ring.capacity(),
                "Job enqueued"
            );
            label
        };
        self.items.release();
        Ok(label)
    }

    /// Reserves an item (waiting up to `deadline`) and takes the oldest job.
    ///
    /// `None` means the deadline passed with nothing to take.
    pub fn pop_timeout(&self, deadline: Duration) -> Option<Job> {
        if !self.items.acquire_timeout(deadline) {
            return None;
        }
        let job = {
            let mut ring = self.ring();
            let job = ring.dequeue();
            tracing::debug!(len = ring.len(), capacity = ring.capacity(), "Job dequeued");
            job
        };
        let Some(job) = job else {
            panic!("dequeue found an empty ring after an item was reserved");
        };
        self.free_slots.release();
        Some(job)
    }

    pub fn len(&self) -> usize {
        self.ring().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.ring().is_empty()
    }
}
