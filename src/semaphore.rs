use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Counting semaphore with a deadline-bounded acquire.
///
/// Waiters park on the condition variable; nothing spins.
pub struct Semaphore {
    value: Mutex<usize>,
    cond_var: Condvar,
}

impl Semaphore {
    pub fn new(value: usize) -> Self {
        Self {
            value: Mutex::new(value),
            cond_var: Condvar::new(),
        }
    }

    // The guarded value is a plain counter, so a poisoned lock still holds a valid count.
    fn count(&self) -> MutexGuard<'_, usize> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes one permit, waiting at most `timeout` in total for one to appear.
    ///
    /// Returns `false` when the deadline passed without a permit; the count is
    /// left untouched in that case.
    pub fn acquire_timeout(&self, timeout: Duration) -> bool {
        let guard = self.count();
        let (mut guard, result) = self
            .cond_var
            .wait_timeout_while(guard, timeout, |value| *value == 0)
            .unwrap_or_else(PoisonError::into_inner);
        if result.timed_out() && *guard == 0 {
            return false;
        }
        *guard -= 1;
        true
    }

    pub fn release(&self) {
        *self.count() += 1;
        self.cond_var.notify_one();
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        *self.count()
    }
}
