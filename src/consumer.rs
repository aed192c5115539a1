use std::{sync::Arc, thread};

use crate::{
    bounded_queue::SharedQueue,
    config::TimingConfig,
    report::{Event, Reporter, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerOutcome {
    pub completed: usize,
}

pub struct Consumer {
    index: usize,
    queue: Arc<SharedQueue>,
    timing: TimingConfig,
    reporter: Arc<dyn Reporter>,
}

impl Consumer {
    pub fn new(
        index: usize,
        queue: Arc<SharedQueue>,
        timing: TimingConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            index,
            queue,
            timing,
            reporter,
        }
    }

    /// Executes jobs until the queue stays empty for a whole deadline.
    pub fn run(self) -> ConsumerOutcome {
        let mut outcome = ConsumerOutcome { completed: 0 };

        while let Some(job) = self.queue.pop_timeout(self.timing.deadline()) {
            self.report(Event::Executing {
                id: job.id,
                duration: job.duration,
            });
            thread::sleep(self.timing.units(job.duration));
            self.report(Event::Completed { id: job.id });
            outcome.completed += 1;
        }

        tracing::info!(
            consumer = self.index,
            completed = outcome.completed,
            "Timed out waiting for a job"
        );
        self.report(Event::NoMoreJobsLeft);
        outcome
    }

    fn report(&self, event: Event) {
        self.reporter.report(Role::Consumer, self.index, event);
    }
}
