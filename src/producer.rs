use std::{sync::Arc, thread};

use rand::Rng;

use crate::{
    bounded_queue::SharedQueue,
    config::TimingConfig,
    job::Job,
    report::{Event, Reporter, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerOutcome {
    pub generated: usize,
    /// True when the producer gave up on a full queue before meeting its quota.
    pub timed_out: bool,
}

pub struct Producer {
    index: usize,
    quota: usize,
    queue: Arc<SharedQueue>,
    timing: TimingConfig,
    reporter: Arc<dyn Reporter>,
}

impl Producer {
    pub fn new(
        index: usize,
        quota: usize,
        queue: Arc<SharedQueue>,
        timing: TimingConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            index,
            quota,
            queue,
            timing,
            reporter,
        }
    }

    /// Generates up to `quota` jobs, stopping early if no slot frees up within the deadline.
    pub fn run(self) -> ProducerOutcome {
        let mut rng = rand::thread_rng();
        let mut outcome = ProducerOutcome {
            generated: 0,
            timed_out: false,
        };

        while outcome.generated < self.quota {
            let job = Job::new(rng.gen_range(1..=self.timing.max_job_duration));
            let duration = job.duration;

            match self.queue.push_timeout(job, self.timing.deadline()) {
                Ok(id) => {
                    outcome.generated += 1;
                    self.report(Event::Generated { id, duration });
                }
                // The unsent job is dropped with this arm.
                Err(_unsent) => {
                    tracing::info!(
                        producer = self.index,
                        generated = outcome.generated,
                        abandoned = self.quota - outcome.generated,
                        "Timed out waiting for a free slot"
                    );
                    outcome.timed_out = true;
                    break;
                }
            }

            if outcome.generated < self.quota && self.timing.max_think_time > 0 {
                let pause = rng.gen_range(1..=self.timing.max_think_time);
                thread::sleep(self.timing.units(pause));
            }
        }

        self.report(Event::NoMoreJobsToGenerate);
        outcome
    }

    fn report(&self, event: Event) {
        self.reporter.report(Role::Producer, self.index, event);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::report::RecordingReporter;

    fn fast_timing(deadline_units: u32) -> TimingConfig {
        TimingConfig::default()
            .with_unit(Duration::from_millis(1))
            .with_deadline(deadline_units)
            .with_max_job_duration(5)
            .with_max_think_time(0)
    }

    #[test]
    fn test_producer_meets_quota() {
        let queue = Arc::new(SharedQueue::new(4));
        let reporter = Arc::new(RecordingReporter::default());
        let producer = Producer::new(1, 3, queue.clone(), fast_timing(50), reporter.clone());

        let outcome = producer.run();
        assert_eq!(
            outcome,
            ProducerOutcome {
                generated: 3,
                timed_out: false
            }
        );
        assert_eq!(queue.len(), 3);

        let events = reporter.events_for(Role::Producer, 1);
        assert_eq!(events.len(), 4);
        for (slot, event) in events[..3].iter().enumerate() {
            match event {
                Event::Generated { id, duration } => {
                    assert_eq!(*id, slot + 1);
                    assert!((1..=5).contains(duration));
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(events[3], Event::NoMoreJobsToGenerate);
    }

    #[test]
    fn test_producer_times_out_on_full_queue() {
        let queue = Arc::new(SharedQueue::new(3));
        let reporter = Arc::new(RecordingReporter::default());
        let producer = Producer::new(1, 5, queue.clone(), fast_timing(40), reporter.clone());

        let start = Instant::now();
        let outcome = producer.run();
        assert!(start.elapsed() >= Duration::from_millis(40));

        assert_eq!(
            outcome,
            ProducerOutcome {
                generated: 3,
                timed_out: true
            }
        );
        assert_eq!(queue.len(), 3);

        let events = reporter.events_for(Role::Producer, 1);
        let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminal, vec![&Event::NoMoreJobsToGenerate]);
        assert_eq!(events.last(), Some(&Event::NoMoreJobsToGenerate));
    }

    #[test]
    fn test_producer_with_zero_quota_reports_done() {
        let queue = Arc::new(SharedQueue::new(1));
        let reporter = Arc::new(RecordingReporter::default());
        let outcome = Producer::new(2, 0, queue.clone(), fast_timing(10), reporter.clone()).run();

        assert_eq!(outcome.generated, 0);
        assert!(!outcome.timed_out);
        assert!(queue.is_empty());
        assert_eq!(
            reporter.events_for(Role::Producer, 2),
            vec![Event::NoMoreJobsToGenerate]
        );
    }
}
