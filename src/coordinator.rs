use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    bounded_queue::SharedQueue,
    config::RunConfig,
    consumer::{Consumer, ConsumerOutcome},
    error::{Error, Result},
    producer::{Producer, ProducerOutcome},
    report::{Reporter, Role},
};

/// What every worker reported back once the run wound down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub producers: Vec<ProducerOutcome>,
    pub consumers: Vec<ConsumerOutcome>,
    /// Jobs still sitting in the queue when the last worker exited.
    pub remaining: usize,
}

impl RunSummary {
    pub fn generated(&self) -> usize {
        self.producers.iter().map(|p| p.generated).sum()
    }

    pub fn completed(&self) -> usize {
        self.consumers.iter().map(|c| c.completed).sum()
    }

    pub fn timed_out_producers(&self) -> usize {
        self.producers.iter().filter(|p| p.timed_out).count()
    }
}

#[derive(Default)]
struct Workers {
    producers: Vec<(usize, JoinHandle<ProducerOutcome>)>,
    consumers: Vec<(usize, JoinHandle<ConsumerOutcome>)>,
}

impl Workers {
    fn join(self) -> Result<(Vec<ProducerOutcome>, Vec<ConsumerOutcome>)> {
        let producers = join_all(Role::Producer, self.producers);
        let consumers = join_all(Role::Consumer, self.consumers);
        Ok((producers?, consumers?))
    }
}

// Joins every handle even after a failure so no worker outlives the run.
fn join_all<T>(role: Role, handles: Vec<(usize, JoinHandle<T>)>) -> Result<Vec<T>> {
    let mut outcomes = Vec::with_capacity(handles.len());
    let mut failure = None;
    for (index, handle) in handles {
        match handle.join() {
            Ok(outcome) => outcomes.push(outcome),
            Err(_) => {
                tracing::error!(%role, index, "Worker panicked");
                failure.get_or_insert(Error::WorkerPanicked { role, index });
            }
        }
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}

fn spawn<T, F>(role: Role, index: usize, f: F) -> Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{}-{index}", role.to_string().to_lowercase()))
        .spawn(f)
        .map_err(|source| Error::Spawn {
            role,
            index,
            source,
        })
}

/// Fans producers and consumers out over one shared queue and fans them back in.
pub struct Coordinator {
    config: RunConfig,
    reporter: Arc<dyn Reporter>,
}

impl Coordinator {
    pub fn new(config: RunConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;

        let queue = Arc::new(SharedQueue::new(self.config.capacity));
        tracing::info!(
            capacity = self.config.capacity,
            jobs_per_producer = self.config.jobs_per_producer,
            producers = self.config.producers,
            consumers = self.config.consumers,
            deadline = ?self.config.timing.deadline(),
            "Starting run"
        );

        let mut workers = Workers::default();
        if let Err(e) = self.spawn_workers(&queue, &mut workers) {
            // Already running workers still hold the queue; let them time out first.
            if let Err(join_err) = workers.join() {
                tracing::warn!(error = %join_err, "Worker failed while unwinding a partial start");
            }
            return Err(e);
        }

        let (producers, consumers) = workers.join()?;
        let summary = RunSummary {
            producers,
            consumers,
            remaining: queue.len(),
        };
        tracing::info!(
            generated = summary.generated(),
            completed = summary.completed(),
            remaining = summary.remaining,
            "Run finished"
        );
        Ok(summary)
    }

    fn spawn_workers(&self, queue: &Arc<SharedQueue>, workers: &mut Workers) -> Result<()> {
        let timing = &self.config.timing;

        for index in 1..=self.config.producers {
            let producer = Producer::new(
                index,
                self.config.jobs_per_producer,
                Arc::clone(queue),
                timing.clone(),
                Arc::clone(&self.reporter),
            );
            let handle = spawn(Role::Producer, index, move || producer.run())?;
            workers.producers.push((index, handle));
        }

        for index in 1..=self.config.consumers {
            let consumer = Consumer::new(
                index,
                Arc::clone(queue),
                timing.clone(),
                Arc::clone(&self.reporter),
            );
            let handle = spawn(Role::Consumer, index, move || consumer.run())?;
            workers.consumers.push((index, handle));
        }

        Ok(())
    }
}
