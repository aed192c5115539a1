/// A unit of simulated work.
///
/// `id` is rewritten with the 1-based ring slot on enqueue, so it labels the
/// job's position in the queue rather than identifying the job for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: usize,
    pub duration: u32,
}

impl Job {
    /// A job that has not entered the queue yet carries id 0.
    pub fn new(duration: u32) -> Self {
        Self { id: 0, duration }
    }
}
