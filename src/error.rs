use thiserror::Error;

use crate::report::Role;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Queue capacity must be at least 1")]
    ZeroCapacity,

    #[error("Idle deadline must be longer than zero")]
    ZeroDeadline,

    #[error("Maximum job duration must be at least 1 time unit")]
    ZeroJobDuration,

    #[error("Failed to spawn {role}({index}): {source}")]
    Spawn {
        role: Role,
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("{role}({index}) panicked")]
    WorkerPanicked { role: Role, index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
