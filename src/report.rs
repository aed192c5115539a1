use std::{
    fmt,
    io::{self, Write},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Producer,
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => write!(f, "Producer"),
            Role::Consumer => write!(f, "Consumer"),
        }
    }
}

/// Something a worker observed that ends up as one report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Generated { id: usize, duration: u32 },
    NoMoreJobsToGenerate,
    Executing { id: usize, duration: u32 },
    Completed { id: usize },
    NoMoreJobsLeft,
}

impl Event {
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::NoMoreJobsToGenerate | Event::NoMoreJobsLeft)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Generated { id, duration } => write!(f, "job id {id} duration {duration}"),
            Event::NoMoreJobsToGenerate => write!(f, "No more jobs to generate."),
            Event::Executing { id, duration } => {
                write!(f, "job id {id} executing sleep duration {duration}")
            }
            Event::Completed { id } => write!(f, "job id {id} completed"),
            Event::NoMoreJobsLeft => write!(f, "No more jobs left."),
        }
    }
}

/// Formats one report line, e.g. `Consumer(2): job id 1 completed`.
pub fn format_line(role: Role, worker: usize, event: &Event) -> String {
    format!("{role}({worker}): {event}\n")
}

/// Sink for worker events. Implementations must emit each event as a unit,
/// never interleaved with another worker's output.
pub trait Reporter: Send + Sync {
    fn report(&self, role: Role, worker: usize, event: Event);
}

/// Writes report lines to stdout, one locked write per line.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&self, role: Role, worker: usize, event: Event) {
        let line = format_line(role, worker, &event);
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout.write_all(line.as_bytes()).and_then(|()| stdout.flush()) {
            tracing::warn!(error = %e, %role, worker, "Failed to write report line");
        }
    }
}

/// Keeps every event in arrival order so tests can inspect the trace.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: std::sync::Mutex<Vec<(Role, usize, Event)>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn events(&self) -> Vec<(Role, usize, Event)> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, role: Role, worker: usize) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|(r, w, _)| *r == role && *w == worker)
            .map(|(_, _, event)| event)
            .collect()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn report(&self, role: Role, worker: usize, event: Event) {
        self.events.lock().unwrap().push((role, worker, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_lines() {
        let line = format_line(Role::Producer, 1, &Event::Generated { id: 3, duration: 7 });
        assert_eq!(line, "Producer(1): job id 3 duration 7\n");

        let line = format_line(Role::Producer, 2, &Event::NoMoreJobsToGenerate);
        assert_eq!(line, "Producer(2): No more jobs to generate.\n");
    }

    #[test]
    fn test_consumer_lines() {
        let line = format_line(Role::Consumer, 1, &Event::Executing { id: 1, duration: 4 });
        assert_eq!(line, "Consumer(1): job id 1 executing sleep duration 4\n");

        let line = format_line(Role::Consumer, 1, &Event::Completed { id: 1 });
        assert_eq!(line, "Consumer(1): job id 1 completed\n");

        let line = format_line(Role::Consumer, 3, &Event::NoMoreJobsLeft);
        assert_eq!(line, "Consumer(3): No more jobs left.\n");
    }

    #[test]
    fn test_terminal_events() {
        assert!(Event::NoMoreJobsLeft.is_terminal());
        assert!(Event::NoMoreJobsToGenerate.is_terminal());
        assert!(!Event::Completed { id: 1 }.is_terminal());
    }

    #[test]
    fn test_recording_reporter_filters_by_worker() {
        let reporter = RecordingReporter::default();
        reporter.report(Role::Producer, 1, Event::NoMoreJobsToGenerate);
        reporter.report(Role::Consumer, 1, Event::NoMoreJobsLeft);
        reporter.report(Role::Producer, 2, Event::NoMoreJobsToGenerate);

        assert_eq!(reporter.events().len(), 3);
        assert_eq!(
            reporter.events_for(Role::Consumer, 1),
            vec![Event::NoMoreJobsLeft]
        );
    }
}
