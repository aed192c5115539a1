mod bounded_queue;
mod config;
mod consumer;
mod coordinator;
mod error;
mod job;
mod producer;
mod report;
mod semaphore;

use std::{process::ExitCode, sync::Arc, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{RunConfig, TimingConfig};
use coordinator::Coordinator;
use report::StdoutReporter;

#[derive(Parser, Debug)]
#[command(name = "jobqueue")]
#[command(version)]
#[command(about = "Producers and consumers sharing a bounded job queue")]
struct Args {
    /// Number of slots in the circular queue
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    queue_size: u32,

    /// Jobs each producer generates before stopping
    #[arg(value_parser = clap::value_parser!(u32))]
    jobs_per_producer: u32,

    /// Number of producer threads
    #[arg(value_parser = clap::value_parser!(u32))]
    producers: u32,

    /// Number of consumer threads
    #[arg(value_parser = clap::value_parser!(u32))]
    consumers: u32,

    /// Time units a worker waits on the queue before concluding no more work is coming
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..))]
    deadline: u32,

    /// Length of one time unit in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    unit_ms: u64,

    /// Upper bound of a job's duration, in time units
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    max_duration: u32,

    /// Upper bound of a producer's pause between jobs, in time units (0 disables it)
    #[arg(long, default_value = "5")]
    max_think: u32,
}

impl Args {
    fn run_config(&self) -> RunConfig {
        let timing = TimingConfig::default()
            .with_unit(Duration::from_millis(self.unit_ms))
            .with_deadline(self.deadline)
            .with_max_job_duration(self.max_duration)
            .with_max_think_time(self.max_think);

        RunConfig::new(
            self.queue_size as usize,
            self.jobs_per_producer as usize,
            self.producers as usize,
            self.consumers as usize,
        )
        .with_timing(timing)
    }
}

fn main() -> ExitCode {
    // Bad arguments exit here, before any queue or thread exists.
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let coordinator = Coordinator::new(args.run_config(), Arc::new(StdoutReporter));
    match coordinator.run() {
        Ok(summary) => {
            tracing::info!(
                generated = summary.generated(),
                completed = summary.completed(),
                timed_out_producers = summary.timed_out_producers(),
                remaining = summary.remaining,
                "All workers finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_positional_arguments() {
        let args = Args::try_parse_from(["jobqueue", "3", "5", "2", "1"]).unwrap();
        let config = args.run_config();
        assert_eq!(config.capacity, 3);
        assert_eq!(config.jobs_per_producer, 5);
        assert_eq!(config.producers, 2);
        assert_eq!(config.consumers, 1);
        assert_eq!(config.timing.deadline(), Duration::from_secs(20));
    }

    #[test]
    fn test_parses_timing_flags() {
        let args = Args::try_parse_from([
            "jobqueue",
            "1",
            "1",
            "1",
            "1",
            "--deadline",
            "5",
            "--unit-ms",
            "10",
            "--max-think",
            "0",
        ])
        .unwrap();
        let config = args.run_config();
        assert_eq!(config.timing.deadline(), Duration::from_millis(50));
        assert_eq!(config.timing.max_think_time, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_missing_arguments() {
        assert!(Args::try_parse_from(["jobqueue", "3", "5", "2"]).is_err());
    }

    #[test]
    fn test_rejects_malformed_arguments() {
        assert!(Args::try_parse_from(["jobqueue", "3", "five", "2", "1"]).is_err());
        assert!(Args::try_parse_from(["jobqueue", "3", "5", "-2", "1"]).is_err());
        assert!(Args::try_parse_from(["jobqueue", "0", "5", "2", "1"]).is_err());
    }

    #[test]
    fn test_zero_workers_are_accepted() {
        let args = Args::try_parse_from(["jobqueue", "3", "5", "1", "0"]).unwrap();
        assert_eq!(args.run_config().consumers, 0);
    }
}
