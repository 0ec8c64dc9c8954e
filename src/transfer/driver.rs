//! Drives tick-based operations from a plain loop.
//!
//! Jobs never block for longer than one chunk, so any scheduler can drive
//! them; this is the one used by the command line.

use std::thread;
use std::time::Duration;

use super::batch::BatchJob;
use super::job::{CopyJob, JobState};
use super::progress::{Outcome, ProgressSink};

/// Something that advances one bounded step per call.
pub trait Operation {
    fn tick(&mut self, sink: &mut dyn ProgressSink) -> JobState;
}

impl Operation for CopyJob {
    fn tick(&mut self, sink: &mut dyn ProgressSink) -> JobState {
        CopyJob::tick(self, sink)
    }
}

impl Operation for BatchJob {
    fn tick(&mut self, sink: &mut dyn ProgressSink) -> JobState {
        BatchJob::tick(self, sink)
    }
}

/// Tick `operation` until it finishes or is cancelled, pausing `interval`
/// between ticks.
pub fn run_to_completion<O>(
    operation: &mut O,
    sink: &mut dyn ProgressSink,
    interval: Duration,
) -> Outcome
where
    O: Operation + ?Sized,
{
    let mut ticks = 0u64;
    loop {
        let state = operation.tick(sink);
        ticks += 1;
        if let Some(outcome) = state.outcome() {
            tracing::debug!("Operation {} after {} tick(s)", outcome, ticks);
            return outcome;
        }
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
}
