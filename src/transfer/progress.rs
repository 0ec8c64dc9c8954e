//! Progress publishing and cooperative cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Snapshot of a running operation, published after every tick.
///
/// Owned by the job; display layers only receive copies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    /// Human readable status line
    pub message: String,
    /// Files handled so far, failed ones included
    pub processed: usize,
    /// Files in the plan
    pub total: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`. An empty plan counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    /// Completed percentage, rounded down.
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).floor().clamp(0.0, 100.0) as u8
    }
}

/// Receiver of progress updates.
pub trait ProgressSink {
    fn publish(&mut self, progress: &Progress);
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn publish(&mut self, _progress: &Progress) {}
}

/// Sink that keeps every update, mostly useful in tests and reports.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub updates: Vec<Progress>,
}

impl ProgressSink for RecordingSink {
    fn publish(&mut self, progress: &Progress) {
        self.updates.push(progress.clone());
    }
}

impl RecordingSink {
    /// Processed counts in publication order.
    pub fn processed_sequence(&self) -> Vec<usize> {
        self.updates.iter().map(|p| p.processed).collect()
    }
}

/// Shared abort flag, polled once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the running operation to stop before its next chunk.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How an operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Finished => write!(f, "Finished"),
            Outcome::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Consolidated end-of-operation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    pub title: String,
    pub outcome: Outcome,
    /// One line per item, in processing order
    pub lines: Vec<String>,
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} - {}", self.title, self.outcome)?;
        for line in &self.lines {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
