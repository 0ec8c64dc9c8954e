//! Tick-driven copy job.
//!
//! A [`CopyJob`] copies a bounded chunk of files per [`CopyJob::tick`] and
//! returns control to its caller in between, so whatever drives it (a
//! timer, a terminal loop, a test) stays responsive. States move strictly
//! forward:
//!
//! ```text
//! Idle -> Running -> Finalizing -> Finished
//!   \________\___________\______-> Cancelled
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::fsops::{copy_entry, remove_tree};
use crate::core::paths::normalize;
use super::plan::{CopyPlan, PendingCopy};
use super::progress::{CancelToken, Outcome, Progress, ProgressSink};

/// Lifecycle of a copy job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, no tick yet
    Idle,
    /// Files remain in the plan
    Running,
    /// Plan exhausted, finishing on the next tick
    Finalizing,
    /// Every file was handled
    Finished,
    /// Stopped on request before the plan was exhausted
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Cancelled)
    }

    /// Final outcome, once terminal.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            JobState::Finished => Some(Outcome::Finished),
            JobState::Cancelled => Some(Outcome::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Idle => write!(f, "idle"),
            JobState::Running => write!(f, "running"),
            JobState::Finalizing => write!(f, "finalizing"),
            JobState::Finished => write!(f, "finished"),
            JobState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Tuning for a copy job.
#[derive(Debug, Clone, Copy)]
pub struct CopyOptions {
    /// Files copied per tick (at least one)
    pub chunk_size: usize,
    /// Run the full flow without touching the filesystem
    pub dry_run: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self { chunk_size: 8, dry_run: false }
    }
}

/// A file that could not be copied.
#[derive(Debug, Clone)]
pub struct CopyFailure {
    pub source: PathBuf,
    pub error: String,
}

/// Copies the files of a [`CopyPlan`] a chunk at a time.
#[derive(Debug)]
pub struct CopyJob {
    label: String,
    plan: CopyPlan,
    options: CopyOptions,
    cancel: CancelToken,
    state: JobState,
    progress: Progress,
    bytes: u64,
    failures: Vec<CopyFailure>,
}

impl CopyJob {
    pub fn new(
        label: impl Into<String>,
        plan: CopyPlan,
        options: CopyOptions,
        cancel: CancelToken,
    ) -> Self {
        let label = label.into();
        let progress = Progress { message: label.clone(), processed: 0, total: plan.total() };
        Self {
            label,
            plan,
            options,
            cancel,
            state: JobState::Idle,
            progress,
            bytes: 0,
            failures: Vec::new(),
        }
    }

    /// Advance the job by one step and publish the resulting progress.
    ///
    /// Ticking a terminal job is a no-op.
    pub fn tick(&mut self, sink: &mut dyn ProgressSink) -> JobState {
        if self.state.is_terminal() {
            return self.state;
        }

        if self.cancel.is_cancelled() {
            self.state = JobState::Cancelled;
            self.progress.message = "Cancelled".to_string();
            tracing::info!(
                "{} cancelled after {} of {} files",
                self.label,
                self.progress.processed,
                self.progress.total
            );
            sink.publish(&self.progress);
            return self.state;
        }

        match self.state {
            JobState::Idle => {
                tracing::info!(
                    "{}: {} file(s) to copy{}",
                    self.label,
                    self.progress.total,
                    if self.options.dry_run { " (dry run)" } else { "" }
                );
                self.progress.message = format!("{}: starting", self.label);
                self.state =
                    if self.plan.is_empty() { JobState::Finalizing } else { JobState::Running };
            }
            JobState::Running => {
                for _ in 0..self.options.chunk_size.max(1) {
                    let Some(pending) = self.plan.pop() else {
                        break;
                    };
                    self.copy_one(&pending);
                    self.progress.processed += 1;
                }
                self.progress.message = format!(
                    "{}: {} / {} files",
                    self.label, self.progress.processed, self.progress.total
                );
                if self.plan.is_empty() {
                    self.state = JobState::Finalizing;
                }
            }
            JobState::Finalizing => {
                self.state = JobState::Finished;
                self.progress.message = format!("{}: finished", self.label);
                tracing::info!("{}", self.summary());
            }
            JobState::Finished | JobState::Cancelled => {}
        }

        sink.publish(&self.progress);
        self.state
    }

    fn copy_one(&mut self, pending: &PendingCopy) {
        if self.options.dry_run {
            tracing::debug!(
                "[dry run] Would copy {} -> {}",
                pending.source.display(),
                pending.destination.display()
            );
            // Links are recreated, not copied, and count as zero bytes.
            self.bytes += fs::symlink_metadata(&pending.source)
                .map(|m| if m.file_type().is_symlink() { 0 } else { m.len() })
                .unwrap_or(0);
            return;
        }

        match copy_entry(&pending.source, &pending.destination) {
            Ok(bytes) => {
                tracing::debug!(
                    "Copied {} -> {}",
                    pending.source.display(),
                    pending.destination.display()
                );
                self.bytes += bytes;
            }
            Err(e) => {
                tracing::warn!("Failed to copy {}: {}", pending.source.display(), e);
                self.failures
                    .push(CopyFailure { source: pending.source.clone(), error: e.to_string() });
            }
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn failures(&self) -> &[CopyFailure] {
        &self.failures
    }

    /// Bytes copied, or that would have been copied in dry-run mode.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Files copied without error.
    pub fn copied(&self) -> usize {
        self.progress.processed - self.failures.len()
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// One report line describing where the job stands.
    pub fn summary(&self) -> String {
        let dry = if self.options.dry_run { " [dry run]" } else { "" };
        match self.state {
            JobState::Cancelled => format!(
                "{}: cancelled after {} of {} files{}",
                self.label, self.progress.processed, self.progress.total, dry
            ),
            _ => {
                let failed = if self.failures.is_empty() {
                    String::new()
                } else {
                    format!(", {} failed", self.failures.len())
                };
                format!(
                    "{}: {} of {} files copied{}{}",
                    self.label,
                    self.copied(),
                    self.progress.total,
                    failed,
                    dry
                )
            }
        }
    }
}

/// Delete a destination tree ahead of a backup.
///
/// Failures are logged and the caller carries on without a clean slate.
/// A destination that is the source, or contains it, is never deleted.
/// Returns whether the folder is gone (or would be, in dry-run mode).
pub fn clean_destination(source: &Path, path: &Path, dry_run: bool) -> bool {
    if !path.exists() {
        return true;
    }
    if normalize(source).starts_with(normalize(path)) {
        tracing::warn!(
            "Not cleaning {}: it holds the source {}",
            path.display(),
            source.display()
        );
        return false;
    }
    if dry_run {
        tracing::info!("[dry run] Would delete {}", path.display());
        return true;
    }
    match remove_tree(path) {
        Ok(()) => {
            tracing::info!("Deleted {}", path.display());
            true
        }
        Err(e) => {
            tracing::warn!("Could not clean {}: {}", path.display(), e);
            false
        }
    }
}
