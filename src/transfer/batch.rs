//! Batch backup and restore across every version folder.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ignore::{IgnoreList, IgnoreRules};
use super::job::{clean_destination, CopyJob, CopyOptions, JobState};
use super::plan::CopyPlan;
use super::progress::{CancelToken, OperationReport, Outcome, Progress, ProgressSink};
use crate::catalog::{discover_versions, sort_descending};

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Backup,
    Restore,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Backup => write!(f, "Backup"),
            TransferKind::Restore => write!(f, "Restore"),
        }
    }
}

/// One version folder to transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: TransferKind,
    pub version: String,
}

impl BatchItem {
    /// Label used in progress messages and report lines.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.version)
    }

    /// One item per version folder under `from_root`, newest first.
    pub fn discover(kind: TransferKind, from_root: &Path, to_root: &Path) -> Vec<Self> {
        let mut names: Vec<String> =
            discover_versions(from_root).into_iter().map(|(name, _)| name).collect();
        sort_descending(&mut names);

        names
            .into_iter()
            .map(|version| Self {
                source: from_root.join(&version),
                destination: to_root.join(&version),
                kind,
                version,
            })
            .collect()
    }
}

/// Settings shared by every item of a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub copy: CopyOptions,
    /// Delete each backup destination before copying into it
    pub clean_before_backup: bool,
}

/// Runs a [`CopyJob`] per item, strictly in order, one tick at a time.
#[derive(Debug)]
pub struct BatchJob {
    title: String,
    items: VecDeque<BatchItem>,
    item_count: usize,
    current: Option<CopyJob>,
    ignore: IgnoreRules,
    options: BatchOptions,
    cancel: CancelToken,
    state: JobState,
    lines: Vec<String>,
}

impl BatchJob {
    pub fn new(
        title: impl Into<String>,
        items: Vec<BatchItem>,
        ignore: IgnoreRules,
        options: BatchOptions,
        cancel: CancelToken,
    ) -> Self {
        Self {
            title: title.into(),
            item_count: items.len(),
            items: items.into(),
            current: None,
            ignore,
            options,
            cancel,
            state: JobState::Idle,
            lines: Vec::new(),
        }
    }

    /// Advance the batch by one step.
    ///
    /// A step either prepares the next item or ticks the running item's job.
    pub fn tick(&mut self, sink: &mut dyn ProgressSink) -> JobState {
        if self.state.is_terminal() {
            return self.state;
        }

        if self.cancel.is_cancelled() {
            if let Some(mut job) = self.current.take() {
                job.tick(sink);
                self.lines.push(job.summary());
            } else {
                sink.publish(&Progress {
                    message: "Cancelled".to_string(),
                    processed: self.item_count - self.items.len(),
                    total: self.item_count,
                });
            }
            self.state = JobState::Cancelled;
            tracing::info!("{} cancelled", self.title);
            return self.state;
        }

        if let Some(job) = self.current.as_mut() {
            if job.tick(sink).is_terminal() {
                self.lines.push(job.summary());
                self.current = None;
            }
            return self.state;
        }

        match self.items.pop_front() {
            Some(item) => {
                self.state = JobState::Running;
                self.start_item(&item, sink);
            }
            None if self.state == JobState::Finalizing => {
                self.state = JobState::Finished;
                tracing::info!("{} finished, {} item(s)", self.title, self.lines.len());
            }
            None => self.state = JobState::Finalizing,
        }

        self.state
    }

    fn start_item(&mut self, item: &BatchItem, sink: &mut dyn ProgressSink) {
        let label = item.label();
        let position = self.item_count - self.items.len();
        tracing::info!("[{}/{}] {}", position, self.item_count, label);

        let plan =
            match CopyPlan::prepare(&item.source, &item.destination, self.ignore_for(item.kind)) {
                Ok(plan) => plan,
                Err(e) => {
                    tracing::warn!("{}: {}", label, e);
                    self.skip(&label, &e.to_string(), sink);
                    return;
                }
            };

        if item.kind == TransferKind::Backup && self.options.clean_before_backup {
            clean_destination(&item.source, &item.destination, self.options.copy.dry_run);
        }

        if plan.is_empty() {
            self.skip(&label, "no files to copy", sink);
            return;
        }

        self.current = Some(CopyJob::new(label, plan, self.options.copy, self.cancel.clone()));
    }

    fn skip(&mut self, label: &str, reason: &str, sink: &mut dyn ProgressSink) {
        let line = format!("{}: skipped, {}", label, reason);
        tracing::info!("{}", line);
        self.lines.push(line);
        sink.publish(&Progress { message: format!("{}: skipped", label), processed: 0, total: 0 });
    }

    fn ignore_for(&self, kind: TransferKind) -> &IgnoreList {
        match kind {
            TransferKind::Backup => &self.ignore.backup,
            TransferKind::Restore => &self.ignore.restore,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Report lines gathered so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Items not started yet.
    pub fn pending(&self) -> usize {
        self.items.len()
    }

    /// Consolidated report. Only meaningful once the batch is terminal.
    pub fn report(&self) -> OperationReport {
        OperationReport {
            title: self.title.clone(),
            outcome: self.state.outcome().unwrap_or(Outcome::Cancelled),
            lines: self.lines.clone(),
        }
    }
}
