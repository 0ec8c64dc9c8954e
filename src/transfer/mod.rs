//! Backup and restore transfers.
//!
//! A transfer is planned once ([`CopyPlan`]), then copied a chunk per tick
//! by a [`CopyJob`]; [`BatchJob`] chains one job per version folder. Both
//! only move forward when ticked, see [`run_to_completion`].

mod batch;
mod driver;
mod fsops;
mod ignore;
mod job;
mod plan;
mod progress;

pub use batch::{BatchItem, BatchJob, BatchOptions, TransferKind};
pub use driver::{run_to_completion, Operation};
pub use fsops::{copy_entry, remove_tree};
pub use ignore::{split_patterns, IgnoreList, IgnoreRules};
pub use job::{clean_destination, CopyFailure, CopyJob, CopyOptions, JobState};
pub use plan::{CopyPlan, PendingCopy};
pub use progress::{
    CancelToken, NullSink, OperationReport, Outcome, Progress, ProgressSink, RecordingSink,
};
