//! # Versionkeep
//!
//! Back up and restore the per-version configuration folders of a 3D
//! content-creation application.
//!
//! The application keeps one folder per version (`4.1`, `4.2`, ...) under its
//! user-config root. Versionkeep mirrors those folders into a backup root and
//! back, skipping files and folders that match ignore patterns.
//!
//! ## Features
//!
//! - **Single or batch**: one version, or every version folder newest first
//! - **Ignore patterns**: glob-style names, plus per-item switches
//! - **Dry run**: the full operation and its progress without touching disk
//! - **Chunked copying**: jobs copy a few files per tick and can be cancelled
//!   between ticks
//! - **Per-machine backups**: optional host-named folder next to a shared one
//!
//! ## Quick Start
//!
//! ```bash
//! # Back up the newest version
//! versionkeep backup
//!
//! # Preview restoring every backed-up version
//! versionkeep --dry-run batch restore
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::use_self)]

pub mod app;
pub mod catalog;
pub mod core;
pub mod display;
pub mod transfer;

// Re-export commonly used types
pub use app::{App, VersionInfo};
pub use catalog::{PathStats, VersionCatalog};
pub use crate::core::{Config, KeepError, KeepResult};
pub use transfer::{
    BatchJob, CancelToken, CopyJob, CopyPlan, IgnoreRules, OperationReport, Outcome, TransferKind,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "versionkeep";
