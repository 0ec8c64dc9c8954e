//! Application state and operation setup.
//!
//! The `App` struct holds the loaded configuration, the discovered version
//! lists and the cancel token shared by every operation it builds. It knows
//! where things live; the transfer module knows how to move them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::catalog::{PathStats, VersionCatalog};
use crate::core::paths::is_folder_name;
use crate::core::{Config, KeepError, KeepResult};
use crate::transfer::{
    clean_destination, remove_tree, run_to_completion, BatchItem, BatchJob, BatchOptions,
    CancelToken, CopyJob, CopyOptions, CopyPlan, IgnoreRules, OperationReport, ProgressSink,
    TransferKind,
};

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Application configuration
    pub config: Config,

    /// Version lists and folder stats
    pub catalog: VersionCatalog,

    /// Ignore lists built from the configuration
    pub ignore: IgnoreRules,

    /// Abort flag polled by running operations
    pub cancel: CancelToken,
}

/// A version folder with its age and size, as listed to the user.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub name: String,
    pub paths: Vec<PathBuf>,
    pub file_count: usize,
    pub size_bytes: u64,
    /// Newest modification time, RFC 3339
    pub modified: Option<String>,
    #[serde(skip)]
    pub stats: PathStats,
}

impl App {
    /// Create the application state from a configuration.
    pub fn new(config: Config) -> Self {
        let ignore = IgnoreRules::from_config(&config);
        Self { config, catalog: VersionCatalog::new(), ignore, cancel: CancelToken::new() }
    }

    /// Load configuration from `path`, or from the default locations.
    pub fn load(path: Option<&Path>) -> KeepResult<Self> {
        let config = match path {
            Some(path) => Config::load_from_file(path)?,
            None => Config::load()?,
        };
        Ok(Self::new(config))
    }

    /// Rebuild the ignore lists after the configuration changed.
    pub fn reload_ignore_rules(&mut self) {
        self.ignore = IgnoreRules::from_config(&self.config);
    }

    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            chunk_size: self.config.transfer.chunk_size.max(1),
            dry_run: self.config.general.dry_run,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.transfer.tick_interval_ms)
    }

    fn pick_version(
        requested: Option<&str>,
        newest: Option<&str>,
        root: &Path,
    ) -> KeepResult<String> {
        let version = requested
            .or(newest)
            .map(str::to_string)
            .ok_or_else(|| KeepError::NoVersions(root.to_path_buf()))?;
        check_name(&version)?;
        Ok(version)
    }

    /// Build a job copying a source version into the backup folder.
    ///
    /// Without `version` the newest source version is used. `target_name`
    /// stores the backup under a different version name.
    pub fn backup_job(
        &mut self,
        version: Option<&str>,
        target_name: Option<&str>,
    ) -> KeepResult<CopyJob> {
        let source_root = self.config.source_root();
        self.catalog.refresh_source(&source_root);
        let version = Self::pick_version(version, self.catalog.newest_source(), &source_root)?;
        let target = check_name(target_name.unwrap_or(&version))?;

        let source = source_root.join(&version);
        let destination = self.config.backup_dir().join(target);

        // Validate before deleting anything.
        let plan = CopyPlan::prepare(&source, &destination, &self.ignore.backup)?;
        if self.config.general.clean_before_copy {
            clean_destination(&source, &destination, self.config.general.dry_run);
        }

        Ok(CopyJob::new(
            format!("{} {}", TransferKind::Backup, version),
            plan,
            self.copy_options(),
            self.cancel.clone(),
        ))
    }

    /// Build a job copying a backed-up version back into the source root.
    ///
    /// Without `version` the newest backup is used. `into` restores into a
    /// different version folder.
    pub fn restore_job(&mut self, version: Option<&str>, into: Option<&str>) -> KeepResult<CopyJob> {
        let backup_dir = self.config.backup_dir();
        self.catalog.refresh_backups(&[backup_dir.as_path()]);
        let version = Self::pick_version(version, self.catalog.newest_backup(), &backup_dir)?;
        let target = check_name(into.unwrap_or(&version))?;

        let source = backup_dir.join(&version);
        let destination = self.config.source_root().join(target);
        let plan = CopyPlan::prepare(&source, &destination, &self.ignore.restore)?;

        Ok(CopyJob::new(
            format!("{} {}", TransferKind::Restore, version),
            plan,
            self.copy_options(),
            self.cancel.clone(),
        ))
    }

    /// Build a batch over every version folder on the sending side.
    pub fn batch_job(&mut self, kind: TransferKind) -> KeepResult<BatchJob> {
        let (from_root, to_root) = match kind {
            TransferKind::Backup => (self.config.source_root(), self.config.backup_dir()),
            TransferKind::Restore => (self.config.backup_dir(), self.config.source_root()),
        };

        let items = BatchItem::discover(kind, &from_root, &to_root);
        if items.is_empty() {
            return Err(KeepError::NoVersions(from_root));
        }

        let title = match kind {
            TransferKind::Backup => "Batch backup",
            TransferKind::Restore => "Batch restore",
        };
        let options = BatchOptions {
            copy: self.copy_options(),
            clean_before_backup: self.config.general.clean_before_copy,
        };

        Ok(BatchJob::new(title, items, self.ignore.clone(), options, self.cancel.clone()))
    }

    /// Run a single copy job to its end and report it.
    pub fn run_job(&self, job: &mut CopyJob, sink: &mut dyn ProgressSink) -> OperationReport {
        let outcome = run_to_completion(job, sink, self.tick_interval());
        OperationReport { title: job.label().to_string(), outcome, lines: vec![job.summary()] }
    }

    /// Run a batch to its end and report it.
    pub fn run_batch(&self, batch: &mut BatchJob, sink: &mut dyn ProgressSink) -> OperationReport {
        run_to_completion(batch, sink, self.tick_interval());
        batch.report()
    }

    /// Delete one backed-up version. In dry-run mode nothing is removed.
    pub fn delete_backup(&mut self, version: &str) -> KeepResult<PathBuf> {
        check_name(version)?;
        let path = self.config.backup_dir().join(version);
        if !path.is_dir() {
            return Err(KeepError::SourceMissing(path));
        }

        if self.config.general.dry_run {
            tracing::info!("[dry run] Would delete {}", path.display());
        } else {
            remove_tree(&path)?;
            tracing::info!("Deleted backup {}", path.display());
        }

        let backup_dir = self.config.backup_dir();
        self.catalog.refresh_backups(&[backup_dir.as_path()]);
        Ok(path)
    }

    /// List versions with their stats.
    ///
    /// `backups` lists the backup side; with `all`, the per-machine and the
    /// shared backup folders are combined per version.
    pub fn version_listing(&mut self, backups: bool, all: bool, refresh: bool) -> Vec<VersionInfo> {
        let roots: Vec<PathBuf> = if !backups {
            vec![self.config.source_root()]
        } else if all {
            vec![self.config.machine_backup_dir(), self.config.shared_backup_dir()]
        } else {
            vec![self.config.backup_dir()]
        };
        let root_refs: Vec<&Path> = roots.iter().map(PathBuf::as_path).collect();

        let versions = if backups {
            self.catalog.refresh_backups(&root_refs).to_vec()
        } else {
            self.catalog.refresh_source(root_refs[0]).to_vec()
        };

        versions
            .into_iter()
            .map(|(name, _)| {
                let paths: Vec<PathBuf> =
                    roots.iter().map(|root| root.join(&name)).filter(|p| p.is_dir()).collect();
                let path_refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
                let stats = if refresh {
                    self.catalog.stats.refresh(&path_refs)
                } else {
                    self.catalog.stats.get_or_scan(&path_refs)
                };

                VersionInfo {
                    name,
                    paths,
                    file_count: stats.file_count,
                    size_bytes: stats.total_bytes,
                    modified: stats
                        .newest_modified
                        .map(|t| chrono::DateTime::<chrono::Local>::from(t).to_rfc3339()),
                    stats,
                }
            })
            .collect()
    }
}

/// Reject names that would point outside a single version folder.
fn check_name(name: &str) -> KeepResult<&str> {
    if is_folder_name(name) {
        Ok(name)
    } else {
        Err(KeepError::InvalidVersionName(name.to_string()))
    }
}
