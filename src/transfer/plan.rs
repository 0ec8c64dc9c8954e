//! Building the list of files a copy job will transfer.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ignore::IgnoreList;
use crate::core::paths::normalize;
use crate::core::{KeepError, KeepResult};

/// One file waiting to be copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Ordered list of pending copies, consumed from the front.
#[derive(Debug, Clone, Default)]
pub struct CopyPlan {
    entries: VecDeque<PendingCopy>,
    total: usize,
}

impl CopyPlan {
    /// Create a plan from already computed pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = PendingCopy>) -> Self {
        let entries: VecDeque<_> = entries.into_iter().collect();
        let total = entries.len();
        Self { entries, total }
    }

    /// Walk `source_root` and mirror every kept file under `destination_root`.
    ///
    /// Folders matching `ignore` are pruned before descending, so nothing
    /// beneath them is listed. Pairs whose source and destination are the
    /// same file are dropped.
    pub fn prepare(
        source_root: &Path,
        destination_root: &Path,
        ignore: &IgnoreList,
    ) -> KeepResult<Self> {
        if !source_root.exists() {
            return Err(KeepError::SourceMissing(source_root.to_path_buf()));
        }
        if !source_root.is_dir() {
            return Err(KeepError::NotADirectory(source_root.to_path_buf()));
        }

        let canonical_source = normalize(source_root);
        let canonical_destination = normalize(destination_root);

        let walker = WalkDir::new(source_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !ignore.matches(&e.file_name().to_string_lossy()));

        let mut entries = VecDeque::new();
        let mut self_copies = 0usize;

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(source_root) else {
                continue;
            };

            if canonical_source.join(relative) == canonical_destination.join(relative) {
                self_copies += 1;
                continue;
            }

            entries.push_back(PendingCopy {
                source: entry.path().to_path_buf(),
                destination: destination_root.join(relative),
            });
        }

        if self_copies > 0 {
            tracing::warn!(
                "Skipped {} file(s) whose destination is the source itself ({})",
                self_copies,
                source_root.display()
            );
        }

        tracing::debug!(
            "Prepared {} file(s) from {} to {}",
            entries.len(),
            source_root.display(),
            destination_root.display()
        );

        Ok(Self::from_entries(entries))
    }

    /// Number of files the plan started with.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of files still waiting.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the next pending copy.
    pub fn pop(&mut self) -> Option<PendingCopy> {
        self.entries.pop_front()
    }

    /// Pending copies in copy order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingCopy> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn tree(root: &Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, file).unwrap();
        }
    }

    fn relative_destinations(plan: &CopyPlan, root: &Path) -> Vec<String> {
        plan.iter()
            .map(|p| {
                p.destination.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_mirrors_relative_paths() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        tree(&src, &["a.txt", "config/userpref.blend", "scripts/addons/x/__init__.py"]);

        let plan = CopyPlan::prepare(&src, &dst, &IgnoreList::empty()).unwrap();

        assert_eq!(plan.total(), 3);
        assert_eq!(
            relative_destinations(&plan, &dst),
            vec!["a.txt", "config/userpref.blend", "scripts/addons/x/__init__.py"]
        );
        assert!(plan.iter().all(|p| p.source.starts_with(&src)));
    }

    #[test]
    fn test_prunes_ignored_folders_recursively() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        tree(
            &src,
            &["keep.txt", "cache/a.bin", "cache/nested/b.bin", "scripts/__pycache__/m.pyc"],
        );

        let ignore = IgnoreList::new(["cache", "__pycache__"]);
        let plan = CopyPlan::prepare(&src, &temp.path().join("dst"), &ignore).unwrap();

        assert_eq!(relative_destinations(&plan, &temp.path().join("dst")), vec!["keep.txt"]);
    }

    #[test]
    fn test_skips_ignored_file_names() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        tree(&src, &["scene.blend", "scene.blend1", "sub/desktop.ini"]);

        let ignore = IgnoreList::new(["*.blend1", "desktop.ini"]);
        let plan = CopyPlan::prepare(&src, &temp.path().join("dst"), &ignore).unwrap();

        assert_eq!(plan.total(), 1);
    }

    #[test]
    fn test_root_name_is_never_pruned() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("cache");
        tree(&src, &["a.txt"]);

        let ignore = IgnoreList::new(["cache"]);
        let plan = CopyPlan::prepare(&src, &temp.path().join("dst"), &ignore).unwrap();
        assert_eq!(plan.total(), 1);
    }

    #[test]
    fn test_self_copy_yields_empty_plan() {
        let temp = tempfile::TempDir::new().unwrap();
        let src = temp.path().join("src");
        tree(&src, &["a.txt", "b/c.txt"]);

        let same = temp.path().join("other").join("..").join("src");
        let plan = CopyPlan::prepare(&src, &same, &IgnoreList::empty()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.total(), 0);
    }

    #[test]
    fn test_missing_source() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = CopyPlan::prepare(&temp.path().join("nope"), temp.path(), &IgnoreList::empty())
            .unwrap_err();
        assert!(matches!(err, KeepError::SourceMissing(_)));
    }

    #[test]
    fn test_source_is_a_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = CopyPlan::prepare(&file, temp.path(), &IgnoreList::empty()).unwrap_err();
        assert!(matches!(err, KeepError::NotADirectory(_)));
    }

    #[test]
    fn test_pop_consumes_in_order() {
        let mut plan = CopyPlan::from_entries(vec![
            PendingCopy { source: "a".into(), destination: "x/a".into() },
            PendingCopy { source: "b".into(), destination: "x/b".into() },
        ]);
        assert_eq!(plan.pop().unwrap().source, PathBuf::from("a"));
        assert_eq!(plan.remaining(), 1);
        assert_eq!(plan.total(), 2);
    }
}
