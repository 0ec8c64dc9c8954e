//! Age and size of version folders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

/// Aggregate figures for every file beneath one or more folders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathStats {
    /// Most recent modification time of any file
    pub newest_modified: Option<SystemTime>,
    /// Sum of file sizes in bytes
    pub total_bytes: u64,
    pub file_count: usize,
}

impl PathStats {
    /// Scan one folder. A missing folder yields empty stats.
    pub fn scan(root: &Path) -> Self {
        let mut stats = Self::default();

        for entry in WalkDir::new(root).follow_links(false).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            stats.file_count += 1;
            stats.total_bytes += metadata.len();
            if let Ok(modified) = metadata.modified() {
                stats.newest_modified = stats.newest_modified.max(Some(modified));
            }
        }

        stats
    }

    /// Scan several folders holding the same version (for example the
    /// per-machine and the shared backup) and combine the results.
    pub fn scan_combined(roots: &[&Path]) -> Self {
        roots.iter().map(|root| Self::scan(root)).fold(Self::default(), Self::combine)
    }

    /// Sum sizes and counts, keep the newest modification time.
    pub fn combine(self, other: Self) -> Self {
        Self {
            newest_modified: self.newest_modified.max(other.newest_modified),
            total_bytes: self.total_bytes + other.total_bytes,
            file_count: self.file_count + other.file_count,
        }
    }
}

/// Path-keyed cache so repeated listings do not rescan unchanged folders.
///
/// Entries are only ever replaced by a fresh scan.
#[derive(Debug, Default)]
pub struct StatsCache {
    entries: HashMap<Vec<PathBuf>, PathStats>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached stats for `roots`, scanning on first use.
    pub fn get_or_scan(&mut self, roots: &[&Path]) -> PathStats {
        let key = Self::key(roots);
        *self.entries.entry(key).or_insert_with(|| PathStats::scan_combined(roots))
    }

    /// Rescan `roots` and replace the cached entry.
    pub fn refresh(&mut self, roots: &[&Path]) -> PathStats {
        let stats = PathStats::scan_combined(roots);
        self.entries.insert(Self::key(roots), stats);
        stats
    }

    /// Cached stats without scanning.
    pub fn get(&self, roots: &[&Path]) -> Option<PathStats> {
        self.entries.get(&Self::key(roots)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(roots: &[&Path]) -> Vec<PathBuf> {
        roots.iter().map(|root| root.to_path_buf()).collect()
    }
}
