//! Version folder discovery.
//!
//! A version folder is any immediate sub-folder of a root, conventionally
//! named after an application version (`3.6`, `4.2`, ...).

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use super::stats::StatsCache;

/// A discovered version as an `(id, label)` pair; both are the folder name.
pub type VersionPair = (String, String);

/// List the immediate sub-folders of `root`, in ascending version order.
///
/// A missing or unreadable root yields an empty list.
pub fn discover_versions(root: &Path) -> Vec<VersionPair> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list versions in {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    names.sort_by(|a, b| compare_versions(a, b));
    names.into_iter().map(|name| (name.clone(), name)).collect()
}

/// Order version names, comparing dot-separated numeric parts as numbers.
///
/// `3.10` sorts after `3.9`; non-numeric parts fall back to text order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = compare_part(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_part(left: &str, right: &str) -> Ordering {
    let (left_num, left_rest) = split_numeric(left);
    let (right_num, right_rest) = split_numeric(right);

    match (left_num, right_num) {
        (Some(l), Some(r)) => l.cmp(&r).then_with(|| left_rest.cmp(right_rest)),
        _ => left.cmp(right),
    }
}

fn split_numeric(part: &str) -> (Option<u64>, &str) {
    let digits = part.bytes().take_while(u8::is_ascii_digit).count();
    (part[..digits].parse().ok(), &part[digits..])
}

/// Sort version names newest first.
pub fn sort_descending(names: &mut [String]) {
    names.sort_by(|a, b| compare_versions(b, a));
}

/// Version lists for the source and backup sides, plus the stats cache
/// used when listing them.
#[derive(Debug, Default)]
pub struct VersionCatalog {
    pub source_versions: Vec<VersionPair>,
    pub backup_versions: Vec<VersionPair>,
    pub stats: StatsCache,
}

impl VersionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rediscover the versions present under the source root.
    pub fn refresh_source(&mut self, root: &Path) -> &[VersionPair] {
        self.source_versions = discover_versions(root);
        &self.source_versions
    }

    /// Rediscover the versions present in one or more backup folders.
    ///
    /// Names found in several folders are listed once.
    pub fn refresh_backups(&mut self, roots: &[&Path]) -> &[VersionPair] {
        let mut names: Vec<String> =
            roots.iter().flat_map(|root| discover_versions(root)).map(|(name, _)| name).collect();
        // Tie-break on the raw text so equal-comparing spellings stay adjacent.
        names.sort_by(|a, b| compare_versions(a, b).then_with(|| a.cmp(b)));
        names.dedup();
        self.backup_versions = names.into_iter().map(|name| (name.clone(), name)).collect();
        &self.backup_versions
    }

    /// Newest version found at the source.
    pub fn newest_source(&self) -> Option<&str> {
        self.source_versions.last().map(|(name, _)| name.as_str())
    }

    /// Newest version found in the backups.
    pub fn newest_backup(&self) -> Option<&str> {
        self.backup_versions.last().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_lists_only_folders() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir(temp.path().join("3.0")).unwrap();
        fs::create_dir(temp.path().join("2.9")).unwrap();
        fs::create_dir(temp.path().join("3.1")).unwrap();
        fs::write(temp.path().join("notes.txt"), "x").unwrap();

        let versions = discover_versions(temp.path());
        assert_eq!(
            versions,
            vec![
                ("2.9".to_string(), "2.9".to_string()),
                ("3.0".to_string(), "3.0".to_string()),
                ("3.1".to_string(), "3.1".to_string()),
            ]
        );
    }

    #[test]
    fn test_discover_does_not_recurse() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("4.0").join("config")).unwrap();
        assert_eq!(discover_versions(temp.path()).len(), 1);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(discover_versions(&temp.path().join("missing")).is_empty());
    }

    #[test]
    fn test_numeric_aware_ordering() {
        assert_eq!(compare_versions("3.10", "3.9"), Ordering::Greater);
        assert_eq!(compare_versions("4.0", "4.0"), Ordering::Equal);
        assert_eq!(compare_versions("4.0", "4.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2.93", "3.0"), Ordering::Less);
        assert_eq!(compare_versions("4.2a", "4.2"), Ordering::Greater);
    }

    #[test]
    fn test_sort_descending() {
        let mut names = vec!["3.0".to_string(), "2.9".to_string(), "3.1".to_string()];
        sort_descending(&mut names);
        assert_eq!(names, vec!["3.1", "3.0", "2.9"]);
    }

    #[test]
    fn test_catalog_merges_backup_folders() {
        let temp = tempfile::TempDir::new().unwrap();
        let machine = temp.path().join("pc");
        let shared = temp.path().join("shared");
        fs::create_dir_all(machine.join("4.1")).unwrap();
        fs::create_dir_all(machine.join("4.2")).unwrap();
        fs::create_dir_all(shared.join("4.2")).unwrap();
        fs::create_dir_all(shared.join("3.6")).unwrap();

        let mut catalog = VersionCatalog::new();
        let names: Vec<_> = catalog
            .refresh_backups(&[machine.as_path(), shared.as_path()])
            .iter()
            .map(|(name, _)| name.clone())
            .collect();

        assert_eq!(names, vec!["3.6", "4.1", "4.2"]);
        assert_eq!(catalog.newest_backup(), Some("4.2"));
        assert_eq!(catalog.newest_source(), None);
    }

    #[test]
    fn test_merge_dedups_equal_comparing_names() {
        let temp = tempfile::TempDir::new().unwrap();
        let machine = temp.path().join("pc");
        let shared = temp.path().join("shared");
        for dir in [machine.join("4.0"), machine.join("4.00"), shared.join("4.0")] {
            fs::create_dir_all(dir).unwrap();
        }
        fs::create_dir_all(shared.join("4.00")).unwrap();

        let mut catalog = VersionCatalog::new();
        let names: Vec<_> = catalog
            .refresh_backups(&[machine.as_path(), shared.as_path()])
            .iter()
            .map(|(name, _)| name.clone())
            .collect();

        assert_eq!(names, vec!["4.0", "4.00"]);
    }
}
