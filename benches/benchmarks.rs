//! Performance benchmarks for Versionkeep.
//!
//! This module contains benchmarks for:
//! - Copy plan preparation over trees of varying size
//! - Ignore pattern matching
//! - Version name ordering
//! - Copy jobs in dry-run mode
//!
//! Run with: `cargo bench`

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use versionkeep::catalog::{compare_versions, sort_descending};
use versionkeep::transfer::{
    split_patterns, CancelToken, CopyJob, CopyOptions, CopyPlan, IgnoreList, NullSink,
};

// ============================================================================
// Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    pub const DEFAULT_PATTERNS: &str =
        "*.blend1, *.blend2, *.blend3, __pycache__, desktop.ini, .DS_Store, Thumbs.db";

    /// Build a config-folder-like tree with `files` files spread over
    /// add-on folders, with some backup files and caches mixed in.
    pub fn build_tree(root: &Path, files: usize) {
        for i in 0..files {
            let addon = root.join("scripts").join("addons").join(format!("addon_{}", i % 20));
            let dir = if i % 7 == 0 { addon.join("__pycache__") } else { addon };
            fs::create_dir_all(&dir).unwrap();

            let name = match i % 5 {
                0 => format!("module_{i}.py"),
                1 => format!("scene_{i}.blend1"),
                2 => format!("data_{i}.json"),
                3 => format!("icon_{i}.png"),
                _ => format!("notes_{i}.txt"),
            };
            fs::write(dir.join(name), b"0123456789").unwrap();
        }
        fs::create_dir_all(root.join("config")).unwrap();
        fs::write(root.join("config").join("userpref.blend"), b"prefs").unwrap();
    }

    /// Version names in no particular order.
    pub fn version_names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{}.{}.{}", 2 + i % 3, (i * 7) % 10, i % 4)).collect()
    }

    /// File names to test against ignore patterns.
    pub fn file_names() -> Vec<&'static str> {
        vec![
            "userpref.blend",
            "userpref.blend1",
            "startup.blend2",
            "__pycache__",
            "__init__.py",
            "Thumbs.db",
            "recent-files.txt",
            "bookmarks.txt",
        ]
    }
}

// ============================================================================
// Copy Plan Benchmarks
// ============================================================================

fn bench_prepare_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan/prepare");
    let ignore = IgnoreList::new(split_patterns(fixtures::DEFAULT_PATTERNS));

    for files in [100, 1000, 5000].iter() {
        let temp = tempfile::TempDir::new().unwrap();
        let source = temp.path().join("4.2");
        fixtures::build_tree(&source, *files);
        let destination = temp.path().join("backup");

        group.throughput(Throughput::Elements(*files as u64));
        group.bench_with_input(BenchmarkId::new("files", files), files, |b, _| {
            b.iter(|| {
                let plan = CopyPlan::prepare(black_box(&source), &destination, &ignore).unwrap();
                black_box(plan.total())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Ignore Matching Benchmarks
// ============================================================================

fn bench_ignore_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("ignore");

    group.bench_function("build_default", |b| {
        b.iter(|| IgnoreList::new(split_patterns(black_box(fixtures::DEFAULT_PATTERNS))));
    });

    let ignore = IgnoreList::new(split_patterns(fixtures::DEFAULT_PATTERNS));
    let names = fixtures::file_names();
    group.throughput(Throughput::Elements(names.len() as u64));
    group.bench_function("match_names", |b| {
        b.iter(|| names.iter().filter(|name| ignore.matches(black_box(name))).count());
    });

    group.finish();
}

// ============================================================================
// Version Ordering Benchmarks
// ============================================================================

fn bench_version_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("versions");

    group.bench_function("compare", |b| {
        b.iter(|| compare_versions(black_box("4.10.2"), black_box("4.9.15")));
    });

    for count in [10, 100, 1000].iter() {
        let names = fixtures::version_names(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("sort_descending", count), &names, |b, names| {
            b.iter(|| {
                let mut names = names.clone();
                sort_descending(&mut names);
                names
            });
        });
    }

    group.finish();
}

// ============================================================================
// Copy Job Benchmarks
// ============================================================================

fn bench_dry_run_job(c: &mut Criterion) {
    let mut group = c.benchmark_group("job/dry_run");

    let temp = tempfile::TempDir::new().unwrap();
    let source = temp.path().join("4.2");
    fixtures::build_tree(&source, 1000);
    let destination = temp.path().join("backup");
    let plan = CopyPlan::prepare(&source, &destination, &IgnoreList::empty()).unwrap();

    for chunk_size in [1, 8, 64].iter() {
        group.bench_with_input(BenchmarkId::new("chunk", chunk_size), chunk_size, |b, &chunk| {
            b.iter(|| {
                let options = CopyOptions { chunk_size: chunk, dry_run: true };
                let mut job = CopyJob::new("bench", plan.clone(), options, CancelToken::new());
                while !job.tick(&mut NullSink).is_terminal() {}
                black_box(job.copied())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_prepare_plan,
    bench_ignore_matching,
    bench_version_ordering,
    bench_dry_run_job,
);
criterion_main!(benches);
