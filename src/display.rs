//! Terminal output: the live progress line and human-readable figures.

use std::io::{self, IsTerminal, Stderr, Write};
use std::time::SystemTime;

use crossterm::{
    cursor::MoveToColumn,
    queue,
    terminal::{Clear, ClearType},
};

use crate::transfer::{Progress, ProgressSink};

const BAR_WIDTH: usize = 24;

/// Redraws a single progress line on stderr.
///
/// When stderr is not a terminal nothing is drawn.
pub struct TerminalProgress {
    out: Stderr,
    enabled: bool,
    drawn: bool,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let out = io::stderr();
        let enabled = out.is_terminal();
        Self { out, enabled, drawn: false }
    }

    /// Clear the progress line so regular output starts on a clean row.
    pub fn finish(&mut self) {
        if self.enabled && self.drawn {
            let _ = queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine));
            let _ = self.out.flush();
            self.drawn = false;
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn publish(&mut self, progress: &Progress) {
        if !self.enabled {
            return;
        }
        let line = progress_line(progress);
        let _ = queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = write!(self.out, "{}", line);
        let _ = self.out.flush();
        self.drawn = true;
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

/// `[#########---------------]  37% Backup 4.2: 3 / 8 files`
pub fn progress_line(progress: &Progress) -> String {
    let filled = (progress.fraction() * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percent(),
        progress.message
    )
}

/// Format a byte count, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Format how long ago `time` was, relative to `now`.
pub fn format_age(time: Option<SystemTime>, now: SystemTime) -> String {
    let Some(time) = time else {
        return "empty".to_string();
    };
    let age_seconds = now.duration_since(time).map(|d| d.as_secs()).unwrap_or(0);

    if age_seconds < 60 {
        "just now".to_string()
    } else if age_seconds < 3600 {
        format!("{}m ago", age_seconds / 60)
    } else if age_seconds < 86400 {
        format!("{}h ago", age_seconds / 3600)
    } else if age_seconds < 604_800 {
        format!("{}d ago", age_seconds / 86400)
    } else if age_seconds < 2_592_000 {
        format!("{}w ago", age_seconds / 604_800)
    } else {
        format!("{}mo ago", age_seconds / 2_592_000)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_progress_line() {
        let progress = Progress { message: "Backup 4.2: 1 / 4 files".to_string(), processed: 1, total: 4 };
        assert_eq!(
            progress_line(&progress),
            "[######------------------]  25% Backup 4.2: 1 / 4 files"
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_age() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000_000);
        let ago = |secs| Some(now - Duration::from_secs(secs));
        assert_eq!(format_age(None, now), "empty");
        assert_eq!(format_age(ago(5), now), "just now");
        assert_eq!(format_age(ago(120), now), "2m ago");
        assert_eq!(format_age(ago(7200), now), "2h ago");
        assert_eq!(format_age(ago(3 * 86400), now), "3d ago");
        assert_eq!(format_age(ago(14 * 86400), now), "2w ago");
        assert_eq!(format_age(ago(90 * 86400), now), "3mo ago");
    }
}
