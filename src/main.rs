//! Versionkeep - back up and restore per-version application config folders.
//!
//! Thin command-line front end over the `versionkeep` library: parses
//! arguments, loads configuration, and drives operations to completion
//! while drawing progress on the terminal.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use versionkeep::core::Config;
use versionkeep::display::{format_age, format_size, TerminalProgress};
use versionkeep::{App, CancelToken, OperationReport, Outcome, TransferKind};

/// Back up and restore per-version application config folders
#[derive(Parser)]
#[command(name = "versionkeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dry run mode - report what would be copied or deleted without doing it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Delete each backup destination before copying into it
    #[arg(long, global = true)]
    clean: bool,

    /// Configuration file to use instead of the default locations
    #[arg(long, global = true, env = "VERSIONKEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Override the folder holding the application's version folders
    #[arg(long, global = true)]
    source_root: Option<String>,

    /// Override the folder receiving backups
    #[arg(long, global = true)]
    backup_root: Option<String>,

    /// Override the ignore patterns (comma or space separated globs)
    #[arg(long, global = true)]
    ignore: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up one version folder
    Backup {
        /// Version to back up (defaults to the newest)
        #[arg(id = "version_name", value_name = "VERSION")]
        version: Option<String>,

        /// Store the backup under another version name
        #[arg(long = "as", value_name = "NAME")]
        as_name: Option<String>,
    },

    /// Restore one backed-up version folder
    Restore {
        /// Backed-up version to restore (defaults to the newest)
        #[arg(id = "version_name", value_name = "VERSION")]
        version: Option<String>,

        /// Restore into another version folder
        #[arg(long, value_name = "NAME")]
        into: Option<String>,
    },

    /// Back up or restore every version folder, newest first
    Batch {
        /// Direction of the batch
        #[arg(value_enum)]
        kind: BatchKind,
    },

    /// Delete a backed-up version
    Delete {
        /// Backed-up version to delete
        #[arg(id = "version_name", value_name = "VERSION")]
        version: String,

        /// Don't confirm before deleting
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List version folders with their age and size
    Versions {
        /// List backed-up versions instead of the application's
        #[arg(short, long)]
        backups: bool,

        /// Combine the per-machine and the shared backup folders
        #[arg(short, long, requires = "backups")]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(short, long, requires = "init")]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BatchKind {
    Backup,
    Restore,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl From<BatchKind> for TransferKind {
    fn from(kind: BatchKind) -> Self {
        match kind {
            BatchKind::Backup => TransferKind::Backup,
            BatchKind::Restore => TransferKind::Restore,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    match &cli.command {
        Commands::Backup { version, as_name } => {
            cmd_backup(&cli, version.as_deref(), as_name.as_deref())?;
        }
        Commands::Restore { version, into } => {
            cmd_restore(&cli, version.as_deref(), into.as_deref())?;
        }
        Commands::Batch { kind } => {
            cmd_batch(&cli, (*kind).into())?;
        }
        Commands::Delete { version, yes } => {
            cmd_delete(&cli, version, *yes)?;
        }
        Commands::Versions { backups, all, format } => {
            cmd_versions(&cli, *backups, *all, *format)?;
        }
        Commands::Config { path, init, force } => {
            cmd_config(&cli, *path, *init, *force)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(*shell);
        }
    }

    Ok(())
}

/// Load configuration and apply command-line overrides.
fn load_app(cli: &Cli) -> Result<App> {
    let mut app = App::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let general = &mut app.config.general;
    if cli.dry_run {
        general.dry_run = true;
    }
    if cli.clean {
        general.clean_before_copy = true;
    }
    if let Some(root) = &cli.source_root {
        general.source_root.clone_from(root);
    }
    if let Some(root) = &cli.backup_root {
        general.backup_root.clone_from(root);
    }
    if let Some(patterns) = &cli.ignore {
        general.ignore_patterns.clone_from(patterns);
    }
    app.reload_ignore_rules();

    Ok(app)
}

/// Cancel the running operation on Ctrl+C.
fn install_cancel_handler(cancel: &CancelToken) {
    let cancel = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }
}

fn print_report(report: &OperationReport, dry_run: bool) {
    if dry_run {
        println!("[DRY RUN] Nothing was written.");
    }
    print!("{report}");
    if report.outcome == Outcome::Cancelled {
        println!("Stopped before all files were copied.");
    }
}

/// Back up one version.
fn cmd_backup(cli: &Cli, version: Option<&str>, as_name: Option<&str>) -> Result<()> {
    let mut app = load_app(cli)?;
    install_cancel_handler(&app.cancel);

    let mut job = app.backup_job(version, as_name)?;
    let mut progress = TerminalProgress::new();
    let report = app.run_job(&mut job, &mut progress);
    progress.finish();

    for failure in job.failures() {
        eprintln!("  failed: {} ({})", failure.source.display(), failure.error);
    }
    print_report(&report, job.is_dry_run());
    Ok(())
}

/// Restore one version.
fn cmd_restore(cli: &Cli, version: Option<&str>, into: Option<&str>) -> Result<()> {
    let mut app = load_app(cli)?;
    install_cancel_handler(&app.cancel);

    let mut job = app.restore_job(version, into)?;
    let mut progress = TerminalProgress::new();
    let report = app.run_job(&mut job, &mut progress);
    progress.finish();

    for failure in job.failures() {
        eprintln!("  failed: {} ({})", failure.source.display(), failure.error);
    }
    print_report(&report, job.is_dry_run());
    Ok(())
}

/// Back up or restore every version.
fn cmd_batch(cli: &Cli, kind: TransferKind) -> Result<()> {
    let mut app = load_app(cli)?;
    install_cancel_handler(&app.cancel);

    let mut batch = app.batch_job(kind)?;
    let mut progress = TerminalProgress::new();
    let report = app.run_batch(&mut batch, &mut progress);
    progress.finish();

    print_report(&report, app.config.general.dry_run);
    Ok(())
}

/// Delete a backed-up version.
fn cmd_delete(cli: &Cli, version: &str, skip_confirm: bool) -> Result<()> {
    let mut app = load_app(cli)?;
    let dry_run = app.config.general.dry_run;
    let path = app.config.backup_dir().join(version);

    if !dry_run && !skip_confirm {
        print!("Delete backup '{}'? [y/N] ", path.display());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    let deleted = app.delete_backup(version)?;
    if dry_run {
        println!("[DRY RUN] Would delete {}", deleted.display());
    } else {
        println!("Deleted {}", deleted.display());
    }
    Ok(())
}

/// List versions with age and size.
fn cmd_versions(cli: &Cli, backups: bool, all: bool, format: OutputFormat) -> Result<()> {
    let mut app = load_app(cli)?;
    let listing = app.version_listing(backups, all, false);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&listing)?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let root = if !backups {
                app.config.source_root()
            } else if all {
                app.config.backup_root()
            } else {
                app.config.backup_dir()
            };
            println!("{}", root.display());

            let now = SystemTime::now();
            for info in &listing {
                println!(
                    "  {:<16} {:>10} {:>8} files  {}",
                    info.name,
                    format_size(info.size_bytes),
                    info.file_count,
                    format_age(info.stats.newest_modified, now)
                );
            }
            println!("\nTotal: {} versions", listing.len());
        }
    }

    Ok(())
}

/// Show or initialise configuration.
fn cmd_config(cli: &Cli, show_path: bool, init: bool, force: bool) -> Result<()> {
    let target = match &cli.config {
        Some(path) => Some(path.clone()),
        None => Config::config_path(),
    };

    if show_path {
        if let Some(path) = &target {
            println!("{}", path.display());
        }
        return Ok(());
    }

    if init {
        let path = target.context("Could not determine config directory")?;
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }
        let written = match &cli.config {
            Some(path) => {
                Config::default().save_to(path)?;
                path.clone()
            }
            None => Config::default().save()?,
        };
        println!("Wrote {}", written.display());
        return Ok(());
    }

    let app = load_app(cli)?;
    let toml = toml::to_string_pretty(&app.config)?;
    println!("{toml}");

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "versionkeep", &mut io::stdout());
}
