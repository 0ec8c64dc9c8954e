//! Configuration management for versionkeep.
//!
//! Handles loading and saving configuration from TOML files. Only durable
//! settings live here; progress of a running operation is published by the
//! job itself and never written back into the configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::KeepResult;
use super::paths::expand_path;

/// Name of the backup folder shared by all machines.
pub const SHARED_FOLDER: &str = "shared";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Chunking and pacing of copy jobs
    pub transfer: TransferConfig,

    /// Items that take part in a backup
    pub backup: ItemToggles,

    /// Items that take part in a restore
    pub restore: ItemToggles,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Folder holding one sub-folder per application version
    pub source_root: String,

    /// Folder receiving backups
    pub backup_root: String,

    /// Store backups under a per-machine folder instead of the shared one
    pub use_machine_folder: bool,

    /// Override for the per-machine folder name (defaults to the host name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,

    /// Comma or whitespace separated glob patterns to skip
    pub ignore_patterns: String,

    /// Run every operation without touching the filesystem
    pub dry_run: bool,

    /// Delete the backup destination before copying into it
    pub clean_before_copy: bool,

    /// Honor the per-item toggles
    pub advanced_mode: bool,
}

/// Copy job pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Files copied per tick
    pub chunk_size: usize,

    /// Pause between ticks in milliseconds
    pub tick_interval_ms: u64,
}

/// Per-item participation switches.
///
/// A disabled item contributes its literal file or folder name to the
/// ignore list of that direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemToggles {
    pub addons: bool,
    pub extensions: bool,
    pub presets: bool,
    pub datafiles: bool,
    pub startup_file: bool,
    pub userprefs: bool,
    pub workspaces: bool,
    pub cache: bool,
    pub bookmarks: bool,
    pub recent_files: bool,
    pub recent_searches: bool,
    pub platform_support: bool,
}

impl ItemToggles {
    /// Every toggle paired with the name it excludes when disabled.
    pub fn entries(&self) -> [(bool, &'static str); 12] {
        [
            (self.addons, "addons"),
            (self.extensions, "extensions"),
            (self.presets, "presets"),
            (self.datafiles, "datafiles"),
            (self.startup_file, "startup.blend"),
            (self.userprefs, "userpref.blend"),
            (self.workspaces, "workspaces.blend"),
            (self.cache, "cache"),
            (self.bookmarks, "bookmarks.txt"),
            (self.recent_files, "recent-files.txt"),
            (self.recent_searches, "recent-searches.txt"),
            (self.platform_support, "platform_support.txt"),
        ]
    }

    /// Names of the items that are switched off.
    pub fn disabled_names(&self) -> Vec<&'static str> {
        self.entries().into_iter().filter(|(enabled, _)| !enabled).map(|(_, name)| name).collect()
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.versionkeep.toml` in current directory
    /// 2. `~/.config/versionkeep/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> KeepResult<Self> {
        let local_config = PathBuf::from(".versionkeep.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> KeepResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> KeepResult<PathBuf> {
        let path = Self::config_path().ok_or_else(|| {
            super::KeepError::Config("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file, creating parent folders.
    pub fn save_to(&self, path: &Path) -> KeepResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("versionkeep"))
    }

    /// Get the global config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Expanded source root.
    pub fn source_root(&self) -> PathBuf {
        expand_path(&self.general.source_root)
    }

    /// Expanded backup root.
    pub fn backup_root(&self) -> PathBuf {
        expand_path(&self.general.backup_root)
    }

    /// Name of the per-machine backup folder.
    pub fn machine_name(&self) -> String {
        self.general
            .machine_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(sysinfo::System::host_name)
            .unwrap_or_else(|| "machine".to_string())
    }

    /// Backup folder used by backup, restore and delete.
    pub fn backup_dir(&self) -> PathBuf {
        if self.general.use_machine_folder {
            self.machine_backup_dir()
        } else {
            self.shared_backup_dir()
        }
    }

    /// Per-machine backup folder.
    pub fn machine_backup_dir(&self) -> PathBuf {
        self.backup_root().join(self.machine_name())
    }

    /// Backup folder shared by all machines.
    pub fn shared_backup_dir(&self) -> PathBuf {
        self.backup_root().join(SHARED_FOLDER)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let backup_root = dirs::data_dir()
            .map(|d| d.join("versionkeep").join("backups"))
            .unwrap_or_else(|| PathBuf::from("versionkeep-backups"));

        Self {
            source_root: default_source_root().to_string_lossy().into_owned(),
            backup_root: backup_root.to_string_lossy().into_owned(),
            use_machine_folder: false,
            machine_name: None,
            ignore_patterns: "*.blend1, *.blend2, *.blend3, __pycache__, desktop.ini, .DS_Store, Thumbs.db"
                .to_string(),
            dry_run: false,
            clean_before_copy: false,
            advanced_mode: false,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { chunk_size: 8, tick_interval_ms: 0 }
    }
}

impl Default for ItemToggles {
    fn default() -> Self {
        Self {
            addons: true,
            extensions: true,
            presets: true,
            datafiles: true,
            startup_file: true,
            userprefs: true,
            workspaces: true,
            cache: true,
            bookmarks: true,
            recent_files: true,
            recent_searches: true,
            platform_support: true,
        }
    }
}

/// Per-user folder where the application keeps its version folders.
fn default_source_root() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = dirs::config_dir().map(|d| d.join("Blender Foundation").join("Blender"));
    #[cfg(target_os = "macos")]
    let base = dirs::config_dir().map(|d| d.join("Blender"));
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let base = dirs::config_dir().map(|d| d.join("blender"));

    base.unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.dry_run);
        assert!(!config.general.advanced_mode);
        assert_eq!(config.transfer.chunk_size, 8);
        assert!(config.backup.disabled_names().is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[transfer]"));
        assert!(toml_str.contains("[backup]"));
        assert!(toml_str.contains("[restore]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            source_root = "/tmp/app"
            dry_run = true
            advanced_mode = true

            [transfer]
            chunk_size = 2

            [restore]
            cache = false
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source_root(), PathBuf::from("/tmp/app"));
        assert!(config.general.dry_run);
        assert_eq!(config.transfer.chunk_size, 2);
        assert_eq!(config.transfer.tick_interval_ms, 0);
        assert!(config.backup.cache);
        assert_eq!(config.restore.disabled_names(), vec!["cache"]);
    }

    #[test]
    fn test_backup_dir_layout() {
        let mut config = Config::default();
        config.general.backup_root = "/backups".to_string();
        config.general.machine_name = Some("studio-pc".to_string());

        assert_eq!(config.backup_dir(), PathBuf::from("/backups/shared"));

        config.general.use_machine_folder = true;
        assert_eq!(config.backup_dir(), PathBuf::from("/backups/studio-pc"));
        assert_eq!(config.shared_backup_dir(), PathBuf::from("/backups/shared"));
    }

    #[test]
    fn test_blank_machine_name_falls_back() {
        let mut config = Config::default();
        config.general.machine_name = Some("  ".to_string());
        assert!(!config.machine_name().trim().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.general.clean_before_copy = true;
        config.backup.presets = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert!(loaded.general.clean_before_copy);
        assert!(!loaded.backup.presets);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[general\nbroken").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, super::super::KeepError::Config(_)));
    }
}
