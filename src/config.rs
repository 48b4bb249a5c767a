//! Configuration types for tv-post
//!
//! Settings are layered: built-in defaults, then an optional JSON file, then
//! [`ConfigOverrides`] gathered from the environment and command-line flags
//! (flags win over environment).

use crate::error::{Error, Result};
use crate::types::TransferMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Ready directory the video is placed in (required)
    #[serde(default)]
    pub ready_dir: Option<PathBuf>,

    /// Root for temporary workspaces (default: `$HOME/tmp`)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Extraction settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Archive members smaller than this many bytes are skipped (default: 60,000,000)
    ///
    /// Keeps "sample" clips bundled with a release out of the workspace.
    #[serde(default = "default_min_file_size")]
    pub min_file_size: u64,

    /// Extensions recognised as video, without dots (default: mp4, mkv, avi)
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_file_size: default_min_file_size(),
            video_extensions: default_video_extensions(),
        }
    }
}

/// Whether the video is moved or copied into the ready directory
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferPolicy {
    /// Copy when the input path contains the seed marker, move otherwise (default)
    #[default]
    Auto,
    /// Always move
    Move,
    /// Always copy
    Copy,
}

impl TransferPolicy {
    /// Decide the transfer mode for an input path
    pub fn resolve(self, input: &Path, seed_marker: &str) -> TransferMode {
        match self {
            TransferPolicy::Move => TransferMode::Move,
            TransferPolicy::Copy => TransferMode::Copy,
            TransferPolicy::Auto => {
                if !seed_marker.is_empty() && input.to_string_lossy().contains(seed_marker) {
                    TransferMode::Copy
                } else {
                    TransferMode::Move
                }
            }
        }
    }
}

impl std::str::FromStr for TransferPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(TransferPolicy::Auto),
            "move" => Ok(TransferPolicy::Move),
            "copy" => Ok(TransferPolicy::Copy),
            other => Err(format!("unknown transfer policy '{other}' (auto, move, copy)")),
        }
    }
}

/// Action when the destination file already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCollisionAction {
    /// Replace the existing file (default)
    #[default]
    Overwrite,
    /// Append (1), (2), etc. to filename
    Rename,
    /// Fail the run
    Skip,
}

/// Placement settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Move/copy decision (default: auto)
    #[serde(default)]
    pub transfer: TransferPolicy,

    /// Path fragment marking an input that is still seeding (default: "/seed/")
    #[serde(default = "default_seed_marker")]
    pub seed_marker: String,

    /// File collision handling
    #[serde(default)]
    pub file_collision: FileCollisionAction,

    /// Compare SHA-256 of source and copy before renaming into place
    #[serde(default)]
    pub verify_checksum: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            transfer: TransferPolicy::default(),
            seed_marker: default_seed_marker(),
            file_collision: FileCollisionAction::default(),
            verify_checksum: false,
        }
    }
}

/// External tool settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Extract with the external unrar binary instead of the built-in library
    #[serde(default)]
    pub use_unrar_cli: bool,

    /// Path to unrar executable (auto-detected if None)
    #[serde(default)]
    pub unrar_path: Option<PathBuf>,

    /// Whether to search PATH for unrar if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            use_unrar_cli: false,
            unrar_path: None,
            search_path: true,
        }
    }
}

/// Remote syslog sink
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyslogConfig {
    /// `host:port` of the UDP syslog receiver
    pub address: String,

    /// Hostname reported in each message (default: "tv-post")
    #[serde(default = "default_syslog_hostname")]
    pub hostname: String,

    /// Tag reported in each message (default: "tv")
    #[serde(default = "default_syslog_tag")]
    pub tag: String,
}

impl SyslogConfig {
    /// Syslog sink with default hostname and tag
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: default_syslog_hostname(),
            tag: default_syslog_tag(),
        }
    }
}

/// Logging settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append log lines to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Forward log lines to a remote syslog receiver
    #[serde(default)]
    pub syslog: Option<SyslogConfig>,
}

/// Main configuration for tv-post
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ready and temporary directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Extraction filter and video detection
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Move/copy and collision behaviour
    #[serde(default)]
    pub placement: PlacementConfig,

    /// External unrar binary
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Log destinations
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dry run: resolve and log, but leave source and ready directory untouched
    #[serde(default)]
    pub test_mode: bool,
}

impl Config {
    /// Load configuration from a JSON file, or defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("failed to read config file {}: {}", path.display(), e),
                "config",
            )
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Ready directory, if configured
    pub fn ready_dir(&self) -> Option<&Path> {
        self.paths.ready_dir.as_deref()
    }

    /// Root for temporary workspaces
    ///
    /// Falls back to `$HOME/tmp` when no temp directory is configured.
    pub fn temp_root(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.paths.temp_dir {
            return Ok(dir.clone());
        }
        dirs::home_dir()
            .map(|home| home.join("tmp"))
            .ok_or_else(|| {
                Error::config(
                    "temp directory not defined and home directory unknown",
                    "temp_dir",
                )
            })
    }

    /// Check the settings a run cannot start without
    pub fn validate(&self) -> Result<()> {
        let ready = self.ready_dir().ok_or_else(|| {
            Error::config(
                "output directory not defined and TV_READY_DIR environment variable not set",
                "ready_dir",
            )
        })?;
        if !ready.is_dir() {
            return Err(Error::config(
                format!("ready directory {} does not exist", ready.display()),
                "ready_dir",
            ));
        }
        if self.extraction.min_file_size == 0 {
            return Err(Error::config(
                "min_file_size must be greater than zero",
                "min_file_size",
            ));
        }
        if self.extraction.video_extensions.is_empty() {
            return Err(Error::config(
                "at least one video extension is required",
                "video_extensions",
            ));
        }
        if let Some(syslog) = &self.logging.syslog
            && syslog.address.trim().is_empty()
        {
            return Err(Error::config("syslog address is empty", "syslog.address"));
        }
        Ok(())
    }
}

/// Values taken from the environment and command line
///
/// `None` leaves the underlying setting alone.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Ready directory (`-d` / `TV_READY_DIR`)
    pub ready_dir: Option<PathBuf>,
    /// Temp root (`--temp-dir` / `TV_TEMP_DIR`)
    pub temp_dir: Option<PathBuf>,
    /// Log file (`-l` / `TV_LOG_FILE`)
    pub log_file: Option<PathBuf>,
    /// Syslog receiver (`--syslog` / `TV_SYSLOG_ADDR`)
    pub syslog_address: Option<String>,
    /// Minimum archive member size
    pub min_file_size: Option<u64>,
    /// Move/copy policy
    pub transfer: Option<TransferPolicy>,
    /// Explicit unrar binary
    pub unrar_path: Option<PathBuf>,
    /// Use the unrar binary
    pub use_unrar_cli: bool,
    /// Dry run (`--test` / `TV_POST_TEST`)
    pub test_mode: bool,
}

impl ConfigOverrides {
    /// Apply the overrides on top of `config`
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(dir) = self.ready_dir {
            config.paths.ready_dir = Some(dir);
        }
        if let Some(dir) = self.temp_dir {
            config.paths.temp_dir = Some(dir);
        }
        if let Some(file) = self.log_file {
            config.logging.log_file = Some(file);
        }
        if let Some(address) = self.syslog_address {
            match config.logging.syslog.as_mut() {
                Some(syslog) => syslog.address = address,
                None => config.logging.syslog = Some(SyslogConfig::new(address)),
            }
        }
        if let Some(size) = self.min_file_size {
            config.extraction.min_file_size = size;
        }
        if let Some(policy) = self.transfer {
            config.placement.transfer = policy;
        }
        if let Some(path) = self.unrar_path {
            config.tools.unrar_path = Some(path);
            config.tools.use_unrar_cli = true;
        }
        if self.use_unrar_cli {
            config.tools.use_unrar_cli = true;
        }
        if self.test_mode {
            config.test_mode = true;
        }
        config
    }
}

fn default_min_file_size() -> u64 {
    60_000_000
}

fn default_video_extensions() -> Vec<String> {
    vec!["mp4".into(), "avi".into(), "mkv".into()]
}

fn default_seed_marker() -> String {
    "/seed/".to_string()
}

fn default_syslog_hostname() -> String {
    "tv-post".to_string()
}

fn default_syslog_tag() -> String {
    "tv".to_string()
}

fn default_true() -> bool {
    true
}
