//! Config file location for belssb-meter
//!
//! ## Path Resolution Order
//!
//! 1. `--config` flag or `BELSSB_CONFIG` environment variable (if set)
//! 2. `config.yaml` in the current directory (if it exists)
//! 3. Platform config directory, e.g. `~/.config/belssb-meter/config.yaml`
//!
//! A path that does not exist is not an error: the file layer is simply empty.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Name of the config file looked up in the working and config directories
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolves where the YAML config file lives
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    config_file: PathBuf,
    explicit: bool,
}

impl ConfigPaths {
    /// Resolve the config path from an optional explicit override
    pub fn resolve(explicit: Option<&Path>) -> Self {
        Self::resolve_in(explicit, Path::new("."), platform_config_dir().as_deref())
    }

    /// Resolution against explicit directories (useful for testing)
    pub fn resolve_in(explicit: Option<&Path>, cwd: &Path, config_dir: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self {
                config_file: path.to_path_buf(),
                explicit: true,
            };
        }

        let local = cwd.join(CONFIG_FILE_NAME);
        let config_file = match config_dir {
            Some(dir) if !local.is_file() => dir.join(CONFIG_FILE_NAME),
            _ => local,
        };

        Self {
            config_file,
            explicit: false,
        }
    }

    /// Path to the YAML config file (may not exist)
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Whether the path came from `--config` / `BELSSB_CONFIG`
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.config_file.is_file()
    }
}

/// Platform config directory (`~/.config/belssb-meter` on Linux)
fn platform_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("ru", "belssb", "belssb-meter").map(|dirs| dirs.config_dir().to_path_buf())
}
