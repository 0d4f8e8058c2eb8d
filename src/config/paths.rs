//! XDG path resolution for sleuth configuration and cache directories.

use anyhow::Result;
use std::path::PathBuf;

use super::types::Config;

impl Config {
    /// Returns the platform-specific configuration directory for sleuth.
    ///
    /// Returns `~/.config/sleuth/` on Linux (`XDG_CONFIG_HOME/sleuth`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform's config directory cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join(crate::constants::APP_NAME);
        Ok(dir)
    }

    /// Returns the platform-specific cache directory for sleuth.
    ///
    /// Returns `~/.cache/sleuth/` on Linux. Holds readline history and the
    /// log file; transcripts are never written here.
    pub fn cache_dir() -> Result<PathBuf> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?
            .join(crate::constants::APP_NAME);
        Ok(dir)
    }

    /// Returns the full path to the sleuth configuration file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(crate::constants::CONFIG_FILENAME))
    }

    /// Returns the path of the log file used when logs don't go to stderr.
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::cache_dir()?.join(crate::constants::LOG_FILENAME))
    }
}
