//! Deployment configuration for the dispatcher
//!
//! The dispatcher needs to know where the helper binaries live. In a
//! standard install they sit under `<install_root>/bin`; in a packaged
//! (single-artifact) deployment the `elevate.cmd` helper is unpacked to a
//! `downloads` directory under a system configuration root, which is
//! published through a small JSON file written by the host application.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ElevError, ElevResult};

/// How the host application is deployed on disk.
///
/// Set explicitly at dispatcher construction; there is no ambient
/// process-wide flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Helpers live under `<install_root>/bin`
    Standard,
    /// `elevate.cmd` was unpacked under the system configuration root
    Packaged,
}

/// Global host configuration, read only in packaged mode.
///
/// The field names follow the host application's JSON config file, hence
/// the camelCase wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub sys_conf_root: PathBuf,
}

impl GlobalConfig {
    /// Load the global configuration from a JSON file.
    ///
    /// A missing or malformed file is a hard error: the caller asked for
    /// packaged mode and without the configuration root the elevate helper
    /// cannot be located.
    pub fn load(path: &Path) -> ElevResult<Self> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path)
            .map_err(|e| ElevError::config_error(&display, &e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| ElevError::config_error(&display, &e.to_string()))
    }
}

/// Configuration for a [`Dispatcher`](crate::dispatch::Dispatcher)
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Root of the application install (the directory containing `bin`)
    pub install_root: PathBuf,
    /// Deployment mode, decided by the host at startup
    pub deployment: DeploymentMode,
    /// Override for the global config file location (packaged mode only)
    pub global_config_path: Option<PathBuf>,
}

impl DispatcherConfig {
    /// Create a standard-mode configuration rooted at `install_root`
    pub fn new<P: AsRef<Path>>(install_root: P) -> Self {
        Self {
            install_root: install_root.as_ref().to_path_buf(),
            deployment: DeploymentMode::Standard,
            global_config_path: None,
        }
    }

    /// Set the deployment mode
    pub fn deployment(mut self, mode: DeploymentMode) -> Self {
        self.deployment = mode;
        self
    }

    /// Override the global config file location
    pub fn global_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.global_config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Effective global config path: the override if set, otherwise
    /// `<install_root>/lib/core/config.json`
    pub fn resolved_global_config_path(&self) -> PathBuf {
        match &self.global_config_path {
            Some(path) => path.clone(),
            None => self
                .install_root
                .join("lib")
                .join("core")
                .join("config.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_global_config_path() {
        let config = DispatcherConfig::new("/opt/app");
        let expected = PathBuf::from("/opt/app")
            .join("lib")
            .join("core")
            .join("config.json");
        assert_eq!(config.resolved_global_config_path(), expected);
        assert_eq!(config.deployment, DeploymentMode::Standard);
    }

    #[test]
    fn test_global_config_path_override() {
        let config = DispatcherConfig::new("/opt/app")
            .deployment(DeploymentMode::Packaged)
            .global_config_path("/etc/app/config.json");
        assert_eq!(
            config.resolved_global_config_path(),
            PathBuf::from("/etc/app/config.json")
        );
    }

    #[test]
    fn test_global_config_load_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "{{\"sysConfRoot\": \"/var/app\"}}").unwrap();

        let loaded = GlobalConfig::load(&path).unwrap();
        assert_eq!(loaded.sys_conf_root, PathBuf::from("/var/app"));
    }

    #[test]
    fn test_global_config_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GlobalConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ElevError::Config(_)));
    }

    #[test]
    fn test_global_config_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        let err = GlobalConfig::load(&path).unwrap_err();
        assert!(matches!(err, ElevError::Config(_)));
    }
}
