//! Privilege elevation dispatch
//!
//! The dispatcher resolves the on-disk helper executables, builds the
//! final command line, and hands it to the shell execution primitive.
//! It never attempts elevation itself: command text is always concatenated
//! after the quoted helper path, so privilege negotiation is owned by the
//! helper.
//!
//! Two helpers are expected on disk:
//! - `<install_root>/bin/elevate/elevate.cmd` — UAC elevation, may show an
//!   interactive consent prompt to the desktop user
//! - `<install_root>/bin/sudowin/sudo.exe` — silent authentication with an
//!   explicit password
//!
//! Neither path is checked for existence up front; a missing helper fails
//! at execution time through the same asynchronous error path as an
//! access-denied exit, and the dispatcher does not distinguish the two.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{DeploymentMode, DispatcherConfig, GlobalConfig};
use crate::error::{ElevError, ElevResult};
use crate::exec::{self, ExecOptions, ExecOutcome};

/// Dispatcher for elevated command execution
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the given deployment configuration
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Resolve the UAC elevation helper.
    ///
    /// In packaged mode the helper is unpacked under the system
    /// configuration root, which is read from the host's global config
    /// file. A missing or malformed config file fails here, synchronously,
    /// rather than at spawn time.
    fn elevate_helper_path(&self) -> ElevResult<PathBuf> {
        match self.config.deployment {
            DeploymentMode::Standard => Ok(self
                .config
                .install_root
                .join("bin")
                .join("elevate")
                .join("elevate.cmd")),
            DeploymentMode::Packaged => {
                let conf_path = self.config.resolved_global_config_path();
                let global = GlobalConfig::load(&conf_path)?;
                Ok(global.sys_conf_root.join("downloads").join("elevate.cmd"))
            }
        }
    }

    /// The sudo helper path is fixed; there is no packaged-mode branch.
    fn sudo_helper_path(&self) -> PathBuf {
        self.config
            .install_root
            .join("bin")
            .join("sudowin")
            .join("sudo.exe")
    }

    fn validate_command(command: &str) -> ElevResult<()> {
        if command.trim().is_empty() {
            return Err(ElevError::invalid("command text is empty"));
        }
        Ok(())
    }

    fn elevate_command_line(&self, command: &str) -> ElevResult<String> {
        Self::validate_command(command)?;
        let helper = self.elevate_helper_path()?;
        Ok(format!("\"{}\" {}", helper.display(), command))
    }

    // The password flag is concatenated directly to the command text with
    // no separating space, matching the helper's historical invocation
    // convention. Callers needing a separator include it in the command.
    fn sudo_command_line(&self, command: &str, password: &str) -> ElevResult<String> {
        Self::validate_command(command)?;
        let helper = self.sudo_helper_path();
        let flag = if password.is_empty() {
            String::new()
        } else {
            format!("-p {password}")
        };
        Ok(format!("\"{}\" {}{}", helper.display(), flag, command))
    }

    /// Run `command` through the UAC elevation helper, reporting completion
    /// exactly once via `on_complete`.
    ///
    /// Returns immediately. On systems with UAC enabled the helper may show
    /// an interactive consent prompt; a declined prompt or insufficient
    /// rights surface as an execution error through the callback. Only
    /// request-shape and configuration errors are returned synchronously,
    /// before any process is spawned.
    pub fn elevate<F>(
        &self,
        command: &str,
        options: Option<&ExecOptions>,
        on_complete: F,
    ) -> ElevResult<()>
    where
        F: FnOnce(ElevResult<ExecOutcome>) + Send + 'static,
    {
        let line = self.elevate_command_line(command)?;
        debug!(command_line = %line, "dispatching elevate");
        exec::spawn_shell(line, options.cloned().unwrap_or_default(), on_complete)
    }

    /// Blocking variant of [`elevate`](Self::elevate)
    pub fn elevate_blocking(
        &self,
        command: &str,
        options: Option<&ExecOptions>,
    ) -> ElevResult<ExecOutcome> {
        let line = self.elevate_command_line(command)?;
        debug!(command_line = %line, "dispatching elevate (blocking)");
        exec::run_shell(&line, &options.cloned().unwrap_or_default())
    }

    /// Run `command` through the sudo helper, authenticating silently with
    /// `password` (no UAC prompt), reporting completion exactly once via
    /// `on_complete`.
    ///
    /// A `None` or empty password omits the `-p` flag entirely. A wrong
    /// password surfaces as an access-denied execution error through the
    /// callback.
    pub fn sudo<F>(
        &self,
        command: &str,
        password: Option<&str>,
        options: Option<&ExecOptions>,
        on_complete: F,
    ) -> ElevResult<()>
    where
        F: FnOnce(ElevResult<ExecOutcome>) + Send + 'static,
    {
        let line = self.sudo_command_line(command, password.unwrap_or(""))?;
        debug!(command_line = %line, "dispatching sudo");
        exec::spawn_shell(line, options.cloned().unwrap_or_default(), on_complete)
    }

    /// Blocking variant of [`sudo`](Self::sudo)
    pub fn sudo_blocking(
        &self,
        command: &str,
        password: Option<&str>,
        options: Option<&ExecOptions>,
    ) -> ElevResult<ExecOutcome> {
        let line = self.sudo_command_line(command, password.unwrap_or(""))?;
        debug!(command_line = %line, "dispatching sudo (blocking)");
        exec::run_shell(&line, &options.cloned().unwrap_or_default())
    }
}
