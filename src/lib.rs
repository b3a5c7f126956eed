//! Windows privilege elevation dispatcher
//!
//! This crate lets a calling process run a shell command with elevated
//! (administrator) privileges on a Windows host, delegating the actual
//! privilege negotiation to pre-built helper executables:
//!
//! - [`Dispatcher::elevate`] goes through the UAC elevation helper
//!   (`elevate.cmd`). No password is needed, but the desktop user may see
//!   an interactive consent prompt.
//! - [`Dispatcher::sudo`] goes through the sudowin helper (`sudo.exe`),
//!   authenticating silently with an explicitly supplied password.
//!
//! The dispatcher is a thin shim: it resolves the helper on disk, builds
//! the command line, and hands it to the platform shell, reporting
//! completion exactly once through a callback (or directly from the
//! blocking variants). It never attempts elevation itself.
//!
//! ```no_run
//! use winelev::{Dispatcher, DispatcherConfig};
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::new("C:\\Program Files\\host"));
//! let outcome = dispatcher.sudo_blocking("whoami", Some("hunter2"), None)?;
//! println!("{}", outcome.stdout);
//! # Ok::<(), winelev::ElevError>(())
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod exec;

pub use config::{DeploymentMode, DispatcherConfig, GlobalConfig};
pub use dispatch::Dispatcher;
pub use error::{ElevError, ElevResult};
pub use exec::{ExecOptions, ExecOutcome};
