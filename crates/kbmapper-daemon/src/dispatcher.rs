//! Command execution
//!
//! Dispatching is fire-and-forget: the child's exit status is awaited on a
//! separate task and only ever logged.

use std::process::Stdio;

use kbmapper_config::Section;
use tokio::process::{Child, Command};

/// Runs the command bound to a matched section
pub trait CommandDispatcher {
    fn dispatch(&self, stimulus: &str, section: &Section);
}

/// Runs commands through `sh -c`
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellDispatcher;

impl ShellDispatcher {
    /// Start the section's command without waiting for it.
    ///
    /// `WorkingDirectory` becomes the child's working directory. `User` is
    /// not applied: commands run as the daemon's own user.
    pub fn spawn(&self, section: &Section) -> std::io::Result<Option<Child>> {
        let Some(command) = section.command() else {
            return Ok(None);
        };

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).stdin(Stdio::null());

        if let Some(dir) = &section.working_directory {
            cmd.current_dir(dir);
        }

        cmd.spawn().map(Some)
    }
}

impl CommandDispatcher for ShellDispatcher {
    fn dispatch(&self, stimulus: &str, section: &Section) {
        if let Some(user) = &section.user {
            tracing::debug!(
                "Section '{}' asks for user '{}', running as the daemon user instead",
                stimulus,
                user
            );
        }

        let command = section.command().unwrap_or_default().to_string();

        match self.spawn(section) {
            Ok(Some(mut child)) => {
                tracing::info!("{}: running `{}`", stimulus, command);

                let stimulus = stimulus.to_string();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if status.success() => {
                            tracing::debug!("{}: `{}` finished", stimulus, command);
                        }
                        Ok(status) => {
                            tracing::warn!("{}: `{}` exited with {}", stimulus, command, status);
                        }
                        Err(e) => {
                            tracing::warn!("{}: failed to wait for `{}`: {}", stimulus, command, e);
                        }
                    }
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("{}: failed to start `{}`: {}", stimulus, command, e);
            }
        }
    }
}

/// Logs what would run instead of running it
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunDispatcher;

impl CommandDispatcher for DryRunDispatcher {
    fn dispatch(&self, stimulus: &str, section: &Section) {
        tracing::info!(
            "{}: would run `{}` (user: {}, directory: {})",
            stimulus,
            section.command().unwrap_or_default(),
            section.user.as_deref().unwrap_or("-"),
            section
                .working_directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}
