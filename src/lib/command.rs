// SPDX-License-Identifier: Apache-2.0

use std::process::Command;

use crate::{ErrorKind, NetRenderError};

pub(crate) const EXIT_SUCCESS_ONLY: &[i32] = &[0];
// Some service scripts exit with 1 while still leaving network in
// expected state.
pub(crate) const EXIT_SUCCESS_OR_ONE: &[i32] = &[0, 1];

/// Executor of OS activation commands.
pub trait CommandRunner {
    /// Run the command and return its stdout. Exit code not listed in
    /// `allowed_exit_codes` is treated as
    /// [ErrorKind::CommandExecutionFailure].
    fn run(
        &self,
        argv: &[&str],
        allowed_exit_codes: &[i32],
    ) -> Result<String, NetRenderError>;
}

#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
/// [CommandRunner] spawning real processes and waiting for them.
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        argv: &[&str],
        allowed_exit_codes: &[i32],
    ) -> Result<String, NetRenderError> {
        let (program, args) = match argv.split_first() {
            Some(p) => p,
            None => {
                return Err(NetRenderError::new(
                    ErrorKind::Bug,
                    "Got empty command to execute".to_string(),
                ));
            }
        };
        let cmd_str = argv.join(" ");
        log::debug!("Running command: {cmd_str}");
        let output = Command::new(program)
            .env("PATH", "/usr/sbin:/usr/bin:/sbin:/bin")
            .args(args)
            .output()
            .map_err(|e| {
                NetRenderError::new(
                    ErrorKind::CommandExecutionFailure,
                    format!("Failed to execute {cmd_str}: {e}"),
                )
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        match output.status.code() {
            Some(code) if allowed_exit_codes.contains(&code) => {
                if code != 0 {
                    log::info!("Command {cmd_str} exited with {code}, ignored");
                }
                Ok(stdout)
            }
            code => Err(NetRenderError::new(
                ErrorKind::CommandExecutionFailure,
                format!(
                    "Command {cmd_str} failed with exit code {}: {}",
                    code.map(|c| c.to_string())
                        .unwrap_or_else(|| "none(killed by signal)".into()),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            )),
        }
    }
}
