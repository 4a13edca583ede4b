//! Shell command execution.

use tokio::process::Command;

use crate::core::error::{Error, Result};

/// Runs `command` through the platform shell and returns its standard output.
///
/// A leading `!` marks an assertion: the prefix is stripped and a non-zero
/// exit becomes [`Error::CommandFailed`] carrying the command's stderr.
/// Without the prefix the exit status is not inspected and stdout is returned
/// as is. Failing to spawn the shell is always an error.
pub async fn exec(command: &str) -> Result<String> {
    let (assert, command) = match command.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, command),
    };
    if command.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "exec(command): command is empty".to_string(),
        ));
    }

    let output = shell(command).output().await?;
    if assert && !output.status.success() {
        return Err(Error::CommandFailed {
            command: command.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
