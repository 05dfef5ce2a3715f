use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::process::Command;

use crate::InstallOutcome;

/// Run an installer to completion and classify its exit code.
///
/// Failing to spawn is an error; a process without an exit code (killed by a
/// signal) counts as `Failure(-1)`.
pub fn run_installer<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> Result<InstallOutcome> {
    tracing::info!("Running installer: {}", program.to_string_lossy());

    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run installer: {}", program.to_string_lossy()))?;

    let code = status.code().unwrap_or(-1);
    let outcome = InstallOutcome::from_exit_code(code);
    tracing::info!("Installer exit code: {} ({})", code, outcome);

    Ok(outcome)
}
