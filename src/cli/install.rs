use anyhow::Result;

use crate::install::run_installer;
use crate::{DeployError, InstallOutcome};

use super::InstallArgs;

pub(crate) fn run_install(args: InstallArgs) -> Result<()> {
    // clap guarantees at least one value
    let (program, rest) = args
        .command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("No installer command given"))?;

    let outcome = run_installer(program, rest)?;
    match outcome {
        InstallOutcome::Success => println!("Install succeeded"),
        InstallOutcome::SuccessRebootRequired => println!("Install succeeded; reboot required"),
        InstallOutcome::Failure(_) => {}
    }
    outcome_result(outcome, args.propagate_reboot)
}

/// Map an installer outcome onto the command's result
fn outcome_result(outcome: InstallOutcome, propagate_reboot: bool) -> Result<()> {
    match outcome {
        InstallOutcome::Success => Ok(()),
        InstallOutcome::SuccessRebootRequired if propagate_reboot => {
            Err(DeployError::RebootRequired.into())
        }
        InstallOutcome::SuccessRebootRequired => Ok(()),
        InstallOutcome::Failure(code) => Err(DeployError::InstallerFailed { code }.into()),
    }
}
