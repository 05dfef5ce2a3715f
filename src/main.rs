use std::process;

use deploykit::DeployError;

fn main() {
    if let Err(e) = deploykit::cli::run_with_args(std::env::args_os()) {
        let code = match e.downcast_ref::<DeployError>() {
            Some(DeployError::InstallerFailed { code }) => *code,
            Some(DeployError::RebootRequired) => deploykit::InstallOutcome::REBOOT_REQUIRED,
            _ => 1,
        };
        eprintln!("Error: {:#}", e);
        process::exit(code);
    }
}
