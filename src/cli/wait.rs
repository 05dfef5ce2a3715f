use anyhow::Result;
use std::time::Duration;

use crate::settings::Settings;
use crate::wait::wait_for_port;

use super::WaitPortArgs;

pub(crate) fn run_wait_port(args: WaitPortArgs, settings: &Settings) -> Result<()> {
    let timeout = Duration::from_secs(args.timeout.unwrap_or_else(|| settings.wait_timeout_secs()));
    let interval = Duration::from_millis(args.interval.max(1));

    let elapsed = wait_for_port(&args.addr, timeout, interval)?;
    println!("{} is accepting connections ({:.1}s)", args.addr, elapsed.as_secs_f64());
    Ok(())
}
