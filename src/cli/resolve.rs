use anyhow::Result;

use crate::report::ResolutionReport;
use crate::settings::Settings;

use super::{resolve_from_args, ResolveArgs};

pub(crate) fn run_resolve(args: ResolveArgs, settings: &Settings) -> Result<()> {
    let resolution = resolve_from_args(&args.adapters, settings)?;
    let report = ResolutionReport::from(&resolution);
    print!("{}", report.render(args.output)?);
    Ok(())
}
