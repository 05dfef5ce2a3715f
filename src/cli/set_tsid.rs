use anyhow::{bail, Context, Result};
use std::io::{self, Cursor, Write};

use crate::bootstrap::{read_tsid, set_tsid};
use crate::settings::Settings;
use crate::table::parse_tsid;
use crate::{AdapterConfig, BootstrapFormat, DeployError};

use super::output::{write_atomically, Destination};
use super::{resolve_from_args, SetTsidArgs};

pub(crate) fn run_set_tsid(args: SetTsidArgs, settings: &Settings) -> Result<()> {
    let format = match args.format {
        Some(format) => format,
        None => BootstrapFormat::from_path(&args.r#in).ok_or_else(|| {
            DeployError::UnknownBootstrapFormat(args.r#in.display().to_string())
        })?,
    };

    let tsid = match &args.tsid {
        Some(tsid) => parse_tsid("--tsid", tsid)?,
        None => {
            let resolution = resolve_from_args(&args.adapters, settings)?;
            match resolution.config {
                AdapterConfig::TaskSequence { tsid } => tsid,
                other => {
                    return Err(DeployError::UnexpectedAdapterConfig {
                        mac: resolution.adapter.mac,
                        expected: "a task sequence",
                        actual: other.kind(),
                    }
                    .into())
                }
            }
        }
    };

    let input_buf = std::fs::read(&args.r#in)
        .with_context(|| format!("Failed to read input file: {}", args.r#in.display()))?;

    let mut output_buf = Vec::new();
    let change = set_tsid(Cursor::new(&input_buf), &mut output_buf, format, &tsid)
        .with_context(|| format!("Failed to update {}", args.r#in.display()))?;

    // Post-condition: the rewritten document must carry the new TSID
    let written = read_tsid(Cursor::new(&output_buf), format)?;
    if written.as_deref() != Some(tsid.as_str()) {
        bail!(
            "Rewritten bootstrap document does not contain TSID {} (found {:?})",
            tsid,
            written
        );
    }

    if args.dry_run {
        print_diff(&input_buf, &output_buf)?;
        return Ok(());
    }

    let dest = match &args.out {
        Some(out) => Destination::File {
            input: &args.r#in,
            out,
            force: args.force,
        },
        None => Destination::InPlace(&args.r#in),
    };
    write_atomically(&dest, &output_buf)?;

    match &change.previous {
        Some(previous) if previous == &tsid => {
            tracing::info!("TSID already set to {}", tsid);
        }
        Some(previous) => tracing::info!("TSID changed from {} to {}", previous, tsid),
        None => tracing::info!("TSID added: {}", tsid),
    }
    println!("TSID={}", tsid);
    println!("Output written to: {}", dest.path().display());

    Ok(())
}

fn print_diff(before: &[u8], after: &[u8]) -> Result<()> {
    let before = String::from_utf8_lossy(before);
    let after = String::from_utf8_lossy(after);
    let mut out = io::stdout().lock();

    if before == after {
        writeln!(out, "No changes.")?;
        return Ok(());
    }

    let diff = similar::TextDiff::from_lines(before.as_ref(), after.as_ref());
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header("original", "updated")
        .to_string();
    write!(out, "{}", unified)?;
    Ok(())
}
