use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

fn refuse_same_path(input: &Path, out: &Path) -> Result<()> {
    let in_canonical = std::fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
    let (out_canonical, out_missing) = match std::fs::canonicalize(out) {
        Ok(path) => (path, false),
        Err(e) => (out.to_path_buf(), e.kind() == io::ErrorKind::NotFound),
    };

    let mut candidates = vec![out_canonical];
    if out_missing {
        if let (Some(parent), Some(file_name)) = (out.parent(), out.file_name()) {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Ok(parent_canonical) = std::fs::canonicalize(parent) {
                candidates.push(parent_canonical.join(file_name));
            }
        }
    }

    if let Some(same) = candidates.iter().find(|c| **c == in_canonical) {
        bail!(
            concat!(
                "Output path must be different from input path (omit --out to update in place).\n",
                "Input:  {}\n",
                "Output: {}"
            ),
            in_canonical.display(),
            same.display()
        );
    }
    Ok(())
}

/// Where a rewritten document goes: a separate file, or back over its input
pub(crate) enum Destination<'a> {
    InPlace(&'a Path),
    File { input: &'a Path, out: &'a Path, force: bool },
}

impl Destination<'_> {
    pub(crate) fn path(&self) -> &Path {
        match self {
            Destination::InPlace(path) => *path,
            Destination::File { out, .. } => *out,
        }
    }

    /// Refuse to clobber the input or an existing file without --force
    pub(crate) fn check(&self) -> Result<()> {
        if let Destination::File { input, out, force } = self {
            refuse_same_path(input, out)?;
            if !*force && out.exists() {
                bail!(
                    "Output file already exists: {} (use --force to overwrite)",
                    out.display()
                );
            }
        }
        Ok(())
    }
}

/// Write `contents` through a synced temp file renamed over the target
pub(crate) fn write_atomically(dest: &Destination<'_>, contents: &[u8]) -> Result<()> {
    dest.check()?;
    let target = dest.path();

    let tmp_path: PathBuf = target.with_extension(format!("tmp.{}", std::process::id()));
    let mut tmp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary output file: {}",
                tmp_path.display()
            )
        })?;

    let written = tmp_file
        .write_all(contents)
        .and_then(|_| tmp_file.sync_all());
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!(
                "Failed to write temporary output file: {}",
                tmp_path.display()
            )
        });
    }
    drop(tmp_file);

    if let Err(e) = std::fs::rename(&tmp_path, target) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e)
            .with_context(|| format!("Failed to replace output file: {}", target.display()));
    }

    Ok(())
}
