use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::parse::{normalize_thumbprint, parse_certificate};
use crate::{CertificateRecord, DeployError};

const CERT_EXTENSIONS: &[&str] = &["cer", "crt", "der", "pem"];

/// A machine certificate store
pub trait CertStore {
    /// All readable certificates, in store order
    fn certificates(&self) -> Result<Vec<CertificateRecord>>;

    /// Delete the certificate with the given thumbprint and return it
    fn remove(&self, thumbprint: &str) -> Result<CertificateRecord>;
}

/// One certificate per file in a directory, ordered by file name
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn cert_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).with_context(|| {
            format!("Failed to open certificate store: {}", self.dir.display())
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && has_cert_extension(p))
            .collect();
        files.sort();
        Ok(files)
    }
}

impl CertStore for DirectoryStore {
    fn certificates(&self) -> Result<Vec<CertificateRecord>> {
        let mut records = Vec::new();
        for path in self.cert_files()? {
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read certificate: {}", path.display()))?;
            match parse_certificate(&bytes, &path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping {:#}", e),
            }
        }
        Ok(records)
    }

    fn remove(&self, thumbprint: &str) -> Result<CertificateRecord> {
        let wanted = normalize_thumbprint(thumbprint);
        let record = self
            .certificates()?
            .into_iter()
            .find(|r| r.thumbprint == wanted)
            .ok_or_else(|| DeployError::CertificateNotFound(wanted.clone()))?;

        fs::remove_file(&record.source).with_context(|| {
            format!(
                "Failed to delete certificate {}: {}",
                record.thumbprint,
                record.source.display()
            )
        })?;
        tracing::info!(
            "Deleted certificate {} ({})",
            record.thumbprint,
            record.subject
        );

        Ok(record)
    }
}

fn has_cert_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CERT_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c)))
        .unwrap_or(false)
}
