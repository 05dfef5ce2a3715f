use anyhow::{anyhow, Context, Result};

use crate::certs::{find_certificate, normalize_thumbprint, CertStore, DirectoryStore};
use crate::host::{fqdn, local_hostname, system_dns_suffix};
use crate::settings::Settings;
use crate::{CertificateRecord, DeployError};

use super::{store_dir, CertCommands};

pub(crate) fn run_cert(command: CertCommands, settings: &Settings) -> Result<()> {
    match command {
        CertCommands::List { store } => {
            let store = DirectoryStore::new(store_dir(&store, settings)?);
            let records = store.certificates()?;
            for record in &records {
                print_record(record);
            }
            println!("Certificates found: {}", records.len());
            Ok(())
        }
        CertCommands::Find {
            store,
            issuer,
            hostname,
            dns_suffix,
            policy,
        } => {
            let store = DirectoryStore::new(store_dir(&store, settings)?);
            // An empty filter would match every issuer
            let issuer = issuer
                .or_else(|| settings.issuer_filter.clone())
                .filter(|issuer| !issuer.trim().is_empty())
                .ok_or_else(|| {
                    anyhow!("No issuer filter given (use --issuer or issuer_filter in --config)")
                })?;

            let hostname = match hostname.or_else(|| settings.hostname.clone()) {
                Some(hostname) => hostname,
                None => local_hostname()?,
            };
            let suffix = dns_suffix
                .or_else(|| settings.dns_suffix.clone())
                .or_else(system_dns_suffix)
                .unwrap_or_default();
            let fqdn = fqdn(&hostname, &suffix);

            let records = store.certificates()?;
            tracing::info!(
                "Looking for a certificate issued by '{}' with SAN {} among {} certificates ({} policy)",
                issuer,
                fqdn,
                records.len(),
                policy
            );
            let found = find_certificate(&records, &issuer, &fqdn, policy)?;
            if !found.is_valid_at(chrono::Utc::now()) {
                tracing::warn!(
                    "Certificate {} is outside its validity window ({} to {})",
                    found.thumbprint,
                    found.not_before,
                    found.not_after
                );
            }
            println!("{}", found.thumbprint);
            Ok(())
        }
        CertCommands::Remove {
            store,
            thumbprint,
            dry_run,
        } => {
            let store = DirectoryStore::new(store_dir(&store, settings)?);
            if dry_run {
                let wanted = normalize_thumbprint(&thumbprint);
                let record = store
                    .certificates()?
                    .into_iter()
                    .find(|r| r.thumbprint == wanted)
                    .ok_or(DeployError::CertificateNotFound(wanted))?;
                println!("Would delete:");
                print_record(&record);
                return Ok(());
            }

            let record = store
                .remove(&thumbprint)
                .with_context(|| format!("Failed to remove certificate from {}", store.dir().display()))?;
            println!("Deleted certificate {}", record.thumbprint);
            Ok(())
        }
    }
}

fn print_record(record: &CertificateRecord) {
    println!("{}", record.thumbprint);
    println!("  Subject:  {}", record.subject);
    println!("  Issuer:   {}", record.issuer);
    println!(
        "  Valid:    {} to {}",
        record.not_before.format("%Y-%m-%d"),
        record.not_after.format("%Y-%m-%d")
    );
    if !record.dns_names.is_empty() {
        println!("  DNS SAN:  {}", record.dns_names.join(", "));
    }
    println!("  File:     {}", record.source.display());
}
