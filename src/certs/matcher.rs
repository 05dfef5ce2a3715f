use anyhow::Result;

use crate::{CertificateRecord, DeployError, MatchPolicy};

/// True if any SAN DNS entry equals `fqdn` (case-sensitive)
pub fn san_matches(record: &CertificateRecord, fqdn: &str) -> bool {
    record.dns_names.iter().any(|name| name == fqdn)
}

/// Locate the certificate whose SAN names this host.
///
/// Only certificates whose issuer contains `issuer_filter` are candidates.
/// Under `MatchPolicy::Unique` more than one match is an error; under
/// `MatchPolicy::LastWins` the last match in store order is returned.
pub fn find_certificate<'a>(
    records: &'a [CertificateRecord],
    issuer_filter: &str,
    fqdn: &str,
    policy: MatchPolicy,
) -> Result<&'a CertificateRecord> {
    let matches: Vec<&CertificateRecord> = records
        .iter()
        .filter(|r| r.issuer.contains(issuer_filter))
        .filter(|r| {
            let hit = san_matches(r, fqdn);
            tracing::debug!(
                "Candidate {} (SAN: {}): {}",
                r.thumbprint,
                r.dns_names.join(", "),
                if hit { "match" } else { "no match" }
            );
            hit
        })
        .collect();

    let selected = match (matches.as_slice(), policy) {
        ([], _) => None,
        ([only], _) => Some(*only),
        (many, MatchPolicy::LastWins) => {
            tracing::warn!(
                "{} certificates match {}; using the last one",
                many.len(),
                fqdn
            );
            many.last().copied()
        }
        (many, MatchPolicy::Unique) => {
            return Err(DeployError::AmbiguousCertificate {
                fqdn: fqdn.to_string(),
                thumbprints: many.iter().map(|r| r.thumbprint.clone()).collect(),
            }
            .into())
        }
    };

    selected.ok_or_else(|| {
        DeployError::NoMatchingCertificate {
            issuer: issuer_filter.to_string(),
            fqdn: fqdn.to_string(),
        }
        .into()
    })
}
