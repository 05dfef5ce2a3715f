use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use sha1::{Digest, Sha1};
use std::fmt::Write as _;
use std::path::Path;
use x509_cert::der::oid::AssociatedOid;
use x509_cert::der::{Decode, Document};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::SubjectAltName;
use x509_cert::Certificate;

use crate::CertificateRecord;

/// Parse a single DER or PEM encoded certificate.
///
/// The thumbprint is taken over the stored DER bytes (the PEM payload for
/// PEM files), never over a re-encoding.
pub fn parse_certificate(bytes: &[u8], source: &Path) -> Result<CertificateRecord> {
    let der = der_bytes(bytes)
        .with_context(|| format!("Failed to decode certificate: {}", source.display()))?;
    let cert = Certificate::from_der(&der)
        .with_context(|| format!("Failed to decode certificate: {}", source.display()))?;

    let tbs = &cert.tbs_certificate;
    let mut dns_names = Vec::new();
    for ext in tbs.extensions.iter().flatten() {
        if ext.extn_id != SubjectAltName::OID {
            continue;
        }
        let san = SubjectAltName::from_der(ext.extn_value.as_bytes())
            .with_context(|| format!("Malformed SAN extension: {}", source.display()))?;
        for name in san.0 {
            if let GeneralName::DnsName(dns) = name {
                dns_names.push(dns.to_string());
            }
        }
    }

    Ok(CertificateRecord {
        subject: tbs.subject.to_string(),
        issuer: tbs.issuer.to_string(),
        thumbprint: thumbprint(&der),
        not_before: DateTime::<Utc>::from(tbs.validity.not_before.to_system_time()),
        not_after: DateTime::<Utc>::from(tbs.validity.not_after.to_system_time()),
        dns_names,
        source: source.to_path_buf(),
    })
}

/// Upper-case hex SHA-1 of the DER encoding
pub fn thumbprint(der: &[u8]) -> String {
    let digest = Sha1::digest(der);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

/// Canonical form for comparing user-supplied thumbprints
pub fn normalize_thumbprint(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// The DER encoding as stored: the file itself, or the decoded PEM payload
fn der_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    if !is_pem(bytes) {
        return Ok(bytes.to_vec());
    }

    let text = std::str::from_utf8(bytes).context("PEM file is not valid UTF-8")?;
    let (label, doc) =
        Document::from_pem(text.trim_start()).map_err(|e| anyhow!("Invalid PEM: {}", e))?;
    if label != "CERTIFICATE" {
        bail!("Unexpected PEM label '{}'", label);
    }
    Ok(doc.as_bytes().to_vec())
}

fn is_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}
