use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    #[error("MAC address {mac} appears more than once in the adapter table")]
    DuplicateMac { mac: String },

    #[error(
        "Adapter table entry {mac} must set exactly one of `tsid` or `network` (found {found})"
    )]
    InvalidTableEntry { mac: String, found: &'static str },

    #[error("Invalid task sequence ID for {mac}: {tsid}")]
    InvalidTsid { mac: String, tsid: String },

    #[error("Invalid network profile for {mac}: {reason}")]
    InvalidNetworkProfile { mac: String, reason: String },

    #[error(
        "No detected adapter matches the adapter table. Detected MACs: {}",
        join_or_none(.detected)
    )]
    NoMatchingAdapter { detected: Vec<String> },

    #[error("Adapter {mac} is configured with {actual}, expected {expected}")]
    UnexpectedAdapterConfig {
        mac: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Bootstrap document has no {0} section")]
    BootstrapFieldMissing(String),

    #[error("Bootstrap XML uses the prefixed attribute {0}, which cannot be rewritten without loss")]
    UnsupportedBootstrapMarkup(String),

    #[error("Cannot determine bootstrap document format for {0} (use --format)")]
    UnknownBootstrapFormat(String),

    #[error("No certificate issued by '{issuer}' has a SAN matching {fqdn}")]
    NoMatchingCertificate { issuer: String, fqdn: String },

    #[error(
        "{} certificates have a SAN matching {fqdn}: {}",
        .thumbprints.len(),
        join_or_none(.thumbprints)
    )]
    AmbiguousCertificate {
        fqdn: String,
        thumbprints: Vec<String>,
    },

    #[error("Certificate {0} not found in store")]
    CertificateNotFound(String),

    #[error("Installer exited with code {code}")]
    InstallerFailed { code: i32 },

    #[error("Installer succeeded; a reboot is required")]
    RebootRequired,

    #[error("Timed out after {elapsed:?} waiting for {what}")]
    WaitTimeout { what: String, elapsed: Duration },
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
