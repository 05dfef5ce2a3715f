use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use ipnet::Ipv4Net;

/// A network adapter reported by the host, MAC as the OS formats it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedAdapter {
    pub name: String,
    pub mac: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub address: Ipv4Net,
    pub gateway: Option<Ipv4Addr>,
    pub dns: Vec<Ipv4Addr>,
}

/// Deployment parameters bound to one adapter MAC
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterConfig {
    TaskSequence { tsid: String },
    StaticNetwork(NetworkProfile),
}

impl AdapterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterConfig::TaskSequence { .. } => "a task sequence",
            AdapterConfig::StaticNetwork(_) => "a static network profile",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableEntry {
    pub mac: String,
    pub config: AdapterConfig,
}

/// The adapter that won resolution and the configuration it maps to
#[derive(Debug, Clone)]
pub struct Resolution {
    pub adapter: DetectedAdapter,
    pub mac: String,
    pub config: AdapterConfig,
}

#[derive(Debug, Clone)]
pub struct CertificateRecord {
    pub subject: String,
    pub issuer: String,
    pub thumbprint: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub dns_names: Vec<String>,
    pub source: std::path::PathBuf,
}

impl CertificateRecord {
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

/// How `find_certificate` treats more than one SAN match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MatchPolicy {
    /// Exactly one certificate may match (default)
    #[default]
    Unique,
    /// The last match in store order wins
    LastWins,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Unique => write!(f, "unique"),
            MatchPolicy::LastWins => write!(f, "last-wins"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Success,
    SuccessRebootRequired,
    Failure(i32),
}

impl InstallOutcome {
    pub const REBOOT_REQUIRED: i32 = 3010;

    pub fn from_exit_code(code: i32) -> Self {
        match code {
            0 => InstallOutcome::Success,
            Self::REBOOT_REQUIRED => InstallOutcome::SuccessRebootRequired,
            other => InstallOutcome::Failure(other),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            InstallOutcome::Success => 0,
            InstallOutcome::SuccessRebootRequired => Self::REBOOT_REQUIRED,
            InstallOutcome::Failure(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, InstallOutcome::Failure(_))
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Success => write!(f, "success"),
            InstallOutcome::SuccessRebootRequired => write!(f, "success (reboot required)"),
            InstallOutcome::Failure(code) => write!(f, "failure (exit code {})", code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BootstrapFormat {
    Json,
    Xml,
}

impl fmt::Display for BootstrapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapFormat::Json => write!(f, "JSON"),
            BootstrapFormat::Xml => write!(f, "XML"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapChange {
    pub previous: Option<String>,
    pub tsid: String,
}
