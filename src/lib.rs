pub mod adapters;
pub mod bootstrap;
pub mod certs;
pub mod cli;
mod errors;
pub mod host;
pub mod install;
pub mod logging;
pub mod mac;
pub mod report;
mod resolve;
pub mod settings;
pub mod table;
mod types;
pub mod wait;
mod xml_helpers;

pub use adapters::{AdapterSource, StaticAdapters, SysfsAdapters};
pub use bootstrap::{read_tsid, set_tsid};
pub use certs::{find_certificate, san_matches, CertStore, DirectoryStore};
pub use errors::DeployError;
pub use install::run_installer;
pub use mac::normalize_mac;
pub use report::{ReportFormat, ResolutionReport};
pub use resolve::resolve_adapter;
pub use table::AdapterTable;
pub use types::{
    AdapterConfig, BootstrapChange, BootstrapFormat, CertificateRecord, DetectedAdapter,
    InstallOutcome, MatchPolicy, NetworkProfile, Resolution, TableEntry,
};
pub use wait::wait_until;
