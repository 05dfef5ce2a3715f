use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::adapters::{AdapterSource, StaticAdapters, SysfsAdapters};
use crate::report::ReportFormat;
use crate::settings::Settings;
use crate::table::AdapterTable;
use crate::{logging, BootstrapFormat, MatchPolicy, Resolution};

mod cert;
mod install;
mod output;
mod resolve;
mod set_tsid;
mod wait;

#[derive(Parser)]
#[command(
    name = "deploykit",
    version,
    about = "Provisioning helpers for a Windows deployment environment",
    long_about = "Resolves per-machine deployment settings from the host's network adapters, \
                  rewrites the bootstrap document, locates the machine certificate and wraps \
                  installer exit codes.",
    after_help = "Examples:\n  deploykit resolve --table ./adapters.toml\n  deploykit set-tsid --table ./adapters.toml --in ./bootstrap.json\n  deploykit cert find --store ./certs --issuer \"Corp Issuing CA\" --dns-suffix corp.example\n  deploykit install -- ./setup.exe /quiet /norestart\n  deploykit wait-port --addr 127.0.0.1:1433 --timeout 60"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CommonArgs {
    /// Settings file (TOML); flags override its values
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Also write a time-stamped log file into this directory
    #[arg(long, global = true)]
    pub(crate) log_dir: Option<PathBuf>,

    /// Show debug diagnostics
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

/// Where adapters and their configuration come from
#[derive(Args, Debug, Clone)]
pub(crate) struct AdapterArgs {
    /// Adapter configuration table (TOML)
    #[arg(short, long)]
    pub(crate) table: Option<PathBuf>,

    /// Use these MACs instead of detecting adapters (repeatable, in order)
    #[arg(long = "mac", value_name = "MAC")]
    pub(crate) macs: Vec<String>,

    /// Root of the adapter enumeration tree
    #[arg(long, default_value = "/sys/class/net", hide = true)]
    pub(crate) sysfs_root: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    #[command(flatten)]
    pub(crate) adapters: AdapterArgs,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub(crate) output: ReportFormat,
}

#[derive(Args, Debug)]
pub(crate) struct SetTsidArgs {
    #[command(flatten)]
    pub(crate) adapters: AdapterArgs,

    /// Write this TSID instead of resolving one from the adapters
    #[arg(long, conflicts_with_all = ["table", "macs"])]
    pub(crate) tsid: Option<String>,

    /// Bootstrap document to update
    #[arg(short, long)]
    pub(crate) r#in: PathBuf,

    /// Write the result here instead of updating the input in place
    #[arg(short, long)]
    pub(crate) out: Option<PathBuf>,

    /// Document format (default: from the input extension)
    #[arg(long, value_enum)]
    pub(crate) format: Option<BootstrapFormat>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub(crate) force: bool,

    /// Show the change as a diff without writing anything
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct StoreArgs {
    /// Certificate store directory
    #[arg(short, long)]
    pub(crate) store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CertCommands {
    /// List certificates in the store
    List {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the thumbprint of the certificate whose SAN matches this host
    Find {
        #[command(flatten)]
        store: StoreArgs,

        /// Only certificates whose issuer contains this text are considered
        /// (required, here or as issuer_filter in --config)
        #[arg(long)]
        issuer: Option<String>,

        /// Host name (default: the local host name)
        #[arg(long)]
        hostname: Option<String>,

        /// DNS suffix appended to the host name (default: system suffix)
        #[arg(long)]
        dns_suffix: Option<String>,

        /// What to do when several certificates match
        #[arg(long, value_enum, default_value_t = MatchPolicy::Unique)]
        policy: MatchPolicy,
    },

    /// Delete a certificate from the store
    Remove {
        #[command(flatten)]
        store: StoreArgs,

        /// Thumbprint of the certificate to delete
        #[arg(long)]
        thumbprint: String,

        /// Show what would be deleted without deleting it
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Debug)]
pub(crate) struct InstallArgs {
    /// Exit with 3010 when the installer asks for a reboot
    #[arg(long)]
    pub(crate) propagate_reboot: bool,

    /// Installer command line
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) command: Vec<OsString>,
}

#[derive(Args, Debug)]
pub(crate) struct WaitPortArgs {
    /// host:port that must accept connections
    #[arg(long)]
    pub(crate) addr: String,

    /// Seconds to wait before failing (default 30)
    #[arg(long)]
    pub(crate) timeout: Option<u64>,

    /// Milliseconds between attempts
    #[arg(long, default_value_t = 1000)]
    pub(crate) interval: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the configuration selected for this machine's adapters (read-only)
    Resolve(ResolveArgs),

    /// Write the resolved task sequence ID into a bootstrap document
    SetTsid(SetTsidArgs),

    /// Machine certificate lookup and cleanup
    Cert {
        #[command(subcommand)]
        command: CertCommands,
    },

    /// Run an installer and classify its exit code (0, 3010 reboot, else failure)
    Install(InstallArgs),

    /// Wait until a TCP port accepts connections
    WaitPort(WaitPortArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Resolve(_) => "resolve",
            Commands::SetTsid(_) => "set-tsid",
            Commands::Cert { .. } => "cert",
            Commands::Install(_) => "install",
            Commands::WaitPort(_) => "wait-port",
        }
    }
}

pub fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let settings = Settings::load_optional(cli.common.config.as_deref())?;

    let log_dir = cli.common.log_dir.clone().or_else(|| settings.log_dir.clone());
    if let Some(path) = logging::init(cli.command.name(), cli.common.verbose, log_dir.as_deref())? {
        tracing::info!("Logging to {}", path.display());
    }

    match cli.command {
        Commands::Resolve(args) => resolve::run_resolve(args, &settings),
        Commands::SetTsid(args) => set_tsid::run_set_tsid(args, &settings),
        Commands::Cert { command } => cert::run_cert(command, &settings),
        Commands::Install(args) => install::run_install(args),
        Commands::WaitPort(args) => wait::run_wait_port(args, &settings),
    }
}

/// Load the table and resolve this machine's adapter against it
pub(crate) fn resolve_from_args(args: &AdapterArgs, settings: &Settings) -> Result<Resolution> {
    let table_path = args
        .table
        .as_deref()
        .or(settings.adapter_table.as_deref())
        .ok_or_else(|| anyhow!("No adapter table given (use --table or adapter_table in --config)"))?;
    let table = AdapterTable::load(table_path)?;
    tracing::debug!(
        "Loaded {} adapter entries from {}",
        table.len(),
        table_path.display()
    );

    let adapters = if args.macs.is_empty() {
        SysfsAdapters::new(&args.sysfs_root).adapters()?
    } else {
        StaticAdapters::from_macs(args.macs.iter().cloned()).adapters()?
    };

    crate::resolve_adapter(&adapters, &table)
}

pub(crate) fn store_dir<'a>(args: &'a StoreArgs, settings: &'a Settings) -> Result<&'a Path> {
    args.store
        .as_deref()
        .or(settings.cert_store.as_deref())
        .ok_or_else(|| anyhow!("No certificate store given (use --store or cert_store in --config)"))
}
