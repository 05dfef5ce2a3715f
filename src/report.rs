use serde::Serialize;
use std::fmt::Write as _;

use crate::mac::format_mac;
use crate::{AdapterConfig, Resolution};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// KEY=VALUE lines
    #[default]
    Text,
    /// A JSON object
    Json,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NetworkReport {
    pub address: String,
    pub prefix: u8,
    pub subnet_mask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    pub dns: Vec<String>,
}

/// What the next deployment step needs to know about a resolved adapter
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolutionReport {
    pub adapter: String,
    pub mac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkReport>,
}

impl From<&Resolution> for ResolutionReport {
    fn from(resolution: &Resolution) -> Self {
        let (tsid, network) = match &resolution.config {
            AdapterConfig::TaskSequence { tsid } => (Some(tsid.clone()), None),
            AdapterConfig::StaticNetwork(profile) => (
                None,
                Some(NetworkReport {
                    address: profile.address.addr().to_string(),
                    prefix: profile.address.prefix_len(),
                    subnet_mask: profile.address.netmask().to_string(),
                    gateway: profile.gateway.map(|gw| gw.to_string()),
                    dns: profile.dns.iter().map(|d| d.to_string()).collect(),
                }),
            ),
        };

        ResolutionReport {
            adapter: resolution.adapter.name.clone(),
            mac: format_mac(&resolution.mac, '-'),
            tsid,
            network,
        }
    }
}

impl ResolutionReport {
    pub fn render(&self, format: ReportFormat) -> anyhow::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_variables()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)? + "\n"),
        }
    }

    /// Task-sequence style `KEY=VALUE` lines
    pub fn to_variables(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "ADAPTER={}", self.adapter);
        let _ = writeln!(out, "MAC={}", self.mac);
        if let Some(tsid) = &self.tsid {
            let _ = writeln!(out, "TSID={}", tsid);
        }
        if let Some(net) = &self.network {
            let _ = writeln!(out, "IP_ADDRESS={}", net.address);
            let _ = writeln!(out, "PREFIX={}", net.prefix);
            let _ = writeln!(out, "SUBNET_MASK={}", net.subnet_mask);
            if let Some(gw) = &net.gateway {
                let _ = writeln!(out, "GATEWAY={}", gw);
            }
            let _ = writeln!(out, "DNS_SERVERS={}", net.dns.join(","));
        }
        out
    }
}
