use anyhow::{Context, Result};
use ipnet::Ipv4Net;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;

use crate::mac::normalize_mac;
use crate::{AdapterConfig, DeployError, NetworkProfile, TableEntry};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(default, rename = "adapter")]
    adapters: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    mac: String,
    tsid: Option<String>,
    network: Option<RawNetwork>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetwork {
    address: String,
    subnet_mask: Option<String>,
    prefix: Option<u8>,
    gateway: Option<String>,
    #[serde(default)]
    dns: Vec<String>,
}

/// MAC-keyed deployment table, loaded from TOML.
///
/// Keys are normalized MACs and unique; entry order is the file order.
#[derive(Debug, Clone, Default)]
pub struct AdapterTable {
    entries: Vec<TableEntry>,
    index: HashMap<String, usize>,
}

impl AdapterTable {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read adapter table: {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("Invalid adapter table: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawTable = toml::from_str(text).context("Failed to parse adapter table TOML")?;

        let mut table = AdapterTable::default();
        for entry in raw.adapters {
            let mac = normalize_mac(&entry.mac)?;
            if table.index.contains_key(&mac) {
                return Err(DeployError::DuplicateMac { mac }.into());
            }

            let config = match (entry.tsid, entry.network) {
                (Some(tsid), None) => AdapterConfig::TaskSequence {
                    tsid: parse_tsid(&mac, &tsid)?,
                },
                (None, Some(network)) => {
                    AdapterConfig::StaticNetwork(parse_network(&mac, &network)?)
                }
                (Some(_), Some(_)) => {
                    return Err(DeployError::InvalidTableEntry {
                        mac,
                        found: "both",
                    }
                    .into())
                }
                (None, None) => {
                    return Err(DeployError::InvalidTableEntry {
                        mac,
                        found: "neither",
                    }
                    .into())
                }
            };

            table.index.insert(mac.clone(), table.entries.len());
            table.entries.push(TableEntry { mac, config });
        }

        Ok(table)
    }

    /// Look up a normalized MAC
    pub fn get(&self, mac: &str) -> Option<&AdapterConfig> {
        self.index.get(mac).map(|&i| &self.entries[i].config)
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validate a task sequence ID and return it in lower-case hyphenated form
pub(crate) fn parse_tsid(mac: &str, tsid: &str) -> Result<String, DeployError> {
    uuid::Uuid::parse_str(tsid.trim())
        .map(|id| id.hyphenated().to_string())
        .map_err(|_| DeployError::InvalidTsid {
            mac: mac.to_string(),
            tsid: tsid.to_string(),
        })
}

fn parse_network(mac: &str, raw: &RawNetwork) -> Result<NetworkProfile, DeployError> {
    let invalid = |reason: String| DeployError::InvalidNetworkProfile {
        mac: mac.to_string(),
        reason,
    };

    let address = Ipv4Addr::from_str(raw.address.trim())
        .map_err(|_| invalid(format!("bad address '{}'", raw.address)))?;

    let prefix = match (&raw.subnet_mask, raw.prefix) {
        (Some(mask), None) => {
            let mask = Ipv4Addr::from_str(mask.trim())
                .map_err(|_| invalid(format!("bad subnet mask '{}'", mask)))?;
            ipnet::ipv4_mask_to_prefix(mask)
                .map_err(|_| invalid(format!("non-contiguous subnet mask {}", mask)))?
        }
        (None, Some(prefix)) => prefix,
        (Some(_), Some(_)) => {
            return Err(invalid(
                "set either subnet_mask or prefix, not both".to_string(),
            ))
        }
        (None, None) => return Err(invalid("missing subnet_mask".to_string())),
    };

    let net = Ipv4Net::new(address, prefix)
        .map_err(|_| invalid(format!("bad prefix length {}", prefix)))?;

    let gateway = match &raw.gateway {
        Some(gw) if !gw.trim().is_empty() => {
            let gw = Ipv4Addr::from_str(gw.trim())
                .map_err(|_| invalid(format!("bad gateway '{}'", gw)))?;
            if !net.contains(&gw) {
                return Err(invalid(format!(
                    "gateway {} is outside {}",
                    gw,
                    net.trunc()
                )));
            }
            Some(gw)
        }
        _ => None,
    };

    let mut dns = Vec::with_capacity(raw.dns.len());
    for server in &raw.dns {
        let addr = Ipv4Addr::from_str(server.trim())
            .map_err(|_| invalid(format!("bad DNS server '{}'", server)))?;
        dns.push(addr);
    }

    Ok(NetworkProfile {
        address: net,
        gateway,
        dns,
    })
}
