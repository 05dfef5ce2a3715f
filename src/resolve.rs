use anyhow::Result;

use crate::mac::normalize_mac;
use crate::table::AdapterTable;
use crate::{DeployError, DetectedAdapter, Resolution};

/// Pick the first adapter, in enumeration order, that has a table entry.
///
/// Fails closed with `NoMatchingAdapter` (listing every detected MAC) when
/// nothing matches. Adapters whose MAC cannot be normalized are skipped.
pub fn resolve_adapter(adapters: &[DetectedAdapter], table: &AdapterTable) -> Result<Resolution> {
    for adapter in adapters {
        let mac = match normalize_mac(&adapter.mac) {
            Ok(mac) => mac,
            Err(e) => {
                tracing::warn!("Skipping adapter {}: {}", adapter.name, e);
                continue;
            }
        };

        if let Some(config) = table.get(&mac) {
            tracing::info!(
                "Adapter {} ({}) matches the table: {}",
                adapter.name,
                adapter.mac,
                config.kind()
            );
            return Ok(Resolution {
                adapter: adapter.clone(),
                mac,
                config: config.clone(),
            });
        }

        tracing::debug!("Adapter {} ({}) has no table entry", adapter.name, adapter.mac);
    }

    Err(DeployError::NoMatchingAdapter {
        detected: adapters.iter().map(|a| a.mac.clone()).collect(),
    }
    .into())
}
