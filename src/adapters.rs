use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::DetectedAdapter;

const IFF_UP: u32 = 0x1;

/// Source of the host's network adapters, in enumeration order
pub trait AdapterSource {
    fn adapters(&self) -> Result<Vec<DetectedAdapter>>;
}

/// Enabled physical adapters read from a sysfs-style `class/net` directory
#[derive(Debug, Clone)]
pub struct SysfsAdapters {
    root: PathBuf,
}

impl SysfsAdapters {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SysfsAdapters { root: root.into() }
    }
}

impl Default for SysfsAdapters {
    fn default() -> Self {
        SysfsAdapters::new("/sys/class/net")
    }
}

impl AdapterSource for SysfsAdapters {
    fn adapters(&self) -> Result<Vec<DetectedAdapter>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to enumerate adapters in {}", self.root.display()))?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "lo")
            .collect();
        names.sort();

        let mut adapters = Vec::new();
        for name in names {
            let dir = self.root.join(&name);

            // Virtual interfaces (bridges, tunnels, veth) have no backing device
            if !dir.join("device").exists() {
                continue;
            }
            if !is_admin_up(&dir) {
                tracing::debug!("Skipping disabled adapter {}", name);
                continue;
            }

            let mac = match read_trimmed(&dir.join("address")) {
                Some(mac) if !mac.is_empty() => mac,
                _ => continue,
            };

            adapters.push(DetectedAdapter { name, mac });
        }

        Ok(adapters)
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn is_admin_up(dir: &Path) -> bool {
    read_trimmed(&dir.join("flags"))
        .and_then(|flags| u32::from_str_radix(flags.trim_start_matches("0x"), 16).ok())
        .map(|flags| flags & IFF_UP != 0)
        .unwrap_or(false)
}

/// A fixed adapter list, e.g. MACs given on the command line
#[derive(Debug, Clone, Default)]
pub struct StaticAdapters(pub Vec<DetectedAdapter>);

impl StaticAdapters {
    pub fn from_macs<I, S>(macs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticAdapters(
            macs.into_iter()
                .enumerate()
                .map(|(i, mac)| DetectedAdapter {
                    name: format!("arg{}", i),
                    mac: mac.into(),
                })
                .collect(),
        )
    }
}

impl AdapterSource for StaticAdapters {
    fn adapters(&self) -> Result<Vec<DetectedAdapter>> {
        Ok(self.0.clone())
    }
}
