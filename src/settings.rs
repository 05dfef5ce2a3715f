//! Optional TOML settings file shared by all subcommands.
//!
//! Command-line flags always take precedence over values read here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub adapter_table: Option<PathBuf>,
    pub cert_store: Option<PathBuf>,
    pub issuer_filter: Option<String>,
    pub dns_suffix: Option<String>,
    pub hostname: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub wait_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Settings = toml::from_str(&text)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        // Relative paths are taken relative to the settings file
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Settings {
            adapter_table: settings.adapter_table.map(|p| base.join(p)),
            cert_store: settings.cert_store.map(|p| base.join(p)),
            log_dir: settings.log_dir.map(|p| base.join(p)),
            ..settings
        })
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Settings::default()),
        }
    }

    pub fn wait_timeout_secs(&self) -> u64 {
        self.wait_timeout_secs.unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_relative_paths_follow_settings_file() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "deploykit_settings_{}_{}",
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("deploykit.toml");
        std::fs::write(
            &path,
            "adapter_table = \"adapters.toml\"\ncert_store = \"/var/lib/certs\"\nissuer_filter = \"Corp\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.adapter_table, Some(dir.join("adapters.toml")));
        assert_eq!(settings.cert_store, Some(PathBuf::from("/var/lib/certs")));
        assert_eq!(settings.issuer_filter.as_deref(), Some("Corp"));
        assert_eq!(settings.wait_timeout_secs(), DEFAULT_WAIT_TIMEOUT_SECS);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = toml::from_str::<Settings>("adapter_tabel = \"x\"").unwrap_err();
        assert!(err.to_string().contains("adapter_tabel"));
    }
}
