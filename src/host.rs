use anyhow::{Context, Result};
use std::path::Path;

/// Local host name as the OS reports it
#[cfg(unix)]
pub fn local_hostname() -> Result<String> {
    let name = nix::unistd::gethostname().context("Failed to read host name")?;
    Ok(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
pub fn local_hostname() -> Result<String> {
    std::env::var("COMPUTERNAME").context("COMPUTERNAME is not set")
}

/// DNS suffix from the last `domain` or `search` line of a resolv.conf
pub fn dns_suffix_from_resolv_conf(text: &str) -> Option<String> {
    let mut suffix = None;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let mut words = line.split_whitespace();
        match words.next() {
            Some("domain") | Some("search") => {
                if let Some(first) = words.next() {
                    suffix = Some(first.trim_end_matches('.').to_string());
                }
            }
            _ => {}
        }
    }
    suffix
}

pub fn system_dns_suffix() -> Option<String> {
    let path = Path::new("/etc/resolv.conf");
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| dns_suffix_from_resolv_conf(&text))
}

/// Host name joined with the DNS suffix; the bare host name if the suffix is empty
pub fn fqdn(hostname: &str, dns_suffix: &str) -> String {
    let host = hostname.trim().trim_end_matches('.');
    let suffix = dns_suffix.trim().trim_matches('.');
    if suffix.is_empty() {
        host.to_string()
    } else {
        format!("{}.{}", host, suffix)
    }
}
