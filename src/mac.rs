use crate::DeployError;

/// Normalize a MAC address to 12 upper-case hex digits with no separators.
///
/// Accepts colon, dash, dot and whitespace separators in any position, so
/// `00:15:5d:10:10:01`, `00-15-5D-10-10-01` and `0015.5d10.1001` all
/// normalize to `00155D101001`.
pub fn normalize_mac(raw: &str) -> Result<String, DeployError> {
    let normalized: String = raw
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.') && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.len() != 12 || !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DeployError::InvalidMac(raw.to_string()));
    }

    Ok(normalized)
}

/// Format a normalized MAC with the given separator between octets
pub fn format_mac(normalized: &str, separator: char) -> String {
    let mut out = String::with_capacity(17);
    for (i, ch) in normalized.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
