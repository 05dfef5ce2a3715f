mod matcher;
mod parse;
mod store;

pub use matcher::{find_certificate, san_matches};
pub use parse::{normalize_thumbprint, parse_certificate, thumbprint};
pub use store::{CertStore, DirectoryStore};
