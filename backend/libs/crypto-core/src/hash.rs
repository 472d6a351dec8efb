use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest when deriving a visitor id.
pub const VISITOR_ID_LEN: usize = 16;

/// Compute SHA256 hash of input bytes
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Lowercase hex encoding of the SHA256 digest
pub fn sha256_hex(input: &[u8]) -> String {
    hex::encode(sha256(input))
}

/// Stable, non-reversible visitor identifier derived from a client IP.
///
/// Used as the key of a view record, so the same address always maps
/// to the same id while the raw IP is never stored.
pub fn visitor_id(client_ip: &str) -> String {
    let mut digest = sha256_hex(client_ip.trim().as_bytes());
    digest.truncate(VISITOR_ID_LEN);
    digest
}
