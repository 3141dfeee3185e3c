//! Opaque API token keys and the `Authorization` header scheme.

use rand::RngCore;

/// Scheme keyword expected before the key: `Authorization: Token <key>`.
pub const TOKEN_SCHEME: &str = "Token";

/// Random bytes per key; hex-encoded to twice as many characters.
const KEY_BYTES: usize = 20;

/// Generate a fresh 40-character lowercase hex key.
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Why an `Authorization` header could not be turned into a key.
#[derive(Debug, PartialEq, Eq)]
pub enum HeaderProblem {
    /// No `Token` scheme present; the request is treated as anonymous.
    Missing,
    /// `Token` scheme present but no key, or extra words after it.
    Malformed,
}

/// Extract the key from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything other than exactly
/// `Token <key>` is rejected.
pub fn parse_authorization(header: Option<&str>) -> Result<&str, HeaderProblem> {
    let header = header.ok_or(HeaderProblem::Missing)?;
    let mut parts = header.split_whitespace();

    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {}
        _ => return Err(HeaderProblem::Missing),
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(key),
        _ => Err(HeaderProblem::Malformed),
    }
}
