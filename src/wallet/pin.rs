//! PIN and encryption key validation, and the one-way PIN digest sent to the merchant backend

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

/// Salt appended to the PIN when the caller supplies none.
/// Backends compare digests, so this value is part of the wire format.
pub const DEFAULT_PIN_SALT: &str = "chipi-wallet-salt";

pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 32;
pub const KEY_MIN_LEN: usize = 4;
pub const KEY_MAX_LEN: usize = 64;

static HEX_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]*$").expect("static regex"));

/// How the PIN is turned into the value stored on the merchant record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinDigest {
    /// Hex SHA-256 of `pin + salt`
    #[default]
    Sha256,
    /// 32-bit rolling string hash, for records written by clients without a secure digest
    Legacy32,
}

/// PINs may be numeric or alphanumeric, 4 to 32 UTF-16 code units
pub fn validate_pin(pin: &str) -> bool {
    let len = pin.encode_utf16().count();
    (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&len)
}

/// Explicit keys must be hex, 4 to 64 characters
pub fn validate_encrypt_key(key: &str) -> bool {
    (KEY_MIN_LEN..=KEY_MAX_LEN).contains(&key.len()) && HEX_KEY.is_match(key)
}

/// Derive the value sent to the merchant backend in place of the raw PIN
pub fn derive_pin_secret(pin: &str, salt: Option<&str>, digest: PinDigest) -> String {
    let salt = salt.unwrap_or(DEFAULT_PIN_SALT);
    match digest {
        PinDigest::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(pin.as_bytes());
            hasher.update(salt.as_bytes());
            hex::encode(hasher.finalize())
        }
        PinDigest::Legacy32 => legacy_pin_hash(pin, salt),
    }
}

/// `h = h * 31 + c` over UTF-16 code units with i32 wraparound,
/// rendered as the absolute value in hex, zero-padded to 8 digits.
pub fn legacy_pin_hash(pin: &str, salt: &str) -> String {
    let hash = pin
        .encode_utf16()
        .chain(salt.encode_utf16())
        .fold(0i32, |h, unit| {
            h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
        });
    format!("{:08x}", i64::from(hash).abs())
}
