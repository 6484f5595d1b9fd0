//! Random encryption key generation

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

/// Bytes of entropy in a generated key (32 hex characters)
pub const GENERATED_KEY_BYTES: usize = 16;

/// Generate a random 32-character hex encryption key.
///
/// Draws from the operating system CSPRNG and only falls back to the
/// thread-local generator if the OS source is unavailable.
pub fn generate_encrypt_key() -> String {
    let mut bytes = [0u8; GENERATED_KEY_BYTES];
    if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
        warn!("[KeyGen] OS random source unavailable, using thread rng: {}", e);
        rand::thread_rng().fill_bytes(&mut bytes);
    }
    hex::encode(bytes)
}
