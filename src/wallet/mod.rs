//! Wallet secrets: validation, derivation, generation, local caching,
//! and address extraction from wallet-service responses.

mod address;
mod generator;
mod key_store;
mod pin;
mod secret;

pub use address::{extract_address, AddressRule, ADDRESS_RULES};
pub use generator::{generate_encrypt_key, GENERATED_KEY_BYTES};
pub use key_store::{
    clear_stored_encryption_key, open_key_store, storage_key, stored_encryption_key,
    KeyValueStore, MemoryKeyStore, SqliteKeyStore, UnavailableKeyStore,
};
pub use pin::{
    derive_pin_secret, legacy_pin_hash, validate_encrypt_key, validate_pin, PinDigest,
    DEFAULT_PIN_SALT,
};
pub use secret::{resolve_secret, ResolvedSecret, SecretSource};
