//! Random single-use nonces.

use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a generated nonce.
pub const NONCE_BYTES: usize = 16;

/// Draw a fresh 128-bit nonce from the OS RNG, hex encoded.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
