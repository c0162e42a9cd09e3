use super::PasswordHasher;
use base64::{engine::general_purpose, Engine as _};
use sha2::Sha256;

/// PBKDF2 rounds applied per derivation
pub const ITERATIONS: u32 = 512;
/// Length of the derived key before text encoding
pub const DIGEST_BYTES: usize = 16;

/// PBKDF2-HMAC-SHA256 password digest.
///
/// The salt is the configured worker salt; the derived key is rendered as unpadded
/// base64url text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pbkdf2PasswordHasher;

fn derive(salt: &str, password: &str, rounds: u32) -> [u8; DIGEST_BYTES] {
    let mut key = [0u8; DIGEST_BYTES];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), rounds, &mut key);
    key
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, salt: &str, password: &str) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(derive(salt, password, ITERATIONS))
    }
}
