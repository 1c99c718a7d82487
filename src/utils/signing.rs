//! Server-wide secret key used by the Auth Adapter to encrypt/decrypt the
//! session tokens stored alongside a user record (see
//! `database::interface::users::decrypt_session_token`).

use log::{debug, error};
use rand::{rngs::OsRng, RngCore};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use std::path::Path;
use tokio::{
    fs::{write, File},
    io::AsyncReadExt,
};

/// Symmetric key used to encrypt session tokens before they are persisted,
/// and to decrypt them again when verifying a presented token.
pub struct ServerKey(LessSafeKey);

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("stored ciphertext is malformed")]
    Malformed,
    #[error("ciphertext could not be decrypted")]
    Invalid,
}

impl ServerKey {
    const KEY_LENGTH: usize = 32;

    /// Loads the global server key from disk, generating and persisting a
    /// new one on first run.
    pub async fn global() -> Self {
        let secret_path = Path::new("data/secret.bin");

        if secret_path.exists() {
            match Self::from_file(secret_path).await {
                Ok(value) => return value,
                Err(err) => {
                    error!("Failed to load existing secret key file: {}", err);
                }
            }
        }

        debug!("Generating server secret key...");
        let (key, secret) = Self::generate();
        if let Err(err) = write(secret_path, secret).await {
            error!("Failed to save secret key file: {}", err);
        }

        key
    }

    fn new(secret: [u8; Self::KEY_LENGTH]) -> Self {
        let unbound =
            UnboundKey::new(&AES_256_GCM, &secret).expect("server key length must match AES-256");
        Self(LessSafeKey::new(unbound))
    }

    fn generate() -> (Self, [u8; Self::KEY_LENGTH]) {
        let mut secret = [0u8; Self::KEY_LENGTH];
        OsRng.fill_bytes(&mut secret);
        (Self::new(secret), secret)
    }

    async fn from_file(file: &Path) -> std::io::Result<ServerKey> {
        let mut secret = [0u8; Self::KEY_LENGTH];
        let mut file = File::open(file).await?;
        file.read_exact(&mut secret).await?;
        Ok(Self::new(secret))
    }

    /// Encrypts `plaintext`, returning `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &str) -> Vec<u8> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        self.0
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .expect("encryption must not fail for a well-formed key");

        let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        out
    }

    /// Decrypts a value produced by [`ServerKey::encrypt`].
    pub fn decrypt(&self, stored: &[u8]) -> Result<String, KeyError> {
        if stored.len() < NONCE_LEN {
            return Err(KeyError::Malformed);
        }
        let (nonce_bytes, ciphertext) = stored.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| KeyError::Malformed)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .0
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| KeyError::Invalid)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| KeyError::Invalid)
    }
}

#[cfg(test)]
mod test {
    use super::ServerKey;

    #[test]
    fn test_round_trip() {
        let (key, _) = ServerKey::generate();
        let token = "a-session-token-value";
        let encrypted = key.encrypt(token);
        let decrypted = key.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, token);
    }

    #[test]
    fn test_tamper_detected() {
        let (key, _) = ServerKey::generate();
        let mut encrypted = key.encrypt("token");
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xFF;
        assert!(key.decrypt(&encrypted).is_err());
    }
}
