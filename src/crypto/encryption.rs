use aes_gcm::{ aead::{ Aead, KeyInit }, Aes256Gcm, Nonce };
use rand::{ rng, RngCore };
use zeroize::Zeroizing;

use crate::error::{ AppError, Result };

const NONCE_LEN: usize = 12;

/// AES-256-GCM for signing keys at rest. Ciphertexts are hex `nonce || ciphertext`.
pub struct Encryptor {
    cipher: Aes256Gcm,
}

impl Encryptor {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(AppError::Encryption("Encryption key must be 32 bytes".to_string()));
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|e|
            AppError::Encryption(e.to_string())
        )?;

        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self.cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Encryption(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(hex::encode(combined))
    }

    /// The plaintext is wiped when the returned buffer is dropped.
    pub fn decrypt(&self, encrypted_hex: &str) -> Result<Zeroizing<String>> {
        let combined = hex
            ::decode(encrypted_hex.trim())
            .map_err(|e| AppError::Encryption(format!("Invalid hex: {}", e)))?;

        if combined.len() <= NONCE_LEN {
            return Err(AppError::Encryption("Encrypted data too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(nonce, ciphertext)
                .map_err(|e| AppError::Encryption(e.to_string()))?
        );

        std::str
            ::from_utf8(&plaintext)
            .map(|s| Zeroizing::new(s.to_string()))
            .map_err(|e| AppError::Encryption(format!("Invalid UTF-8: {}", e)))
    }
}
