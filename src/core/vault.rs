//! Encryption for stored connection passwords. AES-256-GCM with the key
//! derived from JWT_SECRET when set, otherwise from machine-specific
//! identifiers so the ciphertext is stable across restarts but tied to
//! the host. Values are framed as base64(nonce || ciphertext).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::Result;
use base64::Engine;
use hmac::Mac;
use sha2::Sha256;

type HmacSha256 = hmac::Hmac<Sha256>;

pub struct PasswordVault {
    cipher: Aes256Gcm,
}

fn derive_key(secret: Option<&str>) -> [u8; 32] {
    let input = match secret {
        Some(secret) => secret.to_string(),
        None => {
            let host = hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown-host".to_string());
            format!("{}{}", host, whoami::username())
        }
    };

    let mut mac = <HmacSha256 as Mac>::new_from_slice(b"cockpit-vault-v1")
        .expect("HMAC can take key of any size");
    mac.update(input.as_bytes());
    let bytes = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    key
}

impl PasswordVault {
    pub fn new(secret: Option<&str>) -> Self {
        let key = derive_key(secret);
        let cipher = Aes256Gcm::new_from_slice(&key).expect("32-byte key is valid for AES-256");
        Self { cipher }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce_bytes: [u8; 12] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("encryption failed: {}", e))?;

        let mut combined = Vec::with_capacity(12 + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(base64::engine::general_purpose::STANDARD.encode(&combined))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let combined = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| anyhow::anyhow!("base64 decode failed: {}", e))?;

        if combined.len() < 13 {
            return Err(anyhow::anyhow!("encrypted value too short"));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(12);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| anyhow::anyhow!("decryption failed: {}", e))?;

        String::from_utf8(plaintext).map_err(|e| anyhow::anyhow!("utf-8 decode failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let vault = PasswordVault::new(Some("test-secret"));
        let plaintext = "wh-password-12345";
        let encrypted = vault.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert_eq!(vault.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn nonces_differ_per_encryption() {
        let vault = PasswordVault::new(Some("test-secret"));
        let a = vault.encrypt("same").unwrap();
        let b = vault.encrypt("same").unwrap();
        assert_ne!(a, b);
        assert_eq!(vault.decrypt(&a).unwrap(), "same");
        assert_eq!(vault.decrypt(&b).unwrap(), "same");
    }

    #[test]
    fn different_secrets_cannot_decrypt() {
        let a = PasswordVault::new(Some("secret-a"));
        let b = PasswordVault::new(Some("secret-b"));
        let encrypted = a.encrypt("value").unwrap();
        assert!(b.decrypt(&encrypted).is_err());
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let vault = PasswordVault::new(Some("test-secret"));
        let encrypted = vault.encrypt("value").unwrap();
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(&encrypted)
            .unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = base64::engine::general_purpose::STANDARD.encode(&raw);
        assert!(vault.decrypt(&tampered).is_err());
    }

    #[test]
    fn rejects_short_and_invalid_input() {
        let vault = PasswordVault::new(Some("test-secret"));
        let short = base64::engine::general_purpose::STANDARD.encode(b"short");
        assert!(vault.decrypt(&short).is_err());
        assert!(vault.decrypt("not-valid-base64!!!").is_err());
    }

    #[test]
    fn machine_key_is_stable_within_process() {
        let a = PasswordVault::new(None);
        let b = PasswordVault::new(None);
        let encrypted = a.encrypt("value").unwrap();
        assert_eq!(b.decrypt(&encrypted).unwrap(), "value");
    }
}
