//! Secrets Manager cryptography.
//!
//! - Access tokens: `0.{access_token_id}.{client_secret}:{base64 16-byte seed}`
//! - Token key: HMAC-SHA256 keyed with "bitwarden-accesstoken" over the seed,
//!   then HKDF-Expand with info "sm-access-token" to 64 bytes
//! - Organization key: the `encrypted_payload` of the login response,
//!   decrypted with the token key, holds `{"encryptionKey": "<base64 64 bytes>"}`
//! - Fields: EncString type 2, `2.{iv}|{data}|{mac}`, AES-256-CBC with
//!   PKCS7 and HMAC-SHA256 over `iv || data`. Keys are `[enc 32 | mac 32]`.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::{ProviderError, Result};

type HmacSha256 = Hmac<Sha256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// 64-byte AES-256-CBC-HMAC-SHA256 key: `[enc_key | mac_key]`.
pub type SymmetricKey = Zeroizing<[u8; 64]>;

const IV_LEN: usize = 16;
const MAC_LEN: usize = 32;

/// A parsed machine-account access token.
pub struct AccessToken {
    pub access_token_id: Uuid,
    pub client_secret: Zeroizing<String>,
    seed: Zeroizing<[u8; 16]>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token_id", &self.access_token_id)
            .finish_non_exhaustive()
    }
}

fn invalid_token(reason: &str) -> ProviderError {
    ProviderError::InvalidAttribute {
        attribute: "access_token",
        reason: reason.to_string(),
    }
}

impl AccessToken {
    pub fn parse(raw: &str) -> Result<Self> {
        let (credentials, seed_b64) = raw
            .split_once(':')
            .ok_or_else(|| invalid_token("missing ':' separator"))?;

        let mut parts = credentials.split('.');
        let (Some(version), Some(id), Some(secret), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid_token("expected three '.'-separated parts before ':'"));
        };

        if version != "0" {
            return Err(invalid_token("unsupported token version"));
        }

        let access_token_id =
            Uuid::parse_str(id).map_err(|_| invalid_token("token id is not a UUID"))?;

        let seed_bytes = Zeroizing::new(
            B64.decode(seed_b64)
                .map_err(|_| invalid_token("encryption key is not valid base64"))?,
        );
        let mut seed = Zeroizing::new([0u8; 16]);
        if seed_bytes.len() != seed.len() {
            return Err(invalid_token("encryption key must be 16 bytes"));
        }
        seed.copy_from_slice(&seed_bytes);

        Ok(Self {
            access_token_id,
            client_secret: Zeroizing::new(secret.to_string()),
            seed,
        })
    }

    /// Derive the key that protects the login response payload.
    pub fn derive_key(&self) -> Result<SymmetricKey> {
        let mut mac = HmacSha256::new_from_slice(b"bitwarden-accesstoken")
            .map_err(|e| ProviderError::Crypto(format!("token key derivation: {e}")))?;
        mac.update(&self.seed[..]);
        let mut prk = Zeroizing::new([0u8; 32]);
        prk.copy_from_slice(&mac.finalize().into_bytes());

        let hk = Hkdf::<Sha256>::from_prk(&prk[..])
            .map_err(|e| ProviderError::Crypto(format!("token key derivation: {e}")))?;
        let mut key = Zeroizing::new([0u8; 64]);
        hk.expand(b"sm-access-token", &mut key[..])
            .map_err(|e| ProviderError::Crypto(format!("token key derivation: {e}")))?;
        Ok(key)
    }
}

/// Decrypt the organization key carried in the login `encrypted_payload`.
pub fn decrypt_organization_key(payload: &str, token_key: &SymmetricKey) -> Result<SymmetricKey> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(rename = "encryptionKey")]
        encryption_key: String,
    }

    let json = decrypt(payload, token_key)?;
    let payload: Payload = serde_json::from_slice(&json)
        .map_err(|e| ProviderError::Crypto(format!("login payload: {e}")))?;
    let bytes = Zeroizing::new(
        B64.decode(&payload.encryption_key)
            .map_err(|e| ProviderError::Crypto(format!("organization key: {e}")))?,
    );

    let mut key = Zeroizing::new([0u8; 64]);
    if bytes.len() != key.len() {
        return Err(ProviderError::Crypto(format!(
            "organization key must be 64 bytes, got {}",
            bytes.len()
        )));
    }
    key.copy_from_slice(&bytes);
    Ok(key)
}

/// Encrypt `plaintext` as a type-2 EncString with a random IV.
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<String> {
    let iv: [u8; IV_LEN] = rand::random();
    encrypt_with_iv(plaintext, key, &iv)
}

fn encrypt_with_iv(plaintext: &[u8], key: &SymmetricKey, iv: &[u8; IV_LEN]) -> Result<String> {
    let (enc_key, mac_key) = key.split_at(32);

    let mut buf = Zeroizing::new(vec![0u8; plaintext.len() + IV_LEN]);
    buf[..plaintext.len()].copy_from_slice(plaintext);
    let data = Aes256CbcEnc::new_from_slices(enc_key, iv)
        .map_err(|e| ProviderError::Crypto(format!("AES key/IV: {e}")))?
        .encrypt_padded_mut::<Pkcs7>(&mut buf, plaintext.len())
        .map_err(|_| ProviderError::Crypto("AES encrypt: buffer too small".into()))?;

    let mut mac = HmacSha256::new_from_slice(mac_key)
        .map_err(|e| ProviderError::Crypto(format!("HMAC key: {e}")))?;
    mac.update(iv);
    mac.update(data);
    let tag = mac.finalize().into_bytes();

    Ok(format!(
        "2.{}|{}|{}",
        B64.encode(iv),
        B64.encode(data),
        B64.encode(tag)
    ))
}

/// Decrypt a type-2 EncString, verifying its MAC first.
pub fn decrypt(enc: &str, key: &SymmetricKey) -> Result<Zeroizing<Vec<u8>>> {
    let body = enc
        .strip_prefix("2.")
        .ok_or_else(|| ProviderError::Crypto("unsupported EncString type".into()))?;

    let mut parts = body.split('|');
    let (Some(iv), Some(data), Some(tag), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ProviderError::Crypto(
            "EncString must have three '|'-separated parts".into(),
        ));
    };

    let decode = |part: &str, what: &str| {
        B64.decode(part)
            .map_err(|e| ProviderError::Crypto(format!("EncString {what}: {e}")))
    };
    let iv = decode(iv, "IV")?;
    let data = decode(data, "data")?;
    let tag = decode(tag, "MAC")?;

    if iv.len() != IV_LEN || tag.len() != MAC_LEN {
        return Err(ProviderError::Crypto("EncString IV or MAC has wrong length".into()));
    }

    let (enc_key, mac_key) = key.split_at(32);
    let mut mac = HmacSha256::new_from_slice(mac_key)
        .map_err(|e| ProviderError::Crypto(format!("HMAC key: {e}")))?;
    mac.update(&iv);
    mac.update(&data);
    mac.verify_slice(&tag)
        .map_err(|_| ProviderError::Crypto("EncString MAC verification failed".into()))?;

    let mut buf = Zeroizing::new(data);
    let plaintext = Aes256CbcDec::new_from_slices(enc_key, &iv)
        .map_err(|e| ProviderError::Crypto(format!("AES key/IV: {e}")))?
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| ProviderError::Crypto("AES decrypt: bad padding".into()))?;

    Ok(Zeroizing::new(plaintext.to_vec()))
}

/// Encrypt a UTF-8 field.
pub fn encrypt_str(plaintext: &str, key: &SymmetricKey) -> Result<String> {
    encrypt(plaintext.as_bytes(), key)
}

/// Decrypt a UTF-8 field; absent or empty fields decrypt to "".
pub fn decrypt_str(enc: Option<&str>, key: &SymmetricKey) -> Result<String> {
    match enc {
        None | Some("") => Ok(String::new()),
        Some(enc) => {
            let bytes = decrypt(enc, key)?;
            String::from_utf8(bytes.to_vec())
                .map_err(|e| ProviderError::Crypto(format!("field is not UTF-8: {e}")))
        }
    }
}
