//! Compact JWE envelope: RSA-OAEP-256 key wrapping with A128GCM content
//! encryption.
//!
//! ```text
//! BASE64URL(header) . BASE64URL(wrapped CEK) . BASE64URL(IV) . BASE64URL(ciphertext) . BASE64URL(tag)
//! ```
//!
//! The base64url protected header is the AES-GCM additional authenticated
//! data, so any change to it fails decryption just like a change to the
//! ciphertext does.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::auth::error::AuthError;

pub const KEY_ALG: &str = "RSA-OAEP-256";
pub const CONTENT_ENC: &str = "A128GCM";

const CEK_LEN: usize = 16;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, Serialize, Deserialize)]
struct JweHeader {
    alg: String,
    enc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cty: Option<String>,
}

impl JweHeader {
    /// Header for an envelope whose payload is itself a JWT.
    fn nested_jwt() -> Self {
        Self {
            alg: KEY_ALG.to_string(),
            enc: CONTENT_ENC.to_string(),
            typ: Some("JWT".to_string()),
            cty: Some("JWT".to_string()),
        }
    }
}

/// Encrypt `plaintext` for the holder of the private half of `key`.
pub fn encrypt(plaintext: &[u8], key: &RsaPublicKey) -> Result<String, AuthError> {
    let mut rng = rand::thread_rng();

    let header = serde_json::to_vec(&JweHeader::nested_jwt())
        .map_err(|e| AuthError::TokenBuild(format!("JWE header: {}", e)))?;
    let header_b64 = URL_SAFE_NO_PAD.encode(header);

    let mut cek = [0u8; CEK_LEN];
    rng.fill_bytes(&mut cek);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let wrapped_cek = key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), &cek)
        .map_err(|e| AuthError::TokenBuild(format!("key wrap: {}", e)))?;

    let cipher = Aes128Gcm::new_from_slice(&cek)
        .map_err(|e| AuthError::TokenBuild(format!("content key: {}", e)))?;
    let sealed = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad: header_b64.as_bytes(),
            },
        )
        .map_err(|e| AuthError::TokenBuild(format!("content encryption: {}", e)))?;

    // aes-gcm appends the tag to the ciphertext
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    Ok([
        header_b64,
        URL_SAFE_NO_PAD.encode(wrapped_cek),
        URL_SAFE_NO_PAD.encode(iv),
        URL_SAFE_NO_PAD.encode(ciphertext),
        URL_SAFE_NO_PAD.encode(tag),
    ]
    .join("."))
}

/// Open a compact JWE produced by [`encrypt`].
///
/// Returns `TokenParse` only when the token does not have five segments;
/// every other failure is `Decryption`.
pub fn decrypt(token: &str, key: &RsaPrivateKey) -> Result<Vec<u8>, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header_b64, wrapped_b64, iv_b64, ciphertext_b64, tag_b64] = segments[..] else {
        return Err(AuthError::TokenParse(format!(
            "expected 5 JWE segments, found {}",
            segments.len()
        )));
    };

    let header: JweHeader = decode_segment(header_b64, "header")
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| reject("header", e)))?;
    if header.alg != KEY_ALG || header.enc != CONTENT_ENC {
        debug!("Unsupported JWE algorithms: alg={} enc={}", header.alg, header.enc);
        return Err(AuthError::Decryption);
    }

    let wrapped_cek = decode_segment(wrapped_b64, "encrypted key")?;
    let iv = decode_segment(iv_b64, "iv")?;
    let mut sealed = decode_segment(ciphertext_b64, "ciphertext")?;
    let tag = decode_segment(tag_b64, "tag")?;

    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        debug!("JWE iv/tag length mismatch: iv={} tag={}", iv.len(), tag.len());
        return Err(AuthError::Decryption);
    }

    let mut rng = rand::thread_rng();
    let cek = key
        .decrypt_blinded(&mut rng, Oaep::new::<Sha256>(), &wrapped_cek)
        .map_err(|e| reject("encrypted key", e))?;
    if cek.len() != CEK_LEN {
        debug!("Unwrapped content key has length {}", cek.len());
        return Err(AuthError::Decryption);
    }

    let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|e| reject("content key", e))?;
    sealed.extend_from_slice(&tag);

    cipher
        .decrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: &sealed,
                aad: header_b64.as_bytes(),
            },
        )
        .map_err(|e| reject("ciphertext", e))
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| reject(what, e))
}

fn reject(what: &str, err: impl std::fmt::Display) -> AuthError {
    debug!("JWE {} rejected: {}", what, err);
    AuthError::Decryption
}
