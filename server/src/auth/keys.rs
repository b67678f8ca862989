//! Key material for session tokens.
//!
//! Two independent RSA key pairs are held for the life of the process: one
//! signs and verifies the inner JWS, the other wraps and unwraps the content
//! key of the outer JWE. Both are generated once, before the listener binds,
//! and never change afterwards, so every token presented to this process was
//! produced with the keys it still holds.

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("RSA key generation failed: {0}")]
    Generate(#[from] rsa::Error),

    #[error("RSA key encoding failed: {0}")]
    Encode(#[from] rsa::pkcs1::Error),
}

pub struct KeyManager {
    signing: EncodingKey,
    verifying: DecodingKey,
    decryption: RsaPrivateKey,
    encryption: RsaPublicKey,
}

impl KeyManager {
    /// Generate both key pairs with a `bits`-sized modulus.
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let mut rng = rand::thread_rng();

        info!("Generating {}-bit RSA signing and encryption keys", bits);
        let signing = RsaPrivateKey::new(&mut rng, bits)?;
        let encryption = RsaPrivateKey::new(&mut rng, bits)?;

        Self::from_keys(signing, encryption)
    }

    /// Build a manager from existing private keys.
    pub fn from_keys(signing: RsaPrivateKey, encryption: RsaPrivateKey) -> Result<Self, KeyError> {
        let signing_der = signing.to_pkcs1_der()?;
        let verifying_der = signing.to_public_key().to_pkcs1_der()?;

        Ok(Self {
            signing: EncodingKey::from_rsa_der(signing_der.as_bytes()),
            verifying: DecodingKey::from_rsa_der(verifying_der.as_bytes()),
            encryption: encryption.to_public_key(),
            decryption: encryption,
        })
    }

    pub fn signing_key(&self) -> &EncodingKey {
        &self.signing
    }

    pub fn verifying_key(&self) -> &DecodingKey {
        &self.verifying
    }

    pub fn encryption_key(&self) -> &RsaPublicKey {
        &self.encryption
    }

    pub fn decryption_key(&self) -> &RsaPrivateKey {
        &self.decryption
    }
}

impl fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyManager")
            .field("signing", &"<redacted>")
            .field("decryption", &"<redacted>")
            .finish()
    }
}
