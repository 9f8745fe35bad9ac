use ed25519_dalek::{Signer as _, SigningKey};
use sha2::{Digest, Sha256};

/// Signs transaction digests on behalf of the sending wallet.
pub trait Signer {
    /// Hex-encoded public key placed in the transaction.
    fn public_key_hex(&self) -> String;

    /// Signature over a 32-byte transaction digest.
    fn sign_digest(&self, digest: &[u8; 32]) -> Vec<u8>;
}

/// Ed25519 signer whose seed is the SHA-256 of a passphrase.
pub struct PassphraseSigner {
    key: SigningKey,
}

impl PassphraseSigner {
    pub fn from_passphrase(passphrase: &str) -> Self {
        let seed: [u8; 32] = sha256(passphrase.as_bytes());
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }
}

impl Signer for PassphraseSigner {
    fn public_key_hex(&self) -> String {
        hex::encode(self.key.verifying_key().to_bytes())
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Vec<u8> {
        self.key.sign(digest).to_bytes().to_vec()
    }
}

impl std::fmt::Debug for PassphraseSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseSigner")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
