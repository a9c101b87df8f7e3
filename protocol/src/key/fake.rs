//! Deterministic key service for tests and examples.
//!
//! No cryptography at all — every operation is readable string pasting, so
//! test failures show exactly which content was signed by whom:
//!
//! - private key `"backer key"` derives address `"backer"`
//! - `hash(c)` is `"(c)"`
//! - `sign(c, k)` is `"(c) signed with k"` (the digest plus the key)
//!
//! A signature verifies iff it equals `digest + " signed with " + signer +
//! " key"`, which is precisely what signing with the matching private key
//! produces. Do not let this anywhere near production.

use super::service::{Address, KeyError, KeyService, PrivateKey};

/// The naming convention: a private key is its address plus this suffix.
const KEY_SUFFIX: &str = " key";

/// String-pasting key service. See the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeKeyService;

impl FakeKeyService {
    pub fn new() -> FakeKeyService {
        FakeKeyService
    }

    /// The private key whose address is `name`.
    pub fn key_for(name: &str) -> PrivateKey {
        PrivateKey::new(format!("{name}{KEY_SUFFIX}"))
    }
}

impl KeyService for FakeKeyService {
    fn generate_private_key(&self) -> PrivateKey {
        PrivateKey::new(format!("generated{KEY_SUFFIX}"))
    }

    fn public_key(&self, key: &PrivateKey) -> Result<Address, KeyError> {
        match key.reveal().strip_suffix(KEY_SUFFIX) {
            Some(name) => Ok(Address::new(name)),
            None => Err(KeyError::InvalidPrivateKey),
        }
    }

    fn sign(&self, content: &str, key: &PrivateKey) -> Result<Vec<u8>, KeyError> {
        if !key.reveal().ends_with(KEY_SUFFIX) {
            return Err(KeyError::InvalidPrivateKey);
        }
        Ok(format!("{} signed with {}", self.hash(content), key.reveal()).into_bytes())
    }

    fn verify(&self, content: &str, signer: &Address, signature: &[u8]) -> bool {
        let expected = format!("{content} signed with {signer}{KEY_SUFFIX}");
        signature == expected.as_bytes()
    }

    fn hash(&self, content: &str) -> String {
        format!("({content})")
    }
}
