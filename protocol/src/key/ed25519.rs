//! Production key service: Ed25519 over SHA-256 digests.
//!
//! - Private keys are hex-encoded 32-byte Ed25519 seeds.
//! - Addresses are the base58-encoded verifying key — compact enough to
//!   read aloud, and what participants exchange as their identity.
//! - `hash` is the hex SHA-256 digest of the content.
//! - `sign` signs the digest string's bytes, so a verifier holding only
//!   the digest can check the signature (the digest contract on
//!   [`KeyService`]).
//!
//! Ed25519 because signatures are deterministic (no nonce footguns) and
//! verification is fast — a coin's whole provenance chain is re-verified
//! on every acceptance. Key generation pulls from `OsRng`; if the OS RNG
//! is broken there are bigger problems than scrip.

use ed25519_dalek::{Signature as DalekSignature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::service::{Address, KeyError, KeyService, PrivateKey};

/// Stateless Ed25519-backed key service.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519KeyService;

impl Ed25519KeyService {
    pub fn new() -> Ed25519KeyService {
        Ed25519KeyService
    }

    fn signing_key(key: &PrivateKey) -> Result<SigningKey, KeyError> {
        let bytes = hex::decode(key.reveal()).map_err(|_| KeyError::InvalidPrivateKey)?;
        let seed: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(SigningKey::from_bytes(&seed))
    }

    fn verifying_key(address: &Address) -> Result<VerifyingKey, KeyError> {
        let bytes = bs58::decode(address.as_str())
            .into_vec()
            .map_err(|_| KeyError::InvalidPublicKey)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)
    }

    fn address_of(key: &SigningKey) -> Address {
        Address::new(bs58::encode(key.verifying_key().to_bytes()).into_string())
    }
}

impl KeyService for Ed25519KeyService {
    fn generate_private_key(&self) -> PrivateKey {
        let key = SigningKey::generate(&mut OsRng);
        PrivateKey::new(hex::encode(key.to_bytes()))
    }

    fn public_key(&self, key: &PrivateKey) -> Result<Address, KeyError> {
        Ok(Self::address_of(&Self::signing_key(key)?))
    }

    fn sign(&self, content: &str, key: &PrivateKey) -> Result<Vec<u8>, KeyError> {
        let key = Self::signing_key(key)?;
        // Sign the digest string, not the raw content, so verification
        // works from the digest alone.
        let digest = self.hash(content);
        Ok(key.sign(digest.as_bytes()).to_bytes().to_vec())
    }

    fn verify(&self, content: &str, signer: &Address, signature: &[u8]) -> bool {
        let Ok(key) = Self::verifying_key(signer) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };
        let sig = DalekSignature::from_bytes(&sig_bytes);
        key.verify(content.as_bytes(), &sig).is_ok()
    }

    fn hash(&self, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_derives_an_address() {
        let service = Ed25519KeyService::new();
        let key = service.generate_private_key();
        let address = service.public_key(&key).unwrap();
        assert!(!address.as_str().is_empty());
        // Same key, same address.
        assert_eq!(service.public_key(&key).unwrap(), address);
    }

    #[test]
    fn sign_verifies_against_the_digest() {
        let service = Ed25519KeyService::new();
        let key = service.generate_private_key();
        let address = service.public_key(&key).unwrap();

        let content = "#(foo\0my promise\0backer\042)";
        let signature = service.sign(content, &key).unwrap();
        let digest = service.hash(content);

        assert!(service.verify(&digest, &address, &signature));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let service = Ed25519KeyService::new();
        let key = service.generate_private_key();
        let address = service.public_key(&key).unwrap();

        let mut signature = service.sign("content", &key).unwrap();
        signature[0] ^= 0x01;

        assert!(!service.verify(&service.hash("content"), &address, &signature));
    }

    #[test]
    fn wrong_signer_is_rejected() {
        let service = Ed25519KeyService::new();
        let key = service.generate_private_key();
        let other = service.public_key(&service.generate_private_key()).unwrap();

        let signature = service.sign("content", &key).unwrap();
        assert!(!service.verify(&service.hash("content"), &other, &signature));
    }

    #[test]
    fn malformed_material_never_panics() {
        let service = Ed25519KeyService::new();
        assert!(service.public_key(&PrivateKey::new("not hex")).is_err());
        assert!(service.sign("x", &PrivateKey::new("deadbeef")).is_err());
        assert!(!service.verify("x", &Address::new("!!not base58!!"), &[0u8; 64]));
        assert!(!service.verify("x", &Address::new("3mJr7AoUXx2Wqd"), &[0u8; 7]));
    }

    #[test]
    fn hash_is_hex_sha256() {
        let service = Ed25519KeyService::new();
        assert_eq!(
            service.hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn signatures_are_deterministic() {
        let service = Ed25519KeyService::new();
        let key = service.generate_private_key();
        assert_eq!(
            service.sign("same content", &key).unwrap(),
            service.sign("same content", &key).unwrap()
        );
    }
}
