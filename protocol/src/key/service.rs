//! The external key-service boundary.
//!
//! Addresses and private keys are opaque strings from the core's point of
//! view. What they encode (hex, base58, a test nickname) is the service's
//! business; the core only moves them around and compares them.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors crossing the key-service boundary.
///
/// Deliberately vague about *why* something failed — error messages that
/// describe key material are a classic leak.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// A participant's public identity.
///
/// Output targets, signature signers, and issuer fields are all addresses.
/// The core compares them for equality and prints them into fingerprints;
/// it never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wraps an encoded address string.
    pub fn new(encoded: impl Into<String>) -> Address {
        Address(encoded.into())
    }

    /// The encoded form, as produced by the key service.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Address {
        Address(s.to_owned())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Address {
        Address(s)
    }
}

/// An opaque private key handle.
///
/// The core holds these only long enough to pass them back to the service
/// that issued them. `Debug` never prints the material — a partial leak is
/// still a leak.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    /// Wraps an encoded private key string.
    pub fn new(encoded: impl Into<String>) -> PrivateKey {
        PrivateKey(encoded.into())
    }

    /// Reveals the encoded key material. Callers are expected to treat the
    /// result as a secret; this exists for deliberate export paths only.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl From<&str> for PrivateKey {
    fn from(s: &str) -> PrivateKey {
        PrivateKey(s.to_owned())
    }
}

impl From<String> for PrivateKey {
    fn from(s: String) -> PrivateKey {
        PrivateKey(s)
    }
}

/// The pluggable cryptographic capability.
///
/// ## Digest contract
///
/// Signing and verification meet at the *digest*, not the raw content:
/// `sign(content, key)` must produce a signature that
/// `verify(hash(content), public_key(key), ..)` accepts. Signers hold the
/// full content; verifiers may hold only its hash (that is how a
/// confirmation's commitment binds a transaction without embedding it).
/// Both implementations in this crate uphold the contract by committing to
/// `hash(content)` inside `sign`.
pub trait KeyService {
    /// Generates a fresh private key.
    fn generate_private_key(&self) -> PrivateKey;

    /// Derives the address (public key) for a private key.
    fn public_key(&self, key: &PrivateKey) -> Result<Address, KeyError>;

    /// Signs `content` with `key`. See the digest contract above.
    fn sign(&self, content: &str, key: &PrivateKey) -> Result<Vec<u8>, KeyError>;

    /// Checks `signature` over `content` (a digest, per the contract)
    /// against `signer`. Malformed input is simply `false` — the caller
    /// wants a verdict, not a diagnosis.
    fn verify(&self, content: &str, signer: &Address, signature: &[u8]) -> bool;

    /// The digest of `content`, as a printable string.
    fn hash(&self, content: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_key_debug_does_not_leak() {
        let key = PrivateKey::new("super secret material");
        assert_eq!(format!("{:?}", key), "PrivateKey(..)");
    }

    #[test]
    fn address_display_is_the_encoded_form() {
        let addr = Address::new("backer");
        assert_eq!(addr.to_string(), "backer");
        assert_eq!(addr.as_str(), "backer");
    }

    #[test]
    fn address_serde_is_transparent() {
        let addr = Address::new("alice");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"alice\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
