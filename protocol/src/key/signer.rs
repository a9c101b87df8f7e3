//! Binds one private key to a key service.
//!
//! A [`Signer`] is what the graph constructors take: it can tell you its
//! address and produce a [`Signature`] over a fingerprintable value, and
//! nothing else. Key material stays behind the capability.

use crate::fingerprint::{squash_print, Fingerprint, Print};
use crate::model::Signature;

use super::service::{Address, KeyError, KeyService, PrivateKey};

/// A private key paired with the service that understands it.
pub struct Signer<'a, K: KeyService + ?Sized> {
    key: &'a K,
    private: PrivateKey,
}

impl<'a, K: KeyService + ?Sized> Signer<'a, K> {
    pub fn new(key: &'a K, private: PrivateKey) -> Signer<'a, K> {
        Signer { key, private }
    }

    /// The address this signer signs as.
    pub fn address(&self) -> Result<Address, KeyError> {
        self.key.public_key(&self.private)
    }

    /// Signs the squash of a fingerprintable value.
    pub fn sign<T: Fingerprint + ?Sized>(&self, value: &T) -> Result<Signature, KeyError> {
        self.sign_print(&value.print())
    }

    /// Signs the squash of an explicit print tree. Constructors use this to
    /// sign the content of a transaction *before* the signed transaction
    /// exists.
    pub fn sign_print(&self, print: &Print) -> Result<Signature, KeyError> {
        let content = squash_print(print);
        Ok(Signature {
            signer: self.address()?,
            sign: self.key.sign(&content, &self.private)?,
        })
    }
}
