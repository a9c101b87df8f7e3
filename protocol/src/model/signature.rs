//! A signer's mark over a fingerprint.

use std::fmt;

use crate::key::Address;

/// The result of the signing capability over a squashed fingerprint.
///
/// `sign` is whatever the key service produced — Ed25519 bytes in
/// production, a readable string from the fake service in tests. The core
/// never inspects it; it only hands it back to the service for
/// verification.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    /// The address the signature claims to be from.
    pub signer: Address,
    /// Opaque signature bytes.
    pub sign: Vec<u8>,
}

impl Signature {
    pub fn new(signer: Address, sign: Vec<u8>) -> Signature {
        Signature { signer, sign }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hex keeps fake-service signatures legible enough while not
        // dumping kilobytes for real ones.
        let hex = hex::encode(&self.sign);
        let shown = if hex.len() > 16 { &hex[..16] } else { &hex };
        write!(f, "Signature(by {}, {}..)", self.signer, shown)
    }
}
