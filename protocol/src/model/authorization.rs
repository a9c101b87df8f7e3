//! Issuer authorizations.
//!
//! A Base proves that *someone* signed an issuance; an [`Authorization`]
//! is how a community says that someone was allowed to. It is a signed
//! grant — "this issuer may mint this currency" — produced by whatever
//! authority the verifying party chooses to trust. The core checks the
//! grant's signature and its coverage; picking trustworthy authorities is
//! the caller's problem.

use crate::fingerprint::{Fingerprint, Print};
use crate::key::{Address, KeyError, KeyService, Signer};

use super::signature::Signature;

/// A third-party-signed grant permitting `issuer` to mint `currency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub issuer: Address,
    pub currency: String,
    pub signature: Signature,
}

impl Authorization {
    /// Reassembles an authorization from its parts (wire decoding).
    pub fn new(issuer: Address, currency: impl Into<String>, signature: Signature) -> Authorization {
        Authorization {
            issuer,
            currency: currency.into(),
            signature,
        }
    }

    /// Builds and signs a grant; the signer is the granting authority.
    pub fn signed<K: KeyService + ?Sized>(
        issuer: Address,
        currency: impl Into<String>,
        signer: &Signer<'_, K>,
    ) -> Result<Authorization, KeyError> {
        let currency = currency.into();
        let signature = signer.sign_print(&Self::content_print(&issuer, &currency))?;
        Ok(Authorization {
            issuer,
            currency,
            signature,
        })
    }

    /// Whether this grant covers `issuer` minting `currency`.
    pub fn authorizes(&self, issuer: &Address, currency: &str) -> bool {
        self.issuer == *issuer && self.currency == currency
    }

    fn content_print(issuer: &Address, currency: &str) -> Print {
        Print::Group(vec![Print::text(issuer.as_str()), Print::text(currency)])
    }
}

impl Fingerprint for Authorization {
    fn print(&self) -> Print {
        Self::content_print(&self.issuer, &self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::squash;
    use crate::key::FakeKeyService;

    #[test]
    fn grant_covers_exactly_its_issuer_and_currency() {
        let service = FakeKeyService::new();
        let authority = Signer::new(&service, FakeKeyService::key_for("authority"));
        let grant = Authorization::signed(Address::new("issuer"), "foo", &authority).unwrap();

        assert!(grant.authorizes(&Address::new("issuer"), "foo"));
        assert!(!grant.authorizes(&Address::new("issuer"), "bar"));
        assert!(!grant.authorizes(&Address::new("other"), "foo"));
    }

    #[test]
    fn grant_is_signed_over_issuer_and_currency() {
        let service = FakeKeyService::new();
        let authority = Signer::new(&service, FakeKeyService::key_for("authority"));
        let grant = Authorization::signed(Address::new("issuer"), "foo", &authority).unwrap();

        assert_eq!(squash(&grant), "#(issuer\0foo)");
        assert_eq!(grant.signature.signer, Address::new("authority"));
    }
}
