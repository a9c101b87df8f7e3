//! The protocol facade.
//!
//! [`Scrip`] bundles a key service with the graph operations so callers
//! hold one handle for the whole lifecycle: mint, pass around, consolidate,
//! audit. It owns no state beyond the service — every operation is a pure
//! function over the coins it is given.

use std::collections::HashMap;

use crate::fraction::Fraction;
use crate::key::{Address, KeyError, KeyService, PrivateKey, Signer};
use crate::model::{Coin, CoinError, Input, Output, Promise};
use crate::verification::Verification;

pub struct Scrip<K: KeyService> {
    key: K,
}

impl<K: KeyService> Scrip<K> {
    pub fn new(key: K) -> Scrip<K> {
        Scrip { key }
    }

    /// The underlying key service, for callers that need raw signing or
    /// hashing.
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generate_key(&self) -> PrivateKey {
        self.key.generate_private_key()
    }

    pub fn address(&self, key: &PrivateKey) -> Result<Address, KeyError> {
        self.key.public_key(key)
    }

    /// A fresh verification session over this facade's key service.
    pub fn verification(&self) -> Verification<'_, K> {
        Verification::new(&self.key)
    }

    /// Mints a coin: a Base carrying `promise`, assigning `output`, signed
    /// with `key` as the issuer.
    pub fn issue(
        &self,
        promise: Promise,
        output: Output,
        key: &PrivateKey,
    ) -> Result<Coin, CoinError> {
        Coin::issue(promise, output, &self.signer(key))
    }

    /// Builds one Transfer node over `inputs` and `outputs`; returns one
    /// coin per output. Structural only — whether the signer actually owns
    /// the inputs is verification's concern.
    pub fn transfer(
        &self,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        key: &PrivateKey,
    ) -> Result<Vec<Coin>, CoinError> {
        Coin::transfer(inputs, outputs, &self.signer(key))
    }

    /// Hands the whole coin to `target` in a single-input, single-output
    /// transfer.
    pub fn transfer_coin(
        &self,
        coin: &Coin,
        target: Address,
        key: &PrivateKey,
    ) -> Result<Coin, CoinError> {
        let output = Output::new(target, coin.value());
        let mut coins = self.transfer(vec![coin.to_input()], vec![output], key)?;
        // Exactly one output in, exactly one coin out.
        Ok(coins.remove(0))
    }

    /// Splits a coin into one coin per part, each worth
    /// `value * part / sum(parts)` and kept at the current owner.
    ///
    /// With zero or one parts there is nothing to split and the coin is
    /// returned unchanged.
    pub fn split(
        &self,
        coin: &Coin,
        parts: &[u64],
        key: &PrivateKey,
    ) -> Result<Vec<Coin>, CoinError> {
        if parts.len() <= 1 {
            return Ok(vec![coin.clone()]);
        }

        let owner = coin.owner().ok_or(CoinError::UnownedCoin)?.clone();
        let total: Fraction = parts.iter().fold(Fraction::ZERO, |sum, &part| {
            sum.plus(Fraction::from(part))
        });

        let outputs = parts
            .iter()
            .map(|&part| {
                let value = coin
                    .value()
                    .times(Fraction::from(part))
                    .divided_by(total)?;
                Ok(Output::new(owner.clone(), value))
            })
            .collect::<Result<Vec<_>, CoinError>>()?;

        self.transfer(vec![coin.to_input()], outputs, key)
    }

    /// Consolidates the coin's provenance as the backer holding `key`:
    /// folds the backer's Base leaves into a Confirmation carrying the
    /// backer's proportional share.
    pub fn confirm(&self, coin: &Coin, key: &PrivateKey) -> Result<Coin, CoinError> {
        let backer = self.key.public_key(key)?;
        coin.confirm(&backer, &self.signer(key), &self.key)
    }

    /// Nets out who gained and who lost across the coin's transfer chain.
    ///
    /// Walks the chain from root to tip; every change of ownership moves
    /// that hop's share of the chain total from the previous owner to the
    /// new one. The result maps each address to its net balance — an audit
    /// of the redistribution history, not a spend check.
    pub fn resolve_balances(&self, coin: &Coin) -> HashMap<Address, Fraction> {
        let mut hops: Vec<(Option<Address>, Fraction)> = Vec::new();

        let mut input = coin.to_input();
        loop {
            let node = input.transaction().clone();
            if node.inputs().is_empty() {
                // Base or Confirmation root: the chain total lives here.
                break;
            }
            hops.push((input.output().target.clone(), input.output().value));
            input = node.inputs()[0].clone();
        }
        let total = input.output().value;

        let mut balances: HashMap<Address, Fraction> = HashMap::new();
        if total.is_zero() {
            return balances;
        }

        hops.reverse();

        let mut last_owner: Option<Address> = None;
        for (owner, value) in hops {
            if let (Some(previous), Some(current)) = (&last_owner, &owner) {
                if let Ok(share) = value.divided_by(total) {
                    let debit = balances.entry(previous.clone()).or_insert(Fraction::ZERO);
                    *debit = debit.minus(share);
                    let credit = balances.entry(current.clone()).or_insert(Fraction::ZERO);
                    *credit = credit.plus(share);
                }
            }
            last_owner = owner;
        }

        balances
    }

    fn signer(&self, key: &PrivateKey) -> Signer<'_, K> {
        Signer::new(&self.key, key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::FakeKeyService;

    fn scrip() -> Scrip<FakeKeyService> {
        Scrip::new(FakeKeyService::new())
    }

    fn issued(scrip: &Scrip<FakeKeyService>, backer: &str, value: u64) -> Coin {
        scrip
            .issue(
                Promise::new("foo", "my promise"),
                Output::new(Address::new(backer), Fraction::from(value)),
                &FakeKeyService::key_for("issuer"),
            )
            .unwrap()
    }

    #[test]
    fn address_derives_from_the_private_key() {
        let scrip = scrip();
        let key = FakeKeyService::key_for("alice");
        assert_eq!(scrip.address(&key).unwrap(), Address::new("alice"));
    }

    #[test]
    fn issued_coin_belongs_to_the_backer() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 42);
        assert_eq!(coin.owner(), Some(&Address::new("backer")));
        assert_eq!(coin.value(), Fraction::from(42u64));
    }

    #[test]
    fn transfer_coin_hands_over_the_full_value() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 42);
        let handed = scrip
            .transfer_coin(&coin, Address::new("alice"), &FakeKeyService::key_for("backer"))
            .unwrap();

        assert_eq!(handed.owner(), Some(&Address::new("alice")));
        assert_eq!(handed.value(), Fraction::from(42u64));
        assert!(scrip.verification().verify(&handed).is_ok());
    }

    #[test]
    fn split_produces_proportional_coins_at_the_same_owner() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 1);
        let parts = scrip
            .split(&coin, &[1, 2], &FakeKeyService::key_for("backer"))
            .unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].value(), Fraction::new(1, 3).unwrap());
        assert_eq!(parts[1].value(), Fraction::new(2, 3).unwrap());
        assert_eq!(parts[0].owner(), Some(&Address::new("backer")));
        assert_eq!(parts[1].owner(), Some(&Address::new("backer")));
        assert!(scrip.verification().verify_all(&parts).is_ok());
    }

    #[test]
    fn split_with_one_part_is_the_identity() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 42);
        let same = scrip
            .split(&coin, &[7], &FakeKeyService::key_for("backer"))
            .unwrap();
        assert_eq!(same, vec![coin]);
    }

    #[test]
    fn confirm_derives_the_backer_from_the_key() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 42);
        let handed = scrip
            .transfer_coin(&coin, Address::new("alice"), &FakeKeyService::key_for("backer"))
            .unwrap();

        let confirmed = scrip
            .confirm(&handed, &FakeKeyService::key_for("backer"))
            .unwrap();
        assert_eq!(confirmed.owner(), Some(&Address::new("alice")));
        assert_eq!(confirmed.value(), Fraction::from(42u64));
    }

    #[test]
    fn confirm_by_a_stranger_fails() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 42);
        let result = scrip.confirm(&coin, &FakeKeyService::key_for("stranger"));
        assert_eq!(result.unwrap_err(), CoinError::NotABacker);
    }

    #[test]
    fn balances_net_out_a_simple_chain() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 1);
        let to_alice = scrip
            .transfer_coin(&coin, Address::new("alice"), &FakeKeyService::key_for("backer"))
            .unwrap();
        let to_bob = scrip
            .transfer_coin(&to_alice, Address::new("bob"), &FakeKeyService::key_for("alice"))
            .unwrap();

        // The chain's first recipient is the reference point: alice gave
        // the whole coin away, bob received it.
        let balances = scrip.resolve_balances(&to_bob);
        assert_eq!(balances[&Address::new("alice")], Fraction::from(-1i64));
        assert_eq!(balances[&Address::new("bob")], Fraction::ONE);
        assert!(!balances.contains_key(&Address::new("backer")));
    }

    #[test]
    fn balances_track_split_shares() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 1);
        let to_alice = scrip
            .transfer_coin(&coin, Address::new("alice"), &FakeKeyService::key_for("backer"))
            .unwrap();
        let parts = scrip
            .split(&to_alice, &[1, 3], &FakeKeyService::key_for("alice"))
            .unwrap();
        let to_bob = scrip
            .transfer_coin(&parts[0], Address::new("bob"), &FakeKeyService::key_for("alice"))
            .unwrap();

        let balances = scrip.resolve_balances(&to_bob);
        assert_eq!(balances[&Address::new("alice")], Fraction::new(-1, 4).unwrap());
        assert_eq!(balances[&Address::new("bob")], Fraction::new(1, 4).unwrap());
    }

    #[test]
    fn balances_of_an_unmoved_coin_are_empty() {
        let scrip = scrip();
        let coin = issued(&scrip, "backer", 42);
        assert!(scrip.resolve_balances(&coin).is_empty());
    }
}
