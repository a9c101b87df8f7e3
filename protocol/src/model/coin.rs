//! The coin: a lightweight view onto one output of the graph.

use std::sync::Arc;

use thiserror::Error;

use crate::fingerprint::squash;
use crate::fraction::{Fraction, FractionError};
use crate::key::{Address, KeyError, KeyService, Signer};

use super::output::{Input, Output};
use super::promise::Promise;
use super::transaction::{Base, Confirmation, Transaction, Transfer};

/// Construction-time failures of the graph operations. Fail fast, single
/// cause — unlike verification findings, which accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    /// Issuing a base worth zero or less.
    #[error("issued value must be positive")]
    NonPositiveValue,

    /// Confirming a coin whose provenance contains none of the caller's
    /// bases.
    #[error("not a backer")]
    NotABacker,

    /// Referencing an output index a node does not have.
    #[error("no output {index} (node has {available})")]
    NoSuchOutput { index: usize, available: usize },

    /// Operating on a coin whose referenced output has no owner (an
    /// unconfirmed remainder).
    #[error("coin has no owner")]
    UnownedCoin,

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Fraction(#[from] FractionError),
}

/// The unit actually handed between parties.
///
/// A coin is nothing but an [`Input`]: a claim on one output of one
/// transaction node, dragging the node's whole provenance tree behind it.
/// Coins are cheap views — identity is structural, the same input *is* the
/// same coin — and are never independently persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coin {
    input: Input,
}

impl Coin {
    /// The wire-format version tag this implementation produces.
    pub const VERSION: &'static str = "dev";

    pub fn new(input: Input) -> Coin {
        Coin { input }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// This coin as an input for a further transfer.
    pub fn to_input(&self) -> Input {
        self.input.clone()
    }

    /// The address that may spend this coin, if any.
    pub fn owner(&self) -> Option<&Address> {
        self.input.output().target.as_ref()
    }

    /// The exact value this coin carries.
    pub fn value(&self) -> Fraction {
        self.input.output().value
    }

    /// Every Base leaf reachable from this coin, in depth-first input
    /// order. After merges a coin's provenance may span several bases —
    /// possibly from several backers.
    ///
    /// The walk is an explicit worklist: chain depth is in the hands of
    /// whoever built the coin.
    pub fn bases(&self) -> Vec<Arc<Transaction>> {
        let mut bases = Vec::new();
        let mut stack = vec![self.input.transaction().clone()];
        while let Some(tx) = stack.pop() {
            match tx.as_ref() {
                Transaction::Base(_) => bases.push(tx.clone()),
                _ => {
                    for input in tx.inputs().iter().rev() {
                        stack.push(input.transaction().clone());
                    }
                }
            }
        }
        bases
    }

    /// Mints a new coin: builds a Base over `promise` and `output`, signed
    /// by `signer` as the issuer.
    ///
    /// Fails with [`CoinError::NonPositiveValue`] unless the output carries
    /// strictly positive value.
    pub fn issue<K: KeyService + ?Sized>(
        promise: Promise,
        output: Output,
        signer: &Signer<'_, K>,
    ) -> Result<Coin, CoinError> {
        if !Fraction::ZERO.is_less_than(output.value) {
            return Err(CoinError::NonPositiveValue);
        }
        let base = Base::signed(promise, output, signer)?;
        Ok(Coin::new(Input::first(Arc::new(Transaction::Base(base)))))
    }

    /// Builds one shared Transfer node consuming `inputs` and producing
    /// `outputs`, signed once; returns one coin per output.
    ///
    /// Construction is structural only — ownership and value parity are
    /// checked lazily by [`crate::verification`], not here.
    pub fn transfer<K: KeyService + ?Sized>(
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        signer: &Signer<'_, K>,
    ) -> Result<Vec<Coin>, CoinError> {
        let count = outputs.len();
        let node = Arc::new(Transaction::Transfer(Transfer::signed(
            inputs, outputs, signer,
        )?));

        Ok((0..count)
            .map(|i| {
                Coin::new(Input {
                    transaction: node.clone(),
                    output_index: i,
                })
            })
            .collect())
    }

    /// Folds the Base leaves `backer` recognizes into a Confirmation.
    ///
    /// The backer's share is proportional when the coin's provenance mixes
    /// bases from several backers:
    /// `share = value * sum(own bases) / sum(all bases)`. The commitment
    /// hash binds the confirmation to the exact transaction state being
    /// confirmed, so confirming a *different* history built from the same
    /// bases later is detectable by comparing commitments.
    ///
    /// Re-confirming an already-confirmed coin re-derives the same
    /// consolidated state rather than erroring.
    pub fn confirm<K: KeyService + ?Sized>(
        &self,
        backer: &Address,
        signer: &Signer<'_, K>,
        key: &K,
    ) -> Result<Coin, CoinError> {
        let all_bases = self.bases();
        let mine: Vec<Base> = all_bases
            .iter()
            .filter_map(|tx| tx.as_base())
            .filter(|base| base.output.target.as_ref() == Some(backer))
            .cloned()
            .collect();

        if mine.is_empty() {
            return Err(CoinError::NotABacker);
        }

        let my_sum = base_sum(mine.iter());
        let all_sum = base_sum(all_bases.iter().filter_map(|tx| tx.as_base()));
        let share = self.value().times(my_sum).divided_by(all_sum)?;

        let output = Output {
            target: self.owner().cloned(),
            value: share,
        };
        let commitment = key.hash(&squash(self.input.transaction().as_ref()));

        let confirmation = Confirmation::signed(mine, output, commitment, signer)?;
        Ok(Coin::new(Input::first(Arc::new(
            Transaction::Confirmation(confirmation),
        ))))
    }
}

fn base_sum<'a>(bases: impl Iterator<Item = &'a Base>) -> Fraction {
    bases.fold(Fraction::ZERO, |sum, base| sum.plus(base.output.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::FakeKeyService;

    fn signer<'a>(service: &'a FakeKeyService, name: &str) -> Signer<'a, FakeKeyService> {
        Signer::new(service, FakeKeyService::key_for(name))
    }

    fn issued(service: &FakeKeyService, backer: &str, value: u64) -> Coin {
        Coin::issue(
            Promise::new("foo", "my promise"),
            Output::new(Address::new(backer), Fraction::from(value)),
            &signer(service, "issuer"),
        )
        .unwrap()
    }

    #[test]
    fn issue_rejects_non_positive_value() {
        let service = FakeKeyService::new();
        for value in [Fraction::ZERO, Fraction::from(-1i64)] {
            let result = Coin::issue(
                Promise::new("foo", "p"),
                Output {
                    target: Some(Address::new("backer")),
                    value,
                },
                &signer(&service, "issuer"),
            );
            assert_eq!(result.unwrap_err(), CoinError::NonPositiveValue);
        }
    }

    #[test]
    fn issued_coin_is_owned_by_the_backer() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);
        assert_eq!(coin.owner(), Some(&Address::new("backer")));
        assert_eq!(coin.value(), Fraction::from(42u64));
        assert_eq!(coin.bases().len(), 1);
    }

    #[test]
    fn transfer_returns_one_coin_per_output() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);

        let coins = Coin::transfer(
            vec![coin.to_input()],
            vec![
                Output::new(Address::new("alice"), Fraction::from(30u64)),
                Output::new(Address::new("bob"), Fraction::from(12u64)),
            ],
            &signer(&service, "backer"),
        )
        .unwrap();

        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].owner(), Some(&Address::new("alice")));
        assert_eq!(coins[1].owner(), Some(&Address::new("bob")));
        // Both coins share one underlying node.
        assert!(Arc::ptr_eq(
            coins[0].input().transaction(),
            coins[1].input().transaction()
        ));
    }

    #[test]
    fn bases_follow_every_input_to_the_leaves() {
        let service = FakeKeyService::new();
        let a = issued(&service, "backer", 1);
        let b = issued(&service, "other", 2);

        let merged = Coin::transfer(
            vec![a.to_input(), b.to_input()],
            vec![Output::new(Address::new("alice"), Fraction::from(3u64))],
            &signer(&service, "backer"),
        )
        .unwrap();

        let bases = merged[0].bases();
        assert_eq!(bases.len(), 2);
        // Depth-first input order is preserved.
        assert_eq!(
            bases[0].as_base().unwrap().output.target,
            Some(Address::new("backer"))
        );
        assert_eq!(
            bases[1].as_base().unwrap().output.target,
            Some(Address::new("other"))
        );
    }

    #[test]
    fn confirm_by_the_sole_backer_keeps_the_full_value() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);
        let transferred = Coin::transfer(
            vec![coin.to_input()],
            vec![Output::new(Address::new("alice"), Fraction::from(42u64))],
            &signer(&service, "backer"),
        )
        .unwrap();

        let confirmed = transferred[0]
            .confirm(
                &Address::new("backer"),
                &signer(&service, "backer"),
                &service,
            )
            .unwrap();

        assert_eq!(confirmed.owner(), Some(&Address::new("alice")));
        assert_eq!(confirmed.value(), Fraction::from(42u64));
        // Full share: no remainder output.
        assert_eq!(confirmed.input().transaction().outputs().len(), 1);
    }

    #[test]
    fn confirm_share_is_proportional_across_backers() {
        let service = FakeKeyService::new();
        let a = issued(&service, "backer", 1);
        let b = issued(&service, "other", 2);
        let merged = Coin::transfer(
            vec![a.to_input(), b.to_input()],
            vec![Output::new(Address::new("alice"), Fraction::from(3u64))],
            &signer(&service, "backer"),
        )
        .unwrap();

        let by_backer = merged[0]
            .confirm(
                &Address::new("backer"),
                &signer(&service, "backer"),
                &service,
            )
            .unwrap();
        let by_other = merged[0]
            .confirm(&Address::new("other"), &signer(&service, "other"), &service)
            .unwrap();

        assert_eq!(by_backer.value(), Fraction::from(1u64));
        assert_eq!(by_other.value(), Fraction::from(2u64));
    }

    #[test]
    fn confirm_rejects_a_stranger() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);
        let result = coin.confirm(
            &Address::new("stranger"),
            &signer(&service, "stranger"),
            &service,
        );
        assert_eq!(result.unwrap_err(), CoinError::NotABacker);
    }

    #[test]
    fn confirming_twice_is_idempotent() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);
        let transferred = Coin::transfer(
            vec![coin.to_input()],
            vec![Output::new(Address::new("alice"), Fraction::from(42u64))],
            &signer(&service, "backer"),
        )
        .unwrap();

        let backer = Address::new("backer");
        let s = signer(&service, "backer");
        let once = transferred[0].confirm(&backer, &s, &service).unwrap();
        let twice = once.confirm(&backer, &s, &service).unwrap();

        assert_eq!(twice.owner(), once.owner());
        assert_eq!(twice.value(), once.value());
        assert_eq!(
            twice.input().transaction().outputs(),
            once.input().transaction().outputs()
        );
    }
}
