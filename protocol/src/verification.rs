//! Structural and cryptographic validation of a coin's provenance.
//!
//! Anyone asked to accept a coin runs this over the whole graph before
//! trusting it — no party in the chain is taken at its word. Findings
//! *accumulate*: a bad graph usually violates several rules at once, and a
//! verifier that stops at the first one makes diagnosing a forged coin
//! miserable. Traversal therefore never aborts; the caller decides policy
//! through [`Verification::is_ok`] / [`Verification::must_be_ok`].
//!
//! The collectors themselves are pure functions returning finding lists,
//! so callers can fold verifications of many coins without shared mutable
//! state; [`Verification`] is a thin accumulator over them.

use std::sync::Arc;

use thiserror::Error;

use crate::fingerprint::squash;
use crate::fraction::Fraction;
use crate::key::{Address, KeyService};
use crate::model::{Authorization, Coin, Transaction};

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// A single rule violation found in a graph.
///
/// The display strings are part of the protocol's diagnostic surface —
/// independent implementations report the same violation with the same
/// words, which keeps cross-implementation test fixtures honest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Finding {
    /// A node's signature does not verify against its content hash.
    #[error("Invalid signature by [{0}]")]
    InvalidSignature(Address),

    /// A non-Base node with no inputs — value from nowhere.
    #[error("No inputs")]
    NoInputs,

    /// A node's inputs reference outputs of more than one owner.
    #[error("Inconsistent owners: [{}]", .0.join("], ["))]
    InconsistentOwners(Vec<String>),

    /// A node signed by someone other than the owner of its inputs.
    #[error("Signed by non-owner: [{0}]")]
    SignedByNonOwner(Address),

    /// An output carrying negative value.
    #[error("Negative output value")]
    NegativeOutputValue,

    /// An owned output carrying exactly zero value. Ownerless remainder
    /// outputs are exempt — a foreign implementation may emit a zero
    /// remainder where this one omits it.
    #[error("Zero output value")]
    ZeroOutputValue,

    /// A node that creates or destroys value: input and output sums differ.
    #[error("Output sum not equal input sum")]
    ParityMismatch,

    /// Base leaves of one coin naming more than one currency.
    #[error("Inconsistent currencies: [{}]", .0.join("], ["))]
    InconsistentCurrencies(Vec<String>),

    /// An authorization whose own signature does not verify.
    #[error("Invalid authorization: [{0}]")]
    InvalidAuthorization(Address),

    /// A base issued by someone no valid authorization covers.
    #[error("Not authorized: [{0}]")]
    NotAuthorized(Address),
}

/// The combined failure of [`Verification::must_be_ok`]: every unique
/// finding message, joined with `"; "`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct VerificationError(pub String);

// ---------------------------------------------------------------------------
// Pure collectors
// ---------------------------------------------------------------------------

/// Collects every rule violation in `coin`'s provenance graph.
///
/// Pre-order worklist over the coin's transaction and, transitively, every
/// input's transaction — explicit stack, since graph depth is
/// attacker-controlled.
pub fn findings_for_coin<K: KeyService + ?Sized>(key: &K, coin: &Coin) -> Vec<Finding> {
    let mut findings = Vec::new();

    consistent_currencies(coin, &mut findings);

    let mut stack = vec![coin.input().transaction().clone()];
    while let Some(node) = stack.pop() {
        check_node(key, &node, &mut findings);
        for input in node.inputs().iter().rev() {
            stack.push(input.transaction().clone());
        }
    }

    findings
}

/// Checks that every authorization is validly signed and that every Base
/// leaf's issuer is covered by at least one valid grant for the coin's
/// currency.
pub fn findings_for_authorizations<K: KeyService + ?Sized>(
    key: &K,
    coin: &Coin,
    authorizations: &[Authorization],
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let bases = coin.bases();
    let currency = bases
        .first()
        .and_then(|tx| tx.as_base())
        .map(|base| base.promise.currency.clone())
        .unwrap_or_default();

    for authorization in authorizations {
        let digest = key.hash(&squash(authorization));
        if !key.verify(
            &digest,
            &authorization.signature.signer,
            &authorization.signature.sign,
        ) {
            findings.push(Finding::InvalidAuthorization(authorization.issuer.clone()));
        }
    }

    for base in bases.iter().filter_map(|tx| tx.as_base()) {
        let covered = authorizations
            .iter()
            .any(|grant| grant.authorizes(&base.issuer, &currency));
        if !covered {
            findings.push(Finding::NotAuthorized(base.issuer.clone()));
        }
    }

    findings
}

fn check_node<K: KeyService + ?Sized>(key: &K, node: &Arc<Transaction>, findings: &mut Vec<Finding>) {
    verify_signature(key, node, findings);

    if matches!(node.as_ref(), Transaction::Base(_)) {
        // Provenance leaf: the signature is the whole story.
        return;
    }

    if node.inputs().is_empty() {
        findings.push(Finding::NoInputs);
        return;
    }

    consistent_owners(node, findings);
    signed_by_owner(node, findings);
    input_output_parity(node, findings);
}

fn verify_signature<K: KeyService + ?Sized>(
    key: &K,
    node: &Arc<Transaction>,
    findings: &mut Vec<Finding>,
) {
    let digest = key.hash(&squash(node.as_ref()));
    let signature = node.signature();
    if !key.verify(&digest, &signature.signer, &signature.sign) {
        findings.push(Finding::InvalidSignature(signature.signer.clone()));
    }
}

fn consistent_owners(node: &Arc<Transaction>, findings: &mut Vec<Finding>) {
    let mut owners: Vec<String> = Vec::new();
    for input in node.inputs() {
        let owner = match &input.output().target {
            Some(address) => address.to_string(),
            None => String::new(),
        };
        if !owners.contains(&owner) {
            owners.push(owner);
        }
    }

    if owners.len() != 1 {
        findings.push(Finding::InconsistentOwners(owners));
    }
}

fn signed_by_owner(node: &Arc<Transaction>, findings: &mut Vec<Finding>) {
    let owner = &node.inputs()[0].output().target;
    let signer = &node.signature().signer;
    if owner.as_ref() != Some(signer) {
        findings.push(Finding::SignedByNonOwner(signer.clone()));
    }
}

fn input_output_parity(node: &Arc<Transaction>, findings: &mut Vec<Finding>) {
    let mut output_sum = Fraction::ZERO;
    for output in node.outputs() {
        if output.value.is_less_than(Fraction::ZERO) {
            findings.push(Finding::NegativeOutputValue);
        } else if output.value.is_zero() && output.target.is_some() {
            findings.push(Finding::ZeroOutputValue);
        }
        output_sum = output_sum.plus(output.value);
    }

    let input_sum = node
        .inputs()
        .iter()
        .fold(Fraction::ZERO, |sum, input| sum.plus(input.output().value));

    if input_sum != output_sum {
        findings.push(Finding::ParityMismatch);
    }
}

fn consistent_currencies(coin: &Coin, findings: &mut Vec<Finding>) {
    let mut currencies: Vec<String> = Vec::new();
    for base in coin.bases().iter().filter_map(|tx| tx.as_base()) {
        if !currencies.contains(&base.promise.currency) {
            currencies.push(base.promise.currency.clone());
        }
    }

    if currencies.len() > 1 {
        findings.push(Finding::InconsistentCurrencies(currencies));
    }
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Folds findings from any number of checks into one verdict.
///
/// One instance is meant for one verifying party's session; it is not a
/// shared-state type. For a stateless one-shot, use [`findings_for_coin`]
/// directly.
pub struct Verification<'a, K: KeyService + ?Sized> {
    key: &'a K,
    errors: Vec<Finding>,
}

impl<'a, K: KeyService + ?Sized> Verification<'a, K> {
    pub fn new(key: &'a K) -> Verification<'a, K> {
        Verification {
            key,
            errors: Vec::new(),
        }
    }

    /// Verifies one coin's whole graph, accumulating any findings.
    pub fn verify(&mut self, coin: &Coin) -> &mut Self {
        self.errors.extend(findings_for_coin(self.key, coin));
        self
    }

    /// Verifies each coin in turn into one combined finding set.
    pub fn verify_all<'c>(&mut self, coins: impl IntoIterator<Item = &'c Coin>) -> &mut Self {
        for coin in coins {
            self.verify(coin);
        }
        self
    }

    /// Checks issuer authorization coverage for `coin`.
    pub fn verify_authorizations(
        &mut self,
        coin: &Coin,
        authorizations: &[Authorization],
    ) -> &mut Self {
        self.errors
            .extend(findings_for_authorizations(self.key, coin, authorizations));
        self
    }

    /// Everything found so far, in traversal order.
    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fails with all unique finding messages joined by `"; "`.
    pub fn must_be_ok(&self) -> Result<(), VerificationError> {
        if self.is_ok() {
            return Ok(());
        }

        let mut messages: Vec<String> = Vec::new();
        for finding in &self.errors {
            let message = finding.to_string();
            if !messages.contains(&message) {
                messages.push(message);
            }
        }
        Err(VerificationError(messages.join("; ")))
    }
}
