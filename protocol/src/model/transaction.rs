//! The polymorphic transaction node: `Base | Transfer | Confirmation`.
//!
//! Every variant carries inputs, outputs, and a signature; what differs is
//! which extra fields the variant requires. A sum type with shared
//! accessors keeps traversal and verification dispatching on the tag
//! instead of on open-ended subclassing.
//!
//! The *print* of each variant deliberately excludes its signature (a
//! signature cannot cover itself) and the Base's issuer address (the
//! issuer is already the signature's signer). A Confirmation's print also
//! excludes the derived remainder output — the backer signs the
//! consolidated output it chose, not the change computed from it.

use std::sync::Arc;

use crate::fingerprint::{Fingerprint, Print};
use crate::fraction::Fraction;
use crate::key::{Address, KeyError, KeyService, Signer};

use super::output::{Input, Output};
use super::promise::Promise;
use super::signature::Signature;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A node in the provenance DAG. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Original issuance — the root of all value, a provenance leaf.
    Base(Base),
    /// Moves and splits value between owners.
    Transfer(Transfer),
    /// A backer's consolidation of the Base leaves it recognizes.
    Confirmation(Confirmation),
}

impl Transaction {
    /// The node's inputs. Empty exactly for a Base.
    pub fn inputs(&self) -> &[Input] {
        match self {
            Transaction::Base(_) => &[],
            Transaction::Transfer(t) => &t.inputs,
            Transaction::Confirmation(c) => &c.inputs,
        }
    }

    /// The node's outputs. A Base has exactly one.
    pub fn outputs(&self) -> &[Output] {
        match self {
            Transaction::Base(b) => std::slice::from_ref(&b.output),
            Transaction::Transfer(t) => &t.outputs,
            Transaction::Confirmation(c) => &c.outputs,
        }
    }

    /// The signature over the node's print.
    pub fn signature(&self) -> &Signature {
        match self {
            Transaction::Base(b) => &b.signature,
            Transaction::Transfer(t) => &t.signature,
            Transaction::Confirmation(c) => &c.signature,
        }
    }

    pub fn as_base(&self) -> Option<&Base> {
        match self {
            Transaction::Base(b) => Some(b),
            _ => None,
        }
    }
}

impl Fingerprint for Transaction {
    fn print(&self) -> Print {
        match self {
            Transaction::Base(b) => b.print(),
            Transaction::Transfer(t) => t.print(),
            Transaction::Confirmation(c) => c.print(),
        }
    }
}

// ---------------------------------------------------------------------------
// Base
// ---------------------------------------------------------------------------

/// A leaf transaction minting value against a promise.
///
/// No inputs, exactly one output (to the backer whose promise it is), and
/// the issuer's signature. Whether the issuer was *allowed* to mint this
/// currency is a separate question answered by
/// [`Authorization`](super::Authorization) checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base {
    pub promise: Promise,
    pub output: Output,
    pub issuer: Address,
    pub signature: Signature,
}

impl Base {
    /// Reassembles a Base from its parts (wire decoding). No validation.
    pub fn new(promise: Promise, output: Output, issuer: Address, signature: Signature) -> Base {
        Base {
            promise,
            output,
            issuer,
            signature,
        }
    }

    /// Builds and signs a Base; the signer is the issuer.
    pub fn signed<K: KeyService + ?Sized>(
        promise: Promise,
        output: Output,
        signer: &Signer<'_, K>,
    ) -> Result<Base, KeyError> {
        let signature = signer.sign_print(&Self::content_print(&promise, &output))?;
        Ok(Base {
            promise,
            output,
            issuer: signature.signer.clone(),
            signature,
        })
    }

    fn content_print(promise: &Promise, output: &Output) -> Print {
        Print::Group(vec![promise.print(), output.print()])
    }
}

impl Fingerprint for Base {
    fn print(&self) -> Print {
        Self::content_print(&self.promise, &self.output)
    }
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Consumes prior outputs and produces new ones.
///
/// All inputs must belong to one owner, who signs once for the whole node;
/// value must be conserved exactly across the split. Neither rule is
/// checked here — construction is structural, verification is lazy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub signature: Signature,
}

impl Transfer {
    /// Reassembles a Transfer from its parts (wire decoding). No validation.
    pub fn new(inputs: Vec<Input>, outputs: Vec<Output>, signature: Signature) -> Transfer {
        Transfer {
            inputs,
            outputs,
            signature,
        }
    }

    /// Builds and signs a Transfer node.
    pub fn signed<K: KeyService + ?Sized>(
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        signer: &Signer<'_, K>,
    ) -> Result<Transfer, KeyError> {
        let signature = signer.sign_print(&Self::content_print(&inputs, &outputs))?;
        Ok(Transfer {
            inputs,
            outputs,
            signature,
        })
    }

    fn content_print(inputs: &[Input], outputs: &[Output]) -> Print {
        Print::Group(vec![
            Print::Group(inputs.iter().map(Fingerprint::print).collect()),
            Print::Group(outputs.iter().map(Fingerprint::print).collect()),
        ])
    }
}

impl Fingerprint for Transfer {
    fn print(&self) -> Print {
        Self::content_print(&self.inputs, &self.outputs)
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// A backer-signed consolidation of Base leaves.
///
/// Inputs are the bases the backer recognizes as its own; the first output
/// reassigns the confirmed share downstream, and when the recognized value
/// exceeds that share a second, ownerless remainder output keeps the
/// books balanced. `commitment` is the hash of the squash of the exact
/// transaction state being confirmed — a backer confirming two different
/// histories built from the same bases leaves two different commitments
/// behind, which is how double-confirmation is caught after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub commitment: String,
    pub signature: Signature,
}

impl Confirmation {
    /// Reassembles a Confirmation from bases, the consolidated output, and
    /// the commitment. The remainder output is re-derived, not stored, so
    /// wire decoding reuses this constructor.
    pub fn new(
        bases: Vec<Base>,
        output: Output,
        commitment: String,
        signature: Signature,
    ) -> Confirmation {
        let outputs = Self::keep_change(&bases, output);
        let inputs = bases
            .into_iter()
            .map(|base| Input::first(Arc::new(Transaction::Base(base))))
            .collect();
        Confirmation {
            inputs,
            outputs,
            commitment,
            signature,
        }
    }

    /// Builds and signs a Confirmation; the signer is the backer.
    pub fn signed<K: KeyService + ?Sized>(
        bases: Vec<Base>,
        output: Output,
        commitment: String,
        signer: &Signer<'_, K>,
    ) -> Result<Confirmation, KeyError> {
        let signature = signer.sign_print(&Self::content_print(&bases, &output, &commitment))?;
        Ok(Self::new(bases, output, commitment, signature))
    }

    /// The consolidated output the backer signed.
    pub fn output(&self) -> &Output {
        &self.outputs[0]
    }

    /// The confirmed Base leaves, in input order.
    pub fn bases(&self) -> Vec<&Base> {
        self.inputs
            .iter()
            .filter_map(|input| input.transaction().as_base())
            .collect()
    }

    /// Appends the ownerless remainder when the recognized base sum
    /// exceeds the consolidated output. A full-share confirmation keeps a
    /// single output — never a zero-value remainder.
    fn keep_change(bases: &[Base], output: Output) -> Vec<Output> {
        let sum = bases
            .iter()
            .fold(Fraction::ZERO, |sum, base| sum.plus(base.output.value));

        if sum == output.value {
            vec![output]
        } else {
            let change = sum.minus(output.value);
            vec![output, Output::remainder(change)]
        }
    }

    fn content_print(bases: &[Base], output: &Output, commitment: &str) -> Print {
        Print::Group(vec![
            Print::Group(bases.iter().map(Fingerprint::print).collect()),
            output.print(),
            Print::text(commitment),
        ])
    }
}

impl Fingerprint for Confirmation {
    fn print(&self) -> Print {
        let bases = self.bases();
        Print::Group(vec![
            Print::Group(bases.iter().map(|base| base.print()).collect()),
            self.outputs[0].print(),
            Print::text(&self.commitment),
        ])
    }
}
