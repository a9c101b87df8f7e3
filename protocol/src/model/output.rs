//! Outputs and the inputs that claim them.

use std::sync::Arc;

use crate::fingerprint::{Fingerprint, Print};
use crate::fraction::Fraction;
use crate::key::Address;

use super::coin::CoinError;
use super::transaction::Transaction;

/// A slice of value assigned to a target address.
///
/// `target == None` marks the unconfirmed remainder a backer keeps for
/// itself inside a [`Confirmation`](super::Confirmation) — it has a value
/// but no owner, and is never independently spendable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Who may spend this output, or `None` for a backer-retained remainder.
    pub target: Option<Address>,
    /// The exact value carried.
    pub value: Fraction,
}

impl Output {
    pub fn new(target: Address, value: Fraction) -> Output {
        Output {
            target: Some(target),
            value,
        }
    }

    /// An ownerless remainder output.
    pub fn remainder(value: Fraction) -> Output {
        Output {
            target: None,
            value,
        }
    }
}

impl Fingerprint for Output {
    fn print(&self) -> Print {
        let target = match &self.target {
            Some(address) => address.as_str(),
            // A missing target prints as the empty string; the NUL
            // separator keeps the leaf position unambiguous.
            None => "",
        };
        Print::Group(vec![Print::text(target), Print::text(self.value.to_string())])
    }
}

/// A claim on one specific output of one specific transaction node.
///
/// Several inputs may reference the same node — the node is shared through
/// an `Arc` handle and read-only after creation. The referenced output
/// index is validated at construction, so [`Input::output`] resolution
/// never fails afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub(crate) transaction: Arc<Transaction>,
    pub(crate) output_index: usize,
}

impl Input {
    /// Creates a claim on `transaction`'s output number `output_index`.
    ///
    /// Fails with [`CoinError::NoSuchOutput`] when the index is out of
    /// range for the node.
    pub fn new(transaction: Arc<Transaction>, output_index: usize) -> Result<Input, CoinError> {
        let available = transaction.outputs().len();
        if output_index >= available {
            return Err(CoinError::NoSuchOutput {
                index: output_index,
                available,
            });
        }
        Ok(Input {
            transaction,
            output_index,
        })
    }

    /// Claim on the first output. Used where the node is known to have one
    /// (bases, confirmations).
    pub(crate) fn first(transaction: Arc<Transaction>) -> Input {
        Input {
            transaction,
            output_index: 0,
        }
    }

    /// The transaction node this input consumes from.
    pub fn transaction(&self) -> &Arc<Transaction> {
        &self.transaction
    }

    /// Which of the node's outputs is claimed.
    pub fn output_index(&self) -> usize {
        self.output_index
    }

    /// The referenced output. In range by construction.
    pub fn output(&self) -> &Output {
        &self.transaction.outputs()[self.output_index]
    }
}

impl Fingerprint for Input {
    fn print(&self) -> Print {
        Print::Group(vec![
            self.transaction.print(),
            Print::Int(self.output_index as i64),
        ])
    }
}
