//! # Transaction Graph Model
//!
//! The value-bearing DAG at the heart of the protocol. A coin's provenance
//! is a tree of signed transactions: [`Base`] leaves mint value against a
//! [`Promise`], [`Transfer`] nodes move and split it, and a
//! [`Confirmation`] lets the original backer fold the leaves it recognizes
//! back together, re-anchoring trust and shrinking the graph.
//!
//! ```text
//! promise.rs       — what a backer commits to deliver
//! output.rs        — outputs (target + value) and inputs (node + index)
//! signature.rs     — a signer address plus signature bytes
//! transaction.rs   — the Base / Transfer / Confirmation sum type
//! coin.rs          — the unit handed between parties, plus the
//!                    issue / transfer / confirm operations
//! authorization.rs — third-party grants allowing an issuer to mint
//! ```
//!
//! Everything here is immutable once constructed. Nodes referenced by
//! several inputs are shared through `Arc` handles — the graph is acyclic
//! by construction, so no back-reference bookkeeping is needed. Signed
//! constructors are *structural*: they do not validate ownership or value
//! parity. That is [`crate::verification`]'s job, run by whoever is asked
//! to accept a coin.

pub mod authorization;
pub mod coin;
pub mod output;
pub mod promise;
pub mod signature;
pub mod transaction;

pub use authorization::Authorization;
pub use coin::{Coin, CoinError};
pub use output::{Input, Output};
pub use promise::Promise;
pub use signature::Signature;
pub use transaction::{Base, Confirmation, Transaction, Transfer};
