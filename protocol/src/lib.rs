// Copyright (c) 2026 Scrip Contributors. MIT License.
// See LICENSE for details.

//! # Scrip — Core Library
//!
//! This is the heart of Scrip: decentralized paper money for communities
//! that trust their neighbors more than their banks. A backer promises
//! something real, an issuer mints coins against that promise, and from
//! then on the coins carry their entire history with them — every holder
//! can audit every hop back to the promise itself.
//!
//! Scrip takes a pragmatic stance: Ed25519 for signatures (because we're
//! not barbarians), SHA-256 for content digests, exact rational arithmetic
//! for every value (because a coin split three ways must merge back to
//! exactly one coin), and no global ledger at all — the coin *is* the
//! ledger.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of a
//! hand-to-hand currency:
//!
//! - **fraction** — Exact rational values. Floats touch no money here.
//! - **fingerprint** — Canonical content serialization for signing.
//! - **key** — The pluggable signing capability. Your keys, your money.
//! - **model** — The transaction graph: promises, bases, transfers,
//!   confirmations, and the coins that reference them.
//! - **scrip** — The facade: issue, transfer, split, confirm, audit.
//! - **verification** — Full-graph validation. Trust nobody, check
//!   everything.
//! - **wire** — The JSON form coins travel in.
//!
//! ## Design Philosophy
//!
//! 1. Construction is structural; verification is where judgment lives.
//! 2. Transaction nodes are immutable and shared — a coin is a view.
//! 3. Traversals never recurse. Graph depth belongs to strangers.
//! 4. If it touches money, it has tests. Plural.

pub mod fingerprint;
pub mod fraction;
pub mod key;
pub mod model;
pub mod scrip;
pub mod verification;
pub mod wire;
