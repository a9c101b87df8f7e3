//! # Key-Service Capability
//!
//! The transaction graph never touches key material directly. Everything
//! cryptographic — key generation, signing, hashing, signature checks —
//! goes through the [`KeyService`] trait, so the graph model and the
//! verifier are testable against a deterministic fake and deployable
//! against real Ed25519 keys without changing a line.
//!
//! ```text
//! service.rs — the KeyService trait plus PrivateKey / Address types
//! ed25519.rs — production service: Ed25519 signatures over SHA-256 digests
//! fake.rs    — deterministic, human-readable service for tests
//! signer.rs  — binds one private key to a service; signs fingerprints
//! ```

pub mod ed25519;
pub mod fake;
pub mod service;
pub mod signer;

pub use ed25519::Ed25519KeyService;
pub use fake::FakeKeyService;
pub use service::{Address, KeyError, KeyService, PrivateKey};
pub use signer::Signer;
