//! Canonical content fingerprinting.
//!
//! Signatures and hash commitments are never computed over an in-memory
//! structure — they are computed over its *squash*: a canonical flattened
//! string that every compliant implementation must reproduce byte for byte.
//! Two verifiers that disagree on a single byte here will disagree on every
//! signature in the graph, so the format is deliberately dumb:
//!
//! 1. A value renders itself as a [`Print`] tree whose leaves are strings
//!    and integers.
//! 2. [`squash`] flattens the tree depth-first, stringifies each leaf, and
//!    joins the leaves with a NUL separator.
//! 3. The joined string is wrapped as `"#(" + joined + ")"`.
//!
//! A `Base` over the promise `("foo", "my promise")` with a 42-unit output
//! to `backer` squashes to exactly `#(foo\0my promise\0backer\042)`.
//!
//! The signature of a transaction is excluded from its own print, so the
//! squash is stable across signing.

/// A node in a fingerprint tree.
///
/// The tree shape itself carries no information — only the depth-first
/// leaf sequence does. Nesting exists so composite values can delegate to
/// their parts without flattening by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Print {
    /// A string leaf, emitted verbatim.
    Text(String),
    /// An integer leaf, emitted in decimal.
    Int(i64),
    /// A composite value: the prints of its parts, in a fixed order.
    Group(Vec<Print>),
}

impl Print {
    /// Convenience constructor for a text leaf.
    pub fn text(s: impl Into<String>) -> Print {
        Print::Text(s.into())
    }

    /// Appends this node's leaves, depth-first, to `out`.
    fn flatten_into(&self, out: &mut Vec<String>) {
        // Iterative worklist: print trees mirror the transaction graph, and
        // graph depth is attacker-controlled.
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Print::Text(s) => out.push(s.clone()),
                Print::Int(i) => out.push(i.to_string()),
                Print::Group(parts) => {
                    for part in parts.iter().rev() {
                        stack.push(part);
                    }
                }
            }
        }
    }
}

/// A value with a canonical fingerprint representation.
pub trait Fingerprint {
    /// Renders the value as a print tree. Must be deterministic and must
    /// not include any signature over the value itself.
    fn print(&self) -> Print;
}

/// Flattens a print tree into the canonical signing string.
pub fn squash_print(print: &Print) -> String {
    let mut leaves = Vec::new();
    print.flatten_into(&mut leaves);
    format!("#({})", leaves.join("\0"))
}

/// Squashes a fingerprintable value. This exact string is what gets hashed
/// and signed.
pub fn squash<T: Fingerprint + ?Sized>(value: &T) -> String {
    squash_print(&value.print())
}
