//! The delivery promise behind an issuance.

use serde::{Deserialize, Serialize};

use crate::fingerprint::{Fingerprint, Print};

/// What an issuer commits to deliver for a [`Base`](super::Base).
///
/// The promise names the currency and describes the obligation; the Base's
/// output says how many units it is worth. Promises are plain value
/// objects — two promises with the same currency and description are the
/// same promise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Promise {
    /// The currency this promise is denominated in. All bases reachable
    /// from one coin must agree on it.
    pub currency: String,
    /// Human-readable description of the obligation ("one loaf of bread").
    pub description: String,
}

impl Promise {
    pub fn new(currency: impl Into<String>, description: impl Into<String>) -> Promise {
        Promise {
            currency: currency.into(),
            description: description.into(),
        }
    }
}

impl Fingerprint for Promise {
    fn print(&self) -> Print {
        Print::Group(vec![
            Print::text(&self.currency),
            Print::text(&self.description),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::squash;

    #[test]
    fn print_is_currency_then_description() {
        let promise = Promise::new("foo", "my promise");
        assert_eq!(squash(&promise), "#(foo\0my promise)");
    }
}
