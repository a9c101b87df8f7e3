//! JSON wire encoding of coins.
//!
//! A coin crosses process boundaries as a tagged JSON document:
//!
//! ```json
//! {"v": "dev", "in": {"iout": 0, "tx": {...}}}
//! ```
//!
//! The transaction object carries no explicit type tag — the variant is
//! recognized by key presence (`promise` marks a Base, `finger` a
//! Confirmation, anything else a Transfer). Values encode in their most
//! compact form: a bare integer for whole values, a `[num, den]` pair for
//! proper fractions, and a `"num|den"` string as the fallback when either
//! part exceeds what a JSON integer holds.
//!
//! A Confirmation's remainder output is never on the wire; decoding
//! re-derives it from the bases and the consolidated output, the same way
//! the constructor does. Round trip holds: `decode(encode(c)) == c` for
//! every valid coin.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::fraction::Fraction;
use crate::key::Address;
use crate::model::{Base, Coin, Confirmation, Input, Output, Promise, Signature, Transaction, Transfer};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The document declares a version this implementation does not speak.
    #[error("unsupported version {0:?}")]
    UnsupportedVersion(String),

    /// The document does not have the shape of a coin.
    #[error("malformed coin: {0}")]
    Malformed(String),
}

fn malformed(what: impl Into<String>) -> WireError {
    WireError::Malformed(what.into())
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

pub fn encode_coin(coin: &Coin) -> Value {
    json!({
        "v": Coin::VERSION,
        "in": encode_input(coin.input()),
    })
}

/// The coin as a JSON string.
pub fn to_json(coin: &Coin) -> String {
    encode_coin(coin).to_string()
}

fn encode_input(input: &Input) -> Value {
    json!({
        "iout": input.output_index(),
        "tx": encode_transaction(input.transaction()),
    })
}

fn encode_transaction(transaction: &Transaction) -> Value {
    match transaction {
        Transaction::Base(base) => encode_base(base),
        Transaction::Transfer(transfer) => json!({
            "ins": transfer.inputs.iter().map(encode_input).collect::<Vec<_>>(),
            "outs": transfer.outputs.iter().map(encode_output).collect::<Vec<_>>(),
            "sig": encode_signature(&transfer.signature),
        }),
        Transaction::Confirmation(confirmation) => json!({
            "finger": confirmation.commitment,
            "bases": confirmation
                .bases()
                .iter()
                .map(|base| encode_base(base))
                .collect::<Vec<_>>(),
            // The remainder output is derived, not transported.
            "out": encode_output(confirmation.output()),
            "sig": encode_signature(&confirmation.signature),
        }),
    }
}

fn encode_base(base: &Base) -> Value {
    json!({
        "promise": [base.promise.currency, base.promise.description],
        "out": encode_output(&base.output),
        "by": base.issuer,
        "sig": encode_signature(&base.signature),
    })
}

fn encode_output(output: &Output) -> Value {
    json!({
        "to": output.target,
        "val": encode_value(output.value),
    })
}

fn encode_value(value: Fraction) -> Value {
    let num = value.numerator();
    let den = value.denominator();

    if den == 1 || num == 0 {
        if let Ok(n) = i64::try_from(num) {
            return json!(n);
        }
    } else if let (Ok(n), Ok(d)) = (i64::try_from(num), i64::try_from(den)) {
        return json!([n, d]);
    }

    // Line-oriented fallback for values JSON integers cannot carry.
    json!(value.to_string())
}

fn encode_signature(signature: &Signature) -> Value {
    json!({
        "signer": signature.signer,
        "sign": hex::encode(&signature.sign),
    })
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

pub fn decode_coin(value: &Value) -> Result<Coin, WireError> {
    let coin = object(value, "coin")?;

    let version = string(field(coin, "v")?, "v")?;
    if version != Coin::VERSION {
        return Err(WireError::UnsupportedVersion(version.to_owned()));
    }

    Ok(Coin::new(decode_input(field(coin, "in")?)?))
}

/// Parses a coin from its JSON string form.
pub fn from_json(json: &str) -> Result<Coin, WireError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| malformed(format!("invalid json: {e}")))?;
    decode_coin(&value)
}

fn decode_input(value: &Value) -> Result<Input, WireError> {
    let input = object(value, "input")?;
    let iout = field(input, "iout")?
        .as_u64()
        .ok_or_else(|| malformed("iout must be an unsigned integer"))? as usize;
    let transaction = decode_transaction(field(input, "tx")?)?;

    Input::new(transaction, iout).map_err(|e| malformed(e.to_string()))
}

fn decode_transaction(value: &Value) -> Result<Arc<Transaction>, WireError> {
    let tx = object(value, "transaction")?;

    let transaction = if tx.contains_key("promise") {
        Transaction::Base(decode_base(tx)?)
    } else if tx.contains_key("finger") {
        let bases = field(tx, "bases")?
            .as_array()
            .ok_or_else(|| malformed("bases must be an array"))?
            .iter()
            .map(|base| decode_base(object(base, "base")?))
            .collect::<Result<Vec<_>, _>>()?;
        let output = decode_output(field(tx, "out")?)?;
        let commitment = string(field(tx, "finger")?, "finger")?.to_owned();
        let signature = decode_signature(field(tx, "sig")?)?;
        Transaction::Confirmation(Confirmation::new(bases, output, commitment, signature))
    } else {
        let inputs = field(tx, "ins")?
            .as_array()
            .ok_or_else(|| malformed("ins must be an array"))?
            .iter()
            .map(decode_input)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = field(tx, "outs")?
            .as_array()
            .ok_or_else(|| malformed("outs must be an array"))?
            .iter()
            .map(decode_output)
            .collect::<Result<Vec<_>, _>>()?;
        let signature = decode_signature(field(tx, "sig")?)?;
        Transaction::Transfer(Transfer::new(inputs, outputs, signature))
    };

    Ok(Arc::new(transaction))
}

fn decode_base(tx: &Map<String, Value>) -> Result<Base, WireError> {
    let promise = field(tx, "promise")?
        .as_array()
        .filter(|parts| parts.len() == 2)
        .ok_or_else(|| malformed("promise must be [currency, description]"))?;
    let currency = string(&promise[0], "currency")?;
    let description = string(&promise[1], "description")?;

    Ok(Base::new(
        Promise::new(currency, description),
        decode_output(field(tx, "out")?)?,
        Address::new(string(field(tx, "by")?, "by")?),
        decode_signature(field(tx, "sig")?)?,
    ))
}

fn decode_output(value: &Value) -> Result<Output, WireError> {
    let output = object(value, "output")?;
    let target = match field(output, "to")? {
        Value::Null => None,
        to => Some(Address::new(string(to, "to")?)),
    };

    Ok(Output {
        target,
        value: decode_value(field(output, "val")?)?,
    })
}

fn decode_value(value: &Value) -> Result<Fraction, WireError> {
    match value {
        Value::Number(n) => {
            let num = n
                .as_i64()
                .ok_or_else(|| malformed("val must be an integer"))?;
            Ok(Fraction::from(num))
        }
        Value::Array(parts) if parts.len() == 2 => {
            let num = parts[0]
                .as_i64()
                .ok_or_else(|| malformed("val numerator must be an integer"))?;
            let den = parts[1]
                .as_i64()
                .ok_or_else(|| malformed("val denominator must be an integer"))?;
            Fraction::new(num as i128, den as i128).map_err(|e| malformed(e.to_string()))
        }
        Value::String(s) => s
            .parse::<Fraction>()
            .map_err(|e| malformed(format!("val {s:?}: {e}"))),
        _ => Err(malformed("val must be an integer, a pair, or a string")),
    }
}

fn decode_signature(value: &Value) -> Result<Signature, WireError> {
    let sig = object(value, "signature")?;
    let signer = Address::new(string(field(sig, "signer")?, "signer")?);
    let sign = hex::decode(string(field(sig, "sign")?, "sign")?)
        .map_err(|e| malformed(format!("sign is not hex: {e}")))?;
    Ok(Signature::new(signer, sign))
}

fn object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, WireError> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("{what} must be an object")))
}

fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value, WireError> {
    map.get(key)
        .ok_or_else(|| malformed(format!("missing {key:?}")))
}

fn string<'a>(value: &'a Value, what: &str) -> Result<&'a str, WireError> {
    value
        .as_str()
        .ok_or_else(|| malformed(format!("{what} must be a string")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{FakeKeyService, Signer};

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
    fn an_issued_coin_encodes_to_the_documented_structure() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);

        let encoded = encode_coin(&coin);
        assert_eq!(
            encoded,
            json!({
                "v": "dev",
                "in": {
                    "iout": 0,
                    "tx": {
                        "promise": ["foo", "my promise"],
                        "out": {"to": "backer", "val": 42},
                        "by": "issuer",
                        "sig": {
                            "signer": "issuer",
                            "sign": hex::encode(&coin.input().transaction().signature().sign),
                        },
                    },
                },
            })
        );
    }

    #[test]
    fn base_coin_round_trips() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);
        assert_eq!(decode_coin(&encode_coin(&coin)).unwrap(), coin);
    }

    #[test]
    fn transfer_chain_round_trips_through_strings() {
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

        for coin in &coins {
            assert_eq!(from_json(&to_json(coin)).unwrap(), *coin);
        }
        // The second coin keeps its output index across the trip.
        assert_eq!(
            decode_coin(&encode_coin(&coins[1])).unwrap().input().output_index(),
            1
        );
    }

    #[test]
    fn confirmation_round_trips_and_rederives_its_remainder() {
        let service = FakeKeyService::new();
        let a = issued(&service, "backer", 1);
        let b = issued(&service, "other", 2);
        let merged = Coin::transfer(
            vec![a.to_input(), b.to_input()],
            vec![Output::new(Address::new("alice"), Fraction::from(3u64))],
            &signer(&service, "backer"),
        )
        .unwrap();
        let confirmed = merged[0]
            .confirm(
                &Address::new("other"),
                &signer(&service, "other"),
                &service,
            )
            .unwrap();

        let encoded = encode_coin(&confirmed);
        // Only the consolidated output travels.
        assert!(encoded["in"]["tx"]["out"].is_object());
        assert!(encoded["in"]["tx"].get("outs").is_none());

        let decoded = decode_coin(&encoded).unwrap();
        assert_eq!(decoded, confirmed);
        assert_eq!(decoded.input().transaction().outputs().len(), 2);
    }

    #[test]
    fn fractional_values_encode_as_pairs() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 1);
        let parts = Coin::transfer(
            vec![coin.to_input()],
            vec![
                Output::new(Address::new("backer"), Fraction::new(1, 3).unwrap()),
                Output::new(Address::new("backer"), Fraction::new(2, 3).unwrap()),
            ],
            &signer(&service, "backer"),
        )
        .unwrap();

        let encoded = encode_coin(&parts[0]);
        assert_eq!(encoded["in"]["tx"]["outs"][0]["val"], json!([1, 3]));
        assert_eq!(decode_coin(&encoded).unwrap(), parts[0]);
    }

    #[test]
    fn string_values_are_accepted_on_decode() {
        assert_eq!(decode_value(&json!("3|13")).unwrap(), Fraction::new(3, 13).unwrap());
        assert_eq!(decode_value(&json!("42")).unwrap(), Fraction::from(42u64));
        assert_eq!(decode_value(&json!(7)).unwrap(), Fraction::from(7u64));
        assert_eq!(decode_value(&json!([1, 2])).unwrap(), Fraction::new(1, 2).unwrap());
    }

    #[test]
    fn oversized_values_fall_back_to_strings() {
        let huge = Fraction::new(i64::MAX as i128 + 1, 3).unwrap();
        let encoded = encode_value(huge);
        assert!(encoded.is_string());
        assert_eq!(decode_value(&encoded).unwrap(), huge);
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let service = FakeKeyService::new();
        let mut encoded = encode_coin(&issued(&service, "backer", 42));
        encoded["v"] = json!("v2");

        assert_eq!(
            decode_coin(&encoded).unwrap_err(),
            WireError::UnsupportedVersion("v2".to_owned())
        );
    }

    #[test]
    fn structural_garbage_is_malformed() {
        for bad in [
            json!(42),
            json!({"v": "dev"}),
            json!({"v": "dev", "in": {"iout": 0}}),
            json!({"v": "dev", "in": {"iout": 5, "tx": {
                "promise": ["foo", "p"],
                "out": {"to": "b", "val": 1},
                "by": "i",
                "sig": {"signer": "i", "sign": ""},
            }}}),
        ] {
            assert!(matches!(
                decode_coin(&bad),
                Err(WireError::Malformed(_))
            ));
        }
    }

    #[test]
    fn tampering_with_the_wire_form_shows_up_in_verification() {
        let service = FakeKeyService::new();
        let coin = issued(&service, "backer", 42);

        let mut encoded = encode_coin(&coin);
        encoded["in"]["tx"]["out"]["val"] = json!(43);
        let tampered = decode_coin(&encoded).unwrap();

        let findings = crate::verification::findings_for_coin(&service, &tampered);
        assert!(!findings.is_empty());
    }
}
