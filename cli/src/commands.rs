//! Subcommand implementations.
//!
//! Each command is a thin bridge between files and the protocol facade:
//! read JSON, call into `scrip-protocol`, write JSON. Anything that can go
//! wrong is reported with the path that caused it.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

use scrip_protocol::fraction::Fraction;
use scrip_protocol::key::{Address, Ed25519KeyService, PrivateKey, Signer};
use scrip_protocol::model::{Authorization, Coin, Output, Promise, Signature};
use scrip_protocol::scrip::Scrip;
use scrip_protocol::wire;

use crate::cli;

pub fn keygen(scrip: &Scrip<Ed25519KeyService>, args: cli::KeygenArgs) -> Result<()> {
    let key = scrip.generate_key();
    let address = scrip.address(&key)?;

    fs::write(&args.out, key.reveal())
        .with_context(|| format!("failed to write key to {}", args.out.display()))?;

    // Keep the key out of other users' reach.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&args.out, fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(path = %args.out.display(), "private key written");
    println!("{address}");
    Ok(())
}

pub fn issue(scrip: &Scrip<Ed25519KeyService>, args: cli::IssueArgs) -> Result<()> {
    let key = read_key(&args.key)?;
    let value: Fraction = args
        .value
        .parse()
        .with_context(|| format!("invalid value {:?}", args.value))?;

    let coin = scrip.issue(
        Promise::new(args.currency, args.description),
        Output::new(Address::new(args.backer), value),
        &key,
    )?;

    save_coin(&args.out, &coin)?;
    tracing::info!(path = %args.out.display(), value = %coin.value(), "coin issued");
    Ok(())
}

pub fn transfer(scrip: &Scrip<Ed25519KeyService>, args: cli::TransferArgs) -> Result<()> {
    let key = read_key(&args.key)?;
    let coin = load_coin(&args.coin)?;

    let transferred = scrip.transfer_coin(&coin, Address::new(args.to), &key)?;

    save_coin(&args.out, &transferred)?;
    tracing::info!(path = %args.out.display(), "coin transferred");
    Ok(())
}

pub fn split(scrip: &Scrip<Ed25519KeyService>, args: cli::SplitArgs) -> Result<()> {
    let key = read_key(&args.key)?;
    let coin = load_coin(&args.coin)?;

    let parts = scrip.split(&coin, &args.parts, &key)?;

    for (i, part) in parts.iter().enumerate() {
        let path = format!("{}-{}.json", args.out, i);
        save_coin(Path::new(&path), part)?;
        println!("{path}: {}", part.value());
    }
    Ok(())
}

pub fn confirm(scrip: &Scrip<Ed25519KeyService>, args: cli::ConfirmArgs) -> Result<()> {
    let key = read_key(&args.key)?;
    let coin = load_coin(&args.coin)?;

    let confirmed = scrip.confirm(&coin, &key)?;

    save_coin(&args.out, &confirmed)?;
    tracing::info!(path = %args.out.display(), value = %confirmed.value(), "coin confirmed");
    Ok(())
}

pub fn authorize(scrip: &Scrip<Ed25519KeyService>, args: cli::AuthorizeArgs) -> Result<()> {
    let key = read_key(&args.key)?;
    let signer = Signer::new(scrip.key(), key);

    let grant = Authorization::signed(Address::new(args.issuer), args.currency, &signer)?;

    let encoded = serde_json::to_string_pretty(&encode_authorization(&grant))?;
    fs::write(&args.out, encoded)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(path = %args.out.display(), "authorization written");
    Ok(())
}

pub fn verify(scrip: &Scrip<Ed25519KeyService>, args: cli::VerifyArgs) -> Result<()> {
    let coins = args
        .coins
        .iter()
        .map(|path| load_coin(path))
        .collect::<Result<Vec<_>>>()?;

    let authorizations = match &args.authorizations {
        Some(path) => Some(load_authorizations(path)?),
        None => None,
    };

    let mut verification = scrip.verification();
    verification.verify_all(&coins);
    if let Some(grants) = &authorizations {
        for coin in &coins {
            verification.verify_authorizations(coin, grants);
        }
    }

    if args.must_be_ok {
        verification.must_be_ok()?;
        println!("OK");
        return Ok(());
    }

    if verification.is_ok() {
        println!("OK");
    } else {
        for finding in verification.errors() {
            println!("{finding}");
        }
    }
    Ok(())
}

pub fn balances(scrip: &Scrip<Ed25519KeyService>, args: cli::BalancesArgs) -> Result<()> {
    let coin = load_coin(&args.coin)?;

    let mut balances: Vec<_> = scrip.resolve_balances(&coin).into_iter().collect();
    balances.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (address, balance) in balances {
        println!("{address}\t{balance}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// File plumbing
// ---------------------------------------------------------------------------

fn read_key(path: &Path) -> Result<PrivateKey> {
    let material = fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    Ok(PrivateKey::new(material.trim()))
}

fn load_coin(path: &Path) -> Result<Coin> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read coin file {}", path.display()))?;
    wire::from_json(&json).with_context(|| format!("invalid coin in {}", path.display()))
}

fn save_coin(path: &Path, coin: &Coin) -> Result<()> {
    let encoded = serde_json::to_string_pretty(&wire::encode_coin(coin))?;
    fs::write(path, encoded).with_context(|| format!("failed to write {}", path.display()))
}

fn encode_authorization(grant: &Authorization) -> Value {
    json!({
        "issuer": grant.issuer,
        "currency": grant.currency,
        "sig": {
            "signer": grant.signature.signer,
            "sign": hex::encode(&grant.signature.sign),
        },
    })
}

fn load_authorizations(path: &Path) -> Result<Vec<Authorization>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&json)
        .with_context(|| format!("invalid json in {}", path.display()))?;

    let grants = match &value {
        // A single grant is accepted as a one-element list.
        Value::Object(_) => std::slice::from_ref(&value),
        Value::Array(items) => items.as_slice(),
        _ => bail!("{} must hold an authorization or a list", path.display()),
    };

    grants.iter().map(decode_authorization).collect()
}

fn decode_authorization(value: &Value) -> Result<Authorization> {
    let issuer = field_str(value, "issuer")?;
    let currency = field_str(value, "currency")?;
    let signer = field_str(&value["sig"], "signer")?;
    let sign = hex::decode(field_str(&value["sig"], "sign")?)
        .context("authorization signature is not hex")?;

    Ok(Authorization::new(
        Address::new(issuer),
        currency,
        Signature::new(Address::new(signer), sign),
    ))
}

fn field_str<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    value[key]
        .as_str()
        .with_context(|| format!("authorization is missing {key:?}"))
}
