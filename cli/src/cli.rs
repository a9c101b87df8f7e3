//! # CLI Interface
//!
//! Defines the command-line argument structure for `scrip` using `clap`
//! derive. One subcommand per protocol operation, all working over JSON
//! coin files so pipelines can pass coins around like any other artifact.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scrip command-line wallet and verifier.
///
/// Issues, transfers, splits, confirms, verifies, and audits coins of a
/// community currency. Coins live in JSON files; keys live in key files
/// you guard yourself.
#[derive(Parser, Debug)]
#[command(
    name = "scrip",
    about = "Scrip community-currency wallet",
    version,
    propagate_version = true
)]
pub struct ScripCli {
    /// Log output format: pretty or json.
    #[arg(long, env = "SCRIP_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the scrip binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh keypair — writes the private key to a file and
    /// prints the address.
    Keygen(KeygenArgs),
    /// Issue a new coin against a promise.
    Issue(IssueArgs),
    /// Transfer a coin to another address.
    Transfer(TransferArgs),
    /// Split a coin into proportional parts kept at the current owner.
    Split(SplitArgs),
    /// Confirm a coin as its backer, consolidating its history.
    Confirm(ConfirmArgs),
    /// Sign an authorization allowing an issuer to mint a currency.
    Authorize(AuthorizeArgs),
    /// Verify coins, optionally against an authorization list.
    Verify(VerifyArgs),
    /// Audit the redistribution history of a coin's transfer chain.
    Balances(BalancesArgs),
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// File to write the private key to.
    #[arg(long, short = 'o', default_value = "scrip.key")]
    pub out: PathBuf,
}

/// Arguments for the `issue` subcommand.
#[derive(Parser, Debug)]
pub struct IssueArgs {
    /// Currency identifier of the promise.
    #[arg(long)]
    pub currency: String,

    /// What the backer promises to deliver per unit.
    #[arg(long)]
    pub description: String,

    /// Address of the backer whose promise this coin represents.
    #[arg(long)]
    pub backer: String,

    /// Value of the coin: an integer or "num|den".
    #[arg(long, default_value = "1")]
    pub value: String,

    /// Issuer private key file.
    #[arg(long, short = 'k', env = "SCRIP_KEY")]
    pub key: PathBuf,

    /// File to write the coin to.
    #[arg(long, short = 'o', default_value = "coin.json")]
    pub out: PathBuf,
}

/// Arguments for the `transfer` subcommand.
#[derive(Parser, Debug)]
pub struct TransferArgs {
    /// Coin file to transfer.
    #[arg(long, short = 'c')]
    pub coin: PathBuf,

    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Owner private key file.
    #[arg(long, short = 'k', env = "SCRIP_KEY")]
    pub key: PathBuf,

    /// File to write the transferred coin to.
    #[arg(long, short = 'o', default_value = "coin.json")]
    pub out: PathBuf,
}

/// Arguments for the `split` subcommand.
#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Coin file to split.
    #[arg(long, short = 'c')]
    pub coin: PathBuf,

    /// Proportional parts, e.g. `--parts 1 --parts 2` for a 1:2 split.
    #[arg(long, required = true)]
    pub parts: Vec<u64>,

    /// Owner private key file.
    #[arg(long, short = 'k', env = "SCRIP_KEY")]
    pub key: PathBuf,

    /// Output prefix — parts land in `<prefix>-0.json`, `<prefix>-1.json`, ...
    #[arg(long, short = 'o', default_value = "part")]
    pub out: String,
}

/// Arguments for the `confirm` subcommand.
#[derive(Parser, Debug)]
pub struct ConfirmArgs {
    /// Coin file to confirm.
    #[arg(long, short = 'c')]
    pub coin: PathBuf,

    /// Backer private key file.
    #[arg(long, short = 'k', env = "SCRIP_KEY")]
    pub key: PathBuf,

    /// File to write the confirmed coin to.
    #[arg(long, short = 'o', default_value = "coin.json")]
    pub out: PathBuf,
}

/// Arguments for the `authorize` subcommand.
#[derive(Parser, Debug)]
pub struct AuthorizeArgs {
    /// Address of the issuer being authorized.
    #[arg(long)]
    pub issuer: String,

    /// Currency the issuer may mint.
    #[arg(long)]
    pub currency: String,

    /// Authority private key file.
    #[arg(long, short = 'k', env = "SCRIP_KEY")]
    pub key: PathBuf,

    /// File to write the authorization to.
    #[arg(long, short = 'o', default_value = "authorization.json")]
    pub out: PathBuf,
}

/// Arguments for the `verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Coin files to verify.
    #[arg(required = true)]
    pub coins: Vec<PathBuf>,

    /// JSON file holding an array of authorizations to check issuers
    /// against.
    #[arg(long)]
    pub authorizations: Option<PathBuf>,

    /// Exit with an error unless every check passes.
    #[arg(long)]
    pub must_be_ok: bool,
}

/// Arguments for the `balances` subcommand.
#[derive(Parser, Debug)]
pub struct BalancesArgs {
    /// Coin file to audit.
    #[arg(long, short = 'c')]
    pub coin: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        ScripCli::command().debug_assert();
    }
}
