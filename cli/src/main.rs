// Copyright (c) 2026 Scrip Contributors. MIT License.
// See LICENSE for details.

//! # Scrip CLI
//!
//! Entry point for the `scrip` binary. Parses CLI arguments, initializes
//! logging, and dispatches to the subcommand implementations.
//!
//! The binary supports eight subcommands:
//!
//! - `keygen`    — generate a keypair
//! - `issue`     — mint a coin against a promise
//! - `transfer`  — hand a coin to another address
//! - `split`     — split a coin into proportional parts
//! - `confirm`   — consolidate a coin's history as its backer
//! - `authorize` — grant an issuer the right to mint a currency
//! - `verify`    — validate coins before accepting them
//! - `balances`  — audit a transfer chain's redistribution

mod cli;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;

use scrip_protocol::key::Ed25519KeyService;
use scrip_protocol::scrip::Scrip;

use cli::{Commands, ScripCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = ScripCli::parse();

    logging::init_logging(
        "scrip=info,scrip_protocol=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let scrip = Scrip::new(Ed25519KeyService::new());

    match cli.command {
        Commands::Keygen(args) => commands::keygen(&scrip, args),
        Commands::Issue(args) => commands::issue(&scrip, args),
        Commands::Transfer(args) => commands::transfer(&scrip, args),
        Commands::Split(args) => commands::split(&scrip, args),
        Commands::Confirm(args) => commands::confirm(&scrip, args),
        Commands::Authorize(args) => commands::authorize(&scrip, args),
        Commands::Verify(args) => commands::verify(&scrip, args),
        Commands::Balances(args) => commands::balances(&scrip, args),
    }
}
