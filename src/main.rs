//! xsm3-replay CLI - XSM3 handshake validator
//!
//! Replays a captured XSM3 session against a console's device keys and
//! reports whether every message checks out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use xsm3_replay::protocol::messages::{Opcode, Packet};
use xsm3_replay::{HandshakeValidator, KeyVault, SessionTrace, TraceFile, Xsm3Error};

/// xsm3-replay - offline XSM3 handshake validator
#[derive(Parser, Debug)]
#[command(name = "xsm3-replay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a decrypted key vault (device keys at 0x138 and 0x148)
    #[arg(short, long, conflicts_with_all = ["key1", "key2"])]
    keyvault: Option<PathBuf>,

    /// Challenge decryption key as 32 hex digits
    #[arg(long, requires = "key2")]
    key1: Option<String>,

    /// Challenge MAC key as 32 hex digits
    #[arg(long, requires = "key1")]
    key2: Option<String>,

    /// JSON trace to replay instead of the built-in capture
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Print packet headers and checksums without validating
    #[arg(long)]
    inspect: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match run(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(u8::MAX))
        }
    }
}

fn run(args: Args) -> Result<(), Xsm3Error> {
    let trace = match &args.trace {
        Some(path) => {
            tracing::info!("Loading trace from: {}", path.display());
            TraceFile::from_file(path)?
        }
        None => SessionTrace::canonical(),
    };

    if args.inspect {
        inspect(&trace);
        return Ok(());
    }

    let vault = match (&args.keyvault, &args.key1, &args.key2) {
        (Some(path), _, _) => {
            tracing::info!("Loading device keys from: {}", path.display());
            KeyVault::from_file(path)?
        }
        (None, Some(key1), Some(key2)) => KeyVault::from_hex(key1, key2)?,
        _ => {
            return Err(xsm3_replay::error::ConfigError::MissingField {
                field: "--keyvault or --key1/--key2".to_string(),
            }
            .into())
        }
    };

    let outcome = HandshakeValidator::new(vault.device_keys()).run(&trace)?;

    println!("Handshake valid ({} verify round(s))", outcome.rounds);
    println!("  cert:            {}", hex::encode(outcome.cert));
    println!("  random:          {}", hex::encode(outcome.random));
    println!("  random_enc:      {}", hex::encode(outcome.random_enc));
    println!("  random_swap_enc: {}", hex::encode(outcome.random_swap_enc));
    Ok(())
}

/// Print each packet's header and checksum status
fn inspect(trace: &SessionTrace) {
    for (step, data) in trace.messages() {
        match Packet::parse(step, data) {
            Ok(packet) => {
                let status = match packet.verify_checksum(step) {
                    Ok(()) => "ok".to_string(),
                    Err(e) => e.to_string(),
                };
                let opcode = match Opcode::try_from(packet.opcode) {
                    Ok(opcode) => format!("{:?}", opcode),
                    Err(raw) => format!("{:#06x}", raw),
                };
                println!(
                    "{:<22} {:<18} param {:#06x} len {:>3} checksum {:#04x} ({})",
                    step.to_string(),
                    opcode,
                    packet.parameter,
                    packet.payload.len(),
                    packet.checksum,
                    status
                );
            }
            Err(e) => println!("{:<22} {}", step.to_string(), e),
        }
    }
}
