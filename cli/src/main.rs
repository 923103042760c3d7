// Copyright (c) 2026 Stellar Custody Contributors. MIT License.
// See LICENSE for details.

//! # Stellar Custody CLI
//!
//! Entry point for the `stellar-custody` binary. Every command is offline:
//! it works from its arguments alone and prints one JSON document to
//! stdout.
//!
//! - `derive`, `validate`, `contract-id`: address and asset utilities
//! - `payment`: build an unsigned payment envelope
//! - `hash`, `prepare`, `attach`: the multi-party signing workflow
//! - `decode-entry`: turn a ledger entry into a balance

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::Parser;
use serde_json::{json, Value};

use stellar_custody::address::MuxedAccount;
use stellar_custody::config::{Network, NetworkId, STROOPS_PER_UNIT};
use stellar_custody::ledger::decode_entry_base64;
use stellar_custody::transaction::{
    attach_signatures, attach_signatures_checked, prepare_unsigned, verify_signature,
    EnvelopeVersion, Memo, Operation, Signature, TimeBounds, TransactionBuilder,
    TransactionEnvelope,
};
use stellar_custody::{derive_from_public_key, validate_format, Asset};

use cli::{Commands, CustodyCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = CustodyCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    let network = resolve_network(&cli.network, cli.network_passphrase.as_deref())?;
    tracing::debug!(%network, network_id = %network.id().to_hex(), "resolved network");

    let output = run(cli.command, network.id())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(command: Commands, network_id: NetworkId) -> Result<Value> {
    match command {
        Commands::Derive { public_key } => {
            let addresses = derive_from_public_key(&public_key)?;
            Ok(serde_json::to_value(addresses)?)
        }
        Commands::Validate { address } => Ok(serde_json::to_value(validate_format(&address))?),
        Commands::ContractId { asset } => {
            let asset: Asset = asset.parse()?;
            Ok(json!({
                "asset": asset,
                "contractId": asset.contract_id(&network_id).to_strkey(),
            }))
        }
        Commands::Payment {
            source,
            destination,
            amount,
            asset,
            sequence,
            fee,
            memo_text,
            memo_id,
            timeout,
            envelope_version,
        } => {
            let source: MuxedAccount = source.parse()?;
            let destination: MuxedAccount = destination.parse()?;
            let asset: Asset = asset.parse()?;
            let stroops = parse_amount(&amount)?;
            let version: EnvelopeVersion = envelope_version.parse()?;

            let mut builder = TransactionBuilder::new(source, sequence, network_id)
                .operation(Operation::payment(destination, asset, stroops))
                .envelope_version(version);
            if let Some(fee) = fee {
                builder = builder.fee(fee);
            }
            if let Some(text) = memo_text {
                builder = builder.memo(Memo::text(text)?);
            } else if let Some(id) = memo_id {
                builder = builder.memo(Memo::id(id));
            }
            if let Some(seconds) = timeout {
                builder = builder.time_bounds(TimeBounds::expires_in(seconds)?);
            }
            let tx = builder.build()?;

            tracing::info!(hash = %tx.hash_hex(), "built payment");
            Ok(json!({
                "envelope": BASE64.encode(tx.to_canonical_bytes()),
                "hash": tx.hash_hex(),
                "fee": tx.fee(),
                "envelopeVersion": tx.envelope_version().to_string(),
            }))
        }
        Commands::Hash { envelope } => {
            let bytes = read_envelope(&envelope)?;
            let env = TransactionEnvelope::decode(&bytes, network_id)?;
            Ok(json!({
                "hash": env.tx.hash_hex(),
                "envelopeVersion": env.tx.envelope_version().to_string(),
                "source": env.tx.source().to_strkey(),
                "sequence": env.tx.sequence().to_string(),
                "fee": env.tx.fee(),
                "operations": env.tx.operations().len(),
                "signatures": env.signatures.len(),
            }))
        }
        Commands::Prepare { envelope, signers } => {
            let bytes = read_envelope(&envelope)?;
            let env = TransactionEnvelope::decode(&bytes, network_id)?;
            Ok(serde_json::to_value(prepare_unsigned(&env.tx, &signers)?)?)
        }
        Commands::Attach {
            envelope,
            signatures,
            expected_hash,
            verify,
        } => {
            let bytes = read_envelope(&envelope)?;
            let signatures = signatures
                .iter()
                .map(|s| parse_signature(s))
                .collect::<Result<Vec<_>>>()?;

            if verify {
                let hash = TransactionEnvelope::decode(&bytes, network_id)?.tx.signing_hash();
                for sig in &signatures {
                    verify_signature(&hash, sig)?;
                }
            }

            let signed = match expected_hash {
                Some(expected) => attach_signatures_checked(&bytes, &signatures, network_id, &expected)?,
                None => attach_signatures(&bytes, &signatures, network_id)?,
            };
            tracing::info!(hash = %signed.hash_hex(), signatures = signatures.len(), "attached signatures");
            Ok(json!({
                "hash": signed.hash_hex(),
                "envelope": signed.to_base64(),
            }))
        }
        Commands::DecodeEntry { xdr } => {
            let balance = decode_entry_base64(&xdr)?;
            Ok(json!({
                "asset": balance.asset,
                "amount": balance.amount.to_string(),
                "display": balance.display_amount(),
            }))
        }
    }
}

/// `--network-passphrase` wins over `--network`.
fn resolve_network(name: &str, passphrase: Option<&str>) -> Result<Network> {
    match passphrase {
        Some(passphrase) => Ok(Network::from_passphrase(passphrase)),
        None => name
            .parse()
            .with_context(|| format!("unrecognized network {name:?}")),
    }
}

/// Accepts an envelope as hex (optionally 0x-prefixed) or base64.
fn read_envelope(input: &str) -> Result<Vec<u8>> {
    let input = input.trim();
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if !digits.is_empty() && digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return hex::decode(digits).context("envelope is not valid hex");
    }
    BASE64.decode(input).context("envelope is neither hex nor base64")
}

/// Parses `PUBLIC_KEY_HEX:SIGNATURE_HEX`.
fn parse_signature(input: &str) -> Result<Signature> {
    let (key, sig) = input
        .split_once(':')
        .with_context(|| format!("expected PUBLIC_KEY_HEX:SIGNATURE_HEX, got {input:?}"))?;
    Ok(Signature::from_hex(key, sig)?)
}

/// Converts a decimal amount to stroops. Seven fractional digits at most.
fn parse_amount(input: &str) -> Result<i64> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    if whole.is_empty() && fraction.is_empty() {
        bail!("empty amount");
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        bail!("amount must be a non-negative decimal, got {input:?}");
    }
    if fraction.len() > 7 {
        bail!("amount has more than 7 decimal places: {input:?}");
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().context("amount too large")? };
    let fraction: i64 = format!("{fraction:0<7}").parse()?;
    let stroops = whole
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|w| w.checked_add(fraction))
        .context("amount too large")?;
    if stroops == 0 {
        bail!("amount must be positive");
    }
    Ok(stroops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_custody::address::AccountId;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1").unwrap(), 10_000_000);
        assert_eq!(parse_amount("12.5").unwrap(), 125_000_000);
        assert_eq!(parse_amount("0.0000001").unwrap(), 1);
        assert_eq!(parse_amount(".25").unwrap(), 2_500_000);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("1.00000001").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("1e5").is_err());
        assert!(parse_amount("922337203685.4775808").is_err());
    }

    #[test]
    fn test_read_envelope_accepts_hex_and_base64() {
        assert_eq!(read_envelope("0x00000002").unwrap(), vec![0, 0, 0, 2]);
        assert_eq!(read_envelope("AAAAAg==").unwrap(), vec![0, 0, 0, 2]);
        assert!(read_envelope("not an envelope!").is_err());
    }

    #[test]
    fn test_resolve_network() {
        assert_eq!(resolve_network("public", None).unwrap(), Network::Public);
        assert_eq!(
            resolve_network("public", Some("Test SDF Network ; September 2015")).unwrap(),
            Network::Testnet
        );
        assert!(resolve_network("moonnet", None).is_err());
    }

    #[test]
    fn test_payment_then_hash_agree() {
        let network_id = Network::Testnet.id();
        let built = run(
            Commands::Payment {
                source: AccountId([1; 32]).to_strkey(),
                destination: AccountId([2; 32]).to_strkey(),
                amount: "1".into(),
                asset: "native".into(),
                sequence: 2,
                fee: Some(100),
                memo_text: None,
                memo_id: None,
                timeout: None,
                envelope_version: "v1".into(),
            },
            network_id,
        )
        .unwrap();
        assert_eq!(
            built["hash"],
            "27e3ad86f491835f31476debed7e2a7fb7db748f80763daafbc90e12aa9d891f"
        );

        let envelope = built["envelope"].as_str().unwrap().to_string();
        let hashed = run(Commands::Hash { envelope }, network_id).unwrap();
        assert_eq!(hashed["hash"], built["hash"]);
        assert_eq!(hashed["operations"], 1);
        assert_eq!(hashed["signatures"], 0);
    }

    #[test]
    fn test_payment_timeout_out_of_range() {
        let payment = |timeout| Commands::Payment {
            source: AccountId([1; 32]).to_strkey(),
            destination: AccountId([2; 32]).to_strkey(),
            amount: "1".into(),
            asset: "native".into(),
            sequence: 2,
            fee: None,
            memo_text: None,
            memo_id: None,
            timeout: Some(timeout),
            envelope_version: "v1".into(),
        };
        assert!(run(payment(i64::MAX), Network::Testnet.id()).is_err());
        assert!(run(payment(0), Network::Testnet.id()).is_err());
        assert!(run(payment(300), Network::Testnet.id()).is_ok());
    }

    #[test]
    fn test_attach_rejects_wrong_expected_hash() {
        let network_id = Network::Testnet.id();
        let tx = TransactionBuilder::new(AccountId([1; 32]).into(), 2, network_id)
            .operation(Operation::payment(AccountId([2; 32]).into(), Asset::Native, 1))
            .build()
            .unwrap();
        let result = run(
            Commands::Attach {
                envelope: hex::encode(tx.to_canonical_bytes()),
                signatures: vec![],
                expected_hash: Some("00".repeat(32)),
                verify: false,
            },
            network_id,
        );
        assert!(result.is_err());
    }
}
