//! Command-line interface definition using clap derive.

use clap::{Parser, Subcommand};

/// Stellar Custody: offline signing-core operator tool.
///
/// Builds, hashes and reassembles transactions without ever touching a
/// private key. Every command reads its input from arguments and writes
/// the result to stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "stellar-custody",
    about = "Stellar Custody: offline transaction signing core",
    version,
    propagate_version = true
)]
pub struct CustodyCli {
    /// Named network: public, testnet or futurenet.
    #[arg(long, global = true, default_value = "testnet", env = "STELLAR_NETWORK")]
    pub network: String,

    /// Explicit network passphrase. Overrides `--network`.
    #[arg(long, global = true, env = "STELLAR_NETWORK_PASSPHRASE")]
    pub network_passphrase: Option<String>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log output format: pretty or json.
    #[arg(long, global = true, default_value = "pretty", env = "STELLAR_CUSTODY_LOG_FORMAT")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive the account and contract addresses of a raw ed25519 key.
    Derive {
        /// 64 hex characters, optionally 0x-prefixed.
        public_key: String,
    },

    /// Classify an address string by format.
    Validate { address: String },

    /// Print the deterministic contract id of an asset.
    ContractId {
        /// `native` or `CODE:ISSUER`.
        asset: String,
    },

    /// Build an unsigned single-payment transaction.
    Payment {
        /// Source account (G... or M...).
        #[arg(long)]
        source: String,

        /// Destination account (G... or M...).
        #[arg(long)]
        destination: String,

        /// Decimal amount, up to seven fractional digits.
        #[arg(long)]
        amount: String,

        /// `native` or `CODE:ISSUER`.
        #[arg(long, default_value = "native")]
        asset: String,

        /// Sequence number the transaction will consume.
        #[arg(long)]
        sequence: i64,

        /// Total fee in stroops. Defaults to the base fee.
        #[arg(long)]
        fee: Option<u32>,

        /// Text memo, at most 28 bytes.
        #[arg(long, conflicts_with = "memo_id")]
        memo_text: Option<String>,

        /// Numeric memo.
        #[arg(long)]
        memo_id: Option<u64>,

        /// Seconds from now after which the transaction is invalid.
        #[arg(long)]
        timeout: Option<i64>,

        /// Envelope version to emit: v0 or v1.
        #[arg(long, default_value = "v1")]
        envelope_version: String,
    },

    /// Print the signing hash and summary of an envelope.
    Hash {
        /// Envelope XDR, base64 or hex.
        envelope: String,
    },

    /// Produce one signing request per signer.
    Prepare {
        /// Envelope XDR, base64 or hex.
        envelope: String,

        /// Signer address; repeat for each signer.
        #[arg(long = "signer", required = true)]
        signers: Vec<String>,
    },

    /// Attach raw signatures and print the broadcast-ready envelope.
    Attach {
        /// Envelope XDR, base64 or hex.
        envelope: String,

        /// `PUBLIC_KEY_HEX:SIGNATURE_HEX`; repeat for each signer.
        #[arg(long = "signature")]
        signatures: Vec<String>,

        /// Fail unless the assembled envelope hashes to this value.
        #[arg(long)]
        expected_hash: Option<String>,

        /// Verify each signature against the signing hash before attaching.
        #[arg(long)]
        verify: bool,
    },

    /// Decode a base64 ledger entry into a balance.
    DecodeEntry {
        /// LedgerEntryData XDR, base64.
        xdr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        CustodyCli::command().debug_assert();
    }

    #[test]
    fn test_repeated_signers() {
        let cli = CustodyCli::parse_from([
            "stellar-custody",
            "prepare",
            "AAAA",
            "--signer",
            "GA",
            "--signer",
            "GB",
        ]);
        match cli.command {
            Commands::Prepare { signers, .. } => assert_eq!(signers, vec!["GA", "GB"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_memo_kinds_conflict() {
        let result = CustodyCli::try_parse_from([
            "stellar-custody",
            "payment",
            "--source",
            "GA",
            "--destination",
            "GB",
            "--amount",
            "1",
            "--sequence",
            "1",
            "--memo-text",
            "x",
            "--memo-id",
            "2",
        ]);
        assert!(result.is_err());
    }
}
