//! # Collaborator Interfaces
//!
//! The core never talks to the network itself. Ledger reads, fee
//! statistics, transaction preparation and broadcast are performed by
//! external collaborators behind the traits below; this module holds the
//! orchestration the core performs around them.
//!
//! ```text
//! balances.rs : balance batches, contract storage, on-chain address checks
//! fees.rs     : fee suggestion from fee statistics, contract fee estimation
//! broadcast.rs: submission with a recomputed-hash check, lookups
//! receipt.rs  : lookup responses decoded into fee, result and payments
//! ```
//!
//! Collaborator errors are passed through unmodified as
//! [`RpcError::Collaborator`]. Nothing here retries.

mod balances;
mod broadcast;
mod fees;
mod receipt;

pub use balances::{fetch_balances, fetch_contract_data, verify_address_on_chain};
pub use broadcast::{fetch_receipt, submit, transaction_status};
pub use fees::{estimate_soroban_fee, suggest_fee, FeeSuggestion};
pub use receipt::{
    PaymentSummary, TransactionOutcome, TransactionReceipt, TransactionResponse, TransactionResultCode,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error;
use crate::ledger::LedgerKey;
use crate::transaction::Transaction;

/// Failure of an orchestrated call: either the collaborator failed, or
/// what it returned was rejected by the core.
#[derive(Debug, Error)]
pub enum RpcError<E: std::error::Error + 'static> {
    #[error("collaborator error: {0}")]
    Collaborator(#[source] E),

    #[error(transparent)]
    Core(#[from] error::Error),
}

// ---------------------------------------------------------------------------
// Ledger reader
// ---------------------------------------------------------------------------

/// One ledger entry returned by a reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResult {
    /// Base64 XDR of the `LedgerKey`.
    pub key: String,
    /// Base64 XDR of the `LedgerEntryData`.
    pub xdr: String,
    pub last_modified_ledger: u32,
}

/// Current state of an account as reported by a reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_id: String,
    pub sequence: i64,
}

/// Reads raw ledger state.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Entries for the given keys. Keys with no entry are simply absent
    /// from the result.
    async fn get_ledger_entries(
        &self,
        keys: &[LedgerKey],
    ) -> Result<Vec<LedgerEntryResult>, Self::Error>;

    async fn get_account(&self, address: &str) -> Result<AccountInfo, Self::Error>;
}

// ---------------------------------------------------------------------------
// Fee oracle
// ---------------------------------------------------------------------------

/// Distribution of recent inclusion fees, in stroops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    pub min: u64,
    pub max: u64,
    pub mode: u64,
    pub p10: u64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

impl FeeDistribution {
    /// The fee this core suggests for the category: `max(p50, mode)`.
    pub fn suggested(&self) -> u64 {
        self.p50.max(self.mode)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStats {
    pub inclusion_fee: FeeDistribution,
    pub soroban_inclusion_fee: FeeDistribution,
    pub latest_ledger: u32,
}

/// Fee statistics and contract-transaction preparation.
#[async_trait]
pub trait FeeOracle: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn get_fee_stats(&self) -> Result<FeeStats, Self::Error>;

    /// Simulates a contract transaction and returns it with resource data
    /// attached and its fee raised to cover resources.
    async fn prepare_transaction(&self, tx: &Transaction) -> Result<Transaction, Self::Error>;
}

// ---------------------------------------------------------------------------
// Broadcaster
// ---------------------------------------------------------------------------

/// Status of a submitted transaction, by hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    NotFound,
    Success,
    Failed,
}

/// Submits envelopes and looks them up afterwards.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submits a base64 envelope and returns the hash the network assigned.
    async fn send_transaction(&self, envelope_base64: &str) -> Result<String, Self::Error>;

    /// Looks a transaction up by hash. An unknown hash is a `NOT_FOUND`
    /// response, not an error.
    async fn get_transaction(&self, hash_hex: &str) -> Result<TransactionResponse, Self::Error>;
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-memory collaborators.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::xdr::XdrCodec;

    #[derive(Debug, Error)]
    #[error("fake collaborator failure: {0}")]
    pub(crate) struct FakeError(pub String);

    /// Ledger keyed by base64 key XDR.
    #[derive(Default)]
    pub(crate) struct FakeLedger {
        pub entries: HashMap<String, Vec<u8>>,
        pub fail: bool,
        pub reads: Mutex<usize>,
    }

    impl FakeLedger {
        pub fn insert(&mut self, key: &LedgerKey, entry: Vec<u8>) {
            self.entries.insert(key.to_xdr_base64(), entry);
        }

        pub fn reads(&self) -> usize {
            *self.reads.lock().unwrap()
        }
    }

    #[async_trait]
    impl LedgerReader for FakeLedger {
        type Error = FakeError;

        async fn get_ledger_entries(
            &self,
            keys: &[LedgerKey],
        ) -> Result<Vec<LedgerEntryResult>, FakeError> {
            *self.reads.lock().unwrap() += 1;
            if self.fail {
                return Err(FakeError("ledger unavailable".to_string()));
            }
            Ok(keys
                .iter()
                .filter_map(|key| {
                    let key = key.to_xdr_base64();
                    self.entries.get(&key).map(|entry| LedgerEntryResult {
                        key,
                        xdr: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, entry),
                        last_modified_ledger: 1,
                    })
                })
                .collect())
        }

        async fn get_account(&self, address: &str) -> Result<AccountInfo, FakeError> {
            Err(FakeError(format!("account {address} not found")))
        }
    }

    pub(crate) struct FakeOracle {
        pub stats: FeeStats,
        /// Resource fee added by prepare.
        pub resource_fee: i64,
    }

    #[async_trait]
    impl FeeOracle for FakeOracle {
        type Error = FakeError;

        async fn get_fee_stats(&self) -> Result<FeeStats, FakeError> {
            Ok(self.stats)
        }

        async fn prepare_transaction(&self, tx: &Transaction) -> Result<Transaction, FakeError> {
            let data = crate::transaction::soroban::SorobanTransactionData {
                resource_fee: self.resource_fee,
                ..Default::default()
            };
            let fee = tx.fee() + self.resource_fee as u32;
            tx.to_builder()
                .fee(fee)
                .soroban_data(data)
                .build()
                .map_err(|e| FakeError(e.to_string()))
        }
    }

    /// Broadcaster that reports either the real hash or a fixed one.
    pub(crate) struct FakeBroadcaster {
        pub network_id: crate::config::NetworkId,
        pub reported_hash: Option<String>,
        pub submitted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Broadcaster for FakeBroadcaster {
        type Error = FakeError;

        async fn send_transaction(&self, envelope_base64: &str) -> Result<String, FakeError> {
            self.submitted.lock().unwrap().push(envelope_base64.to_string());
            if let Some(hash) = &self.reported_hash {
                return Ok(hash.clone());
            }
            let envelope = crate::transaction::TransactionEnvelope::from_base64(envelope_base64, self.network_id)
                .map_err(|e| FakeError(e.to_string()))?;
            Ok(envelope.tx.hash_hex())
        }

        async fn get_transaction(&self, hash_hex: &str) -> Result<TransactionResponse, FakeError> {
            let submitted = self.submitted.lock().unwrap();
            let found = submitted.iter().find_map(|env| {
                crate::transaction::TransactionEnvelope::from_base64(env, self.network_id)
                    .ok()
                    .filter(|e| e.tx.hash_hex() == hash_hex)
                    .map(|e| (env.clone(), e.tx.fee()))
            });
            let Some((envelope_xdr, fee)) = found else {
                return Ok(TransactionResponse::not_found(hash_hex, 10));
            };

            // Fee, txSUCCESS, no operation results, empty extension.
            let mut w = crate::xdr::XdrWriter::new();
            w.write_i64(i64::from(fee));
            w.write_i32(0);
            w.write_u32(0);
            w.write_i32(0);
            Ok(TransactionResponse {
                status: TransactionStatus::Success,
                tx_hash: hash_hex.to_string(),
                latest_ledger: 10,
                ledger: Some(9),
                created_at: Some(1_700_000_000),
                application_order: Some(1),
                fee_bump: false,
                envelope_xdr: Some(envelope_xdr),
                result_xdr: Some(base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    w.into_bytes(),
                )),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_fee_is_max_of_median_and_mode() {
        let dist = FeeDistribution {
            p50: 120,
            mode: 100,
            ..Default::default()
        };
        assert_eq!(dist.suggested(), 120);
        let dist = FeeDistribution {
            p50: 100,
            mode: 250,
            ..Default::default()
        };
        assert_eq!(dist.suggested(), 250);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::NotFound).unwrap(),
            "\"NOT_FOUND\""
        );
    }
}
