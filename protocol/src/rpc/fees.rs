//! Fee suggestion over a [`FeeOracle`].
//!
//! Policy is deliberately thin: each category's inclusion fee is
//! `max(p50, mode)` of recent fees. Contract transactions also need the
//! oracle's prepare step, because their resource fee is only known after
//! simulation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FeeOracle, RpcError};
use crate::error::Error;
use crate::transaction::Transaction;

/// Suggested fees, in stroops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSuggestion {
    /// Per-transaction inclusion fee for contract transactions.
    pub soroban_inclusion_fee: u64,
    /// Per-operation inclusion fee for classic transactions.
    pub inclusion_fee: u64,
    /// Total fee for the transaction in question.
    pub total_fee: u64,
}

/// Suggests fees for a classic transaction with `operation_count`
/// operations.
pub async fn suggest_fee<O>(
    oracle: &O,
    operation_count: usize,
) -> Result<FeeSuggestion, RpcError<O::Error>>
where
    O: FeeOracle + ?Sized,
{
    let stats = oracle.get_fee_stats().await.map_err(RpcError::Collaborator)?;
    let inclusion_fee = stats.inclusion_fee.suggested();
    let ops = u64::try_from(operation_count).unwrap_or(u64::MAX);

    let suggestion = FeeSuggestion {
        soroban_inclusion_fee: stats.soroban_inclusion_fee.suggested(),
        inclusion_fee,
        total_fee: inclusion_fee.saturating_mul(ops),
    };
    debug!(
        inclusion_fee,
        total_fee = suggestion.total_fee,
        latest_ledger = stats.latest_ledger,
        "suggested fee"
    );
    Ok(suggestion)
}

/// Estimates the fee of a contract transaction.
///
/// The transaction is re-priced at the contract inclusion fee and handed
/// to the oracle's prepare step; the prepared transaction, which carries
/// the resource data, is returned alongside the suggestion. Its fee is the
/// total.
pub async fn estimate_soroban_fee<O>(
    oracle: &O,
    tx: &Transaction,
) -> Result<(FeeSuggestion, Transaction), RpcError<O::Error>>
where
    O: FeeOracle + ?Sized,
{
    if !tx.is_soroban() {
        return Err(Error::NotSorobanTransaction.into());
    }

    let mut suggestion = suggest_fee(oracle, 1).await?;
    let inclusion = u32::try_from(suggestion.soroban_inclusion_fee).unwrap_or(u32::MAX);
    let probe = tx.to_builder().fee(inclusion).build()?;

    let prepared = oracle
        .prepare_transaction(&probe)
        .await
        .map_err(RpcError::Collaborator)?;
    suggestion.total_fee = u64::from(prepared.fee());

    debug!(
        inclusion_fee = inclusion,
        total_fee = suggestion.total_fee,
        "estimated contract transaction fee"
    );
    Ok((suggestion, prepared))
}
