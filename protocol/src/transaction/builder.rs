//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow:
//! set the required fields, call `.build()`, and get back an immutable
//! [`Transaction`] that is guaranteed to be encodable under its envelope
//! version.
//!
//! The builder does not sign and never sees key material. Encoding and
//! hashing live in [`super::envelope`].

use tracing::debug;

use super::envelope::EnvelopeVersion;
use super::operation::Operation;
use super::soroban::SorobanTransactionData;
use super::types::{Memo, Preconditions, TimeBounds};
use crate::address::MuxedAccount;
use crate::config::{NetworkId, BASE_FEE, MAX_OPERATIONS};
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A network transaction.
///
/// Immutable once built: every field is private and the only way to obtain
/// a `Transaction` is through [`TransactionBuilder::build`] or by decoding
/// an envelope, both of which validate it. The model is version-agnostic;
/// the envelope version only selects the byte layout produced on demand.
///
/// Signatures are not part of a `Transaction`. They live on the envelope,
/// which is why the signing hash can never depend on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub(super) source: MuxedAccount,
    pub(super) fee: u32,
    pub(super) sequence: i64,
    pub(super) operations: Vec<Operation>,
    pub(super) memo: Memo,
    pub(super) preconditions: Preconditions,
    pub(super) soroban_data: Option<SorobanTransactionData>,
    pub(super) network_id: NetworkId,
    pub(super) envelope_version: EnvelopeVersion,
}

impl Transaction {
    /// Checks the invariants every transaction must satisfy.
    pub(super) fn validate(self) -> Result<Self> {
        if self.operations.is_empty() {
            return Err(Error::EmptyOperations);
        }
        if self.operations.len() > MAX_OPERATIONS {
            return Err(Error::TooManyOperations {
                count: self.operations.len(),
                max: MAX_OPERATIONS,
            });
        }
        self.memo.check()?;
        if self.envelope_version == EnvelopeVersion::V0 {
            if self.source.is_muxed() {
                return Err(Error::IncompatibleWithV0("muxed source account"));
            }
            if !self.preconditions.is_v0_compatible() {
                return Err(Error::IncompatibleWithV0("v2 preconditions"));
            }
            if self.soroban_data.is_some() {
                return Err(Error::IncompatibleWithV0("soroban transaction data"));
            }
        }
        Ok(self)
    }

    pub fn source(&self) -> &MuxedAccount {
        &self.source
    }

    /// Total fee the source is willing to pay, in stroops.
    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn preconditions(&self) -> &Preconditions {
        &self.preconditions
    }

    pub fn time_bounds(&self) -> Option<&TimeBounds> {
        self.preconditions.time_bounds()
    }

    pub fn soroban_data(&self) -> Option<&SorobanTransactionData> {
        self.soroban_data.as_ref()
    }

    pub fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    pub fn envelope_version(&self) -> EnvelopeVersion {
        self.envelope_version
    }

    /// A contract transaction: exactly one invoke, extend-ttl or restore
    /// operation.
    pub fn is_soroban(&self) -> bool {
        self.operations.len() == 1 && self.operations[0].body.is_soroban()
    }

    /// A builder pre-filled with this transaction's fields, for producing a
    /// variant (new fee, prepared resource data, ...).
    pub fn to_builder(&self) -> TransactionBuilder {
        TransactionBuilder {
            source: self.source,
            fee: Some(self.fee),
            sequence: self.sequence,
            operations: self.operations.clone(),
            memo: self.memo.clone(),
            preconditions: self.preconditions.clone(),
            soroban_data: self.soroban_data.clone(),
            network_id: self.network_id,
            envelope_version: self.envelope_version,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`].
///
/// # Example
///
/// ```
/// use stellar_custody::address::AccountId;
/// use stellar_custody::asset::Asset;
/// use stellar_custody::config::Network;
/// use stellar_custody::transaction::{Operation, TransactionBuilder};
///
/// let source = AccountId([1; 32]);
/// let tx = TransactionBuilder::new(source.into(), 42, Network::Testnet.id())
///     .operation(Operation::payment(AccountId([2; 32]).into(), Asset::Native, 10_000_000))
///     .build()
///     .unwrap();
/// assert_eq!(tx.fee(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source: MuxedAccount,
    fee: Option<u32>,
    sequence: i64,
    operations: Vec<Operation>,
    memo: Memo,
    preconditions: Preconditions,
    soroban_data: Option<SorobanTransactionData>,
    network_id: NetworkId,
    envelope_version: EnvelopeVersion,
}

impl TransactionBuilder {
    /// Creates a builder for a transaction from `source` using sequence
    /// number `sequence` (the account's current sequence plus one).
    ///
    /// Defaults:
    /// - `fee`: base fee times the number of operations
    /// - `memo`: none
    /// - `preconditions`: none
    /// - `envelope_version`: V1
    pub fn new(source: MuxedAccount, sequence: i64, network_id: NetworkId) -> Self {
        Self {
            source,
            fee: None,
            sequence,
            operations: Vec::new(),
            memo: Memo::None,
            preconditions: Preconditions::None,
            soroban_data: None,
            network_id,
            envelope_version: EnvelopeVersion::V1,
        }
    }

    /// Sets the total fee in stroops.
    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Appends one operation.
    pub fn operation(mut self, op: impl Into<Operation>) -> Self {
        self.operations.push(op.into());
        self
    }

    /// Appends several operations in order.
    pub fn operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    /// Shorthand for time-bound-only preconditions.
    pub fn time_bounds(mut self, time_bounds: TimeBounds) -> Self {
        self.preconditions = Preconditions::Time(time_bounds);
        self
    }

    pub fn preconditions(mut self, preconditions: Preconditions) -> Self {
        self.preconditions = preconditions;
        self
    }

    /// Attaches contract resource data (V1 extension).
    pub fn soroban_data(mut self, data: SorobanTransactionData) -> Self {
        self.soroban_data = Some(data);
        self
    }

    pub fn network_id(mut self, network_id: NetworkId) -> Self {
        self.network_id = network_id;
        self
    }

    pub fn envelope_version(mut self, version: EnvelopeVersion) -> Self {
        self.envelope_version = version;
        self
    }

    /// Consumes the builder and produces a validated [`Transaction`].
    ///
    /// Fails with [`Error::EmptyOperations`], [`Error::TooManyOperations`],
    /// [`Error::MemoTooLong`], [`Error::IncompatibleWithV0`] when a V0
    /// envelope is requested for a transaction it cannot express, or
    /// [`Error::WireLimitExceeded`] when a bounded field (path, claimants,
    /// symbol, ...) is longer than the network accepts.
    pub fn build(self) -> Result<Transaction> {
        let fee = self.fee.unwrap_or_else(|| {
            let ops = u32::try_from(self.operations.len()).unwrap_or(u32::MAX);
            BASE_FEE.saturating_mul(ops.max(1))
        });

        let tx = Transaction {
            source: self.source,
            fee,
            sequence: self.sequence,
            operations: self.operations,
            memo: self.memo,
            preconditions: self.preconditions,
            soroban_data: self.soroban_data,
            network_id: self.network_id,
            envelope_version: self.envelope_version,
        }
        .validate()?;
        tx.check_decodable()?;

        debug!(
            source = %tx.source,
            sequence = tx.sequence,
            operations = tx.operations.len(),
            version = %tx.envelope_version,
            "built transaction"
        );
        Ok(tx)
    }
}
