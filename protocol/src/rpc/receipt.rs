//! Receipts for submitted transactions.
//!
//! A transaction lookup comes back as raw XDR: the envelope that was
//! submitted and the `TransactionResult` the network produced for it.
//! [`TransactionReceipt::from_response`] reduces that to what custody
//! bookkeeping needs: the fee actually charged, the result code, the
//! source account and the payments made.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TransactionStatus;
use crate::asset::Asset;
use crate::config::NetworkId;
use crate::error::{Error, Result};
use crate::transaction::{OperationBody, TransactionEnvelope};
use crate::xdr::{XdrError, XdrReader};

// ---------------------------------------------------------------------------
// Lookup response
// ---------------------------------------------------------------------------

/// A transaction lookup as reported by a [`Broadcaster`](super::Broadcaster).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub status: TransactionStatus,
    pub tx_hash: String,
    #[serde(default)]
    pub latest_ledger: u32,
    /// Ledger the transaction was applied in.
    #[serde(default)]
    pub ledger: Option<u32>,
    /// Close time of that ledger, unix seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub application_order: Option<u32>,
    #[serde(default)]
    pub fee_bump: bool,
    /// Base64 `TransactionEnvelope`.
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    /// Base64 `TransactionResult`.
    #[serde(default)]
    pub result_xdr: Option<String>,
}

impl TransactionResponse {
    /// A lookup that found nothing.
    pub fn not_found(tx_hash: impl Into<String>, latest_ledger: u32) -> Self {
        Self {
            status: TransactionStatus::NotFound,
            tx_hash: tx_hash.into(),
            latest_ledger,
            ledger: None,
            created_at: None,
            application_order: None,
            fee_bump: false,
            envelope_xdr: None,
            result_xdr: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result code
// ---------------------------------------------------------------------------

/// `TransactionResultCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionResultCode {
    FeeBumpInnerSuccess,
    Success,
    Failed,
    TooEarly,
    TooLate,
    MissingOperation,
    BadSeq,
    BadAuth,
    InsufficientBalance,
    NoAccount,
    InsufficientFee,
    BadAuthExtra,
    InternalError,
    NotSupported,
    FeeBumpInnerFailed,
    BadSponsorship,
    BadMinSeqAgeOrGap,
    Malformed,
    SorobanInvalid,
}

impl TransactionResultCode {
    pub fn from_code(code: i32) -> Result<Self> {
        use TransactionResultCode::*;
        Ok(match code {
            1 => FeeBumpInnerSuccess,
            0 => Success,
            -1 => Failed,
            -2 => TooEarly,
            -3 => TooLate,
            -4 => MissingOperation,
            -5 => BadSeq,
            -6 => BadAuth,
            -7 => InsufficientBalance,
            -8 => NoAccount,
            -9 => InsufficientFee,
            -10 => BadAuthExtra,
            -11 => InternalError,
            -12 => NotSupported,
            -13 => FeeBumpInnerFailed,
            -14 => BadSponsorship,
            -15 => BadMinSeqAgeOrGap,
            -16 => Malformed,
            -17 => SorobanInvalid,
            value => {
                return Err(XdrError::InvalidDiscriminant {
                    type_name: "TransactionResultCode",
                    value,
                }
                .into())
            }
        })
    }

    pub fn code(&self) -> i32 {
        use TransactionResultCode::*;
        match self {
            FeeBumpInnerSuccess => 1,
            Success => 0,
            Failed => -1,
            TooEarly => -2,
            TooLate => -3,
            MissingOperation => -4,
            BadSeq => -5,
            BadAuth => -6,
            InsufficientBalance => -7,
            NoAccount => -8,
            InsufficientFee => -9,
            BadAuthExtra => -10,
            InternalError => -11,
            NotSupported => -12,
            FeeBumpInnerFailed => -13,
            BadSponsorship => -14,
            BadMinSeqAgeOrGap => -15,
            Malformed => -16,
            SorobanInvalid => -17,
        }
    }

    /// The network's name for the code, e.g. `txBAD_SEQ`.
    pub fn name(&self) -> &'static str {
        use TransactionResultCode::*;
        match self {
            FeeBumpInnerSuccess => "txFEE_BUMP_INNER_SUCCESS",
            Success => "txSUCCESS",
            Failed => "txFAILED",
            TooEarly => "txTOO_EARLY",
            TooLate => "txTOO_LATE",
            MissingOperation => "txMISSING_OPERATION",
            BadSeq => "txBAD_SEQ",
            BadAuth => "txBAD_AUTH",
            InsufficientBalance => "txINSUFFICIENT_BALANCE",
            NoAccount => "txNO_ACCOUNT",
            InsufficientFee => "txINSUFFICIENT_FEE",
            BadAuthExtra => "txBAD_AUTH_EXTRA",
            InternalError => "txINTERNAL_ERROR",
            NotSupported => "txNOT_SUPPORTED",
            FeeBumpInnerFailed => "txFEE_BUMP_INNER_FAILED",
            BadSponsorship => "txBAD_SPONSORSHIP",
            BadMinSeqAgeOrGap => "txBAD_MIN_SEQ_AGE_OR_GAP",
            Malformed => "txMALFORMED",
            SorobanInvalid => "txSOROBAN_INVALID",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TransactionResultCode::Success | TransactionResultCode::FeeBumpInnerSuccess
        )
    }
}

impl std::fmt::Display for TransactionResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The head of a `TransactionResult`: the fee charged and the result code.
///
/// Per-operation results follow on the wire; they are not interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    pub fee_charged: i64,
    pub code: TransactionResultCode,
}

impl TransactionOutcome {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = XdrReader::new(bytes);
        let fee_charged = r.read_i64()?;
        if fee_charged < 0 {
            return Err(Error::InvalidValue(format!(
                "negative fee charged: {fee_charged}"
            )));
        }
        let code = TransactionResultCode::from_code(r.read_i32()?)?;
        Ok(Self { fee_charged, code })
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(s.trim())
            .map_err(|e| XdrError::InvalidBase64(e.to_string()))?;
        Self::decode(&bytes)
    }
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

/// One payment operation of a looked-up transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    /// The operation's own source if it has one, else the transaction's.
    pub from: String,
    pub to: String,
    pub asset: Asset,
    /// Stroops.
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub hash: String,
    pub status: TransactionStatus,
    pub ledger: Option<u32>,
    pub created_at: Option<i64>,
    pub fee_charged: Option<i64>,
    pub result: Option<TransactionResultCode>,
    pub source: Option<String>,
    pub payments: Vec<PaymentSummary>,
}

impl TransactionReceipt {
    /// Decodes a lookup response.
    ///
    /// A `NOT_FOUND` response yields a receipt with only the hash and
    /// status. Otherwise both XDR blobs must be present, and the envelope
    /// must hash to the reported transaction hash.
    pub fn from_response(response: &TransactionResponse, network_id: NetworkId) -> Result<Self> {
        let mut receipt = Self {
            hash: response.tx_hash.clone(),
            status: response.status,
            ledger: response.ledger,
            created_at: response.created_at,
            fee_charged: None,
            result: None,
            source: None,
            payments: Vec::new(),
        };
        if response.status == TransactionStatus::NotFound {
            debug!(hash = %response.tx_hash, "transaction not found");
            return Ok(receipt);
        }

        let result_xdr = response
            .result_xdr
            .as_deref()
            .ok_or_else(|| Error::InvalidValue("transaction response has no resultXdr".to_string()))?;
        let envelope_xdr = response
            .envelope_xdr
            .as_deref()
            .ok_or_else(|| Error::InvalidValue("transaction response has no envelopeXdr".to_string()))?;

        let outcome = TransactionOutcome::from_base64(result_xdr)?;
        let envelope = TransactionEnvelope::from_base64(envelope_xdr, network_id)?;

        let computed = envelope.tx.hash_hex();
        if !computed.eq_ignore_ascii_case(&response.tx_hash) {
            warn!(reported = %response.tx_hash, computed = %computed, "envelope does not match reported hash");
            return Err(Error::HashMismatch {
                expected: response.tx_hash.clone(),
                computed,
            });
        }

        let source = *envelope.tx.source();
        receipt.payments = envelope
            .tx
            .operations()
            .iter()
            .filter_map(|op| match &op.body {
                OperationBody::Payment {
                    destination,
                    asset,
                    amount,
                } => Some(PaymentSummary {
                    from: op.source_account.unwrap_or(source).to_strkey(),
                    to: destination.to_strkey(),
                    asset: asset.clone(),
                    amount: *amount,
                }),
                _ => None,
            })
            .collect();
        receipt.fee_charged = Some(outcome.fee_charged);
        receipt.result = Some(outcome.code);
        receipt.source = Some(source.to_strkey());

        debug!(
            hash = %receipt.hash,
            result = %outcome.code,
            fee_charged = outcome.fee_charged,
            payments = receipt.payments.len(),
            "decoded transaction receipt"
        );
        Ok(receipt)
    }
}
