//! Envelope encoding, decoding and transaction hashing.
//!
//! Two envelope layouts are supported: the legacy V0 form, whose source is
//! a bare ed25519 key and whose only precondition is optional time bounds,
//! and the current V1 form. Fee-bump envelopes are rejected.
//!
//! The signing hash is always computed over the V1 form of the body. A V0
//! transaction is re-expressed as V1 before hashing, which is what makes
//! signatures portable between the two layouts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builder::Transaction;
use super::operation::{Operation, OperationBody};
use super::soroban::SorobanTransactionData;
use super::types::{ClaimableBalanceId, Memo, Preconditions, TimeBounds};
use crate::address::MuxedAccount;
use crate::config::{
    NetworkId, ENVELOPE_TYPE_OP_ID, ENVELOPE_TYPE_TX, ENVELOPE_TYPE_TX_FEE_BUMP,
    ENVELOPE_TYPE_TX_V0, MAX_OPERATIONS, MAX_SIGNATURES, SIGNATURE_LENGTH,
};
use crate::crypto::{sha256_array, sha256_concat};
use crate::error::{Error, Result};
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

/// Layout of an envelope on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeVersion {
    V0,
    #[default]
    V1,
}

impl EnvelopeVersion {
    /// XDR `EnvelopeType` discriminant.
    pub fn discriminant(self) -> i32 {
        match self {
            EnvelopeVersion::V0 => ENVELOPE_TYPE_TX_V0,
            EnvelopeVersion::V1 => ENVELOPE_TYPE_TX,
        }
    }

    pub fn from_discriminant(value: i32) -> Result<Self> {
        match value {
            ENVELOPE_TYPE_TX_V0 => Ok(EnvelopeVersion::V0),
            ENVELOPE_TYPE_TX => Ok(EnvelopeVersion::V1),
            other => Err(Error::UnsupportedEnvelopeVersion(other)),
        }
    }
}

impl fmt::Display for EnvelopeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeVersion::V0 => write!(f, "v0"),
            EnvelopeVersion::V1 => write!(f, "v1"),
        }
    }
}

impl FromStr for EnvelopeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v0" | "0" => Ok(EnvelopeVersion::V0),
            "v1" | "1" => Ok(EnvelopeVersion::V1),
            other => Err(Error::InvalidValue(format!("unknown envelope version: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Decorated signatures
// ---------------------------------------------------------------------------

/// A signature as carried by an envelope: the signer's hint plus the raw
/// signature bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecoratedSignature {
    pub hint: [u8; 4],
    pub signature: Vec<u8>,
}

impl XdrCodec for DecoratedSignature {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(&self.hint);
        w.write_var_opaque(&self.signature);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            hint: r.read_fixed::<4>()?,
            signature: r.read_var_opaque(SIGNATURE_LENGTH, "Signature")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Body encoding
// ---------------------------------------------------------------------------

fn encode_v0_body(tx: &Transaction, w: &mut XdrWriter) {
    w.write_fixed_opaque(tx.source.ed25519());
    w.write_u32(tx.fee);
    w.write_i64(tx.sequence);
    w.write_option(tx.preconditions.time_bounds());
    tx.memo.encode(w);
    w.write_array(&tx.operations);
    w.write_i32(0);
}

fn encode_v1_body(tx: &Transaction, w: &mut XdrWriter) {
    tx.source.encode(w);
    w.write_u32(tx.fee);
    w.write_i64(tx.sequence);
    tx.preconditions.encode(w);
    tx.memo.encode(w);
    w.write_array(&tx.operations);
    match &tx.soroban_data {
        None => w.write_i32(0),
        Some(data) => {
            w.write_i32(1);
            data.encode(w);
        }
    }
}

fn encode_envelope(tx: &Transaction, signatures: &[DecoratedSignature], w: &mut XdrWriter) {
    w.write_i32(tx.envelope_version.discriminant());
    match tx.envelope_version {
        EnvelopeVersion::V0 => encode_v0_body(tx, w),
        EnvelopeVersion::V1 => encode_v1_body(tx, w),
    }
    w.write_array(signatures);
}

fn decode_v0_body(r: &mut XdrReader<'_>, network_id: NetworkId) -> Result<Transaction> {
    let source = MuxedAccount::Ed25519(r.read_fixed::<32>()?);
    let fee = r.read_u32()?;
    let sequence = r.read_i64()?;
    let preconditions = match r.read_option::<TimeBounds>()? {
        Some(tb) => Preconditions::Time(tb),
        None => Preconditions::None,
    };
    let memo = Memo::decode(r)?;
    let operations: Vec<Operation> = r.read_array(MAX_OPERATIONS, "operations")?;
    match r.read_i32()? {
        0 => {}
        value => {
            return Err(XdrError::InvalidDiscriminant {
                type_name: "TransactionV0Ext",
                value,
            }
            .into())
        }
    }

    Transaction {
        source,
        fee,
        sequence,
        operations,
        memo,
        preconditions,
        soroban_data: None,
        network_id,
        envelope_version: EnvelopeVersion::V0,
    }
    .validate()
}

fn decode_v1_body(r: &mut XdrReader<'_>, network_id: NetworkId) -> Result<Transaction> {
    let source = MuxedAccount::decode(r)?;
    let fee = r.read_u32()?;
    let sequence = r.read_i64()?;
    let preconditions = Preconditions::decode(r)?;
    let memo = Memo::decode(r)?;
    let operations: Vec<Operation> = r.read_array(MAX_OPERATIONS, "operations")?;
    let soroban_data = match r.read_i32()? {
        0 => None,
        1 => Some(SorobanTransactionData::decode(r)?),
        value => {
            return Err(XdrError::InvalidDiscriminant {
                type_name: "TransactionExt",
                value,
            }
            .into())
        }
    };

    Transaction {
        source,
        fee,
        sequence,
        operations,
        memo,
        preconditions,
        soroban_data,
        network_id,
        envelope_version: EnvelopeVersion::V1,
    }
    .validate()
}

// ---------------------------------------------------------------------------
// TransactionEnvelope
// ---------------------------------------------------------------------------

/// A transaction together with the signatures collected for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub tx: Transaction,
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    /// An envelope with no signatures yet.
    pub fn unsigned(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn encode(&self, w: &mut XdrWriter) {
        encode_envelope(&self.tx, &self.signatures, w);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();
        self.encode(&mut w);
        w.into_bytes()
    }

    pub fn to_base64(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(self.to_bytes())
    }

    /// Decodes a V0 or V1 envelope. The network id is not on the wire and
    /// must be supplied by the caller.
    pub fn decode(bytes: &[u8], network_id: NetworkId) -> Result<Self> {
        let mut r = XdrReader::new(bytes);
        let discriminant = r.read_i32()?;
        if discriminant == ENVELOPE_TYPE_TX_FEE_BUMP {
            debug!("fee-bump envelopes are not supported");
        }
        let tx = match EnvelopeVersion::from_discriminant(discriminant)? {
            EnvelopeVersion::V0 => decode_v0_body(&mut r, network_id)?,
            EnvelopeVersion::V1 => decode_v1_body(&mut r, network_id)?,
        };
        let signatures = r.read_array(MAX_SIGNATURES, "signatures")?;
        r.finish()?;

        debug!(
            version = %tx.envelope_version,
            operations = tx.operations.len(),
            signatures = signatures.len(),
            "decoded transaction envelope"
        );
        Ok(Self { tx, signatures })
    }

    pub fn from_base64(s: &str, network_id: NetworkId) -> Result<Self> {
        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(s.trim())
            .map_err(|e| XdrError::InvalidBase64(e.to_string()))?;
        Self::decode(&bytes, network_id)
    }
}

// ---------------------------------------------------------------------------
// Hashing and canonical bytes
// ---------------------------------------------------------------------------

impl Transaction {
    /// Fails unless the canonical bytes decode back to this transaction.
    /// Every bounded field is checked by the same code that reads it.
    pub(super) fn check_decodable(&self) -> Result<()> {
        match Transaction::decode(&self.to_canonical_bytes(), self.network_id) {
            Ok(decoded) if decoded == *self => Ok(()),
            Ok(_) => Err(Error::InvalidValue(
                "transaction does not survive re-encoding".to_string(),
            )),
            Err(Error::Decode(e)) => Err(Error::WireLimitExceeded(e)),
            Err(e) => Err(e),
        }
    }

    /// The unsigned envelope in this transaction's own layout.
    ///
    /// Deterministic: the same transaction always yields the same bytes.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut w = XdrWriter::with_capacity(256);
        encode_envelope(self, &[], &mut w);
        w.into_bytes()
    }

    /// The signature payload: network id, the `ENVELOPE_TYPE_TX` tag, and
    /// the V1 form of the body.
    pub fn signature_base(&self) -> Vec<u8> {
        let mut w = XdrWriter::with_capacity(256);
        w.write_fixed_opaque(self.network_id.as_bytes());
        w.write_i32(ENVELOPE_TYPE_TX);
        // V0 sources and time bounds map onto the V1 layout unchanged.
        encode_v1_body(self, &mut w);
        w.into_bytes()
    }

    /// SHA-256 of the signature payload. This is what signers sign.
    pub fn signing_hash(&self) -> [u8; 32] {
        sha256_array(&self.signature_base())
    }

    /// The signing hash as lowercase hex, the transaction's identifier.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.signing_hash())
    }

    /// Decodes an envelope and returns its transaction, discarding any
    /// signatures it carries.
    pub fn decode(bytes: &[u8], network_id: NetworkId) -> Result<Self> {
        Ok(TransactionEnvelope::decode(bytes, network_id)?.tx)
    }

    /// The id of the claimable balance created by the operation at
    /// `op_index`, known before submission.
    pub fn derive_dependent_id(&self, op_index: usize) -> Result<ClaimableBalanceId> {
        let op = self
            .operations
            .get(op_index)
            .ok_or(Error::OperationIndexOutOfRange {
                index: op_index,
                len: self.operations.len(),
            })?;
        if !matches!(op.body, OperationBody::CreateClaimableBalance { .. }) {
            return Err(Error::NotClaimableBalanceOperation(op_index));
        }

        let index = u32::try_from(op_index).map_err(|_| Error::OperationIndexOutOfRange {
            index: op_index,
            len: self.operations.len(),
        })?;
        let source = self.source.account_id().to_xdr();
        let preimage: [&[u8]; 4] = [
            &ENVELOPE_TYPE_OP_ID.to_be_bytes(),
            &source,
            &self.sequence.to_be_bytes(),
            &index.to_be_bytes(),
        ];
        let hash = sha256_concat(&preimage);
        Ok(ClaimableBalanceId(hash))
    }
}
