//! Value types shared by transactions and operations.
//!
//! These types form the vocabulary of the transaction body: memos,
//! preconditions, signer keys, prices and claim predicates. Each is a plain
//! value with its XDR layout implemented next to it.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::address::AccountId;
use crate::config::{MAX_EXTRA_SIGNERS, MEMO_TEXT_MAX, SIGNED_PAYLOAD_MAX};
use crate::crypto::strkey::{self, Version};
use crate::error::{Error, Result};
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

fn invalid_discriminant(type_name: &'static str, value: i32) -> Error {
    XdrError::InvalidDiscriminant { type_name, value }.into()
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Free-form data attached to a transaction. Exchanges and custodians use
/// it to route deposits to internal accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Memo {
    #[default]
    None,
    /// Up to 28 bytes. Usually UTF-8 but the network does not require it.
    Text(Vec<u8>),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    /// A text memo, rejecting anything over 28 bytes.
    pub fn text(text: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = text.as_ref();
        if bytes.len() > MEMO_TEXT_MAX {
            return Err(Error::MemoTooLong {
                len: bytes.len(),
                max: MEMO_TEXT_MAX,
            });
        }
        Ok(Memo::Text(bytes.to_vec()))
    }

    pub fn id(id: u64) -> Self {
        Memo::Id(id)
    }

    /// Rejects text built directly through [`Memo::Text`] past 28 bytes.
    pub fn check(&self) -> Result<()> {
        match self {
            Memo::Text(bytes) if bytes.len() > MEMO_TEXT_MAX => Err(Error::MemoTooLong {
                len: bytes.len(),
                max: MEMO_TEXT_MAX,
            }),
            _ => Ok(()),
        }
    }

    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Memo::Text(bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }

    fn discriminant(&self) -> i32 {
        match self {
            Memo::None => 0,
            Memo::Text(_) => 1,
            Memo::Id(_) => 2,
            Memo::Hash(_) => 3,
            Memo::Return(_) => 4,
        }
    }
}

impl XdrCodec for Memo {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.discriminant());
        match self {
            Memo::None => {}
            Memo::Text(bytes) => w.write_var_opaque(bytes),
            Memo::Id(id) => w.write_u64(*id),
            Memo::Hash(hash) | Memo::Return(hash) => w.write_fixed_opaque(hash),
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(Memo::None),
            1 => Ok(Memo::Text(r.read_var_opaque(MEMO_TEXT_MAX, "MemoText")?)),
            2 => Ok(Memo::Id(r.read_u64()?)),
            3 => Ok(Memo::Hash(r.read_fixed::<32>()?)),
            4 => Ok(Memo::Return(r.read_fixed::<32>()?)),
            value => Err(invalid_discriminant("MemoType", value)),
        }
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Memo::None => write!(f, "none"),
            Memo::Text(bytes) => write!(f, "text:{}", String::from_utf8_lossy(bytes)),
            Memo::Id(id) => write!(f, "id:{id}"),
            Memo::Hash(hash) => write!(f, "hash:{}", hex::encode(hash)),
            Memo::Return(hash) => write!(f, "return:{}", hex::encode(hash)),
        }
    }
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

/// Validity window in unix seconds. `max_time == 0` means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    pub fn new(min_time: u64, max_time: u64) -> Self {
        Self { min_time, max_time }
    }

    /// Valid from now until `now + seconds`. `seconds` must be positive.
    pub fn expires_in(seconds: i64) -> Result<Self> {
        if seconds <= 0 {
            return Err(Error::InvalidValue(format!("timeout must be positive, got {seconds}")));
        }
        let deadline = Duration::try_seconds(seconds)
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| Error::InvalidValue(format!("timeout of {seconds}s is out of range")))?;
        Self::expires_at(deadline)
    }

    /// Valid from any time until `deadline`.
    ///
    /// A deadline at or before the unix epoch would encode as `max_time = 0`,
    /// which means "no upper bound", so it is rejected.
    pub fn expires_at(deadline: DateTime<Utc>) -> Result<Self> {
        match u64::try_from(deadline.timestamp()) {
            Ok(max_time) if max_time > 0 => Ok(Self {
                min_time: 0,
                max_time,
            }),
            _ => Err(Error::InvalidValue(format!(
                "deadline {deadline} is not after the unix epoch"
            ))),
        }
    }

    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        self.max_time != 0 && u64::try_from(at.timestamp()).unwrap_or(0) > self.max_time
    }
}

impl XdrCodec for TimeBounds {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_u64(self.min_time);
        w.write_u64(self.max_time);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            min_time: r.read_u64()?,
            max_time: r.read_u64()?,
        })
    }
}

/// Validity window in ledger numbers. `max_ledger == 0` means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerBounds {
    pub min_ledger: u32,
    pub max_ledger: u32,
}

impl XdrCodec for LedgerBounds {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_u32(self.min_ledger);
        w.write_u32(self.max_ledger);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            min_ledger: r.read_u32()?,
            max_ledger: r.read_u32()?,
        })
    }
}

/// The full precondition set introduced with V2 preconditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreconditionsV2 {
    pub time_bounds: Option<TimeBounds>,
    pub ledger_bounds: Option<LedgerBounds>,
    pub min_seq_num: Option<i64>,
    /// Seconds the source's sequence number must have been unchanged.
    pub min_seq_age: u64,
    /// Ledgers that must have closed since the source's sequence changed.
    pub min_seq_ledger_gap: u32,
    /// At most two additional required signers.
    pub extra_signers: Vec<SignerKey>,
}

impl XdrCodec for PreconditionsV2 {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_option(self.time_bounds.as_ref());
        w.write_option(self.ledger_bounds.as_ref());
        w.write_option(self.min_seq_num.as_ref());
        w.write_u64(self.min_seq_age);
        w.write_u32(self.min_seq_ledger_gap);
        w.write_array(&self.extra_signers);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            time_bounds: r.read_option()?,
            ledger_bounds: r.read_option()?,
            min_seq_num: r.read_option()?,
            min_seq_age: r.read_u64()?,
            min_seq_ledger_gap: r.read_u32()?,
            extra_signers: r.read_array(MAX_EXTRA_SIGNERS, "extraSigners")?,
        })
    }
}

/// Transaction preconditions, kept in the exact wire variant they were
/// built or decoded with so re-encoding is byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preconditions {
    #[default]
    None,
    Time(TimeBounds),
    V2(PreconditionsV2),
}

impl Preconditions {
    pub fn time_bounds(&self) -> Option<&TimeBounds> {
        match self {
            Preconditions::None => None,
            Preconditions::Time(tb) => Some(tb),
            Preconditions::V2(v2) => v2.time_bounds.as_ref(),
        }
    }

    /// Whether a legacy V0 envelope, which only knows time bounds, can
    /// carry these preconditions.
    pub fn is_v0_compatible(&self) -> bool {
        !matches!(self, Preconditions::V2(_))
    }
}

impl From<TimeBounds> for Preconditions {
    fn from(tb: TimeBounds) -> Self {
        Preconditions::Time(tb)
    }
}

impl XdrCodec for Preconditions {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            Preconditions::None => w.write_i32(0),
            Preconditions::Time(tb) => {
                w.write_i32(1);
                tb.encode(w);
            }
            Preconditions::V2(v2) => {
                w.write_i32(2);
                v2.encode(w);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(Preconditions::None),
            1 => Ok(Preconditions::Time(TimeBounds::decode(r)?)),
            2 => Ok(Preconditions::V2(PreconditionsV2::decode(r)?)),
            value => Err(invalid_discriminant("PreconditionType", value)),
        }
    }
}

// ---------------------------------------------------------------------------
// Signer keys
// ---------------------------------------------------------------------------

/// A key that can be added as an account signer or an extra signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignerKey {
    Ed25519([u8; 32]),
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
    Ed25519SignedPayload { ed25519: [u8; 32], payload: Vec<u8> },
}

impl SignerKey {
    pub fn to_strkey(&self) -> String {
        match self {
            SignerKey::Ed25519(key) => strkey::encode(Version::AccountId, key),
            SignerKey::PreAuthTx(hash) => strkey::encode(Version::PreAuthTx, hash),
            SignerKey::HashX(hash) => strkey::encode(Version::HashX, hash),
            SignerKey::Ed25519SignedPayload { ed25519, payload } => {
                let mut w = XdrWriter::new();
                w.write_fixed_opaque(ed25519);
                w.write_var_opaque(payload);
                strkey::encode(Version::SignedPayload, w.as_bytes())
            }
        }
    }
}

impl From<AccountId> for SignerKey {
    fn from(account: AccountId) -> Self {
        SignerKey::Ed25519(account.0)
    }
}

impl fmt::Display for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_strkey())
    }
}

impl XdrCodec for SignerKey {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            SignerKey::Ed25519(key) => {
                w.write_i32(0);
                w.write_fixed_opaque(key);
            }
            SignerKey::PreAuthTx(hash) => {
                w.write_i32(1);
                w.write_fixed_opaque(hash);
            }
            SignerKey::HashX(hash) => {
                w.write_i32(2);
                w.write_fixed_opaque(hash);
            }
            SignerKey::Ed25519SignedPayload { ed25519, payload } => {
                w.write_i32(3);
                w.write_fixed_opaque(ed25519);
                w.write_var_opaque(payload);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(SignerKey::Ed25519(r.read_fixed::<32>()?)),
            1 => Ok(SignerKey::PreAuthTx(r.read_fixed::<32>()?)),
            2 => Ok(SignerKey::HashX(r.read_fixed::<32>()?)),
            3 => Ok(SignerKey::Ed25519SignedPayload {
                ed25519: r.read_fixed::<32>()?,
                payload: r.read_var_opaque(SIGNED_PAYLOAD_MAX, "signedPayload")?,
            }),
            value => Err(invalid_discriminant("SignerKeyType", value)),
        }
    }
}

/// A weighted account signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signer {
    pub key: SignerKey,
    pub weight: u32,
}

impl XdrCodec for Signer {
    fn encode(&self, w: &mut XdrWriter) {
        self.key.encode(w);
        w.write_u32(self.weight);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            key: SignerKey::decode(r)?,
            weight: r.read_u32()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// An exact price as a fraction `n / d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    pub fn new(n: i32, d: i32) -> Result<Self> {
        if n <= 0 || d <= 0 {
            return Err(Error::InvalidValue(format!("price {n}/{d} must be positive")));
        }
        Ok(Self { n, d })
    }
}

impl XdrCodec for Price {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(self.n);
        w.write_i32(self.d);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self {
            n: r.read_i32()?,
            d: r.read_i32()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Claimable balances
// ---------------------------------------------------------------------------

/// Condition under which a claimant may claim a balance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimPredicate {
    Unconditional,
    And(Vec<ClaimPredicate>),
    Or(Vec<ClaimPredicate>),
    Not(Option<Box<ClaimPredicate>>),
    /// Claimable before this unix timestamp.
    BeforeAbsoluteTime(i64),
    /// Claimable for this many seconds after the balance is created.
    BeforeRelativeTime(i64),
}

impl XdrCodec for ClaimPredicate {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            ClaimPredicate::Unconditional => w.write_i32(0),
            ClaimPredicate::And(preds) => {
                w.write_i32(1);
                w.write_array(preds);
            }
            ClaimPredicate::Or(preds) => {
                w.write_i32(2);
                w.write_array(preds);
            }
            ClaimPredicate::Not(pred) => {
                w.write_i32(3);
                w.write_option(pred.as_ref());
            }
            ClaimPredicate::BeforeAbsoluteTime(t) => {
                w.write_i32(4);
                w.write_i64(*t);
            }
            ClaimPredicate::BeforeRelativeTime(t) => {
                w.write_i32(5);
                w.write_i64(*t);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(ClaimPredicate::Unconditional),
            kind @ (1 | 2) => {
                r.enter()?;
                let preds = r.read_array(2, "ClaimPredicate");
                r.leave();
                let preds = preds?;
                Ok(if kind == 1 {
                    ClaimPredicate::And(preds)
                } else {
                    ClaimPredicate::Or(preds)
                })
            }
            3 => Ok(ClaimPredicate::Not(r.read_option()?)),
            4 => Ok(ClaimPredicate::BeforeAbsoluteTime(r.read_i64()?)),
            5 => Ok(ClaimPredicate::BeforeRelativeTime(r.read_i64()?)),
            value => Err(invalid_discriminant("ClaimPredicateType", value)),
        }
    }
}

/// A party allowed to claim a claimable balance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claimant {
    pub destination: AccountId,
    pub predicate: ClaimPredicate,
}

impl XdrCodec for Claimant {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(0);
        self.destination.encode(w);
        self.predicate.encode(w);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(Self {
                destination: AccountId::decode(r)?,
                predicate: ClaimPredicate::decode(r)?,
            }),
            value => Err(invalid_discriminant("ClaimantType", value)),
        }
    }
}

/// Identifier of a claimable balance (version 0: a SHA-256 hash).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClaimableBalanceId(pub [u8; 32]);

impl ClaimableBalanceId {
    /// Hex of the full XDR, the form most APIs report.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_xdr())
    }

    pub fn to_strkey(&self) -> String {
        let mut payload = [0u8; 33];
        payload[1..].copy_from_slice(&self.0);
        strkey::encode(Version::ClaimableBalance, &payload)
    }
}

impl fmt::Display for ClaimableBalanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ClaimableBalanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimableBalanceId({})", self.to_hex())
    }
}

impl XdrCodec for ClaimableBalanceId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(0);
        w.write_fixed_opaque(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            0 => Ok(Self(r.read_fixed::<32>()?)),
            value => Err(invalid_discriminant("ClaimableBalanceIDType", value)),
        }
    }
}
