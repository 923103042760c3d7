//! Typed account, muxed-account and contract identifiers.
//!
//! Each type is a thin wrapper over raw key bytes with its StrKey form as
//! `Display` / `FromStr` and its XDR form via [`XdrCodec`].
//!
//! ```text
//! AccountId     G...  XDR PublicKey    { i32 0; uint256 }
//! MuxedAccount  G/M.. XDR MuxedAccount { i32 0; uint256 } | { i32 0x100; u64 id; uint256 }
//! ContractId    C...  XDR Hash         uint256
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::strkey::{self, Version};
use crate::error::{Error, Result};
use crate::xdr::{XdrCodec, XdrError, XdrReader, XdrWriter};

const PUBLIC_KEY_TYPE_ED25519: i32 = 0;
const KEY_TYPE_ED25519: i32 = 0;
const KEY_TYPE_MUXED_ED25519: i32 = 0x100;

/// Implements string-based serde for a type with `Display` + `FromStr`.
macro_rules! strkey_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fn invalid(s: &str, e: impl fmt::Display) -> Error {
    Error::InvalidAddress(format!("{s}: {e}"))
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An ed25519 account public key (`G...`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_strkey(&self) -> String {
        strkey::encode(Version::AccountId, &self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_strkey())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_strkey())
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        strkey::decode_32(Version::AccountId, s)
            .map(Self)
            .map_err(|e| invalid(s, e))
    }
}

strkey_serde!(AccountId);

impl XdrCodec for AccountId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_i32(PUBLIC_KEY_TYPE_ED25519);
        w.write_fixed_opaque(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            PUBLIC_KEY_TYPE_ED25519 => Ok(Self(r.read_fixed::<32>()?)),
            value => Err(XdrError::InvalidDiscriminant {
                type_name: "PublicKey",
                value,
            }
            .into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MuxedAccount
// ---------------------------------------------------------------------------

/// A transaction or payment source/destination: a plain account, or an
/// account multiplexed with a 64-bit sub-identifier (`M...`).
///
/// Muxed accounts have no ledger record of their own; everything on-chain
/// happens to the underlying [`AccountId`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuxedAccount {
    Ed25519([u8; 32]),
    MuxedEd25519 { id: u64, ed25519: [u8; 32] },
}

impl MuxedAccount {
    /// The underlying key with any multiplexing id stripped.
    pub fn account_id(&self) -> AccountId {
        AccountId(*self.ed25519())
    }

    pub fn ed25519(&self) -> &[u8; 32] {
        match self {
            MuxedAccount::Ed25519(key) => key,
            MuxedAccount::MuxedEd25519 { ed25519, .. } => ed25519,
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            MuxedAccount::Ed25519(_) => None,
            MuxedAccount::MuxedEd25519 { id, .. } => Some(*id),
        }
    }

    pub fn is_muxed(&self) -> bool {
        matches!(self, MuxedAccount::MuxedEd25519 { .. })
    }

    pub fn to_strkey(&self) -> String {
        match self {
            MuxedAccount::Ed25519(key) => strkey::encode(Version::AccountId, key),
            MuxedAccount::MuxedEd25519 { id, ed25519 } => {
                // StrKey payload is key then id, the reverse of the XDR struct.
                let mut payload = [0u8; 40];
                payload[..32].copy_from_slice(ed25519);
                payload[32..].copy_from_slice(&id.to_be_bytes());
                strkey::encode(Version::MuxedAccount, &payload)
            }
        }
    }
}

impl From<AccountId> for MuxedAccount {
    fn from(account: AccountId) -> Self {
        MuxedAccount::Ed25519(account.0)
    }
}

impl fmt::Display for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_strkey())
    }
}

impl fmt::Debug for MuxedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MuxedAccount({})", self.to_strkey())
    }
}

impl FromStr for MuxedAccount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (version, payload) = strkey::decode_any(s).map_err(|e| invalid(s, e))?;
        match version {
            Version::AccountId => {
                let mut key = [0u8; 32];
                key.copy_from_slice(&payload);
                Ok(MuxedAccount::Ed25519(key))
            }
            Version::MuxedAccount => {
                let mut ed25519 = [0u8; 32];
                ed25519.copy_from_slice(&payload[..32]);
                let mut id = [0u8; 8];
                id.copy_from_slice(&payload[32..]);
                Ok(MuxedAccount::MuxedEd25519 {
                    id: u64::from_be_bytes(id),
                    ed25519,
                })
            }
            other => Err(invalid(s, format!("{other:?} is not an account"))),
        }
    }
}

strkey_serde!(MuxedAccount);

impl XdrCodec for MuxedAccount {
    fn encode(&self, w: &mut XdrWriter) {
        match self {
            MuxedAccount::Ed25519(key) => {
                w.write_i32(KEY_TYPE_ED25519);
                w.write_fixed_opaque(key);
            }
            MuxedAccount::MuxedEd25519 { id, ed25519 } => {
                w.write_i32(KEY_TYPE_MUXED_ED25519);
                w.write_u64(*id);
                w.write_fixed_opaque(ed25519);
            }
        }
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        match r.read_i32()? {
            KEY_TYPE_ED25519 => Ok(MuxedAccount::Ed25519(r.read_fixed::<32>()?)),
            KEY_TYPE_MUXED_ED25519 => {
                let id = r.read_u64()?;
                let ed25519 = r.read_fixed::<32>()?;
                Ok(MuxedAccount::MuxedEd25519 { id, ed25519 })
            }
            value => Err(XdrError::InvalidDiscriminant {
                type_name: "MuxedAccount",
                value,
            }
            .into()),
        }
    }
}

// ---------------------------------------------------------------------------
// ContractId
// ---------------------------------------------------------------------------

/// A contract identifier (`C...`): the 32-byte hash naming a contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(pub [u8; 32]);

impl ContractId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_strkey(&self) -> String {
        strkey::encode(Version::Contract, &self.0)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_strkey())
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self.to_strkey())
    }
}

impl FromStr for ContractId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        strkey::decode_32(Version::Contract, s)
            .map(Self)
            .map_err(|e| invalid(s, e))
    }
}

strkey_serde!(ContractId);

impl XdrCodec for ContractId {
    fn encode(&self, w: &mut XdrWriter) {
        w.write_fixed_opaque(&self.0);
    }

    fn decode(r: &mut XdrReader<'_>) -> Result<Self> {
        Ok(Self(r.read_fixed::<32>()?))
    }
}
